/// The mailing-list audience a persona belongs to.
///
/// Personas are free-form, matching ignores case and surrounding whitespace.
/// Anything unrecognized, including an empty persona, lands in `General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// `seller`, `etsy_seller` or `smb`
    Seller,
    /// `consumer` or `shopper`
    Consumer,
    General,
}

impl Audience {
    pub fn of(persona: &str) -> Self {
        match persona.trim().to_lowercase().as_str() {
            "seller" | "etsy_seller" | "smb" => Audience::Seller,
            "consumer" | "shopper" => Audience::Consumer,
            _ => Audience::General,
        }
    }
}
