use lazy_regex::regex_is_match;

/// The email address of someone signing up. Enforces the shape of the address, so any
/// instance of this is guaranteed to look like `local@domain.tld`.
///
/// Addresses are normalized on the way in: surrounding whitespace is dropped and
/// the whole address is lowercased. Nothing beyond the shape is checked, there is
/// no DNS or mailbox verification.
///
/// # Examples
/// Use the `parse` function to build a `SubscriberEmail` from a string.
/// We can then get the email address back out using the `AsRef<str>` implementation.
/// ```
/// use signup_relay::domain::SubscriberEmail;
///
/// let email = SubscriberEmail::parse(" Foo@BAR.com ".to_string()).unwrap();
/// assert_eq!("foo@bar.com", email.as_ref());
/// ```
#[derive(Debug, Clone)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    /// Return `Ok` with a normalized `SubscriberEmail` when `s` is shaped like an email
    /// address. Otherwise, returns `Err` with an error message describing the problem.
    pub fn parse(s: String) -> Result<Self, String> {
        let email = s.trim().to_lowercase();

        if regex_is_match!(r"^[^\s@]+@[^\s@]+\.[^\s@]+$", &email) {
            Ok(SubscriberEmail(email))
        } else {
            Err(format!("{:?} is not a valid subscriber email.", s))
        }
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
