use super::{Audience, SignupTag, SubscriberEmail};

/// Captures all of the information we need to upsert a contact.
pub struct NewContact {
    pub email: SubscriberEmail,
    pub source: SignupTag,
    pub persona: SignupTag,
}

impl NewContact {
    /// The audience the contact's persona belongs to.
    pub fn audience(&self) -> Audience {
        Audience::of(self.persona.as_ref())
    }
}
