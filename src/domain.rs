mod audience;
mod list_id;
mod new_contact;
mod signup_tag;
mod subscriber_email;

pub use audience::Audience;
pub use list_id::{ListId, ListIds};
pub use new_contact::NewContact;
pub use signup_tag::SignupTag;
pub use subscriber_email::SubscriberEmail;
