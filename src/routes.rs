mod health_check;
mod subscribe;

pub use health_check::*;
pub use subscribe::{method_not_allowed, preflight, subscribe, SubscribeError};
