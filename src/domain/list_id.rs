use serde::{Deserialize, Serialize};

use super::Audience;

/// Identifies a mailing list in Brevo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ListId(i64);

impl ListId {
    /// Reads a list id the lenient way configuration values have always been read:
    /// leading whitespace is skipped, an optional sign is accepted, and then the
    /// leading run of digits is taken, ignoring whatever follows (`"12abc"` is 12).
    ///
    /// Returns `None` if there are no digits, or if the number doesn't fit.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim_start();
        let (negative, unsigned) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };

        let digits_end = unsigned
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(unsigned.len());
        let digits = &unsigned[..digits_end];
        if digits.is_empty() {
            return None;
        }

        let value: i64 = digits.parse().ok()?;
        Some(Self(if negative { -value } else { value }))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

/// The raw list ids configured for each audience.
///
/// Values are kept as configured and only read when a list is picked, so a
/// misconfigured id degrades to "no list" rather than failing at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListIds {
    pub default: Option<String>,
    pub seller: Option<String>,
    pub consumer: Option<String>,
}

impl ListIds {
    /// Picks the list a contact from `audience` should be added to.
    ///
    /// Sellers and consumers get their own list when one is configured, and fall back
    /// to the default list otherwise. Falling back depends only on whether an id is
    /// set: a set but unreadable id yields no list at all.
    pub fn resolve(&self, audience: Audience) -> Option<ListId> {
        let raw = match audience {
            Audience::Seller => configured(&self.seller).or_else(|| configured(&self.default)),
            Audience::Consumer => {
                configured(&self.consumer).or_else(|| configured(&self.default))
            }
            Audience::General => configured(&self.default),
        };

        raw.and_then(ListId::parse)
    }
}

fn configured(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
