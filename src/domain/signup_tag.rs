use unicode_segmentation::UnicodeSegmentation;

/// A short, free-form tag describing a signup, such as where it came from (`source`)
/// or who is signing up (`persona`).
///
/// Tags are trimmed and capped at [`SignupTag::MAX_LENGTH`] characters. An empty tag
/// is still a tag: it reads as `"unknown"` wherever it's reported, see
/// [`SignupTag::or_unknown`].
///
/// # Examples
/// ```
/// use signup_relay::domain::SignupTag;
///
/// let tag = SignupTag::parse("  footer-form ");
/// assert_eq!("footer-form", tag.as_ref());
/// assert_eq!("unknown", SignupTag::parse("").or_unknown());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupTag(String);

impl SignupTag {
    /// Tags are cut down to this many characters (graphemes).
    pub const MAX_LENGTH: usize = 32;

    const UNKNOWN: &'static str = "unknown";

    pub fn parse(s: &str) -> Self {
        Self(s.trim().graphemes(true).take(Self::MAX_LENGTH).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The tag, or `"unknown"` if it's empty.
    pub fn or_unknown(&self) -> &str {
        if self.is_empty() {
            Self::UNKNOWN
        } else {
            &self.0
        }
    }
}

impl AsRef<str> for SignupTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
