use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a household member.
///
/// Members are the vertices of the debt network. The identifier is opaque to
/// the engine; the surrounding application typically uses a username or a
/// database key.
///
/// # Examples
///
/// ```
/// use settle_engine::core::member::MemberId;
///
/// let ayla = MemberId::new("ayla");
/// let ben = MemberId::new("ben");
/// assert_ne!(ayla, ben);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// Create a new member identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this member ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MemberId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_equality() {
        let a = MemberId::new("ayla");
        let b = MemberId::new("ayla");
        let c = MemberId::new("ben");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_member_display() {
        let m = MemberId::new("caro");
        assert_eq!(format!("{}", m), "caro");
    }

    #[test]
    fn test_member_ordering() {
        let a = MemberId::new("ayla");
        let b = MemberId::new("ben");
        assert!(a < b);
    }
}
