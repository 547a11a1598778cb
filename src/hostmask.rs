//! The `nick!user@host` identity of a network participant.

use std::fmt;

/// A parsed `nick!user@host` triple.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Hostmask {
    pub nickname: String,
    pub username: String,
    pub hostname: String,
}

impl Hostmask {
    pub fn new(
        nickname: impl Into<String>,
        username: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Self {
        Self {
            nickname: nickname.into(),
            username: username.into(),
            hostname: hostname.into(),
        }
    }

    /// Parse an event source such as `alice!a@trusted.example`.
    ///
    /// Returns `None` unless the string holds exactly one `!` followed by
    /// exactly one `@`, with all three parts non-empty. Server names and
    /// service prefixes therefore come back as `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let (ident, hostname) = s.split_once('@')?;
        if hostname.contains('@') {
            return None;
        }

        let (nickname, username) = ident.split_once('!')?;
        if username.contains('!') {
            return None;
        }

        if nickname.is_empty() || username.is_empty() || hostname.is_empty() {
            return None;
        }

        Some(Self::new(nickname, username, hostname))
    }
}

impl fmt::Display for Hostmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}@{}", self.nickname, self.username, self.hostname)
    }
}
