//! Policy model: who is trusted, where, and which servers to use.
//!
//! This module is split into logical submodules:
//! - [`codec`]: JSON document decoding/validation and encoding
//! - [`matching`]: hostmask wildcard matching and operator lookup
//!
//! A [`Policy`] is built wholesale by [`codec::decode`] and never edited in
//! place afterwards; the service swaps whole snapshots on reload.

pub mod codec;
pub mod matching;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

pub use codec::{decode, encode, from_json_str, to_json_string};
pub use matching::{operator_candidates, user_matches, wildcard_match};

/// Port used when a server entry does not name one.
pub const DEFAULT_PORT: u16 = 6667;

/// An IRC server the bot may connect to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Server {
    pub hostname: String,
    pub port: u16,
    pub secure: bool,
}

impl Server {
    pub fn new(hostname: impl Into<String>, port: u16, secure: bool) -> Self {
        Self {
            hostname: hostname.into(),
            port,
            secure,
        }
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hostname, self.port)?;
        if self.secure {
            f.write_str(" (tls)")?;
        }
        Ok(())
    }
}

/// Privilege class of a trusted user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum UserClass {
    Admin,
    #[default]
    User,
}

impl UserClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl FromStr for UserClass {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(()),
        }
    }
}

impl fmt::Display for UserClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trusted user, identified by a wildcard hostmask pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    /// Shell-glob pattern (`*`, `?`) matched against `nick!user@host`.
    pub mask: String,
    pub class: UserClass,
}

impl User {
    pub fn new(name: impl Into<String>, mask: impl Into<String>, class: UserClass) -> Self {
        Self {
            name: name.into(),
            mask: mask.into(),
            class,
        }
    }

    /// True if this user's pattern matches a rendered hostmask.
    #[inline]
    pub fn matches(&self, hostmask: &str) -> bool {
        wildcard_match(&self.mask, hostmask)
    }
}

/// A managed channel and the names of users to op there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Channel {
    pub name: String,
    /// User names, resolved against [`Policy::users`] at lookup time.
    pub operators: BTreeSet<String>,
}

impl Channel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operators: BTreeSet::new(),
        }
    }

    pub fn with_operator(mut self, name: impl Into<String>) -> Self {
        self.operators.insert(name.into());
        self
    }
}

/// The full access-control policy plus the diagnostics from building it.
///
/// When [`is_valid`](Self::is_valid) is false only [`errors`](Self::errors)
/// and [`warnings`](Self::warnings) carry meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub nickname: String,
    pub username: String,
    pub realname: String,
    /// Document order; rotated round-robin by the service.
    pub servers: Vec<Server>,
    pub users: BTreeMap<String, User>,
    pub channels: BTreeMap<String, Channel>,
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            nickname: String::new(),
            username: String::new(),
            realname: String::new(),
            servers: Vec::new(),
            users: BTreeMap::new(),
            channels: BTreeMap::new(),
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl Policy {
    /// An empty, valid policy for the given bot identity.
    pub fn new(
        nickname: impl Into<String>,
        username: impl Into<String>,
        realname: impl Into<String>,
    ) -> Self {
        Self {
            nickname: nickname.into(),
            username: username.into(),
            realname: realname.into(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Register a user. An existing entry with the same name is replaced.
    pub fn add_user(&mut self, user: User) {
        self.users.insert(user.name.clone(), user);
    }

    /// Register a channel. An existing entry with the same name is replaced.
    pub fn add_channel(&mut self, channel: Channel) {
        self.channels.insert(channel.name.clone(), channel);
    }

    pub fn add_server(&mut self, server: Server) {
        self.servers.push(server);
    }

    pub fn user(&self, name: &str) -> Option<&User> {
        self.users.get(name)
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }

    pub(crate) fn invalidate(&mut self) {
        self.valid = false;
    }

    pub(crate) fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub(crate) fn push_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}
