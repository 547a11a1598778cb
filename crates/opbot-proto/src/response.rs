//! Numeric replies the bot reacts to.

/// RPL_WELCOME: registration with the server completed.
pub const RPL_WELCOME: &str = "001";

/// ERR_NICKNAMEINUSE: the requested nickname is taken.
pub const ERR_NICKNAMEINUSE: &str = "433";
