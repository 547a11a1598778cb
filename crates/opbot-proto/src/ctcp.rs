//! CTCP (Client-to-Client Protocol) framing.
//!
//! CTCP queries ride inside PRIVMSG bodies delimited by `\x01`. The bot only
//! answers a single custom query, `OP <channel>...`, so the command word is
//! kept as the raw string rather than an enum of well-known kinds.
//!
//! # Reference
//! - CTCP specification: <https://modern.ircdocs.horse/ctcp.html>

/// The CTCP delimiter character (`\x01`).
pub const CTCP_DELIM: char = '\x01';

/// A parsed CTCP query borrowed from a message body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ctcp<'a> {
    /// Query word, as sent (`OP`, `VERSION`, ...).
    pub command: &'a str,
    /// Text after the query word, if any.
    pub params: Option<&'a str>,
}

impl<'a> Ctcp<'a> {
    /// Parse a CTCP query from a PRIVMSG body.
    ///
    /// Returns `None` if the body is not CTCP-framed. A missing closing
    /// delimiter is tolerated.
    pub fn parse(text: &'a str) -> Option<Self> {
        let text = text.strip_prefix(CTCP_DELIM)?;
        let text = text.strip_suffix(CTCP_DELIM).unwrap_or(text);

        if text.is_empty() {
            return None;
        }

        let (command, params) = match text.split_once(' ') {
            Some((command, params)) if !params.is_empty() => (command, Some(params)),
            Some((command, _)) => (command, None),
            None => (text, None),
        };

        Some(Self { command, params })
    }
}
