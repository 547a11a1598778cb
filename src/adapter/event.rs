//! Decoded protocol events consumed by the adapter.

use opbot_proto::response::RPL_WELCOME;
use opbot_proto::{Ctcp, Message, ModeChange, parse_mode_changes};

/// One inbound event, already decoded from the wire.
///
/// `source` is always the raw message prefix (`nick!user@host` for users);
/// whether an event concerns the bot itself is decided by the adapter, which
/// knows the nickname currently in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Registration with the server completed.
    Registered,
    Join {
        source: String,
        channel: String,
    },
    Part {
        source: String,
        channel: String,
        reason: Option<String>,
    },
    Kick {
        source: String,
        channel: String,
        target: String,
        reason: Option<String>,
    },
    Quit {
        source: String,
        reason: Option<String>,
    },
    Mode {
        source: String,
        target: String,
        changes: Vec<ModeChange>,
    },
    Nick {
        source: String,
        nickname: String,
    },
    Privmsg {
        source: String,
        target: String,
        text: String,
    },
    Ctcp {
        source: String,
        target: String,
        command: String,
        params: Option<String>,
    },
}

impl Event {
    /// Decode a server message into an event.
    ///
    /// Returns `None` for messages the adapter has no interest in and for
    /// messages missing required parameters.
    pub fn from_message(msg: &Message) -> Option<Self> {
        let source = msg.prefix.clone().unwrap_or_default();
        let owned = |index: usize| msg.param(index).map(str::to_owned);

        let event = match msg.command.as_str() {
            RPL_WELCOME => Self::Registered,
            "JOIN" => Self::Join {
                source,
                channel: owned(0)?,
            },
            "PART" => Self::Part {
                source,
                channel: owned(0)?,
                reason: owned(1),
            },
            "KICK" => Self::Kick {
                source,
                channel: owned(0)?,
                target: owned(1)?,
                reason: owned(2),
            },
            "QUIT" => Self::Quit {
                source,
                reason: owned(0),
            },
            "MODE" => {
                let target = owned(0)?;
                let modes = msg.param(1)?;
                let args = msg.params.get(2..).unwrap_or_default();
                Self::Mode {
                    source,
                    target,
                    changes: parse_mode_changes(modes, args),
                }
            }
            "NICK" => Self::Nick {
                source,
                nickname: owned(0)?,
            },
            "PRIVMSG" => {
                let target = owned(0)?;
                let text = msg.param(1)?;
                match Ctcp::parse(text) {
                    Some(ctcp) => Self::Ctcp {
                        source,
                        target,
                        command: ctcp.command.to_owned(),
                        params: ctcp.params.map(str::to_owned),
                    },
                    None => Self::Privmsg {
                        source,
                        target,
                        text: text.to_owned(),
                    },
                }
            }
            _ => return None,
        };

        Some(event)
    }
}

/// Nickname part of a message source.
pub fn source_nick(source: &str) -> &str {
    let end = source.find(['!', '@']).unwrap_or(source.len());
    &source[..end]
}
