//! Outbound commands sent by the bot.

use std::fmt;

use crate::message::Message;

/// A command the bot writes to the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `NICK <nickname>`
    Nick(String),
    /// `USER <username> 0 * :<realname>`
    User {
        /// Ident/username.
        username: String,
        /// Free-form real name.
        realname: String,
    },
    /// `JOIN <channel>`
    Join(String),
    /// `MODE <target> <modes> [args...]`
    Mode {
        /// Channel or nickname.
        target: String,
        /// Mode string, e.g. `+o`.
        modes: String,
        /// Mode arguments.
        args: Vec<String>,
    },
    /// `NOTICE <target> :<text>`
    Notice {
        /// Recipient.
        target: String,
        /// Body.
        text: String,
    },
    /// `PONG <token>`
    Pong(String),
}

impl Command {
    /// Grant channel operator status to `nick` in `channel`.
    pub fn op(channel: impl Into<String>, nick: impl Into<String>) -> Self {
        Self::Mode {
            target: channel.into(),
            modes: "+o".to_owned(),
            args: vec![nick.into()],
        }
    }

    /// The wire message for this command.
    pub fn to_message(&self) -> Message {
        match self {
            Self::Nick(nick) => Message::new("NICK", vec![nick.clone()]),
            Self::User { username, realname } => Message::new(
                "USER",
                vec![
                    username.clone(),
                    "0".to_owned(),
                    "*".to_owned(),
                    realname.clone(),
                ],
            ),
            Self::Join(channel) => Message::new("JOIN", vec![channel.clone()]),
            Self::Mode {
                target,
                modes,
                args,
            } => {
                let mut params = Vec::with_capacity(args.len() + 2);
                params.push(target.clone());
                params.push(modes.clone());
                params.extend(args.iter().cloned());
                Message::new("MODE", params)
            }
            Self::Notice { target, text } => {
                Message::new("NOTICE", vec![target.clone(), text.clone()])
            }
            Self::Pong(token) => Message::new("PONG", vec![token.clone()]),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_message().fmt(f)
    }
}
