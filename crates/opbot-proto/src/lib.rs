//! # opbot-proto
//!
//! The client-side slice of the IRC protocol that opbot needs: parsing
//! server lines into [`Message`]s, rendering outbound [`Command`]s, CTCP
//! framing, expanding channel mode strings into individual changes, and a
//! line codec for `tokio_util::codec::Framed`.
//!
//! ```rust
//! use opbot_proto::{Command, Message};
//!
//! let msg: Message = ":alice!a@host JOIN #rust".parse().unwrap();
//! assert_eq!(msg.command, "JOIN");
//! assert_eq!(msg.prefix.as_deref(), Some("alice!a@host"));
//!
//! let op = Command::Mode {
//!     target: "#rust".into(),
//!     modes: "+o".into(),
//!     args: vec!["alice".into()],
//! };
//! assert_eq!(op.to_string(), "MODE #rust +o alice");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod chan;
pub mod command;
pub mod ctcp;
pub mod error;
pub mod line;
pub mod message;
pub mod mode;
pub mod response;

pub use self::chan::is_channel_name;
pub use self::command::Command;
pub use self::ctcp::Ctcp;
pub use self::error::MessageParseError;
pub use self::line::{Line, LineCodec};
pub use self::message::Message;
pub use self::mode::{ModeChange, parse_mode_changes};

/// Maximum IRC line length accepted by the framing layer.
pub const MAX_IRC_LINE_LEN: usize = 8191;
