//! opbot - channel operator bot
//!
//! Keeps a connection to one of a rotating list of IRC servers, joins the
//! channels named in a JSON policy file, and grants operator status to users
//! whose `nick!user@host` matches an operator pattern for that channel.
//!
//! - [`policy`]: the policy model, its JSON codec and hostmask matching
//! - [`service`]: the live policy plus the bot's per-channel op state
//! - [`adapter`]: protocol events in, policy actions out
//! - [`network`]: transport, sessions and server failover

pub mod adapter;
pub mod error;
pub mod hostmask;
pub mod network;
pub mod policy;
pub mod service;

pub use adapter::{Event, EventAdapter};
pub use error::{PolicyError, SessionError, SessionResult};
pub use hostmask::Hostmask;
pub use policy::{Channel, Policy, Server, User, UserClass};
pub use service::{ChannelState, OpState, PolicyService, ReloadReport};
