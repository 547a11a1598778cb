//! Per-channel runtime state of the bot itself.
//!
//! ```text
//! ┌────────────┐  self JOIN   ┌────────────────┐   +o bot   ┌──────────────┐
//! │ NotJoined  ├─────────────►│ JoinedUnopped  ├───────────►│ JoinedOpped  │
//! └────────────┘              └────────────────┘◄───────────┴──────────────┘
//!       ▲                            │              -o bot          │
//!       └────────────────────────────┴──────────────────────────────┘
//!                          self PART / KICK
//! ```
//!
//! `NotJoined` is represented by the absence of a [`ChannelState`].

/// Where the bot stands in one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpState {
    NotJoined,
    JoinedUnopped,
    JoinedOpped,
}

/// Runtime annotation for a channel the bot is currently in.
///
/// The channel name is the key under which the state is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelState {
    opped: bool,
}

impl ChannelState {
    /// State for a freshly confirmed join: never opped yet.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_opped(&self) -> bool {
        self.opped
    }

    pub fn set_opped(&mut self, opped: bool) {
        self.opped = opped;
    }

    pub fn op_state(&self) -> OpState {
        if self.opped {
            OpState::JoinedOpped
        } else {
            OpState::JoinedUnopped
        }
    }
}
