//! Policy service: owns the live policy and the bot's channel states.
//!
//! The current [`Policy`] is an immutable snapshot behind an `Arc`. Readers
//! clone the `Arc` and keep a complete policy for as long as they need it;
//! a reload builds a fresh snapshot and swaps the pointer under a write lock,
//! so nobody ever observes a half-updated policy.

mod channel_state;

pub use channel_state::{ChannelState, OpState};

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use crate::error::PolicyError;
use crate::hostmask::Hostmask;
use crate::policy::{self, Policy, Server, User, codec};

/// Outcome of a successful reload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadReport {
    /// Entry-level warnings from the new document.
    pub warnings: Vec<String>,
}

/// Owner of the authoritative policy.
pub struct PolicyService {
    path: PathBuf,
    current: RwLock<Arc<Policy>>,
    /// Round-robin order of servers; rebuilt whenever the policy is swapped.
    rotation: Mutex<VecDeque<Server>>,
    /// One entry per channel the bot is in, keyed by channel name.
    channels: DashMap<String, ChannelState>,
    /// Serializes load/reload so only one is in flight.
    reload_lock: Mutex<()>,
}

fn log_warnings(path: &Path, policy: &Policy) {
    for warning in policy.warnings() {
        warn!(path = %path.display(), "{}", warning);
    }
}

impl PolicyService {
    /// Load the initial policy from `path`.
    ///
    /// Any failure here is fatal for the caller: an unreadable file, invalid
    /// JSON, or a document that fails validation (all errors are returned).
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PolicyError> {
        let path = path.into();
        let policy = codec::load_file(&path)?;
        log_warnings(&path, &policy);

        if !policy.is_valid() {
            return Err(PolicyError::Rejected(policy.errors().to_vec()));
        }

        info!(
            path = %path.display(),
            nickname = %policy.nickname,
            servers = policy.servers.len(),
            users = policy.users.len(),
            channels = policy.channels.len(),
            "Policy loaded"
        );

        Ok(Self::with_policy(path, policy))
    }

    /// Wrap an already decoded policy. `path` is used by reload and save.
    pub fn with_policy(path: impl Into<PathBuf>, policy: Policy) -> Self {
        let rotation = policy.servers.iter().cloned().collect();
        Self {
            path: path.into(),
            current: RwLock::new(Arc::new(policy)),
            rotation: Mutex::new(rotation),
            channels: DashMap::new(),
            reload_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the live policy.
    pub fn current(&self) -> Arc<Policy> {
        Arc::clone(&self.current.read())
    }

    /// Re-read the policy file and swap it in if it is valid.
    pub fn reload(&self) -> Result<ReloadReport, PolicyError> {
        let path = self.path.clone();
        self.reload_from(&path)
    }

    /// Load a candidate policy from `path` and swap it in if it is valid.
    ///
    /// On any failure the live policy is left untouched. Identity changes
    /// (nickname, username, realname) are not pushed to an open connection.
    pub fn reload_from(&self, path: &Path) -> Result<ReloadReport, PolicyError> {
        let _guard = self.reload_lock.lock();

        let candidate = match codec::load_file(path) {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Policy reload failed, keeping current policy");
                return Err(e);
            }
        };
        log_warnings(path, &candidate);

        if !candidate.is_valid() {
            for error in candidate.errors() {
                warn!(path = %path.display(), "{}", error);
            }
            warn!(
                path = %path.display(),
                errors = candidate.errors().len(),
                "Policy reload rejected, keeping current policy"
            );
            return Err(PolicyError::Rejected(candidate.errors().to_vec()));
        }

        let report = ReloadReport {
            warnings: candidate.warnings().to_vec(),
        };
        let rotation: VecDeque<Server> = candidate.servers.iter().cloned().collect();

        *self.current.write() = Arc::new(candidate);
        *self.rotation.lock() = rotation;

        info!(path = %path.display(), warnings = report.warnings.len(), "Policy reloaded");
        Ok(report)
    }

    /// Write the live policy back to its file.
    pub fn save(&self) -> Result<(), PolicyError> {
        let _guard = self.reload_lock.lock();
        codec::save_file(&self.path, &self.current())?;
        info!(path = %self.path.display(), "Policy saved");
        Ok(())
    }

    /// Next server in round-robin order, or `None` if the policy lists none.
    ///
    /// The head of the rotation is returned and moved to the back, so
    /// `[A, B, C]` yields `A, B, C, A, ...`.
    pub fn next_server(&self) -> Option<Server> {
        let mut rotation = self.rotation.lock();
        let server = rotation.pop_front()?;
        rotation.push_back(server.clone());
        Some(server)
    }

    // ------------------------------------------------------------------
    // Channel state tracking
    // ------------------------------------------------------------------

    pub fn channel_state(&self, channel: &str) -> Option<ChannelState> {
        self.channels.get(channel).map(|state| state.clone())
    }

    pub fn op_state(&self, channel: &str) -> OpState {
        self.channels
            .get(channel)
            .map_or(OpState::NotJoined, |state| state.op_state())
    }

    /// Record a confirmed self-join. A repeated join resets the op flag.
    pub fn mark_joined(&self, channel: &str) {
        self.channels
            .insert(channel.to_owned(), ChannelState::new());
    }

    /// Forget a channel the bot left. Returns false if it was not tracked.
    pub fn mark_parted(&self, channel: &str) -> bool {
        self.channels.remove(channel).is_some()
    }

    /// Update the op flag of a joined channel. Returns false if the bot is
    /// not in `channel`.
    pub fn set_opped(&self, channel: &str, opped: bool) -> bool {
        match self.channels.get_mut(channel) {
            Some(mut state) => {
                state.set_opped(opped);
                true
            }
            None => false,
        }
    }

    /// Drop all channel states, e.g. when the connection is lost.
    pub fn clear_channels(&self) {
        self.channels.clear();
    }

    // ------------------------------------------------------------------
    // Permission queries
    // ------------------------------------------------------------------

    /// Operators of `channel` whose pattern matches `hostmask`.
    ///
    /// Channels missing from the policy have no candidates.
    pub fn find_operator_candidates(&self, hostmask: &Hostmask, channel: &str) -> Vec<User> {
        let policy = self.current();
        policy::operator_candidates(&policy, hostmask, channel)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Every user whose pattern matches `hostmask`.
    pub fn find_user_matches(&self, hostmask: &Hostmask) -> Vec<User> {
        let policy = self.current();
        policy::user_matches(&policy, hostmask)
            .into_iter()
            .cloned()
            .collect()
    }
}
