//! Event adapter: turns decoded protocol events into policy actions.
//!
//! The adapter is the only place where events meet policy. It keeps the
//! bot's channel states current and answers with the commands to send:
//! `JOIN` after registration and kicks, `MODE +o` for trusted joiners once
//! the bot is opped, and notices for private-message commands.
//!
//! Events must be fed strictly in delivery order; op gating depends on the
//! most recent join and mode changes.

pub mod commands;
pub mod event;

pub use commands::{CommandContext, CommandHandler, CommandRegistry};
pub use event::{Event, source_nick};

use std::sync::Arc;

use opbot_proto::{Command, ModeChange, is_channel_name};
use tracing::{debug, info};

use crate::hostmask::Hostmask;
use crate::service::{OpState, PolicyService};

/// Per-connection event handler.
pub struct EventAdapter {
    service: Arc<PolicyService>,
    /// Nickname currently in use on the connection.
    nickname: String,
    commands: CommandRegistry,
}

impl EventAdapter {
    /// Create an adapter using the policy's configured nickname.
    pub fn new(service: Arc<PolicyService>) -> Self {
        let nickname = service.current().nickname.clone();
        Self {
            service,
            nickname,
            commands: CommandRegistry::new(),
        }
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Record the nickname actually in use, e.g. after a collision.
    pub fn set_nickname(&mut self, nickname: impl Into<String>) {
        self.nickname = nickname.into();
    }

    pub fn service(&self) -> &Arc<PolicyService> {
        &self.service
    }

    fn is_self(&self, source: &str) -> bool {
        source_nick(source) == self.nickname
    }

    /// Handle one event, returning the commands to send in order.
    pub fn handle(&mut self, event: Event) -> Vec<Command> {
        match event {
            Event::Registered => self.on_registered(),
            Event::Join { source, channel } => self.on_join(&source, &channel),
            Event::Part {
                source,
                channel,
                reason,
            } => {
                if self.is_self(&source) {
                    self.service.mark_parted(&channel);
                    info!(channel = %channel, "Left channel");
                } else {
                    debug!(nick = %source_nick(&source), channel = %channel, reason = ?reason, "User left");
                }
                Vec::new()
            }
            Event::Kick {
                source,
                channel,
                target,
                reason,
            } => self.on_kick(&source, &channel, &target, reason.as_deref()),
            Event::Quit { source, reason } => {
                debug!(nick = %source_nick(&source), reason = ?reason, "User quit");
                Vec::new()
            }
            Event::Mode {
                source,
                target,
                changes,
            } => {
                self.on_mode(&source, &target, &changes);
                Vec::new()
            }
            Event::Nick { source, nickname } => {
                if self.is_self(&source) {
                    info!(old = %self.nickname, new = %nickname, "Nickname changed");
                    self.nickname = nickname;
                }
                Vec::new()
            }
            Event::Privmsg {
                source,
                target,
                text,
            } => self.on_privmsg(&source, &target, &text),
            Event::Ctcp {
                source,
                target,
                command,
                params,
            } => self.on_ctcp(&source, &target, &command, params.as_deref()),
        }
    }

    fn on_registered(&self) -> Vec<Command> {
        let policy = self.service.current();
        info!(nickname = %self.nickname, channels = policy.channels.len(), "Signed on");
        policy
            .channels
            .keys()
            .map(|name| Command::Join(name.clone()))
            .collect()
    }

    fn on_join(&self, source: &str, channel: &str) -> Vec<Command> {
        if self.is_self(source) {
            self.service.mark_joined(channel);
            info!(channel = %channel, "Joined channel");
            return Vec::new();
        }

        let Some(hostmask) = Hostmask::parse(source) else {
            debug!(source = %source, channel = %channel, "Ignoring join with unparseable source");
            return Vec::new();
        };

        debug!(nick = %hostmask.nickname, channel = %channel, "User joined");
        self.consider_opping(&hostmask, channel).into_iter().collect()
    }

    fn on_kick(
        &self,
        source: &str,
        channel: &str,
        target: &str,
        reason: Option<&str>,
    ) -> Vec<Command> {
        let kicker = source_nick(source);
        if target != self.nickname {
            debug!(nick = %target, kicker = %kicker, channel = %channel, reason = ?reason, "User kicked");
            return Vec::new();
        }

        self.service.mark_parted(channel);
        info!(channel = %channel, kicker = %kicker, reason = ?reason, "Kicked from channel, rejoining");
        vec![Command::Join(channel.to_owned())]
    }

    fn on_mode(&self, source: &str, target: &str, changes: &[ModeChange]) {
        if !is_channel_name(target) {
            debug!(target = %target, "User mode change");
            return;
        }

        for change in changes {
            debug!(
                target = %target,
                by = %source_nick(source),
                mode = %change.mode,
                added = change.added,
                arg = ?change.arg,
                "Mode change"
            );

            if change.mode != 'o' || change.arg.as_deref() != Some(self.nickname.as_str()) {
                continue;
            }

            if self.service.set_opped(target, change.added) {
                info!(channel = %target, opped = change.added, "Own operator status changed");
            } else {
                debug!(channel = %target, "Operator change for a channel we are not in");
            }
        }
    }

    fn on_privmsg(&self, source: &str, target: &str, text: &str) -> Vec<Command> {
        if target != self.nickname {
            return Vec::new();
        }

        let Some(hostmask) = Hostmask::parse(source) else {
            return Vec::new();
        };

        info!(sender = %hostmask, message = %text, "Private message");
        self.commands.dispatch(&self.service, &hostmask, text)
    }

    fn on_ctcp(
        &self,
        source: &str,
        target: &str,
        command: &str,
        params: Option<&str>,
    ) -> Vec<Command> {
        if target != self.nickname {
            return Vec::new();
        }

        if !command.eq_ignore_ascii_case("OP") {
            debug!(query = %command, "Ignoring CTCP query");
            return Vec::new();
        }

        let (Some(hostmask), Some(params)) = (Hostmask::parse(source), params) else {
            return Vec::new();
        };

        let channels: Vec<&str> = params.split_whitespace().collect();
        info!(sender = %hostmask, channels = %channels.join(", "), "CTCP OP request");

        channels
            .into_iter()
            .filter_map(|channel| self.consider_opping(&hostmask, channel))
            .collect()
    }

    /// Op `hostmask` in `channel` if the bot holds op there and the policy
    /// lists a matching operator.
    fn consider_opping(&self, hostmask: &Hostmask, channel: &str) -> Option<Command> {
        if self.service.op_state(channel) != OpState::JoinedOpped {
            debug!(nick = %hostmask.nickname, channel = %channel, "Not opped, cannot op");
            return None;
        }

        let candidates = self.service.find_operator_candidates(hostmask, channel);
        for user in &candidates {
            info!(
                nick = %hostmask.nickname,
                hostmask = %hostmask,
                mask = %user.mask,
                user = %user.name,
                channel = %channel,
                "Operator match"
            );
        }

        if candidates.is_empty() {
            return None;
        }

        Some(Command::op(channel, hostmask.nickname.as_str()))
    }
}
