//! Private-message command registry and dispatch.
//!
//! A message to the bot of the form `<word> [args...]` selects a handler by
//! exact name. The table is built once; unknown words get an
//! "Unknown Command" notice.

use std::collections::HashMap;

use opbot_proto::Command;
use tracing::{debug, info};

use crate::hostmask::Hostmask;
use crate::policy::UserClass;
use crate::service::PolicyService;

/// Everything a command handler may look at.
pub struct CommandContext<'a> {
    pub service: &'a PolicyService,
    pub sender: &'a Hostmask,
}

impl CommandContext<'_> {
    fn notice(&self, text: impl Into<String>) -> Command {
        Command::Notice {
            target: self.sender.nickname.clone(),
            text: text.into(),
        }
    }
}

/// A command reachable over private message.
pub trait CommandHandler: Send + Sync {
    /// Run the command, returning the replies to send.
    fn handle(&self, ctx: &CommandContext<'_>) -> Vec<Command>;
}

/// Reports every policy user matching the sender's hostmask.
pub struct WhoamiHandler;

impl CommandHandler for WhoamiHandler {
    fn handle(&self, ctx: &CommandContext<'_>) -> Vec<Command> {
        let users = ctx.service.find_user_matches(ctx.sender);
        if users.is_empty() {
            return vec![ctx.notice("Unknown user")];
        }

        users
            .iter()
            .flat_map(|user| {
                [
                    ctx.notice(format!("Username: '{}'", user.name)),
                    ctx.notice(format!("Hostmask: '{}'", user.mask)),
                    ctx.notice(format!("Class:    '{}'", user.class)),
                ]
            })
            .collect()
    }
}

/// Reloads the policy file. Admin class only.
pub struct RehashHandler;

impl CommandHandler for RehashHandler {
    fn handle(&self, ctx: &CommandContext<'_>) -> Vec<Command> {
        let is_admin = ctx
            .service
            .find_user_matches(ctx.sender)
            .iter()
            .any(|user| user.class == UserClass::Admin);

        if !is_admin {
            info!(sender = %ctx.sender, "Refused rehash from non-admin");
            return vec![ctx.notice("Permission denied")];
        }

        info!(sender = %ctx.sender, "Rehash requested");
        match ctx.service.reload() {
            Ok(report) => {
                let mut replies = vec![ctx.notice(format!(
                    "Policy reloaded with {} warning(s).",
                    report.warnings.len()
                ))];
                replies.extend(
                    report
                        .warnings
                        .iter()
                        .map(|w| ctx.notice(format!("Warning: {}", w))),
                );
                replies
            }
            Err(e) => {
                let mut replies =
                    vec![ctx.notice("Policy reload failed, keeping current policy.")];
                replies.extend(
                    e.messages()
                        .into_iter()
                        .map(|m| ctx.notice(format!("Error: {}", m))),
                );
                replies
            }
        }
    }
}

/// Lists the available command words.
pub struct HelpHandler {
    names: String,
}

impl CommandHandler for HelpHandler {
    fn handle(&self, ctx: &CommandContext<'_>) -> Vec<Command> {
        vec![ctx.notice(format!("Commands: {}", self.names))]
    }
}

/// Registry of private-message commands.
pub struct CommandRegistry {
    handlers: HashMap<&'static str, Box<dyn CommandHandler>>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    /// Create a registry with all built-in commands registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn CommandHandler>> = HashMap::new();

        handlers.insert("whoami", Box::new(WhoamiHandler));
        handlers.insert("rehash", Box::new(RehashHandler));

        let mut names: Vec<&str> = handlers.keys().copied().chain(["help"]).collect();
        names.sort_unstable();
        handlers.insert(
            "help",
            Box::new(HelpHandler {
                names: names.join(", "),
            }),
        );

        Self { handlers }
    }

    /// Registered command words, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Run the command named by the first word of `message`.
    pub fn dispatch(
        &self,
        service: &PolicyService,
        sender: &Hostmask,
        message: &str,
    ) -> Vec<Command> {
        let word = message.split(' ').next().unwrap_or_default();
        let ctx = CommandContext { service, sender };

        match self.handlers.get(word) {
            Some(handler) => {
                debug!(command = %word, sender = %sender, "Executing command");
                handler.handle(&ctx)
            }
            None => vec![ctx.notice(format!("Unknown Command: {}", message))],
        }
    }
}
