//! Policy document codec.
//!
//! Decoding never fails on a well-formed JSON document: problems are recorded
//! on the returned [`Policy`] as errors (the whole document is rejected) or
//! warnings (a single entry is dropped). Only unreadable files and malformed
//! JSON surface as [`PolicyError`].

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Serializer, Value, json};
use tracing::debug;

use crate::error::PolicyError;
use crate::policy::{Channel, DEFAULT_PORT, Policy, Server, User, UserClass};

/// Top-level sections every document must carry.
const REQUIRED_SECTIONS: [&str; 4] = ["bot", "servers", "users", "channels"];

/// Sections holding lists of entries.
const LIST_SECTIONS: [&str; 3] = ["servers", "users", "channels"];

/// Identity keys required in the `bot` section.
const BOT_KEYS: [&str; 3] = ["nickname", "username", "realname"];

/// Masks that match everybody. A user with one of these would be opped
/// anywhere they are listed, so such entries are refused.
const INSECURE_MASKS: [&str; 4] = ["*", "*@*", "*!*", "*!*@*"];

/// Python-style truthiness, used for the `ssl` flag.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Render a JSON value for a diagnostic, without quotes around strings.
fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Decode a policy document.
///
/// The returned policy is invalid if a required section is missing or not of
/// the right shape, or if the bot identity is incomplete. Every such error is
/// collected before returning, per phase.
pub fn decode(document: &Value) -> Policy {
    let mut policy = Policy::default();
    let empty = Map::new();
    let root = document.as_object().unwrap_or(&empty);

    for section in REQUIRED_SECTIONS {
        match root.get(section) {
            None => {
                policy.push_error(format!("Policy document lacks '{}' section.", section));
                policy.invalidate();
            }
            Some(value) if LIST_SECTIONS.contains(&section) && !value.is_array() => {
                policy.push_error(format!("Section '{}' must be a list.", section));
                policy.invalidate();
            }
            Some(value) if section == "bot" && !value.is_object() => {
                policy.push_error("Section 'bot' must be an object.");
                policy.invalidate();
            }
            Some(_) => {}
        }
    }

    if !policy.is_valid() {
        return policy;
    }

    let bot = root.get("bot").and_then(Value::as_object).unwrap_or(&empty);
    let mut identity = Vec::with_capacity(BOT_KEYS.len());
    for key in BOT_KEYS {
        match bot.get(key) {
            Some(Value::String(value)) => identity.push(value.clone()),
            Some(_) => {
                policy.push_error(format!("Bot {} must be a string.", key));
                policy.invalidate();
            }
            None => {
                policy.push_error(format!("Missing bot {}.", key));
                policy.invalidate();
            }
        }
    }

    if !policy.is_valid() {
        return policy;
    }

    if let [nickname, username, realname] = identity.as_slice() {
        policy.nickname = nickname.clone();
        policy.username = username.clone();
        policy.realname = realname.clone();
    }

    for entry in entries(root, "servers") {
        decode_server(&mut policy, entry);
    }

    // Users first: channel operators are resolved against this registry.
    for entry in entries(root, "users") {
        decode_user(&mut policy, entry);
    }

    for entry in entries(root, "channels") {
        decode_channel(&mut policy, entry);
    }

    debug!(
        servers = policy.servers.len(),
        users = policy.users.len(),
        channels = policy.channels.len(),
        warnings = policy.warnings().len(),
        "Decoded policy document"
    );

    policy
}

fn entries<'a>(root: &'a Map<String, Value>, section: &str) -> &'a [Value] {
    root.get(section)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn decode_server(policy: &mut Policy, entry: &Value) {
    let Some(hostname) = entry.get("hostname").and_then(Value::as_str) else {
        policy.push_warning("Ignored server entry without a hostname.");
        return;
    };

    let port = match entry.get("port") {
        None => DEFAULT_PORT,
        Some(value) => match value.as_u64().and_then(|p| u16::try_from(p).ok()) {
            Some(port) => port,
            None => {
                policy.push_warning(format!(
                    "Ignored server entry '{}' with invalid port '{}'.",
                    hostname,
                    describe(value)
                ));
                return;
            }
        },
    };

    let secure = entry.get("ssl").is_some_and(is_truthy);
    policy.add_server(Server::new(hostname, port, secure));
}

fn decode_user(policy: &mut Policy, entry: &Value) {
    let Some(name) = entry.get("name").and_then(Value::as_str) else {
        policy.push_warning("Ignored user entry without a name.");
        return;
    };

    let Some(mask) = entry.get("mask").and_then(Value::as_str) else {
        policy.push_warning(format!("Ignored user '{}' without a mask.", name));
        return;
    };

    if INSECURE_MASKS.contains(&mask) {
        policy.push_warning(format!("Ignored user '{}' with insecure mask '{}'.", name, mask));
        return;
    }

    let class = match entry.get("class") {
        None => UserClass::default(),
        Some(value) => match value.as_str().map(str::parse::<UserClass>) {
            Some(Ok(class)) => class,
            _ => {
                policy.push_warning(format!(
                    "Ignoring invalid class '{}' for user '{}'.",
                    describe(value),
                    name
                ));
                UserClass::default()
            }
        },
    };

    policy.add_user(User::new(name, mask, class));
}

fn decode_channel(policy: &mut Policy, entry: &Value) {
    let Some(name) = entry.get("name").and_then(Value::as_str) else {
        policy.push_warning("Ignored channel entry without a name.");
        return;
    };

    let mut channel = Channel::new(name);

    match entry.get("operators") {
        None => {}
        Some(Value::Array(operators)) => {
            for operator in operators {
                match operator.as_str() {
                    Some(user) if policy.user(user).is_some() => {
                        channel.operators.insert(user.to_owned());
                    }
                    _ => policy.push_warning(format!(
                        "Unknown operator '{}' for channel '{}'.",
                        describe(operator),
                        name
                    )),
                }
            }
        }
        Some(_) => {
            policy.push_warning(format!(
                "Ignored operators of channel '{}': not a list.",
                name
            ));
        }
    }

    policy.add_channel(channel);
}

/// Encode a policy back into document form.
///
/// Every server, user and channel is written as-is, without re-validation.
pub fn encode(policy: &Policy) -> Value {
    let servers: Vec<Value> = policy
        .servers
        .iter()
        .map(|s| json!({ "hostname": s.hostname, "port": s.port, "ssl": s.secure }))
        .collect();

    let users: Vec<Value> = policy
        .users
        .values()
        .map(|u| json!({ "name": u.name, "mask": u.mask, "class": u.class.as_str() }))
        .collect();

    let channels: Vec<Value> = policy
        .channels
        .values()
        .map(|c| json!({ "name": c.name, "operators": c.operators }))
        .collect();

    json!({
        "bot": {
            "nickname": policy.nickname,
            "username": policy.username,
            "realname": policy.realname,
        },
        "servers": servers,
        "users": users,
        "channels": channels,
    })
}

/// Parse and decode a JSON policy document.
pub fn from_json_str(text: &str) -> Result<Policy, PolicyError> {
    let document: Value = serde_json::from_str(text)?;
    Ok(decode(&document))
}

/// Render a policy in its persisted form: four-space indentation, keys
/// sorted, trailing newline.
pub fn to_json_string(policy: &Policy) -> Result<String, PolicyError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    encode(policy).serialize(&mut ser)?;
    buf.push(b'\n');
    String::from_utf8(buf)
        .map_err(|e| PolicyError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Read and decode a policy file.
pub fn load_file(path: impl AsRef<Path>) -> Result<Policy, PolicyError> {
    let text = fs::read_to_string(path)?;
    from_json_str(&text)
}

/// Write a policy file in its persisted form.
pub fn save_file(path: impl AsRef<Path>, policy: &Policy) -> Result<(), PolicyError> {
    fs::write(path, to_json_string(policy)?)?;
    Ok(())
}
