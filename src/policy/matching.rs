//! Permission engine: wildcard hostmask matching.
//!
//! Matching is stateless. Whether a match leads to an op is decided by the
//! caller, which also checks the bot's own channel state first.

use crate::hostmask::Hostmask;
use crate::policy::{Policy, User};

/// Shell-glob match of `text` against `pattern`.
///
/// - `*` matches any run of characters, including none
/// - `?` matches exactly one character
///
/// Every other character, `[` included, matches itself. Comparison is
/// case-sensitive.
///
/// ```
/// use opbot::policy::wildcard_match;
///
/// assert!(wildcard_match("*!*@*.example.com", "nick!user@host.example.com"));
/// assert!(wildcard_match("te?t", "test"));
/// assert!(!wildcard_match("alice!*@*", "bob!user@host"));
/// ```
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let mut p = 0;
    let mut t = 0;
    // Pattern index of the last `*` seen, and the text index it was tried at.
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, t));
            p += 1;
        } else if let Some((star_p, star_t)) = star {
            p = star_p + 1;
            t = star_t + 1;
            star = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }

    p == pattern.len()
}

/// Every operator of `channel` whose pattern matches `hostmask`.
///
/// A channel absent from the policy yields no candidates: the bot can be
/// forced into channels it does not manage. Operator names that no longer
/// resolve to a user are skipped. All matches are returned, in no particular
/// precedence.
pub fn operator_candidates<'a>(
    policy: &'a Policy,
    hostmask: &Hostmask,
    channel: &str,
) -> Vec<&'a User> {
    let Some(channel) = policy.channel(channel) else {
        return Vec::new();
    };

    let rendered = hostmask.to_string();
    channel
        .operators
        .iter()
        .filter_map(|name| policy.user(name))
        .filter(|user| user.matches(&rendered))
        .collect()
}

/// Every registered user whose pattern matches `hostmask`.
pub fn user_matches<'a>(policy: &'a Policy, hostmask: &Hostmask) -> Vec<&'a User> {
    let rendered = hostmask.to_string();
    policy
        .users
        .values()
        .filter(|user| user.matches(&rendered))
        .collect()
}
