//! Channel name helpers.

/// Characters that introduce a channel name (RFC 2811).
pub const CHANNEL_PREFIXES: [char; 4] = ['#', '&', '+', '!'];

/// Returns true if `name` looks like a channel rather than a nickname.
#[inline]
pub fn is_channel_name(name: &str) -> bool {
    name.starts_with(CHANNEL_PREFIXES)
}
