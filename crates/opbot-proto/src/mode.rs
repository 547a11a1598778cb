//! Channel mode string expansion.
//!
//! A single MODE line may carry several changes (`+o-v alice bob`). The
//! changes are expanded one letter at a time, consuming an argument for each
//! letter that takes a parameter.

/// Channel modes that take a parameter both when set and when unset.
const PARAM_ALWAYS: &str = "beIkovhqa";

/// Channel modes that take a parameter only when set.
const PARAM_ON_SET: &str = "lfj";

/// One expanded mode change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeChange {
    /// `true` for `+`, `false` for `-`.
    pub added: bool,
    /// Mode letter.
    pub mode: char,
    /// Parameter, for modes that take one.
    pub arg: Option<String>,
}

fn takes_param(mode: char, added: bool) -> bool {
    PARAM_ALWAYS.contains(mode) || (added && PARAM_ON_SET.contains(mode))
}

/// Expand a mode string and its arguments into individual changes.
///
/// Letters before any `+`/`-` are treated as additions. A parameterised
/// letter with no argument left is reported with `arg: None`.
pub fn parse_mode_changes(modes: &str, args: &[String]) -> Vec<ModeChange> {
    let mut args = args.iter();
    let mut added = true;
    let mut changes = Vec::new();

    for c in modes.chars() {
        match c {
            '+' => added = true,
            '-' => added = false,
            mode => {
                let arg = if takes_param(mode, added) {
                    args.next().cloned()
                } else {
                    None
                };
                changes.push(ModeChange { added, mode, arg });
            }
        }
    }

    changes
}
