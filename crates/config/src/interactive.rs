//! `TREB_NON_INTERACTIVE`, `CI`, `NO_COLOR` (§6): any of these disables
//! interactive prompting; the first two also disable color.

pub fn non_interactive() -> bool {
    env_flag("TREB_NON_INTERACTIVE") || env_flag("CI")
}

pub fn color_disabled() -> bool {
    non_interactive() || env_flag("NO_COLOR")
}

fn env_flag(name: &str) -> bool {
    match std::env::var(name) {
        Ok(value) => !value.is_empty() && value != "0" && value.to_lowercase() != "false",
        Err(_) => false,
    }
}
