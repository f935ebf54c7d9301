//! `${VAR}` expansion over raw TOML text, performed before figment ever
//! deserializes it (§6: "performed by the runtime config layer before
//! builder sees values").

use once_cell::sync::Lazy;
use regex::Regex;

static VAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// Replaces every `${VAR}` occurrence with the value of the environment
/// variable `VAR`, looked up through `lookup`. Unresolved references are left
/// untouched so a missing optional var doesn't corrupt unrelated TOML.
pub fn expand_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    VAR_RE
        .replace_all(input, |caps: &regex::Captures| {
            let name = &caps[1];
            lookup(name).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

pub fn expand(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_known_variable() {
        let out = expand_with("key = \"${FOO}\"", |name| {
            if name == "FOO" {
                Some("bar".to_string())
            } else {
                None
            }
        });
        assert_eq!(out, "key = \"bar\"");
    }

    #[test]
    fn leaves_unresolved_reference_untouched() {
        let out = expand_with("key = \"${MISSING}\"", |_| None);
        assert_eq!(out, "key = \"${MISSING}\"");
    }

    #[test]
    fn expands_multiple_occurrences() {
        let out = expand_with("a = \"${X}\" b = \"${X}\"", |_| Some("v".to_string()));
        assert_eq!(out, "a = \"v\" b = \"v\"");
    }
}
