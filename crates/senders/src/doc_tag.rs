//! Parses the `@custom:senders` documentation tag (§4.5): a comma-separated
//! list of sender names in the script's natspec header.

use once_cell::sync::Lazy;
use regex::Regex;

static SENDERS_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@custom:senders\s+([^\n]+)").unwrap());

pub fn parse_senders_tag(doc_comment: &str) -> Vec<String> {
    let Some(captures) = SENDERS_TAG_RE.captures(doc_comment) else { return Vec::new() };
    captures[1].split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_names() {
        let doc = "/// @custom:senders deployer, admin\ncontract Deploy {}";
        assert_eq!(parse_senders_tag(doc), vec!["deployer".to_string(), "admin".to_string()]);
    }

    #[test]
    fn missing_tag_yields_empty_list() {
        assert!(parse_senders_tag("contract Deploy {}").is_empty());
    }
}
