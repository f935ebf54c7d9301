//! Scans a script's doc comment for `@custom:env {<type>[:optional]} <name>
//! <description>` tags (§4.6).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{ParamDecl, ParamType};

static ENV_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@custom:env\s+\{([a-zA-Z0-9_]+)(:optional)?\}\s+(\S+)\s*(.*)").unwrap());

pub fn scan_params(doc_comment: &str) -> Vec<ParamDecl> {
    doc_comment
        .lines()
        .filter_map(|line| ENV_TAG_RE.captures(line))
        .filter_map(|captures| {
            let ty = ParamType::parse(&captures[1])?;
            Some(ParamDecl { ty, optional: captures.get(2).is_some(), name: captures[3].to_string(), description: captures[4].trim().to_string() })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_required_and_optional_params() {
        let doc = "/// @custom:env {address} owner the initial owner\n/// @custom:env {uint256:optional} supply the initial supply\n";
        let decls = scan_params(doc);
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].name, "owner");
        assert!(!decls[0].optional);
        assert_eq!(decls[1].name, "supply");
        assert!(decls[1].optional);
    }

    #[test]
    fn ignores_unsupported_type() {
        let doc = "/// @custom:env {weird} x description\n";
        assert!(scan_params(doc).is_empty());
    }

    #[test]
    fn recognizes_meta_types() {
        let doc = "/// @custom:env {sender} admin the admin signer\n";
        let decls = scan_params(doc);
        assert_eq!(decls[0].ty, ParamType::Sender);
        assert!(decls[0].ty.is_meta());
    }
}
