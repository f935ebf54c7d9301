//! Ties scanning, validation, and meta-type resolution together into the
//! `name → string` map the runner's env expects (§4.6).

use std::collections::HashMap;

use crate::error::{ParamError, Result};
use crate::meta::{MetaResolver, ResolveOutcome, Selector};
use crate::types::ParamDecl;
use crate::validate::validate_scalar;

pub struct ParamParser<'a> {
    pub resolver: &'a dyn MetaResolver,
    pub selector: Option<&'a dyn Selector>,
    pub non_interactive: bool,
}

impl<'a> ParamParser<'a> {
    /// Resolves every declared parameter against `env`. Non-interactive mode
    /// treats any unresolved required parameter as fatal (§4.11 step 2); in
    /// interactive mode, ambiguous meta-type matches go to the selector.
    pub fn resolve_params(&self, declared: &[ParamDecl], env: &HashMap<String, String>) -> Result<HashMap<String, String>> {
        let mut resolved = HashMap::new();
        for decl in declared {
            let raw = env.get(&decl.name).cloned().unwrap_or_default();

            if raw.is_empty() {
                if decl.optional {
                    continue;
                }
                return Err(ParamError::MissingParameter(decl.name.clone()));
            }

            if decl.ty.is_meta() {
                let value = self.resolve_meta(decl, &raw)?;
                resolved.insert(decl.name.clone(), value);
            } else {
                validate_scalar(&decl.name, decl.ty, &raw)?;
                resolved.insert(decl.name.clone(), raw);
            }
        }
        Ok(resolved)
    }

    fn resolve_meta(&self, decl: &ParamDecl, raw: &str) -> Result<String> {
        match self.resolver.resolve(decl.ty, raw) {
            ResolveOutcome::Resolved(value) => Ok(value),
            ResolveOutcome::Candidates(candidates) => {
                if self.non_interactive {
                    return Err(ParamError::InvalidParameter { name: decl.name.clone(), reason: format!("{} candidates match {raw:?}", candidates.len()) });
                }
                match self.selector.and_then(|s| s.select(&candidates)) {
                    Some(value) => Ok(value),
                    None => Err(ParamError::InvalidParameter { name: decl.name.clone(), reason: "no candidate selected".to_string() }),
                }
            }
            ResolveOutcome::NotFound => Err(ParamError::InvalidParameter { name: decl.name.clone(), reason: format!("{raw:?} did not resolve") }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParamType;

    struct FixedResolver(ResolveOutcomeKind);
    enum ResolveOutcomeKind {
        Resolved,
        Candidates,
        NotFound,
    }
    impl MetaResolver for FixedResolver {
        fn resolve(&self, _meta_type: ParamType, query: &str) -> ResolveOutcome {
            match self.0 {
                ResolveOutcomeKind::Resolved => ResolveOutcome::Resolved(query.to_string()),
                ResolveOutcomeKind::Candidates => ResolveOutcome::Candidates(vec!["a".into(), "b".into()]),
                ResolveOutcomeKind::NotFound => ResolveOutcome::NotFound,
            }
        }
    }

    fn decl(ty: ParamType, optional: bool) -> ParamDecl {
        ParamDecl { ty, optional, name: "p".to_string(), description: String::new() }
    }

    #[test]
    fn missing_required_param_is_fatal() {
        let resolver = FixedResolver(ResolveOutcomeKind::NotFound);
        let parser = ParamParser { resolver: &resolver, selector: None, non_interactive: true };
        let err = parser.resolve_params(&[decl(ParamType::String, false)], &HashMap::new()).unwrap_err();
        assert!(matches!(err, ParamError::MissingParameter(_)));
    }

    #[test]
    fn missing_optional_param_is_skipped() {
        let resolver = FixedResolver(ResolveOutcomeKind::NotFound);
        let parser = ParamParser { resolver: &resolver, selector: None, non_interactive: true };
        let result = parser.resolve_params(&[decl(ParamType::String, true)], &HashMap::new()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn ambiguous_meta_type_is_fatal_non_interactive() {
        let resolver = FixedResolver(ResolveOutcomeKind::Candidates);
        let mut env = HashMap::new();
        env.insert("p".to_string(), "deployer".to_string());
        let parser = ParamParser { resolver: &resolver, selector: None, non_interactive: true };
        let err = parser.resolve_params(&[decl(ParamType::Sender, false)], &env).unwrap_err();
        assert!(matches!(err, ParamError::InvalidParameter { .. }));
    }

    #[test]
    fn scalar_validation_rejects_bad_address() {
        let resolver = FixedResolver(ResolveOutcomeKind::NotFound);
        let mut env = HashMap::new();
        env.insert("p".to_string(), "not-an-address".to_string());
        let parser = ParamParser { resolver: &resolver, selector: None, non_interactive: true };
        assert!(parser.resolve_params(&[decl(ParamType::Address, false)], &env).is_err());
    }
}
