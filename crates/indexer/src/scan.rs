//! Source discovery and regex-based contract/pragma extraction (§4.2).
//!
//! The indexer does not parse Solidity — that belongs to the compiler. It only
//! needs contract *declarations*, which a couple of regexes extract far
//! cheaper than a full parse.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use walkdir::WalkDir;

static DECL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?P<abstract>abstract\s+)?(?P<kind>contract|library|interface)\s+(?P<name>[A-Za-z_$][A-Za-z0-9_$]*)").unwrap()
});

static PRAGMA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"pragma\s+solidity\s+([^;]+);").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDecl {
    pub name: String,
    pub is_library: bool,
    pub is_interface: bool,
    pub is_abstract: bool,
}

#[derive(Debug, Clone)]
pub struct ParsedSource {
    pub path: PathBuf,
    pub pragma_version: Option<String>,
    pub contracts: Vec<ContractDecl>,
}

/// Walks `src/`, `script/`, and every remapping directory under `root`,
/// deduplicating by longest-prefix normalization so a remapping that points
/// inside `src/` doesn't cause the same file to be indexed twice.
pub fn discover_sources(root: &Path, extra_dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = vec![root.join("src"), root.join("script")];
    roots.extend(extra_dirs.iter().cloned());

    // Longest-prefix normalization: drop any root that is itself contained in
    // another, keeping the outermost (shortest path component count) one.
    let mut normalized: Vec<PathBuf> = Vec::new();
    'outer: for candidate in roots {
        let Ok(canonical) = candidate.canonicalize() else { continue };
        for existing in &normalized {
            if canonical.starts_with(existing) {
                continue 'outer;
            }
        }
        normalized.retain(|existing: &PathBuf| !existing.starts_with(&canonical));
        normalized.push(canonical);
    }

    let mut files = BTreeSet::new();
    for dir in normalized {
        if !dir.exists() {
            continue;
        }
        for entry in WalkDir::new(&dir).into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() && entry.path().extension().and_then(|e| e.to_str()) == Some("sol") {
                files.insert(entry.path().to_path_buf());
            }
        }
    }
    files.into_iter().collect()
}

pub fn parse_source(contents: &str) -> (Option<String>, Vec<ContractDecl>) {
    let pragma = PRAGMA_RE.captures(contents).map(|c| c[1].trim().to_string());
    let contracts = DECL_RE
        .captures_iter(contents)
        .map(|caps| {
            let kind = &caps["kind"];
            ContractDecl {
                name: caps["name"].to_string(),
                is_library: kind == "library",
                is_interface: kind == "interface",
                is_abstract: caps.name("abstract").is_some(),
            }
        })
        .collect();
    (pragma, contracts)
}

/// Parses every path in `paths` across a `workers`-sized `rayon` pool (§4.2:
/// "N parsing workers consume a bounded file-path channel; results merge
/// under a single writer lock" — `rayon`'s work-stealing pool plays the role
/// of the worker set, and `collect()` is the single-writer merge point).
pub fn parse_sources_parallel(paths: Vec<PathBuf>, workers: usize) -> Vec<ParsedSource> {
    let workers = workers.max(1);
    let parse_all = || {
        paths
            .into_par_iter()
            .filter_map(|path| {
                let contents = std::fs::read_to_string(&path).ok()?;
                let (pragma_version, contracts) = parse_source(&contents);
                Some(ParsedSource { path, pragma_version, contracts })
            })
            .collect()
    };

    match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(parse_all),
        Err(_) => parse_all(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_source_finds_contract_and_pragma() {
        let src = "pragma solidity ^0.8.19;\ncontract Counter { function inc() public; }\n";
        let (pragma, decls) = parse_source(src);
        assert_eq!(pragma.as_deref(), Some("^0.8.19"));
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "Counter");
        assert!(!decls[0].is_library && !decls[0].is_interface && !decls[0].is_abstract);
    }

    #[test]
    fn parse_source_detects_abstract_library_interface() {
        let src = "abstract contract Base {}\nlibrary Lib {}\ninterface IFoo {}\n";
        let (_, decls) = parse_source(src);
        assert_eq!(decls.len(), 3);
        assert!(decls[0].is_abstract);
        assert!(decls[1].is_library);
        assert!(decls[2].is_interface);
    }

    #[test]
    fn parse_sources_parallel_covers_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut expected = Vec::new();
        for i in 0..10 {
            let path = dir.path().join(format!("C{i}.sol"));
            std::fs::write(&path, format!("contract C{i} {{}}")).unwrap();
            expected.push(path);
        }
        let parsed = parse_sources_parallel(expected.clone(), 4);
        assert_eq!(parsed.len(), 10);
        let names: BTreeSet<_> = parsed.iter().flat_map(|p| p.contracts.iter().map(|c| c.name.clone())).collect();
        assert_eq!(names.len(), 10);
    }
}
