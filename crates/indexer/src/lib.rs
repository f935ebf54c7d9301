//! C2 — contract indexer.
//!
//! Builds three lookup indexes over a project's source contracts and
//! compiled artifacts (§4.2): name → entity, `path:name` → entity, and
//! bytecode-hash → entity. The indexer never reaches onto the network or into
//! the EVM; it only reads files the `Builder` capability (§4.2) has already
//! produced.

pub mod builder;
pub mod error;
pub mod scan;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use alloy_primitives::B256;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use regex::Regex;
use treb_artifacts::Artifact;

pub use builder::{Builder, NoopBuilder};
pub use error::{IndexError, Result};
use scan::{discover_sources, parse_sources_parallel, ContractDecl};

/// A source-side entity, optionally linked to its compiled artifact (§3
/// "Contract (indexer view)").
#[derive(Debug, Clone)]
pub struct ContractRecord {
    pub name: String,
    pub source_path: PathBuf,
    pub pragma_version: Option<String>,
    pub is_library: bool,
    pub is_interface: bool,
    pub is_abstract: bool,
    pub artifact: Option<Artifact>,
    pub bytecode_hash: Option<B256>,
}

impl ContractRecord {
    /// The canonical `path:name` key for this record.
    pub fn key(&self) -> String {
        format!("{}:{}", self.source_path.display(), self.name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub include_libraries: bool,
    pub include_interfaces: bool,
    pub include_abstract: bool,
    pub name_regex: Option<Regex>,
    pub path_regex: Option<Regex>,
}

impl Filter {
    /// The default filter includes every contract kind and applies no name
    /// or path restriction.
    pub fn all() -> Self {
        Self { include_libraries: true, include_interfaces: true, include_abstract: true, name_regex: None, path_regex: None }
    }

    fn matches(&self, record: &ContractRecord) -> bool {
        if record.is_library && !self.include_libraries {
            return false;
        }
        if record.is_interface && !self.include_interfaces {
            return false;
        }
        if record.is_abstract && !self.include_abstract {
            return false;
        }
        if let Some(re) = &self.name_regex {
            if !re.is_match(&record.name) {
                return false;
            }
        }
        if let Some(re) = &self.path_regex {
            if !re.is_match(&record.source_path.to_string_lossy()) {
                return false;
            }
        }
        true
    }
}

/// How many parsing workers the indexer's scan stage uses.
const DEFAULT_WORKERS: usize = 4;

#[derive(Default)]
struct Indexes {
    by_key: HashMap<String, usize>,
    by_name: HashMap<String, Vec<usize>>,
    by_bytecode_hash: HashMap<B256, usize>,
}

/// Holds every indexed contract for one project root. Cheap to query
/// concurrently (`parking_lot::RwLock` readers never block each other);
/// rebuilt wholesale by [`Indexer::index`].
pub struct Indexer {
    project_root: PathBuf,
    records: RwLock<Vec<ContractRecord>>,
    indexes: RwLock<Indexes>,
}

impl Indexer {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self { project_root: project_root.into(), records: RwLock::new(Vec::new()), indexes: RwLock::new(Indexes::default()) }
    }

    /// Walks `src/`, `script/` and `extra_dirs` (remappings), triggers a
    /// compile through `builder`, then reads every artifact JSON under
    /// `artifacts_dir` and links it to its source declaration (§4.2 tie-break
    /// rule: exact `path:name` first, substring fallback second).
    pub fn index(&self, extra_dirs: &[PathBuf], artifacts_dir: &Path, builder: &dyn Builder) -> Result<()> {
        builder.compile(&self.project_root).map_err(|source| IndexError::Build { root: self.project_root.clone(), source })?;

        let sources = discover_sources(&self.project_root, extra_dirs);
        let parsed = parse_sources_parallel(sources, DEFAULT_WORKERS);

        let artifacts = load_artifacts(artifacts_dir)?;

        let mut records = Vec::new();
        for source in parsed {
            for decl in source.contracts {
                let artifact = link_artifact(&source.path, &decl, &artifacts);
                let bytecode_hash = artifact.as_ref().and_then(|a| a.bytecode_hash());
                records.push(ContractRecord {
                    name: decl.name,
                    source_path: source.path.clone(),
                    pragma_version: source.pragma_version.clone(),
                    is_library: decl.is_library,
                    is_interface: decl.is_interface,
                    is_abstract: decl.is_abstract,
                    artifact,
                    bytecode_hash,
                });
            }
        }

        let mut indexes = Indexes::default();
        for (i, record) in records.iter().enumerate() {
            indexes.by_key.insert(record.key(), i);
            indexes.by_name.entry(record.name.clone()).or_default().push(i);
            if let Some(hash) = record.bytecode_hash {
                indexes.by_bytecode_hash.entry(hash).or_insert(i);
            }
        }

        *self.records.write() = records;
        *self.indexes.write() = indexes;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<ContractRecord> {
        if key.contains(':') {
            self.get_by_artifact(key)
        } else {
            self.get_by_name(key).ok().filter(|v| v.len() == 1).map(|mut v| v.remove(0))
        }
    }

    /// Name-only lookup; succeeds only when the name is unique project-wide,
    /// otherwise returns every candidate for interactive selection (§4.2).
    pub fn get_by_name(&self, name: &str) -> Result<Vec<ContractRecord>> {
        let records = self.records.read();
        let indexes = self.indexes.read();
        match indexes.by_name.get(name) {
            Some(idxs) if !idxs.is_empty() => Ok(idxs.iter().map(|&i| records[i].clone()).collect()),
            _ => Err(IndexError::NotFound(name.to_string())),
        }
    }

    pub fn get_by_artifact(&self, reference: &str) -> Option<ContractRecord> {
        if let Some((path, name)) = reference.rsplit_once(':') {
            let key = format!("{path}:{name}");
            let records = self.records.read();
            let indexes = self.indexes.read();
            return indexes.by_key.get(&key).map(|&i| records[i].clone());
        }
        self.get_by_name(reference).ok().and_then(|mut v| if v.len() == 1 { Some(v.remove(0)) } else { None })
    }

    pub fn get_by_bytecode_hash(&self, hash: B256) -> Option<ContractRecord> {
        let records = self.records.read();
        let indexes = self.indexes.read();
        indexes.by_bytecode_hash.get(&hash).map(|&i| records[i].clone())
    }

    pub fn search(&self, substring: &str) -> Vec<ContractRecord> {
        let needle = substring.to_lowercase();
        self.records.read().iter().filter(|r| r.name.to_lowercase().contains(&needle)).cloned().collect()
    }

    pub fn query(&self, filter: &Filter) -> Vec<ContractRecord> {
        self.records.read().iter().filter(|r| filter.matches(r)).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// §4.2 tie-break: exact `"<path>:<name>"` first; otherwise match by name
/// where either side's path contains the other's (diagnostic fallback, lossy
/// per Design Note §9(ii)); otherwise unlinked.
fn link_artifact(source_path: &Path, decl: &ContractDecl, artifacts: &[(String, Artifact)]) -> Option<Artifact> {
    let exact_key = format!("{}:{}", source_path.display(), decl.name);
    if let Some((_, artifact)) = artifacts.iter().find(|(key, _)| *key == exact_key) {
        return Some(artifact.clone());
    }

    let source_str = source_path.to_string_lossy();
    artifacts
        .iter()
        .find(|(key, _)| {
            let Some((artifact_path, artifact_name)) = key.rsplit_once(':') else { return false };
            artifact_name == decl.name && (artifact_path.contains(source_str.as_ref()) || source_str.contains(artifact_path))
        })
        .map(|(_, artifact)| artifact.clone())
}

/// Reads every `*.json` artifact under `artifacts_dir`, keyed by the
/// `path:name` the compiler itself recorded in
/// `metadata.settings.compilationTarget`, falling back to the conventional
/// `out/<File>.sol/<Name>.json` directory shape when metadata is absent.
fn load_artifacts(artifacts_dir: &Path) -> Result<Vec<(String, Artifact)>> {
    let mut out = Vec::new();
    if !artifacts_dir.exists() {
        return Ok(out);
    }
    for entry in walkdir::WalkDir::new(artifacts_dir).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() || entry.path().extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let contents = std::fs::read_to_string(entry.path())?;
        let value: serde_json::Value = serde_json::from_str(&contents)?;
        let artifact = Artifact::from_json(&value)?;
        let key = match artifact.compilation_target() {
            Some((path, name)) => format!("{path}:{name}"),
            None => {
                let name = entry.path().file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
                let source_dir = entry.path().parent().and_then(|p| p.file_name()).map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
                format!("{source_dir}:{name}")
            }
        };
        out.push((key, artifact));
    }
    Ok(out)
}

/// Process-wide singleton cache keyed by canonicalized project root (Design
/// Note "Global mutable state"). Tests must call [`reset_global`] between
/// invocations that reuse the same root.
static GLOBAL: OnceCell<RwLock<HashMap<PathBuf, Arc<Indexer>>>> = OnceCell::new();

fn global_map() -> &'static RwLock<HashMap<PathBuf, Arc<Indexer>>> {
    GLOBAL.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Returns the cached `Indexer` for `project_root`, creating one (empty,
/// un-indexed) if this is the first call for that root.
pub fn global(project_root: impl Into<PathBuf>) -> Arc<Indexer> {
    let root = project_root.into();
    if let Some(existing) = global_map().read().get(&root) {
        return Arc::clone(existing);
    }
    let mut map = global_map().write();
    Arc::clone(map.entry(root.clone()).or_insert_with(|| Arc::new(Indexer::new(root))))
}

/// Drops every cached indexer. Required between tests that reuse a project
/// root, since the singleton otherwise outlives any one test.
pub fn reset_global() {
    global_map().write().clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_project(dir: &Path) {
        std::fs::create_dir_all(dir.join("src")).unwrap();
        std::fs::write(dir.join("src/Counter.sol"), "pragma solidity ^0.8.19;\ncontract Counter { function inc() public; }\n").unwrap();
        std::fs::create_dir_all(dir.join("out/Counter.sol")).unwrap();
        std::fs::write(
            dir.join("out/Counter.sol/Counter.json"),
            serde_json::json!({
                "abi": [],
                "bytecode": {"object": "6080604052", "linkReferences": {}},
                "methodIdentifiers": {},
                "metadata": {"settings": {"compilationTarget": {"src/Counter.sol": "Counter"}}, "compiler": {"version": "0.8.19"}}
            })
            .to_string(),
        )
        .unwrap();
    }

    #[test]
    fn s1_index_links_artifact_to_source() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path());

        let indexer = Indexer::new(dir.path());
        indexer.index(&[], &dir.path().join("out"), &NoopBuilder).unwrap();

        let key = format!("{}:Counter", dir.path().join("src/Counter.sol").display());
        let record = indexer.get_by_artifact(&key).expect("linked record");
        assert_eq!(record.name, "Counter");
        assert!(!record.is_library);
        assert!(record.bytecode_hash.is_some());
    }

    #[test]
    fn name_only_lookup_requires_uniqueness() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.join("src")).unwrap();
        std::fs::write(dir.path().join("src/A.sol"), "contract Dup {}").unwrap();
        std::fs::write(dir.path().join("src/B.sol"), "contract Dup {}").unwrap();

        let indexer = Indexer::new(dir.path());
        indexer.index(&[], &dir.path().join("out"), &NoopBuilder).unwrap();

        assert!(indexer.get("Dup").is_none());
        assert_eq!(indexer.get_by_name("Dup").unwrap().len(), 2);
    }

    #[test]
    fn bytecode_hash_lookup_is_unique() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path());
        let indexer = Indexer::new(dir.path());
        indexer.index(&[], &dir.path().join("out"), &NoopBuilder).unwrap();

        let record = indexer.get_by_artifact(&format!("{}:Counter", dir.path().join("src/Counter.sol").display())).unwrap();
        let hash = record.bytecode_hash.unwrap();
        let found = indexer.get_by_bytecode_hash(hash).unwrap();
        assert_eq!(found.name, "Counter");
    }

    #[test]
    fn query_filters_by_kind_and_regex() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.join("src")).unwrap();
        std::fs::write(dir.path().join("src/Mixed.sol"), "contract Foo {}\nlibrary FooLib {}\ninterface IFoo {}\n").unwrap();

        let indexer = Indexer::new(dir.path());
        indexer.index(&[], &dir.path().join("out"), &NoopBuilder).unwrap();

        let mut filter = Filter::all();
        filter.include_libraries = false;
        filter.include_interfaces = false;
        let results = indexer.query(&filter);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Foo");
    }

    #[test]
    fn global_singleton_reuses_indexer_per_root() {
        reset_global();
        let dir = tempfile::tempdir().unwrap();
        let a = global(dir.path());
        let b = global(dir.path());
        assert!(Arc::ptr_eq(&a, &b));
        reset_global();
    }
}
