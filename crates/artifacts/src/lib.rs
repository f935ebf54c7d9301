//! C1 — artifact model.
//!
//! A typed, read-only view over the external compiler's JSON output
//! (`spec.md` §4.1). Nothing in this crate compiles Solidity; it only parses
//! whatever the `Builder` capability (§4.2) already produced on disk.

use std::collections::BTreeMap;

use alloy_json_abi::JsonAbi;
use alloy_primitives::B256;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A linker placeholder is `__$` + 34 hex chars (a truncated keccak of the
/// fully qualified library name) + `$__`, occupying the 20-byte slot the
/// library's address will eventually fill.
static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"__\$[0-9a-fA-F]{34}\$__").unwrap());

/// One link reference: a library slot at `start..start+length` (bytes) in the
/// creation bytecode, keyed by the library's source path and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReferenceOffset {
    pub start: usize,
    pub length: usize,
}

pub type LinkReferences = BTreeMap<String, BTreeMap<String, Vec<LinkReferenceOffset>>>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BytecodeObject {
    /// Hex-encoded creation (or runtime) bytecode, no `0x` prefix, possibly
    /// still containing `__$...$__` link placeholders.
    pub object: String,
    #[serde(rename = "linkReferences", default)]
    pub link_references: LinkReferences,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompilationTarget {
    #[serde(flatten)]
    pub paths: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompilerInfo {
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataSettings {
    #[serde(rename = "compilationTarget", default)]
    pub compilation_target: CompilationTarget,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub settings: MetadataSettings,
    #[serde(default)]
    pub compiler: CompilerInfo,
}

/// A single compiled contract, as produced by the external compiler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(default)]
    pub abi: Option<JsonAbi>,
    #[serde(default)]
    pub bytecode: Option<BytecodeObject>,
    #[serde(rename = "deployedBytecode", default)]
    pub deployed_bytecode: Option<BytecodeObject>,
    #[serde(rename = "methodIdentifiers", default)]
    pub method_identifiers: BTreeMap<String, String>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(rename = "rawMetadata", default)]
    pub raw_metadata: Option<String>,
}

impl Artifact {
    pub fn from_json(value: &Value) -> serde_json::Result<Self> {
        serde_json::from_value(value.clone())
    }

    /// Normalizes unresolved linker placeholders in `hex` to zero bytes (one
    /// `00` pair per hex-nibble-pair of the placeholder) so two artifacts that
    /// differ only in *which* library address will eventually fill a slot
    /// still hash identically before linking.
    fn normalize_placeholders(hex: &str) -> String {
        PLACEHOLDER_RE.replace_all(hex, |caps: &regex::Captures<'_>| "0".repeat(caps[0].len())).into_owned()
    }

    /// keccak256 over the creation bytecode, placeholders zeroed. Returns
    /// `None` if no creation bytecode is present (e.g. interface-only
    /// artifacts).
    pub fn bytecode_hash(&self) -> Option<B256> {
        let object = &self.bytecode.as_ref()?.object;
        if object.is_empty() {
            return None;
        }
        let normalized = Self::normalize_placeholders(object);
        let bytes = hex::decode(normalized.trim_start_matches("0x")).ok()?;
        Some(alloy_primitives::keccak256(bytes))
    }

    /// keccak256 over the normalized source metadata: the raw metadata blob
    /// when the compiler emitted one, otherwise the re-serialized `metadata`
    /// object (stable key order via `BTreeMap`).
    pub fn source_hash(&self) -> Option<B256> {
        if let Some(raw) = &self.raw_metadata {
            return Some(alloy_primitives::keccak256(raw.as_bytes()));
        }
        let metadata = self.metadata.as_ref()?;
        let serialized = serde_json::to_vec(metadata).ok()?;
        Some(alloy_primitives::keccak256(serialized))
    }

    /// Every `path:name` library this artifact's creation bytecode still
    /// needs linked, flattened from `bytecode.linkReferences`.
    pub fn required_libraries(&self) -> Vec<String> {
        let Some(bytecode) = &self.bytecode else { return Vec::new() };
        let mut out = Vec::new();
        for (path, libs) in &bytecode.link_references {
            for name in libs.keys() {
                out.push(format!("{path}:{name}"));
            }
        }
        out
    }

    /// `true` if the creation bytecode still contains unresolved linker
    /// placeholders.
    pub fn is_unlinked(&self) -> bool {
        self.bytecode.as_ref().map(|b| PLACEHOLDER_RE.is_match(&b.object)).unwrap_or(false)
    }

    pub fn compiler_version(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.compiler.version.as_str())
    }

    /// The `path:name` the compiler itself believes this artifact targets,
    /// from `metadata.settings.compilationTarget` (a single-entry map).
    pub fn compilation_target(&self) -> Option<(String, String)> {
        let metadata = self.metadata.as_ref()?;
        metadata.settings.compilation_target.paths.iter().next().map(|(p, n)| (p.clone(), n.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact_json(object: &str, placeholder_free: bool) -> Value {
        let object = if placeholder_free {
            object.to_string()
        } else {
            format!("{object}__$1234567890abcdef1234567890abcdef12$__")
        };
        serde_json::json!({
            "abi": [],
            "bytecode": { "object": object, "linkReferences": {} },
            "methodIdentifiers": {},
        })
    }

    #[test]
    fn bytecode_hash_normalizes_placeholders() {
        let a = Artifact::from_json(&artifact_json("6080604052", false)).unwrap();
        let b = Artifact::from_json(&artifact_json("6080604052", false)).unwrap();
        assert_eq!(a.bytecode_hash(), b.bytecode_hash());
    }

    #[test]
    fn bytecode_hash_differs_for_different_code() {
        let a = Artifact::from_json(&artifact_json("6080604052", true)).unwrap();
        let b = Artifact::from_json(&artifact_json("6080604053", true)).unwrap();
        assert_ne!(a.bytecode_hash(), b.bytecode_hash());
    }

    #[test]
    fn required_libraries_flattens_link_references() {
        let json = serde_json::json!({
            "bytecode": {
                "object": "6080",
                "linkReferences": {
                    "src/Lib.sol": { "Lib": [{"start": 10, "length": 20}] }
                }
            }
        });
        let artifact = Artifact::from_json(&json).unwrap();
        assert_eq!(artifact.required_libraries(), vec!["src/Lib.sol:Lib".to_string()]);
    }

    #[test]
    fn is_unlinked_detects_placeholder() {
        let artifact = Artifact::from_json(&artifact_json("6080", false)).unwrap();
        assert!(artifact.is_unlinked());
        let linked = Artifact::from_json(&artifact_json("6080", true)).unwrap();
        assert!(!linked.is_unlinked());
    }
}
