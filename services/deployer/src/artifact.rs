//! Compiled contract artifacts
//!
//! Reads Hardhat-style artifact JSON (`<dir>/<source>.sol/<Name>.json`) and
//! links library addresses into creation bytecode.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use ethers::abi::Abi;
use serde::Deserialize;
use tracing::debug;
use types::Address;

use crate::error::NetworkError;

/// Byte range of a library placeholder in creation bytecode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LinkOffset {
    pub start: usize,
    pub length: usize,
}

/// source file -> library name -> placeholder offsets
pub type LinkReferences = BTreeMap<String, BTreeMap<String, Vec<LinkOffset>>>;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    #[serde(default)]
    pub source_name: String,
    pub abi: Abi,
    /// Hex creation bytecode, possibly holding `__$…$__` placeholders
    pub bytecode: String,
    #[serde(default)]
    pub link_references: LinkReferences,
}

impl Artifact {
    pub fn from_file(path: &Path) -> Result<Self, NetworkError> {
        let content = fs::read_to_string(path).map_err(|e| NetworkError::InvalidArtifact {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| NetworkError::InvalidArtifact {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Library names the bytecode must be linked against
    pub fn required_libraries(&self) -> BTreeSet<&str> {
        self.link_references
            .values()
            .flat_map(|libraries| libraries.keys().map(String::as_str))
            .collect()
    }

    /// Creation bytecode with every placeholder replaced
    ///
    /// Libraries may be keyed by bare name or by `<source>:<name>`. A
    /// missing library, or one supplied that the contract never references,
    /// is an error.
    pub fn link(&self, libraries: &BTreeMap<String, Address>) -> Result<Vec<u8>, NetworkError> {
        let link_error = |reason: String| NetworkError::Linking {
            contract: self.contract_name.clone(),
            reason,
        };

        let mut code = self
            .bytecode
            .strip_prefix("0x")
            .unwrap_or(&self.bytecode)
            .to_string();
        if code.is_empty() {
            return Err(link_error(
                "artifact has no bytecode (abstract contract or interface)".to_string(),
            ));
        }

        let mut used = BTreeSet::new();
        for (source, references) in &self.link_references {
            for (library, offsets) in references {
                let qualified = format!("{}:{}", source, library);
                let (key, address) = match libraries
                    .get_key_value(&qualified)
                    .or_else(|| libraries.get_key_value(library))
                {
                    Some(found) => found,
                    None => return Err(link_error(format!("missing library {}", qualified))),
                };
                used.insert(key.clone());

                let replacement = hex::encode(address.as_bytes());
                for offset in offsets {
                    let begin = offset.start * 2;
                    let end = begin + offset.length * 2;
                    if offset.length != 20 || end > code.len() {
                        return Err(link_error(format!(
                            "bad link offset {}+{} for {}",
                            offset.start, offset.length, qualified
                        )));
                    }
                    code.replace_range(begin..end, &replacement);
                }
                debug!(
                    "Linked {} into {} at {} sites",
                    qualified,
                    self.contract_name,
                    offsets.len()
                );
            }
        }

        if let Some(unused) = libraries.keys().find(|name| !used.contains(*name)) {
            return Err(link_error(format!("{} is not one of its libraries", unused)));
        }

        hex::decode(&code)
            .map_err(|e| link_error(format!("bytecode is not valid hex after linking: {}", e)))
    }
}

/// Artifact directory lookup by contract name
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve `Name` or `path/To.sol:Name` to an artifact file
    pub fn find(&self, name: &str) -> Result<PathBuf, NetworkError> {
        if let Some((source, contract)) = name.rsplit_once(':') {
            let path = self.dir.join(source).join(format!("{}.json", contract));
            if path.is_file() {
                return Ok(path);
            }
            return Err(self.not_found(name));
        }

        let pattern = format!("{}/**/{}.json", self.dir.display(), name);
        let mut candidates: Vec<PathBuf> = glob::glob(&pattern)
            .map_err(|e| NetworkError::InvalidArtifact {
                path: pattern.clone(),
                reason: e.to_string(),
            })?
            .filter_map(Result::ok)
            .filter(|path| !path.components().any(|c| c.as_os_str() == "build-info"))
            .collect();

        match candidates.len() {
            0 => Err(self.not_found(name)),
            1 => Ok(candidates.remove(0)),
            _ => Err(NetworkError::AmbiguousArtifact {
                name: name.to_string(),
                candidates: candidates
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect(),
            }),
        }
    }

    pub fn load(&self, name: &str) -> Result<Artifact, NetworkError> {
        let path = self.find(name)?;
        debug!("Loading artifact {} from {:?}", name, path);
        Artifact::from_file(&path)
    }

    fn not_found(&self, name: &str) -> NetworkError {
        NetworkError::ArtifactNotFound {
            name: name.to_string(),
            dir: self.dir.display().to_string(),
        }
    }
}
