//! File-level entry points: parse, validate, and batch over many documents.

use crate::config::FirmwareLimits;
use crate::error::{KeymetaError, KmResult};
use crate::issue::Validated;
use crate::keycodes::KeycodeRegistry;
use crate::metadata::{KeyboardMetadata, Normalizer};
use rayon::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A normalizer bundled with the limits and keycode table it owns.
#[derive(Debug, Clone)]
pub struct Validator {
    pub limits: FirmwareLimits,
    pub registry: KeycodeRegistry,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            limits: FirmwareLimits::default(),
            registry: KeycodeRegistry::new_with_defaults(),
        }
    }
}

/// The result of validating one file in a batch.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: KmResult<KeyboardMetadata>,
}

impl FileOutcome {
    pub fn is_valid(&self) -> bool {
        self.result.is_ok()
    }
}

impl Validator {
    pub fn new(limits: FirmwareLimits, registry: KeycodeRegistry) -> KmResult<Self> {
        limits.validate()?;
        Ok(Self { limits, registry })
    }

    pub fn normalizer(&self) -> Normalizer<'_> {
        Normalizer::new(&self.limits, &self.registry)
    }

    pub fn validate_value(&self, doc: &Value) -> Validated<KeyboardMetadata> {
        self.normalizer().normalize(doc)
    }

    /// Parses `content` as JSON and validates it. Malformed JSON is an error, not a report.
    pub fn validate_str(&self, content: &str) -> KmResult<KeyboardMetadata> {
        let doc: Value = serde_json::from_str(content)?;
        Ok(self.validate_value(&doc)?)
    }

    pub fn validate_file<P: AsRef<Path>>(&self, path: P) -> KmResult<KeyboardMetadata> {
        let path = path.as_ref();
        debug!("Reading {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| KeymetaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.validate_str(&content)
    }

    /// Validates every file in parallel. Outcomes keep the input order.
    pub fn validate_files(&self, paths: &[PathBuf]) -> Vec<FileOutcome> {
        info!("Validating {} file(s)", paths.len());
        let outcomes: Vec<FileOutcome> = paths
            .par_iter()
            .map(|path| FileOutcome {
                path: path.clone(),
                result: self.validate_file(path),
            })
            .collect();

        let failed = outcomes.iter().filter(|o| !o.is_valid()).count();
        if failed > 0 {
            warn!("{} of {} file(s) failed validation", failed, outcomes.len());
        }
        outcomes
    }
}
