use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::MergeError;
use crate::model::MatchPair;

/// Output file name used when a job doesn't name one.
pub const DEFAULT_OUTPUT: &str = "merged_output.xlsx";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// A merge job, usually loaded from a `.merge.toml` file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub primary: SourceConfig,
    pub reference: SourceConfig,
    #[serde(default)]
    pub pairs: Vec<MatchPair>,
    #[serde(default)]
    pub output: OutputConfig,
}

/// One input table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub file: PathBuf,
    /// Worksheet name for spreadsheet inputs. First sheet when omitted.
    #[serde(default)]
    pub sheet: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MergeConfig {
    pub fn from_toml(input: &str) -> Result<Self, MergeError> {
        let config: MergeConfig =
            toml::from_str(input).map_err(|e| MergeError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that need no data: at least one pair, no blank names.
    /// Column existence is checked against the loaded tables at run time.
    pub fn validate(&self) -> Result<(), MergeError> {
        validate_pairs(&self.pairs)?;

        for (label, source) in [("primary", &self.primary), ("reference", &self.reference)] {
            if source.file.as_os_str().is_empty() {
                return Err(MergeError::ConfigValidation(format!("{label}.file is empty")));
            }
        }

        Ok(())
    }

    /// Display name for narration.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("merge")
    }

    /// Resolve input/output paths relative to the config file's directory.
    pub fn resolve_paths(&mut self, base_dir: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base_dir.join(&*p);
            }
        };
        resolve(&mut self.primary.file);
        resolve(&mut self.reference.file);
        if let Some(ref mut out) = self.output.file {
            resolve(out);
        }
    }

    /// Output path, falling back to [`DEFAULT_OUTPUT`].
    pub fn output_path(&self) -> PathBuf {
        self.output
            .file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }
}

/// Non-empty list, every pair naming a column on both sides.
pub fn validate_pairs(pairs: &[MatchPair]) -> Result<(), MergeError> {
    if pairs.is_empty() {
        return Err(MergeError::NoMatchPairs);
    }

    for (i, pair) in pairs.iter().enumerate() {
        if pair.primary.trim().is_empty() || pair.reference.trim().is_empty() {
            return Err(MergeError::ConfigValidation(format!(
                "match pair #{} is incomplete: both columns must be named",
                i + 1
            )));
        }
    }

    Ok(())
}

/// Parse a `PRIMARY=REFERENCE` command-line pair.
pub fn parse_pair(arg: &str) -> Result<MatchPair, MergeError> {
    let (primary, reference) = arg.split_once('=').ok_or_else(|| {
        MergeError::ConfigValidation(format!(
            "invalid pair '{arg}': expected PRIMARY_COLUMN=REFERENCE_COLUMN"
        ))
    })?;
    let pair = MatchPair::new(primary.trim(), reference.trim());
    validate_pairs(std::slice::from_ref(&pair))?;
    Ok(pair)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
