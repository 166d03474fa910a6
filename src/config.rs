//! Run configuration.
//!
//! Loaded from TOML, then overridden from `XODR_QC_*` environment variables:
//!
//! ```toml
//! input_file = "maps/town.xodr"
//! result_file = "out/town.json"
//!
//! [bundle]
//! name = "xodrBundle"
//! version = "0.1.0"
//!
//! [checkers]
//! disabled = ["check_openmsl_xodr_statistic"]
//! version_gating = true
//!
//! [params]
//! roadMinLength = "1.0"
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{QcError, Result};
use crate::orchestrator::RunSettings;

pub const DEFAULT_BUNDLE_NAME: &str = "xodrBundle";
pub const DEFAULT_RESULT_FILE: &str = "xodr_qc_result.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Document to check. Read by the bootstrapper, not the engine.
    #[serde(default)]
    pub input_file: Option<PathBuf>,
    #[serde(default = "default_result_file")]
    pub result_file: PathBuf,
    #[serde(default)]
    pub bundle: BundleConfig,
    #[serde(default)]
    pub checkers: CheckersConfig,
    /// Free-form parameters, e.g. thresholds. The engine does not read them;
    /// whoever builds the registry passes them to rule constructors.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: None,
            result_file: default_result_file(),
            bundle: BundleConfig::default(),
            checkers: CheckersConfig::default(),
            params: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Defaults, then the explicit file (or `XODR_QC_CONFIG`), then env overrides.
    ///
    /// A config file that does not exist is ignored; one that cannot be parsed
    /// is an error.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let path = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("XODR_QC_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = path {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// Read a single config file. The file must exist.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| QcError::Config(format!("read config {}: {err}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Settings for one orchestration pass.
    #[must_use]
    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            bundle_name: self.bundle.name.clone(),
            bundle_version: self.bundle.version.clone(),
            disabled: self.checkers.disabled.iter().cloned().collect::<HashSet<_>>(),
            version_gating: self.checkers.version_gating,
        }
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| QcError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| QcError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(value) = patch.input_file {
            self.input_file = Some(value);
        }
        if let Some(value) = patch.result_file {
            self.result_file = value;
        }
        if let Some(patch) = patch.bundle {
            self.bundle.merge(patch);
        }
        if let Some(patch) = patch.checkers {
            self.checkers.merge(patch);
        }
        if let Some(params) = patch.params {
            self.params.extend(params);
        }
    }

    fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("XODR_QC_INPUT_FILE") {
            self.input_file = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup("XODR_QC_RESULT_FILE") {
            self.result_file = PathBuf::from(value);
        }
        if let Some(value) = lookup("XODR_QC_DISABLED_CHECKERS") {
            self.checkers.disabled = merge_unique(parse_list(&value), &self.checkers.disabled);
        }
        if let Some(value) = lookup("XODR_QC_VERSION_GATING") {
            self.checkers.version_gating = parse_bool("XODR_QC_VERSION_GATING", &value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleConfig {
    #[serde(default = "default_bundle_name")]
    pub name: String,
    #[serde(default = "default_bundle_version")]
    pub version: String,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            name: default_bundle_name(),
            version: default_bundle_version(),
        }
    }
}

impl BundleConfig {
    fn merge(&mut self, patch: BundlePatch) {
        if let Some(value) = patch.name {
            self.name = value;
        }
        if let Some(value) = patch.version {
            self.version = value;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckersConfig {
    #[serde(default)]
    pub disabled: Vec<String>,
    #[serde(default = "default_true")]
    pub version_gating: bool,
}

impl Default for CheckersConfig {
    fn default() -> Self {
        Self {
            disabled: Vec::new(),
            version_gating: true,
        }
    }
}

impl CheckersConfig {
    fn merge(&mut self, patch: CheckersPatch) {
        if let Some(values) = patch.disabled {
            self.disabled = merge_unique(values, &self.disabled);
        }
        if let Some(value) = patch.version_gating {
            self.version_gating = value;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    input_file: Option<PathBuf>,
    result_file: Option<PathBuf>,
    bundle: Option<BundlePatch>,
    checkers: Option<CheckersPatch>,
    params: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
struct BundlePatch {
    name: Option<String>,
    version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CheckersPatch {
    disabled: Option<Vec<String>>,
    version_gating: Option<bool>,
}

fn default_result_file() -> PathBuf {
    PathBuf::from(DEFAULT_RESULT_FILE)
}

fn default_bundle_name() -> String {
    DEFAULT_BUNDLE_NAME.to_string()
}

fn default_bundle_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

const fn default_true() -> bool {
    true
}

fn merge_unique(values: Vec<String>, existing: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in values.into_iter().chain(existing.iter().cloned()) {
        if seen.insert(value.clone()) {
            out.push(value);
        }
    }
    out
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(QcError::Config(format!(
            "invalid {key} value {value} (expected true|false)"
        ))),
    }
}
