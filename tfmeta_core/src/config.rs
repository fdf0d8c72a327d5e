use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::TfError;
use crate::TfResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["tfmeta.toml", ".tfmeta.toml", ".config/tfmeta.toml"];

/// File extensions read from a module directory when none are configured.
pub const DEFAULT_EXTENSIONS: [&str; 1] = ["tf"];

/// Configuration loaded from a `tfmeta.toml` file.
///
/// ```toml
/// [scan]
/// extensions = ["tf"]
/// exclude = ["*_override.tf"]
///
/// [check]
/// deny_warnings = true
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct TfMetaConfig {
	/// Which files of a module directory are decoded.
	#[serde(default)]
	pub scan: ScanConfig,
	/// How `tfmeta check` judges diagnostics.
	#[serde(default)]
	pub check: CheckConfig,
}

#[derive(Debug, Deserialize)]
pub struct ScanConfig {
	/// File extensions, without the leading dot.
	#[serde(default = "default_extensions")]
	pub extensions: Vec<String>,
	/// Glob patterns matched against file names.
	#[serde(default)]
	pub exclude: Vec<String>,
}

impl Default for ScanConfig {
	fn default() -> Self {
		Self {
			extensions: default_extensions(),
			exclude: Vec::new(),
		}
	}
}

fn default_extensions() -> Vec<String> {
	DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect()
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckConfig {
	/// Treat warnings as failures.
	#[serde(default)]
	pub deny_warnings: bool,
}

impl TfMetaConfig {
	/// The first existing config file under `root`.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config for `root`, or `None` when there is no config file.
	pub fn load(root: &Path) -> TfResult<Option<TfMetaConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		tracing::debug!(path = %config_path.display(), "loading config");
		let content = std::fs::read_to_string(&config_path)?;
		let config: TfMetaConfig =
			toml::from_str(&content).map_err(|e| TfError::ConfigParse(e.to_string()))?;

		Ok(Some(config))
	}
}
