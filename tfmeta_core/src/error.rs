use miette::Diagnostic;
use thiserror::Error;

/// Failures of the layers around the decoder: configuration, file access and
/// directory loading. Decoding itself reports problems as
/// [`Diagnostics`](crate::Diagnostics) and never fails.
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum TfError {
	#[error(transparent)]
	#[diagnostic(code(tfmeta::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to read `{path}`: {reason}")]
	#[diagnostic(code(tfmeta::read_file))]
	ReadFile { path: String, reason: String },

	#[error("module directory not found: `{0}`")]
	#[diagnostic(
		code(tfmeta::missing_directory),
		help("pass the directory containing the module's .tf files with `--path`")
	)]
	MissingDirectory(String),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(tfmeta::config_parse),
		help("check that tfmeta.toml is valid TOML with [scan] and/or [check] sections")
	)]
	ConfigParse(String),

	#[error("invalid exclude pattern `{pattern}`: {reason}")]
	#[diagnostic(
		code(tfmeta::invalid_glob),
		help("exclude patterns use glob syntax, e.g. `*_override.tf`")
	)]
	InvalidGlob { pattern: String, reason: String },
}

pub type TfResult<T> = Result<T, TfError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
