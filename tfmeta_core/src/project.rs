use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;

use crate::Diagnostic;
use crate::Diagnostics;
use crate::FileDiagnostic;
use crate::ModuleMeta;
use crate::SourceRange;
use crate::TfError;
use crate::TfResult;
use crate::config::DEFAULT_EXTENSIONS;
use crate::config::TfMetaConfig;
use crate::load_module;

/// Options controlling which files of a module directory are read.
///
/// Use [`ScanOptions::default()`] for `*.tf` files or
/// [`ScanOptions::from_config`] to construct from a [`TfMetaConfig`].
#[derive(Debug, Clone)]
pub struct ScanOptions {
	/// Extensions without the leading dot.
	pub extensions: Vec<String>,
	/// Matched against file names.
	pub exclude_set: GlobSet,
}

impl Default for ScanOptions {
	fn default() -> Self {
		Self {
			extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
			exclude_set: GlobSet::empty(),
		}
	}
}

impl ScanOptions {
	pub fn from_config(config: Option<&TfMetaConfig>) -> TfResult<Self> {
		let Some(config) = config else {
			return Ok(Self::default());
		};

		Ok(Self {
			extensions: config.scan.extensions.clone(),
			exclude_set: build_glob_set(&config.scan.exclude)?,
		})
	}

	fn includes(&self, path: &Path) -> bool {
		let Some(file_name) = path.file_name() else {
			return false;
		};

		let has_extension = path
			.extension()
			.and_then(|ext| ext.to_str())
			.is_some_and(|ext| self.extensions.iter().any(|wanted| wanted == ext));

		has_extension && !self.exclude_set.is_match(file_name)
	}
}

fn build_glob_set(patterns: &[String]) -> TfResult<GlobSet> {
	let mut builder = GlobSetBuilder::new();

	for pattern in patterns {
		let glob = Glob::new(pattern).map_err(|e| {
			TfError::InvalidGlob {
				pattern: pattern.clone(),
				reason: e.to_string(),
			}
		})?;
		builder.add(glob);
	}

	builder.build().map_err(|e| {
		TfError::InvalidGlob {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

/// A file read from a module directory.
#[derive(Debug, Clone)]
pub struct SourceFile {
	pub name: String,
	pub path: PathBuf,
	pub content: String,
}

/// A module directory that has been read, parsed and decoded.
#[derive(Debug, Clone)]
pub struct LoadedModule {
	pub meta: ModuleMeta,
	pub files: Vec<SourceFile>,
	/// Syntax and decode diagnostics for each file, keyed by file name.
	pub file_diagnostics: BTreeMap<String, Diagnostics>,
	/// Diagnostics about the module as a whole.
	pub diagnostics: Diagnostics,
}

impl LoadedModule {
	pub fn error_count(&self) -> usize {
		self.all_diagnostics().filter(|diag| diag.is_error()).count()
	}

	pub fn warning_count(&self) -> usize {
		self.all_diagnostics().filter(|diag| !diag.is_error()).count()
	}

	pub fn has_errors(&self) -> bool {
		self.error_count() > 0
	}

	fn all_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
		self.file_diagnostics
			.values()
			.flatten()
			.chain(&self.diagnostics)
	}

	/// Every diagnostic paired with its file's source for rendering, files in
	/// name order followed by module level diagnostics.
	pub fn rendered_diagnostics(&self) -> Vec<FileDiagnostic> {
		let mut rendered = Vec::new();

		for file in &self.files {
			let Some(diagnostics) = self.file_diagnostics.get(&file.name) else {
				continue;
			};

			rendered.extend(diagnostics.iter().map(|diagnostic| {
				FileDiagnostic::new(&file.name, file.content.clone(), diagnostic.clone())
			}));
		}

		rendered.extend(self.diagnostics.iter().cloned().map(FileDiagnostic::detached));
		rendered
	}
}

/// Read, parse and decode every matching file directly inside `dir`.
///
/// Subdirectories are not visited; a module is a single directory. A file
/// with invalid syntax contributes one error diagnostic and is otherwise
/// skipped.
pub fn load_module_dir(dir: &Path, options: &ScanOptions) -> TfResult<LoadedModule> {
	if !dir.is_dir() {
		return Err(TfError::MissingDirectory(dir.display().to_string()));
	}

	let mut paths = Vec::new();
	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_file() && options.includes(&path) {
			paths.push(path);
		}
	}
	paths.sort();

	let mut files = Vec::new();
	let mut bodies = BTreeMap::new();
	let mut syntax_diagnostics: BTreeMap<String, Diagnostics> = BTreeMap::new();

	for path in paths {
		let name = path
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.unwrap_or_default();
		let content = std::fs::read_to_string(&path).map_err(|e| {
			TfError::ReadFile {
				path: path.display().to_string(),
				reason: e.to_string(),
			}
		})?;

		match hcl_edit::parser::parse_body(&content) {
			Ok(body) => {
				bodies.insert(name.clone(), body);
			}
			Err(error) => {
				tracing::debug!(file = %name, %error, "failed to parse file");
				syntax_diagnostics
					.entry(name.clone())
					.or_default()
					.push(
						Diagnostic::error("Invalid HCL syntax", error.to_string())
							.with_subject(Some(syntax_error_range(&content, error.location().offset()))),
					);
			}
		}

		files.push(SourceFile {
			name,
			path,
			content,
		});
	}

	let decoded = load_module(dir, &bodies);
	let mut file_diagnostics = decoded.file_diagnostics;
	for (name, diagnostics) in syntax_diagnostics {
		file_diagnostics.entry(name).or_default().extend(diagnostics);
	}

	Ok(LoadedModule {
		meta: decoded.meta,
		files,
		file_diagnostics,
		diagnostics: decoded.diagnostics,
	})
}

/// The character at the parser's error offset, or an empty range at the end
/// of the file.
fn syntax_error_range(content: &str, offset: usize) -> SourceRange {
	let start = offset.min(content.len());
	let end = content
		.get(start..)
		.and_then(|rest| rest.chars().next())
		.map_or(start, |ch| start + ch.len_utf8());

	SourceRange::new(start, end)
}
