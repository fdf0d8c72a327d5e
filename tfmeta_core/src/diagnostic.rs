use std::fmt::Display;

use derive_more::Deref;
use derive_more::DerefMut;
use miette::LabeledSpan;
use miette::NamedSource;
use serde::Serialize;
use thiserror::Error;

use crate::SourceRange;

/// How serious a [`Diagnostic`] is. Callers decide which severities block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	#[display("error")]
	Error,
	#[display("warning")]
	Warning,
}

/// A problem found while decoding. Decoding never stops on a diagnostic;
/// they are collected and returned alongside the partial result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
	pub severity: Severity,
	pub summary: String,
	pub detail: String,
	/// The byte range this diagnostic points at, when known.
	pub subject: Option<SourceRange>,
}

impl Diagnostic {
	pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
		Self {
			severity: Severity::Error,
			summary: summary.into(),
			detail: detail.into(),
			subject: None,
		}
	}

	pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
		Self {
			severity: Severity::Warning,
			..Self::error(summary, detail)
		}
	}

	#[must_use]
	pub fn with_subject(mut self, subject: Option<SourceRange>) -> Self {
		self.subject = subject;
		self
	}

	pub fn is_error(&self) -> bool {
		self.severity == Severity::Error
	}
}

/// An ordered collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deref, DerefMut)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn has_errors(&self) -> bool {
		self.0.iter().any(Diagnostic::is_error)
	}

	pub fn error_count(&self) -> usize {
		self.0.iter().filter(|diag| diag.is_error()).count()
	}

	pub fn warning_count(&self) -> usize {
		self.0.len() - self.error_count()
	}
}

impl From<Vec<Diagnostic>> for Diagnostics {
	fn from(diagnostics: Vec<Diagnostic>) -> Self {
		Self(diagnostics)
	}
}

impl From<Diagnostic> for Diagnostics {
	fn from(diagnostic: Diagnostic) -> Self {
		Self(vec![diagnostic])
	}
}

impl Extend<Diagnostic> for Diagnostics {
	fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
		self.0.extend(iter);
	}
}

impl FromIterator<Diagnostic> for Diagnostics {
	fn from_iter<T: IntoIterator<Item = Diagnostic>>(iter: T) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl IntoIterator for Diagnostics {
	type IntoIter = std::vec::IntoIter<Diagnostic>;
	type Item = Diagnostic;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl<'a> IntoIterator for &'a Diagnostics {
	type IntoIter = std::slice::Iter<'a, Diagnostic>;
	type Item = &'a Diagnostic;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

/// A [`Diagnostic`] paired with the text of the file it was found in, so it
/// can be rendered as a [`miette::Report`] with a labelled snippet.
#[derive(Debug, Error)]
#[error("{}", .diagnostic.summary)]
pub struct FileDiagnostic {
	pub diagnostic: Diagnostic,
	source_code: Option<NamedSource<String>>,
}

impl FileDiagnostic {
	/// A diagnostic that belongs to the module as a whole rather than a file.
	pub fn detached(diagnostic: Diagnostic) -> Self {
		Self {
			diagnostic,
			source_code: None,
		}
	}

	pub fn new(name: impl AsRef<str>, source: impl Into<String>, diagnostic: Diagnostic) -> Self {
		Self {
			diagnostic,
			source_code: Some(NamedSource::new(name, source.into())),
		}
	}
}

impl miette::Diagnostic for FileDiagnostic {
	fn severity(&self) -> Option<miette::Severity> {
		Some(match self.diagnostic.severity {
			Severity::Error => miette::Severity::Error,
			Severity::Warning => miette::Severity::Warning,
		})
	}

	fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
		if self.diagnostic.detail.is_empty() {
			return None;
		}

		Some(Box::new(&self.diagnostic.detail))
	}

	fn source_code(&self) -> Option<&dyn miette::SourceCode> {
		self.source_code
			.as_ref()
			.map(|source| source as &dyn miette::SourceCode)
	}

	fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
		self.source_code.as_ref()?;
		let subject = self.diagnostic.subject?;

		Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
			Some(self.diagnostic.summary.clone()),
			subject,
		))))
	}
}
