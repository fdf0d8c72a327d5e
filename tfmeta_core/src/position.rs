use std::ops::Range;

use hcl_edit::Span;
use serde::Serialize;

/// A byte range into the source text of a single configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceRange {
	pub start: usize,
	pub end: usize,
}

impl SourceRange {
	pub fn new(start: usize, end: usize) -> Self {
		Self { start, end }
	}

	/// The range of any spanned `hcl-edit` node. Nodes built in memory rather
	/// than parsed carry no span.
	pub fn of(node: &impl Span) -> Option<Self> {
		node.span().map(Into::into)
	}

	/// A range covering both `self` and `other`.
	#[must_use]
	pub fn join(self, other: Self) -> Self {
		Self {
			start: self.start.min(other.start),
			end: self.end.max(other.end),
		}
	}

	pub fn len(&self) -> usize {
		self.end.saturating_sub(self.start)
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Line and column of the start of this range within `source`.
	pub fn start_point(&self, source: &str) -> Point {
		Point::from_offset(source, self.start)
	}
}

impl From<Range<usize>> for SourceRange {
	fn from(range: Range<usize>) -> Self {
		Self::new(range.start, range.end)
	}
}

impl From<SourceRange> for miette::SourceSpan {
	fn from(range: SourceRange) -> Self {
		(range.start..range.end).into()
	}
}

/// A 1-based line and column together with the byte offset they were
/// computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
	pub line: usize,
	pub column: usize,
	pub offset: usize,
}

impl Point {
	pub fn new(line: usize, column: usize, offset: usize) -> Self {
		Self {
			line,
			column,
			offset,
		}
	}

	/// Walk `source` up to `offset`. Offsets past the end clamp to the end of
	/// the text.
	pub fn from_offset(source: &str, offset: usize) -> Self {
		let mut point = Self::new(1, 1, 0);

		for (index, ch) in source.char_indices() {
			if index >= offset {
				break;
			}

			point.offset = index + ch.len_utf8();

			if ch == '\n' {
				point.line += 1;
				point.column = 1;
			} else {
				point.column += 1;
			}
		}

		point
	}
}
