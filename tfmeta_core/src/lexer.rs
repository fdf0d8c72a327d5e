use logos::Logos;
use snailquote::unescape;

use crate::traversal::IndexKey;
use crate::traversal::Traversal;
use crate::traversal::TraversalStep;

/// Raw tokens produced by logos for a traversal written inside a string, e.g.
/// the legacy `provider = "aws.east"` form.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t]+")]
enum RawToken {
	#[token(".")]
	Dot,
	#[token("[")]
	BracketOpen,
	#[token("]")]
	BracketClose,
	#[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*")]
	Ident,
	#[regex(r"[0-9]+")]
	Number,
	#[regex(r#""([^"\\]|\\.)*""#)]
	DoubleQuotedString,
}

/// Walks the logos token stream, building up a [`Traversal`]. Any token out
/// of place aborts the walk.
struct TraversalWalker<'a> {
	/// The text being parsed.
	source: &'a str,
	/// The collected raw tokens and their byte spans.
	raw_tokens: Vec<(Result<RawToken, ()>, std::ops::Range<usize>)>,
	/// Current index into `raw_tokens`.
	cursor: usize,
}

impl<'a> TraversalWalker<'a> {
	fn new(source: &'a str) -> Self {
		let raw_tokens: Vec<_> = RawToken::lexer(source).spanned().collect();

		Self {
			source,
			raw_tokens,
			cursor: 0,
		}
	}

	/// Consume the next token, returning it with its text. Lexer errors end
	/// the walk.
	fn next_token(&mut self) -> Option<(RawToken, &'a str)> {
		let (result, span) = self.raw_tokens.get(self.cursor)?;
		self.cursor += 1;
		let token = *result.as_ref().ok()?;

		Some((token, &self.source[span.clone()]))
	}

	fn process_string(slice: &str) -> Option<String> {
		let inner = &slice[1..slice.len() - 1];

		if inner.contains('\\') {
			unescape(inner).ok()
		} else {
			Some(inner.to_string())
		}
	}

	fn process_index(&mut self) -> Option<IndexKey> {
		let key = match self.next_token()? {
			(RawToken::Number, slice) => IndexKey::Number(slice.parse().ok()?),
			(RawToken::DoubleQuotedString, slice) => IndexKey::String(Self::process_string(slice)?),
			_ => return None,
		};

		match self.next_token()? {
			(RawToken::BracketClose, _) => Some(key),
			_ => None,
		}
	}

	fn process(&mut self) -> Option<Traversal> {
		let mut traversal = match self.next_token()? {
			(RawToken::Ident, root) => Traversal::new(root),
			_ => return None,
		};

		while self.cursor < self.raw_tokens.len() {
			let step = match self.next_token()? {
				(RawToken::Dot, _) => {
					match self.next_token()? {
						(RawToken::Ident, name) => TraversalStep::Attr(name.to_string()),
						(RawToken::Number, index) => TraversalStep::Index(IndexKey::Number(index.parse().ok()?)),
						_ => return None,
					}
				}
				(RawToken::BracketOpen, _) => TraversalStep::Index(self.process_index()?),
				_ => return None,
			};

			traversal.push(step);
		}

		Some(traversal)
	}
}

/// Parse text such as `aws.east` or `module.vpc["a"]` as an absolute
/// traversal. Returns `None` when the text is anything else, including empty.
pub fn parse_traversal_abs(source: &str) -> Option<Traversal> {
	TraversalWalker::new(source).process()
}
