use hcl_edit::expr::Expression;
use hcl_edit::structure::Attribute;

use crate::Diagnostic;
use crate::Diagnostics;
use crate::ProviderRef;
use crate::SourceRange;
use crate::lexer::parse_traversal_abs;
use crate::literal::decode_string;
use crate::traversal::Traversal;
use crate::traversal::abs_traversal_for_expr;

type TraversalStrategy = fn(&Expression) -> Option<Traversal>;

/// Ways a `provider` argument may be written, in the order they are tried.
const PROVIDER_REFERENCE_STRATEGIES: [(&str, TraversalStrategy); 2] = [
	// provider = aws.east
	("bare reference", abs_traversal_for_expr),
	// provider = "aws.east", from configurations that predate bare references
	("quoted reference", quoted_traversal),
];

fn quoted_traversal(expr: &Expression) -> Option<Traversal> {
	let text = decode_string(expr).ok()?;
	parse_traversal_abs(&text)
}

/// Resolve the `provider` argument of a resource or data block.
///
/// The first strategy that yields a traversal wins. When none does, the
/// returned reference is unresolved and exactly one diagnostic explains why.
pub fn decode_provider_attribute(attr: &Attribute) -> (ProviderRef, Diagnostics) {
	for (strategy, decode) in PROVIDER_REFERENCE_STRATEGIES {
		let Some(traversal) = decode(&attr.value) else {
			tracing::trace!(strategy, "provider reference strategy did not apply");
			continue;
		};

		let alias = traversal.attr_name(1).unwrap_or_default();
		return (
			ProviderRef::new(traversal.root_name(), alias),
			Diagnostics::new(),
		);
	}

	let diagnostic = Diagnostic::error(
		"Invalid provider reference",
		"Provider argument requires a provider name followed by an optional alias, like \
		 \"aws.foo\".",
	)
	.with_subject(SourceRange::of(&attr.value));

	(ProviderRef::default(), diagnostic.into())
}

/// The provider local name implied by a resource or data source type: the
/// text before the first `_`, or the whole type when it has none.
///
/// `aws_instance` belongs to `aws`; `instance` to `instance`.
pub fn infer_provider_name_from_type(r#type: &str) -> &str {
	r#type.split_once('_').map_or(r#type, |(name, _)| name)
}
