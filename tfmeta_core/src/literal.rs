use hcl_edit::expr::Expression;
use hcl_edit::template::Element;
use hcl_edit::template::Template;

use crate::Diagnostic;
use crate::SourceRange;

/// Decode an expression that must be a static string literal.
///
/// Numbers and bools convert to their string form, parentheses are looked
/// through, and templates made only of literal text are joined. Nothing is
/// evaluated: variables, function calls and interpolated templates are
/// rejected with a diagnostic anchored at the expression.
pub fn decode_string(expr: &Expression) -> Result<String, Diagnostic> {
	let inner = unwrap_parens(expr);
	let (summary, detail) = match inner {
		Expression::String(value) => return Ok(value.value().clone()),
		Expression::Number(value) => return Ok(value.value().to_string()),
		Expression::Bool(value) => return Ok(value.value().to_string()),
		Expression::StringTemplate(template) => {
			if let Some(value) = literal_template(template) {
				return Ok(value);
			}
			template_not_allowed()
		}
		Expression::HeredocTemplate(heredoc) => {
			if let Some(value) = literal_template(&heredoc.template) {
				return Ok(value);
			}
			template_not_allowed()
		}
		Expression::Variable(_) | Expression::Traversal(_) => {
			("Variables not allowed", "Variables may not be used here.")
		}
		Expression::FuncCall(_) => ("Function calls not allowed", "Functions may not be called here."),
		_ => ("Incorrect attribute value type", "Inappropriate value for attribute: string required."),
	};

	Err(Diagnostic::error(summary, detail).with_subject(SourceRange::of(expr)))
}

/// Decode an optional string, treating the empty string as absent.
pub(crate) fn decode_non_empty_string(expr: &Expression) -> Result<Option<String>, Diagnostic> {
	decode_string(expr).map(|value| Some(value).filter(|value| !value.is_empty()))
}

fn unwrap_parens(mut expr: &Expression) -> &Expression {
	while let Expression::Parenthesis(parens) = expr {
		expr = parens.inner();
	}
	expr
}

/// Join a template that holds nothing but literal text.
fn literal_template(template: &Template) -> Option<String> {
	let mut value = String::new();
	for element in template.iter() {
		match element {
			Element::Literal(literal) => value.push_str(literal.value()),
			Element::Interpolation(_) | Element::Directive(_) => return None,
		}
	}
	Some(value)
}

fn template_not_allowed() -> (&'static str, &'static str) {
	(
		"Invalid expression",
		"A static string is required here; template interpolations and directives are not allowed.",
	)
}
