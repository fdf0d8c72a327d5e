use derive_more::Deref;
use hcl_edit::expr::Expression;
use hcl_edit::expr::TraversalOperator;

/// One step of an absolute traversal such as `aws.east` or `var.list[0]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraversalStep {
	/// The leading name, e.g. `aws`.
	Root(String),
	/// `.name`
	Attr(String),
	/// `[0]`, `["key"]` or the legacy `.0`
	Index(IndexKey),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexKey {
	Number(u64),
	String(String),
}

/// A chain of steps starting from a root name. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Deref)]
pub struct Traversal(Vec<TraversalStep>);

impl Traversal {
	pub fn new(root: impl Into<String>) -> Self {
		Self(vec![TraversalStep::Root(root.into())])
	}

	#[must_use]
	pub fn with_step(mut self, step: TraversalStep) -> Self {
		self.0.push(step);
		self
	}

	pub(crate) fn push(&mut self, step: TraversalStep) {
		self.0.push(step);
	}

	pub fn root_name(&self) -> &str {
		match self.0.first() {
			Some(TraversalStep::Root(name)) => name,
			_ => "",
		}
	}

	/// The name of the attribute step at `index`, if that step is one.
	pub fn attr_name(&self, index: usize) -> Option<&str> {
		match self.0.get(index) {
			Some(TraversalStep::Attr(name)) => Some(name),
			_ => None,
		}
	}
}

/// Interpret an expression as a bare absolute traversal.
///
/// Only a root variable followed by attribute and literal index steps
/// qualifies, optionally wrapped in parentheses. Literals, templates, splats, function calls and every other
/// expression kind yield `None`.
pub fn abs_traversal_for_expr(expr: &Expression) -> Option<Traversal> {
	match expr {
		Expression::Variable(root) => Some(Traversal::new(root.as_str())),
		Expression::Traversal(traversal) => {
			let mut result = Traversal::new(variable_name(&traversal.expr)?);

			for operator in &traversal.operators {
				let step = match operator.value() {
					TraversalOperator::GetAttr(name) => TraversalStep::Attr(name.as_str().to_owned()),
					TraversalOperator::LegacyIndex(index) => {
						TraversalStep::Index(IndexKey::Number(*index.value()))
					}
					TraversalOperator::Index(Expression::Number(number)) => {
						TraversalStep::Index(IndexKey::Number(number.value().as_u64()?))
					}
					TraversalOperator::Index(Expression::String(key)) => {
						TraversalStep::Index(IndexKey::String(key.value().clone()))
					}
					_ => return None,
				};

				result.push(step);
			}

			Some(result)
		}
		Expression::Parenthesis(parens) => abs_traversal_for_expr(parens.inner()),
		_ => None,
	}
}

fn variable_name(expr: &Expression) -> Option<&str> {
	match expr {
		Expression::Variable(name) => Some(name.as_str()),
		_ => None,
	}
}
