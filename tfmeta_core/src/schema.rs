use std::collections::BTreeMap;

use hcl_edit::structure::Attribute;
use hcl_edit::structure::Block;
use hcl_edit::structure::BlockLabel;
use hcl_edit::structure::Body;
use hcl_edit::structure::Structure;

use crate::Diagnostic;
use crate::Diagnostics;
use crate::SourceRange;

/// An attribute a body is expected to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSchema {
	pub name: &'static str,
	pub required: bool,
}

impl AttributeSchema {
	pub const fn optional(name: &'static str) -> Self {
		Self {
			name,
			required: false,
		}
	}

	pub const fn required(name: &'static str) -> Self {
		Self {
			name,
			required: true,
		}
	}
}

/// A block kind a body is expected to contain, with the names of the labels
/// every block of that kind must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeaderSchema {
	pub kind: &'static str,
	pub label_names: &'static [&'static str],
}

/// The shape a body is filtered against. Content outside the schema is
/// ignored rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodySchema {
	pub attributes: &'static [AttributeSchema],
	pub blocks: &'static [BlockHeaderSchema],
}

impl BodySchema {
	fn attribute(&self, name: &str) -> Option<&AttributeSchema> {
		self.attributes.iter().find(|attr| attr.name == name)
	}

	fn block(&self, kind: &str) -> Option<&BlockHeaderSchema> {
		self.blocks.iter().find(|block| block.kind == kind)
	}
}

/// Top level blocks of a module file.
pub const ROOT_SCHEMA: BodySchema = BodySchema {
	attributes: &[],
	blocks: &[
		BlockHeaderSchema {
			kind: "terraform",
			label_names: &[],
		},
		BlockHeaderSchema {
			kind: "provider",
			label_names: &["name"],
		},
		BlockHeaderSchema {
			kind: "data",
			label_names: &["type", "name"],
		},
		BlockHeaderSchema {
			kind: "resource",
			label_names: &["type", "name"],
		},
		BlockHeaderSchema {
			kind: "module",
			label_names: &["name"],
		},
	],
};

pub const TERRAFORM_BLOCK_SCHEMA: BodySchema = BodySchema {
	attributes: &[AttributeSchema::optional("required_version")],
	blocks: &[BlockHeaderSchema {
		kind: "required_providers",
		label_names: &[],
	}],
};

pub const PROVIDER_CONFIG_SCHEMA: BodySchema = BodySchema {
	attributes: &[
		AttributeSchema::optional("version"),
		AttributeSchema::optional("alias"),
	],
	blocks: &[],
};

/// Shared by `resource` and `data` blocks.
pub const RESOURCE_SCHEMA: BodySchema = BodySchema {
	attributes: &[AttributeSchema::optional("provider")],
	blocks: &[],
};

pub const MODULE_SCHEMA: BodySchema = BodySchema {
	attributes: &[AttributeSchema::optional("source")],
	blocks: &[],
};

/// The parts of a body matching a [`BodySchema`].
#[derive(Debug, Default)]
pub struct BodyContent<'a> {
	pub attributes: BTreeMap<&'a str, &'a Attribute>,
	pub blocks: Vec<ContentBlock<'a>>,
}

/// A block whose labels have been checked against its header schema.
#[derive(Debug, Clone)]
pub struct ContentBlock<'a> {
	pub kind: &'a str,
	pub labels: Vec<&'a str>,
	pub body: &'a Body,
	/// The block's header: its kind followed by its labels.
	pub def_range: Option<SourceRange>,
}

impl<'a> ContentBlock<'a> {
	/// Label at `index`. Labels are validated against the schema, so indexes
	/// below the schema's label count always exist.
	pub fn label(&self, index: usize) -> &'a str {
		self.labels.get(index).copied().unwrap_or_default()
	}
}

/// Filter `body` down to the attributes and blocks declared in `schema`.
///
/// Anything the schema does not mention is skipped silently. Shape problems
/// with the content it does mention are returned as diagnostics and the
/// offending item is left out of the result.
pub fn partial_content<'a>(body: &'a Body, schema: &BodySchema) -> (BodyContent<'a>, Diagnostics) {
	let mut content = BodyContent::default();
	let mut diagnostics = Diagnostics::new();

	for structure in body.iter() {
		match structure {
			Structure::Attribute(attr) => {
				let name = attr.key.as_str();

				if schema.attribute(name).is_none() {
					if schema.block(name).is_some() {
						diagnostics.push(
							Diagnostic::error(
								"Unsupported argument",
								format!(
									"An argument named \"{name}\" is not expected here. Did you mean to \
									 define a block of type \"{name}\"?"
								),
							)
							.with_subject(SourceRange::of(&attr.key)),
						);
					}

					continue;
				}

				if content.attributes.contains_key(name) {
					diagnostics.push(
						Diagnostic::error(
							"Duplicate argument",
							format!(
								"The argument \"{name}\" was already set. Each argument may be set only \
								 once."
							),
						)
						.with_subject(SourceRange::of(&attr.key)),
					);

					continue;
				}

				content.attributes.insert(name, attr);
			}
			Structure::Block(block) => {
				let kind = block.ident.as_str();

				let Some(header) = schema.block(kind) else {
					if schema.attribute(kind).is_some() {
						diagnostics.push(
							Diagnostic::error(
								"Unsupported block type",
								format!(
									"Blocks of type \"{kind}\" are not expected here. Did you mean to \
									 define argument \"{kind}\"? If so, use the equals sign to assign it a \
									 value."
								),
							)
							.with_subject(SourceRange::of(&block.ident)),
						);
					}

					continue;
				};

				if let Some(diagnostic) = check_labels(block, header) {
					diagnostics.push(diagnostic);
					continue;
				}

				content.blocks.push(ContentBlock {
					kind,
					labels: block.labels.iter().map(label_str).collect(),
					body: &block.body,
					def_range: def_range(block),
				});
			}
		}
	}

	for attr in schema.attributes.iter().filter(|attr| attr.required) {
		if !content.attributes.contains_key(attr.name) {
			diagnostics.push(
				Diagnostic::error(
					"Missing required argument",
					format!(
						"The argument \"{}\" is required, but no definition was found.",
						attr.name
					),
				),
			);
		}
	}

	(content, diagnostics)
}

fn check_labels(block: &Block, header: &BlockHeaderSchema) -> Option<Diagnostic> {
	let kind = header.kind;
	let expected = header.label_names.len();
	let found = block.labels.len();

	if found < expected {
		let missing = header.label_names[found];

		return Some(
			Diagnostic::error(
				format!("Missing {missing} for {kind}"),
				format!(
					"All {kind} blocks must have {expected} labels ({}).",
					header.label_names.join(", ")
				),
			)
			.with_subject(def_range(block)),
		);
	}

	if found > expected {
		let detail = if expected == 0 {
			format!("No labels are expected for {kind} blocks.")
		} else {
			format!(
				"Only {expected} labels ({}) are expected for {kind} blocks.",
				header.label_names.join(", ")
			)
		};

		return Some(
			Diagnostic::error(format!("Extraneous label for {kind}"), detail)
				.with_subject(label_range(&block.labels[expected])),
		);
	}

	None
}

pub(crate) fn label_str(label: &BlockLabel) -> &str {
	match label {
		BlockLabel::Ident(ident) => ident.as_str(),
		BlockLabel::String(string) => string.as_str(),
	}
}

fn label_range(label: &BlockLabel) -> Option<SourceRange> {
	match label {
		BlockLabel::Ident(ident) => SourceRange::of(ident),
		BlockLabel::String(string) => SourceRange::of(string),
	}
}

/// The block's kind keyword through its final label.
fn def_range(block: &Block) -> Option<SourceRange> {
	let start = SourceRange::of(&block.ident)?;

	Some(
		block
			.labels
			.last()
			.and_then(label_range)
			.map_or(start, |end| start.join(end)),
	)
}
