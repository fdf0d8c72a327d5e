use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use hcl_edit::expr::Expression;
use hcl_edit::expr::ObjectKey;
use hcl_edit::structure::Structure;

use crate::Diagnostic;
use crate::Diagnostics;
use crate::ProviderRequirement;
use crate::SourceRange;
use crate::literal::decode_non_empty_string;
use crate::literal::decode_string;
use crate::schema::ContentBlock;

/// Decode a `required_providers` block into one requirement per attribute, in
/// declaration order.
///
/// ```hcl
/// required_providers {
///   aws    = { source = "hashicorp/aws", version = "~> 5.0" }
///   google = "~> 4.0" # legacy: version constraint only
/// }
/// ```
pub fn decode_required_providers_block(
	block: &ContentBlock<'_>,
) -> (Vec<(String, ProviderRequirement)>, Diagnostics) {
	let mut requirements = Vec::new();
	let mut diagnostics = Diagnostics::new();

	for structure in block.body.iter() {
		let attr = match structure {
			Structure::Attribute(attr) => attr,
			Structure::Block(inner) => {
				let kind = inner.ident.as_str();
				diagnostics.push(
					Diagnostic::error(
						format!("Unexpected \"{kind}\" block"),
						"Blocks are not allowed here.",
					)
					.with_subject(SourceRange::of(&inner.ident)),
				);
				continue;
			}
		};

		let name = attr.key.as_str();
		if name != name.to_lowercase() {
			diagnostics.push(
				Diagnostic::error(
					"Invalid provider local name",
					format!(
						"\"{name}\" is an invalid provider local name: must be given in normalized \
						 (lowercase) form."
					),
				)
				.with_subject(SourceRange::of(&attr.key)),
			);
		}

		let mut requirement = ProviderRequirement::default();

		match &attr.value {
			Expression::String(_) => {
				match decode_string(&attr.value) {
					Ok(version) => requirement.version_constraints.push(version),
					Err(diagnostic) => diagnostics.push(diagnostic),
				}
			}
			Expression::Object(object) => {
				for (key, value) in object.iter() {
					let expr = value.expr();

					match object_key_str(key) {
						Some("source") => {
							match decode_non_empty_string(expr) {
								Ok(source) => requirement.source = source,
								Err(diagnostic) => diagnostics.push(diagnostic),
							}
						}
						Some("version") => {
							match decode_string(expr) {
								Ok(version) => requirement.version_constraints.push(version),
								Err(diagnostic) => diagnostics.push(diagnostic),
							}
						}
						_ => {}
					}
				}
			}
			_ => {
				diagnostics.push(
					Diagnostic::error(
						"Invalid required_providers object",
						"required_providers entries must be strings or objects.",
					)
					.with_subject(SourceRange::of(&attr.value)),
				);
			}
		}

		requirements.push((name.to_string(), requirement));
	}

	(requirements, diagnostics)
}

fn object_key_str(key: &ObjectKey) -> Option<&str> {
	match key {
		ObjectKey::Ident(ident) => Some(ident.as_str()),
		ObjectKey::Expression(Expression::String(string)) => Some(string.as_str()),
		ObjectKey::Expression(Expression::Variable(ident)) => Some(ident.as_str()),
		ObjectKey::Expression(_) => None,
	}
}

/// Merge freshly decoded requirements into `existing`.
///
/// New names are inserted as they are. For names already present the
/// version constraints are appended unconditionally, and a source is only
/// adopted when none was recorded before or it matches the recorded one. A
/// conflicting source leaves the recorded one in place and produces one
/// error anchored at `subject`.
pub fn merge_provider_requirements(
	existing: &mut BTreeMap<String, ProviderRequirement>,
	fragments: impl IntoIterator<Item = (String, ProviderRequirement)>,
	subject: Option<SourceRange>,
) -> Diagnostics {
	let mut diagnostics = Diagnostics::new();

	for (name, fragment) in fragments {
		let current = match existing.entry(name.clone()) {
			Entry::Vacant(entry) => {
				entry.insert(fragment);
				continue;
			}
			Entry::Occupied(entry) => entry.into_mut(),
		};

		if let Some(source) = fragment.source {
			let recorded = current.source.as_deref().unwrap_or_default();

			if !recorded.is_empty() && recorded != source {
				tracing::debug!(%name, recorded, %source, "conflicting provider sources");
				diagnostics.push(
					Diagnostic::error(
						"Multiple provider source attributes",
						format!(
							"Found multiple source attributes for provider {name}: {recorded:?}, \
							 {source:?}"
						),
					)
					.with_subject(subject),
				);
			} else {
				current.source = Some(source);
			}
		}

		current
			.version_constraints
			.extend(fragment.version_constraints);
	}

	diagnostics
}
