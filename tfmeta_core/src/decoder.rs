use hcl_edit::structure::Body;

use crate::DataSource;
use crate::DecodedModule;
use crate::Diagnostics;
use crate::ModuleCall;
use crate::ProviderConfig;
use crate::ProviderRef;
use crate::Resource;
use crate::SourceRange;
use crate::literal::decode_non_empty_string;
use crate::literal::decode_string;
use crate::reference::decode_provider_attribute;
use crate::reference::infer_provider_name_from_type;
use crate::requirements::decode_required_providers_block;
use crate::requirements::merge_provider_requirements;
use crate::schema::ContentBlock;
use crate::schema::MODULE_SCHEMA;
use crate::schema::PROVIDER_CONFIG_SCHEMA;
use crate::schema::RESOURCE_SCHEMA;
use crate::schema::ROOT_SCHEMA;
use crate::schema::TERRAFORM_BLOCK_SCHEMA;
use crate::schema::partial_content;

/// Decode one file's top level body into `module`.
///
/// Call once per file of a module with the same accumulator. Every problem
/// is reported in the returned diagnostics and decoding carries on, so
/// `module` always holds everything that could be extracted.
pub fn decode_body(body: &Body, module: &mut DecodedModule) -> Diagnostics {
	let (content, mut diagnostics) = partial_content(body, &ROOT_SCHEMA);

	for block in &content.blocks {
		tracing::trace!(kind = block.kind, labels = ?block.labels, "decoding block");

		let block_diagnostics = match block.kind {
			"terraform" => decode_terraform_block(block, module),
			"provider" => decode_provider_block(block, module),
			"data" => decode_data_block(block, module),
			"resource" => decode_resource_block(block, module),
			"module" => decode_module_block(block, module),
			_ => Diagnostics::new(),
		};

		diagnostics.extend(block_diagnostics);
	}

	tracing::debug!(
		blocks = content.blocks.len(),
		diagnostics = diagnostics.len(),
		"decoded module body"
	);

	diagnostics
}

fn decode_terraform_block(block: &ContentBlock<'_>, module: &mut DecodedModule) -> Diagnostics {
	let (content, mut diagnostics) = partial_content(block.body, &TERRAFORM_BLOCK_SCHEMA);

	if let Some(attr) = content.attributes.get("required_version") {
		match decode_string(&attr.value) {
			Ok(version) => module.required_core.push(version),
			Err(diagnostic) => diagnostics.push(diagnostic),
		}
	}

	for inner in content
		.blocks
		.iter()
		.filter(|inner| inner.kind == "required_providers")
	{
		let (requirements, requirement_diagnostics) = decode_required_providers_block(inner);
		diagnostics.extend(requirement_diagnostics);
		diagnostics.extend(merge_provider_requirements(
			&mut module.provider_requirements,
			requirements,
			inner.def_range,
		));
	}

	diagnostics
}

fn decode_provider_block(block: &ContentBlock<'_>, module: &mut DecodedModule) -> Diagnostics {
	let (content, mut diagnostics) = partial_content(block.body, &PROVIDER_CONFIG_SCHEMA);
	let name = block.label(0);

	// A provider block is a dependency even without a version constraint.
	let requirement = module
		.provider_requirements
		.entry(name.to_string())
		.or_default();

	if let Some(attr) = content.attributes.get("version") {
		match decode_string(&attr.value) {
			Ok(version) => requirement.version_constraints.push(version),
			Err(diagnostic) => diagnostics.push(diagnostic),
		}
	}

	let mut alias = None;
	if let Some(attr) = content.attributes.get("alias") {
		match decode_non_empty_string(&attr.value) {
			Ok(value) => alias = value,
			Err(diagnostic) => diagnostics.push(diagnostic),
		}
	}

	module.insert_provider_config(ProviderConfig {
		name: name.to_string(),
		alias,
	});

	diagnostics
}

/// Shared by `resource` and `data`: the type and name labels plus the bound
/// provider, explicit or inferred from the type.
fn decode_resource_like(block: &ContentBlock<'_>) -> (String, String, ProviderRef, Diagnostics) {
	let (content, mut diagnostics) = partial_content(block.body, &RESOURCE_SCHEMA);
	let r#type = block.label(0);
	let name = block.label(1);

	let provider = match content.attributes.get("provider") {
		Some(attr) => {
			let (provider, provider_diagnostics) = decode_provider_attribute(attr);
			diagnostics.extend(provider_diagnostics);
			provider
		}
		None => ProviderRef::unaliased(infer_provider_name_from_type(r#type)),
	};

	(r#type.to_string(), name.to_string(), provider, diagnostics)
}

fn decode_data_block(block: &ContentBlock<'_>, module: &mut DecodedModule) -> Diagnostics {
	let (r#type, name, provider, diagnostics) = decode_resource_like(block);

	module.insert_data_source(DataSource {
		r#type,
		name,
		provider,
	});

	diagnostics
}

fn decode_resource_block(block: &ContentBlock<'_>, module: &mut DecodedModule) -> Diagnostics {
	let (r#type, name, provider, diagnostics) = decode_resource_like(block);

	module.insert_resource(Resource {
		r#type,
		name,
		provider,
	});

	diagnostics
}

fn decode_module_block(block: &ContentBlock<'_>, module: &mut DecodedModule) -> Diagnostics {
	let (content, mut diagnostics) = partial_content(block.body, &MODULE_SCHEMA);
	let mut module_call = ModuleCall {
		name: block.label(0).to_string(),
		source: None,
	};

	if let Some(attr) = content.attributes.get("source") {
		match decode_non_empty_string(&attr.value) {
			Ok(source) => module_call.source = source,
			Err(diagnostic) => {
				tracing::debug!(
					module = %module_call.name,
					range = ?SourceRange::of(&attr.value),
					"module source is not a literal string"
				);
				diagnostics.push(diagnostic);
			}
		}
	}

	module.insert_module_call(module_call);

	diagnostics
}
