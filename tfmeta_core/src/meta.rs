use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;
use std::path::PathBuf;

use hcl_edit::structure::Body;
use serde::Serialize;
use serde::Serializer;

use crate::DataSource;
use crate::DecodedModule;
use crate::Diagnostic;
use crate::Diagnostics;
use crate::ModuleCall;
use crate::ProviderRef;
use crate::ProviderRequirement;
use crate::Resource;
use crate::decode_body;

pub const DEFAULT_REGISTRY_HOST: &str = "registry.terraform.io";
pub const DEFAULT_NAMESPACE: &str = "hashicorp";
const BUILTIN_HOST: &str = "terraform.io";
const BUILTIN_NAMESPACE: &str = "builtin";

/// A fully qualified provider source address, `hostname/namespace/type`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProviderAddress {
	pub hostname: String,
	pub namespace: String,
	pub r#type: String,
}

impl ProviderAddress {
	pub fn new(
		hostname: impl Into<String>,
		namespace: impl Into<String>,
		r#type: impl Into<String>,
	) -> Self {
		Self {
			hostname: hostname.into(),
			namespace: namespace.into(),
			r#type: r#type.into(),
		}
	}

	/// The address assumed for a provider that declares no source. The
	/// `terraform` provider is built in; everything else defaults to the
	/// public registry's `hashicorp` namespace.
	pub fn implied(local_name: &str) -> Self {
		if local_name == "terraform" {
			return Self::new(BUILTIN_HOST, BUILTIN_NAMESPACE, local_name);
		}

		Self::new(DEFAULT_REGISTRY_HOST, DEFAULT_NAMESPACE, local_name)
	}

	/// Parse a `source` string: `type`, `namespace/type` or
	/// `hostname/namespace/type`. Parts are case-insensitive.
	pub fn parse(source: &str) -> Result<Self, String> {
		let parts: Vec<String> = source.split('/').map(str::to_lowercase).collect();

		if let Some(part) = parts.iter().find(|part| !is_valid_part(part)) {
			return Err(if part.is_empty() {
				"source address must not contain empty parts".to_string()
			} else {
				format!("invalid character in \"{part}\"")
			});
		}

		match parts.as_slice() {
			[r#type] => Ok(Self::implied(r#type)),
			[namespace, r#type] => Ok(Self::new(DEFAULT_REGISTRY_HOST, namespace, r#type)),
			[hostname, namespace, r#type] => Ok(Self::new(hostname, namespace, r#type)),
			_ => Err("expected at most three parts separated by \"/\"".to_string()),
		}
	}
}

fn is_valid_part(part: &str) -> bool {
	!part.is_empty()
		&& part
			.chars()
			.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | ':'))
}

impl Display for ProviderAddress {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}/{}/{}", self.hostname, self.namespace, self.r#type)
	}
}

impl Serialize for ProviderAddress {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

/// The semantic summary of a module: its decoded content plus the resolved
/// address of every provider it references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleMeta {
	pub path: PathBuf,
	pub core_requirements: Vec<String>,
	pub provider_requirements: BTreeMap<String, ProviderRequirement>,
	#[serde(serialize_with = "serialize_references")]
	pub provider_references: BTreeMap<ProviderRef, ProviderAddress>,
	pub resources: BTreeMap<String, Resource>,
	pub data_sources: BTreeMap<String, DataSource>,
	pub module_calls: BTreeMap<String, ModuleCall>,
}

fn serialize_references<S: Serializer>(
	references: &BTreeMap<ProviderRef, ProviderAddress>,
	serializer: S,
) -> Result<S::Ok, S::Error> {
	serializer.collect_map(
		references
			.iter()
			.map(|(reference, address)| (reference.to_string(), address)),
	)
}

/// The result of [`load_module`].
#[derive(Debug, Clone, Default)]
pub struct ModuleDecode {
	pub meta: ModuleMeta,
	/// Diagnostics for each decoded file, keyed by file name.
	pub file_diagnostics: BTreeMap<String, Diagnostics>,
	/// Diagnostics about the module as a whole.
	pub diagnostics: Diagnostics,
}

impl ModuleDecode {
	pub fn has_errors(&self) -> bool {
		self.diagnostics.has_errors() || self.file_diagnostics.values().any(Diagnostics::has_errors)
	}
}

/// Decode every file of the module at `path` into one [`ModuleMeta`].
///
/// Files are decoded in name order into a shared [`DecodedModule`]. Provider
/// sources are then resolved into addresses and every provider reference in
/// the module is mapped to one.
pub fn load_module(path: &Path, files: &BTreeMap<String, Body>) -> ModuleDecode {
	let mut module = DecodedModule::new();
	let mut file_diagnostics = BTreeMap::new();

	for (name, body) in files {
		let diagnostics = decode_body(body, &mut module);
		tracing::debug!(file = %name, diagnostics = diagnostics.len(), "decoded file");
		file_diagnostics.insert(name.clone(), diagnostics);
	}

	let (provider_references, diagnostics) = resolve_provider_references(&module);

	ModuleDecode {
		meta: ModuleMeta {
			path: path.to_path_buf(),
			core_requirements: module.required_core,
			provider_requirements: module.provider_requirements,
			provider_references,
			resources: module.resources,
			data_sources: module.data_sources,
			module_calls: module.module_calls,
		},
		file_diagnostics,
		diagnostics,
	}
}

fn resolve_provider_references(
	module: &DecodedModule,
) -> (BTreeMap<ProviderRef, ProviderAddress>, Diagnostics) {
	let mut references = BTreeMap::new();
	let mut diagnostics = Diagnostics::new();

	for (name, requirement) in &module.provider_requirements {
		let address = match requirement.source.as_deref() {
			Some(source) => {
				match ProviderAddress::parse(source) {
					Ok(address) => address,
					Err(reason) => {
						diagnostics.push(Diagnostic::error(
							"Invalid provider source",
							format!(
								"\"{source}\" for provider {name} is not a valid provider source string: \
								 {reason}."
							),
						));
						continue;
					}
				}
			}
			None => ProviderAddress::implied(name),
		};

		references.insert(ProviderRef::unaliased(name), address);
	}

	for config in module.provider_configs.values() {
		let Some(alias) = &config.alias else {
			continue;
		};

		if let Some(address) = references.get(&ProviderRef::unaliased(&config.name)).cloned() {
			references.insert(ProviderRef::new(&config.name, alias), address);
		}
	}

	let bound = module
		.resources
		.values()
		.map(|resource| &resource.provider)
		.chain(module.data_sources.values().map(|data| &data.provider));

	for provider in bound {
		if provider.is_resolved() && !references.contains_key(provider) {
			references.insert(provider.clone(), ProviderAddress::implied(&provider.local_name));
		}
	}

	(references, diagnostics)
}
