use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Serialize;

use crate::Diagnostics;
use crate::requirements::merge_provider_requirements;

/// Everything extracted from the files of one module.
///
/// Create one per module, pass it by `&mut` to [`decode_body`](crate::decode_body)
/// once per file, then read it. Later declarations overwrite earlier ones
/// that share a key; the only exception is provider requirements, which are
/// merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodedModule {
	/// `terraform.required_version` values in the order they were found.
	pub required_core: Vec<String>,
	/// Keyed by provider local name.
	pub provider_requirements: BTreeMap<String, ProviderRequirement>,
	/// Keyed by [`ProviderConfig::map_key`].
	pub provider_configs: BTreeMap<String, ProviderConfig>,
	/// Keyed by [`Resource::map_key`].
	pub resources: BTreeMap<String, Resource>,
	/// Keyed by [`DataSource::map_key`].
	pub data_sources: BTreeMap<String, DataSource>,
	/// Keyed by [`ModuleCall::map_key`].
	pub module_calls: BTreeMap<String, ModuleCall>,
}

impl DecodedModule {
	pub fn new() -> Self {
		Self::default()
	}

	/// Fold a module decoded independently (for example from another file on
	/// another thread) into this one, as if its files had been decoded here
	/// afterwards.
	pub fn merge(&mut self, other: DecodedModule) -> Diagnostics {
		self.required_core.extend(other.required_core);
		let diagnostics =
			merge_provider_requirements(&mut self.provider_requirements, other.provider_requirements, None);
		self.provider_configs.extend(other.provider_configs);
		self.resources.extend(other.resources);
		self.data_sources.extend(other.data_sources);
		self.module_calls.extend(other.module_calls);

		diagnostics
	}

	pub fn insert_provider_config(&mut self, config: ProviderConfig) {
		self.provider_configs.insert(config.map_key(), config);
	}

	pub fn insert_resource(&mut self, resource: Resource) {
		self.resources.insert(resource.map_key(), resource);
	}

	pub fn insert_data_source(&mut self, data_source: DataSource) {
		self.data_sources.insert(data_source.map_key(), data_source);
	}

	pub fn insert_module_call(&mut self, module_call: ModuleCall) {
		self.module_calls.insert(module_call.map_key(), module_call);
	}
}

/// What a module requires of one provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProviderRequirement {
	/// Registry source address, e.g. `hashicorp/aws`. Never `Some("")`.
	pub source: Option<String>,
	/// Unparsed version constraints in declaration order.
	pub version_constraints: Vec<String>,
}

/// A `provider` configuration block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderConfig {
	pub name: String,
	pub alias: Option<String>,
}

impl ProviderConfig {
	/// `name`, or `name.alias` for aliased configurations.
	pub fn map_key(&self) -> String {
		match &self.alias {
			Some(alias) => format!("{}.{alias}", self.name),
			None => self.name.clone(),
		}
	}
}

/// The provider configuration a resource, data source or module is bound to.
/// The default value is an unresolved reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ProviderRef {
	pub local_name: String,
	#[serde(skip_serializing_if = "String::is_empty")]
	pub alias: String,
}

impl ProviderRef {
	pub fn new(local_name: impl Into<String>, alias: impl Into<String>) -> Self {
		Self {
			local_name: local_name.into(),
			alias: alias.into(),
		}
	}

	pub fn unaliased(local_name: impl Into<String>) -> Self {
		Self::new(local_name, "")
	}

	pub fn is_resolved(&self) -> bool {
		!self.local_name.is_empty()
	}
}

impl Display for ProviderRef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.alias.is_empty() {
			write!(f, "{}", self.local_name)
		} else {
			write!(f, "{}.{}", self.local_name, self.alias)
		}
	}
}

/// A `resource` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
	pub r#type: String,
	pub name: String,
	pub provider: ProviderRef,
}

impl Resource {
	pub fn map_key(&self) -> String {
		format!("resource.{}.{}", self.r#type, self.name)
	}
}

/// A `data` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSource {
	pub r#type: String,
	pub name: String,
	pub provider: ProviderRef,
}

impl DataSource {
	pub fn map_key(&self) -> String {
		format!("data.{}.{}", self.r#type, self.name)
	}
}

/// A `module` block calling another module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleCall {
	pub name: String,
	pub source: Option<String>,
}

impl ModuleCall {
	pub fn map_key(&self) -> String {
		format!("module.{}", self.name)
	}
}
