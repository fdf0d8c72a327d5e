use std::collections::BTreeMap;
use std::path::Path;

use hcl_edit::expr::Expression;
use rstest::rstest;
use similar_asserts::assert_eq;
use tracing_test::traced_test;

use super::__fixtures::*;
use super::*;
use crate::config::TfMetaConfig;
use crate::lexer::parse_traversal_abs;
use crate::literal::decode_string;
use crate::project::ScanOptions;
use crate::project::load_module_dir;
use crate::schema::AttributeSchema;
use crate::schema::BlockHeaderSchema;
use crate::schema::BodySchema;
use crate::schema::ROOT_SCHEMA;
use crate::schema::partial_content;
use crate::traversal::IndexKey;
use crate::traversal::Traversal;
use crate::traversal::TraversalStep;

fn requirement(source: Option<&str>, versions: &[&str]) -> ProviderRequirement {
	ProviderRequirement {
		source: source.map(ToString::to_string),
		version_constraints: versions.iter().map(ToString::to_string).collect(),
	}
}

#[rstest]
#[case::prefixed("aws_instance", "aws")]
#[case::multiple_separators("google_compute_instance", "google")]
#[case::no_separator("instance", "instance")]
#[case::leading_separator("_thing", "")]
fn infers_provider_name_from_type(#[case] r#type: &str, #[case] expected: &str) {
	assert_eq!(infer_provider_name_from_type(r#type), expected);
}

#[test]
fn resource_without_provider_uses_inferred_provider() {
	let (module, diagnostics) = decode(
		r#"
resource "aws_instance" "web" {}
resource "instance" "plain" {}
data "google_project" "current" {}
"#,
	);

	assert!(diagnostics.is_empty());
	assert_eq!(
		module.resources["resource.aws_instance.web"].provider,
		ProviderRef::unaliased("aws")
	);
	assert_eq!(
		module.resources["resource.instance.plain"].provider,
		ProviderRef::unaliased("instance")
	);
	assert_eq!(
		module.data_sources["data.google_project.current"].provider,
		ProviderRef::unaliased("google")
	);
}

#[test]
fn merge_identical_sources_concatenates_constraints() {
	let mut existing = BTreeMap::new();
	let first = merge_provider_requirements(
		&mut existing,
		[(
			"aws".to_string(),
			requirement(Some("hashicorp/aws"), &["~> 5.0"]),
		)],
		None,
	);
	let second = merge_provider_requirements(
		&mut existing,
		[(
			"aws".to_string(),
			requirement(Some("hashicorp/aws"), &[">= 5.1", "~> 5.0"]),
		)],
		None,
	);

	assert!(first.is_empty());
	assert!(second.is_empty());
	assert_eq!(
		existing["aws"],
		requirement(Some("hashicorp/aws"), &["~> 5.0", ">= 5.1", "~> 5.0"])
	);
}

#[test]
fn merge_conflicting_sources_keeps_first() {
	let mut existing = BTreeMap::new();
	let _ = merge_provider_requirements(
		&mut existing,
		[(
			"aws".to_string(),
			requirement(Some("hashicorp/aws"), &["~> 5.0"]),
		)],
		None,
	);
	let diagnostics = merge_provider_requirements(
		&mut existing,
		[(
			"aws".to_string(),
			requirement(Some("example/aws"), &[">= 4.0"]),
		)],
		Some(SourceRange::new(10, 28)),
	);

	assert_eq!(diagnostics.len(), 1);
	assert_eq!(diagnostics[0].severity, Severity::Error);
	assert_eq!(diagnostics[0].summary, "Multiple provider source attributes");
	assert_eq!(
		diagnostics[0].detail,
		"Found multiple source attributes for provider aws: \"hashicorp/aws\", \"example/aws\""
	);
	assert_eq!(diagnostics[0].subject, Some(SourceRange::new(10, 28)));
	assert_eq!(
		existing["aws"],
		requirement(Some("hashicorp/aws"), &["~> 5.0", ">= 4.0"])
	);
}

#[test]
fn merge_adopts_source_when_none_recorded() {
	let mut existing = BTreeMap::new();
	existing.insert("aws".to_string(), requirement(None, &["~> 5.0"]));

	let diagnostics = merge_provider_requirements(
		&mut existing,
		[
			("aws".to_string(), requirement(Some("hashicorp/aws"), &[])),
			("google".to_string(), requirement(None, &["~> 4.0"])),
		],
		None,
	);

	assert!(diagnostics.is_empty());
	assert_eq!(existing["aws"], requirement(Some("hashicorp/aws"), &["~> 5.0"]));
	assert_eq!(existing["google"], requirement(None, &["~> 4.0"]));
}

#[test]
fn merge_without_source_keeps_recorded_source() {
	let mut existing = BTreeMap::new();
	existing.insert("aws".to_string(), requirement(Some("hashicorp/aws"), &[]));

	let diagnostics = merge_provider_requirements(
		&mut existing,
		[("aws".to_string(), requirement(None, &["~> 5.0"]))],
		None,
	);

	assert!(diagnostics.is_empty());
	assert_eq!(existing["aws"], requirement(Some("hashicorp/aws"), &["~> 5.0"]));
}

#[test]
fn conflicting_required_providers_across_blocks() {
	let (module, diagnostics) = decode(
		r#"
terraform {
  required_providers {
    aws = { source = "hashicorp/aws", version = "~> 5.0" }
  }
}

terraform {
  required_providers {
    aws = { source = "example/aws", version = ">= 4.0" }
  }
}
"#,
	);

	assert_eq!(summaries(&diagnostics), vec!["Multiple provider source attributes"]);
	assert!(diagnostics[0].subject.is_some());
	assert_eq!(
		module.provider_requirements["aws"],
		requirement(Some("hashicorp/aws"), &["~> 5.0", ">= 4.0"])
	);
}

#[rstest]
#[case::bare("aws.east", ProviderRef::new("aws", "east"))]
#[case::quoted(r#""aws.east""#, ProviderRef::new("aws", "east"))]
#[case::bare_without_alias("aws", ProviderRef::unaliased("aws"))]
#[case::quoted_without_alias(r#""aws""#, ProviderRef::unaliased("aws"))]
#[case::index_is_not_an_alias(r#"aws["east"]"#, ProviderRef::unaliased("aws"))]
#[case::extra_steps_ignored("aws.east.extra", ProviderRef::new("aws", "east"))]
#[case::parenthesized("(aws.east)", ProviderRef::new("aws", "east"))]
#[case::parenthesized_string(r#"("aws.east")"#, ProviderRef::new("aws", "east"))]
#[case::bool_names_root("true", ProviderRef::unaliased("true"))]
fn resolves_provider_reference(#[case] value: &str, #[case] expected: ProviderRef) {
	let (module, diagnostics) = decode(&format!(
		"resource \"aws_instance\" \"web\" {{\n  provider = {value}\n}}\n"
	));

	assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
	assert_eq!(module.resources["resource.aws_instance.web"].provider, expected);
}

#[rstest]
#[case::number("42")]
#[case::malformed_string(r#""aws..east""#)]
#[case::empty_string(r#""""#)]
#[case::function_call(r#"lookup(var.providers, "aws")"#)]
#[case::splat("aws[*].east")]
fn invalid_provider_reference(#[case] value: &str) {
	let source = format!("resource \"aws_instance\" \"web\" {{\n  provider = {value}\n}}\n");
	let (module, diagnostics) = decode(&source);

	assert_eq!(summaries(&diagnostics), vec!["Invalid provider reference"]);
	assert_eq!(diagnostics[0].severity, Severity::Error);
	assert_eq!(
		diagnostics[0].detail,
		"Provider argument requires a provider name followed by an optional alias, like \
		 \"aws.foo\"."
	);

	let subject = diagnostics[0].subject.expect("diagnostic should have a subject");
	assert_eq!(source[subject.start..subject.end].trim(), value);

	// The record exists even though its provider could not be resolved.
	let web = &module.resources["resource.aws_instance.web"];
	assert_eq!(web.provider, ProviderRef::default());
	assert!(!web.provider.is_resolved());
}

#[test]
fn duplicate_resource_in_one_pass_keeps_last() {
	let (module, diagnostics) = decode(
		r#"
resource "aws_instance" "web" {
  provider = aws.east
}

resource "aws_instance" "web" {
  provider = aws.west
}
"#,
	);

	assert!(diagnostics.is_empty());
	assert_eq!(module.resources.len(), 1);
	assert_eq!(
		module.resources["resource.aws_instance.web"].provider,
		ProviderRef::new("aws", "west")
	);
}

#[test]
fn duplicate_resource_across_passes_keeps_last() {
	let (module, diagnostics) = decode_files(&[
		"resource \"aws_instance\" \"web\" {\n  provider = aws.east\n}\n",
		"resource \"aws_instance\" \"web\" {}\n",
	]);

	assert!(diagnostics.is_empty());
	assert_eq!(module.resources.len(), 1);
	assert_eq!(
		module.resources["resource.aws_instance.web"].provider,
		ProviderRef::unaliased("aws")
	);
}

#[test]
fn resource_and_data_source_with_same_labels_do_not_collide() {
	let (module, diagnostics) = decode(
		r#"
resource "aws_ami" "ubuntu" {}
data "aws_ami" "ubuntu" {}
"#,
	);

	assert!(diagnostics.is_empty());
	assert!(module.resources.contains_key("resource.aws_ami.ubuntu"));
	assert!(module.data_sources.contains_key("data.aws_ami.ubuntu"));
}

#[test]
fn required_version_keeps_encounter_order() {
	let (module, diagnostics) = decode_files(&[
		"terraform {\n  required_version = \">= 1.3\"\n}\n",
		"terraform {\n  required_version = \"< 2.0\"\n}\n",
		"terraform {\n  required_version = \">= 1.3\"\n}\n",
	]);

	assert!(diagnostics.is_empty());
	assert_eq!(module.required_core, vec![">= 1.3", "< 2.0", ">= 1.3"]);
}

#[test]
fn non_literal_required_version_is_reported_and_skipped() {
	let (module, diagnostics) = decode(
		r#"
terraform {
  required_version = var.terraform_version
}
"#,
	);

	assert_eq!(summaries(&diagnostics), vec!["Variables not allowed"]);
	assert!(module.required_core.is_empty());
}

#[test]
fn provider_block_records_unversioned_dependency() {
	let (module, diagnostics) = decode("provider \"google\" {\n  project = \"demo\"\n}\n");

	assert!(diagnostics.is_empty());
	assert_eq!(module.provider_requirements["google"], requirement(None, &[]));
	assert_eq!(
		module.provider_configs["google"],
		ProviderConfig {
			name: "google".to_string(),
			alias: None,
		}
	);
}

#[test]
fn provider_block_version_and_alias() {
	let (module, diagnostics) = decode(
		r#"
provider "aws" {
  version = "~> 2.0"
  alias   = "east"
}

provider "aws" {
  alias = ""
}
"#,
	);

	assert!(diagnostics.is_empty());
	assert_eq!(module.provider_requirements["aws"], requirement(None, &["~> 2.0"]));
	assert_eq!(
		module.provider_configs.keys().collect::<Vec<_>>(),
		vec!["aws", "aws.east"]
	);
	assert_eq!(
		module.provider_configs["aws.east"].alias.as_deref(),
		Some("east")
	);
	assert_eq!(module.provider_configs["aws"].alias, None);
}

#[test]
fn provider_block_with_non_literal_alias() {
	let (module, diagnostics) = decode("provider \"aws\" {\n  alias = var.alias\n}\n");

	assert_eq!(summaries(&diagnostics), vec!["Variables not allowed"]);
	assert!(module.provider_configs.contains_key("aws"));
}

#[test]
fn module_calls_record_source() {
	let (module, diagnostics) = decode(
		r#"
module "vpc" {
  source = "terraform-aws-modules/vpc/aws"
}

module "dynamic" {
  source = "${path.module}/child"
}

module "sourceless" {}
"#,
	);

	assert_eq!(summaries(&diagnostics), vec!["Invalid expression"]);
	assert_eq!(
		module.module_calls["module.vpc"].source.as_deref(),
		Some("terraform-aws-modules/vpc/aws")
	);
	assert_eq!(module.module_calls["module.dynamic"].source, None);
	assert_eq!(module.module_calls["module.sourceless"].source, None);
}

#[rstest]
#[case::string(r#""./child""#, "./child")]
#[case::parenthesized(r#"("./child")"#, "./child")]
#[case::interpolated(r#""./${"child"}""#, "")]
#[case::heredoc("<<EOT\n./child\nEOT\n", "./child")]
fn module_source_accepts_static_values(#[case] value: &str, #[case] expected: &str) {
	let (module, diagnostics) = decode(&format!("module \"child\" {{\n  source = {value}\n}}\n"));
	let source = module.module_calls["module.child"].source.as_deref();

	if expected.is_empty() {
		assert_eq!(summaries(&diagnostics), vec!["Invalid expression"]);
		assert_eq!(source, None);
	} else {
		assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
		assert_eq!(source.map(str::trim_end), Some(expected));
	}
}

#[rstest]
#[case::number("1", "1")]
#[case::bool("true", "true")]
#[case::parenthesized(r#"(">= 1.3")"#, ">= 1.3")]
fn required_version_converts_static_values(#[case] value: &str, #[case] expected: &str) {
	let (module, diagnostics) = decode(&format!("terraform {{\n  required_version = {value}\n}}\n"));

	assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
	assert_eq!(module.required_core, vec![expected]);
}

#[test]
fn decodes_complete_module() {
	let (module, diagnostics) = decode(MAIN_TF);

	assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
	assert_eq!(module.required_core, vec![">= 1.3"]);
	assert_eq!(
		module.provider_requirements["aws"],
		requirement(Some("hashicorp/aws"), &["~> 5.0"])
	);
	assert_eq!(module.provider_requirements["random"], requirement(None, &["~> 3.1"]));
	assert_eq!(
		module.provider_configs.keys().collect::<Vec<_>>(),
		vec!["aws", "aws.east"]
	);
	assert_eq!(
		module.resources.keys().collect::<Vec<_>>(),
		vec![
			"resource.aws_instance.replica",
			"resource.aws_instance.web",
			"resource.random_pet.name",
		]
	);
	assert_eq!(
		module.resources["resource.aws_instance.replica"].provider,
		ProviderRef::new("aws", "east")
	);
	assert_eq!(
		module.data_sources["data.aws_ami.ubuntu"].provider,
		ProviderRef::new("aws", "east")
	);
	assert_eq!(
		module.module_calls["module.vpc"],
		ModuleCall {
			name: "vpc".to_string(),
			source: Some("terraform-aws-modules/vpc/aws".to_string()),
		}
	);
}

#[test]
fn multiple_files_merge_into_one_module() {
	let (module, diagnostics) = decode_files(&[MAIN_TF, VERSIONS_TF]);

	assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
	assert_eq!(module.required_core, vec![">= 1.3", "< 2.0"]);
	assert_eq!(
		module.provider_requirements["aws"],
		requirement(Some("hashicorp/aws"), &["~> 5.0", ">= 5.1"])
	);
	assert_eq!(
		module.provider_requirements["google"],
		requirement(Some("hashicorp/google"), &[])
	);
}

#[test]
fn required_providers_reports_invalid_entries() {
	let (module, diagnostics) = decode(
		r#"
terraform {
  required_providers {
    AWS    = { source = "hashicorp/aws" }
    broken = 5
    templated = { source = "hashicorp/${var.name}" }

    nested {}
  }
}
"#,
	);

	assert_eq!(
		summaries(&diagnostics),
		vec![
			"Invalid provider local name",
			"Invalid required_providers object",
			"Invalid expression",
			"Unexpected \"nested\" block",
		]
	);
	// Entries are still recorded so later declarations can merge into them.
	assert_eq!(module.provider_requirements["AWS"], requirement(Some("hashicorp/aws"), &[]));
	assert_eq!(module.provider_requirements["broken"], requirement(None, &[]));
	assert_eq!(module.provider_requirements["templated"], requirement(None, &[]));
}

#[test]
fn required_providers_object_converts_static_version() {
	let (module, diagnostics) = decode(
		r#"
terraform {
  required_providers {
    aws = { source = ("hashicorp/aws"), version = 5 }
  }
}
"#,
	);

	assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
	assert_eq!(module.provider_requirements["aws"], requirement(Some("hashicorp/aws"), &["5"]));
}

#[test]
fn unrelated_blocks_and_attributes_are_ignored() {
	let (module, diagnostics) = decode(
		r#"
locals {
  name = "demo"
}

variable "region" {
  default = "us-east-1"
}

output "id" {
  value = aws_instance.web.id
}

top_level = true
"#,
	);

	assert!(diagnostics.is_empty());
	assert_eq!(module, DecodedModule::new());
}

#[rstest]
#[case::resource_missing_name(
	"resource \"aws_instance\" {}\n",
	"Missing name for resource"
)]
#[case::data_missing_type("data {}\n", "Missing type for data")]
#[case::provider_extra_label(
	"provider \"aws\" \"east\" {}\n",
	"Extraneous label for provider"
)]
#[case::terraform_labelled("terraform \"x\" {}\n", "Extraneous label for terraform")]
#[case::module_as_attribute("module = \"x\"\n", "Unsupported argument")]
fn shape_violations_are_reported(#[case] source: &str, #[case] summary: &str) {
	let (module, diagnostics) = decode(source);

	assert_eq!(summaries(&diagnostics), vec![summary]);
	assert_eq!(module, DecodedModule::new());
}

#[test]
fn shape_violation_does_not_stop_decoding() {
	let (module, diagnostics) = decode(
		r#"
resource "aws_instance" {}

resource "aws_instance" "web" {}

module "vpc" {
  source = "./vpc"
}
"#,
	);

	assert_eq!(summaries(&diagnostics), vec!["Missing name for resource"]);
	assert!(module.resources.contains_key("resource.aws_instance.web"));
	assert!(module.module_calls.contains_key("module.vpc"));
}

#[test]
fn partial_content_checks_attributes() {
	const SCHEMA: BodySchema = BodySchema {
		attributes: &[
			AttributeSchema::required("source"),
			AttributeSchema::optional("version"),
		],
		blocks: &[BlockHeaderSchema {
			kind: "lifecycle",
			label_names: &[],
		}],
	};

	let mut body = parse(
		r#"
version = "1.0"
lifecycle = true
source {}
ignored = 1
lifecycle {}
"#,
	);
	// The parser rejects a repeated argument itself, so the second
	// `version` is added to the already parsed body.
	let mut duplicate = body
		.get_attribute("version")
		.cloned()
		.expect("fixture declares version");
	duplicate.value = Expression::from("2.0");
	body.push(duplicate);

	let (content, diagnostics) = partial_content(&body, &SCHEMA);

	assert_eq!(
		summaries(&diagnostics),
		vec![
			"Unsupported argument",
			"Unsupported block type",
			"Duplicate argument",
			"Missing required argument",
		]
	);
	assert!(diagnostics[2].subject.is_some());
	assert_eq!(content.attributes.keys().copied().collect::<Vec<_>>(), vec!["version"]);
	assert_eq!(
		decode_string(&content.attributes["version"].value).as_deref(),
		Ok("1.0")
	);
	assert_eq!(content.blocks.len(), 1);
	assert_eq!(content.blocks[0].kind, "lifecycle");
}

#[test]
fn partial_content_keeps_labels_and_header_range() {
	let source = "resource \"aws_instance\" \"web\" {}\n";
	let body = parse(source);
	let (content, diagnostics) = partial_content(&body, &ROOT_SCHEMA);

	assert!(diagnostics.is_empty());
	let block = &content.blocks[0];
	assert_eq!(block.labels, vec!["aws_instance", "web"]);
	let range = block.def_range.expect("parsed blocks have a range");
	assert_eq!(range.start, 0);
	assert!(source[range.start..range.end].starts_with("resource \"aws_instance\" \"web"));
}

#[rstest]
#[case::root("aws", Some(Traversal::new("aws")))]
#[case::alias(
	"aws.east",
	Some(Traversal::new("aws").with_step(TraversalStep::Attr("east".to_string())))
)]
#[case::padded(
	" aws . east ",
	Some(Traversal::new("aws").with_step(TraversalStep::Attr("east".to_string())))
)]
#[case::string_index(
	r#"module.vpc["a"]"#,
	Some(
		Traversal::new("module")
			.with_step(TraversalStep::Attr("vpc".to_string()))
			.with_step(TraversalStep::Index(IndexKey::String("a".to_string())))
	)
)]
#[case::number_index(
	"list[3]",
	Some(Traversal::new("list").with_step(TraversalStep::Index(IndexKey::Number(3))))
)]
#[case::legacy_index(
	"list.0",
	Some(Traversal::new("list").with_step(TraversalStep::Index(IndexKey::Number(0))))
)]
#[case::empty("", None)]
#[case::leading_digit("1aws", None)]
#[case::trailing_dot("aws.", None)]
#[case::double_dot("aws..east", None)]
#[case::unclosed_index("aws[0", None)]
#[case::two_names("aws east", None)]
#[case::splat("aws[*]", None)]
fn parses_quoted_traversals(#[case] input: &str, #[case] expected: Option<Traversal>) {
	assert_eq!(parse_traversal_abs(input), expected);
}

#[rstest]
#[case::unqualified("aws", ProviderAddress::new("registry.terraform.io", "hashicorp", "aws"))]
#[case::namespaced(
	"integrations/github",
	ProviderAddress::new("registry.terraform.io", "integrations", "github")
)]
#[case::hosted(
	"example.com/Corp/Thing",
	ProviderAddress::new("example.com", "corp", "thing")
)]
#[case::builtin("terraform", ProviderAddress::new("terraform.io", "builtin", "terraform"))]
fn parses_provider_addresses(#[case] source: &str, #[case] expected: ProviderAddress) {
	assert_eq!(ProviderAddress::parse(source), Ok(expected));
}

#[rstest]
#[case::empty_part("hashicorp//aws")]
#[case::too_many_parts("a/b/c/d")]
#[case::invalid_character("hashicorp/a ws")]
fn rejects_invalid_provider_addresses(#[case] source: &str) {
	assert!(ProviderAddress::parse(source).is_err());
}

#[test]
fn load_module_resolves_provider_references() {
	let files = BTreeMap::from([
		("main.tf".to_string(), parse(MAIN_TF)),
		("versions.tf".to_string(), parse(VERSIONS_TF)),
		(
			"extra.tf".to_string(),
			parse("resource \"null_resource\" \"x\" {}\nresource \"aws_vpc\" \"v\" {\n  provider = aws.west\n}\n"),
		),
	]);
	let decoded = load_module(Path::new("modules/app"), &files);

	assert!(!decoded.has_errors());
	assert_eq!(
		decoded.file_diagnostics.keys().collect::<Vec<_>>(),
		vec!["extra.tf", "main.tf", "versions.tf"]
	);

	let meta = &decoded.meta;
	assert_eq!(meta.path, Path::new("modules/app"));
	// Files are decoded in name order.
	assert_eq!(meta.core_requirements, vec![">= 1.3", "< 2.0"]);

	let references = meta
		.provider_references
		.iter()
		.map(|(reference, address)| (reference.to_string(), address.to_string()))
		.collect::<Vec<_>>();
	assert_eq!(
		references,
		vec![
			("aws".to_string(), "registry.terraform.io/hashicorp/aws".to_string()),
			("aws.east".to_string(), "registry.terraform.io/hashicorp/aws".to_string()),
			("aws.west".to_string(), "registry.terraform.io/hashicorp/aws".to_string()),
			("google".to_string(), "registry.terraform.io/hashicorp/google".to_string()),
			("null".to_string(), "registry.terraform.io/hashicorp/null".to_string()),
			("random".to_string(), "registry.terraform.io/hashicorp/random".to_string()),
		]
	);
}

#[test]
fn load_module_reports_invalid_sources() {
	let files = BTreeMap::from([(
		"main.tf".to_string(),
		parse("terraform {\n  required_providers {\n    aws = { source = \"a//b\" }\n  }\n}\n"),
	)]);
	let decoded = load_module(Path::new("."), &files);

	assert!(decoded.has_errors());
	assert_eq!(summaries(&decoded.diagnostics), vec!["Invalid provider source"]);
	assert!(decoded.meta.provider_references.is_empty());
}

#[test]
fn decoded_modules_merge_like_sequential_passes() {
	let (mut merged, _) = decode(MAIN_TF);
	let (other, _) = decode(
		r#"
terraform {
  required_version = "< 2.0"
  required_providers {
    aws = { source = "example/aws", version = ">= 5.1" }
  }
}

resource "aws_instance" "web" {
  provider = aws.east
}
"#,
	);

	let diagnostics = merged.merge(other);

	assert_eq!(summaries(&diagnostics), vec!["Multiple provider source attributes"]);
	assert_eq!(merged.required_core, vec![">= 1.3", "< 2.0"]);
	assert_eq!(
		merged.provider_requirements["aws"],
		requirement(Some("hashicorp/aws"), &["~> 5.0", ">= 5.1"])
	);
	assert_eq!(
		merged.resources["resource.aws_instance.web"].provider,
		ProviderRef::new("aws", "east")
	);
}

#[test]
fn module_meta_serializes_references_by_name() -> AnyEmptyResult {
	let files = BTreeMap::from([("main.tf".to_string(), parse(MAIN_TF))]);
	let decoded = load_module(Path::new("app"), &files);
	let json = serde_json::to_string(&decoded.meta)?;

	assert!(json.contains("\"aws.east\":\"registry.terraform.io/hashicorp/aws\""));
	assert!(json.contains("\"resource.aws_instance.replica\""));
	assert!(json.contains("\"type\":\"aws_instance\""));

	Ok(())
}

#[rstest]
#[case::start("ab\ncd", 0, Point::new(1, 1, 0))]
#[case::same_line("ab\ncd", 1, Point::new(1, 2, 1))]
#[case::next_line("ab\ncd", 4, Point::new(2, 2, 4))]
#[case::past_end("ab", 10, Point::new(1, 3, 2))]
fn computes_points_from_offsets(#[case] source: &str, #[case] offset: usize, #[case] expected: Point) {
	assert_eq!(Point::from_offset(source, offset), expected);
}

#[test]
fn diagnostics_count_by_severity() {
	let diagnostics: Diagnostics = vec![
		Diagnostic::error("a", ""),
		Diagnostic::warning("b", ""),
		Diagnostic::error("c", ""),
	]
	.into();

	assert!(diagnostics.has_errors());
	assert_eq!(diagnostics.error_count(), 2);
	assert_eq!(diagnostics.warning_count(), 1);
	assert!(!Diagnostics::from(Diagnostic::warning("d", "")).has_errors());
}

#[test]
#[traced_test]
fn decoding_emits_debug_events() {
	let (_, diagnostics) = decode(MAIN_TF);

	assert!(diagnostics.is_empty());
	assert!(logs_contain("decoded module body"));
}

#[test]
fn loads_module_directory() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	std::fs::write(tmp.path().join("main.tf"), MAIN_TF)?;
	std::fs::write(tmp.path().join("versions.tf"), VERSIONS_TF)?;
	std::fs::write(tmp.path().join("broken.tf"), "resource \"x\" {\n")?;
	std::fs::write(
		tmp.path().join("local_override.tf"),
		"terraform {\n  required_version = \"= 0.12\"\n}\n",
	)?;
	std::fs::write(tmp.path().join("notes.md"), "# not terraform\n")?;
	std::fs::write(
		tmp.path().join("tfmeta.toml"),
		"[scan]\nexclude = [\"*_override.tf\"]\n",
	)?;

	let config = TfMetaConfig::load(tmp.path())?;
	let options = ScanOptions::from_config(config.as_ref())?;
	let loaded = load_module_dir(tmp.path(), &options)?;

	assert_eq!(
		loaded
			.files
			.iter()
			.map(|file| file.name.as_str())
			.collect::<Vec<_>>(),
		vec!["broken.tf", "main.tf", "versions.tf"]
	);
	assert_eq!(
		summaries(&loaded.file_diagnostics["broken.tf"]),
		vec!["Invalid HCL syntax"]
	);
	let broken = "resource \"x\" {\n";
	let subject = loaded.file_diagnostics["broken.tf"][0]
		.subject
		.expect("syntax error should point into the file");
	assert!(subject.start <= subject.end && subject.end <= broken.len());
	assert_eq!(loaded.error_count(), 1);
	assert_eq!(loaded.meta.core_requirements, vec![">= 1.3", "< 2.0"]);
	assert_eq!(loaded.rendered_diagnostics().len(), 1);

	Ok(())
}

#[test]
fn missing_module_directory_is_an_error() {
	let tmp = tempfile::tempdir().expect("tempdir");
	let result = load_module_dir(&tmp.path().join("missing"), &ScanOptions::default());

	assert!(matches!(result, Err(TfError::MissingDirectory(_))));
}

#[test]
fn invalid_config_is_an_error() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join(".tfmeta.toml"), "[scan\n")?;

	let result = TfMetaConfig::load(tmp.path());
	assert!(matches!(result, Err(TfError::ConfigParse(_))));

	Ok(())
}

#[test]
fn config_defaults_when_missing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	assert!(TfMetaConfig::load(tmp.path())?.is_none());
	let options = ScanOptions::from_config(None)?;
	assert_eq!(options.extensions, vec!["tf"]);

	Ok(())
}
