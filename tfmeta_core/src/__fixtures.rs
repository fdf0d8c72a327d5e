use hcl_edit::structure::Body;

use crate::DecodedModule;
use crate::Diagnostics;
use crate::decode_body;

pub(crate) fn parse(source: &str) -> Body {
	hcl_edit::parser::parse_body(source).unwrap_or_else(|e| panic!("invalid fixture: {e}"))
}

/// Decode a single source into a fresh module.
pub(crate) fn decode(source: &str) -> (DecodedModule, Diagnostics) {
	let mut module = DecodedModule::new();
	let diagnostics = decode_body(&parse(source), &mut module);

	(module, diagnostics)
}

/// Decode several sources, in order, into one module.
pub(crate) fn decode_files(sources: &[&str]) -> (DecodedModule, Diagnostics) {
	let mut module = DecodedModule::new();
	let mut diagnostics = Diagnostics::new();

	for source in sources {
		diagnostics.extend(decode_body(&parse(source), &mut module));
	}

	(module, diagnostics)
}

pub(crate) fn summaries(diagnostics: &Diagnostics) -> Vec<&str> {
	diagnostics.iter().map(|diag| diag.summary.as_str()).collect()
}

pub(crate) const MAIN_TF: &str = r#"
terraform {
  required_version = ">= 1.3"

  required_providers {
    aws = {
      source  = "hashicorp/aws"
      version = "~> 5.0"
    }
    random = "~> 3.1"
  }
}

provider "aws" {
  region = "us-west-2"
}

provider "aws" {
  alias  = "east"
  region = "us-east-1"
}

resource "aws_instance" "web" {
  ami           = "ami-123456"
  instance_type = "t3.micro"
}

resource "aws_instance" "replica" {
  provider = aws.east
}

data "aws_ami" "ubuntu" {
  provider    = "aws.east"
  most_recent = true
}

resource "random_pet" "name" {}

module "vpc" {
  source = "terraform-aws-modules/vpc/aws"
  cidr   = "10.0.0.0/16"
}
"#;

pub(crate) const VERSIONS_TF: &str = r#"
terraform {
  required_version = "< 2.0"

  required_providers {
    aws = {
      version = ">= 5.1"
    }
    google = {
      source = "hashicorp/google"
    }
  }
}
"#;
