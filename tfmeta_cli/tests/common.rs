use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub const MAIN_TF: &str = r#"
terraform {
  required_version = ">= 1.3"

  required_providers {
    aws = {
      source  = "hashicorp/aws"
      version = "~> 5.0"
    }
  }
}

provider "aws" {
  alias  = "east"
  region = "us-east-1"
}

resource "aws_instance" "web" {
  ami = "ami-123456"
}

data "aws_ami" "ubuntu" {
  provider = "aws.east"
}

module "vpc" {
  source = "terraform-aws-modules/vpc/aws"
}
"#;

pub fn tfmeta_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("tfmeta"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}
