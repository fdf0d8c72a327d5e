//! `tfmeta_core` is an early, partial semantic decoder for Terraform modules.
//! It walks already-parsed [`hcl-edit`](https://docs.rs/hcl-edit) bodies and
//! extracts a cheap summary of a module without schema validation or
//! expression evaluation: required Terraform versions, provider requirements
//! and configurations, resources and data sources with the provider they are
//! bound to, and module calls.
//!
//! ## Processing Pipeline
//!
//! ```text
//! .tf file
//!   → hcl-edit parser (Body)
//!   → Schema filter (keeps terraform / provider / data / resource / module blocks)
//!   → Block dispatcher (extracts facts into a shared DecodedModule)
//!   → Module metadata (resolves provider source addresses and references)
//! ```
//!
//! Decoding never fails. Every problem becomes a [`Diagnostic`] and the
//! accumulator always holds whatever could be extracted.
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `tfmeta.toml`.
//! - [`project`]: Reading, parsing and decoding a module directory.
//! - [`schema`]: Filtering a body down to the blocks and attributes a
//!   decoder cares about.
//!
//! ## Quick Start
//!
//! ```rust
//! use tfmeta_core::DecodedModule;
//! use tfmeta_core::decode_body;
//!
//! let body = hcl_edit::parser::parse_body(
//! 	r#"
//! resource "aws_instance" "web" {
//!   provider = aws.east
//! }
//! "#,
//! )
//! .unwrap();
//!
//! let mut module = DecodedModule::new();
//! let diagnostics = decode_body(&body, &mut module);
//!
//! assert!(diagnostics.is_empty());
//! let web = &module.resources["resource.aws_instance.web"];
//! assert_eq!(web.provider.local_name, "aws");
//! assert_eq!(web.provider.alias, "east");
//! ```

pub use decoder::*;
pub use diagnostic::*;
pub use error::*;
pub use meta::*;
pub use module::*;
pub use position::*;
pub use reference::*;
pub use requirements::*;

pub mod config;
mod decoder;
mod diagnostic;
#[allow(unused_assignments)]
mod error;
pub(crate) mod lexer;
pub(crate) mod literal;
mod meta;
mod module;
mod position;
pub mod project;
mod reference;
mod requirements;
pub mod schema;
pub mod traversal;

#[cfg(test)]
mod __fixtures;
#[cfg(test)]
mod __tests;
