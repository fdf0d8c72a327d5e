use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Summarize and check Terraform modules without running Terraform.",
	long_about = "tfmeta reads the .tf files of a module directory and extracts the facts a tool \
	              needs before anything is evaluated: required Terraform versions, provider \
	              requirements and configurations, resources and data sources with the provider \
	              they use, and module calls.\n\nQuick start:\n  tfmeta inspect  Print the \
	              module summary\n  tfmeta check    Exit non-zero when the module has problems"
)]
pub struct TfMetaCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the module directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Print a summary of the module.
	///
	/// Lists required Terraform versions, provider requirements with their
	/// resolved source addresses, resources, data sources and module calls.
	/// Problems found while decoding are reported but do not change the exit
	/// status.
	Inspect {
		/// Output format. Use `text` for human-readable output or `json` for
		/// programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Check the module for problems.
	///
	/// Decodes every file and reports syntax errors, invalid provider
	/// references, conflicting provider sources and similar problems. Exits
	/// with status 1 when any error is found, or any warning when
	/// `deny_warnings` is set in `tfmeta.toml`.
	Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
