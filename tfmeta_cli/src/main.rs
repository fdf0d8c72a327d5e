use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use tfmeta_cli::Commands;
use tfmeta_cli::OutputFormat;
use tfmeta_cli::TfMetaCli;
use tfmeta_core::ProviderRef;
use tfmeta_core::config::TfMetaConfig;
use tfmeta_core::project::LoadedModule;
use tfmeta_core::project::ScanOptions;
use tfmeta_core::project::load_module_dir;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = TfMetaCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match args.command {
		Some(Commands::Inspect { format }) => run_inspect(&args, format),
		Some(Commands::Check) => run_check(&args),
		None => {
			eprintln!("No subcommand specified. Run `tfmeta --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<tfmeta_core::TfError>() {
			Ok(tf_err) => {
				let report: miette::Report = (*tf_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Logs go to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let filter = if std::env::var_os("RUST_LOG").is_some() {
		EnvFilter::from_default_env()
	} else if verbose {
		EnvFilter::new("debug")
	} else {
		EnvFilter::new("warn")
	};

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(true)
		.try_init();
}

fn resolve_root(args: &TfMetaCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn print_section(title: &str) {
	println!();
	println!("{}", colored!(title, bold));
}

fn print_field(label: &str, value: impl std::fmt::Display) {
	println!("  {label:<40} {value}");
}

fn load(args: &TfMetaCli) -> Result<(LoadedModule, Option<TfMetaConfig>), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = TfMetaConfig::load(&root)?;
	let options = ScanOptions::from_config(config.as_ref())?;
	let loaded = load_module_dir(&root, &options)?;

	if args.verbose {
		eprintln!(
			"Loaded module {}: {} file(s), {} resource(s), {} data source(s), {} module call(s)",
			root.display(),
			loaded.files.len(),
			loaded.meta.resources.len(),
			loaded.meta.data_sources.len(),
			loaded.meta.module_calls.len()
		);
	}

	Ok((loaded, config))
}

fn render_diagnostics(loaded: &LoadedModule) {
	for diagnostic in loaded.rendered_diagnostics() {
		let report = miette::Report::new(diagnostic);
		eprintln!("{report:?}");
	}
}

fn provider_label(provider: &ProviderRef) -> String {
	if provider.is_resolved() {
		provider.to_string()
	} else {
		"(unresolved)".to_string()
	}
}

fn run_inspect(args: &TfMetaCli, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
	let (loaded, _) = load(args)?;

	match format {
		OutputFormat::Json => {
			let output = serde_json::json!({
				"module": loaded.meta,
				"diagnostics": diagnostics_json(&loaded),
			});
			println!("{}", serde_json::to_string_pretty(&output)?);
		}
		OutputFormat::Text => {
			render_diagnostics(&loaded);
			print_summary(&loaded);
		}
	}

	Ok(())
}

fn print_summary(loaded: &LoadedModule) {
	let meta = &loaded.meta;

	println!("{} {}", colored!("Module", bold), meta.path.display());

	print_section("Terraform versions");
	if meta.core_requirements.is_empty() {
		println!("  (any)");
	}
	for constraint in &meta.core_requirements {
		println!("  {constraint}");
	}

	print_section("Providers");
	for (name, requirement) in &meta.provider_requirements {
		let address = meta
			.provider_references
			.get(&ProviderRef::unaliased(name))
			.map_or_else(|| "(invalid source)".to_string(), ToString::to_string);
		let versions = if requirement.version_constraints.is_empty() {
			"any version".to_string()
		} else {
			requirement.version_constraints.join(", ")
		};
		print_field(name, format!("{address} ({versions})"));
	}

	print_section("Provider references");
	for (reference, address) in &meta.provider_references {
		print_field(&reference.to_string(), address);
	}

	print_section("Resources");
	for (key, resource) in &meta.resources {
		print_field(key, provider_label(&resource.provider));
	}

	print_section("Data sources");
	for (key, data_source) in &meta.data_sources {
		print_field(key, provider_label(&data_source.provider));
	}

	print_section("Module calls");
	for (key, module_call) in &meta.module_calls {
		print_field(key, module_call.source.as_deref().unwrap_or("(no source)"));
	}

	println!();
	println!(
		"{} file(s), {} error(s), {} warning(s)",
		loaded.files.len(),
		loaded.error_count(),
		loaded.warning_count()
	);
}

fn diagnostics_json(loaded: &LoadedModule) -> Vec<serde_json::Value> {
	let mut entries = Vec::new();

	for file in &loaded.files {
		let Some(diagnostics) = loaded.file_diagnostics.get(&file.name) else {
			continue;
		};

		for diagnostic in diagnostics {
			let start = diagnostic
				.subject
				.map(|subject| subject.start_point(&file.content));

			entries.push(serde_json::json!({
				"file": file.name,
				"severity": diagnostic.severity,
				"summary": diagnostic.summary,
				"detail": diagnostic.detail,
				"line": start.map(|point| point.line),
				"column": start.map(|point| point.column),
			}));
		}
	}

	for diagnostic in &loaded.diagnostics {
		entries.push(serde_json::json!({
			"file": null,
			"severity": diagnostic.severity,
			"summary": diagnostic.summary,
			"detail": diagnostic.detail,
			"line": null,
			"column": null,
		}));
	}

	entries
}

fn run_check(args: &TfMetaCli) -> Result<(), Box<dyn std::error::Error>> {
	let (loaded, config) = load(args)?;
	let deny_warnings = config.is_some_and(|config| config.check.deny_warnings);

	render_diagnostics(&loaded);

	let errors = loaded.error_count();
	let warnings = loaded.warning_count();

	if errors > 0 || (deny_warnings && warnings > 0) {
		eprintln!(
			"{} {errors} error(s), {warnings} warning(s)",
			colored!("Check failed:", red)
		);
		process::exit(1);
	}

	if warnings > 0 {
		println!("{} {warnings} warning(s)", colored!("warning:", yellow));
	}

	println!(
		"{} no problems found in {} file(s).",
		colored!("Check passed:", green),
		loaded.files.len()
	);

	Ok(())
}
