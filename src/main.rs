//! ums-build - compose instruction modules into persona documents
//!
//! Entry point for the `ums-build` binary. Loads module sources, resolves a
//! persona against them and writes the rendered Markdown.

use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::Parser;
use tracing::{debug, info, warn};

use ums_build::build::{BuildEngine, BuildOptions};
use ums_build::cli::{Cli, Commands, ConfigSubcommand};
use ums_build::config::{self, BuildConfig};
use ums_build::error::{Error, Result};
use ums_build::loader::{
    discover_definition_files, load_sources, DefinitionKind, DefinitionLoader, FileLoader,
};
use ums_build::logging;
use ums_build::registry::{ConflictStrategy, ModuleRegistry, ModuleSource};
use ums_build::render::render_document;
use ums_build::types::Tier;
use ums_build::version;

fn main() {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    // Commands that don't need full logging
    match &cli.command {
        Commands::Version => {
            version::print_version();
            return Ok(());
        }
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            return handle_config_command(subcommand.clone(), cli.config.as_deref());
        }
        _ => {}
    }

    let config = BuildConfig::load(cli.config.as_deref())?;

    // The guards must be kept alive for the lifetime of the program
    let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;

    let build = version::build_info();
    debug!(
        version = %build.full_version(),
        target = %build.target,
        profile = %build.profile,
        "Starting ums-build"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create async runtime: {}", e)))?;

    match cli.command {
        Commands::Build {
            persona,
            output,
            report,
            strategy,
            attribution,
            sources,
        } => {
            let request = BuildRequest {
                persona,
                output,
                report,
                strategy: strategy.unwrap_or(config.build.conflict_strategy),
                attribution: attribution || config.build.attribution,
                extra_sources: sources,
                quiet: cli.quiet,
            };
            runtime.block_on(run_build(&config, request))
        }
        Commands::Validate { paths } => runtime.block_on(run_validate(&config, paths)),
        Commands::List { tier, strategy } => {
            let strategy = strategy.unwrap_or(config.build.conflict_strategy);
            let registry = runtime.block_on(load_registry(&config, &[], strategy))?;
            list_modules(&registry, tier)
        }
        Commands::Inspect { id, strategy } => {
            let strategy = strategy.unwrap_or(config.build.conflict_strategy);
            let registry = runtime.block_on(load_registry(&config, &[], strategy))?;
            inspect_module(&registry, &id)
        }
        Commands::Version | Commands::Config { .. } => {
            // Already handled above
            unreachable!();
        }
    }
}

/// Handle `config` subcommands
fn handle_config_command(subcommand: ConfigSubcommand, config_path: Option<&Path>) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show => {
            let cfg = BuildConfig::load(config_path)?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Created configuration file: {}", written.display());
        }
        ConfigSubcommand::Validate => {
            BuildConfig::load(config_path)?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}

/// Configured sources followed by `--source` directories as local sources
fn effective_sources(config: &BuildConfig, extra: &[PathBuf]) -> Vec<ModuleSource> {
    config
        .sources
        .iter()
        .cloned()
        .chain(extra.iter().map(ModuleSource::local))
        .collect()
}

async fn load_registry(
    config: &BuildConfig,
    extra: &[PathBuf],
    strategy: ConflictStrategy,
) -> Result<ModuleRegistry> {
    let sources = effective_sources(config, extra);
    if sources.is_empty() {
        warn!("No module sources configured; add [[sources]] to the configuration or pass --source");
    }

    let mut registry = ModuleRegistry::with_strategy(strategy);
    let summary = load_sources(&mut registry, &sources, &FileLoader::new()).await?;
    info!(
        sources = sources.len(),
        modules = summary.total(),
        distinct = registry.len(),
        "Module sources loaded"
    );
    Ok(registry)
}

// ─────────────────────────────────────────────────────────────────
// build
// ─────────────────────────────────────────────────────────────────

struct BuildRequest {
    persona: PathBuf,
    output: Option<PathBuf>,
    report: Option<PathBuf>,
    strategy: ConflictStrategy,
    attribution: bool,
    extra_sources: Vec<PathBuf>,
    quiet: bool,
}

async fn run_build(config: &BuildConfig, request: BuildRequest) -> Result<()> {
    let registry = load_registry(config, &request.extra_sources, request.strategy).await?;

    let mut persona = FileLoader::new().load_persona(&request.persona).await?;
    if request.attribution {
        persona = persona.with_attribution();
    }

    let mut tool = version::build_info().tool_meta();
    tool.built_at = Some(Utc::now());
    let engine = BuildEngine::new(BuildOptions {
        strategy: request.strategy,
        tool,
    });
    let output = engine.build(&persona, &registry)?;

    if !request.quiet {
        let label = if std::io::stderr().is_terminal() {
            "\x1b[33mWarning\x1b[0m"
        } else {
            "Warning"
        };
        for warning in &output.deprecation_warnings {
            eprintln!("{}: {}", label, warning.message);
        }
    }

    let document = render_document(&persona, &output.groups, &config.render_options());
    match &request.output {
        Some(path) => {
            write_file(path, &document)?;
            if !request.quiet {
                println!(
                    "Built '{}' ({} modules) -> {}",
                    persona.name,
                    output.module_count(),
                    path.display()
                );
            }
        }
        None => print!("{}", document),
    }

    let report_path = request.report.clone().or_else(|| {
        if !config.build.emit_report {
            return None;
        }
        if request.output.is_none() {
            warn!("emit_report is set but no --output was given; skipping build report");
        }
        request.output.as_deref().map(default_report_path)
    });
    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&output.report)?;
        write_file(&path, &format!("{}\n", json))?;
        info!(path = %path.display(), "Build report written");
    }

    Ok(())
}

/// `persona.md` -> `persona.build.json`
fn default_report_path(output: &Path) -> PathBuf {
    output.with_extension("build.json")
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(path, contents).map_err(|e| Error::IoWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// ─────────────────────────────────────────────────────────────────
// validate
// ─────────────────────────────────────────────────────────────────

async fn run_validate(config: &BuildConfig, paths: Vec<PathBuf>) -> Result<()> {
    let roots = if paths.is_empty() {
        config.sources.iter().map(|s| s.path.clone()).collect()
    } else {
        paths
    };

    let mut files = Vec::new();
    for root in &roots {
        if root.is_dir() {
            files.extend(discover_definition_files(root)?);
        } else {
            files.push(root.clone());
        }
    }

    let loader = FileLoader::new();
    let mut invalid = 0;
    for file in &files {
        let (kind, result) = match loader.check_file(file).await {
            Ok(checked) => checked,
            Err(e) => {
                invalid += 1;
                println!("✗ {}: {}", file.display(), e);
                continue;
            }
        };
        let label = match kind {
            DefinitionKind::Module => "module",
            DefinitionKind::Persona => "persona",
        };
        if result.valid {
            println!("✓ {} ({})", file.display(), label);
        } else {
            invalid += 1;
            println!("✗ {} ({})", file.display(), label);
            for error in &result.errors {
                println!("    error: {}", error);
            }
        }
        for warning in &result.warnings {
            println!("    warning: {}: {}", warning.path, warning.message);
        }
    }

    println!();
    println!("{} file(s) checked, {} invalid", files.len(), invalid);

    if invalid > 0 {
        return Err(Error::ValidationFailed {
            invalid,
            checked: files.len(),
        });
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────
// list / inspect
// ─────────────────────────────────────────────────────────────────

fn list_modules(registry: &ModuleRegistry, only: Option<Tier>) -> Result<()> {
    let tiers = registry.resolve_by_tier(None)?;
    let mut shown = 0;

    for (tier, modules) in tiers {
        if only.is_some_and(|t| t != tier) {
            continue;
        }
        println!("{}:", tier);
        for module in &modules {
            let marker = if module.is_deprecated() { " (deprecated)" } else { "" };
            println!(
                "  {:<48} {:<10} {}{}",
                module.id, module.version, module.metadata.name, marker
            );
        }
        shown += modules.len();
    }

    if shown == 0 {
        println!("No modules found.");
    }
    Ok(())
}

fn inspect_module(registry: &ModuleRegistry, id: &str) -> Result<()> {
    let entry = registry
        .resolve_entry(id, None)?
        .ok_or_else(|| Error::ModuleNotFound { id: id.to_string() })?;

    println!("Source: {}", entry.source);
    if let Some(conflicts) = registry.get_conflicts(id) {
        println!("Also defined in:");
        for other in conflicts.iter().filter(|e| !std::ptr::eq(*e, entry)) {
            println!("  {}", other.source);
        }
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&*entry.module)?);
    Ok(())
}
