use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;

use solid_forge_core::config::Config;
use solid_forge_core::installer::{self, PackageManager};
use solid_forge_core::registry::{IntegrationDecl, IntegrationRegistry, PostInstall};
use solid_forge_core::scaffold::{self, Template};
use solid_forge_core::transform::{TransformEngine, TransformRequest};
use solid_forge_core::{Result, SolidForgeError};

mod args;
use args::{Cli, Commands, ConfigAction, Shell, Variation};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let base_dir = resolve_base_dir(cli.base_dir);

    let result = match cli.command {
        Some(Commands::Add {
            integrations,
            force,
            path,
            dry_run,
            no_install,
        }) => handle_add(
            &base_dir,
            &integrations,
            force,
            path.as_deref(),
            dry_run,
            no_install,
            cli.quiet,
            cli.verbose,
        ),
        Some(Commands::New {
            variation,
            name,
            stackblitz,
        }) => handle_new(&base_dir, variation, name.as_deref(), stackblitz, cli.quiet),
        Some(Commands::Config { action }) => handle_config(action, &base_dir),
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(())
        }
        None => {
            Cli::command().print_help().ok();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn resolve_base_dir(cli_base: Option<PathBuf>) -> PathBuf {
    if let Some(base) = cli_base {
        return base;
    }

    if let Ok(base) = std::env::var("SOLID_FORGE_BASE") {
        return PathBuf::from(base);
    }

    dirs::home_dir()
        .map(|h| h.join(".solid-forge"))
        .unwrap_or_else(|| PathBuf::from(".solid-forge"))
}

#[allow(clippy::too_many_arguments)]
fn handle_add(
    base_dir: &Path,
    names: &[String],
    force: bool,
    path: Option<&Path>,
    dry_run: bool,
    no_install: bool,
    quiet: bool,
    verbose: bool,
) -> Result<()> {
    let registry = IntegrationRegistry::builtin();

    if names.is_empty() {
        print_integrations(registry);
        return Ok(());
    }

    let config = Config::load(base_dir)?;
    let project_dir = match path {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let config_path = project_dir.join(&config.add.config_file);
    if !config_path.exists() {
        return Err(SolidForgeError::ConfigNotFound { path: config_path });
    }
    if verbose {
        println!("{} {}", "Editing".cyan(), config_path.display());
    }

    let source = fs::read_to_string(&config_path)?;
    let engine = TransformEngine::new(registry);
    let request = TransformRequest {
        integrations: names.to_vec(),
        force: force || config.add.force,
    };
    let result = engine.transform(&source, &request)?;

    for warning in &result.warnings {
        eprintln!("{} {}", "[WARN]".yellow().bold(), warning);
    }

    if dry_run {
        print!("{}", result.source);
        if !quiet {
            eprintln!("{} dry run, nothing written", "[OK]".green().bold());
        }
        return Ok(());
    }

    write_atomic(&config_path, &result.source)?;
    if !quiet {
        println!(
            "{} {} updated ({} added, {} skipped, {} overwritten)",
            "[OK]".green().bold(),
            config.add.config_file.cyan(),
            result.inserted,
            result.skipped_duplicates,
            result.overwritten
        );
    }

    let selected = selected_decls(registry, names);
    run_post_install(&project_dir, &selected, quiet);

    if !no_install {
        let manager = PackageManager::detect(&project_dir);
        if verbose {
            println!("Package manager detected as {}", manager);
        }

        let present = installer::installed_dependencies(&project_dir).unwrap_or_default();
        let packages: Vec<String> = selected
            .iter()
            .map(|d| d.npm_package())
            .filter(|p| !present.contains(p))
            .collect();

        if packages.is_empty() {
            if !quiet {
                println!("{} all packages already installed", "[OK]".green().bold());
            }
        } else {
            if !quiet {
                println!(
                    "Installing {} via {}",
                    packages.join(" ").yellow(),
                    manager.to_string().cyan()
                );
            }
            installer::install_packages(&project_dir, manager, &packages)?;
            if !quiet {
                println!("{} packages installed", "[OK]".green().bold());
            }
        }
    }

    Ok(())
}

/// Declarations behind the requested names, deduplicated, request order
fn selected_decls<'r>(registry: &'r IntegrationRegistry, names: &[String]) -> Vec<&'r IntegrationDecl> {
    let mut selected: Vec<&IntegrationDecl> = Vec::new();
    for name in names {
        if let Some(decl) = registry.lookup(name) {
            if !selected.iter().any(|d| d.name == decl.name) {
                selected.push(decl);
            }
        }
    }
    selected
}

/// Post-install hooks run after a successful write; a failing hook is
/// reported but never rolls the config edit back
fn run_post_install(project_dir: &Path, selected: &[&IntegrationDecl], quiet: bool) {
    for decl in selected {
        let Some(hook) = &decl.post_install else {
            continue;
        };
        match hook {
            PostInstall::WriteFileIfAbsent { path, contents } => {
                let target = project_dir.join(path);
                if target.exists() {
                    continue;
                }
                match fs::write(&target, contents) {
                    Ok(()) => {
                        if !quiet {
                            println!("{} created {}", "[OK]".green().bold(), path.cyan());
                        }
                    }
                    Err(e) => eprintln!(
                        "{} post-install for {} failed: {}",
                        "[WARN]".yellow().bold(),
                        decl.name,
                        e
                    ),
                }
            }
        }
    }
}

/// Write the full replacement text via temp file + rename so a crash never
/// leaves a half-written config behind
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.persist(path).map_err(|e| SolidForgeError::Io(e.error))?;
    Ok(())
}

fn print_integrations(registry: &IntegrationRegistry) {
    println!();
    println!("{}", "Supported integrations:".cyan().bold());
    println!();
    for decl in registry.decls() {
        println!("  {} {}", decl.name.yellow(), decl.import_source.dimmed());
    }
    println!();
    println!("{}", "To add:".dimmed());
    println!("  {}", "solid-forge add <name> [--force]".dimmed());
}

fn handle_new(
    base_dir: &Path,
    variation: Variation,
    name: Option<&str>,
    stackblitz: bool,
    quiet: bool,
) -> Result<()> {
    let template = template_for(variation);

    if stackblitz {
        let url = scaffold::stackblitz_url(template);
        scaffold::open_in_browser(&url)?;
        if !quiet {
            println!("{} opened {}", "[OK]".green().bold(), url.cyan());
        }
        return Ok(());
    }

    let config = Config::load(base_dir)?;
    let manager = PackageManager::detect(&std::env::current_dir()?);
    scaffold::create_project(template, name, manager, &config.scaffold.template_repo)?;
    if !quiet {
        println!(
            "{} created project from {}/{}",
            "[OK]".green().bold(),
            config.scaffold.template_repo,
            template.as_str().yellow()
        );
    }
    Ok(())
}

fn template_for(variation: Variation) -> Template {
    match variation {
        Variation::Bare => Template::Bare,
        Variation::Ts => Template::Ts,
        Variation::Js => Template::Js,
    }
}

fn handle_config(action: ConfigAction, base_dir: &Path) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load(base_dir)?;
            match config.get(&key) {
                Some(value) => {
                    println!("{}", value);
                    Ok(())
                }
                None => Err(SolidForgeError::ConfigKeyNotFound { key }),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(base_dir)?;
            config.set(&key, &value)?;
            config.save(base_dir)?;
            println!("{} {} = {}", "[OK]".green().bold(), key, value);
            Ok(())
        }
        ConfigAction::List => {
            let config = Config::load(base_dir)?;
            for (key, value) in config.list() {
                println!("{} = {}", key.cyan(), value);
            }
            Ok(())
        }
        ConfigAction::Init => {
            let path = Config::init(base_dir)?;
            println!("{} wrote {}", "[OK]".green().bold(), path.display());
            Ok(())
        }
    }
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "solid-forge", &mut io::stdout());
}
