use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use tldr_studio::app::{self, Narration};
use tldr_studio::cli::{Cli, Commands, ConfigAction};
use tldr_studio::config::Config;
use tldr_studio::diagnostics::check_dependencies;
use tldr_studio::gateway::Voice;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    match cli.command {
        None | Some(Commands::Studio) => {
            let config = load_config(&cli)?;
            let mut pipeline = app::build_pipeline(&config)?;
            app::run_studio(&mut pipeline, cli.quiet)?;
        }
        Some(Commands::Run {
            ref topic,
            voice,
            ref audio,
            no_video,
        }) => {
            let config = load_config(&cli)?;
            let mut pipeline = app::build_pipeline(&config)?;
            let narration = match audio {
                Some(path) => Narration::Upload(path.clone()),
                None => Narration::Synthesize(voice),
            };
            let plan = app::production_plan(topic, narration, !no_video);
            if app::run_production(&mut pipeline, plan, cli.quiet).is_err() {
                // Already reported by the stage runner.
                std::process::exit(1);
            }
        }
        Some(Commands::Voices) => {
            let config = load_config(&cli)?;
            println!("Voices:");
            for voice in Voice::ALL {
                println!(
                    "  {} {:<7} → {}",
                    "●".green(),
                    voice.as_str(),
                    config.voices.provider_id(voice)
                );
            }
        }
        Some(Commands::Check) => {
            let config = load_config(&cli)?;
            if !check_dependencies(&config) {
                std::process::exit(1);
            }
        }
        Some(Commands::Config { ref action }) => {
            handle_config_command(action, &cli)?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "tldr-studio",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Log level from `-v` count unless `RUST_LOG` is set; `-q` always wins.
fn init_logging(quiet: bool, verbose: u8) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config), which must exist
/// 2. Default config path (~/.config/tldr-studio/config.toml)
/// 3. Built-in defaults
///
/// Environment overrides and `--timeout` are applied on top.
fn load_config(cli: &Cli) -> Result<Config> {
    let config = match cli.config.as_deref() {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load_or_default(&Config::default_path())?,
    };

    let mut config = config.with_env_overrides();
    if let Some(timeout) = cli.timeout {
        config.service.timeout_secs = Some(timeout.as_secs().max(1));
    }
    Ok(config)
}

/// Handle configuration commands.
fn handle_config_command(action: &ConfigAction, cli: &Cli) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(cli)?;
            print!("{}", config.to_redacted_toml()?);
        }
        ConfigAction::Path => {
            let path = cli
                .config
                .clone()
                .unwrap_or_else(Config::default_path);
            println!("{}", path.display());
        }
        ConfigAction::Dump => {
            print!("{}", Config::template()?);
        }
    }
    Ok(())
}
