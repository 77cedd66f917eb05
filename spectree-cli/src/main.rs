use clap::Parser;
use spectree::{CommandLine, ConflictPolicy, Format, RenderOptions};
use spectree_cli::cli::{Cli, Commands};
use spectree_cli::commands;
use spectree_cli::config::{ConfigProvider, SpectreeConfig};
use spectree_cli::error::{handle_cli_result, CliResult};
use spectree_cli::exit_codes::{EXIT_ERROR, EXIT_SUCCESS};
use spectree_cli::loader;
use spectree_cli::logging::{configure_logging, Pretty};
use std::io::Write;
use std::process;

/// Load configuration with graceful error handling
///
/// A broken configuration file must not break completion in the shell, so errors are
/// logged and the defaults are used instead.
fn load_cli_configuration(cli: &Cli) -> SpectreeConfig {
    let mut config = match ConfigProvider::new().load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Failed to load configuration: {}", e);
            SpectreeConfig::default()
        }
    };

    if let Some(spec) = &cli.spec {
        config.spec = Some(spec.clone());
    }
    if cli.strict {
        config.conflicts = ConflictPolicy::Strict;
    }

    tracing::debug!("Effective configuration: {}", Pretty(&config));
    config
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    print!("{}", e);
                    process::exit(EXIT_SUCCESS);
                }
                _ => {
                    eprintln!("{}", e);
                    process::exit(EXIT_ERROR);
                }
            }
        }
    };

    // Completion scripts run on every keystroke; keep stderr silent unless asked
    let protocol = matches!(cli.command, Commands::Protocol { .. });
    let quiet = cli.quiet || (protocol && !cli.verbose && !cli.debug);
    configure_logging(cli.verbose, cli.debug, quiet);

    let config = load_cli_configuration(&cli);
    let exit_code = handle_cli_result(dispatch(cli.command, &config));
    process::exit(exit_code);
}

fn dispatch(command: Commands, config: &SpectreeConfig) -> CliResult<i32> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let code = match command {
        Commands::Protocol { words } => {
            let tree = loader::load_tree(config)?;
            let line = CommandLine::from_tokens(words, false);
            let options = RenderOptions {
                no_descriptions: config.no_descriptions,
            };
            commands::complete::run(&tree, &line, Format::Protocol, options, &mut out)?
        }
        Commands::Complete {
            format,
            line,
            trailing_space,
            no_descriptions,
            words,
        } => {
            let tree = loader::load_tree(config)?;
            let line = match line {
                Some(raw) => CommandLine::parse(&raw),
                None => CommandLine::from_tokens(words, trailing_space),
            };
            let options = RenderOptions {
                no_descriptions: no_descriptions || config.no_descriptions,
            };
            commands::complete::run(&tree, &line, format.into(), options, &mut out)?
        }
        Commands::Validate => commands::validate::run(config, &mut out)?,
        Commands::Tree { path } => {
            let tree = loader::load_tree(config)?;
            commands::tree::run(&tree, &path, &mut out)?
        }
    };

    out.flush()?;
    Ok(code)
}
