use std::io::Write;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

mod commands;
mod training;

use apiloom::{CallContext, Registry, Surface};
use apiloom_cli::exit_codes::{EXIT_ERROR, EXIT_SUCCESS};
use apiloom_cli::{CliGenerator, CliResult, StdinSource};
use apiloom_config::LoomConfig;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use training::TrainingLog;

/// Load configuration with graceful fallback to defaults
fn load_cli_configuration() -> LoomConfig {
    match apiloom_config::load_configuration() {
        Ok(config) => {
            tracing::debug!("Loaded configuration: {:?}", config);
            config
        }
        Err(e) => {
            tracing::warn!("Failed to load configuration: {}", e);
            eprintln!("Warning: Configuration loading failed: {}", e);
            eprintln!("Continuing with default configuration...");
            LoomConfig::default()
        }
    }
}

fn build_root() -> Command {
    Command::new("apiloom-demo")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A training log API exposed through generated commands and tools")
        .long_about(
            "
apiloom-demo serves an in-memory training log. Every endpoint is declared
once and projected onto the commands below, onto tool definitions, and onto
a fixture recording pass.

Example usage:
  apiloom-demo workouts list --start 2024-03-01    # Generated command
  apiloom-demo exercise squat                       # Generated command
  apiloom-demo tools                                # Tool definitions as JSON
  apiloom-demo serve                                # MCP server on stdio
  apiloom-demo lint --dir testdata/cassettes        # Check endpoint metadata
",
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable verbose logging"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Only log errors"),
        )
        .subcommand(
            Command::new("lint")
                .about("Check endpoint metadata against the cassette directory")
                .arg(
                    Arg::new("dir")
                        .long("dir")
                        .value_name("PATH")
                        .value_parser(value_parser!(PathBuf))
                        .help("Cassette directory (defaults to the configured one)"),
                ),
        )
        .subcommand(Command::new("tools").about("Print the generated tool definitions as JSON"))
        .subcommand(
            Command::new("call")
                .about("Call a generated tool")
                .arg(Arg::new("tool").required(true).help("Tool name"))
                .arg(
                    Arg::new("args")
                        .long("args")
                        .value_name("JSON")
                        .help("Tool arguments as a JSON object"),
                ),
        )
        .subcommand(Command::new("serve").about("Serve the generated tools as an MCP server on stdio"))
        .subcommand(
            Command::new("record")
                .about("Replay endpoints in dependency order without a live transport")
                .arg(Arg::new("cassette").help("Only record this cassette")),
        )
}

#[tokio::main]
async fn main() {
    let registry = training::registry();
    let client = Arc::new(TrainingLog::seeded());
    let generator = CliGenerator::new(&registry, client.clone());

    let matches = match generator.attach(build_root()).try_get_matches() {
        Ok(matches) => matches,
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

    configure_logging(
        matches.get_flag("verbose"),
        matches.get_flag("debug"),
        matches.get_flag("quiet"),
    );
    let config = load_cli_configuration();

    let exit_code = handle_matches(&matches, &registry, &generator, client, &config).await;
    process::exit(exit_code);
}

async fn handle_matches(
    matches: &ArgMatches,
    registry: &Registry<TrainingLog>,
    generator: &CliGenerator<'_, TrainingLog>,
    client: Arc<TrainingLog>,
    config: &LoomConfig,
) -> i32 {
    // The MCP transport owns stdout, so serving happens before it is locked
    if let Some(("serve", _)) = matches.subcommand() {
        return match commands::serve(registry, client).await {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                EXIT_ERROR
            }
        };
    }

    let mut stdout = std::io::stdout().lock();

    let result = match matches.subcommand() {
        Some(("lint", sub)) => {
            let dir = sub
                .get_one::<PathBuf>("dir")
                .cloned()
                .unwrap_or_else(|| config.cassette_dir.clone());
            commands::lint(registry, &dir, &mut stdout)
        }
        Some(("tools", _)) => commands::tools(registry, client, &mut stdout),
        Some(("call", sub)) => {
            let tool = sub.get_one::<String>("tool").map(String::as_str).unwrap_or_default();
            let arguments = sub.get_one::<String>("args").map(String::as_str);
            commands::call(registry, client, tool, arguments, &mut stdout).await
        }
        Some(("record", sub)) => {
            let cassette = sub.get_one::<String>("cassette").map(String::as_str);
            commands::record(registry, config, cassette, &mut stdout).await
        }
        Some((name, sub)) => {
            let ctx = CallContext::new(Surface::Cli);
            return handle_cli_result(
                generator
                    .dispatch(ctx, name, sub, StdinSource::detect(), &mut stdout)
                    .await,
            );
        }
        None => return EXIT_ERROR,
    };

    if let Err(e) = stdout.flush() {
        tracing::warn!("Failed to flush stdout: {}", e);
    }
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    }
}

/// Convert a CliResult to an exit code, reporting the error on stderr
fn handle_cli_result<T>(result: CliResult<T>) -> i32 {
    match result {
        Ok(_) => EXIT_SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn configure_logging(verbose: bool, debug: bool, quiet: bool) {
    use tracing::Level;
    use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

    let log_level = if quiet {
        Level::ERROR
    } else if debug {
        Level::DEBUG
    } else if verbose {
        Level::TRACE
    } else {
        Level::INFO
    };

    let filter = EnvFilter::try_from_env("APILOOM_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(format!("rmcp=warn,{log_level}")));

    registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
