//! Steadyhand CLI entry point

use clap::Parser;
use std::process::ExitCode;
use steadyhand_cli::{
    run_config, run_lint, Cli, CliConfig, CliResult, Commands, Reporter, Verbosity,
};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config.verbosity);

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Reporter::new(config.color.should_color(), config.verbosity.is_quiet())
                .failure(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &CliConfig) -> CliResult<()> {
    match &cli.command {
        Commands::Lint(args) => run_lint(config, args),
        Commands::Config(args) => run_config(config, args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.verbose, cli.quiet))
        .with_color(cli.color.clone().into())
}

/// Log to stderr; `RUST_LOG` overrides the verbosity default.
fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
