//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Steadyhand: lint locator catalogs and inspect session configuration
#[derive(Parser, Debug)]
#[command(name = "steadyhand")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a locator catalog for entries that would fail to resolve
    Lint(LintArgs),

    /// Show the resolved session configuration
    Config(ConfigArgs),
}

/// Arguments for the lint command
#[derive(Args, Debug)]
pub struct LintArgs {
    /// Path to the locator catalog (JSON)
    pub path: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Settings file (YAML)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Highlight override; takes precedence over the environment and file
    #[arg(long, value_name = "BOOL")]
    pub highlight: Option<String>,
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::ColorChoice;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_lint_command() {
            let cli =
                Cli::try_parse_from(["steadyhand", "lint", "locators.json", "--json"]).unwrap();
            match cli.command {
                Commands::Lint(args) => {
                    assert_eq!(args.path, PathBuf::from("locators.json"));
                    assert!(args.json);
                }
                Commands::Config(_) => panic!("expected lint"),
            }
        }

        #[test]
        fn test_config_command() {
            let cli = Cli::try_parse_from([
                "steadyhand",
                "-vv",
                "config",
                "--file",
                "steadyhand.yaml",
                "--highlight",
                "TRUE",
            ])
            .unwrap();
            assert_eq!(cli.verbose, 2);
            match cli.command {
                Commands::Config(args) => {
                    assert_eq!(args.file, Some(PathBuf::from("steadyhand.yaml")));
                    assert_eq!(args.highlight.as_deref(), Some("TRUE"));
                }
                Commands::Lint(_) => panic!("expected config"),
            }
        }

        #[test]
        fn test_subcommand_required() {
            assert!(Cli::try_parse_from(["steadyhand"]).is_err());
        }

        #[test]
        fn test_lint_requires_path() {
            assert!(Cli::try_parse_from(["steadyhand", "lint"]).is_err());
        }
    }

    mod color_tests {
        use super::*;

        #[test]
        fn test_color_arg_conversion() {
            assert_eq!(ColorChoice::from(ColorArg::Auto), ColorChoice::Auto);
            assert_eq!(ColorChoice::from(ColorArg::Always), ColorChoice::Always);
            assert_eq!(ColorChoice::from(ColorArg::Never), ColorChoice::Never);
        }

        #[test]
        fn test_global_color_flag() {
            let cli = Cli::try_parse_from(["steadyhand", "config", "--color", "never"]).unwrap();
            assert!(matches!(cli.color, ColorArg::Never));
        }
    }
}
