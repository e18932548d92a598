use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "apiscribe", version, about = "Exchange capture and API documentation synthesis")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the server (default)
    Serve,

    /// Run one documentation synthesis from the inventory and on-disk logs
    Generate,

    /// Delete captured exchanges older than the cutoff
    Clean {
        /// Keep exchanges newer than this many days
        #[arg(short, long, default_value = "30")]
        days_to_keep: u64,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display the effective configuration
    Show,

    /// Validate configuration file
    Validate,
}

impl Cli {
    /// Get the command to execute, defaulting to Serve if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli {
            config: PathBuf::from("config.toml"),
            command: None,
        };
        assert!(matches!(cli.get_command(), Commands::Serve));
    }

    #[test]
    fn test_cli_parsing_clean() {
        let args = vec!["apiscribe", "clean", "--days-to-keep", "7"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Clean { days_to_keep } => assert_eq!(days_to_keep, 7),
            _ => panic!("Expected Clean command"),
        }
    }

    #[test]
    fn test_cli_parsing_config_show() {
        let args = vec!["apiscribe", "config", "show"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Config { action } => {
                assert!(matches!(action, ConfigCommands::Show));
            }
            _ => panic!("Expected Config command"),
        }
    }

    #[test]
    fn test_cli_parsing_custom_config_path() {
        let args = vec!["apiscribe", "--config", "/etc/apiscribe.toml", "generate"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/apiscribe.toml"));
        assert!(matches!(cli.get_command(), Commands::Generate));
    }
}
