use anyhow::Result;
use clap::Parser;

mod cli;

use apiscribe::{config, init_tracing, server};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    init_tracing();

    match args.get_command() {
        cli::Commands::Serve => {
            let cfg = config::load_config(&args.config)?;
            server::start_server(cfg).await?;
        }
        cli::Commands::Generate => {
            let cfg = config::load_config(&args.config)?;
            let state = server::build_state(&cfg)?;
            let documentation = state.synthesizer.generate(&state.registry)?;
            println!(
                "Generated documentation for {} endpoints in {}",
                documentation.api.total_endpoints,
                state.synthesizer.doc_directory().display()
            );
        }
        cli::Commands::Clean { days_to_keep } => {
            let cfg = config::load_config(&args.config)?;
            let state = server::build_state(&cfg)?;
            state.store.clean_older_than(days_to_keep);
            println!("Old logs cleaned successfully");
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => {
                let cfg = config::load_config(&args.config)?;
                println!("{}", toml::to_string_pretty(&cfg)?);
            }
            cli::ConfigCommands::Validate => {
                config::load_config(&args.config)?;
                println!("Configuration is valid");
            }
        },
        cli::Commands::Version => {
            println!("apiscribe v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
