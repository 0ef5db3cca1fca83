mod cli;

use anyhow::Result;
use clap::Parser;
use rand::Rng;

use cli::{Cli, Commands};
use lectern_core::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults based on the verbose
    // flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "lectern=trace,lectern_server=trace,lectern_db=debug,tower_http=debug".to_string()
        } else {
            "lectern=info,lectern_server=info,lectern_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let mut config = Config::load_or_default(cli.config.as_deref());
            config.server.host = host;
            config.server.port = port;

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(lectern_server::start(config))?;
        }

        Commands::Validate { config } => {
            let path = config.or(cli.config);
            let config = Config::load_or_default(path.as_deref());
            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration OK");
            } else {
                for warning in &warnings {
                    println!("warning: {warning}");
                }
                std::process::exit(1);
            }
        }

        Commands::HashPassword { password } => {
            let hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)?;
            println!("{hash}");
        }

        Commands::GenerateApiKey => {
            let key: String = rand::thread_rng()
                .sample_iter(rand::distributions::Alphanumeric)
                .take(40)
                .map(char::from)
                .collect();
            println!("{key}");
        }

        Commands::Version => {
            println!("lectern {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
