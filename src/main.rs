use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{error, info};

use tutorial_wiki::logger::Logger;
use tutorial_wiki::services::database;
use tutorial_wiki::{Config, WikiError};

#[derive(Parser)]
#[command(name = "tutorial-wiki", about = "Tutorial wiki with cookie login and page editing")]
struct Cli {
    /// JSON configuration file; defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web server (default)
    Serve,
    /// Create the database, run migrations and insert the sample pages
    InitDb,
}

#[tokio::main]
async fn main() -> Result<(), WikiError> {
    if let Err(e) = Logger::init() {
        eprintln!("logger already initialised: {}", e);
    }

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => tutorial_wiki::serve(config).await,
        Command::InitDb => init_db(&config).await,
    };
    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}

async fn init_db(config: &Config) -> Result<(), WikiError> {
    let pool = database::open(&config.database_url, 1).await?;
    let added = database::seed_sample_pages(&pool).await?;
    info!("Database {} ready ({} sample pages added)", config.database_url, added);
    pool.close().await;
    Ok(())
}
