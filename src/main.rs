mod analysis;
mod config;
mod database;
mod model;
mod reports;
mod server;

use crate::config::{DatabaseConfig, ServerConfig};
use crate::database::ElectionDatabase;
use crate::reports::{console, generator};
use crate::server::AppState;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(version, about = "Descriptive statistics over Indian general election results")]
struct Opts {
    #[clap(flatten)]
    database: DatabaseConfig,

    /// Log filter directive, applied on top of RUST_LOG
    #[clap(long, env = "ELECTION_LOG", default_value = "info")]
    log: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer the six dashboard questions on the console.
    Report {
        /// Output format
        #[clap(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Serve the dashboard JSON API.
    Serve {
        #[clap(flatten)]
        server: ServerConfig,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn init_logging(log: &str) -> Result<(), tracing_subscriber::filter::ParseError> {
    let filter = EnvFilter::from_default_env().add_directive(log.parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Validate the database config, connect, and probe the table layout.
async fn open_database(
    config: &DatabaseConfig,
) -> Result<(ElectionDatabase, database::schema::ColumnRegistry), Box<dyn std::error::Error>> {
    config.validate()?;
    let db = ElectionDatabase::new(&config.url).await?;
    let columns = db.probe_columns().await?;
    tracing::info!(
        database = %config.url,
        optional_columns = ?columns.names(),
        "database opened"
    );
    Ok((db, columns))
}

async fn report(
    database: &DatabaseConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let (db, columns) = open_database(database).await?;
    let report = generator::generate_report(&db, &columns).await?;

    match format {
        OutputFormat::Text => console::print_report(&report),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    Ok(())
}

async fn serve(
    database: &DatabaseConfig,
    config: &ServerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    let (db, columns) = open_database(database).await?;
    server::serve(AppState { db, columns }, config).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let opts = Opts::parse();

    if let Err(e) = init_logging(&opts.log) {
        eprintln!("❌ Invalid log directive: {}", e);
        std::process::exit(1);
    }

    match opts.command {
        Command::Report { format } => {
            if let Err(e) = report(&opts.database, format).await {
                eprintln!("❌ Report failed: {}", e);
                std::process::exit(1);
            }
        }
        Command::Serve { server } => {
            if let Err(e) = serve(&opts.database, &server).await {
                eprintln!("❌ Server failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}
