mod place;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "nearby-cli")]
#[command(about = "Nearby places command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Find places around a coordinate and print the result as JSON
    Search {
        /// Latitude of the search center
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude of the search center
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Search radius in meters
        #[arg(long, default_value_t = nearby_core::DEFAULT_RADIUS_METERS)]
        radius: i32,
        /// Exact place type (e.g., cafe)
        #[arg(long = "type")]
        kind: Option<String>,
        /// Case-insensitive name substring
        #[arg(long)]
        q: Option<String>,
        /// Maximum number of places
        #[arg(long, default_value_t = nearby_core::DEFAULT_LIMIT)]
        limit: i32,
    },
    /// Show a single place by id
    Place {
        /// Place UUID
        id: uuid::Uuid,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Print the number of stored places
    Count,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("nearby-cli ready; run with --help for commands");
        return Ok(());
    };

    let config = nearby_core::load_app_config()?;
    let pool = nearby_db::connect_pool(
        &config.database_url,
        nearby_db::PoolConfig::from_app_config(&config),
    )
    .await?;

    match command {
        Commands::Search {
            lat,
            lng,
            radius,
            kind,
            q,
            limit,
        } => {
            let query = nearby_core::SearchQuery::new(
                nearby_core::Coordinate {
                    latitude: lat,
                    longitude: lng,
                },
                radius,
                kind,
                q,
                limit,
            )?;
            place::run_search(&pool, &config, &query).await?;
        }
        Commands::Place { id } => place::run_place(&pool, &config, id).await?,
        Commands::Db { command } => run_db(&pool, command).await?,
    }

    Ok(())
}

async fn run_db(pool: &sqlx::PgPool, command: DbCommands) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            nearby_db::health_check(pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = nearby_db::run_migrations(pool).await?;
            println!("applied {applied} migration(s)");
        }
        DbCommands::Count => {
            let count = nearby_db::count_places(pool).await?;
            println!("{count} place(s)");
        }
    }
    Ok(())
}
