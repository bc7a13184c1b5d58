use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use joby_core::{SearchRequest, SearchRequestBody};
use joby_server::build_router;
use joby_server::startup::build_app_state;

#[derive(Parser)]
#[command(name = "joby-server", about = "Aggregated jobs search API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server (default).
    Serve,
    /// Run a single search and print the JSON response.
    Search {
        #[arg(long)]
        title: String,
        #[arg(long)]
        seniority: String,
        #[arg(long)]
        location: String,
        #[arg(long, default_value = "")]
        country: String,
        #[arg(long, default_value_t = 0)]
        dist: i64,
        #[arg(long, default_value = "fulltime")]
        job_scope: String,
        #[arg(long, default_value_t = 1)]
        days_back: i64,
    },
}

fn load_config() -> joby_core::Config {
    joby_core::config::load_dotenv();
    joby_core::Config::from_env()
}

async fn serve(config: &joby_core::Config) -> anyhow::Result<()> {
    let state = build_app_state(config)?;
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn search_once(config: &joby_core::Config, body: SearchRequestBody) -> anyhow::Result<()> {
    let request = SearchRequest::try_from(body)?;
    let state = build_app_state(config)?;
    let outcome = state.engine.search(&request).await;
    let response = joby_server::api::SearchResponse::from(outcome);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config();
    config.log_summary();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await?,
        Command::Search {
            title,
            seniority,
            location,
            country,
            dist,
            job_scope,
            days_back,
        } => {
            let body = SearchRequestBody {
                title,
                seniority,
                country,
                location,
                dist,
                job_scope,
                days_back,
            };
            search_once(&config, body).await?;
        }
    }

    Ok(())
}
