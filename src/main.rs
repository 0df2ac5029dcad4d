use clap::{Parser, Subcommand};
use covid_index::api;
use covid_index::config::*;
use covid_index::export::ExportRequest;
use covid_index::query::QueryRegistry;
use covid_index::service::IndexService;
use covid_index::store::ElasticClient;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "covid-index")]
#[command(about = "Sync, query and export the daily COVID series held in Elasticsearch")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Elasticsearch base URL
    #[arg(long, global = true, env = "ES_URL", default_value = DEFAULT_ES_URL)]
    es_url: String,

    /// Index holding the daily records
    #[arg(long, global = true, env = "COVID_INDEX", default_value = DEFAULT_INDEX)]
    index: String,

    /// Daily dataset download URL
    #[arg(long, global = true, env = "COVID_DATASET_URL", default_value = DEFAULT_DATASET_URL)]
    dataset_url: String,

    /// Directory bare export file names are written to
    #[arg(long, global = true, env = "COVID_EXPORT_DIR", default_value = DEFAULT_EXPORT_DIR)]
    export_dir: PathBuf,

    /// Population by state CSV (`digraph,population`)
    #[arg(long, global = true, env = "COVID_POPULATION_CSV", default_value = DEFAULT_POPULATION_CSV)]
    population_csv: PathBuf,

    /// Scroll window kept open between pages (e.g. 30s, 1m)
    #[arg(long, global = true, env = "COVID_SCROLL", default_value = "1m", value_parser = parse_scroll_window)]
    scroll: Duration,

    /// Hits fetched per scroll page
    #[arg(long, global = true, env = "COVID_SCROLL_SIZE", default_value = "10", value_parser = parse_page_size)]
    scroll_size: usize,

    /// Bind address of the HTTP API
    #[arg(long, global = true, env = "COVID_API_BIND", default_value = DEFAULT_API_BIND)]
    api_bind: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the daily dataset and index everything newer than the latest stored date
    InsertLatest,
    /// Delete the whole index
    DeleteIndex,
    /// Delete one document by id
    DeleteDoc { id: String },
    /// Delete the fetched records dated within [from, to]
    DeleteDocs {
        /// Inclusive lower bound, YYYYMMDD
        #[arg(long)]
        from: Option<String>,
        /// Inclusive upper bound, YYYYMMDD
        #[arg(long)]
        to: Option<String>,
    },
    /// Run a registered query and print the results
    Query {
        name: String,
        /// "all" or a positive number of records
        #[arg(long)]
        return_size: Option<String>,
    },
    /// Export the fetched dataset to a file
    Export {
        /// KI, ES or CSV
        #[arg(long)]
        target: String,
        #[arg(long)]
        path: Option<String>,
        /// Earliest date to include, YYYYMMDD
        #[arg(long)]
        from: Option<String>,
    },
    /// Enrich the fetched dataset with population figures and export it
    Curate,
    /// Serve the actions over HTTP
    Serve,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            es_url: self.es_url.clone(),
            index: self.index.clone(),
            dataset_url: self.dataset_url.clone(),
            export_dir: self.export_dir.clone(),
            population_csv: self.population_csv.clone(),
            scroll_window: self.scroll,
            page_size: self.scroll_size,
            api_bind: self.api_bind.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    let store = Arc::new(ElasticClient::new(&config.es_url)?);
    tracing::info!("Using index '{}' at {}", config.index, config.es_url);
    let service = Arc::new(IndexService::new(
        store,
        QueryRegistry::with_defaults(),
        config,
    ));

    match cli.command {
        Commands::InsertLatest => {
            let batch = service.fetch_dataset().await?;
            let report = service.insert_latest(&batch).await?;
            println!(
                "Inserted {} records newer than {} ({} failed)",
                report.inserted, report.watermark, report.failed
            );
        }
        Commands::DeleteIndex => {
            if !service.delete_index().await? {
                println!("index not found");
            }
        }
        Commands::DeleteDoc { id } => {
            let success = service.delete_doc(&id).await?;
            println!("{}", if success { "deleted" } else { "not deleted" });
        }
        Commands::DeleteDocs { from, to } => {
            let report = service
                .delete_docs_latest(from.as_deref(), to.as_deref())
                .await?;
            println!(
                "Deleted {} of {} documents ({} failed)",
                report.deleted, report.attempted, report.failed
            );
        }
        Commands::Query { name, return_size } => {
            let results = service.query(&name, return_size.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Commands::Export { target, path, from } => {
            let mut request = ExportRequest::new(target.parse()?);
            request.path = path;
            request.from_date = from;
            let summary = service.export_latest(&request).await?;
            println!(
                "Exported {} records to {}",
                summary.record_count,
                summary.path.display()
            );
        }
        Commands::Curate => {
            let summary = service.curate_latest().await?;
            println!(
                "Curated {} records into {}",
                summary.record_count,
                summary.path.display()
            );
        }
        Commands::Serve => {
            let bind = service.config().api_bind.clone();
            let app = api::router(service);

            tracing::info!("HTTP server listening on {}", bind);
            tracing::info!("Press Ctrl+C to shutdown");

            let listener = tokio::net::TcpListener::bind(&bind).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
