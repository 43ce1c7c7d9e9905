use app_state::load_app_settings;
use clap::Parser;
use color_eyre::Result;
use common_services::context::FaceIndexContext;
use common_services::database::get_db_pool;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use worker::cli::{Cli, Command};
use worker::commands::{run_bulk, run_index, run_search};

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    color_eyre::install()?;

    let cli = Cli::parse();
    let settings = load_app_settings()?;
    let pool = get_db_pool(&settings.secrets.database_url, &settings.database, true).await?;
    let context = FaceIndexContext::from_settings(pool, &settings);

    match cli.command {
        Command::Index {
            photo_id,
            force,
            image,
        } => run_index(&context, &photo_id, force, image).await?,
        Command::Bulk(args) => run_bulk(context, args).await?,
        Command::Search(args) => run_search(&context, args).await?,
        Command::Migrate => info!("Database is up to date."),
    }

    Ok(())
}
