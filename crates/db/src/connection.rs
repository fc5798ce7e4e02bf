use mongodb::{Client, Database, options::ClientOptions};
use pomo_config::Settings;
use tracing::info;

/// Connects to MongoDB and pings it before handing out the database.
pub async fn connect(settings: &Settings) -> Result<Database, mongodb::error::Error> {
    let mut options = ClientOptions::parse(&settings.database.url).await?;
    options.app_name = Some("pomo-sync".to_string());
    options.max_pool_size = settings.database.max_pool_size.or(options.max_pool_size);
    options.min_pool_size = settings.database.min_pool_size.or(options.min_pool_size);

    let client = Client::with_options(options)?;
    client
        .database("admin")
        .run_command(bson::doc! { "ping": 1 })
        .await?;

    info!(
        db = %settings.database.name,
        transactional = settings.reconciler.transactional,
        "Connected to MongoDB"
    );

    Ok(client.database(&settings.database.name))
}
