use migration::{Migrator, MigratorTrait};
use server::ServerConfig;
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "greenyard={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    let server = settings.server;
    let db = parse_database(&server.database).await?;
    let engine = engine::Engine::builder().database(db).build().await?;

    let defaults = ServerConfig::default();
    let config = ServerConfig {
        bind: server.bind.unwrap_or(defaults.bind),
        port: server.port,
        upload_dir: server
            .upload_dir
            .map(Into::into)
            .unwrap_or(defaults.upload_dir),
        max_upload_bytes: server.max_upload_bytes.unwrap_or(defaults.max_upload_bytes),
    };
    tracing::info!(
        "serving uploads from {}",
        config.upload_dir.display()
    );

    server::run(engine, config).await?;
    Ok(())
}

async fn parse_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}
