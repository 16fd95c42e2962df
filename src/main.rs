use std::sync::Arc;

use anyhow::Context;
use log::{info, warn};
use simplelog::{Config, SimpleLogger};

use broadside::config::AppConfig;
use broadside::referee::{Referee, RefereeSettings};
use broadside::store::{MemoryStore, MySqlStore, Store};
use broadside::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    // set up logging facility
    let _ = SimpleLogger::init(config.log_level, Config::default());
    info!("Starting..");

    match config.database_url.clone() {
        Some(database_url) => {
            let store = MySqlStore::connect(&database_url)
                .await
                .context("could not connect to the database")?;
            serve(config, store).await
        }
        None => {
            warn!("$DATABASE_URL is not set, games are kept in memory only");
            serve(config, MemoryStore::new()).await
        }
    }
}

async fn serve<S: Store>(config: AppConfig, store: S) -> anyhow::Result<()> {
    let settings = RefereeSettings {
        max_active_games: config.max_active_games,
        cpu_autoplay: config.cpu_autoplay,
    };
    let referee = Referee::start(store, settings)
        .await
        .context("could not seed the vessel catalog")?;

    let state = AppState {
        jwt_secret: config.jwt_secret.clone(),
        token_duration: config.token_duration,
        referee: Arc::new(referee),
    };
    let app = broadside::app(state);

    // Start the server
    info!("Listening on {}", config.listen_addr);
    axum::Server::bind(&config.listen_addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
