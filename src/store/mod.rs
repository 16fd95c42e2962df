use async_trait::async_trait;
use thiserror::Error;

use crate::engine::{GameError, Match};
use crate::models::{Account, Catalog, Game, GameId, Player, PlayerId, Vessel};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Rule(#[from] GameError),
    #[error("game {0} not found")]
    GameNotFound(GameId),
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),
    #[error("player {0} has too many active games")]
    TooManyGames(PlayerId),
    #[error("{0} already exists")]
    Conflict(String),
    #[error("stored data is inconsistent: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

#[async_trait]
pub trait Store: Send + Sync + 'static {
    // idempotent
    async fn seed_vessels(&self, catalog: &Catalog) -> Result<(), StoreError>;

    async fn vessels(&self) -> Result<Vec<Vessel>, StoreError>;

    async fn create_account(
        &self,
        name: &str,
        password_hash: &str,
        nickname: &str,
    ) -> Result<Player, StoreError>;

    async fn account(&self, name: &str) -> Result<Option<Account>, StoreError>;

    async fn player_for_account(&self, name: &str) -> Result<Option<Player>, StoreError>;

    async fn cpu_player(&self) -> Result<Player, StoreError>;

    async fn players(&self, ids: &[PlayerId]) -> Result<Vec<Player>, StoreError>;

    // Persist a freshly opened match and return it with its id assigned.
    // Refused with TooManyGames when the owner already sits in `max_active`
    // unfinished games, counted in the same unit of work as the insert.
    async fn insert_match(&self, draft: Match, max_active: usize) -> Result<Match, StoreError>;

    // Seat `player` in game `id`, under the same `max_active` cap.
    async fn join_match(&self, id: GameId, player: PlayerId, max_active: usize) -> Result<(), StoreError>;

    async fn load_match(&self, id: GameId) -> Result<Match, StoreError>;

    // One unit of work per game: nothing is written if f fails
    async fn with_match<T, F>(&self, id: GameId, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Match) -> Result<T, GameError> + Send + 'static;

    async fn games_for(&self, player: PlayerId) -> Result<Vec<Game>, StoreError>;

    async fn delete_match(&self, id: GameId) -> Result<(), StoreError>;
}
