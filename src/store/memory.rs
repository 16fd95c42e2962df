use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use log::debug;
use tokio::sync::RwLock;

use super::{Store, StoreError};
use crate::engine::{GameError, Match};
use crate::models::player::CPU_NICKNAME;
use crate::models::{Account, Catalog, Game, GameId, Phase, Player, PlayerId, Vessel, VesselId};

#[derive(Default)]
struct Inner {
    vessels: BTreeMap<VesselId, Vessel>,
    accounts: HashMap<String, Account>,
    players: BTreeMap<PlayerId, Player>,
    matches: BTreeMap<GameId, Match>,
    next_player: PlayerId,
    next_game: GameId,
}

impl Inner {
    fn add_player(&mut self, nickname: &str, user_name: Option<String>, automated: bool) -> Player {
        self.next_player += 1;
        let player = Player {
            id: self.next_player,
            nickname: nickname.to_string(),
            user_name,
            automated,
        };
        self.players.insert(player.id, player.clone());
        player
    }

    fn active_games(&self, player: PlayerId) -> usize {
        self.matches
            .values()
            .filter(|m| m.game().is_seated(player) && m.game().phase != Phase::GameOver)
            .count()
    }

    // Work on a copy so a rejected call leaves the stored match untouched
    fn update<T, F>(&mut self, id: GameId, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Match) -> Result<T, GameError>,
    {
        let mut working = self.matches.get(&id).ok_or(StoreError::GameNotFound(id))?.clone();
        let value = f(&mut working)?;
        working.take_journal();
        self.matches.insert(id, working);
        Ok(value)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn seed_vessels(&self, catalog: &Catalog) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        for vessel in catalog.vessels() {
            inner.vessels.insert(vessel.id, vessel.clone());
        }
        Ok(())
    }

    async fn vessels(&self) -> Result<Vec<Vessel>, StoreError> {
        Ok(self.inner.read().await.vessels.values().cloned().collect())
    }

    async fn create_account(
        &self,
        name: &str,
        password_hash: &str,
        nickname: &str,
    ) -> Result<Player, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.accounts.contains_key(name) {
            return Err(StoreError::Conflict(format!("account {name}")));
        }
        inner.accounts.insert(
            name.to_string(),
            Account {
                name: name.to_string(),
                password_hash: password_hash.to_string(),
                admin: false,
                active: true,
            },
        );
        Ok(inner.add_player(nickname, Some(name.to_string()), false))
    }

    async fn account(&self, name: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.inner.read().await.accounts.get(name).cloned())
    }

    async fn player_for_account(&self, name: &str) -> Result<Option<Player>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .players
            .values()
            .find(|p| p.user_name.as_deref() == Some(name))
            .cloned())
    }

    async fn cpu_player(&self) -> Result<Player, StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(cpu) = inner.players.values().find(|p| p.automated) {
            return Ok(cpu.clone());
        }
        Ok(inner.add_player(CPU_NICKNAME, None, true))
    }

    async fn players(&self, ids: &[PlayerId]) -> Result<Vec<Player>, StoreError> {
        let inner = self.inner.read().await;
        Ok(ids.iter().filter_map(|id| inner.players.get(id).cloned()).collect())
    }

    async fn insert_match(&self, mut draft: Match, max_active: usize) -> Result<Match, StoreError> {
        let mut inner = self.inner.write().await;
        for seat in draft.game().seats() {
            if !inner.players.contains_key(&seat.player_id) {
                return Err(StoreError::PlayerNotFound(seat.player_id));
            }
        }
        let owner = draft.game().owner;
        if inner.active_games(owner) >= max_active {
            return Err(StoreError::TooManyGames(owner));
        }

        inner.next_game += 1;
        draft.assign_id(inner.next_game);
        draft.take_journal();
        inner.matches.insert(draft.id(), draft.clone());
        debug!("Stored game {}", draft.id());
        Ok(draft)
    }

    async fn join_match(&self, id: GameId, player: PlayerId, max_active: usize) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.players.contains_key(&player) {
            return Err(StoreError::PlayerNotFound(player));
        }
        if inner.active_games(player) >= max_active {
            return Err(StoreError::TooManyGames(player));
        }
        inner.update(id, move |m| m.join(player))
    }

    async fn load_match(&self, id: GameId) -> Result<Match, StoreError> {
        self.inner
            .read()
            .await
            .matches
            .get(&id)
            .cloned()
            .ok_or(StoreError::GameNotFound(id))
    }

    async fn with_match<T, F>(&self, id: GameId, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Match) -> Result<T, GameError> + Send + 'static,
    {
        self.inner.write().await.update(id, f)
    }

    async fn games_for(&self, player: PlayerId) -> Result<Vec<Game>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .matches
            .values()
            .rev()
            .filter(|m| m.game().is_seated(player))
            .map(|m| m.game().clone())
            .collect())
    }

    async fn delete_match(&self, id: GameId) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .matches
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::GameNotFound(id))
    }
}
