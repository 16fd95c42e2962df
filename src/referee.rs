use std::sync::Arc;

use log::info;
use serde::Serialize;

use crate::engine::{cpu, project, GameError, GameView, Match, PlacementReport, ShotReport};
use crate::errors::CustomError;
use crate::models::{
    Catalog, FireShot, Game, GameId, NewGame, PlaceVessel, Player, PlayerId, Role, Vessel,
};
use crate::store::Store;

#[derive(Clone, Copy, Debug)]
pub struct RefereeSettings {
    pub max_active_games: usize,
    pub cpu_autoplay: bool,
}

impl Default for RefereeSettings {
    fn default() -> Self {
        Self { max_active_games: 3, cpu_autoplay: true }
    }
}

// A player together with the seat they hold in a game
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SeatedPlayer {
    #[serde(flatten)]
    pub player: Player,
    pub role: Role,
}

/// A shot and, when the CPU had the next turn, the shots it fired in reply.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShotOutcome {
    #[serde(flatten)]
    pub report: ShotReport,
    pub replies: Vec<ShotReport>,
}

pub struct Referee<S> {
    store: S,
    catalog: Arc<Catalog>,
    settings: RefereeSettings,
}

impl<S: Store> Referee<S> {
    pub async fn start(store: S, settings: RefereeSettings) -> Result<Self, crate::store::StoreError> {
        store.seed_vessels(&Catalog::standard()).await?;
        let catalog = Catalog::new(store.vessels().await?);
        info!("Referee ready with {} vessel types", catalog.len());
        Ok(Self { store, catalog: Arc::new(catalog), settings })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn vessels(&self) -> Vec<Vessel> {
        self.catalog.vessels().to_vec()
    }

    pub async fn identify(&self, user_name: &str) -> Result<Player, CustomError> {
        self.store
            .player_for_account(user_name)
            .await?
            .ok_or(CustomError::UserNotFound)
    }

    pub async fn sign_up(&self, name: &str, password_hash: &str, nickname: &str) -> Result<Player, CustomError> {
        let player = self.store.create_account(name, password_hash, nickname).await?;
        info!("Account {} created with player {}", name, player.id);
        Ok(player)
    }

    async fn view_of(&self, m: &Match, observer: PlayerId) -> Result<GameView, CustomError> {
        let ids: Vec<PlayerId> = m.game().seats().iter().map(|s| s.player_id).collect();
        let players = self.store.players(&ids).await?;
        Ok(project(m, &self.catalog, &players, observer)?)
    }

    /// Open a game for `caller`. Against the CPU its fleet is deployed right
    /// away, so only the owner still has to place vessels.
    pub async fn create_game(&self, caller: &Player, settings: NewGame) -> Result<GameView, CustomError> {
        let cpu_player = if settings.multiplayer { None } else { Some(self.store.cpu_player().await?) };
        let mut draft = Match::open(&settings, caller.id, cpu_player.as_ref().map(|p| p.id))?;
        if let Some(cpu_player) = &cpu_player {
            cpu::deploy_fleet(&mut draft, &self.catalog, cpu_player.id, &mut rand::thread_rng())?;
        }

        let m = self.store.insert_match(draft, self.settings.max_active_games).await?;
        info!(
            "Game {} created by player {} ({}x{}, multiplayer: {})",
            m.id(),
            caller.id,
            m.game().width,
            m.game().height,
            m.game().multiplayer
        );
        self.view_of(&m, caller.id).await
    }

    pub async fn join_game(&self, caller: &Player, game_id: GameId) -> Result<GameView, CustomError> {
        self.store.join_match(game_id, caller.id, self.settings.max_active_games).await?;
        let m = self.store.load_match(game_id).await?;
        self.view_of(&m, caller.id).await
    }

    pub async fn game_view(&self, caller: &Player, game_id: GameId) -> Result<GameView, CustomError> {
        let m = self.store.load_match(game_id).await?;
        self.view_of(&m, caller.id).await
    }

    pub async fn games(&self, caller: &Player) -> Result<Vec<Game>, CustomError> {
        Ok(self.store.games_for(caller.id).await?)
    }

    pub async fn players(&self, caller: &Player, game_id: GameId) -> Result<Vec<SeatedPlayer>, CustomError> {
        let m = self.store.load_match(game_id).await?;
        if !m.game().is_seated(caller.id) {
            return Err(GameError::NotAPlayer.into());
        }
        let seats = m.game().seats();
        let ids: Vec<PlayerId> = seats.iter().map(|s| s.player_id).collect();
        let players = self.store.players(&ids).await?;
        Ok(seats
            .into_iter()
            .filter_map(|seat| {
                players
                    .iter()
                    .find(|p| p.id == seat.player_id)
                    .map(|p| SeatedPlayer { player: p.clone(), role: seat.role })
            })
            .collect())
    }

    pub async fn delete_game(&self, caller: &Player, admin: bool, game_id: GameId) -> Result<(), CustomError> {
        let m = self.store.load_match(game_id).await?;
        if m.game().owner != caller.id && !admin {
            return Err(CustomError::Forbidden);
        }
        self.store.delete_match(game_id).await?;
        Ok(())
    }

    pub async fn place_vessel(
        &self,
        caller: &Player,
        game_id: GameId,
        player_id: PlayerId,
        request: PlaceVessel,
    ) -> Result<PlacementReport, CustomError> {
        let caller_id = caller.id;
        let catalog = Arc::clone(&self.catalog);
        let report = self
            .store
            .with_match(game_id, move |m| {
                authorize(m.game(), caller_id, player_id)?;
                m.place(&catalog, player_id, &request)
            })
            .await?;
        Ok(report)
    }

    /// Fire for `player_id`. With autoplay on, a miss that hands the turn to
    /// the CPU is answered by the CPU within the same unit of work.
    pub async fn fire(
        &self,
        caller: &Player,
        game_id: GameId,
        player_id: PlayerId,
        request: FireShot,
    ) -> Result<ShotOutcome, CustomError> {
        let caller_id = caller.id;
        let autoplay = self.settings.cpu_autoplay;
        let outcome = self
            .store
            .with_match(game_id, move |m| {
                authorize(m.game(), caller_id, player_id)?;
                let report = m.fire(player_id, &request)?;
                let replies = match m.game().cpu() {
                    Some(cpu_id) if autoplay && cpu_id != player_id => {
                        cpu::play_turn(m, cpu_id, &mut rand::thread_rng())?
                    }
                    _ => Vec::new(),
                };
                Ok(ShotOutcome { report, replies })
            })
            .await?;
        Ok(outcome)
    }
}

// The caller may act for themselves, and the owner may also act for the CPU seat
fn authorize(game: &Game, caller: PlayerId, acting_for: PlayerId) -> Result<(), GameError> {
    if !game.is_seated(caller) {
        return Err(GameError::NotAPlayer);
    }
    if caller == acting_for || (game.owner == caller && game.cpu() == Some(acting_for)) {
        Ok(())
    } else {
        Err(GameError::NotAPlayer)
    }
}
