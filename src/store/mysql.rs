use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use sqlx::mysql::{MySql, MySqlDatabaseError, MySqlPool};
use sqlx::Transaction;

use super::{Store, StoreError};
use crate::engine::{Change, GameError, Match};
use crate::models::player::CPU_NICKNAME;
use crate::models::{
    Account, Board, Catalog, Game, GameId, Phase, Placement, Player, PlayerId, Role, Seat, Shot,
    ShotResult, Vessel,
};

type Tx = Transaction<'static, MySql>;

const GAME_COLUMNS: &str =
    "id, width, height, multiplayer, phase, owner_id, turn_id, winner_id, created, started, finished";

#[derive(sqlx::FromRow, Debug)]
struct GameRow {
    id: u32,
    width: u32,
    height: u32,
    multiplayer: bool,
    phase: String,
    owner_id: u32,
    turn_id: Option<u32>,
    winner_id: Option<u32>,
    created: DateTime<Utc>,
    started: Option<DateTime<Utc>>,
    finished: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow, Debug)]
struct SeatRow {
    player_id: u32,
    role: String,
}

#[derive(sqlx::FromRow, Debug)]
struct BoardRow {
    id: u32,
    player_id: u32,
    prepared: bool,
}

#[derive(sqlx::FromRow, Debug)]
struct PlacementRow {
    board_id: u32,
    vessel_id: u32,
    ri: u32,
    ci: u32,
    rf: u32,
    cf: u32,
    alive: bool,
}

#[derive(sqlx::FromRow, Debug)]
struct ShotRow {
    board_id: u32,
    player_id: u32,
    target_row: u32,
    target_col: u32,
    result: u8,
    impact_vessel_id: Option<u32>,
    fired_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Debug)]
struct PlayerRow {
    id: u32,
    nickname: String,
    account_name: Option<String>,
    automated: bool,
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        Player {
            id: row.id,
            nickname: row.nickname,
            user_name: row.account_name,
            automated: row.automated,
        }
    }
}

#[derive(sqlx::FromRow, Debug)]
struct AccountRow {
    name: String,
    password_hash: String,
    admin: bool,
    active: bool,
}

#[derive(sqlx::FromRow, Debug)]
struct VesselRow {
    id: u32,
    size: u32,
    name: String,
}

fn game_from_rows(row: GameRow, seats: Vec<SeatRow>) -> Result<Game, StoreError> {
    let phase = row.phase.parse::<Phase>().map_err(StoreError::Corrupt)?;
    let mut opponent = None;
    for seat in seats {
        let role = seat.role.parse::<Role>().map_err(StoreError::Corrupt)?;
        if role != Role::Owner {
            opponent = Some(Seat { player_id: seat.player_id, role });
        }
    }
    Ok(Game {
        id: row.id,
        width: row.width,
        height: row.height,
        multiplayer: row.multiplayer,
        phase,
        owner: row.owner_id,
        opponent,
        turn: row.turn_id,
        winner: row.winner_id,
        created: row.created,
        started: row.started,
        finished: row.finished,
    })
}

// MySQL error 1062: duplicate entry for a unique key
fn is_duplicate(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db
            .try_downcast_ref::<MySqlDatabaseError>()
            .map(|e| e.number() == 1062)
            .unwrap_or(false),
        _ => false,
    }
}

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = MySqlPool::connect(database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database schema is up to date");
        Ok(Self { pool })
    }

    // Lock the player row so concurrent creates and joins for the same player
    // queue up, then refuse if they already sit in `max_active` open games.
    async fn reserve_seat(tx: &mut Tx, player: PlayerId, max_active: usize) -> Result<(), StoreError> {
        sqlx::query("SELECT id FROM player WHERE id = ? FOR UPDATE")
            .bind(player)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::PlayerNotFound(player))?;

        let sql = "SELECT COUNT(*) FROM game g INNER JOIN game_player gp ON gp.game_id = g.id \
                   WHERE gp.player_id = ? AND g.phase <> ?";
        let count: i64 = sqlx::query_scalar(sql)
            .bind(player)
            .bind(Phase::GameOver.as_str())
            .fetch_one(&mut *tx)
            .await?;
        if count as usize >= max_active {
            return Err(StoreError::TooManyGames(player));
        }
        Ok(())
    }

    // Load game `id` locked, run `f` and write back the journal. A rule
    // rejection rolls the transaction back.
    async fn run_locked<T, F>(mut tx: Tx, id: GameId, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Match) -> Result<T, GameError>,
    {
        let (mut m, mut board_ids) = Self::load(&mut tx, id, true).await?;

        let value = match f(&mut m) {
            Ok(value) => value,
            Err(rule) => {
                tx.rollback().await?;
                return Err(rule.into());
            }
        };

        Self::apply(&mut tx, &mut m, &mut board_ids).await?;
        tx.commit().await?;
        Ok(value)
    }

    async fn seats(tx: &mut Tx, game_id: GameId) -> Result<Vec<SeatRow>, StoreError> {
        let sql = "SELECT player_id, role FROM game_player WHERE game_id = ?";
        Ok(sqlx::query_as::<_, SeatRow>(sql).bind(game_id).fetch_all(&mut *tx).await?)
    }

    // Load the full aggregate. Board ids are returned keyed by player so the
    // journal can be written back.
    async fn load(
        tx: &mut Tx,
        id: GameId,
        lock: bool,
    ) -> Result<(Match, HashMap<PlayerId, u32>), StoreError> {
        let sql = format!(
            "SELECT {GAME_COLUMNS} FROM game WHERE id = ?{}",
            if lock { " FOR UPDATE" } else { "" }
        );
        let row = sqlx::query_as::<_, GameRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::GameNotFound(id))?;
        let seats = Self::seats(tx, id).await?;
        let game = game_from_rows(row, seats)?;
        let dims = game.dimensions();

        let sql = "SELECT id, player_id, prepared FROM board WHERE game_id = ?";
        let board_rows = sqlx::query_as::<_, BoardRow>(sql).bind(id).fetch_all(&mut *tx).await?;

        let sql = "SELECT p.board_id, p.vessel_id, p.ri, p.ci, p.rf, p.cf, p.alive FROM placement p \
                   INNER JOIN board b ON p.board_id = b.id WHERE b.game_id = ?";
        let placement_rows =
            sqlx::query_as::<_, PlacementRow>(sql).bind(id).fetch_all(&mut *tx).await?;

        let sql = "SELECT board_id, player_id, target_row, target_col, result, impact_vessel_id, fired_at \
                   FROM shot WHERE game_id = ? ORDER BY id";
        let shot_rows = sqlx::query_as::<_, ShotRow>(sql).bind(id).fetch_all(&mut *tx).await?;

        let mut board_ids = HashMap::new();
        let mut boards = Vec::new();
        for b in board_rows {
            let placements = placement_rows
                .iter()
                .filter(|p| p.board_id == b.id)
                .map(|p| Placement {
                    vessel_id: p.vessel_id,
                    ri: p.ri,
                    ci: p.ci,
                    rf: p.rf,
                    cf: p.cf,
                    alive: p.alive,
                })
                .collect();
            let shots = shot_rows
                .iter()
                .filter(|s| s.board_id == b.id)
                .map(|s| Shot {
                    shooter: s.player_id,
                    row: s.target_row,
                    col: s.target_col,
                    result: ShotResult::from_code(s.result),
                    impact: s.impact_vessel_id,
                    fired_at: s.fired_at,
                })
                .collect();
            board_ids.insert(b.player_id, b.id);
            boards.push(Board::restore(id, b.player_id, b.prepared, placements, shots, dims));
        }

        Ok((Match::restore(game, boards), board_ids))
    }

    async fn insert_board(tx: &mut Tx, game_id: GameId, board: &Board) -> Result<u32, StoreError> {
        let sql = "INSERT INTO board (game_id, player_id, prepared) VALUES (?, ?, ?)";
        let board_id = sqlx::query(sql)
            .bind(game_id)
            .bind(board.player_id)
            .bind(board.prepared)
            .execute(&mut *tx)
            .await?
            .last_insert_id() as u32;
        for placement in &board.placements {
            Self::insert_placement(tx, board_id, placement).await?;
        }
        Ok(board_id)
    }

    async fn insert_placement(tx: &mut Tx, board_id: u32, p: &Placement) -> Result<(), StoreError> {
        let sql = "INSERT INTO placement (board_id, vessel_id, ri, ci, rf, cf, alive) VALUES (?, ?, ?, ?, ?, ?, ?)";
        sqlx::query(sql)
            .bind(board_id)
            .bind(p.vessel_id)
            .bind(p.ri)
            .bind(p.ci)
            .bind(p.rf)
            .bind(p.cf)
            .bind(p.alive)
            .execute(&mut *tx)
            .await?;
        Ok(())
    }

    async fn insert_seat(tx: &mut Tx, game_id: GameId, seat: Seat) -> Result<(), StoreError> {
        let sql = "INSERT INTO game_player (game_id, player_id, role) VALUES (?, ?, ?)";
        sqlx::query(sql)
            .bind(game_id)
            .bind(seat.player_id)
            .bind(seat.role.as_str())
            .execute(&mut *tx)
            .await?;
        Ok(())
    }

    async fn update_game(tx: &mut Tx, game: &Game) -> Result<(), StoreError> {
        let sql = "UPDATE game SET phase = ?, turn_id = ?, winner_id = ?, started = ?, finished = ? WHERE id = ?";
        sqlx::query(sql)
            .bind(game.phase.as_str())
            .bind(game.turn)
            .bind(game.winner)
            .bind(game.started)
            .bind(game.finished)
            .bind(game.id)
            .execute(&mut *tx)
            .await?;
        Ok(())
    }

    // Write back everything the engine recorded, then the game row
    async fn apply(
        tx: &mut Tx,
        m: &mut Match,
        board_ids: &mut HashMap<PlayerId, u32>,
    ) -> Result<(), StoreError> {
        let game_id = m.id();
        let board_id = |ids: &HashMap<PlayerId, u32>, player: PlayerId| {
            ids.get(&player)
                .copied()
                .ok_or_else(|| StoreError::Corrupt(format!("no board for player {player} in game {game_id}")))
        };

        for change in m.take_journal() {
            match change {
                Change::SeatTaken(seat) => Self::insert_seat(tx, game_id, seat).await?,
                Change::BoardOpened(player) => {
                    let board = m
                        .board(player)
                        .ok_or_else(|| StoreError::Corrupt(format!("board of player {player} vanished")))?;
                    let id = Self::insert_board(tx, game_id, board).await?;
                    board_ids.insert(player, id);
                }
                Change::VesselPlaced { player_id, placement } => {
                    let id = board_id(board_ids, player_id)?;
                    Self::insert_placement(tx, id, &placement).await?;
                }
                Change::BoardPrepared(player) => {
                    let id = board_id(board_ids, player)?;
                    sqlx::query("UPDATE board SET prepared = TRUE WHERE id = ?")
                        .bind(id)
                        .execute(&mut *tx)
                        .await?;
                }
                Change::ShotFired { target, shot } => {
                    let id = board_id(board_ids, target)?;
                    let sql = "INSERT INTO shot (board_id, game_id, player_id, target_row, target_col, result, impact_vessel_id, fired_at) \
                               VALUES (?, ?, ?, ?, ?, ?, ?, ?)";
                    sqlx::query(sql)
                        .bind(id)
                        .bind(game_id)
                        .bind(shot.shooter)
                        .bind(shot.row)
                        .bind(shot.col)
                        .bind(shot.result.code())
                        .bind(shot.impact)
                        .bind(shot.fired_at)
                        .execute(&mut *tx)
                        .await?;
                }
                Change::VesselSunk { player_id, vessel_id } => {
                    let id = board_id(board_ids, player_id)?;
                    sqlx::query("UPDATE placement SET alive = FALSE WHERE board_id = ? AND vessel_id = ?")
                        .bind(id)
                        .bind(vessel_id)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        Self::update_game(tx, m.game()).await
    }
}

#[async_trait]
impl Store for MySqlStore {
    async fn seed_vessels(&self, catalog: &Catalog) -> Result<(), StoreError> {
        let sql = "INSERT INTO vessel (id, size, name) VALUES (?, ?, ?) \
                   ON DUPLICATE KEY UPDATE size = VALUES(size), name = VALUES(name)";
        for vessel in catalog.vessels() {
            sqlx::query(sql)
                .bind(vessel.id)
                .bind(vessel.size)
                .bind(&vessel.name)
                .execute(&self.pool)
                .await?;
        }
        debug!("Seeded {} vessel types", catalog.len());
        Ok(())
    }

    async fn vessels(&self) -> Result<Vec<Vessel>, StoreError> {
        let sql = "SELECT id, size, name FROM vessel ORDER BY id";
        let rows = sqlx::query_as::<_, VesselRow>(sql).fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|r| Vessel { id: r.id, size: r.size, name: r.name })
            .collect())
    }

    async fn create_account(
        &self,
        name: &str,
        password_hash: &str,
        nickname: &str,
    ) -> Result<Player, StoreError> {
        if self.account(name).await?.is_some() {
            return Err(StoreError::Conflict(format!("account {name}")));
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO account (name, password_hash) VALUES (?, ?)")
            .bind(name)
            .bind(password_hash)
            .execute(&mut tx)
            .await
            .map_err(|err| {
                if is_duplicate(&err) {
                    StoreError::Conflict(format!("account {name}"))
                } else {
                    err.into()
                }
            })?;
        let id = sqlx::query("INSERT INTO player (nickname, account_name, automated) VALUES (?, ?, FALSE)")
            .bind(nickname)
            .bind(name)
            .execute(&mut tx)
            .await?
            .last_insert_id() as u32;
        tx.commit().await?;

        Ok(Player {
            id,
            nickname: nickname.to_string(),
            user_name: Some(name.to_string()),
            automated: false,
        })
    }

    async fn account(&self, name: &str) -> Result<Option<Account>, StoreError> {
        let sql = "SELECT name, password_hash, admin, active FROM account WHERE name = ?";
        let row = sqlx::query_as::<_, AccountRow>(sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| Account {
            name: r.name,
            password_hash: r.password_hash,
            admin: r.admin,
            active: r.active,
        }))
    }

    async fn player_for_account(&self, name: &str) -> Result<Option<Player>, StoreError> {
        let sql = "SELECT id, nickname, account_name, automated FROM player WHERE account_name = ?";
        let row = sqlx::query_as::<_, PlayerRow>(sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Player::from))
    }

    async fn cpu_player(&self) -> Result<Player, StoreError> {
        // The migration seeds this row. Should it be gone, concurrent callers
        // may each insert one, and all of them settle on the lowest id.
        let sql = "SELECT id, nickname, account_name, automated FROM player WHERE automated = TRUE ORDER BY id LIMIT 1";
        if let Some(row) = sqlx::query_as::<_, PlayerRow>(sql).fetch_optional(&self.pool).await? {
            return Ok(row.into());
        }
        let id = sqlx::query("INSERT INTO player (nickname, automated) VALUES (?, TRUE)")
            .bind(CPU_NICKNAME)
            .execute(&self.pool)
            .await?
            .last_insert_id();
        info!("Created automated player {}", id);
        let row = sqlx::query_as::<_, PlayerRow>(sql).fetch_one(&self.pool).await?;
        Ok(row.into())
    }

    async fn players(&self, ids: &[PlayerId]) -> Result<Vec<Player>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT id, nickname, account_name, automated FROM player WHERE id IN ({})",
            vec!["?"; ids.len()].join(", ")
        );
        let mut query = sqlx::query_as::<_, PlayerRow>(&sql);
        for id in ids {
            query = query.bind(*id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Player::from).collect())
    }

    async fn insert_match(&self, mut draft: Match, max_active: usize) -> Result<Match, StoreError> {
        let mut tx = self.pool.begin().await?;
        Self::reserve_seat(&mut tx, draft.game().owner, max_active).await?;

        let game = draft.game().clone();
        let sql = "INSERT INTO game (width, height, multiplayer, phase, owner_id, turn_id, winner_id, created, started, finished) \
                   VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";
        let game_id = sqlx::query(sql)
            .bind(game.width)
            .bind(game.height)
            .bind(game.multiplayer)
            .bind(game.phase.as_str())
            .bind(game.owner)
            .bind(game.turn)
            .bind(game.winner)
            .bind(game.created)
            .bind(game.started)
            .bind(game.finished)
            .execute(&mut tx)
            .await?
            .last_insert_id() as u32;

        draft.assign_id(game_id);
        draft.take_journal();
        for seat in draft.game().seats() {
            Self::insert_seat(&mut tx, game_id, seat).await?;
        }
        for board in draft.boards() {
            Self::insert_board(&mut tx, game_id, board).await?;
        }

        tx.commit().await?;
        debug!("Stored game {}", game_id);
        Ok(draft)
    }

    async fn load_match(&self, id: GameId) -> Result<Match, StoreError> {
        let mut tx = self.pool.begin().await?;
        let (m, _) = Self::load(&mut tx, id, false).await?;
        tx.commit().await?;
        Ok(m)
    }

    async fn join_match(&self, id: GameId, player: PlayerId, max_active: usize) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        Self::reserve_seat(&mut tx, player, max_active).await?;
        Self::run_locked(tx, id, move |m| m.join(player)).await
    }

    async fn with_match<T, F>(&self, id: GameId, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Match) -> Result<T, GameError> + Send + 'static,
    {
        let tx = self.pool.begin().await?;
        Self::run_locked(tx, id, f).await
    }

    async fn games_for(&self, player: PlayerId) -> Result<Vec<Game>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let sql = "SELECT g.id, g.width, g.height, g.multiplayer, g.phase, g.owner_id, g.turn_id, g.winner_id, \
                   g.created, g.started, g.finished FROM game g INNER JOIN game_player gp ON gp.game_id = g.id \
                   WHERE gp.player_id = ? ORDER BY g.id DESC";
        let rows = sqlx::query_as::<_, GameRow>(sql).bind(player).fetch_all(&mut tx).await?;

        let mut games = Vec::with_capacity(rows.len());
        for row in rows {
            let seats = Self::seats(&mut tx, row.id).await?;
            games.push(game_from_rows(row, seats)?);
        }
        tx.commit().await?;
        Ok(games)
    }

    async fn delete_match(&self, id: GameId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM game WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::GameNotFound(id));
        }
        info!("Deleted game {}", id);
        Ok(())
    }
}
