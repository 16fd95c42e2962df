use broadside::engine::grid::Cell;
use broadside::engine::view::{EMPTY, MISS};
use broadside::engine::GameError;
use broadside::errors::CustomError;
use broadside::models::{Catalog, FireShot, GameId, NewGame, Phase, PlaceVessel, Player, Role, ShotResult};
use broadside::referee::{Referee, RefereeSettings};
use broadside::store::{MemoryStore, Store};

async fn referee(settings: RefereeSettings) -> Referee<MemoryStore> {
    Referee::start(MemoryStore::new(), settings).await.unwrap()
}

async fn player(referee: &Referee<MemoryStore>, name: &str) -> Player {
    referee.sign_up(name, "not-a-real-hash", name).await.unwrap()
}

fn fleet() -> Vec<PlaceVessel> {
    (1..=5)
        .map(|v: u32| PlaceVessel {
            vessel: v,
            ri: i64::from(v) - 1,
            ci: 0,
            rf: i64::from(v) - 1,
            cf: i64::from(v) - 1,
        })
        .collect()
}

async fn deploy(referee: &Referee<MemoryStore>, caller: &Player, game: GameId, seat: u32) {
    for p in fleet() {
        referee.place_vessel(caller, game, seat, p).await.unwrap();
    }
}

// First cell of the opponent's board that holds no vessel
async fn water(referee: &Referee<MemoryStore>, game: GameId, target: u32) -> Cell {
    let m = referee.store().load_match(game).await.unwrap();
    let board = m.board(target).unwrap();
    board.dimensions().cells().find(|c| board.placement_at(*c).is_none()).unwrap()
}

#[tokio::test]
async fn game_against_cpu_starts_with_its_fleet_hidden() {
    let referee = referee(RefereeSettings::default()).await;
    let ann = player(&referee, "ann").await;

    let view = referee.create_game(&ann, NewGame::default()).await.unwrap();
    assert_eq!(view.game.phase, Phase::Placement);
    assert_eq!(view.game.owner, ann.id);
    assert!(!view.player.prepared);
    assert_eq!(view.player.available_ships.len(), 5);

    let opponent = view.opponent.unwrap();
    assert!(opponent.prepared);
    assert_eq!(opponent.ships_remaining, 5);
    assert!(opponent.placed_ships.is_empty());
    assert!(opponent.board.iter().flatten().all(|cell| *cell == EMPTY));
}

#[tokio::test]
async fn the_cpu_is_shared_between_games() {
    let referee = referee(RefereeSettings::default()).await;
    let ann = player(&referee, "ann").await;
    let bob = player(&referee, "bob").await;

    let first = referee.create_game(&ann, NewGame::default()).await.unwrap();
    let second = referee.create_game(&bob, NewGame::default()).await.unwrap();
    assert_eq!(first.game.cpu(), second.game.cpu());
    assert!(first.game.cpu().is_some());
}

#[tokio::test]
async fn placing_the_whole_fleet_starts_play() {
    let referee = referee(RefereeSettings::default()).await;
    let ann = player(&referee, "ann").await;
    let game = referee.create_game(&ann, NewGame::default()).await.unwrap().game.id;

    let mut layout = fleet().into_iter();
    let first = referee.place_vessel(&ann, game, ann.id, layout.next().unwrap()).await.unwrap();
    assert!(!first.prepared);
    assert_eq!(first.phase, Phase::Placement);

    let mut last = None;
    for p in layout {
        last = Some(referee.place_vessel(&ann, game, ann.id, p).await.unwrap());
    }
    let last = last.unwrap();
    assert!(last.prepared);
    assert_eq!(last.phase, Phase::Playing);

    let view = referee.game_view(&ann, game).await.unwrap();
    assert_eq!(view.game.phase, Phase::Playing);
    assert!(view.player.available_ships.is_empty());
    assert_eq!(view.player.placed_ships.len(), 5);
}

#[tokio::test]
async fn cpu_answers_a_miss_within_the_same_request() {
    let referee = referee(RefereeSettings::default()).await;
    let ann = player(&referee, "ann").await;
    let view = referee.create_game(&ann, NewGame::default()).await.unwrap();
    let game = view.game.id;
    let cpu = view.game.cpu().unwrap();
    deploy(&referee, &ann, game, ann.id).await;

    let target = water(&referee, game, cpu).await;
    let outcome = referee.fire(&ann, game, ann.id, FireShot::at(target)).await.unwrap();
    assert_eq!(outcome.report.shot.result, ShotResult::Miss);
    assert_eq!(outcome.report.turn, Some(cpu));
    assert!(!outcome.replies.is_empty());

    let reply = outcome.replies.last().unwrap();
    assert_eq!(reply.target, ann.id);
    assert_eq!(reply.turn, Some(ann.id));

    let view = referee.game_view(&ann, game).await.unwrap();
    assert_eq!(view.game.turn, Some(ann.id));
    let opponent = view.opponent.unwrap();
    assert_eq!(opponent.board[target.row as usize][target.col as usize], MISS);

    let m = referee.store().load_match(game).await.unwrap();
    assert_eq!(m.board(ann.id).unwrap().shots.len(), outcome.replies.len());
}

#[tokio::test]
async fn without_autoplay_the_owner_fires_for_the_cpu() {
    let settings = RefereeSettings { cpu_autoplay: false, ..RefereeSettings::default() };
    let referee = referee(settings).await;
    let ann = player(&referee, "ann").await;
    let eve = player(&referee, "eve").await;
    let view = referee.create_game(&ann, NewGame::default()).await.unwrap();
    let game = view.game.id;
    let cpu = view.game.cpu().unwrap();
    deploy(&referee, &ann, game, ann.id).await;

    let target = water(&referee, game, cpu).await;
    let outcome = referee.fire(&ann, game, ann.id, FireShot::at(target)).await.unwrap();
    assert!(outcome.replies.is_empty());
    assert_eq!(outcome.report.turn, Some(cpu));

    let err = referee.fire(&eve, game, cpu, FireShot::at(Cell::new(9, 9))).await.unwrap_err();
    assert!(matches!(err, CustomError::Rule(GameError::NotAPlayer)));

    let reply = referee.fire(&ann, game, cpu, FireShot::at(Cell::new(9, 9))).await.unwrap();
    assert_eq!(reply.report.target, ann.id);
}

#[tokio::test]
async fn rejected_shots_leave_the_game_untouched() {
    let referee = referee(RefereeSettings::default()).await;
    let ann = player(&referee, "ann").await;
    let view = referee.create_game(&ann, NewGame::default()).await.unwrap();
    let game = view.game.id;
    let cpu = view.game.cpu().unwrap();

    let early = referee.fire(&ann, game, ann.id, FireShot::at(Cell::new(0, 0))).await.unwrap_err();
    assert!(matches!(early, CustomError::Rule(GameError::WrongPhase)));

    deploy(&referee, &ann, game, ann.id).await;
    let outside = FireShot::at(Cell::new(10, 0));
    let err = referee.fire(&ann, game, ann.id, outside).await.unwrap_err();
    assert!(matches!(err, CustomError::Rule(GameError::CellOutOfBounds)));

    let m = referee.store().load_match(game).await.unwrap();
    assert!(m.board(cpu).unwrap().shots.is_empty());
    assert_eq!(m.game().turn, Some(ann.id));
}

#[tokio::test]
async fn active_games_are_capped() {
    let settings = RefereeSettings { max_active_games: 1, ..RefereeSettings::default() };
    let referee = referee(settings).await;
    let ann = player(&referee, "ann").await;

    referee.create_game(&ann, NewGame::default()).await.unwrap();
    let err = referee.create_game(&ann, NewGame::default()).await.unwrap_err();
    assert!(matches!(err, CustomError::MaxGames));
}

#[tokio::test]
async fn simultaneous_creates_respect_the_cap() {
    let settings = RefereeSettings { max_active_games: 1, ..RefereeSettings::default() };
    let referee = referee(settings).await;
    let ann = player(&referee, "ann").await;

    let (first, second) = tokio::join!(
        referee.create_game(&ann, NewGame::default()),
        referee.create_game(&ann, NewGame::default())
    );
    let created = [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(created, 1);
    assert_eq!(referee.games(&ann).await.unwrap().len(), 1);
}

#[tokio::test]
async fn joining_counts_towards_the_cap() {
    let settings = RefereeSettings { max_active_games: 1, ..RefereeSettings::default() };
    let referee = referee(settings).await;
    let ann = player(&referee, "ann").await;
    let bob = player(&referee, "bob").await;

    referee.create_game(&bob, NewGame::default()).await.unwrap();
    let open = NewGame { multiplayer: true, ..NewGame::default() };
    let game = referee.create_game(&ann, open).await.unwrap().game.id;

    let err = referee.join_game(&bob, game).await.unwrap_err();
    assert!(matches!(err, CustomError::MaxGames));
    let m = referee.store().load_match(game).await.unwrap();
    assert_eq!(m.game().phase, Phase::Waiting);
    assert!(m.game().opponent.is_none());
}

#[tokio::test]
async fn multiplayer_games_seat_a_second_human() {
    let referee = referee(RefereeSettings::default()).await;
    let ann = player(&referee, "ann").await;
    let bob = player(&referee, "bob").await;
    let eve = player(&referee, "eve").await;

    let settings = NewGame { multiplayer: true, ..NewGame::default() };
    let view = referee.create_game(&ann, settings).await.unwrap();
    assert_eq!(view.game.phase, Phase::Waiting);
    assert!(view.opponent.is_none());
    let game = view.game.id;

    let joined = referee.join_game(&bob, game).await.unwrap();
    assert_eq!(joined.game.phase, Phase::Placement);
    assert_eq!(joined.opponent.unwrap().username, "ann");

    let late = referee.join_game(&eve, game).await.unwrap_err();
    assert!(matches!(late, CustomError::Rule(GameError::GameNotJoinable)));

    let seated = referee.players(&ann, game).await.unwrap();
    let roles: Vec<(u32, Role)> = seated.iter().map(|s| (s.player.id, s.role)).collect();
    assert_eq!(roles, vec![(ann.id, Role::Owner), (bob.id, Role::Human)]);

    let outsider = referee.players(&eve, game).await.unwrap_err();
    assert!(matches!(outsider, CustomError::Rule(GameError::NotAPlayer)));

    // nobody may act for another human
    let err = referee.place_vessel(&ann, game, bob.id, fleet()[0]).await.unwrap_err();
    assert!(matches!(err, CustomError::Rule(GameError::NotAPlayer)));

    deploy(&referee, &ann, game, ann.id).await;
    deploy(&referee, &bob, game, bob.id).await;
    let view = referee.game_view(&bob, game).await.unwrap();
    assert_eq!(view.game.phase, Phase::Playing);
    assert_eq!(view.game.turn, Some(ann.id));

    let err = referee.fire(&bob, game, bob.id, FireShot::at(Cell::new(0, 0))).await.unwrap_err();
    assert!(matches!(err, CustomError::Rule(GameError::NotYourTurn)));
}

#[tokio::test]
async fn only_the_owner_or_an_admin_deletes_a_game() {
    let referee = referee(RefereeSettings::default()).await;
    let ann = player(&referee, "ann").await;
    let bob = player(&referee, "bob").await;

    let first = referee.create_game(&ann, NewGame::default()).await.unwrap().game.id;
    let second = referee.create_game(&ann, NewGame::default()).await.unwrap().game.id;
    assert_eq!(referee.games(&ann).await.unwrap().len(), 2);

    let err = referee.delete_game(&bob, false, first).await.unwrap_err();
    assert!(matches!(err, CustomError::Forbidden));

    referee.delete_game(&bob, true, first).await.unwrap();
    referee.delete_game(&ann, false, second).await.unwrap();

    let gone = referee.game_view(&ann, first).await.unwrap_err();
    assert!(matches!(gone, CustomError::GameNotFound));
    assert!(referee.games(&ann).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_accounts_are_refused() {
    let referee = referee(RefereeSettings::default()).await;
    player(&referee, "ann").await;
    let err = referee.sign_up("ann", "hash", "again").await.unwrap_err();
    assert!(matches!(err, CustomError::UserExists));
}

#[tokio::test]
async fn seeding_the_catalog_twice_keeps_one_fleet() {
    let store = MemoryStore::new();
    store.seed_vessels(&Catalog::standard()).await.unwrap();
    let referee = Referee::start(store, RefereeSettings::default()).await.unwrap();

    let stored = referee.store().vessels().await.unwrap();
    let sizes: Vec<(u32, u32)> = stored.iter().map(|v| (v.id, v.size)).collect();
    assert_eq!(sizes, vec![(1, 1), (2, 2), (3, 3), (4, 4), (5, 5)]);
    assert_eq!(referee.catalog(), &Catalog::standard());
}
