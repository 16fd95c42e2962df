use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;

use super::error::GameError;
use super::grid::{Cell, Orientation, Span};
use super::placement;
use super::state::{Match, ShotReport};
use crate::models::{Board, Catalog, FireShot, PlaceVessel, PlayerId, ShotResult};

// Whole-fleet retries before giving up on a board
const MAX_DEPLOY_ATTEMPTS: usize = 64;

fn candidate_spans(board: &Board, catalog: &Catalog, vessel_id: u32) -> Vec<Span> {
    let Some(vessel) = catalog.get(vessel_id) else {
        return Vec::new();
    };
    let dims = board.dimensions();
    let len = i64::from(vessel.size) - 1;
    let mut spans = Vec::new();
    for cell in dims.cells() {
        let (r, c) = (i64::from(cell.row), i64::from(cell.col));
        for orientation in [Orientation::Horizontal, Orientation::Vertical] {
            let span = match orientation {
                Orientation::Horizontal => Span { ri: r, ci: c, rf: r, cf: c + len },
                Orientation::Vertical => Span { ri: r, ci: c, rf: r + len, cf: c },
            };
            if placement::validate(board, vessel, span).is_ok() {
                spans.push(span);
            }
            if len == 0 {
                break;
            }
        }
    }
    spans
}

// Largest vessel first, on a scratch copy so a failure leaves the match as it was
pub fn deploy_fleet<R: Rng + ?Sized>(
    m: &mut Match,
    catalog: &Catalog,
    player: PlayerId,
    rng: &mut R,
) -> Result<(), GameError> {
    let mut order: Vec<u32> = catalog.vessels().iter().map(|v| v.id).collect();
    order.sort_by_key(|id| std::cmp::Reverse(catalog.get(*id).map(|v| v.size).unwrap_or(0)));

    for attempt in 0..MAX_DEPLOY_ATTEMPTS {
        let mut scratch = m.clone();
        let mut deployed = true;
        for &vessel in &order {
            let Some(board) = scratch.board(player) else {
                return Err(GameError::NotAPlayer);
            };
            if board.placement(vessel).is_some() {
                continue;
            }
            let spans = candidate_spans(board, catalog, vessel);
            let Some(span) = spans.choose(rng) else {
                deployed = false;
                break;
            };
            let request = PlaceVessel { vessel, ri: span.ri, ci: span.ci, rf: span.rf, cf: span.cf };
            scratch.place(catalog, player, &request)?;
        }
        if deployed {
            debug!("Fleet of player {} deployed after {} attempt(s)", player, attempt + 1);
            *m = scratch;
            return Ok(());
        }
    }

    warn!("Could not fit a fleet on the board of player {}", player);
    Err(GameError::InvalidPlacement)
}

// Unshot neighbours of a struck vessel still afloat come first
pub fn pick_target<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<Cell> {
    let dims = board.dimensions();
    let wounded: Vec<Cell> = board
        .shots
        .iter()
        .filter(|s| s.result == ShotResult::Hit)
        .filter(|s| {
            s.impact
                .and_then(|v| board.placement(v))
                .map(|p| p.alive)
                .unwrap_or(false)
        })
        .map(|s| s.cell())
        .collect();

    let mut follow_up: Vec<Cell> = wounded
        .iter()
        .flat_map(|c| c.neighbours(dims))
        .filter(|c| !board.is_shot(*c))
        .collect();
    follow_up.sort();
    follow_up.dedup();
    if let Some(cell) = follow_up.choose(rng) {
        return Some(*cell);
    }

    let open: Vec<Cell> = dims.cells().filter(|c| !board.is_shot(*c)).collect();
    open.choose(rng).copied()
}

pub fn play_turn<R: Rng + ?Sized>(
    m: &mut Match,
    cpu: PlayerId,
    rng: &mut R,
) -> Result<Vec<ShotReport>, GameError> {
    let mut reports = Vec::new();
    while m.game().turn == Some(cpu) && m.game().winner.is_none() {
        let target = m.game().opponent_of(cpu).ok_or(GameError::OpponentBoardNotFound)?;
        let board = m.board(target).ok_or(GameError::OpponentBoardNotFound)?;
        let Some(cell) = pick_target(board, rng) else {
            break;
        };
        reports.push(m.fire(cpu, &FireShot::at(cell))?);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::grid::Dimensions;
    use crate::models::{NewGame, Placement, Shot};
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn fleet_fits_on_the_smallest_board() {
        let catalog = Catalog::standard();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let settings = NewGame { width: 5, height: 5, multiplayer: false };
            let mut m = Match::open(&settings, 1, Some(2)).unwrap();
            deploy_fleet(&mut m, &catalog, 2, &mut rng).unwrap();
            let board = m.board(2).unwrap();
            assert!(board.prepared);
            assert_eq!(board.placements.len(), 5);
        }
    }

    #[test]
    fn wounded_vessel_neighbours_come_first() {
        let mut board = Board::new(1, 1, Dimensions::new(10, 10).unwrap());
        board.push_placement(Placement { vessel_id: 3, ri: 5, ci: 5, rf: 5, cf: 7, alive: true });
        board.push_shot(Shot {
            shooter: 2,
            row: 5,
            col: 5,
            result: ShotResult::Hit,
            impact: Some(3),
            fired_at: Utc::now(),
        });
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            let cell = pick_target(&board, &mut rng).unwrap();
            assert!(Cell::new(5, 5).neighbours(board.dimensions()).contains(&cell));
        }
    }

    #[test]
    fn no_target_on_a_fully_shot_board() {
        let mut board = Board::new(1, 1, Dimensions::new(5, 5).unwrap());
        for cell in Dimensions::new(5, 5).unwrap().cells() {
            board.push_shot(Shot {
                shooter: 2,
                row: cell.row,
                col: cell.col,
                result: ShotResult::Miss,
                impact: None,
                fired_at: Utc::now(),
            });
        }
        assert_eq!(pick_target(&board, &mut StdRng::seed_from_u64(1)), None);
    }
}
