use serde::{Deserialize, Serialize};

use super::error::GameError;

pub const MIN_SIDE: u32 = 5;
pub const MAX_SIDE: u32 = 200;

/// A cell on a board, zero based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
}

impl Cell {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    pub fn neighbours(&self, dims: Dimensions) -> Vec<Cell> {
        let (r, c) = (i64::from(self.row), i64::from(self.col));
        [(r - 1, c), (r + 1, c), (r, c - 1), (r, c + 1)]
            .into_iter()
            .filter_map(|(r, c)| dims.cell(r, c))
            .collect()
    }
}

/// Height × width of a board, each side within [`MIN_SIDE`, `MAX_SIDE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    pub fn new(width: i64, height: i64) -> Result<Self, GameError> {
        let side = |v: i64| {
            u32::try_from(v)
                .ok()
                .filter(|v| (MIN_SIDE..=MAX_SIDE).contains(v))
                .ok_or(GameError::IllegalBoardSize)
        };
        Ok(Self { width: side(width)?, height: side(height)? })
    }

    // For dimensions already validated when the game was created
    pub(crate) fn trusted(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn cell(&self, row: i64, col: i64) -> Option<Cell> {
        let row = u32::try_from(row).ok().filter(|r| *r < self.height)?;
        let col = u32::try_from(col).ok().filter(|c| *c < self.width)?;
        Some(Cell { row, col })
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    pub(crate) fn index(&self, cell: Cell) -> Option<usize> {
        self.contains(cell)
            .then(|| cell.row as usize * self.width as usize + cell.col as usize)
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height).flat_map(move |r| (0..self.width).map(move |c| Cell::new(r, c)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

// differing rows means vertical
pub fn orientation(ri: u32, rf: u32) -> Orientation {
    if ri != rf {
        Orientation::Vertical
    } else {
        Orientation::Horizontal
    }
}

/// Vertical spans walk the rows of the start column, horizontal spans the
/// columns of the start row.
pub fn footprint(start: Cell, end: Cell) -> Vec<Cell> {
    match orientation(start.row, end.row) {
        Orientation::Vertical => (start.row..=end.row).map(|r| Cell::new(r, start.col)).collect(),
        Orientation::Horizontal => (start.col..=end.col).map(|c| Cell::new(start.row, c)).collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub ri: i64,
    pub ci: i64,
    pub rf: i64,
    pub cf: i64,
}

impl Span {
    pub fn is_axis_aligned(&self) -> bool {
        self.ri == self.rf || self.ci == self.cf
    }

    pub fn len(&self) -> u64 {
        if self.ri != self.rf {
            self.ri.abs_diff(self.rf) + 1
        } else {
            self.ci.abs_diff(self.cf) + 1
        }
    }

    pub fn normalized(&self) -> Span {
        Span {
            ri: self.ri.min(self.rf),
            ci: self.ci.min(self.cf),
            rf: self.ri.max(self.rf),
            cf: self.ci.max(self.cf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sides_outside_range_are_rejected() {
        assert_eq!(Dimensions::new(4, 10), Err(GameError::IllegalBoardSize));
        assert_eq!(Dimensions::new(10, 201), Err(GameError::IllegalBoardSize));
        assert_eq!(Dimensions::new(-10, 10), Err(GameError::IllegalBoardSize));
        let dims = Dimensions::new(5, 200).unwrap();
        assert_eq!(dims.area(), 1000);
    }

    #[test]
    fn cell_lookup_respects_bounds() {
        let dims = Dimensions::new(10, 6).unwrap();
        assert_eq!(dims.cell(5, 9), Some(Cell::new(5, 9)));
        assert_eq!(dims.cell(6, 0), None);
        assert_eq!(dims.cell(0, 10), None);
        assert_eq!(dims.cell(-1, 0), None);
    }

    #[test]
    fn vertical_footprint_walks_rows() {
        let cells = footprint(Cell::new(2, 3), Cell::new(3, 3));
        assert_eq!(cells, vec![Cell::new(2, 3), Cell::new(3, 3)]);
    }

    #[test]
    fn horizontal_footprint_walks_columns() {
        let cells = footprint(Cell::new(4, 1), Cell::new(4, 5));
        assert_eq!(cells.len(), 5);
        assert!(cells.iter().all(|c| c.row == 4));
        assert_eq!(cells.first(), Some(&Cell::new(4, 1)));
        assert_eq!(cells.last(), Some(&Cell::new(4, 5)));
    }

    #[test]
    fn single_cell_footprint() {
        assert_eq!(footprint(Cell::new(0, 0), Cell::new(0, 0)), vec![Cell::new(0, 0)]);
    }

    #[test]
    fn span_length_and_normalization() {
        let span = Span { ri: 7, ci: 2, rf: 4, cf: 2 };
        assert!(span.is_axis_aligned());
        assert_eq!(span.len(), 4);
        assert_eq!(span.normalized(), Span { ri: 4, ci: 2, rf: 7, cf: 2 });
        assert!(!Span { ri: 0, ci: 0, rf: 1, cf: 1 }.is_axis_aligned());
    }

    #[test]
    fn corner_cells_have_two_neighbours() {
        let dims = Dimensions::new(5, 5).unwrap();
        assert_eq!(Cell::new(0, 0).neighbours(dims).len(), 2);
        assert_eq!(Cell::new(2, 2).neighbours(dims).len(), 4);
    }
}
