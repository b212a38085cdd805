//! Grid: dimension x dimension slots of optional grains, indexed `[column][row]`.

use crate::grain::Grain;

/// Square world of cells. Row 0 is the top; the last row is the floor.
///
/// A grain's position is the slot that holds it; grains carry no coordinates.
/// Reads outside the grid see an empty slot and writes outside it are ignored.
#[derive(Debug, Clone)]
pub struct Grid {
    dimension: usize,
    /// Column-major: `cells[column * dimension + row]`.
    cells: Vec<Option<Grain>>,
}

impl Grid {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            cells: vec![None; dimension * dimension],
        }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Index of the floor row (and of the rightmost column).
    #[inline]
    pub fn last(&self) -> usize {
        self.dimension.saturating_sub(1)
    }

    #[inline]
    fn index(&self, column: usize, row: usize) -> Option<usize> {
        (column < self.dimension && row < self.dimension).then(|| column * self.dimension + row)
    }

    #[inline]
    pub fn get(&self, column: usize, row: usize) -> Option<Grain> {
        self.index(column, row).and_then(|i| self.cells[i])
    }

    #[inline]
    pub fn is_empty(&self, column: usize, row: usize) -> bool {
        self.get(column, row).is_none()
    }

    /// Put `grain` into an empty slot. Returns false if the slot is taken or off-grid.
    pub fn place(&mut self, column: usize, row: usize, grain: Grain) -> bool {
        match self.index(column, row) {
            Some(i) if self.cells[i].is_none() => {
                self.cells[i] = Some(grain);
                true
            }
            _ => false,
        }
    }

    /// Move whatever is at `from` into `to` and empty `from`.
    /// No-op (returns false) when either slot is off-grid.
    pub fn move_grain(&mut self, from: (usize, usize), to: (usize, usize)) -> bool {
        let (Some(src), Some(dst)) = (self.index(from.0, from.1), self.index(to.0, to.1)) else {
            return false;
        };
        self.cells[dst] = self.cells[src].take();
        true
    }

    /// Empty every slot.
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn grain() -> Grain {
        Grain::new(Color::Rgb(0xda, 0xd1, 0x9e))
    }

    #[test]
    fn test_new_grid_is_empty() {
        let grid = Grid::new(4);
        assert_eq!(grid.dimension(), 4);
        assert_eq!(grid.last(), 3);
        assert_eq!(grid.occupied(), 0);
        assert!(grid.is_empty(3, 3));
    }

    #[test]
    fn test_out_of_range_reads_empty_and_writes_ignored() {
        let mut grid = Grid::new(3);
        assert!(grid.is_empty(3, 0));
        assert!(grid.is_empty(0, 7));
        assert!(!grid.place(3, 0, grain()));
        assert!(!grid.move_grain((0, 0), (0, 3)));
        assert_eq!(grid.occupied(), 0);
    }

    #[test]
    fn test_place_refuses_occupied_slot() {
        let mut grid = Grid::new(3);
        let first = Grain::new(Color::Red);
        assert!(grid.place(1, 1, first));
        assert!(!grid.place(1, 1, Grain::new(Color::Blue)));
        assert_eq!(grid.get(1, 1), Some(first));
    }

    #[test]
    fn test_columns_and_rows_are_distinct_axes() {
        let mut grid = Grid::new(3);
        grid.place(2, 0, grain());
        assert!(!grid.is_empty(2, 0));
        assert!(grid.is_empty(0, 2));
    }

    #[test]
    fn test_move_grain_empties_source() {
        let mut grid = Grid::new(3);
        grid.place(0, 0, grain());
        assert!(grid.move_grain((0, 0), (1, 1)));
        assert!(grid.is_empty(0, 0));
        assert_eq!(grid.get(1, 1), Some(grain()));
        assert_eq!(grid.occupied(), 1);
    }

    #[test]
    fn test_clear() {
        let mut grid = Grid::new(2);
        grid.place(0, 0, grain());
        grid.place(1, 1, grain());
        grid.clear();
        assert_eq!(grid.occupied(), 0);
    }
}
