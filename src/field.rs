//! Playfield grid and the collision/placement primitives bricks are tested against.

use crate::bricks::Brick;

pub const FIELD_WIDTH: usize = 10;
pub const FIELD_HEIGHT: usize = 20;

/// One row of cells: 0 is empty, 1..=7 is a brick colour tag.
pub type Row = [u8; FIELD_WIDTH];

/// Playfield: `rows[y][x]`, `rows[0]` is the top.
///
/// The falling brick is painted into the grid between moves; every move is
/// remove, shift, test, place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    rows: [Row; FIELD_HEIGHT],
}

impl Default for Field {
    fn default() -> Self {
        Self::new()
    }
}

impl Field {
    pub fn new() -> Self {
        Self {
            rows: [[0; FIELD_WIDTH]; FIELD_HEIGHT],
        }
    }

    pub fn rows(&self) -> &[Row; FIELD_HEIGHT] {
        &self.rows
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        if let Some(cell) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = value;
        }
    }

    pub fn set_row(&mut self, y: usize, row: Row) {
        if let Some(r) = self.rows.get_mut(y) {
            *r = row;
        }
    }

    pub fn clear(&mut self) {
        self.rows = [[0; FIELD_WIDTH]; FIELD_HEIGHT];
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().flatten().all(|c| *c == 0)
    }

    /// True if any occupied brick cell is out of bounds or on a non-empty cell.
    pub fn collides(&self, brick: &Brick) -> bool {
        brick
            .cells()
            .any(|(x, y)| match in_bounds(x, y) {
                Some((x, y)) => self.rows[y][x] != 0,
                None => true,
            })
    }

    /// Write the brick's colour tag into every cell it occupies.
    pub fn place(&mut self, brick: &Brick) {
        let tag = brick.color().tag();
        for (x, y) in brick.cells() {
            if let Some((x, y)) = in_bounds(x, y) {
                self.rows[y][x] = tag;
            }
        }
    }

    /// Zero every cell the brick occupies.
    pub fn remove(&mut self, brick: &Brick) {
        for (x, y) in brick.cells() {
            if let Some((x, y)) = in_bounds(x, y) {
                self.rows[y][x] = 0;
            }
        }
    }

    /// Erase full rows bottom-up, shifting everything above down. Returns the count.
    pub fn erase_full_rows(&mut self) -> usize {
        let mut erased = 0;
        let mut y = FIELD_HEIGHT;
        while y > 0 {
            let row = y - 1;
            if self.rows[row].iter().all(|c| *c != 0) {
                self.shift_down_onto(row);
                erased += 1;
                // re-check the same row, it now holds what was above
            } else {
                y -= 1;
            }
        }
        erased
    }

    fn shift_down_onto(&mut self, row: usize) {
        self.rows.copy_within(0..row, 1);
        self.rows[0] = [0; FIELD_WIDTH];
    }
}

#[inline]
fn in_bounds(x: i32, y: i32) -> Option<(usize, usize)> {
    let (ux, uy) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
    (ux < FIELD_WIDTH && uy < FIELD_HEIGHT).then_some((ux, uy))
}
