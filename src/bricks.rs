//! Brick catalog: read-only brick templates and the active brick copied out of them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Side of the square occupancy mask every rotation state is drawn in.
pub const BRICK_SIZE: usize = 4;

/// Upper bound on rotation states per brick.
pub const MAX_STATES: usize = 4;

/// One rotation state: `mask[row][col] != 0` means the cell is occupied.
pub type Mask = [[u8; BRICK_SIZE]; BRICK_SIZE];

const EMPTY_MASK: Mask = [[0; BRICK_SIZE]; BRICK_SIZE];

/// Colour tag written into the field for every cell a brick occupies (1..=7; 0 is empty).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BrickColor {
    LightBlue = 1,
    DarkBlue = 2,
    Orange = 3,
    Yellow = 4,
    Green = 5,
    Red = 6,
    Magenta = 7,
}

impl BrickColor {
    pub const ALL: [Self; 7] = [
        Self::LightBlue,
        Self::DarkBlue,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::Red,
        Self::Magenta,
    ];

    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("brick {name:?} must have 1..={MAX_STATES} rotation states, got {count}")]
    InvalidStateCount { name: &'static str, count: usize },
}

/// Grid position of a brick's anchor. `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// Immutable brick definition owned by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrickTemplate {
    name: &'static str,
    color: BrickColor,
    states: [Mask; MAX_STATES],
    total_states: usize,
}

impl BrickTemplate {
    /// Build a template from 1..=4 rotation states, in rotation order.
    pub fn new(
        name: &'static str,
        color: BrickColor,
        states: &[Mask],
    ) -> Result<Self, CatalogError> {
        if states.is_empty() || states.len() > MAX_STATES {
            return Err(CatalogError::InvalidStateCount {
                name,
                count: states.len(),
            });
        }
        let mut out = [EMPTY_MASK; MAX_STATES];
        out[..states.len()].copy_from_slice(states);
        Ok(Self {
            name,
            color,
            states: out,
            total_states: states.len(),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn color(&self) -> BrickColor {
        self.color
    }

    pub fn total_states(&self) -> usize {
        self.total_states
    }

    pub fn states(&self) -> &[Mask] {
        &self.states[..self.total_states]
    }

    /// Fresh active brick: rotation state 0, anchor at the origin.
    pub fn instantiate(&self) -> Brick {
        Brick {
            name: self.name,
            color: self.color,
            states: self.states,
            total_states: self.total_states,
            state: 0,
            pos: Position::default(),
        }
    }
}

/// The falling brick. A by-value copy of a template plus rotation and anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brick {
    name: &'static str,
    color: BrickColor,
    states: [Mask; MAX_STATES],
    total_states: usize,
    pub state: usize,
    pub pos: Position,
}

impl Brick {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn color(&self) -> BrickColor {
        self.color
    }

    pub fn total_states(&self) -> usize {
        self.total_states
    }

    /// Mask of the current rotation state.
    #[inline]
    pub fn mask(&self) -> &Mask {
        &self.states[self.state]
    }

    /// Advance to the next rotation state, wrapping to 0 after the last.
    pub fn next_state(&mut self) {
        self.state = (self.state + 1) % self.total_states;
    }

    /// Step back one rotation state, wrapping to the last from 0.
    pub fn prev_state(&mut self) {
        self.state = if self.state == 0 {
            self.total_states - 1
        } else {
            self.state - 1
        };
    }

    /// Absolute `(x, y)` grid coordinates of every occupied cell.
    ///
    /// Mask cell `(row, col)` lands on `(pos.x - 2 + col, pos.y - 1 + row)`, so the
    /// anchor sits near the middle of the 4x4 mask.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let origin_x = self.pos.x - (BRICK_SIZE as i32) / 2;
        let origin_y = self.pos.y - (BRICK_SIZE as i32) / 2 + 1;
        self.mask().iter().enumerate().flat_map(move |(row, cols)| {
            cols.iter()
                .enumerate()
                .filter(|(_, v)| **v != 0)
                .map(move |(col, _)| (origin_x + col as i32, origin_y + row as i32))
        })
    }

    /// Current mask coloured with this brick's tag, empty cells zeroed.
    pub fn preview(&self) -> [[u8; BRICK_SIZE]; BRICK_SIZE] {
        let tag = self.color.tag();
        let mut out = [[0u8; BRICK_SIZE]; BRICK_SIZE];
        for (dst, src) in out.iter_mut().zip(self.mask()) {
            for (d, s) in dst.iter_mut().zip(src) {
                *d = if *s != 0 { tag } else { 0 };
            }
        }
        out
    }
}

const fn template(
    name: &'static str,
    color: BrickColor,
    total_states: usize,
    states: [Mask; MAX_STATES],
) -> BrickTemplate {
    BrickTemplate {
        name,
        color,
        states,
        total_states,
    }
}

/// The seven canonical tetrominoes, in registration order I, O, S, Z, L, J, T.
pub const STANDARD_BRICKS: [BrickTemplate; 7] = [
    template(
        "I",
        BrickColor::LightBlue,
        2,
        [
            [[0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]],
            [[0, 0, 1, 0], [0, 0, 1, 0], [0, 0, 1, 0], [0, 0, 1, 0]],
            EMPTY_MASK,
            EMPTY_MASK,
        ],
    ),
    template(
        "O",
        BrickColor::Yellow,
        1,
        [
            [[0, 0, 0, 0], [0, 1, 1, 0], [0, 1, 1, 0], [0, 0, 0, 0]],
            EMPTY_MASK,
            EMPTY_MASK,
            EMPTY_MASK,
        ],
    ),
    template(
        "S",
        BrickColor::Green,
        2,
        [
            [[0, 0, 0, 0], [0, 0, 1, 1], [0, 1, 1, 0], [0, 0, 0, 0]],
            [[0, 0, 1, 0], [0, 0, 1, 1], [0, 0, 0, 1], [0, 0, 0, 0]],
            EMPTY_MASK,
            EMPTY_MASK,
        ],
    ),
    template(
        "Z",
        BrickColor::Red,
        2,
        [
            [[0, 0, 0, 0], [0, 1, 1, 0], [0, 0, 1, 1], [0, 0, 0, 0]],
            [[0, 0, 0, 1], [0, 0, 1, 1], [0, 0, 1, 0], [0, 0, 0, 0]],
            EMPTY_MASK,
            EMPTY_MASK,
        ],
    ),
    template(
        "L",
        BrickColor::Orange,
        4,
        [
            [[0, 0, 0, 0], [0, 1, 1, 1], [0, 1, 0, 0], [0, 0, 0, 0]],
            [[0, 0, 1, 0], [0, 0, 1, 0], [0, 0, 1, 1], [0, 0, 0, 0]],
            [[0, 0, 0, 1], [0, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]],
            [[0, 1, 1, 0], [0, 0, 1, 0], [0, 0, 1, 0], [0, 0, 0, 0]],
        ],
    ),
    template(
        "J",
        BrickColor::DarkBlue,
        4,
        [
            [[0, 0, 0, 0], [0, 1, 1, 1], [0, 0, 0, 1], [0, 0, 0, 0]],
            [[0, 0, 1, 1], [0, 0, 1, 0], [0, 0, 1, 0], [0, 0, 0, 0]],
            [[0, 1, 0, 0], [0, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]],
            [[0, 0, 1, 0], [0, 0, 1, 0], [0, 1, 1, 0], [0, 0, 0, 0]],
        ],
    ),
    template(
        "T",
        BrickColor::Magenta,
        4,
        [
            [[0, 0, 0, 0], [0, 1, 1, 1], [0, 0, 1, 0], [0, 0, 0, 0]],
            [[0, 0, 1, 0], [0, 0, 1, 1], [0, 0, 1, 0], [0, 0, 0, 0]],
            [[0, 0, 1, 0], [0, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]],
            [[0, 0, 1, 0], [0, 1, 1, 0], [0, 0, 1, 0], [0, 0, 0, 0]],
        ],
    ),
];

/// Oversized and irregular extras. Additive on top of the standard set.
pub const CUSTOM_BRICKS: [BrickTemplate; 2] = [
    template(
        "Block",
        BrickColor::Yellow,
        4,
        [
            [[0, 0, 0, 0], [1, 1, 1, 1], [1, 1, 1, 1], [1, 1, 1, 1]],
            [[0, 0, 0, 0], [0, 1, 1, 1], [0, 1, 1, 1], [0, 1, 1, 1]],
            [[0, 0, 0, 0], [0, 1, 1, 0], [0, 1, 1, 0], [0, 1, 1, 0]],
            [[0, 0, 0, 0], [1, 1, 1, 0], [1, 1, 1, 0], [1, 1, 1, 0]],
        ],
    ),
    template(
        "Crown",
        BrickColor::Red,
        2,
        [
            [[0, 0, 0, 0], [1, 1, 1, 1], [0, 1, 1, 0], [1, 0, 0, 1]],
            [[0, 0, 0, 0], [0, 1, 1, 0], [1, 0, 0, 1], [0, 1, 1, 0]],
            EMPTY_MASK,
            EMPTY_MASK,
        ],
    ),
];

/// Arena of brick templates plus the random source used to pick from it.
#[derive(Debug, Clone)]
pub struct BrickCatalog {
    templates: Vec<BrickTemplate>,
    last_index: Option<usize>,
    custom_loaded: bool,
    rng: StdRng,
}

impl BrickCatalog {
    /// Empty catalog with an OS-seeded random source.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Empty catalog with a deterministic random source.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            templates: Vec::with_capacity(STANDARD_BRICKS.len() + CUSTOM_BRICKS.len()),
            last_index: None,
            custom_loaded: false,
            rng,
        }
    }

    /// Catalog preloaded with the seven standard tetrominoes.
    pub fn standard(seed: Option<u64>) -> Self {
        let mut catalog = match seed {
            Some(s) => Self::seeded(s),
            None => Self::new(),
        };
        for t in STANDARD_BRICKS {
            catalog.register(t);
        }
        catalog
    }

    /// Append a template. Duplicates are allowed.
    pub fn register(&mut self, template: BrickTemplate) {
        self.templates.push(template);
    }

    /// Register the custom extension once. Returns false if it was already loaded.
    pub fn populate_custom(&mut self) -> bool {
        if self.custom_loaded {
            return false;
        }
        for t in CUSTOM_BRICKS {
            self.register(t);
        }
        self.custom_loaded = true;
        true
    }

    pub fn has_custom(&self) -> bool {
        self.custom_loaded
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn templates(&self) -> &[BrickTemplate] {
        &self.templates
    }

    /// Fresh brick built from the template at `index`.
    pub fn get(&self, index: usize) -> Option<Brick> {
        self.templates.get(index).map(BrickTemplate::instantiate)
    }

    /// Uniformly random brick, never the same index twice in a row when
    /// more than one template is registered.
    pub fn get_random(&mut self) -> Option<Brick> {
        let count = self.templates.len();
        if count == 0 {
            return None;
        }
        let mut index = self.rng.random_range(0..count);
        while count > 1 && Some(index) == self.last_index {
            index = self.rng.random_range(0..count);
        }
        self.last_index = Some(index);
        self.get(index)
    }
}

impl Default for BrickCatalog {
    fn default() -> Self {
        Self::standard(None)
    }
}
