use strum::{Display, EnumCount, EnumIter};

/// Contents of a box, fixed when the box is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum BoxKind {
    Empty,
    Treasure,
    Trap,
}

/// Semantic tag of what occupies a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tile {
    Empty,
    Wall,
    Vegetation,
    Player,
    /// Closed box waiting to be opened.
    Box,
    /// Box that has been opened and is playing its disappearance animation.
    OpenedBox(BoxKind),
    /// Blank frame of the disappearance animation; still reserved by the box.
    Fading,
    Monster,
}

impl Tile {
    pub const fn glyph(self) -> char {
        match self {
            Tile::Empty | Tile::Fading => ' ',
            Tile::Wall => '▤',
            Tile::Vegetation => '♣',
            Tile::Player => '☺',
            Tile::Box => '■',
            Tile::OpenedBox(BoxKind::Empty) => '□',
            Tile::OpenedBox(BoxKind::Treasure) => '$',
            Tile::OpenedBox(BoxKind::Trap) => 'x',
            Tile::Monster => 'Ω',
        }
    }
}

/// One grid position: what is there and whether it blocks movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub tile: Tile,
    pub blocking: bool,
}

impl Cell {
    pub const EMPTY: Self = Self::new(Tile::Empty, false);
    pub const WALL: Self = Self::new(Tile::Wall, true);
    pub const VEGETATION: Self = Self::new(Tile::Vegetation, false);
    pub const PLAYER: Self = Self::new(Tile::Player, true);
    pub const BOX: Self = Self::new(Tile::Box, true);
    pub const FADING: Self = Self::new(Tile::Fading, true);
    pub const MONSTER: Self = Self::new(Tile::Monster, true);

    pub const fn new(tile: Tile, blocking: bool) -> Self {
        Self { tile, blocking }
    }

    /// Opened boxes keep blocking so nothing claims the cell mid-animation.
    pub const fn opened_box(kind: BoxKind) -> Self {
        Self::new(Tile::OpenedBox(kind), true)
    }

    /// True only for bare floor. Vegetation is walkable but not free for
    /// placing boxes or the monster.
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }

    pub const fn glyph(self) -> char {
        self.tile.glyph()
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}
