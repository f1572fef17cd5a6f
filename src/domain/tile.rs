/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.
///
/// Every classification is an exhaustive `match`: adding a variant without
/// deciding its solidity, value and sprite is a compile error.

use thiserror::Error;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Tile {
    #[default]
    Air,
    OfficeWall,
    DoorOpenHorizontal,   // on a room's left/right edge
    DoorClosedHorizontal,
    DoorOpenVertical,     // on a room's top/bottom edge
    DoorClosedVertical,
    Exit,
    GoldBars,
    SilverCoin,
}

/// Sprite identifiers handed to the rendering collaborator.
/// The core never resolves these to pixels.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SpriteId {
    OfficeWall,
    DoorOpenHorizontal,
    DoorClosedHorizontal,
    DoorOpenVertical,
    DoorClosedVertical,
    Exit,
    ExitSign,
    ExitSignOpen,
    GoldBars,
    SilverCoin,
    Robber,
    Guard,
    DangerMarker,
    QuestionMark,
    ExclamationPoint,
    Darkness,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TileError {
    #[error("unknown tile character {0:?}")]
    Unknown(char),
}

impl Tile {
    /// Does this tile block movement and line of sight?
    pub fn is_solid(self) -> bool {
        match self {
            Tile::OfficeWall | Tile::DoorClosedHorizontal | Tile::DoorClosedVertical => true,
            Tile::Air
            | Tile::DoorOpenHorizontal
            | Tile::DoorOpenVertical
            | Tile::Exit
            | Tile::GoldBars
            | Tile::SilverCoin => false,
        }
    }

    /// Money granted when the player picks this tile up. 0 = not loot.
    pub fn value(self) -> u32 {
        match self {
            Tile::GoldBars => 50,
            Tile::SilverCoin => 10,
            Tile::Air
            | Tile::OfficeWall
            | Tile::DoorOpenHorizontal
            | Tile::DoorClosedHorizontal
            | Tile::DoorOpenVertical
            | Tile::DoorClosedVertical
            | Tile::Exit => 0,
        }
    }

    pub fn is_loot(self) -> bool {
        self.value() != 0
    }

    pub fn is_door(self) -> bool {
        matches!(
            self,
            Tile::DoorOpenHorizontal
                | Tile::DoorClosedHorizontal
                | Tile::DoorOpenVertical
                | Tile::DoorClosedVertical
        )
    }

    /// The closed counterpart of an open door, `None` for anything else.
    pub fn closed(self) -> Option<Tile> {
        match self {
            Tile::DoorOpenHorizontal => Some(Tile::DoorClosedHorizontal),
            Tile::DoorOpenVertical => Some(Tile::DoorClosedVertical),
            _ => None,
        }
    }

    /// Sprite for the tile itself. Air draws nothing.
    pub fn sprite(self) -> Option<SpriteId> {
        match self {
            Tile::Air => None,
            Tile::OfficeWall => Some(SpriteId::OfficeWall),
            Tile::DoorOpenHorizontal => Some(SpriteId::DoorOpenHorizontal),
            Tile::DoorClosedHorizontal => Some(SpriteId::DoorClosedHorizontal),
            Tile::DoorOpenVertical => Some(SpriteId::DoorOpenVertical),
            Tile::DoorClosedVertical => Some(SpriteId::DoorClosedVertical),
            Tile::Exit => Some(SpriteId::Exit),
            Tile::GoldBars => Some(SpriteId::GoldBars),
            Tile::SilverCoin => Some(SpriteId::SilverCoin),
        }
    }

    /// Single-character form, used by grid dumps and test fixtures.
    pub fn to_char(self) -> char {
        match self {
            Tile::Air => '.',
            Tile::OfficeWall => '#',
            Tile::DoorOpenHorizontal => '-',
            Tile::DoorClosedHorizontal => '=',
            Tile::DoorOpenVertical => '|',
            Tile::DoorClosedVertical => '!',
            Tile::Exit => 'E',
            Tile::GoldBars => 'G',
            Tile::SilverCoin => 'S',
        }
    }
}

impl TryFrom<char> for Tile {
    type Error = TileError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '.' | ' ' => Ok(Tile::Air),
            '#' => Ok(Tile::OfficeWall),
            '-' => Ok(Tile::DoorOpenHorizontal),
            '=' => Ok(Tile::DoorClosedHorizontal),
            '|' => Ok(Tile::DoorOpenVertical),
            '!' => Ok(Tile::DoorClosedVertical),
            'E' => Ok(Tile::Exit),
            'G' => Ok(Tile::GoldBars),
            'S' => Ok(Tile::SilverCoin),
            other => Err(TileError::Unknown(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Tile; 9] = [
        Tile::Air,
        Tile::OfficeWall,
        Tile::DoorOpenHorizontal,
        Tile::DoorClosedHorizontal,
        Tile::DoorOpenVertical,
        Tile::DoorClosedVertical,
        Tile::Exit,
        Tile::GoldBars,
        Tile::SilverCoin,
    ];

    #[test]
    fn only_walls_and_closed_doors_are_solid() {
        let solid: Vec<Tile> = ALL.iter().copied().filter(|t| t.is_solid()).collect();
        assert_eq!(
            solid,
            vec![Tile::OfficeWall, Tile::DoorClosedHorizontal, Tile::DoorClosedVertical]
        );
    }

    #[test]
    fn loot_values() {
        assert_eq!(Tile::GoldBars.value(), 50);
        assert_eq!(Tile::SilverCoin.value(), 10);
        assert_eq!(Tile::Exit.value(), 0);
        assert!(!Tile::Air.is_loot());
    }

    #[test]
    fn open_doors_close_by_orientation() {
        assert_eq!(Tile::DoorOpenHorizontal.closed(), Some(Tile::DoorClosedHorizontal));
        assert_eq!(Tile::DoorOpenVertical.closed(), Some(Tile::DoorClosedVertical));
        assert_eq!(Tile::DoorClosedVertical.closed(), None);
        assert_eq!(Tile::Air.closed(), None);
    }

    #[test]
    fn char_codec_covers_every_tile() {
        for tile in ALL {
            assert_eq!(Tile::try_from(tile.to_char()), Ok(tile));
        }
    }

    #[test]
    fn unknown_char_is_an_error() {
        assert_eq!(Tile::try_from('?'), Err(TileError::Unknown('?')));
    }

    #[test]
    fn air_has_no_sprite() {
        assert_eq!(Tile::Air.sprite(), None);
        assert_eq!(Tile::OfficeWall.sprite(), Some(SpriteId::OfficeWall));
    }
}
