/// The tile grid: a fixed square of `SIZE` x `SIZE` cells, row-major.
///
/// ## Bounds policy
///
/// Reads outside the grid return `Tile::OfficeWall`, writes outside the grid
/// are ignored. Every collision and vision query goes through `get`, so the
/// playfield edge behaves like a wall without range checks at call sites.
///
/// ## Coordinates
///
/// Entities live in continuous pixel space. A tile is `TILE_WIDTH` x
/// `TILE_HEIGHT` pixels (non-square), and `tile_position` maps a pixel
/// position to the tile containing it.

use glam::{IVec2, Vec2};

use super::tile::Tile;

pub const TILE_WIDTH: i32 = 8;
pub const TILE_HEIGHT: i32 = 5;
/// Vertical movement is scaled by this so on-screen speed is uniform.
pub const TILE_SIZE_RATIO: f32 = TILE_HEIGHT as f32 / TILE_WIDTH as f32;

pub const SIZE: i32 = 32;
pub const ROOM_SIZE: i32 = 8;
pub const HALLWAY_SIZE: i32 = 4;
/// Rooms per side of the 3x3 layout.
pub const ROOMS_PER_SIDE: i32 = 3;

const LENGTH: usize = (SIZE * SIZE) as usize;

/// Pixel size of one tile as a vector.
pub fn tile_size() -> Vec2 {
    Vec2::new(TILE_WIDTH as f32, TILE_HEIGHT as f32)
}

/// Tile containing the given pixel position (floor division, so negative
/// positions land on negative tiles).
#[inline]
pub fn tile_position(position: Vec2) -> IVec2 {
    (position / tile_size()).floor().as_ivec2()
}

/// Top-left pixel of a tile.
#[inline]
pub fn tile_origin(tile: IVec2) -> Vec2 {
    tile.as_vec2() * tile_size()
}

/// Top-left tile of the room at `(room_x, room_y)` in the 3x3 layout.
pub fn room_origin(room_x: i32, room_y: i32) -> IVec2 {
    IVec2::new(
        room_x * (ROOM_SIZE + HALLWAY_SIZE),
        room_y * (ROOM_SIZE + HALLWAY_SIZE),
    )
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn new() -> Self {
        TileGrid { tiles: vec![Tile::Air; LENGTH] }
    }

    #[inline]
    fn index(x: i32, y: i32) -> Option<usize> {
        if (0..SIZE).contains(&x) && (0..SIZE).contains(&y) {
            Some((x + SIZE * y) as usize)
        } else {
            None
        }
    }

    /// Tile at (x, y). Out of bounds = wall.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Tile {
        match Self::index(x, y) {
            Some(i) => self.tiles[i],
            None => Tile::OfficeWall,
        }
    }

    #[inline]
    pub fn get_at(&self, tile: IVec2) -> Tile {
        self.get(tile.x, tile.y)
    }

    /// Set the tile at (x, y). Out of bounds writes are dropped.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) {
        if let Some(i) = Self::index(x, y) {
            self.tiles[i] = tile;
        }
    }

    #[inline]
    pub fn set_at(&mut self, cell: IVec2, tile: Tile) {
        self.set(cell.x, cell.y, tile);
    }

    #[inline]
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_solid()
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, tile: Tile) {
        for iy in y..y + height {
            for ix in x..x + width {
                self.set(ix, iy, tile);
            }
        }
    }

    pub fn clear(&mut self) {
        self.tiles.fill(Tile::Air);
    }

    /// Number of cells holding `tile`.
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }

    /// All cells holding `tile`, in row-major order.
    pub fn positions_of(&self, tile: Tile) -> Vec<IVec2> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, &t)| t == tile)
            .map(|(i, _)| IVec2::new(i as i32 % SIZE, i as i32 / SIZE))
            .collect()
    }

    /// Build a grid from ASCII rows (see `Tile::to_char`). Rows shorter than
    /// `SIZE` and missing rows are left as Air.
    pub fn from_rows(rows: &[&str]) -> Result<Self, super::tile::TileError> {
        let mut grid = TileGrid::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                grid.set(x as i32, y as i32, Tile::try_from(ch)?);
            }
        }
        Ok(grid)
    }

    /// ASCII dump, one line per row.
    pub fn to_rows(&self) -> Vec<String> {
        self.tiles
            .chunks(SIZE as usize)
            .map(|row| row.iter().map(|t| t.to_char()).collect())
            .collect()
    }
}

impl Default for TileGrid {
    fn default() -> Self {
        TileGrid::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_reads_are_walls() {
        let grid = TileGrid::new();
        assert_eq!(grid.get(-1, 0), Tile::OfficeWall);
        assert_eq!(grid.get(0, -1), Tile::OfficeWall);
        assert_eq!(grid.get(SIZE, 0), Tile::OfficeWall);
        assert_eq!(grid.get(0, SIZE), Tile::OfficeWall);
        assert!(grid.is_solid(-5, 40));
        assert_eq!(grid.get(0, 0), Tile::Air);
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut grid = TileGrid::new();
        grid.set(-1, 3, Tile::GoldBars);
        grid.set(SIZE, 3, Tile::GoldBars);
        grid.set(3, SIZE + 7, Tile::GoldBars);
        assert_eq!(grid.count(Tile::GoldBars), 0);
    }

    #[test]
    fn fill_rect_clips_to_grid() {
        let mut grid = TileGrid::new();
        grid.fill_rect(SIZE - 2, SIZE - 2, 5, 5, Tile::OfficeWall);
        assert_eq!(grid.count(Tile::OfficeWall), 4);
    }

    #[test]
    fn tile_position_floors() {
        assert_eq!(tile_position(Vec2::new(0.0, 0.0)), IVec2::new(0, 0));
        assert_eq!(tile_position(Vec2::new(7.99, 4.99)), IVec2::new(0, 0));
        assert_eq!(tile_position(Vec2::new(8.0, 5.0)), IVec2::new(1, 1));
        assert_eq!(tile_position(Vec2::new(-0.5, -0.1)), IVec2::new(-1, -1));
    }

    #[test]
    fn rooms_tile_the_grid() {
        assert_eq!(room_origin(0, 0), IVec2::new(0, 0));
        assert_eq!(room_origin(1, 1), IVec2::new(12, 12));
        assert_eq!(room_origin(2, 2).x + ROOM_SIZE, SIZE);
    }

    #[test]
    fn rows_round_trip() {
        let grid = TileGrid::from_rows(&["#.G", ".E|"]).unwrap();
        assert_eq!(grid.get(0, 0), Tile::OfficeWall);
        assert_eq!(grid.get(2, 0), Tile::GoldBars);
        assert_eq!(grid.get(1, 1), Tile::Exit);
        assert_eq!(grid.get(2, 1), Tile::DoorOpenVertical);
        let rows = grid.to_rows();
        assert!(rows[0].starts_with("#.G"));
        assert!(rows[1].starts_with(".E|"));
        assert_eq!(grid.positions_of(Tile::Exit), vec![IVec2::new(1, 1)]);
    }

    #[test]
    fn bad_fixture_char_fails() {
        assert!(TileGrid::from_rows(&["#x"]).is_err());
    }
}
