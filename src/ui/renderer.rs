/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. `emit_frame` feeds `DrawRequest`s into the renderer (it is a `DrawSink`)
///   2. Requests are sorted by depth and rasterised into the `front` buffer
///   3. Compare each cell with `back` buffer (previous frame)
///   4. Only emit terminal commands for cells that changed
///   5. All commands are batched with `queue!`, flushed once at the end
///   6. Swap front/back
///
/// ## Pixel -> terminal mapping
///
/// One tile (8 x 5 px) is 2 columns x 1 row, so a column is 4 px and a row
/// is 5 px. The map is drawn with a one-tile border for the out-of-bounds
/// wall ring.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use glam::Vec2;

use officeheist::domain::grid::{TILE_HEIGHT, TILE_WIDTH};
use officeheist::domain::rules::LOOT_REQUIRED_TO_EXIT;
use officeheist::domain::tile::SpriteId;
use officeheist::sim::draw::{emit_frame, DrawRequest, DrawSink};
use officeheist::sim::world::{Phase, World};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// inter-row gap colour matches on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut Cell> {
        if x < self.width && y < self.height {
            self.cells.get_mut(y * self.width + x)
        } else {
            None
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if let Some(cell) = self.get_mut(x + i, y) {
                *cell = Cell { ch, fg, bg };
            }
        }
    }

    /// Write glyphs over existing cells, keeping their background.
    fn put_glyphs(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if let Some(cell) = self.get_mut(x + i, y) {
                cell.ch = ch;
                cell.fg = fg;
            }
        }
    }

    fn tint(&mut self, x: usize, y: usize, width: usize, bg: Color, fg: Option<Color>) {
        for i in 0..width {
            if let Some(cell) = self.get_mut(x + i, y) {
                cell.bg = bg;
                if let Some(fg) = fg {
                    cell.fg = fg;
                }
            }
        }
    }
}

// ── Sprites ──

/// How a sprite lands on the terminal.
#[derive(Clone, Copy, PartialEq, Debug)]
enum Glyph {
    /// Opaque text with its own background.
    Solid(&'static str, Color, Color),
    /// Text over whatever background is already there.
    Text(&'static str, Color),
    /// Recolour a tile's worth of cells without touching their text.
    Tint { bg: Color, fg: Option<Color> },
}

const WALL: Color = Color::Rgb { r: 120, g: 120, b: 140 };
const DOOR_OPEN: Color = Color::Rgb { r: 90, g: 200, b: 220 };
const DOOR_CLOSED: Color = Color::Rgb { r: 160, g: 90, b: 40 };
const GOLD: Color = Color::Rgb { r: 255, g: 210, b: 50 };
const SILVER: Color = Color::Rgb { r: 200, g: 200, b: 210 };
const DANGER: Color = Color::Rgb { r: 90, g: 20, b: 30 };
const DARK: Color = Color::Rgb { r: 8, g: 8, b: 12 };
const ALERT: Color = Color::Rgb { r: 255, g: 60, b: 60 };
const GO: Color = Color::Rgb { r: 80, g: 255, b: 80 };

fn glyph(sprite: SpriteId) -> Glyph {
    match sprite {
        SpriteId::OfficeWall => Glyph::Solid("██", WALL, Cell::BASE_BG),
        SpriteId::DoorOpenHorizontal => Glyph::Text("╌╌", DOOR_OPEN),
        SpriteId::DoorOpenVertical => Glyph::Text("┆┆", DOOR_OPEN),
        SpriteId::DoorClosedHorizontal | SpriteId::DoorClosedVertical => {
            Glyph::Solid("▓▓", DOOR_CLOSED, Cell::BASE_BG)
        }
        SpriteId::Exit => Glyph::Solid("[]", GO, Cell::BASE_BG),
        SpriteId::ExitSign => Glyph::Text("EXIT", ALERT),
        SpriteId::ExitSignOpen => Glyph::Text("EXIT", GO),
        SpriteId::GoldBars => Glyph::Text("≡≡", GOLD),
        SpriteId::SilverCoin => Glyph::Text("o ", SILVER),
        SpriteId::Robber => Glyph::Text("@", Color::White),
        SpriteId::Guard => Glyph::Text("&", ALERT),
        SpriteId::DangerMarker => Glyph::Tint { bg: DANGER, fg: None },
        SpriteId::QuestionMark => Glyph::Text("?", GOLD),
        SpriteId::ExclamationPoint => Glyph::Text("!", ALERT),
        SpriteId::Darkness => Glyph::Tint { bg: DARK, fg: Some(DARK) },
    }
}

/// Sort key for a request: sink default sits between vision and overlays.
fn layer(request: &DrawRequest) -> f32 {
    request.depth.unwrap_or(0.5)
}

// ── Renderer ──

/// Columns per tile.
const CELL_W: usize = 2;
const PX_PER_COL: f32 = TILE_WIDTH as f32 / CELL_W as f32;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const MAP_COL: usize = 1;

/// Terminal cell for a pixel position, accounting for the border ring.
fn to_screen(position: Vec2) -> Option<(usize, usize)> {
    let col = ((position.x + TILE_WIDTH as f32) / PX_PER_COL).floor();
    let row = ((position.y + TILE_HEIGHT as f32) / TILE_HEIGHT as f32).floor();
    if col < 0.0 || row < 0.0 {
        return None;
    }
    Some((MAP_COL + col as usize, MAP_ROW + row as usize))
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    /// Terminal reports key Release events.
    keyboard_enhanced: bool,
    /// Requests gathered from `emit_frame` for the frame being built.
    requests: Vec<DrawRequest>,
}

impl DrawSink for Renderer {
    fn draw(&mut self, request: DrawRequest) {
        self.requests.push(request);
    }
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            keyboard_enhanced: false,
            requests: Vec::with_capacity(2048),
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        // Release events make held keys exact; without them input falls back
        // to the hold timeout.
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.keyboard_enhanced = true;
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn reports_key_release(&self) -> bool {
        self.keyboard_enhanced
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.keyboard_enhanced {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Draw one frame of `world` with `status` on the HUD row.
    pub fn render(&mut self, world: &World, status: &str) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Detect phase change → clear for clean transition
        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        self.front.clear();

        self.requests.clear();
        emit_frame(world, self);
        self.compose_requests();
        self.compose_hud(world, status);
        if world.phase == Phase::Ended {
            self.compose_end_screen(world);
        }

        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Compose: build front buffer content ──

    fn compose_requests(&mut self) {
        // Stable: equal layers keep emission order.
        self.requests.sort_by(|a, b| layer(a).total_cmp(&layer(b)));

        for request in &self.requests {
            let Some((x, y)) = to_screen(request.position) else { continue };
            match glyph(request.sprite) {
                Glyph::Solid(text, fg, bg) => self.front.put_str(x, y, text, fg, bg),
                Glyph::Text(text, fg) => self.front.put_glyphs(x, y, text, fg),
                Glyph::Tint { bg, fg } => self.front.tint(x, y, CELL_W, bg, fg),
            }
        }
    }

    fn compose_hud(&mut self, world: &World, status: &str) {
        let player = &world.player;
        let loot_color = if player.can_exit() { GO } else { Color::White };
        let money = format!("${}", player.money);
        let loot = format!("loot {}/{}", player.loot_this_level, LOOT_REQUIRED_TO_EXIT);
        let levels = format!("floor {}", world.levels_cleared + 1);

        self.front.put_str(1, HUD_ROW, &money, GOLD, Cell::BASE_BG);
        self.front.put_str(10, HUD_ROW, &loot, loot_color, Cell::BASE_BG);
        self.front.put_str(22, HUD_ROW, &levels, SILVER, Cell::BASE_BG);
        self.front.put_str(32, HUD_ROW, status, Color::DarkGrey, Cell::BASE_BG);
    }

    fn compose_end_screen(&mut self, world: &World) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let (title, color) = if world.player.was_spotted {
            ("║        SPOTTED!        ║", ALERT)
        } else {
            ("║      YOU GAVE UP       ║", GOLD)
        };
        let box_art = ["╔════════════════════════╗", title, "╚════════════════════════╝"];

        let box_x = MAP_COL + 20;
        let box_y = MAP_ROW + 10;
        for y in box_y..box_y + 8 {
            self.front.put_str(box_x - 2, y, &" ".repeat(30), Color::Reset, dim);
        }
        for (i, line) in box_art.iter().enumerate() {
            self.front.put_str(box_x, box_y + i, line, color, dim);
        }
        let haul = format!("Haul: ${}", world.player.money);
        self.front.put_str(box_x + 2, box_y + 4, &haul, GOLD, dim);
        self.front.put_str(box_x + 2, box_y + 6, "SPACE: New run  ESC: Quit", GO, dim);
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colours; ResetColor would fall back to the terminal's
        // own default and leave line artifacts.
        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_ring_maps_to_map_origin() {
        assert_eq!(to_screen(Vec2::new(-8.0, -5.0)), Some((MAP_COL, MAP_ROW)));
        assert_eq!(to_screen(Vec2::ZERO), Some((MAP_COL + 2, MAP_ROW + 1)));
        assert_eq!(to_screen(Vec2::new(-20.0, 0.0)), None);
    }

    #[test]
    fn half_tile_is_one_column() {
        let (a, _) = to_screen(Vec2::new(0.0, 0.0)).unwrap();
        let (b, _) = to_screen(Vec2::new(4.0, 0.0)).unwrap();
        let (c, _) = to_screen(Vec2::new(8.0, 0.0)).unwrap();
        assert_eq!(b, a + 1);
        assert_eq!(c, a + CELL_W);
    }

    #[test]
    fn overlays_sort_above_tiles_and_markers_below() {
        let mut requests = vec![
            DrawRequest::at_depth(Vec2::ZERO, SpriteId::QuestionMark, 1.0),
            DrawRequest::new(Vec2::ZERO, SpriteId::OfficeWall),
            DrawRequest::at_depth(Vec2::ZERO, SpriteId::DangerMarker, 0.0),
        ];
        requests.sort_by(|a, b| layer(a).total_cmp(&layer(b)));
        let order: Vec<_> = requests.iter().map(|r| r.sprite).collect();
        assert_eq!(order, vec![SpriteId::DangerMarker, SpriteId::OfficeWall, SpriteId::QuestionMark]);
    }

    #[test]
    fn tint_keeps_text() {
        let mut buf = FrameBuffer::new(4, 1);
        buf.put_glyphs(0, 0, "ab", GOLD);
        buf.tint(0, 0, 2, DANGER, None);
        assert_eq!(buf.get(0, 0), Cell { ch: 'a', fg: GOLD, bg: DANGER });
        assert_eq!(buf.get(2, 0), Cell::BLANK);
    }
}
