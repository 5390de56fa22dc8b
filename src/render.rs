use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

use ljus_morker::geometry::{Point, Rect};
use ljus_morker::{AiMode, GameSession};

/// Arena pixels covered by one terminal cell (two columns wide).
const CELL_PX: f32 = 20.0;
const CELL_W: usize = 2;
const FOOTER_LINES: usize = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Glyph {
    Empty,
    Wall,
    DimWall,
    Player,
    PlayerDark,
    Enemy,
    Stunned,
    Crystal,
    CrystalGlow,
    Projectile,
    Beam,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

impl Cell {
    const EMPTY: Cell = Cell {
        glyph: Glyph::Empty,
        color: Color::Reset,
    };

    fn new(glyph: Glyph, color: Color) -> Self {
        Self { glyph, color }
    }
}

/// Draws the session into the terminal, rewriting only cells that changed
/// since the previous frame.
pub struct Renderer {
    cols: usize,
    rows: usize,
    last: Vec<Cell>,
    last_hud: String,
    last_footer: Vec<String>,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(arena_width: f32, arena_height: f32) -> Self {
        let cols = (arena_width / CELL_PX).ceil().max(1.0) as usize;
        let rows = (arena_height / CELL_PX).ceil().max(1.0) as usize;
        Self {
            cols,
            rows,
            last: vec![Cell::EMPTY; cols * rows],
            last_hud: String::new(),
            last_footer: Vec::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    pub fn invalidate(&mut self) {
        self.needs_full = true;
    }

    pub fn draw(&mut self, out: &mut impl Write, session: &GameSession, footer: &[String]) -> io::Result<()> {
        let needed_h = (self.rows + 1 + FOOTER_LINES) as u16;
        let needed_w = (self.cols * CELL_W) as u16;

        out.queue(MoveTo(0, 0))?;
        let (term_w, term_h) = terminal::size()?;
        if term_w < needed_w || term_h < needed_h {
            out.queue(Clear(ClearType::All))?;
            out.queue(Print(format!(
                "Terminalen är för liten. Behöver {needed_w}x{needed_h}, har {term_w}x{term_h}."
            )))?;
            out.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.needs_full {
            out.queue(Clear(ClearType::All))?;
        }

        let hud = hud_line(session);
        if self.needs_full || hud != self.last_hud {
            out.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            out.queue(SetForegroundColor(Color::White))?;
            out.queue(Clear(ClearType::CurrentLine))?;
            out.queue(Print(&hud))?;
            out.queue(ResetColor)?;
            self.last_hud = hud;
        }

        let frame = compose(session, self.cols, self.rows);
        for (idx, cell) in frame.into_iter().enumerate() {
            if self.needs_full || cell != self.last[idx] {
                self.last[idx] = cell;
                self.draw_cell(out, idx % self.cols, idx / self.cols, cell)?;
            }
        }

        if self.needs_full || footer != self.last_footer.as_slice() {
            let footer_y = self.origin_y + self.rows as u16;
            for line in 0..FOOTER_LINES {
                out.queue(MoveTo(self.origin_x, footer_y + line as u16))?;
                out.queue(Clear(ClearType::CurrentLine))?;
                if let Some(text) = footer.get(line) {
                    out.queue(Print(text))?;
                }
            }
            self.last_footer = footer.to_vec();
        }
        self.needs_full = false;

        out.flush()
    }

    fn draw_cell(&self, out: &mut impl Write, x: usize, y: usize, cell: Cell) -> io::Result<()> {
        let text = match cell.glyph {
            Glyph::Empty => "  ",
            Glyph::Wall => "██",
            Glyph::DimWall => "░░",
            Glyph::Player => "😃",
            Glyph::PlayerDark => "😶",
            Glyph::Enemy => "👾",
            Glyph::Stunned => "😵",
            Glyph::Crystal => "💎",
            Glyph::CrystalGlow => "◆ ",
            Glyph::Projectile => "● ",
            Glyph::Beam => "··",
        };
        out.queue(MoveTo(self.origin_x + (x * CELL_W) as u16, self.origin_y + y as u16))?;
        out.queue(SetForegroundColor(cell.color))?;
        out.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        for _ in w..CELL_W {
            out.queue(Print(' '))?;
        }
        out.queue(ResetColor)?;
        Ok(())
    }
}

fn hud_line(session: &GameSession) -> String {
    let player = session.player();
    let config = session.config();
    format!(
        "Poäng: {}  Nivå: {}  Kristaller: {}/{}  Stamina: {}  Ljus: {:>3.0}%{}{}",
        player.score,
        session.level(),
        player.crystals_collected,
        session.required_crystals(),
        bar(player.stamina, config.max_stamina, 10),
        player.light.intensity,
        if player.light.on { "" } else { " (av)" },
        if player.tired { "  TRÖTT" } else { "" },
    )
}

fn bar(value: f32, max: f32, width: usize) -> String {
    let filled = if max > 0.0 {
        ((value / max).clamp(0.0, 1.0) * width as f32).round() as usize
    } else {
        0
    };
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Builds the whole frame, row-major. Everything beyond the player's light
/// is dark except walls, drawn dimmed, and crystals that are not light-gated.
fn compose(session: &GameSession, cols: usize, rows: usize) -> Vec<Cell> {
    let maze = session.maze();
    let player = session.player();
    let light_center = player.center();
    let light_radius = session.light_radius();
    let config = session.config();

    let mut frame = vec![Cell::EMPTY; cols * rows];
    for gy in 0..rows {
        for gx in 0..cols {
            let probe = Rect::new(gx as f32 * CELL_PX + 1.0, gy as f32 * CELL_PX + 1.0, CELL_PX - 2.0, CELL_PX - 2.0);
            let lit = probe.center().distance(light_center) <= light_radius;
            let idx = gy * cols + gx;
            if maze.collides(&probe) {
                frame[idx] = if lit {
                    Cell::new(Glyph::Wall, Color::DarkBlue)
                } else {
                    Cell::new(Glyph::DimWall, Color::DarkGrey)
                };
            } else if player.flashlight.active && player.in_flashlight_cone(probe.center(), config) {
                frame[idx] = Cell::new(Glyph::Beam, Color::Yellow);
            }
        }
    }

    let mut put = |p: Point, cell: Cell| {
        if p.x < 0.0 || p.y < 0.0 {
            return;
        }
        let gx = (p.x / CELL_PX) as usize;
        let gy = (p.y / CELL_PX) as usize;
        if gx < cols && gy < rows {
            frame[gy * cols + gx] = cell;
        }
    };
    let lit = |p: Point| p.distance(light_center) <= light_radius;

    for crystal in session.crystals().iter().filter(|c| c.visible && !c.collected) {
        let glyph = if crystal.glow > 0.5 { Glyph::Crystal } else { Glyph::CrystalGlow };
        put(crystal.center, Cell::new(glyph, Color::Cyan));
    }
    for shot in session.projectiles().iter().filter(|s| lit(s.center)) {
        put(shot.center, Cell::new(Glyph::Projectile, Color::DarkMagenta));
    }
    for enemy in session.enemies().iter().filter(|e| lit(e.center())) {
        let cell = if enemy.mode == AiMode::Stunned {
            Cell::new(Glyph::Stunned, Color::Blue)
        } else {
            Cell::new(Glyph::Enemy, Color::Red)
        };
        put(enemy.center(), cell);
    }
    let glyph = if player.light.on { Glyph::Player } else { Glyph::PlayerDark };
    put(light_center, Cell::new(glyph, Color::Yellow));

    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use ljus_morker::GameConfig;

    #[test]
    fn frame_covers_arena_and_shows_player() {
        let mut session = GameSession::from_seed(GameConfig::default(), Some(12));
        session.show_title();
        session.start_game(None);
        let renderer = Renderer::new(800.0, 600.0);
        assert_eq!((renderer.cols, renderer.rows), (40, 30));

        let frame = compose(&session, renderer.cols, renderer.rows);
        assert_eq!(frame.len(), 40 * 30);
        let c = session.player().center();
        let idx = (c.y / CELL_PX) as usize * 40 + (c.x / CELL_PX) as usize;
        assert_eq!(frame[idx].glyph, Glyph::Player);
        // Top-left corner is border wall.
        assert!(matches!(frame[0].glyph, Glyph::Wall | Glyph::DimWall));
    }

    #[test]
    fn stamina_bar_is_clamped() {
        assert_eq!(bar(50.0, 100.0, 10), "[#####-----]");
        assert_eq!(bar(500.0, 100.0, 4), "[####]");
        assert_eq!(bar(-1.0, 100.0, 4), "[----]");
    }
}
