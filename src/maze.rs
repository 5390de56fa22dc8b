//! Procedural wall layout for one arena.
//!
//! The layout is carved on a tile grid (randomized Prim over odd cells, then
//! braided so most dead ends open into loops) and finally emitted as pixel
//! rectangles. The four corner spawn zones are always left open.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

use crate::constants::{BRAID_CHANCE, EXTRA_OPENINGS, SPAWN_ZONE_TILES};
use crate::geometry::{collides_with_any, Point, Rect};

const MIN_GRID_TILES: usize = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::TopLeft, Corner::TopRight, Corner::BottomLeft, Corner::BottomRight];
}

#[derive(Clone, Debug, PartialEq)]
pub struct Maze {
    pub walls: Vec<Rect>,
    pub width: f32,
    pub height: f32,
    pub tile_size: f32,
    cols: usize,
    rows: usize,
}

impl Maze {
    /// An arena with no walls at all. Mostly useful to tests and tools.
    pub fn open(width: f32, height: f32, tile_size: f32) -> Self {
        let (cols, rows) = grid_dims(width, height, tile_size);
        Self {
            walls: Vec::new(),
            width,
            height,
            tile_size,
            cols,
            rows,
        }
    }

    pub fn with_walls(width: f32, height: f32, tile_size: f32, walls: Vec<Rect>) -> Self {
        Self {
            walls,
            ..Self::open(width, height, tile_size)
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// The arena minus its one-tile border, where entities may be placed.
    pub fn inner_bounds(&self) -> Rect {
        let t = self.tile_size;
        Rect::new(t, t, (self.width - 2.0 * t).max(0.0), (self.height - 2.0 * t).max(0.0))
    }

    pub fn collides(&self, body: &Rect) -> bool {
        collides_with_any(&self.walls, body)
    }

    pub fn spawn_zone(&self, corner: Corner) -> Rect {
        let t = self.tile_size;
        let span = SPAWN_ZONE_TILES.min(self.cols.saturating_sub(2)).min(self.rows.saturating_sub(2));
        let far_col = self.cols.saturating_sub(1 + span);
        let far_row = self.rows.saturating_sub(1 + span);
        let (col, row) = match corner {
            Corner::TopLeft => (1, 1),
            Corner::TopRight => (far_col, 1),
            Corner::BottomLeft => (1, far_row),
            Corner::BottomRight => (far_col, far_row),
        };
        Rect::new(col as f32 * t, row as f32 * t, span as f32 * t, span as f32 * t)
    }

    /// Top-left position that centers a square body of side `size` in a zone.
    pub fn zone_position(&self, corner: Corner, size: f32) -> Point {
        let c = self.spawn_zone(corner).center();
        Point::new(c.x - size / 2.0, c.y - size / 2.0)
    }

    /// Position inside the top-left spawn zone, which generation never walls
    /// over. Bodies up to the zone size fit there.
    pub fn fallback_position(&self) -> Point {
        let zone = self.spawn_zone(Corner::TopLeft);
        Point::new(zone.x + 1.0, zone.y + 1.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Tile {
    Wall,
    Floor,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

struct Grid {
    cols: usize,
    rows: usize,
    tiles: Vec<Vec<Tile>>,
}

/// Generates a fresh random wall layout for an arena of `width × height`
/// pixels. Always terminates, always leaves open floor and the four spawn
/// zones clear.
pub fn generate(width: f32, height: f32, tile_size: f32, rng: &mut impl Rng) -> Maze {
    let (cols, rows) = grid_dims(width, height, tile_size);
    let mut grid = Grid {
        cols,
        rows,
        tiles: vec![vec![Tile::Wall; cols]; rows],
    };

    if cols >= MIN_GRID_TILES && rows >= MIN_GRID_TILES {
        grid.carve_prim(rng);
        grid.braid(rng);
        grid.open_spare_lines(rng);
    } else {
        grid.open_interior();
    }
    let mut maze = Maze::open(width, height, tile_size);
    grid.clear_spawn_zones(&maze);
    grid.ensure_connected();

    maze.walls = grid.to_rects(width, height, tile_size);
    tracing::debug!(walls = maze.walls.len(), cols, rows, "maze generated");
    maze
}

fn grid_dims(width: f32, height: f32, tile_size: f32) -> (usize, usize) {
    if tile_size <= 0.0 {
        return (0, 0);
    }
    ((width / tile_size).floor().max(0.0) as usize, (height / tile_size).floor().max(0.0) as usize)
}

impl Grid {
    fn cells(&self) -> (usize, usize) {
        ((self.cols - 1) / 2, (self.rows - 1) / 2)
    }

    fn carve_prim(&mut self, rng: &mut impl Rng) {
        let (cells_w, cells_h) = self.cells();
        let mut in_maze = vec![vec![false; cells_w]; cells_h];
        let mut frontier: Vec<(usize, usize)> = Vec::new();

        let start = (rng.gen_range(0..cells_w), rng.gen_range(0..cells_h));
        in_maze[start.1][start.0] = true;
        self.carve_cell(start.0, start.1);
        push_frontier(start, cells_w, cells_h, &in_maze, &mut frontier);

        while !frontier.is_empty() {
            let (cx, cy) = frontier.swap_remove(rng.gen_range(0..frontier.len()));
            if in_maze[cy][cx] {
                continue;
            }
            let joined: Vec<(usize, usize)> = neighbors(cx, cy, cells_w, cells_h)
                .filter(|&(nx, ny)| in_maze[ny][nx])
                .collect();
            let Some(&(nx, ny)) = joined.choose(rng) else {
                continue;
            };
            in_maze[cy][cx] = true;
            self.carve_between(cx, cy, nx, ny);
            self.carve_cell(cx, cy);
            push_frontier((cx, cy), cells_w, cells_h, &in_maze, &mut frontier);
        }
    }

    fn braid(&mut self, rng: &mut impl Rng) {
        let (cells_w, cells_h) = self.cells();
        for cy in 0..cells_h {
            for cx in 0..cells_w {
                let mut open = 0;
                let mut closed = Vec::new();
                for (nx, ny) in neighbors(cx, cy, cells_w, cells_h) {
                    if self.is_open_between(cx, cy, nx, ny) {
                        open += 1;
                    } else {
                        closed.push((nx, ny));
                    }
                }
                if closed.is_empty() {
                    continue;
                }
                let chance = if open == 1 { BRAID_CHANCE } else { EXTRA_OPENINGS };
                if rng.gen::<f32>() < chance {
                    if let Some(&(nx, ny)) = closed.choose(rng) {
                        self.carve_between(cx, cy, nx, ny);
                    }
                }
            }
        }
    }

    // An even tile count leaves one line beside the far border that no cell
    // covers. It opens next to every cell and, by chance, in between.
    fn open_spare_lines(&mut self, rng: &mut impl Rng) {
        if self.cols % 2 == 0 {
            let x = self.cols - 2;
            for y in 1..self.rows - 1 {
                if y % 2 == 1 || rng.gen::<f32>() < BRAID_CHANCE {
                    self.tiles[y][x] = Tile::Floor;
                }
            }
        }
        if self.rows % 2 == 0 {
            let y = self.rows - 2;
            for x in 1..self.cols - 1 {
                if x % 2 == 1 || rng.gen::<f32>() < BRAID_CHANCE {
                    self.tiles[y][x] = Tile::Floor;
                }
            }
        }
    }

    fn open_interior(&mut self) {
        for y in 1..self.rows.saturating_sub(1) {
            for x in 1..self.cols.saturating_sub(1) {
                self.tiles[y][x] = Tile::Floor;
            }
        }
    }

    fn clear_spawn_zones(&mut self, maze: &Maze) {
        let t = maze.tile_size;
        for corner in Corner::ALL {
            let zone = maze.spawn_zone(corner);
            let x0 = (zone.x / t).round() as usize;
            let y0 = (zone.y / t).round() as usize;
            let span = (zone.width / t).round() as usize;
            for y in y0..(y0 + span).min(self.rows.saturating_sub(1)) {
                for x in x0..(x0 + span).min(self.cols.saturating_sub(1)) {
                    self.tiles[y][x] = Tile::Floor;
                }
            }
        }
    }

    fn carve_cell(&mut self, cx: usize, cy: usize) {
        self.tiles[cy * 2 + 1][cx * 2 + 1] = Tile::Floor;
    }

    fn carve_between(&mut self, cx: usize, cy: usize, nx: usize, ny: usize) {
        let wall_x = (cx * 2 + 1 + nx * 2 + 1) / 2;
        let wall_y = (cy * 2 + 1 + ny * 2 + 1) / 2;
        self.tiles[wall_y][wall_x] = Tile::Floor;
        self.carve_cell(nx, ny);
    }

    fn is_open_between(&self, cx: usize, cy: usize, nx: usize, ny: usize) -> bool {
        let wall_x = (cx * 2 + 1 + nx * 2 + 1) / 2;
        let wall_y = (cy * 2 + 1 + ny * 2 + 1) / 2;
        self.tiles[wall_y][wall_x] != Tile::Wall
    }

    fn is_floor(&self, x: usize, y: usize) -> bool {
        x > 0 && y > 0 && x + 1 < self.cols && y + 1 < self.rows && self.tiles[y][x] == Tile::Floor
    }

    fn step(&self, x: usize, y: usize, dir: Dir) -> Option<(usize, usize)> {
        let (dx, dy) = dir.delta();
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        (nx < self.cols && ny < self.rows).then_some((nx, ny))
    }

    fn find_start(&self) -> Option<(usize, usize)> {
        (1..self.rows.saturating_sub(1))
            .flat_map(|y| (1..self.cols.saturating_sub(1)).map(move |x| (x, y)))
            .find(|&(x, y)| self.is_floor(x, y))
    }

    fn flood(&self, start: (usize, usize)) -> Vec<Vec<bool>> {
        let mut seen = vec![vec![false; self.cols]; self.rows];
        let mut q = VecDeque::new();
        seen[start.1][start.0] = true;
        q.push_back(start);
        while let Some((x, y)) = q.pop_front() {
            for dir in Dir::ALL {
                let Some((nx, ny)) = self.step(x, y, dir) else {
                    continue;
                };
                if seen[ny][nx] || !self.is_floor(nx, ny) {
                    continue;
                }
                seen[ny][nx] = true;
                q.push_back((nx, ny));
            }
        }
        seen
    }

    fn has_unreachable(&self, reachable: &[Vec<bool>]) -> bool {
        (1..self.rows.saturating_sub(1))
            .any(|y| (1..self.cols.saturating_sub(1)).any(|x| self.is_floor(x, y) && !reachable[y][x]))
    }

    // Opens the first interior wall that separates reachable from unreachable
    // floor, until every floor tile is connected. Each pass opens one wall, so
    // the loop is bounded by the tile count.
    fn ensure_connected(&mut self) {
        let Some(start) = self.find_start() else {
            return;
        };
        let mut reachable = self.flood(start);
        let mut iterations = 0;
        while self.has_unreachable(&reachable) && iterations < self.cols * self.rows {
            let Some((x, y)) = self.find_bridge(&reachable) else {
                break;
            };
            self.tiles[y][x] = Tile::Floor;
            reachable = self.flood(start);
            iterations += 1;
        }
    }

    fn find_bridge(&self, reachable: &[Vec<bool>]) -> Option<(usize, usize)> {
        for y in 1..self.rows.saturating_sub(1) {
            for x in 1..self.cols.saturating_sub(1) {
                if self.tiles[y][x] != Tile::Wall {
                    continue;
                }
                let mut has_reach = false;
                let mut has_unreach = false;
                for dir in Dir::ALL {
                    let Some((nx, ny)) = self.step(x, y, dir) else {
                        continue;
                    };
                    if !self.is_floor(nx, ny) {
                        continue;
                    }
                    if reachable[ny][nx] {
                        has_reach = true;
                    } else {
                        has_unreach = true;
                    }
                }
                if has_reach && has_unreach {
                    return Some((x, y));
                }
            }
        }
        None
    }

    // Border walls span the whole arena, so pixels beyond the last full tile
    // are walled too. Interior walls are merged into horizontal runs.
    fn to_rects(&self, width: f32, height: f32, t: f32) -> Vec<Rect> {
        let mut rects = vec![
            Rect::new(0.0, 0.0, width, t),
            Rect::new(0.0, 0.0, t, height),
        ];
        if self.cols >= 1 {
            let right = (self.cols - 1) as f32 * t;
            rects.push(Rect::new(right, 0.0, width - right, height));
        }
        if self.rows >= 1 {
            let bottom = (self.rows - 1) as f32 * t;
            rects.push(Rect::new(0.0, bottom, width, height - bottom));
        }

        for y in 1..self.rows.saturating_sub(1) {
            let mut x = 1;
            while x + 1 < self.cols {
                if self.tiles[y][x] != Tile::Wall {
                    x += 1;
                    continue;
                }
                let run_start = x;
                while x + 1 < self.cols && self.tiles[y][x] == Tile::Wall {
                    x += 1;
                }
                let run = (x - run_start) as f32;
                rects.push(Rect::new(run_start as f32 * t, y as f32 * t, run * t, t));
            }
        }
        rects
    }
}

fn neighbors(cx: usize, cy: usize, cells_w: usize, cells_h: usize) -> impl Iterator<Item = (usize, usize)> {
    Dir::ALL.into_iter().filter_map(move |dir| {
        let (dx, dy) = dir.delta();
        let nx = cx.checked_add_signed(dx)?;
        let ny = cy.checked_add_signed(dy)?;
        (nx < cells_w && ny < cells_h).then_some((nx, ny))
    })
}

fn push_frontier(
    cell: (usize, usize),
    cells_w: usize,
    cells_h: usize,
    in_maze: &[Vec<bool>],
    frontier: &mut Vec<(usize, usize)>,
) {
    for (nx, ny) in neighbors(cell.0, cell.1, cells_w, cells_h) {
        if !in_maze[ny][nx] {
            frontier.push((nx, ny));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tiles_open_fraction(maze: &Maze) -> f32 {
        let t = maze.tile_size;
        let inner = maze.inner_bounds();
        let cols = (inner.width / t) as usize;
        let rows = (inner.height / t) as usize;
        let mut open = 0;
        for row in 0..rows {
            for col in 0..cols {
                let probe = Rect::new(inner.x + col as f32 * t + 1.0, inner.y + row as f32 * t + 1.0, t - 2.0, t - 2.0);
                if !maze.collides(&probe) {
                    open += 1;
                }
            }
        }
        open as f32 / (rows * cols) as f32
    }

    #[test]
    fn spawn_zones_are_never_walled() {
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let maze = generate(800.0, 600.0, 40.0, &mut rng);
            for corner in Corner::ALL {
                let zone = maze.spawn_zone(corner);
                assert!(!maze.collides(&zone), "seed {seed}: {corner:?} zone walled");
            }
        }
    }

    #[test]
    fn arena_is_mostly_open_and_bordered() {
        let mut rng = StdRng::seed_from_u64(7);
        let maze = generate(800.0, 600.0, 40.0, &mut rng);
        assert!(!maze.walls.is_empty());
        assert!(tiles_open_fraction(&maze) > 0.5);
        assert!(maze.collides(&Rect::new(0.0, 0.0, 5.0, 5.0)));
        assert!(maze.collides(&Rect::new(795.0, 595.0, 5.0, 5.0)));
    }

    #[test]
    fn uneven_arena_edges_are_walled() {
        let mut rng = StdRng::seed_from_u64(11);
        let maze = generate(810.0, 615.0, 40.0, &mut rng);
        assert!(maze.collides(&Rect::new(805.0, 300.0, 4.0, 4.0)));
        assert!(maze.collides(&Rect::new(400.0, 610.0, 4.0, 4.0)));
    }

    #[test]
    fn tiny_arena_still_has_floor() {
        let mut rng = StdRng::seed_from_u64(5);
        let maze = generate(200.0, 160.0, 40.0, &mut rng);
        let fallback = maze.fallback_position();
        assert!(!maze.collides(&Rect::square(fallback, 20.0)));
    }

    #[test]
    fn fallback_position_is_open_for_entity_sized_bodies() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let maze = generate(800.0, 600.0, 40.0, &mut rng);
            assert!(!maze.collides(&Rect::square(maze.fallback_position(), 28.0)));
        }
    }

    #[test]
    fn floor_is_connected_after_generation() {
        let mut rng = StdRng::seed_from_u64(99);
        let (cols, rows) = grid_dims(800.0, 600.0, 40.0);
        let mut grid = Grid {
            cols,
            rows,
            tiles: vec![vec![Tile::Wall; cols]; rows],
        };
        grid.carve_prim(&mut rng);
        grid.braid(&mut rng);
        grid.open_spare_lines(&mut rng);
        grid.clear_spawn_zones(&Maze::open(800.0, 600.0, 40.0));
        grid.ensure_connected();
        let start = grid.find_start().expect("floor exists");
        let reachable = grid.flood(start);
        assert!(!grid.has_unreachable(&reachable));
    }

    #[test]
    fn spare_line_on_even_grids_is_opened() {
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let maze = generate(800.0, 640.0, 40.0, &mut rng);
            // Column 18 of 20 and row 14 of 16 lie outside the cell lattice.
            for y in (1..15).step_by(2) {
                let probe = Rect::new(18.0 * 40.0 + 1.0, y as f32 * 40.0 + 1.0, 38.0, 38.0);
                assert!(!maze.collides(&probe), "seed {seed}: tile (18, {y}) walled");
            }
            for x in (1..19).step_by(2) {
                let probe = Rect::new(x as f32 * 40.0 + 1.0, 14.0 * 40.0 + 1.0, 38.0, 38.0);
                assert!(!maze.collides(&probe), "seed {seed}: tile ({x}, 14) walled");
            }
        }
    }
}
