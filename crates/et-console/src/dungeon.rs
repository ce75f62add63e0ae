use std::any::Any;

use et_runtime::{FrameContext, RuntimeResult, System};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{ConsoleError, ConsoleResult};
use crate::grid::{Dimension, Grid, GridSystem, Point};
use crate::input::{InputSystem, Key};

/// Rooms are placed at least this far from the right and bottom edges.
const ROOM_MARGIN: i32 = 10;
/// Smallest cave that still has an interior.
const MIN_CAVE_SIZE: i32 = 3;
/// Tries before an unoccupied-tile query gives up.
const UNOCCUPIED_ATTEMPTS: usize = 50;

/// An axis-aligned rectangle of floor carved into a dungeon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Room {
    /// Left column.
    pub x: i32,
    /// Top row.
    pub y: i32,
    /// Columns.
    pub width: i32,
    /// Rows.
    pub height: i32,
}

impl Room {
    /// A room with its top-left corner at `(x, y)`.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The centre cell, rounding towards the top-left.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Whether `(x, y)` lies inside the room.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Generation parameters for [`DungeonSystem`].
#[derive(Debug, Clone, PartialEq)]
pub struct DungeonConfig {
    /// Rooms laid out per dungeon.
    pub room_count: usize,
    /// Smallest room side.
    pub min_room_size: i32,
    /// Largest room side.
    pub max_room_size: i32,
    /// Percent chance for each interior wall to become floor.
    pub scatter_percent: i32,
    /// Percent of the cave interior seeded as wall.
    pub cave_fill_percent: i32,
    /// Smoothing passes used by the `C` key.
    pub cave_smooth_steps: usize,
    /// Floor character.
    pub floor: char,
    /// Wall character.
    pub wall: char,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            room_count: 6,
            min_room_size: 4,
            max_room_size: 8,
            scatter_percent: 4,
            cave_fill_percent: 45,
            cave_smooth_steps: 4,
            floor: '.',
            wall: '#',
        }
    }
}

impl DungeonConfig {
    /// Set the number of rooms.
    pub fn with_room_count(mut self, count: usize) -> Self {
        self.room_count = count;
        self
    }

    /// Set the room side range. The bounds are swapped if given backwards.
    pub fn with_room_size(mut self, min: i32, max: i32) -> Self {
        self.min_room_size = min.min(max).max(1);
        self.max_room_size = min.max(max).max(1);
        self
    }

    /// Set the wall-to-floor scatter chance, clamped to 0..=100.
    pub fn with_scatter_percent(mut self, percent: i32) -> Self {
        self.scatter_percent = percent.clamp(0, 100);
        self
    }

    /// Set the cave wall fill, clamped to 0..=100.
    pub fn with_cave_fill_percent(mut self, percent: i32) -> Self {
        self.cave_fill_percent = percent.clamp(0, 100);
        self
    }

    /// Set the smoothing passes used by the `C` key.
    pub fn with_cave_smooth_steps(mut self, steps: usize) -> Self {
        self.cave_smooth_steps = steps;
        self
    }

    /// Set the floor and wall characters.
    pub fn with_tiles(mut self, floor: char, wall: char) -> Self {
        self.floor = floor;
        self.wall = wall;
        self
    }

    /// Check that every value is usable. The fields are public, so a
    /// config built without the `with_*` methods is checked here before
    /// any generation.
    pub fn validate(&self) -> ConsoleResult<()> {
        let largest = ROOM_MARGIN - 2;
        if self.min_room_size < 1 || self.min_room_size > self.max_room_size {
            return Err(ConsoleError::InvalidConfig(format!(
                "room sizes must satisfy 1 <= min <= max, got {}..={}",
                self.min_room_size, self.max_room_size
            )));
        }
        if self.max_room_size > largest {
            return Err(ConsoleError::InvalidConfig(format!(
                "rooms larger than {largest} would cut into the border, got {}",
                self.max_room_size
            )));
        }
        for (name, percent) in [
            ("scatter_percent", self.scatter_percent),
            ("cave_fill_percent", self.cave_fill_percent),
        ] {
            if !(0..=100).contains(&percent) {
                return Err(ConsoleError::InvalidConfig(format!(
                    "{name} must be within 0..=100, got {percent}"
                )));
            }
        }
        Ok(())
    }
}

/// Procedural room-and-corridor dungeons and cellular caves.
///
/// Keeps the most recently generated map and its rooms. Generation is
/// driven by a seeded RNG, so the same seed and call sequence always yields
/// the same maps. Pressing `M` generates a 40x20 dungeon and shows it as
/// `GeneratedDungeon`; pressing `C` does the same for a cave named
/// `GeneratedCave`.
#[derive(Debug)]
pub struct DungeonSystem {
    config: DungeonConfig,
    rng: StdRng,
    grid: Grid,
    rooms: Vec<Room>,
}

impl DungeonSystem {
    /// A generator with default parameters.
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, DungeonConfig::default())
    }

    /// A generator with custom parameters.
    pub fn with_config(seed: u64, config: DungeonConfig) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            grid: Grid::default(),
            rooms: Vec::new(),
        }
    }

    /// The generation parameters.
    pub fn config(&self) -> &DungeonConfig {
        &self.config
    }

    /// The last generated map.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Rooms of the last generated dungeon. Empty after a cave.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    // -----------------------------------------------------------------------
    // Generation
    // -----------------------------------------------------------------------

    /// Lay out rooms joined by L-shaped corridors on a field of `wall`.
    ///
    /// Rooms may overlap. A few interior walls are then opened up at random
    /// so corridors look less regular. The outer border is never touched.
    pub fn generate_room_and_corridor(
        &mut self,
        width: i32,
        height: i32,
        floor: char,
        wall: char,
    ) -> ConsoleResult<&Grid> {
        self.config.validate()?;
        let min = ROOM_MARGIN + 1;
        if width < min || height < min {
            return Err(ConsoleError::TooSmall {
                width,
                height,
                min_width: min,
                min_height: min,
            });
        }

        let mut grid = Grid::new(width, height, wall);
        let mut rooms = Vec::with_capacity(self.config.room_count);
        let sizes = self.config.min_room_size..=self.config.max_room_size;

        for _ in 0..self.config.room_count {
            let w = self.rng.random_range(sizes.clone());
            let h = self.rng.random_range(sizes.clone());
            let x = self.rng.random_range(1..=width - ROOM_MARGIN);
            let y = self.rng.random_range(1..=height - ROOM_MARGIN);
            let room = Room::new(x, y, w, h);
            carve_room(&mut grid, room, floor);
            rooms.push(room);
        }

        for pair in rooms.windows(2) {
            carve_corridor(&mut grid, pair[0].center(), pair[1].center(), floor);
        }

        for y in 1..height - 1 {
            for x in 1..width - 1 {
                if grid.cell(x, y) == wall
                    && self.rng.random_range(0..100) < self.config.scatter_percent
                {
                    grid.set_cell(x, y, floor);
                }
            }
        }

        self.grid = grid;
        self.rooms = rooms;
        Ok(&self.grid)
    }

    /// Grow a cave: random wall fill inside a solid border, then
    /// `smooth_steps` passes of cellular smoothing.
    ///
    /// A cell with more than four wall neighbours becomes wall, fewer than
    /// four becomes floor, exactly four stays as it is.
    pub fn generate_cave(
        &mut self,
        width: i32,
        height: i32,
        smooth_steps: usize,
    ) -> ConsoleResult<&Grid> {
        self.config.validate()?;
        if width < MIN_CAVE_SIZE || height < MIN_CAVE_SIZE {
            return Err(ConsoleError::TooSmall {
                width,
                height,
                min_width: MIN_CAVE_SIZE,
                min_height: MIN_CAVE_SIZE,
            });
        }
        let (floor, wall) = (self.config.floor, self.config.wall);

        let mut grid = Grid::new(width, height, wall);
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let cell = if self.rng.random_range(0..100) < self.config.cave_fill_percent {
                    wall
                } else {
                    floor
                };
                grid.set_cell(x, y, cell);
            }
        }

        for _ in 0..smooth_steps {
            let mut next = grid.clone();
            for y in 1..height - 1 {
                for x in 1..width - 1 {
                    let walls = count_wall_neighbours(&grid, x, y, wall);
                    if walls > 4 {
                        next.set_cell(x, y, wall);
                    } else if walls < 4 {
                        next.set_cell(x, y, floor);
                    }
                }
            }
            grid = next;
        }

        self.grid = grid;
        self.rooms.clear();
        Ok(&self.grid)
    }

    /// Store the last generated map in `grids` under `name` and show it.
    pub fn send_to_grid(&self, grids: &mut GridSystem, name: &str) {
        grids.add_map(name, self.grid.clone());
        grids.load_map(name);
        info!(
            "Sent {}x{} map to grid as {name}",
            self.grid.width(),
            self.grid.height()
        );
    }

    // -----------------------------------------------------------------------
    // Room queries
    // -----------------------------------------------------------------------

    fn random_room(&mut self) -> Option<Room> {
        if self.rooms.is_empty() {
            return None;
        }
        let index = self.rng.random_range(0..self.rooms.len());
        Some(self.rooms[index])
    }

    /// Centre of a random room.
    pub fn random_room_center(&mut self) -> Option<Point> {
        self.random_room().map(|room| room.center())
    }

    /// A random cell on the outline of a random room.
    pub fn random_room_edge(&mut self) -> Option<Point> {
        let room = self.random_room()?;
        let along_x = room.x + self.rng.random_range(0..room.width);
        let along_y = room.y + self.rng.random_range(0..room.height);
        let point = match self.rng.random_range(0..4) {
            0 => Point::new(along_x, room.y),
            1 => Point::new(along_x, room.y + room.height - 1),
            2 => Point::new(room.x, along_y),
            _ => Point::new(room.x + room.width - 1, along_y),
        };
        Some(point)
    }

    /// A random cell of `room`, excluding its outline. `None` if the room is
    /// too thin to have an inside.
    pub fn random_tile_in_room(&mut self, room: Room) -> Option<Point> {
        if room.width < 3 || room.height < 3 {
            return None;
        }
        let x = self.rng.random_range(room.x + 1..=room.x + room.width - 2);
        let y = self.rng.random_range(room.y + 1..=room.y + room.height - 2);
        Some(Point::new(x, y))
    }

    /// A random inside cell of `room` that currently holds `empty` on the
    /// last generated map. Gives up after a bounded number of tries.
    pub fn random_unoccupied_tile_in_room(&mut self, room: Room, empty: char) -> Option<Point> {
        for _ in 0..UNOCCUPIED_ATTEMPTS {
            let point = self.random_tile_in_room(room)?;
            if self.grid.cell_at(point) == empty {
                return Some(point);
            }
        }
        None
    }
}

fn carve_room(grid: &mut Grid, room: Room, floor: char) {
    for y in room.y..room.y + room.height {
        for x in room.x..room.x + room.width {
            grid.set_cell(x, y, floor);
        }
    }
}

/// Horizontal along the start row, then vertical along the end column.
fn carve_corridor(grid: &mut Grid, from: Point, to: Point, floor: char) {
    let (x0, x1) = (from.x.min(to.x), from.x.max(to.x));
    for x in x0..=x1 {
        grid.set_cell(x, from.y, floor);
    }
    let (y0, y1) = (from.y.min(to.y), from.y.max(to.y));
    for y in y0..=y1 {
        grid.set_cell(to.x, y, floor);
    }
}

fn count_wall_neighbours(grid: &Grid, x: i32, y: i32, wall: char) -> usize {
    let mut count = 0;
    for dy in -1..=1 {
        for dx in -1..=1 {
            if (dx, dy) != (0, 0) && grid.cell(x + dx, y + dy) == wall {
                count += 1;
            }
        }
    }
    count
}

impl System for DungeonSystem {
    fn name(&self) -> &str {
        "Dungeon System"
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>, _dt: f64) -> RuntimeResult<()> {
        let (dungeon, cave) = match ctx.systems.get::<InputSystem>() {
            Some(input) => (
                input.is_key_pressed(Key::char('m')),
                input.is_key_pressed(Key::char('c')),
            ),
            None => return Ok(()),
        };
        if !dungeon && !cave {
            return Ok(());
        }

        let Some(grids) = ctx.systems.get_mut::<GridSystem>() else {
            warn!("{}: no grid system to draw on", self.name());
            return Ok(());
        };
        let size = Dimension::new(40, 20);
        if dungeon {
            let (floor, wall) = (self.config.floor, self.config.wall);
            self.generate_room_and_corridor(size.width, size.height, floor, wall)?;
            self.send_to_grid(grids, "GeneratedDungeon");
        }
        if cave {
            let steps = self.config.cave_smooth_steps;
            self.generate_cave(size.width, size.height, steps)?;
            self.send_to_grid(grids, "GeneratedCave");
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
