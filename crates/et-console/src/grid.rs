use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use et_runtime::{FrameContext, RuntimeResult, System};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::input::{InputSystem, Key};

/// Width and height of a grid, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimension {
    /// Columns.
    pub width: i32,
    /// Rows.
    pub height: i32,
}

impl Dimension {
    /// A `width` x `height` size.
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// A cell coordinate. `(0, 0)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Point {
    /// The cell at column `x`, row `y`.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A row-major grid of characters.
///
/// Reads outside the grid return `' '`; writes outside it are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grid {
    dimension: Dimension,
    cells: Vec<char>,
}

impl Grid {
    /// A grid filled with `fill`. Negative sizes are treated as zero.
    pub fn new(width: i32, height: i32, fill: char) -> Self {
        let dimension = Dimension::new(width.max(0), height.max(0));
        let len = dimension.width as usize * dimension.height as usize;
        Self {
            dimension,
            cells: vec![fill; len],
        }
    }

    /// The grid's size.
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Columns.
    pub fn width(&self) -> i32 {
        self.dimension.width
    }

    /// Rows.
    pub fn height(&self) -> i32 {
        self.dimension.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.dimension.width || y >= self.dimension.height {
            return None;
        }
        Some(y as usize * self.dimension.width as usize + x as usize)
    }

    /// The cell at `(x, y)`, or `' '` outside the grid.
    pub fn cell(&self, x: i32, y: i32) -> char {
        self.index(x, y).map_or(' ', |i| self.cells[i])
    }

    /// Overwrite the cell at `(x, y)`. Ignored outside the grid.
    pub fn set_cell(&mut self, x: i32, y: i32, value: char) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = value;
        }
    }

    /// [`cell`](Self::cell) at a point.
    pub fn cell_at(&self, point: Point) -> char {
        self.cell(point.x, point.y)
    }

    /// [`set_cell`](Self::set_cell) at a point.
    pub fn set_cell_at(&mut self, point: Point, value: char) {
        self.set_cell(point.x, point.y, value);
    }

    /// Number of cells holding `value`.
    pub fn count(&self, value: char) -> usize {
        self.cells.iter().filter(|c| **c == value).count()
    }

    /// Each row as a string, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        let width = self.dimension.width.max(1) as usize;
        self.cells
            .chunks(width)
            .map(|row| row.iter().collect::<String>())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

/// Stores named maps and draws the active one to the console.
///
/// Drawing happens in `render`, only when something changed since the last
/// draw. Pressing `G` creates a 50x10 map named `NewMap`; pressing `H`
/// creates a randomly sized map named `RandomMap`.
pub struct GridSystem {
    maps: HashMap<String, Grid>,
    active: Option<String>,
    needs_redraw: bool,
    rng: StdRng,
    out: Box<dyn Write>,
}

impl fmt::Debug for GridSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridSystem")
            .field("maps", &self.map_names())
            .field("active", &self.active)
            .field("needs_redraw", &self.needs_redraw)
            .finish()
    }
}

impl GridSystem {
    /// A grid system drawing to stdout.
    pub fn new(seed: u64) -> Self {
        Self::with_output(seed, Box::new(io::stdout()))
    }

    /// A grid system drawing to `out`.
    pub fn with_output(seed: u64, out: Box<dyn Write>) -> Self {
        Self {
            maps: HashMap::new(),
            active: None,
            needs_redraw: true,
            rng: StdRng::seed_from_u64(seed),
            out,
        }
    }

    // -----------------------------------------------------------------------
    // Map management
    // -----------------------------------------------------------------------

    /// Create (or replace) a map filled with `fill`.
    pub fn create_map(&mut self, name: impl Into<String>, dimension: Dimension, fill: char) {
        self.maps
            .insert(name.into(), Grid::new(dimension.width, dimension.height, fill));
        self.mark_dirty();
    }

    /// Store (or replace) a prebuilt map.
    pub fn add_map(&mut self, name: impl Into<String>, grid: Grid) {
        let name = name.into();
        if self.active.as_deref() == Some(name.as_str()) {
            self.mark_dirty();
        }
        self.maps.insert(name, grid);
    }

    /// Make `name` the active map. Returns `false` if no such map exists.
    pub fn load_map(&mut self, name: &str) -> bool {
        if !self.maps.contains_key(name) {
            return false;
        }
        self.active = Some(name.to_string());
        self.mark_dirty();
        true
    }

    /// Remove a map, deactivating it if it was active.
    pub fn delete_map(&mut self, name: &str) {
        self.maps.remove(name);
        if self.active.as_deref() == Some(name) {
            self.active = None;
        }
        self.mark_dirty();
    }

    /// Remove every map.
    pub fn clear_maps(&mut self) {
        self.maps.clear();
        self.active = None;
        self.mark_dirty();
    }

    /// Request a redraw on the next render.
    pub fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    /// Whether the next render will draw.
    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// A stored map by name.
    pub fn map(&self, name: &str) -> Option<&Grid> {
        self.maps.get(name)
    }

    /// Names of all stored maps, sorted.
    pub fn map_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.maps.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Name of the active map.
    pub fn active_map_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The active map.
    pub fn active_map(&self) -> Option<&Grid> {
        self.active.as_deref().and_then(|name| self.maps.get(name))
    }

    fn active_map_mut(&mut self) -> Option<&mut Grid> {
        let name = self.active.as_deref()?;
        self.maps.get_mut(name)
    }

    // -----------------------------------------------------------------------
    // Active map access
    // -----------------------------------------------------------------------

    /// Width of the active map, 0 if none.
    pub fn width(&self) -> i32 {
        self.active_map().map_or(0, Grid::width)
    }

    /// Height of the active map, 0 if none.
    pub fn height(&self) -> i32 {
        self.active_map().map_or(0, Grid::height)
    }

    /// Cell of the active map, `' '` if none or out of range.
    pub fn cell(&self, x: i32, y: i32) -> char {
        self.active_map().map_or(' ', |grid| grid.cell(x, y))
    }

    /// Write a cell of the active map. Ignored if there is none.
    pub fn set_cell(&mut self, x: i32, y: i32, value: char) {
        if let Some(grid) = self.active_map_mut() {
            grid.set_cell(x, y, value);
            self.mark_dirty();
        }
    }

    /// Draw the active map if it changed. Returns whether anything was drawn.
    pub fn draw(&mut self) -> io::Result<bool> {
        if !self.needs_redraw {
            return Ok(false);
        }
        let Some(grid) = self.active.as_deref().and_then(|name| self.maps.get(name)) else {
            return Ok(false);
        };

        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        for row in grid.rows() {
            // raw mode does not translate '\n'
            write!(self.out, "{row}\r\n")?;
        }
        self.out.flush()?;
        self.needs_redraw = false;
        Ok(true)
    }
}

impl System for GridSystem {
    fn name(&self) -> &str {
        "Grid System"
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>, _dt: f64) -> RuntimeResult<()> {
        let Some(input) = ctx.systems.get::<InputSystem>() else {
            return Ok(());
        };

        if input.is_key_pressed(Key::char('g')) {
            self.create_map("NewMap", Dimension::new(50, 10), '.');
            self.load_map("NewMap");
            info!("Created and loaded new map: NewMap");
        }

        if input.is_key_pressed(Key::char('h')) {
            let width = self.rng.random_range(20..100);
            let height = self.rng.random_range(5..25);
            self.create_map("RandomMap", Dimension::new(width, height), '.');
            self.load_map("RandomMap");
            info!("Created and loaded random map: RandomMap ({width}x{height})");
        }
        Ok(())
    }

    fn render(&mut self, _ctx: &mut FrameContext<'_>) -> RuntimeResult<()> {
        self.draw()?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
