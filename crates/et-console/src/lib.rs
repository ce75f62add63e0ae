//! Console systems for the Eternum engine.
//!
//! [`InputSystem`] polls the keyboard once per frame, [`GridSystem`] keeps
//! named character maps and draws the active one to the terminal, and
//! [`DungeonSystem`] generates room-and-corridor dungeons and caves for the
//! grid to show. [`register_default_systems`] wires all of them into a
//! registry in the order they expect to run.
//!
//! ```
//! use et_console::{DungeonSystem, Grid};
//!
//! let mut dungeon = DungeonSystem::new(42);
//! let grid: &Grid = dungeon.generate_room_and_corridor(40, 20, '.', '#').unwrap();
//! assert_eq!((grid.width(), grid.height()), (40, 20));
//! assert_eq!(grid.cell(0, 0), '#');
//! ```

/// Default system registration.
pub mod defaults;
/// Procedural dungeon and cave generation.
pub mod dungeon;
/// Error types for the console systems.
pub mod error;
/// Character grids and the grid renderer.
pub mod grid;
/// Keyboard input.
pub mod input;

/// Re-export default registration.
pub use defaults::register_default_systems;
/// Re-export dungeon types.
pub use dungeon::{DungeonConfig, DungeonSystem, Room};
/// Re-export error types.
pub use error::{ConsoleError, ConsoleResult};
/// Re-export grid types.
pub use grid::{Dimension, Grid, GridSystem, Point};
/// Re-export input types.
pub use input::{InputSystem, Key, KeySource, ScriptedKeys, TerminalKeys};
