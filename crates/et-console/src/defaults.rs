use std::io::Write;

use et_core::Transform;
use et_runtime::{ComponentSystem, SystemRegistry};

use crate::dungeon::DungeonSystem;
use crate::grid::GridSystem;
use crate::input::{InputSystem, KeySource};

/// Register the stock systems in dispatch order: input, grid, dungeon,
/// then transform tracking.
///
/// Input comes first so every later system sees this frame's keys. Returns
/// how many systems were newly added; ones already present are skipped.
pub fn register_default_systems(
    registry: &mut SystemRegistry,
    seed: u64,
    keys: Box<dyn KeySource>,
    output: Box<dyn Write>,
) -> usize {
    let added = [
        registry.register(InputSystem::new(keys)),
        registry.register(GridSystem::with_output(seed, output)),
        registry.register(DungeonSystem::new(seed)),
        registry.register(ComponentSystem::<Transform>::new()),
    ];
    added.into_iter().filter(|added| *added).count()
}
