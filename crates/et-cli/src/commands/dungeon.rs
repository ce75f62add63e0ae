use et_console::DungeonSystem;

pub fn run(width: i32, height: i32, seed: u64, cave: bool, smooth: usize) -> Result<(), String> {
    let mut dungeon = DungeonSystem::new(seed);
    let (floor, wall) = (dungeon.config().floor, dungeon.config().wall);

    let generated = if cave {
        dungeon.generate_cave(width, height, smooth)
    } else {
        dungeon.generate_room_and_corridor(width, height, floor, wall)
    };
    let grid = generated.map_err(|e| e.to_string())?;

    print!("{grid}");
    Ok(())
}
