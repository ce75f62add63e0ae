use std::io;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use et_console::{ScriptedKeys, register_default_systems};
use et_runtime::SystemRegistry;

pub fn run() -> Result<(), String> {
    let mut registry = SystemRegistry::new();
    register_default_systems(
        &mut registry,
        0,
        Box::new(ScriptedKeys::empty()),
        Box::new(io::sink()),
    );

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Order", "System"]);
    for (i, name) in registry.names().iter().enumerate() {
        table.add_row(vec![(i + 1).to_string(), name.to_string()]);
    }

    println!("  {}", "Default systems".bold());
    println!("{table}");
    println!();
    println!("  {} systems", registry.len());
    Ok(())
}
