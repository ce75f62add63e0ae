pub mod dungeon;
pub mod run;
pub mod systems;
