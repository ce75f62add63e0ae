//! Full runtime runs of the default systems driven by scripted keys.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use et_console::{
    DungeonSystem, GridSystem, InputSystem, Key, ScriptedKeys, register_default_systems,
};
use et_runtime::{Runtime, RuntimeConfig, RuntimeState, SteppedClock};

/// Collects everything the grid draws.
#[derive(Clone, Default)]
struct Screen(Rc<RefCell<Vec<u8>>>);

impl Write for Screen {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Screen {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

fn runtime(frames: u64, keys: Vec<Vec<Key>>, screen: Screen) -> Runtime {
    let mut runtime = Runtime::new(RuntimeConfig::default().with_max_frames(frames)).unwrap();
    register_default_systems(
        runtime.registry_mut(),
        42,
        Box::new(ScriptedKeys::from_frames(keys)),
        Box::new(screen),
    );
    runtime
}

#[test]
fn quit_key_stops_the_loop() {
    let keys = vec![vec![], vec![], vec![Key::char('q')], vec![]];
    let mut runtime = runtime(100, keys, Screen::default());
    let report = runtime.run_with_clock(&mut SteppedClock::new(0.016)).unwrap();
    assert_eq!(report.frames, 3);
    assert_eq!(runtime.state(), RuntimeState::Stopped);
}

#[test]
fn escape_also_stops() {
    let mut runtime = runtime(100, vec![vec![Key::Escape]], Screen::default());
    let report = runtime.run_with_clock(&mut SteppedClock::new(0.016)).unwrap();
    assert_eq!(report.frames, 1);
}

#[test]
fn g_key_creates_and_draws_a_map() {
    let screen = Screen::default();
    let mut runtime = runtime(3, vec![vec![Key::char('g')]], screen.clone());
    runtime.run_with_clock(&mut SteppedClock::new(0.016)).unwrap();

    let grids = runtime.registry().get::<GridSystem>().unwrap();
    assert_eq!(grids.active_map_name(), Some("NewMap"));
    assert_eq!((grids.width(), grids.height()), (50, 10));

    let row = format!("{}\r\n", ".".repeat(50));
    assert_eq!(screen.text().matches(&row).count(), 10);
}

#[test]
fn h_key_creates_a_random_sized_map() {
    let mut runtime = runtime(2, vec![vec![Key::char('h')]], Screen::default());
    runtime.run_with_clock(&mut SteppedClock::new(0.016)).unwrap();

    let grids = runtime.registry().get::<GridSystem>().unwrap();
    assert_eq!(grids.active_map_name(), Some("RandomMap"));
    assert!((20..100).contains(&grids.width()));
    assert!((5..25).contains(&grids.height()));
}

#[test]
fn dungeon_keys_send_maps_to_the_grid() {
    let keys = vec![vec![Key::char('m')], vec![Key::char('c')]];
    let mut runtime = runtime(3, keys, Screen::default());
    runtime.run_with_clock(&mut SteppedClock::new(0.016)).unwrap();

    let grids = runtime.registry().get::<GridSystem>().unwrap();
    assert!(grids.map("GeneratedDungeon").is_some());
    assert_eq!(grids.active_map_name(), Some("GeneratedCave"));
    assert_eq!((grids.width(), grids.height()), (40, 20));

    let dungeon = runtime.registry().get::<DungeonSystem>().unwrap();
    assert_eq!(grids.active_map(), Some(dungeon.grid()));
    assert!(runtime.faults().is_empty());
}

#[test]
fn pressed_keys_clear_on_the_next_frame() {
    let mut runtime = runtime(2, vec![vec![Key::char('x')]], Screen::default());
    runtime.run_with_clock(&mut SteppedClock::new(0.016)).unwrap();
    let input = runtime.registry().get::<InputSystem>().unwrap();
    assert!(!input.is_key_pressed(Key::char('x')));
}
