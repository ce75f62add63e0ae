use std::any::Any;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use et_runtime::{FrameContext, RuntimeResult, System};
use log::info;

use crate::error::{ConsoleError, ConsoleResult};

/// A keyboard key. Letters are case-insensitive: `Key::Char` always holds
/// the lowercase form when built through [`Key::char`] or parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character.
    Char(char),
    /// Escape.
    Escape,
    /// Enter / return.
    Enter,
    /// Backspace.
    Backspace,
    /// Tab.
    Tab,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Function key `F1`..`F12`.
    F(u8),
}

impl Key {
    /// A character key, normalized to lowercase.
    pub fn char(c: char) -> Self {
        Key::Char(c.to_ascii_lowercase())
    }

    fn normalized(self) -> Self {
        match self {
            Key::Char(c) => Key::char(c),
            other => other,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(' ') => write!(f, "space"),
            Key::Char(c) => write!(f, "{c}"),
            Key::Escape => write!(f, "esc"),
            Key::Enter => write!(f, "enter"),
            Key::Backspace => write!(f, "backspace"),
            Key::Tab => write!(f, "tab"),
            Key::Up => write!(f, "up"),
            Key::Down => write!(f, "down"),
            Key::Left => write!(f, "left"),
            Key::Right => write!(f, "right"),
            Key::F(n) => write!(f, "f{n}"),
        }
    }
}

impl FromStr for Key {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let key = match lower.as_str() {
            "esc" | "escape" => Key::Escape,
            "enter" | "return" => Key::Enter,
            "backspace" => Key::Backspace,
            "tab" => Key::Tab,
            "space" => Key::Char(' '),
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::char(c),
                    (Some('f'), Some(_)) => other[1..]
                        .parse::<u8>()
                        .ok()
                        .filter(|n| (1..=12).contains(n))
                        .map(Key::F)
                        .ok_or_else(|| ConsoleError::UnknownKey(s.to_string()))?,
                    _ => return Err(ConsoleError::UnknownKey(s.to_string())),
                }
            }
        };
        Ok(key)
    }
}

/// Where an [`InputSystem`] gets its keys from.
pub trait KeySource: fmt::Debug {
    /// Keys pressed since the previous poll. Must not block.
    fn poll(&mut self) -> ConsoleResult<Vec<Key>>;
}

/// Non-blocking keyboard input from the controlling terminal.
///
/// Puts the terminal into raw mode for as long as the value lives.
#[derive(Debug)]
pub struct TerminalKeys {
    _raw: RawMode,
}

impl TerminalKeys {
    /// Enable raw mode and start reading keys.
    pub fn new() -> ConsoleResult<Self> {
        Ok(Self {
            _raw: RawMode::enable()?,
        })
    }
}

impl KeySource for TerminalKeys {
    fn poll(&mut self) -> ConsoleResult<Vec<Key>> {
        let mut keys = Vec::new();
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                // Ctrl+C quits like Escape, since raw mode swallows SIGINT
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
                {
                    keys.push(Key::Escape);
                    continue;
                }
                if let Some(mapped) = map_key_code(key.code) {
                    keys.push(mapped);
                }
            }
        }
        Ok(keys)
    }
}

fn map_key_code(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::Char(c) => Key::char(c),
        KeyCode::Esc => Key::Escape,
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Tab => Key::Tab,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::F(n) => Key::F(n),
        _ => return None,
    };
    Some(key)
}

/// Raw-mode guard; restores the terminal on drop.
#[derive(Debug)]
struct RawMode;

impl RawMode {
    fn enable() -> ConsoleResult<Self> {
        enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        disable_raw_mode().ok();
    }
}

/// Replays a fixed script: one batch of keys per poll, then nothing.
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeys {
    frames: VecDeque<Vec<Key>>,
}

impl ScriptedKeys {
    /// A source that never reports a key.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A source yielding `frames[i]` on the i-th poll.
    pub fn from_frames(frames: Vec<Vec<Key>>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    /// A source yielding one key per poll.
    pub fn one_per_frame(keys: impl IntoIterator<Item = Key>) -> Self {
        Self::from_frames(keys.into_iter().map(|k| vec![k]).collect())
    }

    /// Whether every scripted batch has been delivered.
    pub fn is_exhausted(&self) -> bool {
        self.frames.is_empty()
    }
}

impl KeySource for ScriptedKeys {
    fn poll(&mut self) -> ConsoleResult<Vec<Key>> {
        Ok(self.frames.pop_front().unwrap_or_default())
    }
}

/// Polls a [`KeySource`] once per frame and exposes what was pressed.
///
/// Any quit key (Escape and `q` by default) stops the runtime.
#[derive(Debug)]
pub struct InputSystem {
    source: Box<dyn KeySource>,
    pressed: HashSet<Key>,
    quit_keys: Vec<Key>,
}

impl InputSystem {
    /// Read keys from `source`.
    pub fn new(source: Box<dyn KeySource>) -> Self {
        Self {
            source,
            pressed: HashSet::new(),
            quit_keys: vec![Key::Escape, Key::char('q')],
        }
    }

    /// Replace the keys that stop the runtime.
    pub fn with_quit_keys(mut self, keys: Vec<Key>) -> Self {
        self.quit_keys = keys.into_iter().map(Key::normalized).collect();
        self
    }

    /// Whether `key` was pressed this frame.
    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key.normalized())
    }

    /// Every key pressed this frame.
    pub fn pressed(&self) -> impl Iterator<Item = &Key> {
        self.pressed.iter()
    }

    /// Poll the source, replacing this frame's pressed set.
    pub fn poll(&mut self) -> ConsoleResult<()> {
        self.pressed = self
            .source
            .poll()?
            .into_iter()
            .map(Key::normalized)
            .collect();
        Ok(())
    }

    fn quit_requested(&self) -> Option<Key> {
        self.quit_keys
            .iter()
            .copied()
            .find(|k| self.pressed.contains(k))
    }
}

impl System for InputSystem {
    fn name(&self) -> &str {
        "Input System"
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>, _dt: f64) -> RuntimeResult<()> {
        self.poll()?;
        if let Some(key) = self.quit_requested() {
            info!("Quit requested ({key})");
            ctx.stop();
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
