//! Human-readable categorization of raw input events.
//!
//! Keys, relative axes, absolute axes and synchronization markers get a
//! label built from the evdev code tables. Everything else falls back to a
//! numeric `code`/`type`/`val` rendering.

use evdev::{
    AbsoluteAxisType, InputEvent, InputEventKind, Key, RelativeAxisType, Synchronization,
};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// State carried by the value of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Up,
    Down,
    Hold,
    /// A value the kernel does not normally emit for keys.
    Other(i32),
}

impl KeyState {
    pub fn from_value(value: i32) -> Self {
        match value {
            0 => KeyState::Up,
            1 => KeyState::Down,
            2 => KeyState::Hold,
            v => KeyState::Other(v),
        }
    }
}

impl fmt::Display for KeyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyState::Up => f.write_str("up"),
            KeyState::Down => f.write_str("down"),
            KeyState::Hold => f.write_str("hold"),
            KeyState::Other(v) => write!(f, "{}", v),
        }
    }
}

/// Event time as seconds and microseconds since the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub secs: u64,
    pub micros: u32,
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        let since_epoch = time.duration_since(UNIX_EPOCH).unwrap_or_default();
        Self {
            secs: since_epoch.as_secs(),
            micros: since_epoch.subsec_micros(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.secs, self.micros)
    }
}

/// The category an event falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Key { code: u16, key: Key, state: KeyState },
    Relative(RelativeAxisType),
    Absolute(AbsoluteAxisType),
    Synchronization(Synchronization),
    Other { type_: u16, code: u16, value: i32 },
}

/// A categorized input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Categorized {
    pub timestamp: Timestamp,
    pub category: Category,
}

impl fmt::Display for Categorized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ts = self.timestamp;
        match self.category {
            Category::Key { code, key, state } => {
                write!(f, "key event at {}, {} ({:?}), {}", ts, code, key, state)
            }
            Category::Relative(axis) => write!(f, "relative axis event at {}, {:?} ", ts, axis),
            Category::Absolute(axis) => write!(f, "absolute axis event at {}, {:?} ", ts, axis),
            Category::Synchronization(sync) => {
                write!(f, "synchronization event at {}, {:?} ", ts, sync)
            }
            Category::Other { type_, code, value } => write!(
                f,
                "event at {}, code {:02}, type {:02}, val {:02}",
                ts, code, type_, value
            ),
        }
    }
}

/// Categorize a raw event.
pub fn categorize(event: &InputEvent) -> Categorized {
    let category = match event.kind() {
        InputEventKind::Key(key) => Category::Key {
            code: event.code(),
            key,
            state: KeyState::from_value(event.value()),
        },
        InputEventKind::RelAxis(axis) => Category::Relative(axis),
        InputEventKind::AbsAxis(axis) => Category::Absolute(axis),
        InputEventKind::Synchronization(sync) => Category::Synchronization(sync),
        _ => Category::Other {
            type_: event.event_type().0,
            code: event.code(),
            value: event.value(),
        },
    };

    Categorized {
        timestamp: event.timestamp().into(),
        category,
    }
}
