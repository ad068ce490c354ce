use std::collections::HashSet;

use glam::Vec2;
use parking_lot::RwLock;

/// Movement/modifier keys the camera controller consumes. The mapping from
/// physical key codes lives with the window layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
    Sprint,
}

/// Thread-safe snapshot of the held keys and accumulated mouse look.
///
/// The window layer writes into it from event callbacks; the frame loop
/// reads it once per iteration. Look deltas accumulate between frames and
/// are drained by the consumer.
#[derive(Debug, Default)]
pub struct InputState {
    keys: RwLock<HashSet<Key>>,
    look_active: RwLock<bool>,
    look_delta: RwLock<Vec2>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_held(&self, key: Key, held: bool) {
        let mut keys = self.keys.write();
        if held {
            keys.insert(key);
        } else {
            keys.remove(&key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.keys.read().contains(&key)
    }

    pub fn sprint_held(&self) -> bool {
        self.is_held(Key::Sprint)
    }

    /// Enables or disables mouse look (right button held). Disabling drops
    /// any delta accumulated so far so the camera does not jump on the next
    /// press.
    pub fn set_look_active(&self, active: bool) {
        *self.look_active.write() = active;
        if !active {
            *self.look_delta.write() = Vec2::ZERO;
        }
    }

    pub fn look_active(&self) -> bool {
        *self.look_active.read()
    }

    pub fn push_look_delta(&self, delta: Vec2) {
        *self.look_delta.write() += delta;
    }

    /// Returns the accumulated look delta and resets it to zero.
    pub fn take_look_delta(&self) -> Vec2 {
        std::mem::take(&mut *self.look_delta.write())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_held_keys() {
        let input = InputState::new();
        input.set_held(Key::Forward, true);
        assert!(input.is_held(Key::Forward));
        input.set_held(Key::Forward, false);
        assert!(!input.is_held(Key::Forward));
    }

    #[test]
    fn look_delta_accumulates_and_drains() {
        let input = InputState::new();
        input.push_look_delta(Vec2::new(1.0, 2.0));
        input.push_look_delta(Vec2::new(0.5, -1.0));
        assert_eq!(input.take_look_delta(), Vec2::new(1.5, 1.0));
        assert_eq!(input.take_look_delta(), Vec2::ZERO);
    }

    #[test]
    fn releasing_look_clears_pending_delta() {
        let input = InputState::new();
        input.set_look_active(true);
        input.push_look_delta(Vec2::splat(10.0));
        input.set_look_active(false);
        assert_eq!(input.take_look_delta(), Vec2::ZERO);
    }
}
