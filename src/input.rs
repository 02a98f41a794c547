//! Player input
//!
//! The platform layer translates device events into [`InputEvent`]s and the
//! scene forwards them to the player tank.

/// Arrow directions the player can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A single input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Pressed(Direction),
    Released(Direction),
    /// Discrete fire trigger
    Fire,
}

/// Which directions are currently held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl KeyboardState {
    pub fn set(&mut self, direction: Direction, held: bool) {
        match direction {
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }

    /// Turn direction: +1 left, -1 right, 0 none (left wins when both held)
    pub fn turn(&self) -> f32 {
        if self.left {
            1.0
        } else if self.right {
            -1.0
        } else {
            0.0
        }
    }

    /// Drive direction: +1 forward, -1 reverse, 0 none (forward wins)
    pub fn drive(&self) -> f32 {
        if self.up {
            1.0
        } else if self.down {
            -1.0
        } else {
            0.0
        }
    }
}
