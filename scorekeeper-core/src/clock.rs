use std::fmt::{self, Display, Formatter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A countdown clock in seconds.
///
/// The clock only moves when it is ticked while running. It never touches any score.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Clock {
    length: u32,
    remaining: u32,
    running: bool,
}

impl Clock {
    /// Creates a new stopped `Clock` with `seconds` remaining.
    #[inline]
    pub fn new(seconds: u32) -> Self {
        Self {
            length: seconds,
            remaining: seconds,
            running: false,
        }
    }

    #[inline]
    pub fn start(&mut self) {
        self.running = self.remaining > 0;
    }

    #[inline]
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Stops the clock and sets it back to its full length.
    #[inline]
    pub fn reset(&mut self) {
        self.remaining = self.length;
        self.running = false;
    }

    /// Stops the clock and gives it a new length of `seconds`.
    pub fn set(&mut self, seconds: u32) {
        self.length = seconds;
        self.reset();
    }

    /// Advances the clock by `seconds`. Returns `true` exactly when this tick made a running
    /// clock reach zero. The clock stops on zero.
    pub fn tick(&mut self, seconds: u32) -> bool {
        if !self.running {
            return false;
        }

        self.remaining = self.remaining.saturating_sub(seconds);

        if self.remaining == 0 {
            self.running = false;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[inline]
    pub fn length(&self) -> u32 {
        self.length
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }
}

impl Display for Clock {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}
