use std::fmt::{self, Write as _};

use tumble_engine::coords::Vec2;

use crate::space::SpaceStats;

/// Bytes available to a tick's messages.
pub const MESSAGE_CAPACITY: usize = 8 * 1024;

pub const INSTRUCTIONS_POS: Vec2 = Vec2::new(-300.0, 220.0);
pub const INFO_POS: Vec2 = Vec2::new(0.0, 220.0);
pub const MESSAGE_POS: Vec2 = Vec2::new(-300.0, -200.0);

pub const INSTRUCTIONS: &str = "Controls:\n\
    A - * Switch demos. (return restarts)\n\
    Use the mouse to grab objects.\n";

/// Per-tick text printed by the running demo.
///
/// Holds fewer than [`MESSAGE_CAPACITY`] bytes. A write that does not fit
/// keeps the part that does and closes the buffer until the next
/// [`reset`](Self::reset).
#[derive(Debug, Default)]
pub struct MessageBuffer {
    text: String,
    open: bool,
}

impl MessageBuffer {
    /// Clears the text and accepts writes again.
    pub fn reset(&mut self) {
        self.text.clear();
        self.open = true;
    }

    pub fn print(&mut self, args: fmt::Arguments<'_>) {
        if !self.open {
            return;
        }

        let mut formatted = String::new();
        if formatted.write_fmt(args).is_err() {
            self.open = false;
            return;
        }
        // One byte stays reserved, matching a NUL-terminated buffer.
        let room = MESSAGE_CAPACITY - 1 - self.text.len();
        if formatted.len() <= room {
            self.text.push_str(&formatted);
            return;
        }

        let mut cut = room;
        while !formatted.is_char_boundary(cut) {
            cut -= 1;
        }
        self.text.push_str(&formatted[..cut]);
        self.open = false;
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

/// Running maxima for the info overlay, reset per demo.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InfoCounters {
    pub max_arbiters: usize,
    pub max_points: usize,
    pub max_constraints: usize,
}

impl InfoCounters {
    /// Folds `stats` into the maxima and formats the overlay text.
    pub fn info_text(&mut self, stats: &SpaceStats, time: f64) -> String {
        let constraints = (stats.constraints + stats.contact_points) * stats.iterations;

        self.max_arbiters = self.max_arbiters.max(stats.arbiters);
        self.max_points = self.max_points.max(stats.contact_points);
        self.max_constraints = self.max_constraints.max(constraints);

        let ke = if stats.kinetic_energy < 1e-10 { 0.0 } else { stats.kinetic_energy };

        format!(
            "Arbiters: {} ({}) - Contact Points: {} ({})\n\
             Other Constraints: {}, Iterations: {}\n\
             Constraints x Iterations: {} ({})\n\
             Time:{:5.2}s, KE:{:9.2e}",
            stats.arbiters,
            self.max_arbiters,
            stats.contact_points,
            self.max_points,
            stats.constraints,
            stats.iterations,
            constraints,
            self.max_constraints,
            time,
            ke,
        )
    }
}
