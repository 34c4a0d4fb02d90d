//! Local lives counter.

/// What a hit did to the local player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// A life was lost and some remain.
    Damaged { remaining: u32 },
    /// The last life was lost. Reported exactly once per session.
    Eliminated,
    /// Already eliminated; nothing changed.
    Ignored,
}

/// Remaining lives of the local player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lives {
    remaining: u32,
    starting: u32,
}

impl Lives {
    pub fn new(starting: u32) -> Self {
        Self {
            remaining: starting,
            starting,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_eliminated(&self) -> bool {
        self.remaining == 0
    }

    /// Take one life. Never goes below zero.
    pub fn apply_hit(&mut self) -> HitOutcome {
        if self.remaining == 0 {
            return HitOutcome::Ignored;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            HitOutcome::Eliminated
        } else {
            HitOutcome::Damaged {
                remaining: self.remaining,
            }
        }
    }

    /// Restore the starting count.
    pub fn reset(&mut self) {
        self.remaining = self.starting;
    }
}
