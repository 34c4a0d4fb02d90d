//! Weapon selection.

/// Selectable items, in slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weapon {
    Gun,
    Block,
}

impl Weapon {
    pub const ALL: [Weapon; 2] = [Weapon::Gun, Weapon::Block];
}

/// The currently selected slot. Starts on the gun.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Loadout {
    index: usize,
}

impl Loadout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn selected(&self) -> Weapon {
        Weapon::ALL[self.index]
    }

    /// Whether shooting is possible with the current selection.
    pub fn gun_active(&self) -> bool {
        self.selected() == Weapon::Gun
    }

    /// Select a slot directly. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) {
        if index < Weapon::ALL.len() {
            self.index = index;
        }
    }

    /// Move one slot in the direction of `delta`, wrapping at both ends.
    pub fn scroll(&mut self, delta: i32) {
        let len = Weapon::ALL.len();
        self.index = match delta.signum() {
            1 => (self.index + 1) % len,
            -1 => (self.index + len - 1) % len,
            _ => self.index,
        };
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}
