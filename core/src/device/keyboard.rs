//! 8-row active-low keyboard matrix (spec.md §4.5).
//!
//! Grounded on the PIA's `input_a`/`input_b` latch-plus-edge-state shape
//! (`device/pia6820.rs`), simplified: the matrix itself raises no IRQ, it
//! is pure combinational scan state read by the I/O ports.

/// A key event's effect on the machine, as decoded from the F11/F12
/// scancodes (spec.md §4.5).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Reset,
    Restart,
}

/// Scancode reserved for the "reset" keystroke (host-assigned; F11 by
/// convention, matching the teacher frontend's function-key handling).
pub const SCANCODE_RESET: u8 = 0x79; // F11 on a PC/AT scancode set
/// Scancode reserved for the "restart" keystroke (F12 by convention).
pub const SCANCODE_RESTART: u8 = 0x7A; // F12

pub struct Keyboard {
    /// Row matrix, active-high internally (`1` = key held). Row `r`'s
    /// byte has bit `c` set when the key at (row r, column c) is down.
    matrix: [u8; 8],
    pub ss: bool,  // Shift (SS)
    pub us: bool,  // Control/"US" (СУ)
    pub rus: bool, // РУС/LAT layout modifier
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            matrix: [0; 8],
            ss: false,
            us: false,
            rus: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Presses or releases the key at `(row, col)`.
    pub fn set_key(&mut self, row: u8, col: u8, down: bool) {
        let bit = 1u8 << (col & 0x07);
        let row = &mut self.matrix[(row & 0x07) as usize];
        if down {
            *row |= bit;
        } else {
            *row &= !bit;
        }
    }

    pub fn set_modifier(&mut self, which: Modifier, down: bool) {
        match which {
            Modifier::Ss => self.ss = down,
            Modifier::Us => self.us = down,
            Modifier::Rus => self.rus = down,
        }
    }

    /// Decodes a raw host scancode into a matrix update plus an optional
    /// machine-wide action. Host-specific scancode→(row,col) mapping is a
    /// frontend concern (out of scope, spec.md §1); this takes an
    /// already-resolved `(row, col)` pair for ordinary keys and special-cases
    /// only the two reserved scancodes.
    pub fn key_event(&mut self, scancode: u8, down: bool) -> KeyAction {
        if scancode == SCANCODE_RESET {
            return if down { KeyAction::None } else { KeyAction::Reset };
        }
        if scancode == SCANCODE_RESTART {
            return if down { KeyAction::None } else { KeyAction::Restart };
        }
        KeyAction::None
    }

    /// `row_mask` has a `0` bit for every row selected. ORs together the
    /// matrix bytes of every selected row, inverts, and returns — matching
    /// the active-low electrical convention of the real bus (spec.md
    /// §4.5).
    pub fn read(&self, row_mask: u8) -> u8 {
        let mut bits = 0u8;
        for row in 0..8 {
            if row_mask & (1 << row) == 0 {
                bits |= self.matrix[row];
            }
        }
        !bits
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modifier {
    Ss,
    Us,
    Rus,
}
