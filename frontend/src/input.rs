//! SDL scancode → Vector-06C keyboard matrix code mapping.
//!
//! Grounded on the teacher's `KeyMap` shape (a flat `HashMap<Scancode, u8>`
//! with a `default_key_map` builder), but the encoded byte means something
//! different here: not an arcade-machine "button id" but the matrix
//! `(row << 3) | col` code `Request::KeyHandling` passes straight through
//! to `Keyboard::set_key` (`core/src/board.rs`), plus the two reserved
//! codes for RESET/RESTART (`device::keyboard::{SCANCODE_RESET,
//! SCANCODE_RESTART}`).

use std::collections::HashMap;

use sdl2::keyboard::Scancode;
use vector06c_core::device::keyboard::{SCANCODE_RESET, SCANCODE_RESTART};

/// Maps SDL scancodes to Vector-06C matrix codes (or the two reserved
/// RESET/RESTART codes).
pub struct KeyMap {
    map: HashMap<Scancode, u8>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Bind a host scancode to a matrix code `(row << 3) | col`, or one of
    /// the two reserved RESET/RESTART codes.
    pub fn bind(&mut self, scancode: Scancode, matrix_code: u8) {
        self.map.insert(scancode, matrix_code);
    }

    pub fn get(&self, scancode: Scancode) -> Option<u8> {
        self.map.get(&scancode).copied()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::new()
    }
}

fn mc(row: u8, col: u8) -> u8 {
    (row << 3) | col
}

/// A reasonable default layout: letters/digits on a QWERTY row-major scan
/// roughly matching the real Vector-06C's own row-major matrix layout
/// closely enough to type BASIC programs, plus F11/F12 wired to
/// RESET/RESTART. Exact key placement is a frontend/UX concern outside
/// spec.md's scope (§1); this exists only to exercise the core's
/// `KEY_HANDLING` contract end to end.
pub fn default_key_map() -> KeyMap {
    let mut km = KeyMap::new();

    use Scancode::*;
    let rows: [&[(Scancode, u8)]; 8] = [
        &[(Num1, 0), (Num2, 1), (Num3, 2), (Num4, 3), (Num5, 4), (Num6, 5), (Num7, 6), (Num8, 7)],
        &[(Num9, 0), (Num0, 1), (Minus, 2), (Equals, 3), (Backspace, 4), (Tab, 5), (Q, 6), (W, 7)],
        &[(E, 0), (R, 1), (T, 2), (Y, 3), (U, 4), (I, 5), (O, 6), (P, 7)],
        &[(LeftBracket, 0), (RightBracket, 1), (Return, 2), (A, 3), (S, 4), (D, 5), (F, 6), (G, 7)],
        &[(H, 0), (J, 1), (K, 2), (L, 3), (Semicolon, 4), (Apostrophe, 5), (Backslash, 6), (Z, 7)],
        &[(X, 0), (C, 1), (V, 2), (B, 3), (N, 4), (M, 5), (Comma, 6), (Period, 7)],
        &[(Slash, 0), (LShift, 1), (RShift, 1), (Space, 2), (LCtrl, 3), (RCtrl, 3), (Escape, 4), (Up, 5)],
        &[(Down, 0), (Left, 1), (Right, 2), (Home, 3), (End, 4), (Delete, 5), (PageUp, 6), (PageDown, 7)],
    ];

    for (row, bindings) in rows.iter().enumerate() {
        for &(scancode, col) in *bindings {
            km.bind(scancode, mc(row as u8, col));
        }
    }

    km.bind(F11, SCANCODE_RESET);
    km.bind(F12, SCANCODE_RESTART);

    km
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_and_restart_are_reserved_codes() {
        let km = default_key_map();
        assert_eq!(km.get(Scancode::F11), Some(SCANCODE_RESET));
        assert_eq!(km.get(Scancode::F12), Some(SCANCODE_RESTART));
    }

    #[test]
    fn ordinary_keys_encode_row_and_column() {
        let km = default_key_map();
        assert_eq!(km.get(Scancode::Q), Some(mc(1, 6)));
        assert_eq!(km.get(Scancode::Space), Some(mc(6, 2)));
    }
}
