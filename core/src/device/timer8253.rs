//! Intel i8253 programmable interval timer, three independent counters
//! (spec.md §4.6).
//!
//! Grounded on `device/pokey.rs`'s per-channel counter/divider/mode struct
//! array and its register-table-then-pipeline doc style — the closest
//! sibling in the teacher pack to "three independently clocked counter
//! units with a shared control-word decoder".

/// Counter write-sequencing mode, selected by the control word's
/// latch-select field (spec.md §4.6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WriteMode {
    /// Latch-select 0: not a write mode at all — the control word instead
    /// requests a value latch for the next read.
    Latch,
    Lsb,
    Msb,
    LsbThenMsb,
}

/// One i8253 counter channel.
pub struct Counter {
    pub mode: u8,
    pub bcd: bool,
    write_mode: WriteMode,
    /// Tracks which half of an `LsbThenMsb` write sequence is next.
    lsb_then_msb_stage: u8,
    pending_lsb: u8,

    pub reload: u16,
    pub value: u16,
    pub output: bool,

    pub armed: bool,
    pub loaded: bool,
    pub enabled: bool,
    setup_delay: u8,

    latched_value: Option<u16>,
    /// How many more bytes of `latched_value` are left to read before the
    /// latch releases back to live counting (1 for `Lsb`/`Msb`, 2 for
    /// `LsbThenMsb` — spec.md §4.6).
    latch_bytes_left: u8,
    latch_delay: u8,
    pending_latch: bool,
}

impl Counter {
    fn new() -> Self {
        Self {
            mode: 0,
            bcd: false,
            write_mode: WriteMode::Lsb,
            lsb_then_msb_stage: 0,
            pending_lsb: 0,
            reload: 0,
            value: 0,
            output: false,
            armed: false,
            loaded: false,
            enabled: false,
            setup_delay: 0,
            latched_value: None,
            latch_bytes_left: 0,
            latch_delay: 0,
            pending_latch: false,
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    /// Decodes the per-counter portion of a control word: latch-select
    /// (bits 5:4), mode (bits 3:1), BCD (bit 0).
    fn write_control(&mut self, latch_select: u8, mode: u8, bcd: bool) {
        if latch_select == 0 {
            self.pending_latch = true;
            self.latch_delay = 1;
            return;
        }
        self.write_mode = match latch_select {
            1 => WriteMode::Lsb,
            2 => WriteMode::Msb,
            _ => WriteMode::LsbThenMsb,
        };
        self.lsb_then_msb_stage = 0;
        // Mode 6/7 alias mode 2/3 on real hardware (3-bit field, top bit
        // ignored for the two highest encodings).
        self.mode = if mode == 6 {
            2
        } else if mode == 7 {
            3
        } else {
            mode
        };
        self.bcd = bcd;
        self.armed = false;
        self.enabled = false;
        self.loaded = false;
        self.output = self.mode != 0;
    }

    fn write_data(&mut self, byte: u8) {
        match self.write_mode {
            WriteMode::Latch => {}
            WriteMode::Lsb => {
                self.reload = (self.reload & 0xFF00) | byte as u16;
                self.arm();
            }
            WriteMode::Msb => {
                self.reload = (self.reload & 0x00FF) | ((byte as u16) << 8);
                self.arm();
            }
            WriteMode::LsbThenMsb => {
                if self.lsb_then_msb_stage == 0 {
                    self.pending_lsb = byte;
                    self.lsb_then_msb_stage = 1;
                } else {
                    self.reload = ((byte as u16) << 8) | self.pending_lsb as u16;
                    self.lsb_then_msb_stage = 0;
                    self.arm();
                }
            }
        }
    }

    /// Decrements `self.value` by `amount`, treating it as four packed
    /// BCD digits (0-9999) rather than plain binary when `self.bcd` is
    /// set (spec.md §4.6 "BCD mode translates the load value").
    fn dec(&mut self, amount: u16) {
        self.value = if self.bcd {
            bin_to_bcd((bcd_to_bin(self.value).wrapping_sub(amount)) % 10000)
        } else {
            self.value.wrapping_sub(amount)
        };
    }

    fn arm(&mut self) {
        self.loaded = true;
        self.enabled = true;
        self.setup_delay = if self.mode == 4 || self.mode == 5 { 4 } else { 3 };
        self.armed = false;
    }

    fn read_data(&mut self) -> u8 {
        if let Some(latched) = self.latched_value {
            let byte = latched as u8;
            self.latch_bytes_left -= 1;
            if self.latch_bytes_left == 0 {
                // Both halves of the latch have now been read (or the
                // single half, for Lsb/Msb mode); release back to live
                // counting — one-shot per spec.md §4.6.
                self.latched_value = None;
            } else {
                self.latched_value = Some(latched >> 8);
            }
            return byte;
        }
        match self.write_mode {
            WriteMode::Msb => (self.value >> 8) as u8,
            _ => self.value as u8,
        }
    }

    fn tick(&mut self) {
        if self.latch_delay > 0 {
            self.latch_delay -= 1;
            if self.latch_delay == 0 && self.pending_latch {
                self.latched_value = Some(self.value);
                self.latch_bytes_left = if self.write_mode == WriteMode::LsbThenMsb { 2 } else { 1 };
                self.pending_latch = false;
            }
        }
        if self.setup_delay > 0 {
            self.setup_delay -= 1;
            if self.setup_delay == 0 {
                self.value = self.reload;
                self.armed = true;
            }
            return;
        }
        if !self.armed || !self.enabled {
            return;
        }
        match self.mode {
            0 => {
                // Interrupt-on-terminal-count: counts down once, output
                // goes (and stays) high on reaching zero.
                if self.value == 0 {
                    self.output = true;
                } else {
                    self.dec(1);
                    if self.value == 0 {
                        self.output = true;
                    }
                }
            }
            1 => {
                // Programmable one-shot; gate assumed permanently asserted,
                // so it free-runs, retriggering on every terminal count
                // (spec.md §4.6 "wraps on zero").
                if self.value == 0 {
                    self.output = true;
                    self.value = self.reload;
                } else {
                    self.output = false;
                    self.dec(1);
                }
            }
            2 => {
                // Rate generator: output low for exactly one tick at
                // terminal count, high otherwise, then auto-reload.
                if self.value <= 1 {
                    self.output = false;
                    self.value = self.reload;
                } else {
                    self.output = true;
                    self.dec(1);
                }
            }
            3 => {
                // Square wave: decrements by 2 per tick (3 on the first,
                // odd-valued tick), toggling output at zero.
                let step = if self.value & 1 != 0 { 3 } else { 2 };
                if self.value <= step {
                    self.output = !self.output;
                    self.value = self.reload;
                } else {
                    self.dec(step);
                }
            }
            _ => {
                // Modes 4/5 (software/hardware triggered strobe): not
                // fully modeled (spec.md §4.6 only details modes 0-3); a
                // plain free-running counter with no strobe pulse.
                if self.value == 0 {
                    self.value = self.reload;
                } else {
                    self.dec(1);
                }
            }
        }
    }
}

/// Three independent i8253 counters sharing one control-word port.
pub struct Timer8253 {
    pub counters: [Counter; 3],
}

impl Timer8253 {
    pub fn new() -> Self {
        Self {
            counters: [Counter::new(), Counter::new(), Counter::new()],
        }
    }

    pub fn reset(&mut self) {
        for c in &mut self.counters {
            c.reset();
        }
    }

    /// Decodes `(counter, mode, latch-select, bcd)` from the control-word
    /// port (spec.md §4.6).
    pub fn write_control_word(&mut self, value: u8) {
        let counter = (value >> 6) & 0x03;
        if counter == 3 {
            return; // read-back command, not modeled
        }
        let latch_select = (value >> 4) & 0x03;
        let mode = (value >> 1) & 0x07;
        let bcd = value & 0x01 != 0;
        self.counters[counter as usize].write_control(latch_select, mode, bcd);
    }

    pub fn write_data(&mut self, counter: u8, value: u8) {
        self.counters[counter as usize].write_data(value);
    }

    pub fn read_data(&mut self, counter: u8) -> u8 {
        self.counters[counter as usize].read_data()
    }

    /// Advances all three counters by `cycles` ticks, returning the
    /// average of their boolean outputs as a float sample for the audio
    /// mixer (spec.md §4.6).
    pub fn clock(&mut self, cycles: u32) -> f32 {
        for _ in 0..cycles {
            for c in &mut self.counters {
                c.tick();
            }
        }
        let sum: u32 = self.counters.iter().map(|c| c.output as u32).sum();
        sum as f32 / 3.0
    }
}

impl Default for Timer8253 {
    fn default() -> Self {
        Self::new()
    }
}

/// Unpacks four BCD digits (0-9999) into a plain binary value.
fn bcd_to_bin(value: u16) -> u16 {
    let d0 = value & 0xF;
    let d1 = (value >> 4) & 0xF;
    let d2 = (value >> 8) & 0xF;
    let d3 = (value >> 12) & 0xF;
    d3 * 1000 + d2 * 100 + d1 * 10 + d0
}

/// Packs a binary value (0-9999) back into four BCD digits.
fn bin_to_bcd(value: u16) -> u16 {
    let d0 = value % 10;
    let d1 = (value / 10) % 10;
    let d2 = (value / 100) % 10;
    let d3 = (value / 1000) % 10;
    (d3 << 12) | (d2 << 8) | (d1 << 4) | d0
}
