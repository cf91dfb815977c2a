//! WD1793-compatible floppy disk controller (spec.md §4.8).
//!
//! Grounded on `device/i8257.rs` — the teacher's only other "controller
//! with a command register, a transfer-length countdown, and DMA-style
//! address stepping" device — for the command-decode-by-high-nibble shape
//! and the `rw_len`/`ptr` countdown pattern, and on
//! `machines/src/rom_loader.rs`'s CHS-style offset arithmetic for the
//! sector-offset formula.

use crate::error::CoreError;

pub const SIDES: usize = 2;
pub const TRACKS: usize = 82;
pub const SECTORS_PER_TRACK: usize = 5;
pub const SECTOR_LEN: usize = 1024;
pub const FDD_SIZE: usize = SIDES * TRACKS * SECTORS_PER_TRACK * SECTOR_LEN;

pub const F_BUSY: u8 = 0x01;
pub const F_DRQ: u8 = 0x02;
pub const F_LOSTDATA: u8 = 0x04;
pub const F_CRCERR: u8 = 0x08;
pub const F_TRACK0: u8 = 0x04;
pub const F_NOTFOUND: u8 = 0x10;
pub const F_HEADLOADED: u8 = 0x20;
pub const F_WRITEPROTECT: u8 = 0x40;
pub const F_NOTREADY: u8 = 0x80;

/// One drive's backing store plus mount bookkeeping.
pub struct FloppyDrive {
    pub data: Vec<u8>,
    pub mounted: bool,
    pub updated: bool,
    pub reads: u64,
    pub writes: u64,
}

impl FloppyDrive {
    fn new() -> Self {
        Self {
            data: Vec::new(),
            mounted: false,
            updated: false,
            reads: 0,
            writes: 0,
        }
    }

    /// Loads a raw CHS image, truncating to `FDD_SIZE` (spec.md §4.8:
    /// "images larger than 820 KiB are truncated on load").
    pub fn mount(&mut self, mut image: Vec<u8>) {
        image.truncate(FDD_SIZE);
        image.resize(FDD_SIZE, 0);
        self.data = image;
        self.mounted = true;
        self.updated = false;
    }

    pub fn dismount(&mut self) -> Vec<u8> {
        self.mounted = false;
        std::mem::take(&mut self.data)
    }
}

impl Default for FloppyDrive {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    None,
    ReadSector,
    WriteSector,
    ReadAddress,
    WriteTrack,
}

pub struct Fdc1793 {
    pub drives: [FloppyDrive; 4],
    pub drive_idx: u8,
    pub side: u8,

    pub status: u8,
    pub track: u8,
    pub sector: u8,
    pub data: u8,
    pub system: u8,

    pub irq: bool,
    pub drq: bool,

    last_step_dir: i8,
    command: Command,
    multi: bool,
    pub rw_len: usize,
    pub ptr: usize,
    watchdog: u16,

    header: (u8, u8, u8),
    read_address_stage: [u8; 6],
    read_address_pos: u8,
}

impl Fdc1793 {
    pub fn new() -> Self {
        Self {
            drives: [
                FloppyDrive::new(),
                FloppyDrive::new(),
                FloppyDrive::new(),
                FloppyDrive::new(),
            ],
            drive_idx: 0,
            side: 0,
            status: F_TRACK0,
            track: 0,
            sector: 1,
            data: 0,
            system: 0,
            irq: false,
            drq: false,
            last_step_dir: 1,
            command: Command::None,
            multi: false,
            rw_len: 0,
            ptr: 0,
            watchdog: 0,
            header: (0, 0, 0),
            read_address_stage: [0; 6],
            read_address_pos: 0,
        }
    }

    pub fn reset(&mut self) {
        let drives = std::mem::replace(
            &mut self.drives,
            [
                FloppyDrive::new(),
                FloppyDrive::new(),
                FloppyDrive::new(),
                FloppyDrive::new(),
            ],
        );
        *self = Self::new();
        self.drives = drives;
    }

    pub fn mount(&mut self, drive: usize, image: Vec<u8>) -> Result<(), CoreError> {
        if drive >= self.drives.len() {
            return Err(CoreError::InvalidDriveIndex(drive as u8));
        }
        self.drives[drive].mount(image);
        Ok(())
    }

    pub fn dismount(&mut self, drive: usize) -> Result<Vec<u8>, CoreError> {
        if drive >= self.drives.len() {
            return Err(CoreError::InvalidDriveIndex(drive as u8));
        }
        Ok(self.drives[drive].dismount())
    }

    fn active(&self) -> &FloppyDrive {
        &self.drives[self.drive_idx as usize]
    }

    fn seek(&mut self, side: u8, track: u8, sector: u8) -> Option<usize> {
        if !self.active().mounted {
            return None;
        }
        let position = (SECTORS_PER_TRACK
            * (track as usize * SIDES + side as usize)
            + sector.saturating_sub(1) as usize)
            * SECTOR_LEN;
        if position + SECTOR_LEN > self.active().data.len() {
            return None;
        }
        self.header = (track, side, sector);
        Some(position)
    }

    pub fn write_system(&mut self, value: u8) {
        self.system = value;
        self.side = if value & 0x04 != 0 { 0 } else { 1 };
        self.drive_idx = value & 0x03;
    }

    pub fn read_status(&mut self) -> u8 {
        self.tick_watchdog();
        let mut status = self.status;
        if !self.active().mounted {
            status |= F_NOTREADY;
        } else {
            status &= !F_NOTREADY;
        }
        status
    }

    fn tick_watchdog(&mut self) {
        if self.command == Command::None {
            return;
        }
        if self.watchdog == 0 {
            self.status |= F_LOSTDATA;
            self.end_transfer();
            return;
        }
        self.watchdog -= 1;
    }

    pub fn write_command(&mut self, value: u8) {
        self.irq = false;
        match value >> 4 {
            0x0 => {
                self.track = 0;
                self.status |= F_TRACK0;
            }
            0x1 => {
                self.track = self.data;
                self.status = if self.track == 0 {
                    self.status | F_TRACK0
                } else {
                    self.status & !F_TRACK0
                };
            }
            0x2..=0x7 => {
                let step_in = value & 0x20 != 0;
                let update_track = value & 0x10 != 0;
                let dir: i8 = if value & 0x40 == 0 {
                    // STEP: repeats the last direction used.
                    self.last_step_dir
                } else if step_in {
                    1
                } else {
                    -1
                };
                self.last_step_dir = dir;
                self.track = (self.track as i16 + dir as i16).clamp(0, 255) as u8;
                if update_track {
                    self.data = self.track;
                }
                self.status = if self.track == 0 {
                    self.status | F_TRACK0
                } else {
                    self.status & !F_TRACK0
                };
            }
            0x8 | 0x9 => {
                self.multi = value & 0x10 != 0;
                if let Some(pos) = self.seek(self.side, self.track, self.sector) {
                    self.ptr = pos;
                    self.rw_len = SECTOR_LEN
                        * if self.multi {
                            SECTORS_PER_TRACK - self.sector as usize + 1
                        } else {
                            1
                        };
                    self.command = Command::ReadSector;
                    self.status |= F_BUSY | F_DRQ;
                    self.drq = true;
                    self.watchdog = 255;
                } else {
                    self.status |= F_NOTFOUND;
                }
            }
            0xA | 0xB => {
                self.multi = value & 0x10 != 0;
                if let Some(pos) = self.seek(self.side, self.track, self.sector) {
                    self.ptr = pos;
                    self.rw_len = SECTOR_LEN
                        * if self.multi {
                            SECTORS_PER_TRACK - self.sector as usize + 1
                        } else {
                            1
                        };
                    self.command = Command::WriteSector;
                    self.status |= F_BUSY | F_DRQ;
                    self.drq = true;
                    self.watchdog = 255;
                    self.drives[self.drive_idx as usize].updated = true;
                } else {
                    self.status |= F_NOTFOUND;
                }
            }
            0xC => {
                let mut found = false;
                for sector in 0..=255u16 {
                    if self.seek(self.side, self.track, sector as u8).is_some() {
                        self.header = (self.track, self.side, sector as u8);
                        found = true;
                        break;
                    }
                }
                if found {
                    let (t, s, sec) = self.header;
                    self.read_address_stage = [t, s, sec, 0, 0, 0];
                    self.read_address_pos = 0;
                    self.command = Command::ReadAddress;
                    self.status |= F_BUSY | F_DRQ;
                    self.drq = true;
                    self.watchdog = 255;
                } else {
                    self.status |= F_NOTFOUND;
                }
            }
            0xD => {
                self.end_transfer();
                if value & 0x08 != 0 {
                    self.irq = true;
                }
            }
            0xE => {
                // READ-TRACK: not implemented (spec.md §4.8).
            }
            0xF => {
                self.command = Command::WriteTrack;
                if self.active().mounted {
                    for side in 0..SIDES as u8 {
                        for sector in 1..=SECTORS_PER_TRACK as u8 {
                            if let Some(pos) = self.seek(side, self.track, sector) {
                                self.drives[self.drive_idx as usize].data[pos..pos + SECTOR_LEN]
                                    .fill(0xE5);
                            }
                        }
                    }
                    self.drives[self.drive_idx as usize].updated = true;
                }
                self.end_transfer();
            }
            _ => unreachable!(),
        }
    }

    fn end_transfer(&mut self) {
        self.command = Command::None;
        self.rw_len = 0;
        self.status &= !(F_BUSY | F_DRQ);
        self.drq = false;
        self.irq = true;
    }

    pub fn read_data(&mut self) -> u8 {
        match self.command {
            Command::ReadSector => {
                let byte = self
                    .active()
                    .data
                    .get(self.ptr)
                    .copied()
                    .unwrap_or(0xFF);
                self.advance();
                self.drives[self.drive_idx as usize].reads += 1;
                byte
            }
            Command::ReadAddress => {
                let byte = self.read_address_stage[self.read_address_pos as usize];
                self.read_address_pos += 1;
                if self.read_address_pos as usize >= self.read_address_stage.len() {
                    self.end_transfer();
                }
                byte
            }
            _ => self.data,
        }
    }

    pub fn write_data(&mut self, value: u8) {
        self.data = value;
        if self.command == Command::WriteSector {
            if self.ptr < self.drives[self.drive_idx as usize].data.len() {
                self.drives[self.drive_idx as usize].data[self.ptr] = value;
            }
            self.advance();
            self.drives[self.drive_idx as usize].writes += 1;
        }
    }

    fn advance(&mut self) {
        self.ptr += 1;
        if self.rw_len > 0 {
            self.rw_len -= 1;
        }
        if self.rw_len != 0 && self.rw_len & (SECTOR_LEN - 1) == 0 {
            self.sector = self.sector.wrapping_add(1);
        }
        if self.rw_len == 0 {
            self.end_transfer();
        } else {
            self.watchdog = 255;
        }
    }
}

impl Default for Fdc1793 {
    fn default() -> Self {
        Self::new()
    }
}
