//! I/O group: IN/OUT. Port space is 8 bits wide but shares the bus's
//! 16-bit address type; the port byte is zero-extended.

use super::I8080;
use crate::core::{Bus, BusMaster};

impl I8080 {
    /// IN port: mc1 fetches the port byte, mc2 reads it through the bus's
    /// I/O address space into A.
    pub(crate) fn op_in<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        mc: u8,
        bus: &mut B,
        master: BusMaster,
    ) -> bool {
        match mc {
            1 => {
                self.tmp = bus.read(master, self.pc);
                self.pc = self.pc.wrapping_add(1);
            }
            2 => self.a = bus.io_read(master, self.tmp as u16),
            _ => unreachable!(),
        }
        false
    }

    /// OUT port: mc1 fetches the port byte, mc2 writes A through the bus's
    /// I/O address space. The board defers the visible effect of this
    /// write behind a commit timer (spec.md §4.3) — the CPU itself has no
    /// notion of that delay.
    pub(crate) fn op_out<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        mc: u8,
        bus: &mut B,
        master: BusMaster,
    ) -> bool {
        match mc {
            1 => {
                self.tmp = bus.read(master, self.pc);
                self.pc = self.pc.wrapping_add(1);
            }
            2 => bus.io_write(master, self.tmp as u16, self.a),
            _ => unreachable!(),
        }
        false
    }
}
