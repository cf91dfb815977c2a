//! Data transfer group: MOV, MVI, LXI, STAX/LDAX, SHLD/LHLD, STA/LDA.

use super::I8080;
use crate::core::{Bus, BusMaster};

impl I8080 {
    /// MOV dst,src for 0x40..=0x7F (0x76 / HLT is intercepted by the
    /// top-level dispatcher before reaching here). `dst`/`src == 6` select
    /// the `(HL)` memory operand; both can't be 6 simultaneously since that
    /// slot is HLT.
    pub(crate) fn op_mov<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        op: u8,
        bus: &mut B,
        master: BusMaster,
    ) -> bool {
        let dst = (op >> 3) & 0x07;
        let src = op & 0x07;
        if src == 6 {
            let val = bus.read(master, self.get_hl());
            self.set_reg8(dst, val);
        } else if dst == 6 {
            let val = self.get_reg8(src);
            bus.write(master, self.get_hl(), val);
        } else {
            let val = self.get_reg8(src);
            self.set_reg8(dst, val);
        }
        false
    }

    /// MVI r, d8 (register form finishes inline on the fetch's mc).
    pub(crate) fn op_mvi_reg<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        op: u8,
        bus: &mut B,
        master: BusMaster,
    ) -> bool {
        let r = (op >> 3) & 0x07;
        let val = bus.read(master, self.pc);
        self.pc = self.pc.wrapping_add(1);
        self.set_reg8(r, val);
        false
    }

    /// MVI M, d8: mc1 fetches the immediate into `tmp`, mc2 writes it to
    /// `(HL)`.
    pub(crate) fn op_mvi_m<B: Bus<Address = u16, Data = u8> + ?Sized>(
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
            2 => bus.write(master, self.get_hl(), self.tmp),
            _ => unreachable!(),
        }
        false
    }

    /// LXI rp, d16: mc1 fetches the low byte into `tmp`, mc2 fetches the
    /// high byte and latches the full pair into `wz`, mc3 commits `wz`
    /// into the register pair.
    pub(crate) fn op_lxi<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        op: u8,
        mc: u8,
        bus: &mut B,
        master: BusMaster,
    ) -> bool {
        match mc {
            1 => {
                self.tmp = bus.read(master, self.pc);
                self.pc = self.pc.wrapping_add(1);
            }
            2 => {
                let hi = bus.read(master, self.pc);
                self.pc = self.pc.wrapping_add(1);
                self.wz = ((hi as u16) << 8) | self.tmp as u16;
            }
            3 => {
                let rp = (op >> 4) & 0x03;
                self.set_rp(rp, self.wz);
            }
            _ => unreachable!(),
        }
        false
    }

    /// STAX B / STAX D: write A to `(rp)`.
    pub(crate) fn op_stax<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        op: u8,
        bus: &mut B,
        master: BusMaster,
    ) -> bool {
        let rp = (op >> 4) & 0x01;
        let addr = self.get_rp(rp);
        bus.write(master, addr, self.a);
        false
    }

    /// LDAX B / LDAX D: read A from `(rp)`.
    pub(crate) fn op_ldax<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        op: u8,
        bus: &mut B,
        master: BusMaster,
    ) -> bool {
        let rp = (op >> 4) & 0x01;
        let addr = self.get_rp(rp);
        self.a = bus.read(master, addr);
        false
    }

    /// SHLD addr: mc1/mc2 fetch the 16-bit address into `wz`, mc3 writes L,
    /// mc4 writes H at `wz+1` — the only data-transfer opcode with two
    /// memory writes.
    pub(crate) fn op_shld<B: Bus<Address = u16, Data = u8> + ?Sized>(
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
            2 => {
                let hi = bus.read(master, self.pc);
                self.pc = self.pc.wrapping_add(1);
                self.wz = ((hi as u16) << 8) | self.tmp as u16;
            }
            3 => bus.write(master, self.wz, self.l),
            4 => bus.write(master, self.wz.wrapping_add(1), self.h),
            _ => unreachable!(),
        }
        false
    }

    pub(crate) fn op_lhld<B: Bus<Address = u16, Data = u8> + ?Sized>(
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
            2 => {
                let hi = bus.read(master, self.pc);
                self.pc = self.pc.wrapping_add(1);
                self.wz = ((hi as u16) << 8) | self.tmp as u16;
            }
            3 => self.l = bus.read(master, self.wz),
            4 => self.h = bus.read(master, self.wz.wrapping_add(1)),
            _ => unreachable!(),
        }
        false
    }

    pub(crate) fn op_sta<B: Bus<Address = u16, Data = u8> + ?Sized>(
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
            2 => {
                let hi = bus.read(master, self.pc);
                self.pc = self.pc.wrapping_add(1);
                self.wz = ((hi as u16) << 8) | self.tmp as u16;
            }
            3 => bus.write(master, self.wz, self.a),
            _ => unreachable!(),
        }
        false
    }

    pub(crate) fn op_lda<B: Bus<Address = u16, Data = u8> + ?Sized>(
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
            2 => {
                let hi = bus.read(master, self.pc);
                self.pc = self.pc.wrapping_add(1);
                self.wz = ((hi as u16) << 8) | self.tmp as u16;
            }
            3 => self.a = bus.read(master, self.wz),
            _ => unreachable!(),
        }
        false
    }

    pub(crate) fn op_xchg(&mut self) -> bool {
        let hl = self.get_hl();
        self.set_hl(self.get_de());
        self.set_de(hl);
        false
    }
}
