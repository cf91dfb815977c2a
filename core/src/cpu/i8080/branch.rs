//! Branch group: JMP/Jcc, CALL/Ccc, RET (shared by Rcc's taken path), RST,
//! PCHL, and the step-over target resolver (spec.md §4.10).

use super::I8080;
use super::tables::{self, InstrType};
use crate::core::{Bus, BusMaster};

impl I8080 {
    fn push_byte<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        val: u8,
    ) {
        self.sp = self.sp.wrapping_sub(1);
        bus.write_stack(master, self.sp, val);
    }

    fn pop_byte<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) -> u8 {
        let val = bus.read_stack(master, self.sp);
        self.sp = self.sp.wrapping_add(1);
        val
    }

    fn fetch_addr_byte<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) -> u8 {
        let b = bus.read(master, self.pc);
        self.pc = self.pc.wrapping_add(1);
        b
    }

    /// JMP addr (0xC3 and the undocumented 0xCB alias): mc1 fetches the
    /// low address byte, mc2 fetches the high byte and jumps.
    pub(crate) fn op_jmp<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        mc: u8,
        bus: &mut B,
        master: BusMaster,
    ) -> bool {
        match mc {
            1 => self.tmp = self.fetch_addr_byte(bus, master),
            2 => {
                let hi = self.fetch_addr_byte(bus, master);
                self.wz = ((hi as u16) << 8) | self.tmp as u16;
                self.pc = self.wz;
            }
            _ => unreachable!(),
        }
        false
    }

    /// Jcc addr: same mc shape as JMP, but the jump only commits if the
    /// condition holds (mc count is unconditional — spec.md §4.2).
    pub(crate) fn op_jcc<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        op: u8,
        mc: u8,
        bus: &mut B,
        master: BusMaster,
    ) -> bool {
        match mc {
            1 => self.tmp = self.fetch_addr_byte(bus, master),
            2 => {
                let hi = self.fetch_addr_byte(bus, master);
                self.wz = ((hi as u16) << 8) | self.tmp as u16;
                if self.test_condition(op >> 3) {
                    self.pc = self.wz;
                }
            }
            _ => unreachable!(),
        }
        false
    }

    /// CALL addr (0xCD and the undocumented 0xDD/0xED/0xFD aliases).
    pub(crate) fn op_call<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        mc: u8,
        bus: &mut B,
        master: BusMaster,
    ) -> bool {
        match mc {
            1 => self.tmp = self.fetch_addr_byte(bus, master),
            2 => {
                let hi = self.fetch_addr_byte(bus, master);
                self.wz = ((hi as u16) << 8) | self.tmp as u16;
            }
            3 => {
                let hi = (self.pc >> 8) as u8;
                self.push_byte(bus, master, hi);
            }
            4 => {
                let lo = self.pc as u8;
                self.push_byte(bus, master, lo);
                self.pc = self.wz;
            }
            _ => unreachable!(),
        }
        false
    }

    /// Ccc addr: when the condition is false the push phase is skipped
    /// entirely and the instruction completes after consuming just the
    /// operand bytes (spec.md §4.2), signalled by returning `true`.
    pub(crate) fn op_ccc<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        op: u8,
        mc: u8,
        bus: &mut B,
        master: BusMaster,
    ) -> bool {
        match mc {
            1 => {
                self.tmp = self.fetch_addr_byte(bus, master);
                false
            }
            2 => {
                let hi = self.fetch_addr_byte(bus, master);
                self.wz = ((hi as u16) << 8) | self.tmp as u16;
                !self.test_condition(op >> 3)
            }
            3 => {
                let hi = (self.pc >> 8) as u8;
                self.push_byte(bus, master, hi);
                false
            }
            4 => {
                let lo = self.pc as u8;
                self.push_byte(bus, master, lo);
                self.pc = self.wz;
                false
            }
            _ => unreachable!(),
        }
    }

    /// RET (0xC9 and the undocumented 0xD9 alias), and the taken path of
    /// Rcc — the untaken path is resolved without entering this function
    /// at all (spec.md §4.2: "takes only the initial machine cycle").
    pub(crate) fn op_ret<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        mc: u8,
        bus: &mut B,
        master: BusMaster,
    ) -> bool {
        match mc {
            1 => self.tmp = self.pop_byte(bus, master),
            2 => {
                let hi = self.pop_byte(bus, master);
                self.wz = ((hi as u16) << 8) | self.tmp as u16;
                self.pc = self.wz;
            }
            _ => unreachable!(),
        }
        false
    }

    /// RST n: pushes the return address and jumps to `n * 8`.
    pub(crate) fn op_rst<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        op: u8,
        mc: u8,
        bus: &mut B,
        master: BusMaster,
    ) -> bool {
        match mc {
            1 => {
                let hi = (self.pc >> 8) as u8;
                self.push_byte(bus, master, hi);
            }
            2 => {
                let lo = self.pc as u8;
                self.push_byte(bus, master, lo);
                let vector = ((op >> 3) & 0x07) as u16;
                self.pc = vector * 8;
            }
            _ => unreachable!(),
        }
        false
    }

    /// Given the opcode at `pc` (without executing it), returns the address
    /// a "step over" debugger command should run to — spec.md §4.10.
    pub fn resolve_step_over<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &self,
        bus: &mut B,
        master: BusMaster,
    ) -> u16 {
        let op = bus.read(master, self.pc);
        let next_pc = self.pc.wrapping_add(tables::BYTE_LEN[op as usize] as u16);

        fn read_addr_operand<B: Bus<Address = u16, Data = u8> + ?Sized>(
            bus: &mut B,
            master: BusMaster,
            pc: u16,
        ) -> u16 {
            let lo = bus.read(master, pc.wrapping_add(1));
            let hi = bus.read(master, pc.wrapping_add(2));
            ((hi as u16) << 8) | lo as u16
        }

        fn read_stack_top<B: Bus<Address = u16, Data = u8> + ?Sized>(
            bus: &mut B,
            master: BusMaster,
            sp: u16,
        ) -> u16 {
            let lo = bus.read_stack(master, sp);
            let hi = bus.read_stack(master, sp.wrapping_add(1));
            ((hi as u16) << 8) | lo as u16
        }

        match tables::INSTR_TYPE[op as usize] {
            InstrType::Other => next_pc,
            InstrType::Jmp | InstrType::Cal => read_addr_operand(bus, master, self.pc),
            InstrType::Rst => (((op >> 3) & 0x07) as u16) * 8,
            InstrType::Pch => self.get_hl(),
            InstrType::Ret => read_stack_top(bus, master, self.sp),
            InstrType::J | InstrType::C => {
                if self.test_condition(op >> 3) {
                    read_addr_operand(bus, master, self.pc)
                } else {
                    next_pc
                }
            }
            InstrType::R => {
                if self.test_condition(op >> 3) {
                    read_stack_top(bus, master, self.sp)
                } else {
                    next_pc
                }
            }
        }
    }
}
