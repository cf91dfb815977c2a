//! i8080 microcoded instruction engine (Vector-06C board CPU).
//!
//! Mirrors the shape of `cpu::z80`: a struct holding architectural and
//! internal registers plus an `ExecState`, with `execute_cycle` driving one
//! machine cycle per call. The i8080 has no prefix bytes, so `ExecState` is
//! much flatter than the Z80's: just `Fetch`, `Execute(opcode, mc)` and
//! `Interrupt(mc)` (the RST7 injection sequence, itself just a 3-mc RST
//! dispatch once IR is forced to 0xFF).

mod alu;
mod branch;
mod flags;
mod io;
mod load_store;
mod stack;
pub mod tables;

pub use flags::Flag;
pub use tables::InstrType;

use crate::core::{
    Bus, BusMaster,
    bus::InterruptState,
    component::{BusMasterComponent, Component},
};
use crate::cpu::{
    Cpu,
    state::{CpuStateTrait, I8080State},
};

#[derive(Clone, Copy, Debug)]
pub(crate) enum ExecState {
    /// `mc == 0`: about to fetch (or service a pending interrupt).
    Fetch,
    /// Mid-instruction; carries the latched opcode and current `mc` index.
    Execute(u8, u8),
}

pub struct I8080 {
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,

    // Internal registers (spec.md §3: IR, TMP, ACT, WZ).
    pub(crate) ir: u8,
    pub(crate) tmp: u8,
    pub(crate) act: u8,
    pub(crate) wz: u16,

    pub(crate) inte: bool,
    pub(crate) iff: bool,
    pub(crate) hlta: bool,
    pub(crate) ei_pending: bool,
    pub cc: u64,

    pub(crate) state: ExecState,
}

impl Default for I8080 {
    fn default() -> Self {
        Self::new()
    }
}

impl I8080 {
    pub fn new() -> Self {
        Self {
            a: 0,
            f: flags::pack(0),
            b: 0,
            c: 0,
            d: 0,
            e: 0,
            h: 0,
            l: 0,
            sp: 0,
            pc: 0,
            ir: 0,
            tmp: 0,
            act: 0,
            wz: 0,
            inte: false,
            iff: false,
            hlta: false,
            ei_pending: false,
            cc: 0,
            state: ExecState::Fetch,
        }
    }

    pub fn get_bc(&self) -> u16 {
        ((self.b as u16) << 8) | self.c as u16
    }
    pub fn set_bc(&mut self, val: u16) {
        self.b = (val >> 8) as u8;
        self.c = val as u8;
    }
    pub fn get_de(&self) -> u16 {
        ((self.d as u16) << 8) | self.e as u16
    }
    pub fn set_de(&mut self, val: u16) {
        self.d = (val >> 8) as u8;
        self.e = val as u8;
    }
    pub fn get_hl(&self) -> u16 {
        ((self.h as u16) << 8) | self.l as u16
    }
    pub fn set_hl(&mut self, val: u16) {
        self.h = (val >> 8) as u8;
        self.l = val as u8;
    }
    pub fn get_af(&self) -> u16 {
        ((self.a as u16) << 8) | self.f as u16
    }
    pub fn set_af(&mut self, val: u16) {
        self.a = (val >> 8) as u8;
        self.f = flags::pack(val as u8);
    }

    /// 8-bit register by index: 0=B 1=C 2=D 3=E 4=H 5=L 7=A. Index 6 (M,
    /// the `(HL)` memory operand) is handled by callers since it needs
    /// bus access, not a register read.
    pub fn get_reg8(&self, index: u8) -> u8 {
        match index {
            0 => self.b,
            1 => self.c,
            2 => self.d,
            3 => self.e,
            4 => self.h,
            5 => self.l,
            7 => self.a,
            _ => unreachable!("get_reg8 called with index {index}"),
        }
    }

    pub fn set_reg8(&mut self, index: u8, val: u8) {
        match index {
            0 => self.b = val,
            1 => self.c = val,
            2 => self.d = val,
            3 => self.e = val,
            4 => self.h = val,
            5 => self.l = val,
            7 => self.a = val,
            _ => unreachable!("set_reg8 called with index {index}"),
        }
    }

    /// 16-bit register pair by index for LXI/DAD/INX/DCX/LDAX/STAX: 0=BC 1=DE 2=HL 3=SP.
    pub(crate) fn get_rp(&self, index: u8) -> u16 {
        match index {
            0 => self.get_bc(),
            1 => self.get_de(),
            2 => self.get_hl(),
            3 => self.sp,
            _ => unreachable!("get_rp called with index {index}"),
        }
    }

    pub(crate) fn set_rp(&mut self, index: u8, val: u16) {
        match index {
            0 => self.set_bc(val),
            1 => self.set_de(val),
            2 => self.set_hl(val),
            3 => self.sp = val,
            _ => unreachable!("set_rp called with index {index}"),
        }
    }

    /// 16-bit register pair by index for PUSH/POP: 0=BC 1=DE 2=HL 3=PSW (A+F).
    pub(crate) fn get_rp_psw(&self, index: u8) -> u16 {
        match index {
            0 => self.get_bc(),
            1 => self.get_de(),
            2 => self.get_hl(),
            3 => self.get_af(),
            _ => unreachable!("get_rp_psw called with index {index}"),
        }
    }

    pub(crate) fn set_rp_psw(&mut self, index: u8, val: u16) {
        match index {
            0 => self.set_bc(val),
            1 => self.set_de(val),
            2 => self.set_hl(val),
            3 => self.set_af(val),
            _ => unreachable!("set_rp_psw called with index {index}"),
        }
    }

    fn flag(&self, f: Flag) -> bool {
        (self.f & f as u8) != 0
    }

    fn set_flag(&mut self, f: Flag, on: bool) {
        if on {
            self.f |= f as u8;
        } else {
            self.f &= !(f as u8);
        }
        self.f = flags::pack(self.f);
    }

    /// Evaluates one of the eight condition codes used by Jcc/Ccc/Rcc,
    /// selected by the 3-bit field at bits 3..5 of the opcode.
    fn test_condition(&self, cc: u8) -> bool {
        match cc & 0x07 {
            0 => !self.flag(Flag::Z),  // NZ
            1 => self.flag(Flag::Z),   // Z
            2 => !self.flag(Flag::C),  // NC
            3 => self.flag(Flag::C),   // C
            4 => !self.flag(Flag::P),  // PO
            5 => self.flag(Flag::P),   // PE
            6 => !self.flag(Flag::S),  // P (sign clear)
            7 => self.flag(Flag::S),   // M (sign set)
            _ => unreachable!(),
        }
    }

    /// Drives one machine cycle. Returns true at an instruction boundary
    /// (`mc` returned to 0).
    pub fn execute_cycle<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) {
        match self.state {
            ExecState::Fetch => self.fetch_or_interrupt(bus, master),
            ExecState::Execute(op, mc) => self.dispatch(op, mc, bus, master),
        }
        self.cc = self.cc.wrapping_add(4);
    }

    fn fetch_or_interrupt<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) {
        if self.iff && self.inte && !self.ei_pending {
            self.inte = false;
            self.iff = false;
            self.hlta = false;
            self.ir = 0xFF; // RST 7 — real hardware drives this onto the bus during INTA
            let _ = bus.check_interrupts(master); // acknowledge, for bus-side bookkeeping
        } else {
            self.ei_pending = false;
            self.ir = bus.read(master, self.pc);
            self.pc = self.pc.wrapping_add(1);
        }

        // Untaken Rcc resolves within this very machine cycle: no operand
        // bytes to consume, so there is nothing left for `dispatch` to do
        // (spec.md §4.2: "RET with false condition takes only the initial
        // machine cycle").
        if tables::INSTR_TYPE[self.ir as usize] == InstrType::R
            && !self.test_condition(self.ir >> 3)
        {
            self.state = ExecState::Fetch;
            return;
        }

        let mc_count = tables::MC_COUNT[self.ir as usize];
        if mc_count == 1 {
            self.dispatch(self.ir, 1, bus, master);
            self.state = ExecState::Fetch;
        } else {
            self.state = ExecState::Execute(self.ir, 1);
        }
    }

    /// `mc` is the post-fetch step number (1-based). An opcode with a
    /// published `mc_count` of N runs the fetch plus `N - 1` dispatched
    /// steps, so this terminates once `mc == mc_count - 1`.
    fn dispatch<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        op: u8,
        mc: u8,
        bus: &mut B,
        master: BusMaster,
    ) {
        let mc_count = tables::MC_COUNT[op as usize];
        let done_early = self.execute_opcode(op, mc, bus, master);
        if done_early || mc + 1 >= mc_count {
            self.state = ExecState::Fetch;
        } else {
            self.state = ExecState::Execute(op, mc + 1);
        }
    }

    /// Executes the micro-step for `op` at post-fetch step `mc`. Returns
    /// true when the instruction should complete immediately regardless of
    /// the opcode's published `mc_count` (the untaken path of Ccc).
    fn execute_opcode<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        op: u8,
        mc: u8,
        bus: &mut B,
        master: BusMaster,
    ) -> bool {
        match op {
            // NOP and its undocumented aliases.
            0x00 | 0x08 | 0x10 | 0x18 | 0x20 | 0x28 | 0x30 | 0x38 => false,
            0x76 => {
                self.hlta = true;
                self.pc = self.pc.wrapping_sub(1);
                false
            }
            0x40..=0x7F => self.op_mov(op, bus, master),
            0x80..=0xBF => self.op_alu_reg(op, bus, master),
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
                self.op_alu_imm(op, bus, master)
            }
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x3C => self.op_inr_reg(op),
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x3D => self.op_dcr_reg(op),
            0x34 => self.op_inr_m(mc, bus, master),
            0x35 => self.op_dcr_m(mc, bus, master),
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x3E => self.op_mvi_reg(op, bus, master),
            0x36 => self.op_mvi_m(mc, bus, master),
            0x01 | 0x11 | 0x21 | 0x31 => self.op_lxi(op, mc, bus, master),
            0x02 | 0x12 => self.op_stax(op, bus, master),
            0x0A | 0x1A => self.op_ldax(op, bus, master),
            0x22 => self.op_shld(mc, bus, master),
            0x2A => self.op_lhld(mc, bus, master),
            0x32 => self.op_sta(mc, bus, master),
            0x3A => self.op_lda(mc, bus, master),
            0x03 | 0x13 | 0x23 | 0x33 => {
                let rp = (op >> 4) & 0x03;
                let val = self.get_rp(rp).wrapping_add(1);
                self.set_rp(rp, val);
                false
            }
            0x0B | 0x1B | 0x2B | 0x3B => {
                let rp = (op >> 4) & 0x03;
                let val = self.get_rp(rp).wrapping_sub(1);
                self.set_rp(rp, val);
                false
            }
            0x09 | 0x19 | 0x29 | 0x39 => self.op_dad(op),
            0x07 => self.op_rlc(),
            0x0F => self.op_rrc(),
            0x17 => self.op_ral(),
            0x1F => self.op_rar(),
            0x27 => self.op_daa(),
            0x2F => self.op_cma(),
            0x37 => self.op_stc(),
            0x3F => self.op_cmc(),
            0xEB => self.op_xchg(),
            0xC3 | 0xCB => self.op_jmp(mc, bus, master),
            0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => {
                self.op_jcc(op, mc, bus, master)
            }
            0xCD | 0xDD | 0xED | 0xFD => self.op_call(mc, bus, master),
            0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => {
                self.op_ccc(op, mc, bus, master)
            }
            0xC9 | 0xD9 | 0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => {
                // Unconditional RET and the taken path of Rcc share the
                // same pop sequence; the untaken path never reaches here.
                self.op_ret(mc, bus, master)
            }
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => self.op_rst(op, mc, bus, master),
            0xE9 => {
                self.pc = self.get_hl();
                false
            }
            0xC1 | 0xD1 | 0xE1 | 0xF1 => self.op_pop(op, mc, bus, master),
            0xC5 | 0xD5 | 0xE5 | 0xF5 => self.op_push(op, mc, bus, master),
            0xE3 => self.op_xthl(mc, bus, master),
            0xF9 => {
                self.sp = self.get_hl();
                false
            }
            0xD3 => self.op_out(mc, bus, master),
            0xDB => self.op_in(mc, bus, master),
            0xF3 => {
                self.inte = false;
                false
            }
            0xFB => {
                self.inte = true;
                self.ei_pending = true;
                false
            }
        }
    }

    /// True once `mc` reaches 0 and the engine is parked at `Fetch`.
    pub fn is_instruction_complete(&self) -> bool {
        matches!(self.state, ExecState::Fetch)
    }

    pub(crate) fn current_mc(&self) -> u8 {
        match self.state {
            ExecState::Fetch => 0,
            ExecState::Execute(_, mc) => mc,
        }
    }

    /// Length in bytes of the instruction starting with `opcode` (spec.md
    /// §4.2's published contract; the board uses this for `GET_INSTR` and
    /// step-over resolution rather than re-deriving it from `tables`).
    pub fn get_instr_len(opcode: u8) -> u8 {
        tables::BYTE_LEN[opcode as usize]
    }

    /// Published CPU-cycle count of `opcode` (spec.md §4.2: `{4,8,12,16,
    /// 20,24}`, the taken-path count for conditional instructions) — four
    /// CPU cycles per machine cycle in `tables::MC_COUNT`.
    pub fn get_instr_cycles(opcode: u8) -> u8 {
        tables::MC_COUNT[opcode as usize] * 4
    }

    /// Step-over classification of `opcode` (spec.md §4.10).
    pub fn get_instr_type(opcode: u8) -> InstrType {
        tables::INSTR_TYPE[opcode as usize]
    }
}

impl Component for I8080 {
    fn tick(&mut self) -> bool {
        false
    }
}

impl BusMasterComponent for I8080 {
    type Bus = dyn Bus<Address = u16, Data = u8>;

    fn tick_with_bus(&mut self, bus: &mut Self::Bus, master: BusMaster) -> bool {
        self.execute_cycle(bus, master);
        self.is_instruction_complete()
    }
}

impl Cpu for I8080 {
    fn reset(&mut self) {
        self.pc = 0;
        self.sp = 0;
        self.a = 0;
        self.f = flags::pack(0);
        self.b = 0;
        self.c = 0;
        self.d = 0;
        self.e = 0;
        self.h = 0;
        self.l = 0;
        self.ir = 0;
        self.tmp = 0;
        self.act = 0;
        self.wz = 0;
        self.inte = false;
        self.iff = false;
        self.hlta = false;
        self.ei_pending = false;
        self.cc = 0;
        self.state = ExecState::Fetch;
    }

    fn signal_interrupt(&mut self, int: InterruptState) {
        if int.irq {
            self.iff = true;
        }
    }

    fn is_sleeping(&self) -> bool {
        self.hlta
    }
}

impl CpuStateTrait for I8080 {
    type Snapshot = I8080State;

    fn snapshot(&self) -> I8080State {
        I8080State {
            pc: self.pc,
            sp: self.sp,
            b: self.b,
            c: self.c,
            d: self.d,
            e: self.e,
            h: self.h,
            l: self.l,
            a: self.a,
            f: self.f,
            ir: self.ir,
            tmp: self.tmp,
            act: self.act,
            wz: self.wz,
            mc: self.current_mc(),
            inte: self.inte,
            iff: self.iff,
            hlta: self.hlta,
            ei_pending: self.ei_pending,
            cc: self.cc,
        }
    }
}
