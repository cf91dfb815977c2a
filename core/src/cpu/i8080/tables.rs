//! Per-opcode metadata tables: byte length, machine-cycle count, and the
//! branch classification used by the step-over resolver (spec.md §4.10).
//!
//! The i8080 has a flat single-byte opcode space (no 0xCB/0xED/0xDD/0xFD
//! prefixes like the Z80), so unlike `cpu::z80`'s per-prefix `ExecState`
//! enum these are plain `[T; 256]` consts, built the same way
//! `RomRegion`-adjacent code in the teacher pack builds lookup tables at
//! compile time (a `while` loop over a `const fn`).
//!
//! Machine-cycle counts follow the classic i8080 bus-cycle (not T-state)
//! breakdown: one mc per opcode/operand/data fetch or stack push/pop, with
//! register-only instructions decoded and executed within the fetch cycle
//! itself (`mc_count == 1`). Conditional CALL/Ccc and RET/Rcc report the
//! *taken*-path count here; `Cpu::execute_machine_cycle` completes early
//! (wraps `mc` back to 0 sooner) on the untaken path per spec.md §4.2.

/// Step-over classification (spec.md §4.2, §4.10).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstrType {
    /// Conditional CALL (Ccc).
    C,
    /// Unconditional CALL.
    Cal,
    /// Conditional jump (Jcc).
    J,
    /// Unconditional jump (including the undocumented 0xCB alias).
    Jmp,
    /// Conditional return (Rcc).
    R,
    /// Unconditional return (including the undocumented 0xD9 alias).
    Ret,
    /// PCHL.
    Pch,
    /// RST n.
    Rst,
    /// Everything else (falls through to PC + instruction length).
    Other,
}

const fn byte_len_of(op: u8) -> u8 {
    match op {
        // LXI rp, d16
        0x01 | 0x11 | 0x21 | 0x31 => 3,
        // SHLD / LHLD / STA / LDA addr
        0x22 | 0x2A | 0x32 | 0x3A => 3,
        // MVI r, d8 / MVI M, d8
        0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => 2,
        // JMP / Jcc addr (incl. undocumented 0xCB alias)
        0xC2 | 0xC3 | 0xCA | 0xCB | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => 3,
        // CALL / Ccc addr (incl. undocumented 0xDD/0xED/0xFD aliases)
        0xC4 | 0xCC | 0xCD | 0xD4 | 0xDC | 0xDD | 0xE4 | 0xEC | 0xED | 0xF4 | 0xFC | 0xFD => 3,
        // ALU A, d8 (ADI/ACI/SUI/SBI/ANI/XRI/ORI/CPI)
        0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => 2,
        // IN / OUT port
        0xD3 | 0xDB => 2,
        _ => 1,
    }
}

const fn mc_count_of(op: u8) -> u8 {
    match op {
        // LXI rp, d16: fetch + lo + hi
        0x01 | 0x11 | 0x21 | 0x31 => 3,
        // STAX / LDAX rp: fetch + memory access
        0x02 | 0x12 | 0x0A | 0x1A => 2,
        // DAD rp: fetch + two internal add cycles
        0x09 | 0x19 | 0x29 | 0x39 => 3,
        // SHLD / LHLD addr: fetch + addr lo + addr hi + 2 data bytes
        0x22 | 0x2A => 5,
        // STA / LDA addr: fetch + addr lo + addr hi + 1 data byte
        0x32 | 0x3A => 4,
        // INR/DCR M (the only (HL) operand among INR/DCR): fetch + read + write
        0x34 | 0x35 => 3,
        // MVI M, d8: fetch + operand fetch + memory write
        0x36 => 3,
        // MVI r, d8 (non-M): fetch + operand fetch
        0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x3E => 2,
        // MOV r, M / MOV M, r (HL operand on either side, excluding HLT at 0x76)
        0x46 | 0x4E | 0x56 | 0x5E | 0x66 | 0x6E | 0x7E => 2,
        0x70..=0x75 | 0x77 => 2,
        // ALU A, M (HL operand)
        0x86 | 0x8E | 0x96 | 0x9E | 0xA6 | 0xAE | 0xB6 | 0xBE => 2,
        // ALU A, d8
        0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => 2,
        // RET (incl. undocumented 0xD9 alias) — taken-path count; Rcc
        // conditionals share this opcode space and complete in 1 mc when
        // the condition is false (spec.md §4.2).
        0xC0 | 0xC8 | 0xC9 | 0xD0 | 0xD8 | 0xD9 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => 3,
        // POP rp: fetch + pop lo + pop hi
        0xC1 | 0xD1 | 0xE1 | 0xF1 => 3,
        // PUSH rp: fetch + push hi + push lo
        0xC5 | 0xD5 | 0xE5 | 0xF5 => 3,
        // JMP / Jcc addr: fetch + addr lo + addr hi (unconditional on mc count)
        0xC2 | 0xC3 | 0xCA | 0xCB | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => 3,
        // CALL / Ccc addr (incl. aliases) — taken-path count; Ccc completes
        // in 3 mc (fetch + two address bytes, skipping the push) when untaken.
        0xC4 | 0xCC | 0xCD | 0xD4 | 0xDC | 0xDD | 0xE4 | 0xEC | 0xED | 0xF4 | 0xFC | 0xFD => 5,
        // RST n: fetch + push hi + push lo
        0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => 3,
        // IN / OUT port: fetch + port byte + bus access
        0xD3 | 0xDB => 3,
        // XTHL: fetch + pop lo + pop hi + push lo + push hi
        0xE3 => 5,
        _ => 1,
    }
}

const fn instr_type_of(op: u8) -> InstrType {
    match op {
        0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => InstrType::C,
        0xCD | 0xDD | 0xED | 0xFD => InstrType::Cal,
        0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => InstrType::J,
        0xC3 | 0xCB => InstrType::Jmp,
        0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => InstrType::R,
        0xC9 | 0xD9 => InstrType::Ret,
        0xE9 => InstrType::Pch,
        0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => InstrType::Rst,
        _ => InstrType::Other,
    }
}

const fn build_u8_table(f: fn(u8) -> u8) -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0usize;
    while i < 256 {
        table[i] = f(i as u8);
        i += 1;
    }
    table
}

pub const BYTE_LEN: [u8; 256] = build_u8_table(byte_len_of);
pub const MC_COUNT: [u8; 256] = build_u8_table(mc_count_of);

pub const INSTR_TYPE: [InstrType; 256] = {
    let mut table = [InstrType::Other; 256];
    let mut i = 0usize;
    while i < 256 {
        table[i] = instr_type_of(i as u8);
        i += 1;
    }
    table
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_table_stays_in_published_range() {
        for mc in MC_COUNT {
            let cycles = (mc as u32) * 4;
            assert!((4..=24).contains(&cycles));
        }
    }

    #[test]
    fn mov_r_r_is_single_machine_cycle() {
        // MOV B,C = 0x41
        assert_eq!(MC_COUNT[0x41], 1);
        assert_eq!(BYTE_LEN[0x41], 1);
    }

    #[test]
    fn call_and_ret_classified_for_step_over() {
        assert_eq!(INSTR_TYPE[0xCD], InstrType::Cal); // CALL
        assert_eq!(INSTR_TYPE[0xC4], InstrType::C); // CNZ
        assert_eq!(INSTR_TYPE[0xC9], InstrType::Ret); // RET
        assert_eq!(INSTR_TYPE[0xC8], InstrType::R); // RZ
        assert_eq!(INSTR_TYPE[0xC3], InstrType::Jmp);
        assert_eq!(INSTR_TYPE[0xE9], InstrType::Pch);
        assert_eq!(INSTR_TYPE[0xFF], InstrType::Rst);
    }

    #[test]
    fn undocumented_opcodes_alias_documented_ones() {
        assert_eq!(BYTE_LEN[0x08], BYTE_LEN[0x00]); // NOP alias
        assert_eq!(MC_COUNT[0xCB], MC_COUNT[0xC3]); // JMP alias
        assert_eq!(INSTR_TYPE[0xD9], InstrType::Ret);
    }
}
