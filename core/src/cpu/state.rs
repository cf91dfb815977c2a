//! CPU state snapshot types and traits

/// Trait for CPU types that can provide state snapshots
pub trait CpuStateTrait {
    type Snapshot;
    fn snapshot(&self) -> Self::Snapshot;
}

/// i8080 CPU state snapshot (Vector-06C board CPU).
///
/// `f` is reconstructed on read with bit 1 fixed high, matching the real
/// 8080's F register layout (S Z 0 AC 0 P 1 C); the individual flag
/// accessors on `Cpu` are the source of truth, this struct is a point-in-time
/// copy for the debugger and `GET_CPU_STATE`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct I8080State {
    pub pc: u16,
    pub sp: u16,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub a: u8,
    pub f: u8,
    // Internal registers not visible to the programmer's model, exposed
    // here purely for the debugger and for deterministic state dumps.
    pub ir: u8,  // instruction register (latched opcode)
    pub tmp: u8, // ALU scratch latch
    pub act: u8, // ALU accumulator latch
    pub wz: u16, // address scratch pair (aka "WZ"/"MEMPTR" on 8080 derivatives)
    pub mc: u8,  // machine-cycle index within the current instruction
    pub inte: bool,       // interrupt enable line, as seen by the instruction engine
    pub iff: bool,        // interrupt flip-flop (pending acknowledged interrupt)
    pub hlta: bool,       // true while halted awaiting an interrupt
    pub ei_pending: bool, // EI takes effect after the next instruction, not immediately
    pub cc: u64,          // cumulative CPU-cycle counter
}
