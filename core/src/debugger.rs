//! Breakpoints and the debugger hook called at every instruction boundary
//! (spec.md §3 "Breakpoint", §4.10 "Breakpoint semantics", §9).
//!
//! Grounded on `core/src/core/machine.rs`'s trait-with-default-impl shape
//! for keeping an optional collaborator out of the hot path when absent —
//! here generalized from "optional renderer" to "optional debugger",
//! matching spec.md §9's note that the debugger is "an externally
//! installed pair of function pointers" and is best modeled in Rust as a
//! trait with a no-op default implementation.

use crate::cpu::state::I8080State;
use crate::device::memory::{AccessRecord, Memory};

/// One of the eight operands a breakpoint condition can be evaluated over
/// (spec.md §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
    Psw,
    Bc,
    De,
    Hl,
    Cc,
    Sp,
}

impl Operand {
    fn value(self, cpu: &I8080State) -> u32 {
        match self {
            Operand::A => cpu.a as u32,
            Operand::F => cpu.f as u32,
            Operand::B => cpu.b as u32,
            Operand::C => cpu.c as u32,
            Operand::D => cpu.d as u32,
            Operand::E => cpu.e as u32,
            Operand::H => cpu.h as u32,
            Operand::L => cpu.l as u32,
            Operand::Psw => ((cpu.a as u32) << 8) | cpu.f as u32,
            Operand::Bc => ((cpu.b as u32) << 8) | cpu.c as u32,
            Operand::De => ((cpu.d as u32) << 8) | cpu.e as u32,
            Operand::Hl => ((cpu.h as u32) << 8) | cpu.l as u32,
            Operand::Cc => cpu.cc as u32,
            Operand::Sp => cpu.sp as u32,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    Any,
    Eq,
    Lt,
    Gt,
    Le,
    Ge,
    Ne,
}

impl Condition {
    fn test(self, actual: u32, value: u32) -> bool {
        match self {
            Condition::Any => true,
            Condition::Eq => actual == value,
            Condition::Lt => actual < value,
            Condition::Gt => actual > value,
            Condition::Le => actual <= value,
            Condition::Ge => actual >= value,
            Condition::Ne => actual != value,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakpointStatus {
    Disabled,
    Active,
    Deleted,
}

/// One breakpoint. The page mask has one bit per `(main RAM, RAM-disk ×
/// page)` execution context — index 0 is main RAM, index `1 + disk*4 +
/// page` is a banked page (spec.md §4.10).
#[derive(Clone, Debug)]
pub struct Breakpoint {
    pub id: u32,
    pub address: u16,
    pub page_mask: u64,
    pub status: BreakpointStatus,
    pub auto_delete: bool,
    pub operand: Operand,
    pub condition: Condition,
    pub value: u32,
    pub comment: String,
}

impl Breakpoint {
    /// `1 + page_ram + 4 × active_disk` — the mask-bit index for the
    /// currently active memory context (spec.md §4.10). `0` is main RAM.
    pub fn page_index(active_disk: u8, page_ram: u8, any_mode_active: bool) -> u32 {
        if !any_mode_active {
            0
        } else {
            1 + page_ram as u32 + 4 * active_disk as u32
        }
    }
}

pub struct Breakpoints {
    next_id: u32,
    items: Vec<Breakpoint>,
    /// Set of breakpoint ids whose status changed since the last
    /// `DEBUG_BREAKPOINT_GET_UPDATES` drain (spec.md §6).
    updated: Vec<u32>,
}

impl Breakpoints {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            items: Vec::new(),
            updated: Vec::new(),
        }
    }

    pub fn add(&mut self, mut bp: Breakpoint) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        bp.id = id;
        self.items.push(bp);
        self.updated.push(id);
        id
    }

    pub fn delete(&mut self, id: u32) {
        if let Some(bp) = self.items.iter_mut().find(|b| b.id == id) {
            bp.status = BreakpointStatus::Deleted;
            self.updated.push(id);
        }
        self.items.retain(|b| b.id != id);
    }

    pub fn delete_all(&mut self) {
        for bp in &self.items {
            self.updated.push(bp.id);
        }
        self.items.clear();
    }

    pub fn set_status(&mut self, id: u32, status: BreakpointStatus) {
        if let Some(bp) = self.items.iter_mut().find(|b| b.id == id) {
            bp.status = status;
            self.updated.push(id);
        }
    }

    pub fn get(&self, id: u32) -> Option<&Breakpoint> {
        self.items.iter().find(|b| b.id == id)
    }

    pub fn all(&self) -> &[Breakpoint] {
        &self.items
    }

    pub fn take_updates(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.updated)
    }

    /// Looks up a breakpoint at `cpu.pc`; if one is active for the current
    /// paging context and its condition holds, reports a hit and handles
    /// auto-delete (spec.md §4.10).
    pub fn check(&mut self, cpu: &I8080State, active_page_index: u32) -> Option<u32> {
        let hit_id = self.items.iter().find_map(|bp| {
            if bp.address != cpu.pc || bp.status != BreakpointStatus::Active {
                return None;
            }
            if bp.page_mask & (1 << active_page_index) == 0 {
                return None;
            }
            let actual = bp.operand.value(cpu);
            bp.condition.test(actual, bp.value).then_some(bp.id)
        });
        if let Some(id) = hit_id {
            let auto_delete = self.get(id).map(|b| b.auto_delete).unwrap_or(false);
            if auto_delete {
                self.delete(id);
            }
        }
        hit_id
    }
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot handed to `Debugger::on_instruction_boundary` (spec.md §4.10's
/// `debug(cpu_state, mem_state, io_state, display_state)`).
pub struct DebugContext<'a> {
    pub cpu: I8080State,
    pub memory: &'a Memory,
    pub raster_line: usize,
    pub frame_num: u64,
}

/// Externally installed debugger hook. `on_instruction_boundary` returns
/// `true` to request the scheduler break out of the current run (spec.md
/// §9's "debugger as an externally installed pair of function pointers",
/// modeled here as a trait with a no-op default).
pub trait Debugger {
    fn attached(&self) -> bool {
        true
    }

    fn on_instruction_boundary(&mut self, ctx: &DebugContext) -> bool;

    fn on_access(&mut self, _addr: u64, _record: &AccessRecord) {}
}

/// Default debugger: never breaks, never attached. The board runs this
/// when no host debugger has been installed via `DEBUG_ATTACH`.
pub struct NullDebugger;

impl Debugger for NullDebugger {
    fn attached(&self) -> bool {
        false
    }

    fn on_instruction_boundary(&mut self, _ctx: &DebugContext) -> bool {
        false
    }
}
