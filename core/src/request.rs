//! Typed `Request`/`Response` pair covering every host-facing tag in
//! spec.md §6. Spec.md §9 explicitly calls out replacing the original's
//! untyped tag+payload map with tagged sums; this is that replacement,
//! one file enumerating every tag with its payload/response struct,
//! dispatched through `Board::request`.

use crate::cpu::state::I8080State;
use crate::debugger::{Breakpoint, BreakpointStatus, Condition, Operand};
use crate::device::fdc1793::FDD_SIZE;
use crate::device::memory::AccessRecord;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEventAction {
    Down,
    Up,
}

/// Composite snapshot for `GET_HW_MAIN_STATS` — CPU regs, raster
/// position, mode flags, palette snapshot, built without heap allocation
/// for the common case (spec.md §6, §9).
#[derive(Clone, Debug)]
pub struct HwMainStats {
    pub cpu: I8080State,
    pub raster_line: usize,
    pub raster_pixel: usize,
    pub frame_num: u64,
    pub display_mode_512: bool,
    pub border_color_idx: u8,
    pub palette: [u8; 16],
    pub active_disk: u8,
    pub running: bool,
}

#[derive(Clone, Debug)]
pub struct DisplayData {
    pub raster_line: usize,
    pub raster_pixel: usize,
    pub frame_num: u64,
    pub scroll_idx: u8,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MemoryMapping {
    pub page_ram: u8,
    pub page_stack: u8,
    pub mode_stack: bool,
    pub mode_ram_a: bool,
    pub mode_ram_8: bool,
    pub mode_ram_e: bool,
}

/// Request payload for `DEBUG_BREAKPOINT_ADD`.
#[derive(Clone, Debug)]
pub struct NewBreakpoint {
    pub address: u16,
    pub page_mask: u64,
    pub auto_delete: bool,
    pub operand: Operand,
    pub condition: Condition,
    pub value: u32,
    pub comment: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Run,
    Stop,
    Exit,
}

/// One request tag plus its payload (spec.md §6). Intentionally one enum
/// variant per tag rather than a stringly-typed dispatch table.
#[derive(Clone, Debug)]
pub enum Request {
    Run,
    Stop,
    Exit,
    IsRunning,
    Reset,
    Restart,

    ExecuteInstr,
    ExecuteFrame,
    ExecuteFrameNoBreaks,

    GetCc,
    GetRegPc,
    SetRegPc(u16),
    GetCpuState,
    GetInstr { addr: u16 },

    GetByteRam { addr: u16 },
    GetWordStack { addr: u16 },
    GetStackSample { addr: u16 },

    GetMemRange { addr: u16, length: u16 },
    GetRamDisk { disk_index: u8 },
    SetMem { addr: u16, data: Vec<u8> },
    SetRamDisk { disk_index: u8, data: Vec<u8> },

    GetDisplayData,
    GetFrame { vsync: bool },

    GetMemoryMapping { disk_index: u8 },
    GetMemoryMappings,
    GetGlobalAddrRam { addr: u16 },

    GetHwMainStats,

    KeyHandling { scancode: u8, action: KeyEventAction },

    MountFdd { drive: usize, image: Vec<u8> },
    DismountFdd { drive: usize },
    DismountFddAll,
    ResetUpdateFdd { drive: usize },

    DebugAttach { data: bool },
    DebugReset { reset_recorder: bool },
    DebugBreakpointAdd(NewBreakpoint),
    DebugBreakpointDel { id: u32 },
    DebugBreakpointDelAll,
    DebugBreakpointSetStatus { id: u32, status: BreakpointStatus },
    DebugBreakpointActive { id: u32 },
    DebugBreakpointDisable { id: u32 },
    DebugBreakpointGetStatus { id: u32 },
    DebugBreakpointGetAll,
    DebugBreakpointGetUpdates,

    DebugMemAccessLogReset,
    DebugMemAccessLogGet,

    Optimize { data: bool },
    BorderFill { data: bool },
}

#[derive(Clone, Debug)]
pub enum Response {
    Ok,
    IsRunning { running: bool },

    Cc(u64),
    RegPc(u16),
    CpuState(I8080State),
    Bytes(Vec<u8>),
    Word(u16),
    /// Words at stack offsets -10..+10 step 2 (11 entries), centered on SP.
    StackSample([u16; 11]),

    RamDisk(Vec<u8>),

    DisplayData(DisplayData),
    Frame(Vec<u32>),

    MemoryMapping(MemoryMapping),
    MemoryMappings([MemoryMapping; 8]),
    GlobalAddr(u64),

    HwMainStats(Box<HwMainStats>),

    BreakpointId(u32),
    Breakpoint(Option<Breakpoint>),
    Breakpoints(Vec<Breakpoint>),
    BreakpointUpdates(Vec<u32>),

    AccessLog(HashMap<u64, AccessRecord>),

    FddImage(Vec<u8>),

    /// Host-facing loading paths return this instead of aborting
    /// (spec.md §7): a mount/dismount/set-ram-disk request that hit a bad
    /// size or index still returns a usable, informative result.
    Error(String),
}

impl Response {
    pub fn empty_fdd_image() -> Vec<u8> {
        vec![0; FDD_SIZE]
    }
}
