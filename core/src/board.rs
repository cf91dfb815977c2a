//! Vector-06C board: owns every device and wires them into the
//! per-machine-cycle pipeline spec.md §2/§5 describes (Rasterizer → CPU →
//! Audio, once per machine cycle), plus the host-facing `Request`/
//! `Response` dispatch spec.md §6/§9 calls for.
//!
//! Grounded on `frontend/src/emulator.rs`'s poll/run-frame/render loop
//! shape (generalized from a host event loop into a single `execute_frame`
//! the host drives once per its own frame), and on
//! `machines/src/simplez80.rs`'s raw-pointer `Bus`-self-aliasing trick —
//! every machine in the teacher pack owns both its CPU and the `Bus` the
//! CPU needs mutable access to, and resolves the resulting self-borrow the
//! same way.

use crate::core::component::BusMasterComponent;
use crate::core::{Bus, BusMaster, bus::InterruptState};
use crate::cpu::Cpu;
use crate::cpu::i8080::I8080;
use crate::cpu::state::CpuStateTrait;
use crate::debugger::{Breakpoint, BreakpointStatus, Breakpoints, DebugContext, Debugger, NullDebugger};
use crate::device::audio::AudioMixer;
use crate::device::display::Rasterizer;
use crate::device::fdc1793::Fdc1793;
use crate::device::io_ports::{CommitPort, IoPorts, classify_port};
use crate::device::keyboard::{KeyAction, Keyboard};
use crate::device::memory::{AddressSpace, Memory};
use crate::error::{CoreError, LoadReport};
use crate::request::{
    DisplayData, HwMainStats, KeyEventAction, MemoryMapping, NewBreakpoint, Request, Response,
    RunStatus,
};

/// Real boot ROM size: 2 KiB monitor ROM mirrored to fill the low 16 KiB
/// shadow window. Not pinned by spec.md; a ROM of a different size is
/// still accepted (just flagged with a warning), since the shadow window
/// only consults `rom.len()`.
pub const BOOT_ROM_SIZE: usize = 0x4000;

pub struct Board {
    cpu: I8080,
    memory: Memory,
    io: IoPorts,
    keyboard: Keyboard,
    rasterizer: Rasterizer,
    fdc: Fdc1793,
    audio: AudioMixer,
    breakpoints: Breakpoints,
    debugger: Box<dyn Debugger>,

    status: RunStatus,
    optimize: bool,
    debug_enabled: bool,
    ram_disk_clear_after_restart: bool,

    /// How many bytes of the in-flight instruction's byte stream have been
    /// fetched so far (0 or 1) — `Bus::read` only distinguishes "fetching
    /// at `cpu.pc`" from "ordinary data read"; this counter supplies the
    /// `byte_num` argument `Memory::read_instr` needs for its debug log.
    fetch_byte_num: u8,
    /// Same idea for `Memory::write_byte`'s per-instruction write log.
    write_seq: u8,
}

impl Board {
    pub fn new() -> Self {
        Self {
            cpu: I8080::new(),
            memory: Memory::new(),
            io: IoPorts::new(),
            keyboard: Keyboard::new(),
            rasterizer: Rasterizer::new(),
            fdc: Fdc1793::new(),
            audio: AudioMixer::new(),
            breakpoints: Breakpoints::new(),
            debugger: Box::new(NullDebugger),
            status: RunStatus::Stop,
            optimize: false,
            debug_enabled: false,
            ram_disk_clear_after_restart: false,
            fetch_byte_num: 0,
            write_seq: 0,
        }
    }

    /// Installs a host debugger, replacing the no-op default.
    pub fn attach_debugger(&mut self, debugger: Box<dyn Debugger>) {
        self.debugger = debugger;
    }

    pub fn load_rom(&mut self, rom: Vec<u8>) -> LoadReport {
        let mut report = LoadReport::default();
        if rom.len() != BOOT_ROM_SIZE {
            report.warnings.push(
                CoreError::RomSizeMismatch {
                    expected: BOOT_ROM_SIZE,
                    actual: rom.len(),
                }
                .to_string(),
            );
        }
        report.prints.push(format!("loaded boot ROM ({} bytes)", rom.len()));
        self.memory.load_rom(rom);
        report
    }

    // ---- per-machine-cycle pipeline (spec.md §2, §5) ----

    /// Runs one machine cycle: rasterizer emits 16 pixels, the CPU advances
    /// one machine cycle, the audio mixer advances 4 CPU cycles. Returns
    /// true at an instruction boundary.
    fn step_machine_cycle(&mut self) -> bool {
        if self.cpu.is_instruction_complete() {
            self.fetch_byte_num = 0;
            self.write_seq = 0;
        }

        if let Some((port, value)) = self.rasterizer.emit_16_pixels(&mut self.io, &mut self.memory)
        {
            self.dispatch_committed_write(port, value);
        }
        if self.rasterizer.take_irq() {
            self.cpu.signal_interrupt(InterruptState { irq: true });
        }

        let boundary = unsafe {
            let bus_ptr: *mut Self = self;
            let bus = &mut *bus_ptr as &mut dyn Bus<Address = u16, Data = u8>;
            self.cpu.tick_with_bus(bus, BusMaster::Cpu(0))
        };

        let beeper = if self.io.pc2 & 0x01 != 0 { 1.0 } else { 0.0 };
        self.audio.clock(4, beeper, self.optimize);

        if self.memory.is_fault() {
            self.memory.clear_fault();
        }

        boundary
    }

    /// Routes a commit-timer write to whichever device `IoPorts` doesn't
    /// own directly. `Ppi`/`Palette`/`Unmapped` writes were already applied
    /// to `IoPorts`-local registers by the rasterizer's `try_to_commit`.
    fn dispatch_committed_write(&mut self, port: u8, value: u8) {
        match classify_port(port) {
            CommitPort::RamDisk(idx) => self.memory.set_ram_disk_mode(idx, value),
            CommitPort::Timer => {
                if port == 0x0B {
                    self.audio.timer.write_control_word(value);
                } else {
                    self.audio.timer.write_data(port - 0x08, value);
                }
            }
            CommitPort::Ay => {
                if port == 0x10 {
                    self.audio.ay.ay.select_register(value);
                } else {
                    self.audio.ay.ay.write_data(value);
                }
            }
            CommitPort::Fdc => match port {
                0x18 => self.fdc.write_command(value),
                0x19 => self.fdc.track = value,
                0x1A => self.fdc.sector = value,
                0x1B => self.fdc.write_data(value),
                0x1C => self.fdc.write_system(value),
                _ => {}
            },
            CommitPort::Ppi | CommitPort::Palette | CommitPort::Unmapped => {}
        }
    }

    fn check_break(&mut self) -> bool {
        let snapshot = self.cpu.snapshot();
        let mapping = self.memory.mappings[self.memory.active_disk as usize];
        let page_index =
            Breakpoint::page_index(self.memory.active_disk, mapping.page_ram, mapping.any_mode_active());
        let bp_hit = self.breakpoints.check(&snapshot, page_index).is_some();
        let dbg_break = if self.debug_enabled {
            let (raster_line, _) = self.rasterizer_pos();
            let ctx = DebugContext {
                cpu: snapshot,
                memory: &self.memory,
                raster_line,
                frame_num: self.rasterizer.frame_num,
            };
            self.debugger.on_instruction_boundary(&ctx)
        } else {
            false
        };
        bp_hit || dbg_break
    }

    fn rasterizer_pos(&self) -> (usize, usize) {
        self.rasterizer.raster_pos()
    }

    pub fn execute_instruction(&mut self) {
        loop {
            if self.step_machine_cycle() {
                break;
            }
        }
    }

    /// Runs instructions until the current frame completes, or (if
    /// `respect_breaks`) until a breakpoint/debugger hit. Returns true if
    /// it stopped on a break rather than a frame boundary.
    pub fn execute_frame(&mut self, respect_breaks: bool) -> bool {
        let starting_frame = self.rasterizer.frame_num;
        loop {
            self.execute_instruction();
            if respect_breaks && self.check_break() {
                return true;
            }
            if self.rasterizer.frame_num != starting_frame {
                return false;
            }
        }
    }

    fn do_reset(&mut self) {
        self.cpu.reset();
        self.memory.reset(self.ram_disk_clear_after_restart);
        self.io.reset();
        self.keyboard.reset();
        self.rasterizer.reset();
        self.fdc.reset();
        self.audio.reset();
    }

    fn do_restart(&mut self) {
        self.cpu.reset();
        self.memory.restart();
        self.io.reset();
        self.rasterizer.reset();
    }

    // ---- Request/Response dispatch (spec.md §6, §9) ----

    pub fn request(&mut self, req: Request) -> Response {
        match req {
            Request::Run => {
                self.status = RunStatus::Run;
                Response::Ok
            }
            Request::Stop => {
                self.status = RunStatus::Stop;
                Response::Ok
            }
            Request::Exit => {
                self.status = RunStatus::Exit;
                Response::Ok
            }
            Request::IsRunning => Response::IsRunning {
                running: self.status == RunStatus::Run,
            },
            Request::Reset => {
                self.do_reset();
                Response::Ok
            }
            Request::Restart => {
                self.do_restart();
                Response::Ok
            }

            Request::ExecuteInstr => {
                self.execute_instruction();
                self.check_break();
                Response::Ok
            }
            Request::ExecuteFrame => {
                self.execute_frame(true);
                Response::Ok
            }
            Request::ExecuteFrameNoBreaks => {
                self.execute_frame(false);
                Response::Ok
            }

            Request::GetCc => Response::Cc(self.cpu.cc),
            Request::GetRegPc => Response::RegPc(self.cpu.pc),
            Request::SetRegPc(addr) => {
                self.cpu.pc = addr;
                Response::Ok
            }
            Request::GetCpuState => Response::CpuState(self.cpu.snapshot()),
            Request::GetInstr { addr } => {
                let opcode = self.memory.peek_byte(addr, AddressSpace::Ram);
                let len = I8080::get_instr_len(opcode) as u16;
                let bytes = (0..len)
                    .map(|i| self.memory.peek_byte(addr.wrapping_add(i), AddressSpace::Ram))
                    .collect();
                Response::Bytes(bytes)
            }

            Request::GetByteRam { addr } => {
                Response::Bytes(vec![self.memory.peek_byte(addr, AddressSpace::Ram)])
            }
            Request::GetWordStack { addr } => {
                let lo = self.memory.peek_byte(addr, AddressSpace::Stack);
                let hi = self.memory.peek_byte(addr.wrapping_add(1), AddressSpace::Stack);
                Response::Word(u16::from_le_bytes([lo, hi]))
            }
            Request::GetStackSample { addr } => {
                let mut sample = [0u16; 11];
                for (i, slot) in sample.iter_mut().enumerate() {
                    let offset = (i as i32 - 5) * 2;
                    let a = (addr as i32).wrapping_add(offset) as u16;
                    let lo = self.memory.peek_byte(a, AddressSpace::Stack);
                    let hi = self.memory.peek_byte(a.wrapping_add(1), AddressSpace::Stack);
                    *slot = u16::from_le_bytes([lo, hi]);
                }
                Response::StackSample(sample)
            }

            Request::GetMemRange { addr, length } => {
                let bytes = (0..length)
                    .map(|i| self.memory.peek_byte(addr.wrapping_add(i), AddressSpace::Ram))
                    .collect();
                Response::Bytes(bytes)
            }
            Request::GetRamDisk { disk_index } => {
                Response::RamDisk(self.memory.get_ram_disk(disk_index).to_vec())
            }
            Request::SetMem { addr, data } => {
                for (i, byte) in data.iter().enumerate() {
                    self.memory
                        .poke_byte(addr.wrapping_add(i as u16), *byte, AddressSpace::Ram);
                }
                Response::Ok
            }
            Request::SetRamDisk { disk_index, data } => {
                if data.len() != crate::device::memory::RAM_DISK_SIZE {
                    Response::Error(
                        CoreError::RamDiskSizeMismatch {
                            expected: crate::device::memory::RAM_DISK_SIZE,
                            actual: data.len(),
                        }
                        .to_string(),
                    )
                } else {
                    self.memory.set_ram_disk(disk_index, &data);
                    Response::Ok
                }
            }

            Request::GetDisplayData => {
                let (raster_line, raster_pixel) = self.rasterizer_pos();
                Response::DisplayData(DisplayData {
                    raster_line,
                    raster_pixel,
                    frame_num: self.rasterizer.frame_num,
                    scroll_idx: self.rasterizer.scroll_idx,
                })
            }
            Request::GetFrame { vsync } => Response::Frame(self.rasterizer.get_frame(vsync).clone()),

            Request::GetMemoryMapping { disk_index } => {
                Response::MemoryMapping(mapping_to_request(self.memory.mappings[disk_index as usize]))
            }
            Request::GetMemoryMappings => {
                let mut out = [MemoryMapping::default(); 8];
                for (slot, m) in out.iter_mut().zip(self.memory.mappings.iter()) {
                    *slot = mapping_to_request(*m);
                }
                Response::MemoryMappings(out)
            }
            Request::GetGlobalAddrRam { addr } => {
                Response::GlobalAddr(self.memory.global_address(addr, AddressSpace::Ram))
            }

            Request::GetHwMainStats => {
                let (raster_line, raster_pixel) = self.rasterizer_pos();
                Response::HwMainStats(Box::new(HwMainStats {
                    cpu: self.cpu.snapshot(),
                    raster_line,
                    raster_pixel,
                    frame_num: self.rasterizer.frame_num,
                    display_mode_512: self.io.display_mode,
                    border_color_idx: self.io.brd_color_idx,
                    palette: self.rasterizer.palette,
                    active_disk: self.memory.active_disk,
                    running: self.status == RunStatus::Run,
                }))
            }

            Request::KeyHandling { scancode, action } => {
                let down = action == KeyEventAction::Down;
                match self.keyboard.key_event(scancode, down) {
                    KeyAction::Reset => {
                        if !down {
                            self.do_reset();
                        }
                    }
                    KeyAction::Restart => {
                        if !down {
                            self.do_restart();
                        }
                    }
                    KeyAction::None => {
                        let row = (scancode >> 3) & 0x07;
                        let col = scancode & 0x07;
                        self.keyboard.set_key(row, col, down);
                    }
                }
                Response::Ok
            }

            Request::MountFdd { drive, image } => {
                let mut report_warning = None;
                if image.len() > crate::device::fdc1793::FDD_SIZE {
                    report_warning = Some(
                        CoreError::FloppyImageTruncated {
                            actual: image.len(),
                            truncated_to: crate::device::fdc1793::FDD_SIZE,
                        }
                        .to_string(),
                    );
                }
                match self.fdc.mount(drive, image) {
                    Ok(()) => match report_warning {
                        Some(w) => Response::Error(w),
                        None => Response::Ok,
                    },
                    Err(e) => Response::Error(e.to_string()),
                }
            }
            Request::DismountFdd { drive } => match self.fdc.dismount(drive) {
                Ok(data) => Response::FddImage(data),
                Err(e) => Response::Error(e.to_string()),
            },
            Request::DismountFddAll => {
                for drive in 0..self.fdc.drives.len() {
                    let _ = self.fdc.dismount(drive);
                }
                Response::Ok
            }
            Request::ResetUpdateFdd { drive } => {
                if let Some(d) = self.fdc.drives.get_mut(drive) {
                    d.updated = false;
                    d.reads = 0;
                    d.writes = 0;
                    Response::Ok
                } else {
                    Response::Error(CoreError::InvalidDriveIndex(drive as u8).to_string())
                }
            }

            Request::DebugAttach { data } => {
                self.debug_enabled = data;
                Response::Ok
            }
            Request::DebugReset { reset_recorder } => {
                if reset_recorder {
                    self.memory.reset_access_log();
                    self.breakpoints.take_updates();
                }
                Response::Ok
            }
            Request::DebugBreakpointAdd(nb) => {
                let id = self.breakpoints.add(new_breakpoint(nb));
                Response::BreakpointId(id)
            }
            Request::DebugBreakpointDel { id } => {
                self.breakpoints.delete(id);
                Response::Ok
            }
            Request::DebugBreakpointDelAll => {
                self.breakpoints.delete_all();
                Response::Ok
            }
            Request::DebugBreakpointSetStatus { id, status } => {
                self.breakpoints.set_status(id, status);
                Response::Ok
            }
            Request::DebugBreakpointActive { id } => {
                self.breakpoints.set_status(id, BreakpointStatus::Active);
                Response::Ok
            }
            Request::DebugBreakpointDisable { id } => {
                self.breakpoints.set_status(id, BreakpointStatus::Disabled);
                Response::Ok
            }
            Request::DebugBreakpointGetStatus { id } => {
                Response::Breakpoint(self.breakpoints.get(id).cloned())
            }
            Request::DebugBreakpointGetAll => Response::Breakpoints(self.breakpoints.all().to_vec()),
            Request::DebugBreakpointGetUpdates => {
                Response::BreakpointUpdates(self.breakpoints.take_updates())
            }

            Request::DebugMemAccessLogReset => {
                self.memory.reset_access_log();
                Response::Ok
            }
            Request::DebugMemAccessLogGet => Response::AccessLog(self.memory.access_log().clone()),

            Request::Optimize { data } => {
                self.optimize = data;
                Response::Ok
            }
            Request::BorderFill { data } => {
                self.rasterizer.border_fill = data;
                Response::Ok
            }
        }
    }

    /// Drains downsampled audio into `out` (spec.md §4.9, §5). Called
    /// directly by the host's real-time audio callback rather than through
    /// `request()`, since the `AudioRing` is already lock-free and a
    /// `Request` round trip would add latency the callback can't afford.
    pub fn read_audio_samples(&mut self, out: &mut [f32]) {
        self.audio.read_samples(out);
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

fn mapping_to_request(m: crate::device::memory::MemMapping) -> MemoryMapping {
    MemoryMapping {
        page_ram: m.page_ram,
        page_stack: m.page_stack,
        mode_stack: m.mode_stack,
        mode_ram_a: m.mode_ram_a,
        mode_ram_8: m.mode_ram_8,
        mode_ram_e: m.mode_ram_e,
    }
}

fn new_breakpoint(nb: NewBreakpoint) -> Breakpoint {
    Breakpoint {
        id: 0,
        address: nb.address,
        page_mask: nb.page_mask,
        status: BreakpointStatus::Active,
        auto_delete: nb.auto_delete,
        operand: nb.operand,
        condition: nb.condition,
        value: nb.value,
        comment: nb.comment,
    }
}

impl Bus for Board {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, _master: BusMaster, addr: u16) -> u8 {
        if addr == self.cpu.pc {
            let byte_num = self.fetch_byte_num;
            self.fetch_byte_num = (self.fetch_byte_num + 1).min(1);
            self.memory.read_instr(addr, byte_num)
        } else {
            self.memory.read_byte(addr, AddressSpace::Ram)
        }
    }

    fn write(&mut self, _master: BusMaster, addr: u16, data: u8) {
        let byte_num = self.write_seq;
        self.write_seq = (self.write_seq + 1).min(1);
        self.memory.write_byte(addr, data, AddressSpace::Ram, byte_num);
    }

    fn read_stack(&mut self, _master: BusMaster, addr: u16) -> u8 {
        self.memory.read_byte(addr, AddressSpace::Stack)
    }

    fn write_stack(&mut self, _master: BusMaster, addr: u16, data: u8) {
        let byte_num = self.write_seq;
        self.write_seq = (self.write_seq + 1).min(1);
        self.memory.write_byte(addr, data, AddressSpace::Stack, byte_num);
    }

    fn io_read(&mut self, _master: BusMaster, addr: u16) -> u8 {
        let port = addr as u8;
        match classify_port(port) {
            CommitPort::Ppi => {
                let row_scan = if port == 0x01 {
                    self.keyboard.read(self.io.pa1)
                } else {
                    0
                };
                self.io.port_in(port, row_scan)
            }
            CommitPort::Timer => {
                if port == 0x0B {
                    0xFF
                } else {
                    self.audio.timer.read_data(port - 0x08)
                }
            }
            CommitPort::Ay => {
                if port == 0x10 {
                    self.audio.ay.ay.read_data()
                } else {
                    0xFF
                }
            }
            CommitPort::Fdc => match port {
                0x18 => self.fdc.read_status(),
                0x19 => self.fdc.track,
                0x1A => self.fdc.sector,
                0x1B => self.fdc.read_data(),
                0x1C => self.fdc.system,
                _ => 0xFF,
            },
            CommitPort::RamDisk(_) | CommitPort::Palette | CommitPort::Unmapped => 0xFF,
        }
    }

    fn io_write(&mut self, _master: BusMaster, addr: u16, data: u8) {
        self.io.request_out(addr as u8, data);
    }

    fn is_halted_for(&self, _master: BusMaster) -> bool {
        false
    }

    fn check_interrupts(&self, _target: BusMaster) -> InterruptState {
        InterruptState::default()
    }
}
