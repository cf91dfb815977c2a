/// Identifies who is accessing the bus. Vector-06C has exactly one bus
/// master, the i8080; kept as an enum (rather than a bare unit) so `Bus`
/// stays shaped the way a multi-master bus would, in case a DMA-capable
/// peripheral is ever added.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BusMaster {
    Cpu(usize),
}

/// Generic bus interface. The i8080 has a separate I/O port address space
/// from memory, so `io_read`/`io_write` are real operations here.
pub trait Bus {
    type Address: Copy + Into<u64>;
    type Data;

    fn read(&mut self, master: BusMaster, addr: Self::Address) -> Self::Data;
    fn write(&mut self, master: BusMaster, addr: Self::Address, data: Self::Data);

    /// Stack-relative read (PUSH/POP/CALL/RET/RST). Defaults to `read`;
    /// a board whose memory map distinguishes RAM-class from stack-class
    /// accesses (Vector-06C's per-RAM-disk page mapping, spec.md §4.1)
    /// overrides this to translate through the stack-page register instead
    /// of the RAM-page register.
    fn read_stack(&mut self, master: BusMaster, addr: Self::Address) -> Self::Data {
        self.read(master, addr)
    }

    /// Stack-relative write; see [`Bus::read_stack`].
    fn write_stack(&mut self, master: BusMaster, addr: Self::Address, data: Self::Data) {
        self.write(master, addr, data)
    }

    /// Read from I/O port address space (separate from memory on i8080).
    /// Default maps to memory read; overridden by the board.
    fn io_read(&mut self, master: BusMaster, addr: Self::Address) -> Self::Data {
        self.read(master, addr)
    }

    /// Write to I/O port address space (separate from memory on i8080).
    fn io_write(&mut self, master: BusMaster, addr: Self::Address, data: Self::Data) {
        self.write(master, addr, data)
    }

    /// True if the bus must pause this master before its next cycle.
    /// Vector-06C never arbitrates the CPU away from the bus; kept for
    /// interface symmetry with `Component`/`BusMasterComponent`.
    fn is_halted_for(&self, master: BusMaster) -> bool;

    fn check_interrupts(&self, target: BusMaster) -> InterruptState;
}

/// i8080 has one maskable interrupt line, acknowledged by injecting RST7
/// when `iff` (interrupt flip-flop) is set. No NMI, no FIRQ.
#[derive(Default, Clone, Copy, Debug)]
pub struct InterruptState {
    pub irq: bool,
}
