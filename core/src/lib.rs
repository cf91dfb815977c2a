pub mod board;
pub mod core;
pub mod cpu;
pub mod debugger;
pub mod device;
pub mod error;
pub mod request;

pub mod prelude {
    pub use crate::board::Board;
    pub use crate::core::{Bus, BusMaster, BusMasterComponent, Component, bus::InterruptState};
    pub use crate::cpu::Cpu;
    pub use crate::debugger::{Debugger, NullDebugger};
    pub use crate::error::{CoreError, LoadReport};
    pub use crate::request::{Request, Response};
}
