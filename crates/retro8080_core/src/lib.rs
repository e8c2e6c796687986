pub mod cpu;
pub mod error;
pub mod interrupt;
pub mod machine;
pub mod memory;
pub mod ports;
pub mod run;

pub use cpu::{Bus8080, Cpu8080, Flags, Instruction, Profile, Registers, Snapshot};
pub use error::{DecodeError, LoadError};
pub use interrupt::{CycleClock, InterruptController, TickSource, WallClock};
pub use machine::Machine;
pub use memory::{Memory, MemoryView, MEMORY_SIZE};
pub use ports::{NullPorts, PortHandler};
pub use run::{run, RunConfig, RunSummary, Shutdown, StopReason};

/// Restart vector raised mid-frame (RST 1, address 0x0008).
pub const RST_MID_FRAME: u8 = 1;
/// Restart vector raised at the end of the frame (RST 2, address 0x0010).
pub const RST_END_FRAME: u8 = 2;
