pub mod ports;
pub mod rom;
pub mod video;

pub use ports::{Controls, DipConfig, Input, InvadersPorts};
pub use rom::{load_segments, RomSegment};
pub use video::{Color, Frame, Orientation};

/// Logical screen width in pixels (Space Invaders is 224x256, rotated).
pub const SCREEN_WIDTH: usize = 224;
/// Logical screen height in pixels.
pub const SCREEN_HEIGHT: usize = 256;

/// Start of video RAM. The frame buffer occupies 0x2400–0x3fff.
pub const VRAM_START: u16 = 0x2400;
/// Size of video RAM in bytes (0x1c00 = 7168 bytes = 224x256 bits).
pub const VRAM_SIZE: usize = 0x1c00;

/// 8080 clock and frame timing of the arcade board.
pub const CPU_CLOCK_HZ: u32 = 2_000_000;
pub const FRAME_RATE_HZ: u32 = 60;
pub const CYCLES_PER_FRAME: u32 = CPU_CLOCK_HZ / FRAME_RATE_HZ;
