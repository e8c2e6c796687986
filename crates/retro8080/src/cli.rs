use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use retro8080_core::{Profile, RunConfig, WallClock};
use retro8080_invaders::{DipConfig, Orientation, RomSegment, CYCLES_PER_FRAME};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProfileArg {
    /// Packed PSW, ANA clears AC, escape opcodes are fatal
    Documented,
    /// Behave like the shipped chip (needed by CP/M diagnostics)
    Silicon,
}

impl From<ProfileArg> for Profile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Documented => Profile::Documented,
            ProfileArg::Silicon => Profile::Silicon,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PortsArg {
    /// Space Invaders board: controls, DIP switches, shift register
    Invaders,
    /// Nothing attached: IN reads 0, OUT is dropped
    Null,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ClockArg {
    /// Host time, every --interrupt-period-us
    Wall,
    /// Emulated time, every --interrupt-period-states
    Cycles,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OrientationArg {
    Raw,
    Cabinet,
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Raw => Orientation::Raw,
            OrientationArg::Cabinet => Orientation::Cabinet,
        }
    }
}

const DEFAULT_INTERRUPT_PERIOD_US: u64 = WallClock::DEFAULT_PERIOD.as_micros() as u64;

fn parse_address(text: &str) -> Result<u16, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|e| format!("invalid address '{text}': {e}"))
}

/// Run Intel 8080 machine code headless.
#[derive(Debug, Parser)]
#[command(name = "retro8080", version, about)]
pub struct Cli {
    /// ROM segments: FILE, FILE@OFFSET, or a directory holding invaders.h/g/f/e
    #[arg(required = true, value_name = "ROM")]
    pub roms: Vec<RomSegment>,

    /// Address execution starts from
    #[arg(long, default_value = "0", value_parser = parse_address)]
    pub start_pc: u16,

    #[arg(long, value_enum, default_value_t = ProfileArg::Documented)]
    pub profile: ProfileArg,

    #[arg(long, value_enum, default_value_t = PortsArg::Invaders)]
    pub ports: PortsArg,

    /// What drives the RST 1 / RST 2 interrupts
    #[arg(long, value_enum, default_value_t = ClockArg::Wall)]
    pub clock: ClockArg,

    #[arg(long, default_value_t = DEFAULT_INTERRUPT_PERIOD_US, value_name = "MICROS")]
    pub interrupt_period_us: u64,

    #[arg(long, default_value_t = CYCLES_PER_FRAME, value_name = "STATES")]
    pub interrupt_period_states: u32,

    /// Stop after this many instructions
    #[arg(long)]
    pub max_instructions: Option<u64>,

    /// Stop after this many seconds
    #[arg(long)]
    pub seconds: Option<f64>,

    /// Pace the CPU to this clock (the arcade board runs at 2000000)
    #[arg(long, value_name = "HZ")]
    pub throttle_hz: Option<u32>,

    /// Write the final frame as a PPM image
    #[arg(long, value_name = "PATH")]
    pub dump_frame: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OrientationArg::Cabinet)]
    pub orientation: OrientationArg,

    /// Tint the frame with the cabinet's colour overlay
    #[arg(long)]
    pub overlay: bool,

    /// Log every executed instruction at trace level
    #[arg(long)]
    pub trace: bool,

    /// Ships per credit
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(3..=6))]
    pub ships: u8,

    #[arg(long)]
    pub hide_coin_info: bool,

    /// Award the extra ship at 1000 points instead of 1500
    #[arg(long)]
    pub extra_ship_at_1000: bool,

    /// Insert a coin and press 1P start shortly after boot
    #[arg(long)]
    pub coin: bool,
}

impl Cli {
    pub fn dip_config(&self) -> DipConfig {
        DipConfig {
            ships_per_credit: self.ships,
            show_coin_info: !self.hide_coin_info,
            extra_ship_at_1000: self.extra_ship_at_1000,
        }
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig::builder()
            .max_instructions(self.max_instructions)
            .throttle_hz(self.throttle_hz)
            .build()
    }
}
