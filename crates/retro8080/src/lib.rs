pub mod cli;
mod present;

use std::fs::File;
use std::io::BufWriter;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use retro8080_core::{
    CycleClock, DecodeError, InterruptController, Machine, NullPorts, PortHandler, RunSummary,
    Shutdown, TickSource, WallClock,
};
use retro8080_invaders::{load_segments, Controls, InvadersPorts};

pub use cli::Cli;
use cli::{ClockArg, PortsArg};
use present::Presenter;

type Ports = Box<dyn PortHandler + Send>;
type Clock = Box<dyn TickSource + Send>;

fn build_ports(cli: &Cli) -> (Ports, Option<Controls>) {
    match cli.ports {
        PortsArg::Invaders => {
            let ports = InvadersPorts::new(cli.dip_config());
            let controls = ports.controls();
            (Box::new(ports), Some(controls))
        }
        PortsArg::Null => (Box::new(NullPorts), None),
    }
}

fn build_clock(cli: &Cli) -> Clock {
    match cli.clock {
        ClockArg::Wall => Box::new(WallClock::new(Duration::from_micros(
            cli.interrupt_period_us.max(1),
        ))),
        ClockArg::Cycles => Box::new(CycleClock::new(cli.interrupt_period_states)),
    }
}

/// Load the ROMs, run the CPU on its own thread and watch video RAM from this
/// one until the CPU stops or the time limit passes.
pub fn run(cli: Cli) -> Result<RunSummary> {
    let mut machine = Machine::new(cli.profile.into());
    let loaded = load_segments(&mut machine, &cli.roms)?;
    machine.cpu.regs.pc = cli.start_pc;
    log::info!("{loaded} bytes of ROM loaded, starting at {:#06x}", cli.start_pc);

    let (mut ports, controls) = build_ports(&cli);
    let mut interrupts = InterruptController::new(build_clock(&cli));
    let config = cli.run_config();
    let shutdown = Shutdown::new();

    let mut presenter = Presenter::new(
        machine.view(),
        cli.orientation.into(),
        cli.overlay,
        controls,
        cli.coin,
    );
    let deadline = cli
        .seconds
        .filter(|s| s.is_finite() && *s >= 0.0)
        .map(|s| Instant::now() + Duration::from_secs_f64(s));

    let worker = {
        let shutdown = shutdown.clone();
        thread::Builder::new()
            .name("cpu".into())
            .spawn(move || {
                retro8080_core::run(&mut machine, &mut ports, &mut interrupts, &config, &shutdown)
            })
            .context("failed to spawn the CPU thread")?
    };

    presenter.run(&worker, &shutdown, deadline);
    let outcome = worker
        .join()
        .map_err(|_| anyhow!("CPU thread panicked"))?;
    log::debug!("presented {} frames", presenter.frames());

    if let Some(path) = cli.dump_frame.as_ref() {
        let frame = presenter.finish();
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        frame
            .write_ppm(BufWriter::new(file))
            .with_context(|| format!("failed to write frame to {}", path.display()))?;
        log::info!("frame written to {} ({} pixels lit)", path.display(), frame.lit_pixels());
    }

    outcome.context("CPU stopped on an unknown opcode")
}

/// Process exit status for a failed run: 2 when the CPU hit an unknown
/// opcode, 1 for anything else.
pub fn exit_status(err: &anyhow::Error) -> u8 {
    if err.chain().any(|cause| cause.is::<DecodeError>()) {
        2
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use retro8080_core::StopReason;
    use std::path::{Path, PathBuf};

    fn scratch(name: &str, program: &[u8]) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("retro8080_host_{name}_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let rom = dir.join("program.bin");
        std::fs::write(&rom, program).unwrap();
        rom
    }

    fn headless(rom: &Path, extra: &[&str]) -> Cli {
        let rom = rom.to_string_lossy().into_owned();
        let mut args = vec!["retro8080", rom.as_str(), "--ports", "null", "--clock", "cycles"];
        args.extend_from_slice(extra);
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn halting_program_stops_cleanly() {
        let rom = scratch("halt", &[0x00, 0x00, 0x76]);
        let summary = run(headless(&rom, &[])).unwrap();
        assert_eq!(summary.reason, StopReason::Halted);
        assert_eq!(summary.instructions, 3);
    }

    #[test]
    fn start_pc_skips_the_prefix() {
        // 0x0000 would hit an unknown opcode; 0x0001 is HLT.
        let rom = scratch("start_pc", &[0xED, 0x76]);
        let summary = run(headless(&rom, &["--start-pc", "1"])).unwrap();
        assert_eq!(summary.reason, StopReason::Halted);
    }

    #[test]
    fn dumps_the_final_frame() {
        // LXI SP,0x2400; LXI H,0x2400; MVI M,0xFF; HLT
        let rom = scratch(
            "dump",
            &[0x31, 0x00, 0x24, 0x21, 0x00, 0x24, 0x36, 0xFF, 0x76],
        );
        let out = rom.with_file_name("frame.ppm");
        let out_arg = out.to_string_lossy().into_owned();
        run(headless(&rom, &["--dump-frame", out_arg.as_str(), "--orientation", "raw"])).unwrap();

        let bytes = std::fs::read(&out).unwrap();
        let header = b"P6\n224 256\n255\n";
        assert!(bytes.starts_with(header));
        let pixels = &bytes[header.len()..];
        let lit = pixels.chunks(3).filter(|p| p.iter().any(|&c| c != 0)).count();
        assert_eq!(lit, 8);
        // Column 0, rows 0..8.
        assert_eq!(&pixels[..3], &[255, 255, 255]);
    }

    #[test]
    fn unknown_opcode_exits_with_status_two() {
        let rom = scratch("unknown", &[0x00, 0xDD]);
        let err = run(headless(&rom, &[])).unwrap_err();
        assert_eq!(exit_status(&err), 2);
        assert!(format!("{err:#}").contains("0xDD"));
    }

    #[test]
    fn silicon_profile_runs_escape_opcodes() {
        // 0xCB aliases JMP: JMP 0x0003; HLT
        let rom = scratch("silicon", &[0xCB, 0x03, 0x00, 0x76]);
        let summary = run(headless(&rom, &["--profile", "silicon"])).unwrap();
        assert_eq!(summary.reason, StopReason::Halted);
    }

    #[test]
    fn missing_rom_exits_with_status_one() {
        let cli = Cli::try_parse_from(["retro8080", "/no/such/rom.bin"]).unwrap();
        let err = run(cli).unwrap_err();
        assert_eq!(exit_status(&err), 1);
    }

    #[test]
    fn time_limit_stops_an_endless_loop() {
        let rom = scratch("seconds", &[0xC3, 0x00, 0x00]);
        let summary = run(headless(&rom, &["--seconds", "0.05"])).unwrap();
        assert_eq!(summary.reason, StopReason::Shutdown);
    }
}
