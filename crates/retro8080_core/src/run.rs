use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use typed_builder::TypedBuilder;

use crate::error::DecodeError;
use crate::interrupt::{InterruptController, TickSource};
use crate::machine::Machine;
use crate::ports::PortHandler;

/// Cross-thread stop request for [`run`]. Clones share the same flag.
#[derive(Clone, Debug, Default)]
pub struct Shutdown(Arc<AtomicBool>);

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Clone, Debug, TypedBuilder)]
pub struct RunConfig {
    /// Stop after this many steps.
    #[builder(default, setter(into))]
    pub max_instructions: Option<u64>,
    /// Pace execution to this CPU clock. Unthrottled when unset.
    #[builder(default, setter(into))]
    pub throttle_hz: Option<u32>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// Another thread asked the loop to stop.
    Shutdown,
    /// HLT with interrupts disabled; nothing can resume the CPU.
    Halted,
    InstructionLimit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Steps taken, including idle steps while halted.
    pub instructions: u64,
    pub cycles: u64,
    pub interrupts: u64,
    pub reason: StopReason,
}

/// Sleeps the CPU thread so emulated time tracks host time at `hz`.
struct Pacer {
    hz: u64,
    start: Instant,
    checked: u64,
}

impl Pacer {
    fn new(hz: u32) -> Self {
        Self {
            hz: u64::from(hz),
            start: Instant::now(),
            checked: 0,
        }
    }

    fn pace(&mut self, cycles: u64) {
        // Look at the host clock about once per emulated millisecond.
        if cycles - self.checked < self.hz / 1000 {
            return;
        }
        self.checked = cycles;
        let due = Duration::from_secs_f64(cycles as f64 / self.hz as f64);
        let elapsed = self.start.elapsed();
        if due > elapsed {
            std::thread::sleep(due - elapsed);
        }
    }
}

/// Drive `machine` until it halts for good, hits the configured limit, or
/// `shutdown` is requested.
///
/// After every instruction the interrupt controller is given the states that
/// instruction took and may raise a restart. An unknown opcode ends the run
/// with the [`DecodeError`]; the machine is left exactly as it was when the
/// opcode was fetched.
pub fn run<P, C>(
    machine: &mut Machine,
    ports: &mut P,
    interrupts: &mut InterruptController<C>,
    config: &RunConfig,
    shutdown: &Shutdown,
) -> Result<RunSummary, DecodeError>
where
    P: PortHandler + ?Sized,
    C: TickSource,
{
    let mut pacer = config.throttle_hz.filter(|&hz| hz > 0).map(Pacer::new);
    let delivered_before = interrupts.delivered();
    let mut instructions: u64 = 0;
    let mut cycles: u64 = 0;

    log::info!(
        "running from PC={:#06x} ({:?} profile)",
        machine.cpu.regs.pc,
        machine.cpu.profile
    );

    let reason = loop {
        if shutdown.is_requested() {
            break StopReason::Shutdown;
        }
        if machine.cpu.halted && !machine.cpu.interrupts_enabled {
            break StopReason::Halted;
        }
        if config
            .max_instructions
            .is_some_and(|limit| instructions >= limit)
        {
            break StopReason::InstructionLimit;
        }

        let c = match machine.step(ports) {
            Ok(c) => c,
            Err(err) => {
                log::error!("{err}");
                return Err(err);
            }
        };
        instructions += 1;
        cycles += u64::from(c);

        interrupts.service(machine, ports, c);

        if let Some(pacer) = pacer.as_mut() {
            pacer.pace(cycles);
        }
    };

    let summary = RunSummary {
        instructions,
        cycles,
        interrupts: interrupts.delivered() - delivered_before,
        reason,
    };
    log::info!(
        "stopped ({:?}) after {} instructions, {} states, {} interrupts",
        summary.reason,
        summary.instructions,
        summary.cycles,
        summary.interrupts
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::Profile;
    use crate::interrupt::CycleClock;
    use crate::ports::NullPorts;

    fn machine_with(program: &[u8]) -> Machine {
        let mut machine = Machine::new(Profile::Documented);
        machine.load_block(program, 0).unwrap();
        machine
    }

    fn quiet_clock() -> InterruptController<CycleClock> {
        InterruptController::new(CycleClock::new(u32::MAX))
    }

    #[test]
    fn stops_when_halted_with_interrupts_off() {
        let mut machine = machine_with(&[0x00, 0x76]);
        let summary = run(
            &mut machine,
            &mut NullPorts,
            &mut quiet_clock(),
            &RunConfig::default(),
            &Shutdown::new(),
        )
        .unwrap();

        assert_eq!(summary.reason, StopReason::Halted);
        assert_eq!(summary.instructions, 2);
        assert_eq!(summary.cycles, 4 + 7);
    }

    #[test]
    fn honours_the_instruction_limit() {
        // JMP 0x0000 forever.
        let mut machine = machine_with(&[0xC3, 0x00, 0x00]);
        let config = RunConfig::builder().max_instructions(10_u64).build();
        let summary = run(
            &mut machine,
            &mut NullPorts,
            &mut quiet_clock(),
            &config,
            &Shutdown::new(),
        )
        .unwrap();

        assert_eq!(summary.reason, StopReason::InstructionLimit);
        assert_eq!(summary.instructions, 10);
        assert_eq!(summary.cycles, 100);
    }

    #[test]
    fn stops_on_shutdown_request_from_another_thread() {
        let mut machine = machine_with(&[0xC3, 0x00, 0x00]);
        let shutdown = Shutdown::new();

        let worker = {
            let shutdown = shutdown.clone();
            std::thread::spawn(move || {
                run(
                    &mut machine,
                    &mut NullPorts,
                    &mut quiet_clock(),
                    &RunConfig::default(),
                    &shutdown,
                )
            })
        };
        std::thread::sleep(Duration::from_millis(10));
        shutdown.request();

        let summary = worker.join().unwrap().unwrap();
        assert_eq!(summary.reason, StopReason::Shutdown);
    }

    #[test]
    fn decode_failure_ends_the_run() {
        let mut machine = machine_with(&[0x00, 0x00, 0xFD]);
        let err = run(
            &mut machine,
            &mut NullPorts,
            &mut quiet_clock(),
            &RunConfig::default(),
            &Shutdown::new(),
        )
        .unwrap_err();

        assert_eq!(err.opcode, 0xFD);
        assert_eq!(err.pc, 0x0002);
        assert_eq!(machine.cpu.regs.pc, 0x0002);
    }

    #[test]
    fn interrupts_wake_a_halted_cpu() {
        // LXI SP,0x2400; EI; HLT; JMP 0x0004
        let mut machine = machine_with(&[0x31, 0x00, 0x24, 0xFB, 0x76, 0xC3, 0x04, 0x00]);
        // Both handlers: INR A; CPI 3; JZ 0x0020; EI; RET
        let handler = [0x3C, 0xFE, 0x03, 0xCA, 0x20, 0x00, 0xFB, 0xC9];
        machine.load_block(&handler, 0x0008).unwrap();
        machine.load_block(&handler, 0x0010).unwrap();
        // Third interrupt parks the CPU with interrupts off.
        machine.load_block(&[0x76], 0x0020).unwrap();

        let mut irq = InterruptController::new(CycleClock::new(100));
        let config = RunConfig::builder().max_instructions(10_000_u64).build();
        let summary = run(
            &mut machine,
            &mut NullPorts,
            &mut irq,
            &config,
            &Shutdown::new(),
        )
        .unwrap();

        assert_eq!(summary.reason, StopReason::Halted);
        assert_eq!(summary.interrupts, 3);
        assert_eq!(machine.cpu.regs.a, 3);
        assert_eq!(irq.delivered(), 3);
    }

    #[test]
    fn throttled_run_still_finishes() {
        let mut machine = machine_with(&[0xC3, 0x00, 0x00]);
        let config = RunConfig::builder()
            .max_instructions(200_u64)
            .throttle_hz(2_000_000_u32)
            .build();
        let start = Instant::now();
        let summary = run(
            &mut machine,
            &mut NullPorts,
            &mut quiet_clock(),
            &config,
            &Shutdown::new(),
        )
        .unwrap();

        // 2000 states at 2 MHz is one millisecond.
        assert_eq!(summary.cycles, 2000);
        assert!(start.elapsed() >= Duration::from_micros(900));
    }
}
