use std::time::{Duration, Instant};

use crate::machine::Machine;
use crate::ports::PortHandler;
use crate::{RST_END_FRAME, RST_MID_FRAME};

/// Source of interrupt ticks. Polled after every instruction with the number
/// of states that instruction took.
pub trait TickSource {
    /// Returns `true` when a tick is due.
    fn advance(&mut self, cycles: u32) -> bool;
}

impl<T: TickSource + ?Sized> TickSource for Box<T> {
    fn advance(&mut self, cycles: u32) -> bool {
        (**self).advance(cycles)
    }
}

/// Ticks on host time, at a fixed period.
#[derive(Clone, Debug)]
pub struct WallClock {
    period: Duration,
    next: Instant,
}

impl WallClock {
    /// One tick per 60 Hz frame.
    pub const DEFAULT_PERIOD: Duration = Duration::from_micros(16_667);

    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next: Instant::now() + period,
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PERIOD)
    }
}

impl TickSource for WallClock {
    fn advance(&mut self, _cycles: u32) -> bool {
        let now = Instant::now();
        if now < self.next {
            return false;
        }
        self.next += self.period;
        // After a long stall (debugger, suspended process) drop the backlog
        // instead of firing a burst of ticks.
        if now.saturating_duration_since(self.next) >= self.period * 4 {
            log::debug!("interrupt clock fell behind, resynchronising");
            self.next = now + self.period;
        }
        true
    }
}

/// Ticks every `period` CPU states. Deterministic, so tests and batch runs
/// see the same interrupt points every time.
#[derive(Clone, Debug)]
pub struct CycleClock {
    period: u64,
    elapsed: u64,
}

impl CycleClock {
    pub fn new(period: u32) -> Self {
        Self {
            period: u64::from(period.max(1)),
            elapsed: 0,
        }
    }
}

impl TickSource for CycleClock {
    fn advance(&mut self, cycles: u32) -> bool {
        self.elapsed += u64::from(cycles);
        if self.elapsed >= self.period {
            self.elapsed -= self.period;
            true
        } else {
            false
        }
    }
}

/// Raises the two restart interrupts of the arcade board, alternating between
/// RST 1 (mid-frame) and RST 2 (end of frame).
///
/// The alternation belongs to the host timing, not to the CPU, so it moves on
/// with every tick even when the CPU has interrupts disabled and drops the
/// request.
#[derive(Clone, Debug)]
pub struct InterruptController<C> {
    clock: C,
    vectors: [u8; 2],
    next: usize,
    delivered: u64,
}

impl<C: TickSource> InterruptController<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            vectors: [RST_MID_FRAME, RST_END_FRAME],
            next: 0,
            delivered: 0,
        }
    }

    /// Feed elapsed states to the clock. Returns the vector for this tick,
    /// if one is due, and moves the alternation on.
    pub fn tick(&mut self, cycles: u32) -> Option<u8> {
        if !self.clock.advance(cycles) {
            return None;
        }
        let vector = self.vectors[self.next];
        self.next ^= 1;
        Some(vector)
    }

    /// Tick, and hand a due vector to the CPU. Returns the vector only when
    /// the CPU accepted it.
    pub fn service<P: PortHandler + ?Sized>(
        &mut self,
        machine: &mut Machine,
        ports: &mut P,
        cycles: u32,
    ) -> Option<u8> {
        let vector = self.tick(cycles)?;
        if machine.interrupt(ports, vector) {
            self.delivered += 1;
            log::trace!("RST {vector} delivered");
            Some(vector)
        } else {
            log::trace!("RST {vector} dropped, interrupts disabled");
            None
        }
    }

    /// Interrupts the CPU has accepted so far.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    pub fn next_vector(&self) -> u8 {
        self.vectors[self.next]
    }
}
