use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use bitflags::bitflags;
use retro8080_core::PortHandler;

bitflags! {
    /// Input port 1 (`IN 1`).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Port1: u8 {
        const COIN = 1 << 0;
        const P2_START = 1 << 1;
        const P1_START = 1 << 2;
        const ALWAYS_ONE = 1 << 3;
        const P1_SHOOT = 1 << 4;
        const P1_LEFT = 1 << 5;
        const P1_RIGHT = 1 << 6;
    }
}

bitflags! {
    /// Input port 2 (`IN 2`): DIP switches, tilt and player 2 controls.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Port2: u8 {
        /// Bits 0-1: ships per credit, encoded as `ships - 3`.
        const SHIPS = 0x03;
        const TILT = 1 << 2;
        /// Set: extra ship at 1000 points. Clear: at 1500.
        const EXTRA_SHIP_AT_1000 = 1 << 3;
        const P2_SHOOT = 1 << 4;
        const P2_LEFT = 1 << 5;
        const P2_RIGHT = 1 << 6;
        /// The ROM hides the coin info line when this bit is set.
        const HIDE_COIN_INFO = 1 << 7;
    }
}

/// The Space Invaders DIP switches on port 2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DipConfig {
    /// Ships per game, 3-6.
    pub ships_per_credit: u8,
    pub show_coin_info: bool,
    pub extra_ship_at_1000: bool,
}

impl Default for DipConfig {
    fn default() -> Self {
        Self {
            ships_per_credit: 3,
            show_coin_info: true,
            extra_ship_at_1000: false,
        }
    }
}

impl DipConfig {
    fn port2_bits(&self) -> Port2 {
        let ships = self.ships_per_credit.clamp(3, 6) - 3;
        let mut bits = Port2::from_bits_truncate(ships) & Port2::SHIPS;
        bits.set(Port2::HIDE_COIN_INFO, !self.show_coin_info);
        bits.set(Port2::EXTRA_SHIP_AT_1000, self.extra_ship_at_1000);
        bits
    }
}

/// Cabinet controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Input {
    Coin,
    P1Start,
    P2Start,
    P1Shoot,
    P1Left,
    P1Right,
    P2Shoot,
    P2Left,
    P2Right,
    Tilt,
}

/// Shared handle onto the control panel.
///
/// The CPU thread owns [`InvadersPorts`]; the presentation thread keeps a
/// clone of this handle and flips bits as keys go up and down.
#[derive(Clone, Debug, Default)]
pub struct Controls {
    port1: Arc<AtomicU8>,
    port2: Arc<AtomicU8>,
}

impl Controls {
    pub fn set(&self, input: Input, pressed: bool) {
        let (port, mask) = match input {
            Input::Coin => (&self.port1, Port1::COIN.bits()),
            Input::P1Start => (&self.port1, Port1::P1_START.bits()),
            Input::P2Start => (&self.port1, Port1::P2_START.bits()),
            Input::P1Shoot => (&self.port1, Port1::P1_SHOOT.bits()),
            Input::P1Left => (&self.port1, Port1::P1_LEFT.bits()),
            Input::P1Right => (&self.port1, Port1::P1_RIGHT.bits()),
            Input::P2Shoot => (&self.port2, Port2::P2_SHOOT.bits()),
            Input::P2Left => (&self.port2, Port2::P2_LEFT.bits()),
            Input::P2Right => (&self.port2, Port2::P2_RIGHT.bits()),
            Input::Tilt => (&self.port2, Port2::TILT.bits()),
        };
        if pressed {
            port.fetch_or(mask, Ordering::Relaxed);
        } else {
            port.fetch_and(!mask, Ordering::Relaxed);
        }
    }

    fn port1(&self) -> Port1 {
        Port1::from_bits_truncate(self.port1.load(Ordering::Relaxed))
    }

    fn port2(&self) -> Port2 {
        Port2::from_bits_truncate(self.port2.load(Ordering::Relaxed))
    }
}

/// Names of the discrete sounds on OUT 3 and OUT 5, by bit.
const OUT3_SOUNDS: [&str; 5] = ["ufo", "shot", "player die", "invader die", "extended play"];
const OUT5_SOUNDS: [&str; 5] = ["fleet 1", "fleet 2", "fleet 3", "fleet 4", "ufo hit"];

/// I/O of the Space Invaders board.
///
/// - IN 1 / IN 2: control panel and DIP switches
/// - IN 3: hardware shift register result
/// - OUT 2: shift amount, OUT 4: shift data
/// - OUT 3 / OUT 5: sound latches (recorded, not synthesised)
/// - OUT 6: watchdog
#[derive(Debug, Default)]
pub struct InvadersPorts {
    controls: Controls,
    dip_config: DipConfig,
    out_port3: u8,
    out_port5: u8,
    shift_register: u16,
    shift_offset: u8,
    watchdog_kicks: u64,
}

impl InvadersPorts {
    pub fn new(dip_config: DipConfig) -> Self {
        Self {
            dip_config,
            ..Self::default()
        }
    }

    /// A handle for feeding inputs from another thread.
    pub fn controls(&self) -> Controls {
        self.controls.clone()
    }

    /// Current values of the sound latches (OUT 3 and OUT 5).
    pub fn outputs(&self) -> (u8, u8) {
        (self.out_port3, self.out_port5)
    }

    pub fn watchdog_kicks(&self) -> u64 {
        self.watchdog_kicks
    }

    fn shift_result(&self) -> u8 {
        let shift = 8 - (self.shift_offset & 0x7);
        (self.shift_register >> shift) as u8
    }
}

fn log_sound_edges(names: &[&str], before: u8, after: u8) {
    let rising = after & !before;
    for (bit, name) in names.iter().enumerate() {
        if rising & (1 << bit) != 0 {
            log::debug!("sound on: {name}");
        }
    }
}

impl PortHandler for InvadersPorts {
    fn input(&mut self, port: u8) -> u8 {
        match port {
            1 => (self.controls.port1() | Port1::ALWAYS_ONE).bits(),
            2 => {
                let dip_bits = Port2::SHIPS | Port2::HIDE_COIN_INFO | Port2::EXTRA_SHIP_AT_1000;
                let live = self.controls.port2() - dip_bits;
                (live | self.dip_config.port2_bits()).bits()
            }
            3 => self.shift_result(),
            _ => 0,
        }
    }

    fn output(&mut self, port: u8, value: u8) {
        match port {
            2 => {
                self.shift_offset = value & 0x7;
            }
            3 => {
                log_sound_edges(&OUT3_SOUNDS, self.out_port3, value);
                self.out_port3 = value;
            }
            4 => {
                self.shift_register = (self.shift_register >> 8) | ((value as u16) << 8);
            }
            5 => {
                log_sound_edges(&OUT5_SOUNDS, self.out_port5, value);
                self.out_port5 = value;
            }
            6 => {
                self.watchdog_kicks += 1;
            }
            _ => {
                log::trace!("OUT {port:#04x} <- {value:#04x} ignored");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port1_always_reads_bit_three() {
        let mut ports = InvadersPorts::default();
        assert_eq!(ports.input(1), 0x08);
    }

    #[test]
    fn controls_set_and_clear_their_bits() {
        let mut ports = InvadersPorts::default();
        let controls = ports.controls();

        controls.set(Input::Coin, true);
        controls.set(Input::P1Left, true);
        assert_eq!(ports.input(1), 0x08 | 0x01 | 0x20);

        controls.set(Input::Coin, false);
        assert_eq!(ports.input(1), 0x08 | 0x20);

        controls.set(Input::P2Shoot, true);
        controls.set(Input::Tilt, true);
        assert_eq!(ports.input(2), 0x10 | 0x04);
    }

    #[test]
    fn controls_work_across_threads() {
        let mut ports = InvadersPorts::default();
        let controls = ports.controls();
        std::thread::spawn(move || controls.set(Input::P1Shoot, true))
            .join()
            .unwrap();
        assert_eq!(ports.input(1) & 0x10, 0x10);
    }

    #[test]
    fn dip_switches_encode_on_port2() {
        let mut ports = InvadersPorts::new(DipConfig {
            ships_per_credit: 5,
            show_coin_info: false,
            extra_ship_at_1000: true,
        });
        assert_eq!(ports.input(2), 0x02 | 0x08 | 0x80);

        // Out-of-range ship counts clamp to 3-6.
        let mut ports = InvadersPorts::new(DipConfig {
            ships_per_credit: 9,
            ..DipConfig::default()
        });
        assert_eq!(ports.input(2), 0x03);
    }

    #[test]
    fn shift_register_returns_the_offset_window() {
        let mut ports = InvadersPorts::default();
        ports.output(4, 0xAB);
        ports.output(4, 0xCD);
        // Register now holds 0xCDAB.

        ports.output(2, 0);
        assert_eq!(ports.input(3), 0xCD);

        ports.output(2, 4);
        assert_eq!(ports.input(3), 0xDA);

        // Only the low three bits of the offset count.
        ports.output(2, 0xF8);
        assert_eq!(ports.input(3), 0xCD);
    }

    #[test]
    fn sound_latches_and_watchdog_are_recorded() {
        let mut ports = InvadersPorts::default();
        ports.output(3, 0x02);
        ports.output(5, 0x11);
        ports.output(6, 0);
        ports.output(6, 0);
        assert_eq!(ports.outputs(), (0x02, 0x11));
        assert_eq!(ports.watchdog_kicks(), 2);
    }

    #[test]
    fn unmapped_input_reads_zero() {
        let mut ports = InvadersPorts::default();
        assert_eq!(ports.input(0), 0);
        assert_eq!(ports.input(7), 0);
    }
}
