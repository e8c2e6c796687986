use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use retro8080_core::{MemoryView, Shutdown, WallClock};
use retro8080_invaders::{Controls, Frame, Input, Orientation};

/// Inputs pressed (`true`) or released by `--coin`, keyed by frame number.
const COIN_SCRIPT: [(u64, Input, bool); 4] = [
    (60, Input::Coin, true),
    (66, Input::Coin, false),
    (120, Input::P1Start, true),
    (126, Input::P1Start, false),
];

fn scripted_input(frame: u64) -> Option<(Input, bool)> {
    COIN_SCRIPT
        .iter()
        .find(|(at, _, _)| *at == frame)
        .map(|&(_, input, pressed)| (input, pressed))
}

/// Main-thread consumer of video RAM. It only ever reads memory.
pub(crate) struct Presenter {
    view: MemoryView,
    frame: Frame,
    controls: Option<Controls>,
    coin: bool,
    frames: u64,
}

impl Presenter {
    pub(crate) fn new(
        view: MemoryView,
        orientation: Orientation,
        overlay: bool,
        controls: Option<Controls>,
        coin: bool,
    ) -> Self {
        Self {
            view,
            frame: Frame::new(orientation, overlay),
            controls,
            coin,
            frames: 0,
        }
    }

    pub(crate) fn frames(&self) -> u64 {
        self.frames
    }

    /// Poll video RAM at ~60 Hz until the CPU thread is done, or until
    /// `deadline`, at which point the CPU thread is asked to stop.
    pub(crate) fn run<T>(
        &mut self,
        worker: &JoinHandle<T>,
        shutdown: &Shutdown,
        deadline: Option<Instant>,
    ) {
        let target_frame = WallClock::DEFAULT_PERIOD;
        let mut last_frame = Instant::now();

        while !worker.is_finished() {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                log::info!("time limit reached after {} frames", self.frames);
                shutdown.request();
                break;
            }

            self.frame.capture(&self.view);
            self.frames += 1;
            self.drive_inputs();
            if self.frames % 60 == 0 {
                log::debug!("frame {}: {} pixels lit", self.frames, self.frame.lit_pixels());
            }

            let elapsed = last_frame.elapsed();
            if elapsed < target_frame {
                std::thread::sleep(target_frame - elapsed);
            }
            last_frame = Instant::now();
        }
    }

    fn drive_inputs(&self) {
        let (true, Some(controls)) = (self.coin, self.controls.as_ref()) else {
            return;
        };
        if let Some((input, pressed)) = scripted_input(self.frames) {
            log::info!("frame {}: {input:?} {}", self.frames, if pressed { "down" } else { "up" });
            controls.set(input, pressed);
        }
    }

    /// Take one last look at video RAM and hand back the frame.
    pub(crate) fn finish(&mut self) -> &Frame {
        self.frame.capture(&self.view);
        &self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retro8080_core::{Machine, PortHandler, Profile};
    use retro8080_invaders::InvadersPorts;

    #[test]
    fn stops_when_the_worker_finishes() {
        let machine = Machine::new(Profile::Documented);
        let mut presenter = Presenter::new(machine.view(), Orientation::Raw, false, None, false);
        let worker = std::thread::spawn(|| std::thread::sleep(Duration::from_millis(50)));

        presenter.run(&worker, &Shutdown::new(), None);
        assert!(worker.is_finished());
        assert!(presenter.frames() >= 1);
        worker.join().unwrap();
    }

    #[test]
    fn deadline_requests_shutdown() {
        let machine = Machine::new(Profile::Documented);
        let mut presenter = Presenter::new(machine.view(), Orientation::Raw, false, None, false);
        let shutdown = Shutdown::new();
        let worker = {
            let shutdown = shutdown.clone();
            std::thread::spawn(move || {
                while !shutdown.is_requested() {
                    std::thread::sleep(Duration::from_millis(1));
                }
            })
        };

        presenter.run(&worker, &shutdown, Some(Instant::now() + Duration::from_millis(40)));
        assert!(shutdown.is_requested());
        worker.join().unwrap();
    }

    #[test]
    fn coin_script_presses_then_releases() {
        assert_eq!(scripted_input(60), Some((Input::Coin, true)));
        assert_eq!(scripted_input(66), Some((Input::Coin, false)));
        assert_eq!(scripted_input(120), Some((Input::P1Start, true)));
        assert_eq!(scripted_input(61), None);

        let mut ports = InvadersPorts::default();
        let machine = Machine::new(Profile::Documented);
        let mut presenter = Presenter::new(
            machine.view(),
            Orientation::Raw,
            false,
            Some(ports.controls()),
            true,
        );
        presenter.frames = 60;
        presenter.drive_inputs();
        assert_eq!(ports.input(1) & 0x01, 0x01);
    }

    #[test]
    fn finish_sees_the_latest_vram() {
        let mut machine = Machine::new(Profile::Documented);
        let mut presenter = Presenter::new(machine.view(), Orientation::Raw, false, None, false);
        machine.memory_mut().write(0x2400, 0x0F);
        assert_eq!(presenter.finish().lit_pixels(), 4);
    }
}
