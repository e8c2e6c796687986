use crate::cpu::{Bus8080, Cpu8080, Profile, Snapshot};
use crate::error::{DecodeError, LoadError};
use crate::memory::{Memory, MemoryView};
use crate::ports::PortHandler;

/// The emulated computer: one CPU and its 64 KiB address space.
///
/// Port devices are not owned here. They are lent to [`Machine::step`] so the
/// same machine can be driven with different handlers (the arcade board, a
/// test double, or nothing at all).
#[derive(Debug, Default)]
pub struct Machine {
    pub cpu: Cpu8080,
    memory: Memory,
}

/// Memory plus borrowed ports, wired up for the duration of one step.
struct SystemBus<'a, P: ?Sized> {
    memory: &'a mut Memory,
    ports: &'a mut P,
}

impl<P: PortHandler + ?Sized> Bus8080 for SystemBus<'_, P> {
    #[inline]
    fn mem_read(&mut self, addr: u16) -> u8 {
        self.memory.read(addr)
    }

    #[inline]
    fn mem_write(&mut self, addr: u16, value: u8) {
        self.memory.write(addr, value);
    }

    #[inline]
    fn io_read(&mut self, port: u8) -> u8 {
        self.ports.input(port)
    }

    #[inline]
    fn io_write(&mut self, port: u8, value: u8) {
        self.ports.output(port, value);
    }
}

impl Machine {
    /// Power-on state: registers zero, memory zero, PC at 0x0000.
    pub fn new(profile: Profile) -> Self {
        Self {
            cpu: Cpu8080::with_profile(profile),
            memory: Memory::new(),
        }
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Read-only handle for a consumer on another thread.
    pub fn view(&self) -> MemoryView {
        self.memory.view()
    }

    /// Copy a ROM segment into memory at `offset`.
    pub fn load_block(&mut self, bytes: &[u8], offset: u16) -> Result<(), LoadError> {
        self.memory.load_block(bytes, offset)?;
        log::debug!(
            "loaded {} bytes at {:#06x}..{:#06x}",
            bytes.len(),
            offset,
            offset as usize + bytes.len()
        );
        Ok(())
    }

    /// Fetch, decode and execute one instruction.
    pub fn step<P: PortHandler + ?Sized>(&mut self, ports: &mut P) -> Result<u32, DecodeError> {
        let mut bus = SystemBus {
            memory: &mut self.memory,
            ports,
        };
        self.cpu.step(&mut bus)
    }

    /// Raise a restart interrupt. Returns whether the CPU accepted it.
    pub fn interrupt<P: PortHandler + ?Sized>(&mut self, ports: &mut P, vector: u8) -> bool {
        let mut bus = SystemBus {
            memory: &mut self.memory,
            ports,
        };
        self.cpu.interrupt(&mut bus, vector)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.cpu.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::Machine;
    use crate::cpu::Profile;
    use crate::ports::{NullPorts, PortHandler};

    #[derive(Default)]
    struct Latch {
        last_out: Option<(u8, u8)>,
    }

    impl PortHandler for Latch {
        fn input(&mut self, port: u8) -> u8 {
            port.wrapping_mul(3)
        }

        fn output(&mut self, port: u8, value: u8) {
            self.last_out = Some((port, value));
        }
    }

    #[test]
    fn jmp_loaded_at_zero_lands_on_target() {
        let mut machine = Machine::new(Profile::Documented);
        machine.load_block(&[0xC3, 0x00, 0x10], 0).unwrap();

        let cycles = machine.step(&mut NullPorts).unwrap();
        assert_eq!(cycles, 10);
        assert_eq!(machine.cpu.regs.pc, 0x1000);
    }

    #[test]
    fn unknown_opcode_leaves_pc_on_the_opcode() {
        let mut machine = Machine::new(Profile::Documented);
        machine.load_block(&[0x00, 0xED], 0).unwrap();

        machine.step(&mut NullPorts).unwrap();
        let err = machine.step(&mut NullPorts).unwrap_err();
        assert_eq!(err.opcode, 0xED);
        assert_eq!(err.pc, 0x0001);
        assert_eq!(machine.cpu.regs.pc, 0x0001);
    }

    #[test]
    fn port_traffic_reaches_the_handler() {
        let mut machine = Machine::new(Profile::Documented);
        // IN 7; OUT 9
        machine.load_block(&[0xDB, 0x07, 0xD3, 0x09], 0).unwrap();

        let mut ports = Latch::default();
        machine.step(&mut ports).unwrap();
        assert_eq!(machine.cpu.regs.a, 21);
        machine.step(&mut ports).unwrap();
        assert_eq!(ports.last_out, Some((9, 21)));
    }

    #[test]
    fn stack_writes_are_visible_through_the_view() {
        let mut machine = Machine::new(Profile::Documented);
        let view = machine.view();
        machine.cpu.regs.sp = 0x2400;
        machine.cpu.regs.pc = 0xBEEF;
        machine.cpu.interrupts_enabled = true;

        assert!(machine.interrupt(&mut NullPorts, 2));
        assert_eq!(machine.cpu.regs.pc, 0x0010);
        assert_eq!(view.read(0x23FE), 0xEF);
        assert_eq!(view.read(0x23FF), 0xBE);
    }

    #[test]
    fn rejects_blocks_past_the_top_of_memory() {
        let mut machine = Machine::new(Profile::Documented);
        assert!(machine.load_block(&[0; 0x900], 0xF800).is_err());
    }
}
