use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::error::LoadError;

/// Total addressable memory size (64 KiB).
pub const MEMORY_SIZE: usize = 0x10000;

/// Flat, byte-addressable 64 KiB store owned by the CPU side of the machine.
///
/// Addresses are `u16`, so every access lands inside the backing store. The
/// cells are atomics so that a [`MemoryView`] on another thread can read video
/// RAM while the CPU keeps writing. No snapshot is taken: a reader may observe a
/// frame that is only partly updated.
pub struct Memory {
    cells: Arc<[AtomicU8]>,
}

impl Memory {
    /// Allocate a zero-initialised address space.
    pub fn new() -> Self {
        let cells: Arc<[AtomicU8]> = (0..MEMORY_SIZE).map(|_| AtomicU8::new(0)).collect();
        Self { cells }
    }

    #[inline]
    pub fn read(&self, addr: u16) -> u8 {
        self.cells[addr as usize].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write(&mut self, addr: u16, value: u8) {
        self.cells[addr as usize].store(value, Ordering::Relaxed);
    }

    /// Copy `bytes` verbatim into memory starting at `offset`.
    ///
    /// Used by ROM loaders to build up the address space before execution
    /// starts. Blocks that would run past 0xFFFF are rejected untouched.
    pub fn load_block(&mut self, bytes: &[u8], offset: u16) -> Result<(), LoadError> {
        let start = offset as usize;
        let end = start + bytes.len();
        if end > MEMORY_SIZE {
            return Err(LoadError {
                offset,
                len: bytes.len(),
            });
        }
        for (cell, &byte) in self.cells[start..end].iter().zip(bytes) {
            cell.store(byte, Ordering::Relaxed);
        }
        Ok(())
    }

    /// Hand out a read-only handle onto the same cells.
    pub fn view(&self) -> MemoryView {
        MemoryView {
            cells: Arc::clone(&self.cells),
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memory")
            .field("size", &self.cells.len())
            .finish()
    }
}

/// Read-only window onto a [`Memory`], safe to move to another thread.
#[derive(Clone)]
pub struct MemoryView {
    cells: Arc<[AtomicU8]>,
}

impl MemoryView {
    #[inline]
    pub fn read(&self, addr: u16) -> u8 {
        self.cells[addr as usize].load(Ordering::Relaxed)
    }

    /// Fill `out` with the bytes starting at `start`, wrapping at 0xFFFF.
    pub fn copy_into(&self, start: u16, out: &mut [u8]) {
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.read(start.wrapping_add(i as u16));
        }
    }
}

impl fmt::Debug for MemoryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryView")
            .field("size", &self.cells.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Memory, MEMORY_SIZE};

    #[test]
    fn starts_zeroed_and_covers_the_whole_address_space() {
        let mut memory = Memory::new();
        assert_eq!(memory.read(0x0000), 0);
        assert_eq!(memory.read(0xFFFF), 0);

        memory.write(0xFFFF, 0xAB);
        assert_eq!(memory.read(0xFFFF), 0xAB);
    }

    #[test]
    fn load_block_copies_at_offset() {
        let mut memory = Memory::new();
        memory.load_block(&[0xC3, 0x00, 0x10], 0x0800).unwrap();
        assert_eq!(memory.read(0x07FF), 0x00);
        assert_eq!(memory.read(0x0800), 0xC3);
        assert_eq!(memory.read(0x0802), 0x10);
    }

    #[test]
    fn load_block_fills_exactly_to_the_top() {
        let mut memory = Memory::new();
        memory.load_block(&[1, 2], 0xFFFE).unwrap();
        assert_eq!(memory.read(0xFFFF), 2);

        let whole = vec![0x55; MEMORY_SIZE];
        memory.load_block(&whole, 0).unwrap();
        assert_eq!(memory.read(0x1234), 0x55);
    }

    #[test]
    fn load_block_rejects_overflow_without_writing() {
        let mut memory = Memory::new();
        let err = memory.load_block(&[9, 9, 9], 0xFFFE).unwrap_err();
        assert_eq!(err.offset, 0xFFFE);
        assert_eq!(err.len, 3);
        assert_eq!(memory.read(0xFFFE), 0);
    }

    #[test]
    fn view_observes_later_writes() {
        let mut memory = Memory::new();
        let view = memory.view();
        memory.write(0x2400, 0x81);
        assert_eq!(view.read(0x2400), 0x81);

        let mut out = [0u8; 3];
        memory.write(0xFFFF, 7);
        memory.write(0x0000, 8);
        view.copy_into(0xFFFF, &mut out);
        assert_eq!(out, [7, 8, 0]);
    }

    #[test]
    fn view_reads_from_another_thread() {
        let mut memory = Memory::new();
        memory.write(0x3FFF, 0x42);
        let view = memory.view();
        let seen = std::thread::spawn(move || view.read(0x3FFF)).join().unwrap();
        assert_eq!(seen, 0x42);
    }
}
