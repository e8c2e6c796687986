use crate::cpu::Snapshot;

/// The decoder fetched a byte that maps to no implemented instruction.
///
/// `pc` is the address the opcode was fetched from. The CPU rewinds its program
/// counter to that address before returning, so `snapshot` describes the
/// machine exactly as it stood before the failed fetch.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unimplemented 8080 opcode 0x{opcode:02X} at PC=0x{pc:04X} [{snapshot}]")]
pub struct DecodeError {
    pub opcode: u8,
    pub pc: u16,
    pub snapshot: Snapshot,
}

/// A bulk copy would have run past the end of the 64 KiB address space.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{len} byte block at 0x{offset:04X} does not fit in 64 KiB of memory")]
pub struct LoadError {
    pub offset: u16,
    pub len: usize,
}
