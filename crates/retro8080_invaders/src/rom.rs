use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use retro8080_core::Machine;

/// The four 2 KiB program ROMs of the arcade board, in load order.
pub const INVADERS_ROM_SET: [(&str, u16); 4] = [
    ("invaders.h", 0x0000),
    ("invaders.g", 0x0800),
    ("invaders.f", 0x1000),
    ("invaders.e", 0x1800),
];

/// A file to copy into memory at a fixed offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RomSegment {
    pub path: PathBuf,
    pub offset: u16,
}

impl RomSegment {
    pub fn new(path: impl Into<PathBuf>, offset: u16) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }

    /// Expand a directory into the four-file Space Invaders set. Any other
    /// path is returned as-is.
    pub fn expand(self) -> Vec<RomSegment> {
        if !self.path.is_dir() {
            return vec![self];
        }
        INVADERS_ROM_SET
            .iter()
            .map(|(name, offset)| {
                RomSegment::new(self.path.join(name), self.offset.saturating_add(*offset))
            })
            .collect()
    }
}

fn parse_offset(text: &str) -> Result<u16> {
    let text = text.trim();
    let parsed = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .or_else(|| text.strip_prefix('$'))
    {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => text.parse::<u16>(),
    };
    parsed.map_err(|e| anyhow!("invalid load offset '{text}': {e}"))
}

/// `FILE` loads at 0x0000; `FILE@OFFSET` at OFFSET (decimal, `0x` or `$` hex).
impl FromStr for RomSegment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            bail!("empty ROM path");
        }
        match s.rsplit_once('@') {
            Some((path, offset)) if !path.is_empty() => {
                Ok(RomSegment::new(path, parse_offset(offset)?))
            }
            _ => Ok(RomSegment::new(s, 0)),
        }
    }
}

impl fmt::Display for RomSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#06x}", self.path.display(), self.offset)
    }
}

fn load_one(machine: &mut Machine, segment: &RomSegment) -> Result<usize> {
    let bytes = std::fs::read(&segment.path)
        .with_context(|| format!("failed to read ROM {}", segment.path.display()))?;
    machine
        .load_block(&bytes, segment.offset)
        .with_context(|| format!("failed to load ROM {segment}"))?;
    log::info!("loaded {} ({} bytes)", segment, bytes.len());
    Ok(bytes.len())
}

/// Load every segment, directories expanded to the arcade ROM set, and
/// return the total number of bytes copied.
pub fn load_segments(machine: &mut Machine, segments: &[RomSegment]) -> Result<usize> {
    let mut total = 0;
    for segment in segments {
        for part in segment.clone().expand() {
            total += load_one(machine, &part)?;
        }
    }
    Ok(total)
}
