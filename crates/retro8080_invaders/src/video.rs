use std::io::{self, Write};

use retro8080_core::MemoryView;

use crate::{SCREEN_HEIGHT, SCREEN_WIDTH, VRAM_SIZE, VRAM_START};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new_rgb(0, 0, 0);
    pub const WHITE: Color = Color::new_rgb(255, 255, 255);
    pub const RED: Color = Color::new_rgb(255, 0, 0);
    pub const GREEN: Color = Color::new_rgb(0, 255, 0);

    #[inline]
    pub const fn new_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// How video RAM maps onto the frame.
///
/// Each VRAM byte covers 8 vertically adjacent pixels of one column; there are
/// 224 columns of 32 bytes (32 * 8 = 256 rows).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    /// Bit 0 of each byte is the topmost pixel of its run.
    Raw,
    /// Flipped vertically, as the player sees the rotated cabinet monitor.
    #[default]
    Cabinet,
}

/// A 224x256 RGB24 frame decoded from video RAM.
#[derive(Clone, Debug)]
pub struct Frame {
    orientation: Orientation,
    overlay: bool,
    pixels: Vec<u8>,
    lit: usize,
}

impl Frame {
    /// `overlay` tints the bands the cabinet's colour gel covers.
    pub fn new(orientation: Orientation, overlay: bool) -> Self {
        Self {
            orientation,
            overlay,
            pixels: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT * 3],
            lit: 0,
        }
    }

    pub fn width(&self) -> usize {
        SCREEN_WIDTH
    }

    pub fn height(&self) -> usize {
        SCREEN_HEIGHT
    }

    /// RGB24, row-major, top row first.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of pixels switched on in the last decoded frame.
    pub fn lit_pixels(&self) -> usize {
        self.lit
    }

    /// Copy VRAM out of shared memory and decode it. The CPU may be writing
    /// while we copy; a torn frame is accepted.
    pub fn capture(&mut self, memory: &MemoryView) {
        let mut vram = [0u8; VRAM_SIZE];
        memory.copy_into(VRAM_START, &mut vram);
        self.decode(&vram);
    }

    /// Decode a 0x1c00-byte VRAM image.
    pub fn decode(&mut self, vram: &[u8]) {
        let width = SCREEN_WIDTH;
        let height = SCREEN_HEIGHT;
        debug_assert_eq!(vram.len(), VRAM_SIZE);

        self.lit = 0;
        let mut i = 0usize;
        for x in 0..width {
            for iy in (0..height).step_by(8) {
                let mut byte = vram.get(i).copied().unwrap_or(0);
                i += 1;
                for b in 0..8 {
                    let pixel_on = (byte & 1) != 0;
                    byte >>= 1;

                    let raw_y = iy + b;
                    let screen_y = match self.orientation {
                        Orientation::Raw => raw_y,
                        Orientation::Cabinet => height - raw_y - 1,
                    };

                    let color = if !pixel_on {
                        Color::BLACK
                    } else if !self.overlay {
                        Color::WHITE
                    } else if iy > 200 && iy < 220 {
                        Color::RED
                    } else if iy < 80 {
                        Color::GREEN
                    } else {
                        Color::WHITE
                    };
                    if pixel_on {
                        self.lit += 1;
                    }

                    let idx = (screen_y * width + x) * 3;
                    self.pixels[idx] = color.r;
                    self.pixels[idx + 1] = color.g;
                    self.pixels[idx + 2] = color.b;
                }
            }
        }
    }

    /// Write the frame as a binary PPM (P6) image.
    pub fn write_ppm<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", SCREEN_WIDTH, SCREEN_HEIGHT)?;
        out.write_all(&self.pixels)?;
        out.flush()
    }
}
