use bitflags::bitflags;

use super::Profile;

/// CPU flags for Intel 8080.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    pub z: bool,  // zero
    pub s: bool,  // sign
    pub p: bool,  // parity
    pub cy: bool, // carry
    pub ac: bool, // auxiliary carry
}

bitflags! {
    /// PSW flag byte as packed under [`Profile::Documented`].
    ///
    /// Bits 5-7 are written as zero and ignored on POP.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PackedPsw: u8 {
        const Z = 1 << 0;
        const S = 1 << 1;
        const P = 1 << 2;
        const CY = 1 << 3;
        const AC = 1 << 4;
    }
}

bitflags! {
    /// PSW flag byte of the shipped 8080, `S Z 0 AC 0 P 1 CY`.
    ///
    /// Bit 1 always reads back as one; bits 3 and 5 as zero.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct IntelPsw: u8 {
        const CY = 0x01;
        const ALWAYS_ONE = 0x02;
        const P = 0x04;
        const AC = 0x10;
        const Z = 0x40;
        const S = 0x80;
    }
}

/// Z, S, P and CY of an 8-bit operation evaluated at 16-bit width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArithmeticFlags {
    pub z: bool,
    pub s: bool,
    pub p: bool,
    pub cy: bool,
}

/// Even parity: true when `value` has an even number of set bits.
///
/// Zero has no set bits and therefore has parity.
#[inline]
pub fn parity(value: u8) -> bool {
    value.count_ones() % 2 == 0
}

/// Derive Z/S/P from the low byte of `result` and CY from anything above it.
///
/// Additions are widened before adding, so a carry shows up as bit 8.
/// Subtractions are computed with `wrapping_sub` on the widened operands, so a
/// borrow wraps into the high byte and reads as CY as well.
#[inline]
pub fn derive_arithmetic(result: u16) -> ArithmeticFlags {
    let low = result as u8;
    ArithmeticFlags {
        z: low == 0,
        s: low & 0x80 != 0,
        p: parity(low),
        cy: result > 0xff,
    }
}

/// Carry out of bit 3 of `a + b + carry`.
#[inline]
pub fn aux_carry_add(a: u8, b: u8, carry: bool) -> bool {
    (a & 0x0f) + (b & 0x0f) + u8::from(carry) > 0x0f
}

/// Auxiliary carry of `a - b - borrow`.
///
/// The 8080 subtracts by adding the one's complement with the carry-in
/// inverted, and AC reports the bit-3 carry of that addition.
#[inline]
pub fn aux_carry_sub(a: u8, b: u8, borrow: bool) -> bool {
    aux_carry_add(a, !b, !borrow)
}

impl Flags {
    /// Set Z, S and P from an 8-bit result.
    #[inline]
    pub fn set_zsp(&mut self, value: u8) {
        self.z = value == 0;
        self.s = (value & 0x80) != 0;
        self.p = parity(value);
    }

    #[inline]
    pub fn apply(&mut self, derived: ArithmeticFlags) {
        self.z = derived.z;
        self.s = derived.s;
        self.p = derived.p;
        self.cy = derived.cy;
    }

    /// Pack the flags into the PSW byte pushed alongside A.
    pub fn to_psw(self, profile: Profile) -> u8 {
        match profile {
            Profile::Documented => {
                let mut bits = PackedPsw::empty();
                bits.set(PackedPsw::Z, self.z);
                bits.set(PackedPsw::S, self.s);
                bits.set(PackedPsw::P, self.p);
                bits.set(PackedPsw::CY, self.cy);
                bits.set(PackedPsw::AC, self.ac);
                bits.bits()
            }
            Profile::Silicon => {
                let mut bits = IntelPsw::ALWAYS_ONE;
                bits.set(IntelPsw::Z, self.z);
                bits.set(IntelPsw::S, self.s);
                bits.set(IntelPsw::P, self.p);
                bits.set(IntelPsw::CY, self.cy);
                bits.set(IntelPsw::AC, self.ac);
                bits.bits()
            }
        }
    }

    /// Unpack a PSW byte popped from the stack.
    pub fn from_psw(byte: u8, profile: Profile) -> Self {
        match profile {
            Profile::Documented => {
                let bits = PackedPsw::from_bits_truncate(byte);
                Self {
                    z: bits.contains(PackedPsw::Z),
                    s: bits.contains(PackedPsw::S),
                    p: bits.contains(PackedPsw::P),
                    cy: bits.contains(PackedPsw::CY),
                    ac: bits.contains(PackedPsw::AC),
                }
            }
            Profile::Silicon => {
                let bits = IntelPsw::from_bits_truncate(byte);
                Self {
                    z: bits.contains(IntelPsw::Z),
                    s: bits.contains(IntelPsw::S),
                    p: bits.contains(IntelPsw::P),
                    cy: bits.contains(IntelPsw::CY),
                    ac: bits.contains(IntelPsw::AC),
                }
            }
        }
    }
}
