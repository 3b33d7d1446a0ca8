//! Common-anode 7-segment encoding.
//!
//! Segment `a` sits on register output Q0 (bit 0) through `g` on Q6, with
//! the decimal point on Q7. A segment lights when its line is driven low,
//! so the byte sent to the register is the complement of the lit set.

use bitflags::bitflags;

bitflags! {
    /// Lit segments of one digit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Segments: u8 {
        const A  = 0x01;
        const B  = 0x02;
        const C  = 0x04;
        const D  = 0x08;
        const E  = 0x10;
        const F  = 0x20;
        const G  = 0x40;
        const DP = 0x80;
    }
}

/// Every digit segment except `off`; the decimal point stays dark.
const fn unlit(off: Segments) -> Segments {
    Segments::all().difference(off.union(Segments::DP))
}

/// Lit segments for digits 0–9.
const DIGITS: [Segments; 10] = [
    unlit(Segments::G),
    Segments::B.union(Segments::C),
    unlit(Segments::C.union(Segments::F)),
    unlit(Segments::E.union(Segments::F)),
    unlit(Segments::A.union(Segments::D).union(Segments::E)),
    unlit(Segments::B.union(Segments::E)),
    unlit(Segments::B),
    Segments::A.union(Segments::B).union(Segments::C),
    unlit(Segments::empty()),
    unlit(Segments::E),
];

/// Register byte with every segment off.
pub const BLANK: u8 = 0xFF;

impl Segments {
    /// Byte to shift out for a common-anode display.
    #[inline]
    pub const fn to_pattern(self) -> u8 {
        !self.bits()
    }
}

/// Register byte for `digit`.
///
/// # Panics
/// Panics if `digit > 9`. Callers only request digits they configured.
pub const fn pattern(digit: u8) -> u8 {
    assert!(digit <= 9, "digit out of range");
    DIGITS[digit as usize].to_pattern()
}
