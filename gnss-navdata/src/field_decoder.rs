//! Field Decoding Engine
//!
//! Extracts scaled values from bit ranges of a raw frame based on field
//! definitions. Handles sign extension, linear and power-of-two scaling,
//! semicircle-to-radian conversion, reserved "unavailable" patterns and
//! truncated week numbers.

use crate::frame::PackedNavBits;
use crate::types::Result;
use std::f64::consts::PI;

/// Value type for field interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Two's complement integer
    Signed,
    /// Unsigned integer
    Unsigned,
}

/// Scale applied to the raw integer of a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// Multiply by a constant
    Factor(f64),
    /// Multiply by 2^n
    Power(i32),
}

impl Scale {
    fn apply(&self, value: f64) -> f64 {
        match self {
            Scale::Factor(factor) => value * factor,
            Scale::Power(n) => value * 2f64.powi(*n),
        }
    }
}

/// A navigation message field definition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDefinition {
    /// Field name (used in diagnostics)
    pub name: &'static str,
    /// First bit of the field, counting from the frame MSB
    pub start_bit: usize,
    /// Length in bits
    pub length: usize,
    pub value_type: ValueType,
    pub scale: Scale,
    /// Value is in semicircles and is returned in radians
    pub semicircles: bool,
    /// Raw pattern meaning "value not available"
    pub unavailable: Option<u64>,
}

impl FieldDefinition {
    pub const fn unsigned(
        name: &'static str,
        start_bit: usize,
        length: usize,
        scale: Scale,
    ) -> Self {
        Self {
            name,
            start_bit,
            length,
            value_type: ValueType::Unsigned,
            scale,
            semicircles: false,
            unavailable: None,
        }
    }

    pub const fn signed(name: &'static str, start_bit: usize, length: usize, scale: Scale) -> Self {
        Self {
            name,
            start_bit,
            length,
            value_type: ValueType::Signed,
            scale,
            semicircles: false,
            unavailable: None,
        }
    }

    /// Single bit flag, unscaled
    pub const fn flag(name: &'static str, start_bit: usize) -> Self {
        Self::unsigned(name, start_bit, 1, Scale::Factor(1.0))
    }

    pub const fn in_semicircles(self) -> Self {
        Self {
            semicircles: true,
            ..self
        }
    }

    pub const fn with_unavailable(self, pattern: u64) -> Self {
        Self {
            unavailable: Some(pattern),
            ..self
        }
    }

    /// Size of one least significant bit in output units
    pub fn lsb(&self) -> f64 {
        let lsb = self.scale.apply(1.0);
        if self.semicircles {
            lsb * PI
        } else {
            lsb
        }
    }
}

/// Field decoder - extracts values from raw frames
pub struct FieldDecoder;

impl FieldDecoder {
    /// Decode a field to its physical value
    ///
    /// Returns NaN when the raw bits equal the field's unavailable pattern.
    pub fn decode(frame: &PackedNavBits, field: &FieldDefinition) -> Result<f64> {
        let raw = frame.raw_bits(field.start_bit, field.length)?;

        // Checked before scaling: the pattern is defined on raw bits
        if field.unavailable == Some(raw) {
            return Ok(f64::NAN);
        }

        let value = match field.value_type {
            ValueType::Unsigned => raw as f64,
            ValueType::Signed => Self::sign_extend(raw, field.length) as f64,
        };

        let scaled = field.scale.apply(value);
        Ok(if field.semicircles { scaled * PI } else { scaled })
    }

    /// Decode an integer field (scale must be an integral factor or a non-negative power)
    pub fn decode_unsigned(frame: &PackedNavBits, field: &FieldDefinition) -> Result<u64> {
        let raw = frame.raw_bits(field.start_bit, field.length)?;
        Ok(match field.scale {
            Scale::Factor(factor) => raw.saturating_mul(factor as u64),
            Scale::Power(n) if n >= 0 => raw << n,
            Scale::Power(n) => raw >> -n,
        })
    }

    /// Decode a signed integer field
    pub fn decode_signed(frame: &PackedNavBits, field: &FieldDefinition) -> Result<i64> {
        let raw = frame.raw_bits(field.start_bit, field.length)?;
        let value = Self::sign_extend(raw, field.length);
        Ok(match field.scale {
            Scale::Factor(factor) => value.saturating_mul(factor as i64),
            Scale::Power(n) if n >= 0 => value << n,
            Scale::Power(n) => value >> -n,
        })
    }

    pub fn decode_bool(frame: &PackedNavBits, field: &FieldDefinition) -> Result<bool> {
        Ok(frame.raw_bits(field.start_bit, field.length)? != 0)
    }

    /// Write a physical value into a frame, rounding to the nearest LSB
    ///
    /// Inverse of [`FieldDecoder::decode`]; NaN writes the unavailable pattern
    /// when the field has one.
    pub fn encode(frame: &mut PackedNavBits, field: &FieldDefinition, value: f64) -> Result<()> {
        let raw = match (value.is_nan(), field.unavailable) {
            (true, Some(pattern)) => pattern,
            _ => {
                let counts = (value / field.lsb()).round() as i64;
                Self::truncate(counts, field.length)
            }
        };
        frame.set_raw_bits(field.start_bit, field.length, raw)
    }

    /// Sign-extend a value from N bits to 64 bits
    ///
    /// If the value's MSB is 1, fill the upper bits with 1s.
    /// This converts unsigned representation to proper signed value.
    pub fn sign_extend(value: u64, bit_length: usize) -> i64 {
        if bit_length == 0 || bit_length >= 64 {
            return value as i64;
        }

        let sign_bit = 1u64 << (bit_length - 1);
        if (value & sign_bit) != 0 {
            // Negative value - sign extend
            let mask = !0u64 << bit_length;
            (value | mask) as i64
        } else {
            value as i64
        }
    }

    fn truncate(value: i64, bit_length: usize) -> u64 {
        if bit_length >= 64 {
            value as u64
        } else {
            (value as u64) & ((1u64 << bit_length) - 1)
        }
    }
}

/// Resolve a week number transmitted with fewer bits than a full week
///
/// Returns the unique week congruent to `to_adjust` modulo 2^`bits` lying in
/// `[ref_week - 2^(bits-1), ref_week + 2^(bits-1))`. A zero-width field
/// carries no week information and resolves to `ref_week`; a field of 63 bits
/// or more cannot roll over and is returned unchanged.
pub fn time_adjust_week_rollover(to_adjust: i64, ref_week: i64, bits: u32) -> i64 {
    if bits == 0 {
        return ref_week;
    }
    if bits >= 63 {
        return to_adjust;
    }
    let modulus = 1i64 << bits;
    let half = modulus / 2;
    let diff = (to_adjust - ref_week).rem_euclid(modulus);
    if diff >= half {
        ref_week + diff - modulus
    } else {
        ref_week + diff
    }
}
