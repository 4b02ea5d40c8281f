//! Raw navigation frames
//!
//! A [`PackedNavBits`] is one unit of navigation bits as handed over by a
//! receiver or file reader, before any field is interpreted. Bits are stored
//! MSB first: bit 0 of the frame is the most significant bit of byte 0.

use crate::time::NavTime;
use crate::types::{NavError, NavSignalId, NavType, ObsId, Result, SatId};
use byteorder::{BigEndian, ByteOrder};

/// One raw navigation frame
#[derive(Debug, Clone, PartialEq)]
pub struct PackedNavBits {
    /// Transmitting satellite
    sat: SatId,
    obs: ObsId,
    nav: NavType,
    transmit_time: NavTime,
    num_bits: usize,
    bits: Vec<u8>,
}

impl PackedNavBits {
    /// Create an all-zero frame of `num_bits` bits
    pub fn zeroed(
        sat: SatId,
        obs: ObsId,
        nav: NavType,
        transmit_time: NavTime,
        num_bits: usize,
    ) -> Self {
        Self {
            sat,
            obs,
            nav,
            transmit_time,
            num_bits,
            bits: vec![0; num_bits.div_ceil(8)],
        }
    }

    /// Create a frame from MSB-first bytes
    ///
    /// Bytes beyond what `num_bits` needs are dropped, missing bytes are zero.
    pub fn from_bytes(
        sat: SatId,
        obs: ObsId,
        nav: NavType,
        transmit_time: NavTime,
        num_bits: usize,
        data: &[u8],
    ) -> Self {
        let mut bits = data.to_vec();
        bits.resize(num_bits.div_ceil(8), 0);
        Self {
            sat,
            obs,
            nav,
            transmit_time,
            num_bits,
            bits,
        }
    }

    /// Create a frame from 32-bit words, the way most receivers deliver subframes
    pub fn from_words(
        sat: SatId,
        obs: ObsId,
        nav: NavType,
        transmit_time: NavTime,
        num_bits: usize,
        words: &[u32],
    ) -> Self {
        let mut data = vec![0u8; words.len() * 4];
        BigEndian::write_u32_into(words, &mut data);
        Self::from_bytes(sat, obs, nav, transmit_time, num_bits, &data)
    }

    pub fn sat(&self) -> SatId {
        self.sat
    }

    pub fn obs(&self) -> ObsId {
        self.obs
    }

    pub fn nav(&self) -> NavType {
        self.nav
    }

    pub fn transmit_time(&self) -> NavTime {
        self.transmit_time
    }

    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    pub fn data(&self) -> &[u8] {
        &self.bits
    }

    /// Signal this frame was received on
    pub fn signal(&self) -> NavSignalId {
        NavSignalId {
            system: self.sat.system,
            obs: self.obs,
            nav: self.nav,
        }
    }

    /// Check that `[start, start + length)` lies inside the frame
    pub fn check_range(&self, start: usize, length: usize) -> Result<()> {
        if length > 64 {
            return Err(NavError::FieldWidth { length });
        }
        let end = start.checked_add(length);
        if end.map_or(true, |end| end > self.num_bits) {
            return Err(NavError::BitRange {
                start,
                length,
                available: self.num_bits,
            });
        }
        Ok(())
    }

    /// Read `length` bits starting at `start` as an unsigned integer
    pub fn raw_bits(&self, start: usize, length: usize) -> Result<u64> {
        self.check_range(start, length)?;
        let mut result: u64 = 0;
        for bit_pos in start..start + length {
            let bit_value = (self.bits[bit_pos / 8] >> (7 - bit_pos % 8)) & 0x01;
            result = (result << 1) | bit_value as u64;
        }
        Ok(result)
    }

    /// Overwrite `length` bits starting at `start` with the low bits of `raw`
    pub fn set_raw_bits(&mut self, start: usize, length: usize, raw: u64) -> Result<()> {
        self.check_range(start, length)?;
        for i in 0..length {
            let bit_pos = start + i;
            let mask = 1u8 << (7 - bit_pos % 8);
            if (raw >> (length - 1 - i)) & 0x01 != 0 {
                self.bits[bit_pos / 8] |= mask;
            } else {
                self.bits[bit_pos / 8] &= !mask;
            }
        }
        Ok(())
    }
}
