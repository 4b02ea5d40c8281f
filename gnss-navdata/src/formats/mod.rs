//! Navigation message format decoders
//!
//! Each decoder turns one [`PackedNavBits`] frame of a given format into zero
//! or more [`NavMessage`]s. Implementors write [`FormatDecoder::decode_frame`];
//! callers use [`FormatDecoder::decode`], which is the error boundary: faults
//! are logged there and returned as a per-frame failure, and the next frame is
//! unaffected.

use crate::frame::PackedNavBits;
use crate::messages::NavMessage;
use crate::types::{DecodeError, NavSignalId, NavType};

pub mod cnav2;

pub use cnav2::CNav2Decoder;

/// Common trait for all format decoders
pub trait FormatDecoder {
    /// Short format name, e.g. "GPS_CNAV2"
    fn format_name(&self) -> &'static str;

    /// True if frames of this nav type are handled by the decoder
    fn handles(&self, nav: NavType) -> bool;

    /// Signals the decoder can produce messages for
    fn supported_signals(&self) -> Vec<NavSignalId>;

    /// Set the emission toggles (ephemeris, almanac/health/time offset/iono)
    fn set_process(&mut self, eph: bool, alm: bool);

    /// Decode one frame without logging
    fn decode_frame(&self, frame: &PackedNavBits) -> Result<Vec<NavMessage>, DecodeError>;

    /// Decode one frame, logging rejections and faults
    fn decode(&self, frame: &PackedNavBits) -> Result<Vec<NavMessage>, DecodeError> {
        match self.decode_frame(frame) {
            Ok(messages) => Ok(messages),
            Err(err) if err.is_fault() => {
                log::error!(
                    "{} decode fault for {} at {}: {}",
                    self.format_name(),
                    frame.sat(),
                    frame.transmit_time(),
                    err
                );
                Err(err)
            }
            Err(err) => {
                log::debug!("{} rejected frame from {}: {}", self.format_name(), frame.sat(), err);
                Err(err)
            }
        }
    }
}
