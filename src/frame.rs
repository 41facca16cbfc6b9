//! The calibration frame and its wire format
//!
//! A CCP frame is an IEEE 802.15.4 blink frame: frame control, sequence
//! number and a 64-bit source address, nothing else. Only that header goes
//! over the air. The time stamps and the correction factor that
//! [`CcpFrame`] carries in addition are local bookkeeping.
//!
//! [`CcpFrame`]: struct.CcpFrame.html

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use ssmarshal;

/// Frame control codes used by blink frames
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FrameControl {
    /// Clock calibration blink, 64-bit source address
    BlinkCcp64 = 0xC2,
    /// Plain IEEE blink, 64-bit source address
    Blink64 = 0xC5,
}

/// The part of a calibration frame that is actually transmitted
///
/// Serialized with `ssmarshal`, which gives exactly the packed layout the
/// receiver expects: one byte frame control, one byte sequence number, eight
/// bytes little-endian source address.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(C)]
pub struct BlinkHeader {
    /// Frame control code
    pub fctrl: u8,
    /// Sequence number
    pub seq_num: u8,
    /// Source address
    pub long_address: u64,
}

impl BlinkHeader {
    /// The length of the header on the wire
    pub const LEN: usize = 10;

    /// Writes the header into `buf`, returning the number of bytes written
    ///
    /// Fails with `EndOfStream`, if `buf` is shorter than [`BlinkHeader::LEN`].
    ///
    /// [`BlinkHeader::LEN`]: #associatedconstant.LEN
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, ssmarshal::Error> {
        // ssmarshal treats a short buffer as a bug and asserts on it
        if buf.len() < Self::LEN {
            return Err(ssmarshal::Error::EndOfStream);
        }
        ssmarshal::serialize(buf, self)
    }

    /// Reads a header from the start of `buf`
    pub fn decode(buf: &[u8]) -> Result<Self, ssmarshal::Error> {
        if buf.len() < Self::LEN {
            return Err(ssmarshal::Error::EndOfStream);
        }
        let (header, _) = ssmarshal::deserialize::<Self>(buf)?;
        Ok(header)
    }
}

/// A calibration frame slot
///
/// The layout has no implicit padding. Serializing the whole frame with
/// `ssmarshal` is possible, but the engine never does that; it only ever
/// transmits the [`BlinkHeader`].
///
/// [`BlinkHeader`]: struct.BlinkHeader.html
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(C)]
pub struct CcpFrame {
    /// Frame control code
    pub fctrl: u8,
    /// Sequence number. Wraps.
    pub seq_num: u8,
    /// Source address
    pub long_address: u64,
    /// When this frame was (or is going to be) sent, in sender ticks
    pub transmission_timestamp: u64,
    /// When this frame was received, in receiver ticks
    pub reception_timestamp: u64,
    /// Receiver clock correction factor
    pub correction_factor: f32,
}

impl CcpFrame {
    /// Creates the default contents of slot `index` in an `n_frames` deep
    /// frame store
    ///
    /// Sequence numbers start at `256 - n_frames + index`, so that the first
    /// blink sent from each slot (which adds `n_frames`) carries sequence
    /// number `index`.
    pub fn for_slot(index: usize, n_frames: usize) -> Self {
        let seq_num = 0u8
            .wrapping_sub(n_frames as u8)
            .wrapping_add(index as u8);

        CcpFrame {
            fctrl: FrameControl::BlinkCcp64.into(),
            seq_num,
            long_address: 0,
            transmission_timestamp: 0,
            reception_timestamp: 0,
            correction_factor: 1.0,
        }
    }

    /// Returns the transmitted part of this frame
    pub fn header(&self) -> BlinkHeader {
        BlinkHeader {
            fctrl: self.fctrl,
            seq_num: self.seq_num,
            long_address: self.long_address,
        }
    }

    /// Overwrites the transmitted part of this frame
    ///
    /// Time stamps and correction factor are left alone.
    pub fn set_header(&mut self, header: BlinkHeader) {
        self.fctrl = header.fctrl;
        self.seq_num = header.seq_num;
        self.long_address = header.long_address;
    }

    /// Decodes the frame control code
    ///
    /// Returns `None`, if the code isn't one of the known blink codes.
    pub fn frame_control(&self) -> Option<FrameControl> {
        FrameControl::try_from_primitive(self.fctrl).ok()
    }
}

impl Default for CcpFrame {
    fn default() -> Self {
        CcpFrame::for_slot(0, 1)
    }
}
