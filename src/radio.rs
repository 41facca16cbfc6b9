//! The interface between the CCP engine and the radio
//!
//! The engine doesn't implement any register-level access itself. Whatever
//! driver is used to talk to the DW1000 needs to implement [`Transceiver`],
//! and report completion events to the engine as [`RadioEvent`]s.
//!
//! [`Transceiver`]: trait.Transceiver.html
//! [`RadioEvent`]: enum.RadioEvent.html

use num_enum::IntoPrimitive;

use crate::time::Instant;

/// Mask for the RXTOFS field of RX_TTCKO (19-bit signed integer)
pub const RX_TTCKO_RXTOFS_MASK: u32 = 0x0007_FFFF;

/// DW1000 registers the engine reads directly
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// Receiver Time Tracking Interval
    RxTtcki = 0x13,
    /// Receiver Time Tracking Offset
    RxTtcko = 0x14,
}

/// Result of issuing a transmission
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxStart {
    /// The transmission has been issued and will complete later
    Started,

    /// The programmed delayed start time had already passed
    ///
    /// This is the DW1000's half period delay warning. Nothing was sent.
    TooLate,
}

/// Completion events reported by the radio
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioEvent {
    /// A frame has been received
    RxComplete,
    /// A frame has been sent
    TxComplete,
    /// An issued transmission never completed
    TxTimeout,
}

/// Register-level operations the CCP engine needs from the radio
///
/// All offsets are byte offsets into the respective buffer or register.
pub trait Transceiver {
    /// Error that can occur while talking to the radio
    type Error;

    /// Writes `data` into the transmit buffer
    fn write_tx(&mut self, data: &[u8], offset: u16) -> Result<(), Self::Error>;

    /// Configures transmit frame control
    ///
    /// `len` is the length of the frame data, excluding the CRC.
    fn write_tx_fctrl(&mut self, len: u16, offset: u16, ranging: bool)
        -> Result<(), Self::Error>;

    /// Enables or disables switching to receive after the transmission
    fn set_wait_for_response(&mut self, enable: bool) -> Result<(), Self::Error>;

    /// Programs the delayed start time for the next transmission
    fn set_delay_start(&mut self, time: Instant) -> Result<(), Self::Error>;

    /// Issues the transmission
    fn start_tx(&mut self) -> Result<TxStart, Self::Error>;

    /// Waits for the issued transmission to finish
    ///
    /// Returns `Ok` once per transmission, `WouldBlock` while the
    /// transmission is still ongoing or if there is none.
    fn wait_tx(&mut self) -> nb::Result<(), Self::Error>;

    /// Reads from the receive buffer into `buffer`
    fn read_rx(&mut self, buffer: &mut [u8], offset: u16) -> Result<(), Self::Error>;

    /// Reads the time stamp of the last received frame
    fn read_rx_time(&mut self) -> Result<Instant, Self::Error>;

    /// Reads the current system time
    fn read_sys_time(&mut self) -> Result<Instant, Self::Error>;

    /// Reads `len` bytes (at most 8) of a register, little-endian
    fn read_reg(&mut self, register: Register, offset: u16, len: usize)
        -> Result<u64, Self::Error>;
}

/// Extracts the signed tracking offset from a raw RX_TTCKO value
pub(crate) fn tracking_offset(raw: u64) -> i32 {
    let rxtofs = raw as u32 & RX_TTCKO_RXTOFS_MASK;

    // Move the sign bit to the top, then shift back arithmetically
    ((rxtofs << 13) as i32) >> 13
}
