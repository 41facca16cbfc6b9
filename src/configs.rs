//! Configuration structs for the CCP engine
//!
//! [`CcpConfig`] is passed to the engine on construction. The defaults are a
//! sane starting point for a DWM1001 running a 1 MHz timer.
//!
//! [`CcpConfig`]: struct.CcpConfig.html

use crate::mac;

/// Default blink period, in protocol microseconds
pub const DEFAULT_PERIOD: u32 = 1_000_000;

/// Default guard latency, in protocol microseconds
pub const DEFAULT_OS_LATENCY: u32 = 1_000;

/// Default tick rate of the scheduler timer
pub const DEFAULT_OS_TICKS_PER_SECOND: u32 = 1_000_000;

/// CCP engine configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CcpConfig {
    /// The blink period, in protocol microseconds.
    ///
    /// Converted to DW1000 ticks by shifting left by 15 bits. Each cycle
    /// advances the transmission time by two of those.
    pub period: u32,
    /// Worst-case dispatch latency of the host scheduler, in protocol
    /// microseconds.
    ///
    /// The scheduler is rearmed this much ahead of the next transmission, so
    /// the delayed start can still be programmed in time.
    pub os_latency: u32,
    /// The number of timer ticks per second.
    ///
    /// Used to convert protocol microseconds into values for
    /// `CountDown::start`.
    pub os_ticks_per_second: u32,
    /// The short address of this node. Written into every transmitted blink.
    pub local_address: mac::ShortAddress,
}

impl Default for CcpConfig {
    fn default() -> Self {
        CcpConfig {
            period: DEFAULT_PERIOD,
            os_latency: DEFAULT_OS_LATENCY,
            os_ticks_per_second: DEFAULT_OS_TICKS_PER_SECOND,
            local_address: mac::ShortAddress(0),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Whether a blink waits for its transmission to complete
pub enum Mode {
    /// Return only after the TX-complete callback has run
    Blocking,
    /// Return right after the transmission has been issued
    NonBlocking,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Blocking
    }
}
