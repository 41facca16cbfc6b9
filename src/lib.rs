//! Clock Calibration Protocol (CCP) engine for the DW1000 UWB transceiver
//!
//! In an RTLS anchor network, one anchor (the clock master) periodically
//! broadcasts blink frames at hardware-exact instants, using the DW1000's
//! delayed transmission. Every other anchor receives those blinks, and
//! estimates the drift of its own clock relative to the master from the
//! receiver's time tracking registers.
//!
//! The entry point to this crate is [`Ccp`]. It doesn't talk to the radio
//! directly. Instead, it is handed a [`Transceiver`] implementation on every
//! call, which wraps whatever register-level driver is in use. Scheduling is
//! done using any timer that implements [`embedded_hal::timer::CountDown`].
//!
//! A master node typically looks like this:
//!
//! ``` rust,ignore
//! let mut ccp = Ccp::new(timer, CcpConfig::default());
//! ccp.init(&mut radio, 2, mac::ExtendedAddress(0x0102_0304_0506_0708))?;
//! ccp.start(&mut radio, Mode::Blocking)?;
//!
//! loop {
//!     // The scheduler only gets us close to the next transmission. The
//!     // DW1000's delayed start takes care of the exact timing.
//!     if let Ok(status) = ccp.poll(&mut radio) {
//!         // inspect `status.start_tx_error`
//!     }
//!     ccp.process_events();
//! }
//! ```
//!
//! [`Ccp`]: ccp/struct.Ccp.html
//! [`Transceiver`]: radio/trait.Transceiver.html

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod ccp;
pub mod configs;
pub mod frame;
pub mod postprocess;
pub mod radio;
pub mod scheduler;
pub mod store;
pub mod time;

pub use ieee802154::mac;

pub use crate::{
    ccp::{Callback, Callbacks, Ccp, Error, Status},
    configs::{CcpConfig, Mode},
    frame::{BlinkHeader, CcpFrame, FrameControl},
    postprocess::{CalibrationRecord, Postprocess, RecordKind, Telemetry},
    radio::{RadioEvent, Register, Transceiver, TxStart},
    scheduler::Scheduler,
    store::{FrameStore, MAX_FRAMES},
    time::{Instant, TIME_MAX},
};
