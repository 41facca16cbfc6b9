//! Consumers of calibration results
//!
//! The receive path never processes calibration results inline. It queues a
//! snapshot of the current and the previous frame, and the host drains that
//! queue from ordinary task context by calling [`Ccp::process_events`]. What
//! happens with the snapshots is up to the [`Postprocess`] implementation
//! the engine was built with. By default, that's [`Telemetry`], which logs
//! each result and keeps the most recent one.
//!
//! [`Ccp::process_events`]: ../ccp/struct.Ccp.html#method.process_events
//! [`Postprocess`]: trait.Postprocess.html
//! [`Telemetry`]: struct.Telemetry.html

use serde::Serialize;

use crate::frame::CcpFrame;


/// Mask applied to time stamp deltas (36 bits)
pub const DELTA_MASK: u64 = 0x0F_FFFF_FFFF;


/// Consumes calibration results
///
/// Implemented for every `FnMut(&CcpFrame, &CcpFrame)`, so a closure works
/// as a consumer.
pub trait Postprocess {
    /// Handles the result of one reception
    fn postprocess(&mut self, current: &CcpFrame, previous: &CcpFrame);
}

impl<F> Postprocess for F where F: FnMut(&CcpFrame, &CcpFrame) {
    fn postprocess(&mut self, current: &CcpFrame, previous: &CcpFrame) {
        self(current, previous)
    }
}


/// Which path produced a record
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordKind {
    /// Produced on the clock master, after a blink was sent
    Transmission,
    /// Produced on a slave, after a blink was received
    Reception,
}

/// A single calibration result
///
/// Only meaningful while the engine's status is valid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationRecord {
    /// Which path produced the record
    pub kind: RecordKind,
    /// Transmission or reception time stamp of the current frame
    pub timestamp: u64,
    /// Signed difference to the previous frame's time stamp
    pub delta: i64,
    /// Sequence number of the current frame
    pub seq_num: u8,
    /// Correction factor of the current frame
    pub correction_factor: f32,
}

impl CalibrationRecord {
    /// Creates a record from two consecutively sent frames
    pub fn transmission(current: &CcpFrame, previous: &CcpFrame) -> Self {
        CalibrationRecord {
            kind:              RecordKind::Transmission,
            timestamp:         current.transmission_timestamp,
            delta:             masked_delta(
                current.transmission_timestamp,
                previous.transmission_timestamp,
            ),
            seq_num:           current.seq_num,
            correction_factor: current.correction_factor,
        }
    }

    /// Creates a record from two consecutively received frames
    pub fn reception(current: &CcpFrame, previous: &CcpFrame) -> Self {
        CalibrationRecord {
            kind:              RecordKind::Reception,
            timestamp:         current.reception_timestamp,
            delta:             masked_delta(
                current.reception_timestamp,
                previous.reception_timestamp,
            ),
            seq_num:           current.seq_num,
            correction_factor: current.correction_factor,
        }
    }
}

/// Computes `later - earlier`, masked to 36 bits and sign-extended
pub fn masked_delta(later: u64, earlier: u64) -> i64 {
    let delta = later.wrapping_sub(earlier) & DELTA_MASK;
    ((delta << 28) as i64) >> 28
}


/// The default consumer
///
/// Logs every reception result and remembers the latest one.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Telemetry {
    last:  Option<CalibrationRecord>,
    count: u32,
}

impl Telemetry {
    /// Creates an empty instance
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent record, if any
    pub fn last(&self) -> Option<&CalibrationRecord> {
        self.last.as_ref()
    }

    /// The number of records handled so far
    pub fn count(&self) -> u32 {
        self.count
    }
}

impl Postprocess for Telemetry {
    fn postprocess(&mut self, current: &CcpFrame, previous: &CcpFrame) {
        let record = CalibrationRecord::reception(current, previous);

        info!(
            "ccp rx: ts={} delta={} seq={} correction={}",
            record.timestamp,
            record.delta,
            record.seq_num,
            record.correction_factor,
        );

        self.count = self.count.wrapping_add(1);
        self.last  = Some(record);
    }
}
