use embedded_hal::timer::{Cancel, CountDown};

use crate::{
    postprocess::{CalibrationRecord, Postprocess},
    radio::Transceiver,
};

use super::{Ccp, Error};


/// A radio event callback
///
/// Called by [`Ccp::handle_event`] with the engine and the radio that
/// reported the event.
///
/// [`Ccp::handle_event`]: struct.Ccp.html#method.handle_event
pub type Callback<'a, R, T, P> =
    fn(&mut Ccp<'a, R, T, P>, &mut R)
        -> Result<(), Error<<R as Transceiver>::Error>>;

/// The callbacks an engine dispatches radio events to
pub struct Callbacks<'a, R: Transceiver, T, P> {
    /// Called when a frame has been received
    pub rx_complete: Callback<'a, R, T, P>,
    /// Called when a blink has been sent
    pub tx_complete: Callback<'a, R, T, P>,
    /// Called when a blink never completed
    pub tx_timeout: Callback<'a, R, T, P>,
}

impl<'a, R, T, P> Default for Callbacks<'a, R, T, P>
    where
        R:       Transceiver,
        T:       CountDown + Cancel,
        T::Time: From<u32>,
        P:       Postprocess,
{
    fn default() -> Self {
        Callbacks {
            rx_complete: Ccp::on_rx_complete,
            tx_complete: Ccp::on_tx_complete,
            tx_timeout:  Ccp::on_tx_timeout,
        }
    }
}

// Can't be derived without putting requirements on `R`, `T` and `P`.
impl<'a, R: Transceiver, T, P> Clone for Callbacks<'a, R, T, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, R: Transceiver, T, P> Copy for Callbacks<'a, R, T, P> {}


impl<'a, R, T, P> Ccp<'a, R, T, P>
    where
        R:       Transceiver,
        T:       CountDown + Cancel,
        T::Time: From<u32>,
        P:       Postprocess,
{
    /// Replaces the radio event callbacks
    ///
    /// The defaults are [`Ccp::on_rx_complete`], [`Ccp::on_tx_complete`] and
    /// [`Ccp::on_tx_timeout`]. Replacements will usually want to call them.
    /// Note that the transmit path relies on the TX callbacks releasing the
    /// transmitter.
    ///
    /// [`Ccp::on_rx_complete`]: #method.on_rx_complete
    /// [`Ccp::on_tx_complete`]: #method.on_tx_complete
    /// [`Ccp::on_tx_timeout`]: #method.on_tx_timeout
    pub fn set_callbacks(&mut self,
        rx_complete: Callback<'a, R, T, P>,
        tx_complete: Callback<'a, R, T, P>,
        tx_timeout:  Callback<'a, R, T, P>,
    ) {
        self.callbacks = Callbacks {
            rx_complete,
            tx_complete,
            tx_timeout,
        };
    }

    /// Provides access to the registered callbacks
    pub fn callbacks(&self) -> &Callbacks<'a, R, T, P> {
        &self.callbacks
    }

    /// Default TX-complete callback
    ///
    /// Records telemetry for the blink that was just sent, advances the
    /// frame index, schedules the next blink if timer-driven blinks are
    /// active, and releases the transmitter.
    pub fn on_tx_complete(&mut self, _: &mut R) -> Result<(), Error<R::Error>> {
        let record = match (self.current(), self.previous()) {
            (Some(current), Some(previous)) =>
                Some(CalibrationRecord::transmission(current, previous)),
            _ =>
                None,
        };

        if let Some(record) = record {
            info!(
                "ccp tx: ts={} delta={} seq={}",
                record.timestamp,
                record.delta,
                record.seq_num,
            );
            self.last_transmission = Some(record);
        }

        self.idx = self.idx.wrapping_add(1);

        if self.status.timer_armed {
            self.scheduler.rearm(self.period);
        }
        self.sem.release();

        Ok(())
    }

    /// Default TX-timeout callback
    ///
    /// Releases the transmitter and schedules the next attempt. The frame
    /// index stays where it is, so the next blink reuses the same slot.
    pub fn on_tx_timeout(&mut self, _: &mut R) -> Result<(), Error<R::Error>> {
        warn!("ccp tx timeout: idx={}", self.idx);

        self.sem.release();

        if self.status.timer_armed {
            self.scheduler.rearm(self.period);
        }

        Ok(())
    }
}
