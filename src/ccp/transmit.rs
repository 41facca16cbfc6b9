use embedded_hal::timer::{Cancel, CountDown};

use crate::{
    configs::Mode,
    frame::BlinkHeader,
    postprocess::Postprocess,
    radio::{RadioEvent, Transceiver, TxStart},
    time::Instant,
};

use super::{Ccp, Error, Status};


impl<'a, R, T, P> Ccp<'a, R, T, P>
    where
        R:       Transceiver,
        T:       CountDown + Cancel,
        T::Time: From<u32>,
        P:       Postprocess,
{
    /// Runs the timer callback, if the scheduler has fired
    ///
    /// Sends one blink in the mode passed to [`Ccp::start`]. If that blink
    /// couldn't be sent in time, or failed with an error, no TX-complete
    /// event will follow, so the next blink is scheduled right here. The
    /// error is still returned.
    ///
    /// Returns `WouldBlock`, if the scheduler hasn't fired yet.
    ///
    /// [`Ccp::start`]: #method.start
    pub fn poll(&mut self, radio: &mut R) -> nb::Result<Status, Error<R::Error>> {
        match self.scheduler.wait() {
            Ok(()) =>
                (),
            Err(nb::Error::WouldBlock) =>
                return Err(nb::Error::WouldBlock),
            Err(nb::Error::Other(never)) =>
                match never {},
        }

        // No TX-complete event follows a failed or late blink
        let status = match self.blink(radio, self.mode) {
            Ok(status) => status,
            Err(error) => {
                if self.status.timer_armed && !self.scheduler.is_pending() {
                    self.scheduler.rearm(self.period);
                }
                return Err(nb::Error::Other(error));
            }
        };

        if status.start_tx_error && self.status.timer_armed {
            self.scheduler.rearm(self.period);
        }

        Ok(status)
    }

    /// Sends a single blink
    ///
    /// The transmission time is derived from the previous frame's, not from
    /// the current system time, which keeps blinks exactly two periods apart.
    ///
    /// Waits until the transmitter is available first. In `Mode::Blocking`,
    /// this also waits for the transmission to complete. Waiting means
    /// polling [`Transceiver::wait_tx`] and dispatching the TX-complete
    /// event to the registered callback, which happens here instead of in
    /// the interrupt handler in that case.
    ///
    /// If the radio reports that the transmission time had already passed,
    /// nothing is sent, `start_tx_error` is set in the returned status, and
    /// the previous frame's time stamp is moved forward by one period so the
    /// next attempt lands in the next epoch.
    ///
    /// [`Transceiver::wait_tx`]: ../radio/trait.Transceiver.html#tymethod.wait_tx
    pub fn blink(&mut self, radio: &mut R, mode: Mode)
        -> Result<Status, Error<R::Error>>
    {
        self.ensure_initialized()?;
        self.acquire(radio, false)?;

        let start = match self.program(radio) {
            Ok(start) => start,
            Err(error) => {
                self.sem.release();
                return Err(error);
            }
        };

        if start == TxStart::TooLate {
            // Half period delay warning. Try again in the next epoch.
            warn!("ccp blink too late: idx={}", self.idx);

            let period_ticks = self.period_ticks();
            if let Some(previous) = self.frames.previous_mut(self.idx) {
                previous.transmission_timestamp =
                    previous.transmission_timestamp.wrapping_add(period_ticks);
            }

            self.status.start_tx_error = true;
            self.sem.release();

            return Ok(self.status);
        }

        self.status.start_tx_error = false;

        if mode == Mode::Blocking {
            // Released by the TX-complete callback
            self.acquire(radio, true)?;
            self.sem.release();
        }

        Ok(self.status)
    }

    /// Prepares the current slot and issues the delayed transmission
    fn program(&mut self, radio: &mut R) -> Result<TxStart, Error<R::Error>> {
        let n_frames      = self.frames.len();
        let period_ticks  = self.period_ticks();
        let local_address = self.config.local_address.0 as u64;

        let previous = self.frames.previous(self.idx)
            .ok_or(Error::NotInitialized)?
            .transmission_timestamp;

        let frame = self.frames.slot_mut(self.idx)
            .ok_or(Error::NotInitialized)?;

        frame.transmission_timestamp =
            previous.wrapping_add(2 * period_ticks);
        frame.seq_num      = frame.seq_num.wrapping_add(n_frames as u8);
        frame.long_address = local_address;

        let header    = frame.header();
        let tx_time   = Instant::truncate(frame.transmission_timestamp);

        let mut buffer = [0; BlinkHeader::LEN];
        let len = header.encode(&mut buffer)?;

        radio.write_tx(&buffer[..len], 0)
            .map_err(Error::Transceiver)?;
        radio.write_tx_fctrl(len as u16, 0, true)
            .map_err(Error::Transceiver)?;
        radio.set_wait_for_response(false)
            .map_err(Error::Transceiver)?;
        radio.set_delay_start(tx_time)
            .map_err(Error::Transceiver)?;

        debug!(
            "ccp blink: seq={} tx_time={}",
            header.seq_num,
            tx_time.value(),
        );

        radio.start_tx()
            .map_err(Error::Transceiver)
    }

    /// Takes the transmitter, waiting for an ongoing transmission if needed
    ///
    /// `own` says whether the ongoing transmission is the one this blink just
    /// started. If the radio fails while waiting for it, the transmitter is
    /// released, as there's no telling whether it will ever complete. A
    /// transmission started elsewhere keeps the transmitter until its own
    /// TX-complete or TX-timeout event.
    fn acquire(&mut self, radio: &mut R, own: bool)
        -> Result<(), Error<R::Error>>
    {
        while !self.sem.try_acquire() {
            match radio.wait_tx() {
                Ok(()) => {
                    self.handle_event(radio, RadioEvent::TxComplete)?;
                }
                Err(nb::Error::WouldBlock) => {}
                Err(nb::Error::Other(error)) => {
                    if own {
                        self.sem.release();
                    }
                    return Err(Error::Transceiver(error));
                }
            }
        }

        Ok(())
    }
}
