use embedded_hal::timer::{Cancel, CountDown};

use crate::{
    frame::BlinkHeader,
    postprocess::Postprocess,
    radio::{tracking_offset, Register, Transceiver},
};

use super::{Ccp, Error};


impl<'a, R, T, P> Ccp<'a, R, T, P>
    where
        R:       Transceiver,
        T:       CountDown + Cancel,
        T::Time: From<u32>,
        P:       Postprocess,
{
    /// Default RX-complete callback
    ///
    /// Advances the frame index. Once at least two frames have been received
    /// since the last start, the received blink header and its reception
    /// time stamp are stored in the current slot, and the correction factor
    /// is computed from the receiver's time tracking registers:
    ///
    /// `correction_factor = 1 + offset / interval`
    ///
    /// If postprocessing is enabled, a snapshot of the current and the
    /// previous frame is queued for [`Ccp::process_events`]. If the queue is
    /// full, the oldest snapshot is dropped.
    ///
    /// [`Ccp::process_events`]: #method.process_events
    pub fn on_rx_complete(&mut self, radio: &mut R) -> Result<(), Error<R::Error>> {
        self.idx = self.idx.wrapping_add(1);
        self.status.valid |= self.idx > 1;

        if !self.status.valid {
            return Ok(());
        }

        let mut buffer = [0; BlinkHeader::LEN];
        radio.read_rx(&mut buffer, 0)
            .map_err(Error::Transceiver)?;
        let header = BlinkHeader::decode(&buffer)?;

        let rx_time = radio.read_rx_time()
            .map_err(Error::Transceiver)?;

        let interval = radio.read_reg(Register::RxTtcki, 0, 4)
            .map_err(Error::Transceiver)? as u32;
        let offset = tracking_offset(
            radio.read_reg(Register::RxTtcko, 0, 3)
                .map_err(Error::Transceiver)?
        );

        let correction_factor = if interval == 0 {
            warn!("ccp rx: tracking interval is zero");
            1.0
        }
        else {
            1.0 + offset as f32 / interval as f32
        };

        let frame = self.frames.slot_mut(self.idx)
            .ok_or(Error::NotInitialized)?;
        frame.set_header(header);
        frame.reception_timestamp = rx_time.value();
        frame.correction_factor   = correction_factor;

        debug!(
            "ccp rx: seq={} rx_time={} offset={} interval={}",
            header.seq_num,
            rx_time.value(),
            offset,
            interval,
        );

        if self.postprocess_enabled {
            self.enqueue_postprocess();
        }

        Ok(())
    }

    fn enqueue_postprocess(&mut self) {
        let snapshot = match (self.current(), self.previous()) {
            (Some(current), Some(previous)) => (*current, *previous),
            _ => return,
        };

        if self.pending.is_full() {
            warn!("ccp postprocess queue full, dropping oldest");
            let _ = self.pending.dequeue();
        }

        // Can't fail, there's room now
        let _ = self.pending.enqueue(snapshot);
    }
}
