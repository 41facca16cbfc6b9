//! Periodic scheduling of blink transmissions
//!
//! The host timer only gets the engine close to the next transmission. The
//! exact transmission instant is programmed into the DW1000 as a delayed
//! start, so the scheduler fires `os_latency` ahead of time to leave room for
//! dispatch jitter.

use core::convert::Infallible;

use embedded_hal::timer::{Cancel, CountDown};


/// Wraps the host timer that drives timer-based blinks
///
/// Any timer that implements `CountDown` and `Cancel` will do, as long as its
/// `Time` can be created from a number of ticks.
#[derive(Debug)]
pub struct Scheduler<T> {
    timer:            T,
    ticks_per_second: u32,
    latency:          u32,
    pending:          bool,
}

impl<T> Scheduler<T>
    where
        T:       CountDown + Cancel,
        T::Time: From<u32>,
{
    /// Creates a new scheduler
    ///
    /// `latency` is in protocol microseconds, `ticks_per_second` is the rate
    /// of `timer`.
    pub fn new(timer: T, ticks_per_second: u32, latency: u32) -> Self {
        Scheduler {
            timer,
            ticks_per_second,
            latency,
            pending: false,
        }
    }

    /// Arms the bootstrap timeout
    ///
    /// The first firing happens 10 ms from now, regardless of the period.
    pub fn start(&mut self) {
        let ticks = self.ticks_per_second / 100;
        self.arm(ticks);
    }

    /// Arms the next firing, `period - latency` from now
    ///
    /// A latency larger than the period makes the timer fire right away.
    pub fn rearm(&mut self, period: u32) {
        let ticks = self.ticks_for(period.saturating_sub(self.latency));
        self.arm(ticks);
    }

    /// Cancels any pending firing
    ///
    /// Can be called any number of times.
    pub fn stop(&mut self) {
        // Cancelling an idle timer is an error for some HALs. That's fine,
        // there's nothing to cancel then.
        let _ = self.timer.cancel();
        self.pending = false;
    }

    /// Waits for the timer to fire
    ///
    /// Returns `Ok` exactly once per arming. If nothing is armed, this
    /// returns `WouldBlock`, no matter what the timer itself reports.
    pub fn wait(&mut self) -> nb::Result<(), Infallible> {
        if !self.pending {
            return Err(nb::Error::WouldBlock);
        }

        match self.timer.wait() {
            Ok(()) => {
                self.pending = false;
                Ok(())
            }
            Err(nb::Error::WouldBlock) =>
                Err(nb::Error::WouldBlock),
            Err(_) =>
                unreachable!(),
        }
    }

    /// Indicates whether a firing is pending
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Converts protocol microseconds into timer ticks
    ///
    /// Saturates at `u32::MAX` ticks.
    pub fn ticks_for(&self, micros: u32) -> u32 {
        let ticks = self.ticks_per_second as u64 * micros as u64 / 1_000_000;

        if ticks > u32::MAX as u64 {
            u32::MAX
        }
        else {
            ticks as u32
        }
    }

    /// Provides direct access to the timer
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Provides direct mutable access to the timer
    ///
    /// Use at your own risk. Restarting the timer behind the scheduler's
    /// back will confuse it.
    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Destroys the scheduler and returns the timer
    pub fn free(self) -> T {
        self.timer
    }

    fn arm(&mut self, ticks: u32) {
        self.timer.start(ticks);
        self.pending = true;
    }
}
