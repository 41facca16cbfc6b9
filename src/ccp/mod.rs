//! The clock calibration engine
//!
//! The entry point to this API is the [`Ccp`] struct. A single instance
//! tracks a single clock domain. On the clock master, it periodically sends
//! blinks at precisely spaced instants. On every other node, it receives
//! those blinks and computes the local clock's drift relative to the master.
//!
//! The engine never owns the radio. Every operation that needs to talk to
//! the radio borrows a [`Transceiver`] for the duration of the call, so the
//! same radio can be shared with ranging or other protocols in between.
//!
//! [`Ccp`]: struct.Ccp.html
//! [`Transceiver`]: ../radio/trait.Transceiver.html

use core::fmt;

use embedded_hal::timer::{Cancel, CountDown};
use heapless::spsc::Queue;

use crate::{
    configs::{CcpConfig, Mode},
    frame::CcpFrame,
    mac,
    postprocess::{CalibrationRecord, Postprocess, Telemetry},
    radio::{RadioEvent, Transceiver},
    scheduler::Scheduler,
    store::{FrameStore, MAX_FRAMES},
};

pub use callbacks::*;
pub use error::*;
pub use status::*;

use semaphore::Semaphore;

mod callbacks;
mod error;
mod receive;
mod semaphore;
mod status;
mod transmit;


/// Size of the postprocess queue
///
/// The queue holds one entry less than this.
pub const POSTPROCESS_QUEUE_SIZE: usize = 5;


/// Entry point to the clock calibration engine
///
/// `R` is the [`Transceiver`] the engine is used with, `T` the timer that
/// drives timer-based blinks, and `P` the [`Postprocess`] implementation
/// that consumes reception results.
///
/// [`Transceiver`]: ../radio/trait.Transceiver.html
/// [`Postprocess`]: ../postprocess/trait.Postprocess.html
pub struct Ccp<'a, R: Transceiver, T, P = Telemetry> {
    frames:              FrameStore<'a>,
    scheduler:           Scheduler<T>,
    sem:                 Semaphore,
    status:              Status,
    config:              CcpConfig,
    period:              u32,
    mode:                Mode,
    idx:                 u32,
    clock_master:        mac::ExtendedAddress,
    postprocess:         P,
    postprocess_enabled: bool,
    pending:             Queue<(CcpFrame, CcpFrame), POSTPROCESS_QUEUE_SIZE>,
    callbacks:           Callbacks<'a, R, T, P>,
    last_transmission:   Option<CalibrationRecord>,
}

impl<'a, R, T> Ccp<'a, R, T, Telemetry>
    where
        R:       Transceiver,
        T:       CountDown + Cancel,
        T::Time: From<u32>,
{
    /// Creates an engine with self-owned frame storage
    ///
    /// The storage is allocated by [`Ccp::init`].
    ///
    /// [`Ccp::init`]: #method.init
    pub fn new(timer: T, config: CcpConfig) -> Self {
        Self::build(FrameStore::new(), timer, config, Telemetry::new())
    }

    /// Creates an engine that uses externally owned frame storage
    ///
    /// The engine never releases `frames`. Its length is the number of
    /// frames [`Ccp::init`] must be called with.
    ///
    /// [`Ccp::init`] and [`Ccp::start`] overwrite the transmission time
    /// stamp of every frame in `frames` with the current system time. All
    /// other fields, including sequence numbers, are kept.
    ///
    /// [`Ccp::start`]: #method.start
    /// [`Ccp::init`]: #method.init
    pub fn with_frames(frames: &'a mut [CcpFrame], timer: T, config: CcpConfig)
        -> Self
    {
        Self::build(FrameStore::External(frames), timer, config, Telemetry::new())
    }
}

impl<'a, R, T, P> Ccp<'a, R, T, P>
    where
        R:       Transceiver,
        T:       CountDown + Cancel,
        T::Time: From<u32>,
        P:       Postprocess,
{
    fn build(frames: FrameStore<'a>, timer: T, config: CcpConfig, postprocess: P)
        -> Self
    {
        Ccp {
            frames,
            scheduler: Scheduler::new(
                timer,
                config.os_ticks_per_second,
                config.os_latency,
            ),
            sem:                 Semaphore::new(),
            status:              Status::default(),
            config,
            period:              config.period,
            mode:                Mode::default(),
            idx:                 0,
            clock_master:        mac::ExtendedAddress(0),
            postprocess,
            postprocess_enabled: false,
            pending:             Queue::new(),
            callbacks:           Callbacks::default(),
            last_transmission:   None,
        }
    }

    /// Initializes the engine
    ///
    /// Self-owned storage is allocated with `n_frames` slots, if that hasn't
    /// happened yet. Otherwise, `n_frames` must match the number of slots
    /// that are already there.
    ///
    /// Resets the period to the configured one, registers the default
    /// callbacks, enables postprocessing, and seeds all slots with the
    /// current system time.
    pub fn init(&mut self,
        radio:        &mut R,
        n_frames:     u16,
        clock_master: mac::ExtendedAddress,
    )
        -> Result<(), Error<R::Error>>
    {
        if n_frames == 0 {
            return Err(Error::InvalidFrameCount(n_frames));
        }

        match &mut self.frames {
            FrameStore::Owned(frames) if frames.is_empty() => {
                if n_frames as usize > MAX_FRAMES
                    || !FrameStore::allocate(frames, n_frames as usize)
                {
                    frames.clear();
                    return Err(Error::InvalidFrameCount(n_frames));
                }
            }
            store => {
                if store.len() != n_frames as usize {
                    return Err(Error::FrameCountMismatch {
                        allocated: store.len(),
                        requested: n_frames,
                    });
                }
            }
        }

        self.period              = self.config.period;
        self.clock_master        = clock_master;
        self.sem                 = Semaphore::new();
        self.callbacks           = Callbacks::default();
        self.postprocess_enabled = true;

        self.seed(radio)?;
        self.status.initialized = true;

        info!(
            "ccp init: frames={} period={} master={}",
            n_frames,
            self.period,
            clock_master.0,
        );

        Ok(())
    }

    /// Starts timer-driven blinks
    ///
    /// Resets the index and the valid flag, and re-seeds the frame time
    /// stamps from the current system time. `mode` is used for every blink
    /// triggered by [`Ccp::poll`]. The first one happens after 10 ms.
    ///
    /// [`Ccp::poll`]: #method.poll
    pub fn start(&mut self, radio: &mut R, mode: Mode)
        -> Result<(), Error<R::Error>>
    {
        self.ensure_initialized()?;

        self.idx          = 0;
        self.status.valid = false;
        self.seed(radio)?;

        self.mode = mode;
        self.scheduler.start();
        self.status.timer_armed = true;

        info!("ccp start: period={}", self.period);

        Ok(())
    }

    /// Stops timer-driven blinks
    ///
    /// A transmission that is already in flight will still complete. Frame
    /// storage and configuration are left intact.
    pub fn stop(&mut self) {
        self.scheduler.stop();
        self.status.timer_armed = false;

        info!("ccp stop");
    }

    /// Tears the engine down
    ///
    /// Self-owned frame storage is released. Externally owned storage is
    /// left as it is. Either way, the engine needs to be initialized again
    /// before it can be used.
    pub fn free(&mut self) {
        self.stop();
        self.frames.release();
        while self.pending.dequeue().is_some() {}

        self.status.initialized = false;

        info!("ccp free");
    }

    /// Dispatches a radio event to the registered callback
    ///
    /// This is meant to be called from the host's interrupt handling, or
    /// whatever else detects that the radio is done.
    pub fn handle_event(&mut self, radio: &mut R, event: RadioEvent)
        -> Result<(), Error<R::Error>>
    {
        self.ensure_initialized()?;

        let callback = match event {
            RadioEvent::RxComplete => self.callbacks.rx_complete,
            RadioEvent::TxComplete => self.callbacks.tx_complete,
            RadioEvent::TxTimeout  => self.callbacks.tx_timeout,
        };

        callback(self, radio)
    }

    /// Hands all queued reception results to the postprocess consumer
    ///
    /// Returns the number of results that were processed.
    pub fn process_events(&mut self) -> usize {
        let mut processed = 0;

        while let Some((current, previous)) = self.pending.dequeue() {
            self.postprocess.postprocess(&current, &previous);
            processed += 1;
        }

        processed
    }

    /// Replaces the postprocess consumer, changing its type
    ///
    /// Since the callbacks are typed on the consumer, they are reset to the
    /// defaults. Queued results are kept.
    pub fn with_postprocess<Q>(self, postprocess: Q) -> Ccp<'a, R, T, Q>
        where Q: Postprocess
    {
        Ccp {
            frames:              self.frames,
            scheduler:           self.scheduler,
            sem:                 self.sem,
            status:              self.status,
            config:              self.config,
            period:              self.period,
            mode:                self.mode,
            idx:                 self.idx,
            clock_master:        self.clock_master,
            postprocess,
            postprocess_enabled: self.postprocess_enabled,
            pending:             self.pending,
            callbacks:           Callbacks::default(),
            last_transmission:   self.last_transmission,
        }
    }

    /// Replaces the postprocess consumer and enables postprocessing
    pub fn set_postprocess(&mut self, postprocess: P) {
        self.postprocess         = postprocess;
        self.postprocess_enabled = true;
    }

    /// Enables or disables queueing of reception results
    pub fn set_postprocess_enabled(&mut self, enabled: bool) {
        self.postprocess_enabled = enabled;
    }

    /// Provides access to the postprocess consumer
    pub fn postprocess(&self) -> &P {
        &self.postprocess
    }

    /// Provides mutable access to the postprocess consumer
    pub fn postprocess_mut(&mut self) -> &mut P {
        &mut self.postprocess
    }

    /// The number of reception results waiting for [`Ccp::process_events`]
    ///
    /// [`Ccp::process_events`]: #method.process_events
    pub fn pending_postprocess(&self) -> usize {
        self.pending.len()
    }

    /// Returns a snapshot of the status flags
    pub fn status(&self) -> Status {
        self.status
    }

    /// The current frame index
    ///
    /// Increases by one with every sent or received frame. Reduced modulo the
    /// number of frames whenever a slot is addressed.
    pub fn index(&self) -> u32 {
        self.idx
    }

    /// Provides access to the frame store
    pub fn frames(&self) -> &FrameStore<'a> {
        &self.frames
    }

    /// The frame at the current index
    pub fn current(&self) -> Option<&CcpFrame> {
        self.frames.current(self.idx)
    }

    /// The frame before the current index
    pub fn previous(&self) -> Option<&CcpFrame> {
        self.frames.previous(self.idx)
    }

    /// The blink period, in protocol microseconds
    pub fn period(&self) -> u32 {
        self.period
    }

    /// Changes the blink period
    ///
    /// Takes effect with the next blink. Re-initializing the engine restores
    /// the configured period.
    pub fn set_period(&mut self, period: u32) {
        self.period = period;
    }

    /// The configuration the engine was created with
    pub fn config(&self) -> &CcpConfig {
        &self.config
    }

    /// The clock master this engine tracks
    pub fn clock_master(&self) -> mac::ExtendedAddress {
        self.clock_master
    }

    /// Indicates whether a transmission currently holds the transmitter
    pub fn is_locked(&self) -> bool {
        self.sem.is_taken()
    }

    /// The telemetry record of the most recently completed blink
    pub fn last_transmission(&self) -> Option<&CalibrationRecord> {
        self.last_transmission.as_ref()
    }

    /// Provides access to the scheduler
    pub fn scheduler(&self) -> &Scheduler<T> {
        &self.scheduler
    }

    /// Provides mutable access to the timer
    pub fn timer(&mut self) -> &mut T {
        self.scheduler.timer_mut()
    }

    fn ensure_initialized(&self) -> Result<(), Error<R::Error>> {
        if !self.status.initialized || self.frames.is_empty() {
            return Err(Error::NotInitialized);
        }
        Ok(())
    }

    /// Writes the current system time into every slot
    fn seed(&mut self, radio: &mut R) -> Result<(), Error<R::Error>> {
        let now = radio.read_sys_time()
            .map_err(Error::Transceiver)?
            .value();

        for frame in self.frames.as_mut_slice() {
            frame.transmission_timestamp = now;
        }

        Ok(())
    }

    /// The period in DW1000 ticks
    fn period_ticks(&self) -> u64 {
        (self.period as u64) << 15
    }
}

// Can't be derived without putting requirements on `R`, `T` and `P`.
impl<'a, R, T, P> fmt::Debug for Ccp<'a, R, T, P>
    where R: Transceiver
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Ccp {{ status: {:?}, idx: {}, period: {}, .. }}",
            self.status, self.idx, self.period,
        )
    }
}
