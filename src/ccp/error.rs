use ssmarshal;

/// An error that can occur while running the calibration protocol
///
/// `E` is the error type of the [`Transceiver`] in use.
///
/// A blink that couldn't be sent in time is not an error. It is reported
/// through [`Status::start_tx_error`] instead.
///
/// [`Transceiver`]: ../radio/trait.Transceiver.html
/// [`Status::start_tx_error`]: struct.Status.html#structfield.start_tx_error
#[derive(Debug)]
pub enum Error<E> {
    /// Error occured while talking to the radio
    Transceiver(E),

    /// An error occured while serializing or deserializing a blink header
    Ssmarshal(ssmarshal::Error),

    /// The engine hasn't been initialized, or has been freed
    NotInitialized,

    /// The engine was re-initialized with a different number of frames
    FrameCountMismatch {
        /// The number of frames the store holds
        allocated: usize,
        /// The number of frames that was requested
        requested: u16,
    },

    /// The requested number of frames can't be allocated
    ///
    /// Zero frames are never valid. Self-owned storage holds at most
    /// `MAX_FRAMES`.
    InvalidFrameCount(u16),
}

impl<E> From<ssmarshal::Error> for Error<E> {
    fn from(error: ssmarshal::Error) -> Self {
        Error::Ssmarshal(error)
    }
}
