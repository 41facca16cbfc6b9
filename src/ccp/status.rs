/// Snapshot of the engine's status flags
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    /// The engine has been initialized and not freed since
    pub initialized: bool,

    /// At least two frames have been received since the last start
    ///
    /// Correction factors and deltas must not be used before this is set.
    pub valid: bool,

    /// The last blink couldn't be sent in time
    ///
    /// Nothing was transmitted. The engine has already compensated the
    /// transmission time for the next attempt.
    pub start_tx_error: bool,

    /// Timer-driven blinks are active
    pub timer_armed: bool,
}
