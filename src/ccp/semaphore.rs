/// Single-count lock guarding the transmitter
///
/// Taken by a blink before the transmission is programmed, and released once
/// the radio is done with it (or programming failed).
#[derive(Debug, Default)]
pub(crate) struct Semaphore {
    taken: bool,
}

impl Semaphore {
    pub(crate) fn new() -> Self {
        Semaphore { taken: false }
    }

    /// Takes the lock, if it's available
    pub(crate) fn try_acquire(&mut self) -> bool {
        if self.taken {
            return false;
        }

        self.taken = true;
        true
    }

    /// Releases the lock
    ///
    /// Releasing a lock that isn't taken does nothing.
    pub(crate) fn release(&mut self) {
        self.taken = false;
    }

    pub(crate) fn is_taken(&self) -> bool {
        self.taken
    }
}
