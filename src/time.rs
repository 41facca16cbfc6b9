//! Time-related types based on the DW1000's system time


use serde::{Serialize, Deserialize};


/// The maximum value of 40-bit system time stamps.
pub const TIME_MAX: u64 = 0xffffffffff;


/// Represents an instant in time
///
/// This is what the [`Transceiver`] hands out when reading the system time or
/// a reception time stamp, and what it expects when programming a delayed
/// transmission.
///
/// Internally uses the same 40-bit timestamps that the DW1000 uses.
///
/// [`Transceiver`]: ../radio/trait.Transceiver.html
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(C)]
pub struct Instant(u64);

impl Instant {
    /// Creates a new instance of `Instant`
    ///
    /// The given value must fit in a 40-bit timestamp, so:
    /// 0 <= `value` <= 2^40 - 1
    ///
    /// Returns `Some(...)`, if `value` is within the valid range, `None` if it
    /// isn't.
    ///
    /// # Example
    ///
    /// ``` rust
    /// use dw1000_ccp::time::{
    ///     TIME_MAX,
    ///     Instant,
    /// };
    ///
    /// let valid_instant   = Instant::new(TIME_MAX);
    /// let invalid_instant = Instant::new(TIME_MAX + 1);
    ///
    /// assert!(valid_instant.is_some());
    /// assert!(invalid_instant.is_none());
    /// ```
    pub fn new(value: u64) -> Option<Self> {
        if value <= TIME_MAX {
            Some(Instant(value))
        }
        else {
            None
        }
    }

    /// Creates an `Instant` from the lower 40 bits of `value`
    ///
    /// The CCP engine keeps its frame time stamps in 64-bit fields and lets
    /// them run past `TIME_MAX`. The DW1000 only ever sees the lower 40 bits,
    /// which is what this method keeps.
    ///
    /// # Example
    ///
    /// ``` rust
    /// use dw1000_ccp::time::{
    ///     TIME_MAX,
    ///     Instant,
    /// };
    ///
    /// assert_eq!(Instant::truncate(TIME_MAX + 6).value(), 5);
    /// assert_eq!(Instant::truncate(1234).value(), 1234);
    /// ```
    pub fn truncate(value: u64) -> Self {
        Instant(value & TIME_MAX)
    }

    /// Returns the raw 40-bit timestamp
    ///
    /// The returned value is guaranteed to be in the following range:
    /// 0 <= `value` <= 2^40 - 1
    pub fn value(&self) -> u64 {
        self.0
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_lower_40_bits() {
        let instant = Instant::truncate(0xAB_CD00_0000_0042);

        assert_eq!(instant.value(), 0x00_0000_0042);
        assert!(instant.value() <= TIME_MAX);
    }

    #[test]
    fn truncate_matches_new_in_range() {
        assert_eq!(Instant::new(TIME_MAX), Some(Instant::truncate(TIME_MAX)));
    }
}
