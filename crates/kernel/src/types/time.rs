use core::fmt::Display;

/// A wrapper struct representing a duration in milliseconds.
///
/// # Fields
///
/// * `0` - The inner `u32` value representing the duration in milliseconds.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Milliseconds(pub u32);

impl Display for Milliseconds {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ms", self.0)
    }
}

impl Milliseconds {
    /// Converts the value of the current instance into a `u32`.
    pub fn to_u32(&self) -> u32 {
        self.0
    }

    /// Number of timer ticks covering this duration at the given tick frequency.
    ///
    /// The result is truncated and computed on 64 bits, so it cannot overflow for any
    /// `u32` duration and frequency; range checks are left to the caller.
    pub fn to_ticks(&self, p_tick_frequency: Hertz) -> u64 {
        self.0 as u64 * p_tick_frequency.to_u32() as u64 / 1000
    }
}

/// A wrapper struct representing a frequency in hertz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hertz(pub u32);

impl Display for Hertz {
    /// Formats the frequency in the largest unit that keeps it integral.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.0 != 0 && self.0 % 1_000_000 == 0 {
            write!(f, "{} MHz", self.0 / 1_000_000)
        } else if self.0 != 0 && self.0 % 1000 == 0 {
            write!(f, "{} kHz", self.0 / 1000)
        } else {
            write!(f, "{} Hz", self.0)
        }
    }
}

impl Hertz {
    pub fn to_u32(&self) -> u32 {
        self.0
    }
}
