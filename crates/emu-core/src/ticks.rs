//! System time stamps.

/// A point in system time, counted in clock ticks.
///
/// The counter is 32 bits wide and wraps. Two stamps are ordered by their
/// signed distance, so comparisons stay correct across the wrap as long as
/// the stamps are less than 2^31 ticks apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ticks(pub u32);

impl Ticks {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(count: u32) -> Self {
        Self(count)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Signed distance from `self` to `horizon` (positive if still ahead).
    #[must_use]
    pub const fn until(self, horizon: Self) -> i32 {
        horizon.0.wrapping_sub(self.0) as i32
    }

    /// True once `self` has reached or passed `horizon`.
    #[must_use]
    pub const fn has_reached(self, horizon: Self) -> bool {
        self.until(horizon) <= 0
    }

    /// Ticks elapsed since `earlier`.
    #[must_use]
    pub const fn since(self, earlier: Self) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }
}

impl core::ops::Add<u32> for Ticks {
    type Output = Self;

    fn add(self, rhs: u32) -> Self {
        Self(self.0.wrapping_add(rhs))
    }
}

impl core::ops::AddAssign<u32> for Ticks {
    fn add_assign(&mut self, rhs: u32) {
        self.0 = self.0.wrapping_add(rhs);
    }
}
