//! Bounded integer pools (health, mana).

/// Integer resource meter clamped to `[0, maximum]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMeter {
    pub current: i32,
    pub maximum: i32,
}

impl ResourceMeter {
    pub fn new(current: i32, maximum: i32) -> Self {
        let maximum = maximum.max(0);
        Self {
            current: current.clamp(0, maximum),
            maximum,
        }
    }

    /// A meter filled to `maximum`.
    pub fn full(maximum: i32) -> Self {
        Self::new(maximum, maximum)
    }

    pub fn has_at_least(&self, amount: i32) -> bool {
        self.current >= amount
    }

    /// Deducts `amount` if affordable, returning whether it was.
    pub fn spend(&mut self, amount: i32) -> bool {
        if !self.has_at_least(amount) {
            return false;
        }
        self.current -= amount.max(0);
        true
    }

    /// Adds `amount`, clamped to the maximum. Returns the amount actually gained.
    pub fn restore(&mut self, amount: i32) -> i32 {
        let before = self.current;
        self.current = self.current.saturating_add(amount.max(0)).min(self.maximum);
        self.current - before
    }

    /// Removes up to `amount`, flooring at zero. Returns the amount actually lost.
    pub fn deplete(&mut self, amount: i32) -> i32 {
        let before = self.current;
        self.current = self.current.saturating_sub(amount.max(0)).max(0);
        before - self.current
    }

    /// Raises the maximum by `amount` without changing the current value.
    pub fn raise_maximum(&mut self, amount: i32) {
        self.maximum = self.maximum.saturating_add(amount).max(0);
        self.current = self.current.min(self.maximum);
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.maximum
    }
}
