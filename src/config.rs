//! Pool configuration options

/// Default number of instances created up front.
pub const DEFAULT_PREWARM_AMOUNT: usize = 15;

/// Default hard cap on free plus active instances.
pub const DEFAULT_OBJECT_CAP: usize = 500;

/// Configuration for object pool sizing
///
/// Both values are fixed once the pool is built. A prewarm amount larger
/// than the cap is allowed and is clamped at construction.
///
/// # Examples
///
/// ```
/// use spawnpool::PoolConfiguration;
///
/// let config = PoolConfiguration::new()
///     .with_prewarm_amount(32)
///     .with_object_cap(16);
///
/// assert_eq!(config.object_cap, 16);
/// assert_eq!(config.effective_prewarm(), 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolConfiguration {
    /// Number of instances to create eagerly when the pool is built
    pub prewarm_amount: usize,

    /// Maximum number of instances (free + active) that may exist at once
    pub object_cap: usize,
}

impl Default for PoolConfiguration {
    fn default() -> Self {
        Self {
            prewarm_amount: DEFAULT_PREWARM_AMOUNT,
            object_cap: DEFAULT_OBJECT_CAP,
        }
    }
}

impl PoolConfiguration {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the prewarm amount
    pub fn with_prewarm_amount(mut self, amount: usize) -> Self {
        self.prewarm_amount = amount;
        self
    }

    /// Set the object cap
    ///
    /// # Examples
    ///
    /// ```
    /// use spawnpool::PoolConfiguration;
    ///
    /// let config = PoolConfiguration::new().with_object_cap(64);
    /// assert_eq!(config.object_cap, 64);
    /// ```
    pub fn with_object_cap(mut self, cap: usize) -> Self {
        self.object_cap = cap;
        self
    }

    /// Number of instances actually created during prewarm.
    pub fn effective_prewarm(&self) -> usize {
        self.prewarm_amount.min(self.object_cap)
    }
}
