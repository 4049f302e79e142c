//! Health monitoring for object pools

/// Active share of the cap above which a pool is reported unhealthy.
const HIGH_UTILIZATION: f64 = 0.9;

/// Health status of an object pool
///
/// # Examples
///
/// ```
/// use spawnpool::HealthStatus;
///
/// let health = HealthStatus::new(3, 1, 10);
/// assert!(health.is_healthy());
/// assert_eq!(health.available_objects, 3);
///
/// let exhausted = HealthStatus::new(0, 4, 4);
/// assert!(!exhausted.is_healthy());
/// assert!(exhausted.is_exhausted());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HealthStatus {
    /// Whether the pool is healthy
    pub is_healthy: bool,

    /// Active objects relative to the cap (0.0 to 1.0)
    pub utilization: f64,

    /// Free objects count
    pub available_objects: usize,

    /// Active objects count
    pub active_objects: usize,

    /// Hard cap on free + active objects
    pub object_cap: usize,

    /// Warning messages
    pub warnings: Vec<String>,
}

impl HealthStatus {
    /// Create a new health status
    pub fn new(available: usize, active: usize, cap: usize) -> Self {
        let utilization = if cap > 0 {
            active as f64 / cap as f64
        } else {
            0.0
        };

        let mut warnings = Vec::new();
        let mut is_healthy = true;

        if utilization > HIGH_UTILIZATION {
            warnings.push(format!("High utilization: {:.1}%", utilization * 100.0));
            is_healthy = false;
        }

        if available == 0 && available + active >= cap {
            warnings.push("Pool is exhausted".to_string());
            is_healthy = false;
        } else if available == 0 {
            warnings.push("No free objects, next take allocates".to_string());
        }

        Self {
            is_healthy,
            utilization,
            available_objects: available,
            active_objects: active,
            object_cap: cap,
            warnings,
        }
    }

    /// Check if the pool is healthy
    pub fn is_healthy(&self) -> bool {
        self.is_healthy
    }

    /// Whether the next `take` would come back empty
    pub fn is_exhausted(&self) -> bool {
        self.available_objects == 0
            && self.available_objects + self.active_objects >= self.object_cap
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_utilization_is_unhealthy() {
        let health = HealthStatus::new(0, 95, 100);
        assert!(!health.is_healthy());
        assert!(!health.is_exhausted());
        assert_eq!(health.warning_count(), 2);
    }

    #[test]
    fn test_empty_free_list_with_headroom_warns_only() {
        let health = HealthStatus::new(0, 2, 10);
        assert!(health.is_healthy());
        assert_eq!(health.warning_count(), 1);
    }

    #[test]
    fn test_zero_cap_pool_is_exhausted() {
        let health = HealthStatus::new(0, 0, 0);
        assert_eq!(health.utilization, 0.0);
        assert!(health.is_exhausted());
        assert!(!health.is_healthy());
    }
}
