//! Metrics collection and export for object pools

use std::collections::HashMap;

/// Metrics snapshot for a pool
///
/// # Examples
///
/// ```
/// use spawnpool::{ObjectPool, PoolConfiguration, PoolId, Poolable};
///
/// # #[derive(Default)]
/// # struct Note { pool: Option<PoolId> }
/// # impl Poolable for Note {
/// #     fn enable_from_pool(&mut self) {}
/// #     fn disable_into_pool(&mut self) {}
/// #     fn parent_pool(&self) -> Option<PoolId> { self.pool }
/// #     fn set_parent_pool(&mut self, pool: PoolId) { self.pool = Some(pool); }
/// # }
/// let config = PoolConfiguration::new().with_prewarm_amount(2).with_object_cap(4);
/// let mut pool = ObjectPool::new(Note::default, config);
///
/// let _note = pool.take().unwrap();
/// let metrics = pool.metrics();
/// assert_eq!(metrics.total_created, 2);
/// assert_eq!(metrics.total_taken, 1);
/// assert_eq!(metrics.active_objects, 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PoolMetrics {
    /// Instances produced by the factory (prewarm included)
    pub total_created: usize,

    /// Successful takes
    pub total_taken: usize,

    /// Successful returns of taken instances
    pub total_returned: usize,

    /// External instances accepted through `adopt`
    pub total_adopted: usize,

    /// Takes that found the pool exhausted
    pub exhausted_events: usize,

    /// Returns ignored because the instance was already free or foreign
    pub ignored_returns: usize,

    /// Current active objects
    pub active_objects: usize,

    /// Current free objects
    pub available_objects: usize,

    /// Hard cap on free + active objects
    pub object_cap: usize,

    /// Active objects relative to the cap (0.0 to 1.0)
    pub utilization: f64,
}

impl PoolMetrics {
    /// Export metrics as a HashMap
    pub fn export(&self) -> HashMap<String, String> {
        let mut metrics = HashMap::new();
        metrics.insert("total_created".to_string(), self.total_created.to_string());
        metrics.insert("total_taken".to_string(), self.total_taken.to_string());
        metrics.insert("total_returned".to_string(), self.total_returned.to_string());
        metrics.insert("total_adopted".to_string(), self.total_adopted.to_string());
        metrics.insert("exhausted_events".to_string(), self.exhausted_events.to_string());
        metrics.insert("ignored_returns".to_string(), self.ignored_returns.to_string());
        metrics.insert("active_objects".to_string(), self.active_objects.to_string());
        metrics.insert("available_objects".to_string(), self.available_objects.to_string());
        metrics.insert("object_cap".to_string(), self.object_cap.to_string());
        metrics.insert("utilization".to_string(), format!("{:.2}", self.utilization));
        metrics
    }
}

/// Metrics exporter for Prometheus format
#[cfg(feature = "metrics")]
pub struct MetricsExporter;

#[cfg(feature = "metrics")]
impl MetricsExporter {
    /// Export metrics in Prometheus exposition format
    ///
    /// Every series carries a `pool` label plus any extra `tags`.
    ///
    /// # Examples
    ///
    /// ```
    /// use spawnpool::{ObjectPool, PoolConfiguration, PoolId, Poolable};
    /// use std::collections::HashMap;
    ///
    /// # #[derive(Default)]
    /// # struct Note { pool: Option<PoolId> }
    /// # impl Poolable for Note {
    /// #     fn enable_from_pool(&mut self) {}
    /// #     fn disable_into_pool(&mut self) {}
    /// #     fn parent_pool(&self) -> Option<PoolId> { self.pool }
    /// #     fn set_parent_pool(&mut self, pool: PoolId) { self.pool = Some(pool); }
    /// # }
    /// let pool = ObjectPool::new(Note::default, PoolConfiguration::default());
    ///
    /// let mut tags = HashMap::new();
    /// tags.insert("track".to_string(), "guitar".to_string());
    ///
    /// let output = pool.export_metrics_prometheus("notes", Some(&tags)).unwrap();
    /// assert!(output.contains("spawnpool_objects_available"));
    /// assert!(output.contains("track=\"guitar\""));
    /// ```
    pub fn export_prometheus(
        metrics: &PoolMetrics,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> crate::PoolResult<String> {
        use prometheus::{Encoder, TextEncoder};

        let mut labels = tags.cloned().unwrap_or_default();
        labels.insert("pool".to_string(), pool_name.to_string());

        let registry =
            prometheus::Registry::new_custom(Some("spawnpool".to_string()), Some(labels))
                .map_err(export_error)?;

        // Gauge metrics
        let gauges = [
            ("objects_active", "Current active objects", metrics.active_objects),
            ("objects_available", "Current free objects", metrics.available_objects),
            ("object_cap", "Maximum free plus active objects", metrics.object_cap),
        ];
        for (name, help, value) in gauges {
            register_int_gauge(&registry, name, help, value)?;
        }

        let utilization =
            prometheus::Gauge::new("utilization", "Active objects relative to the cap")
                .map_err(export_error)?;
        utilization.set(metrics.utilization);
        registry.register(Box::new(utilization)).map_err(export_error)?;

        // Counter metrics
        let counters = [
            ("objects_created_total", "Instances produced by the factory", metrics.total_created),
            ("objects_taken_total", "Total objects taken", metrics.total_taken),
            ("objects_returned_total", "Total objects returned", metrics.total_returned),
            ("objects_adopted_total", "External objects adopted", metrics.total_adopted),
            ("events_exhausted_total", "Takes that hit the cap", metrics.exhausted_events),
            ("returns_ignored_total", "Ignored double or foreign returns", metrics.ignored_returns),
        ];
        for (name, help, value) in counters {
            register_counter(&registry, name, help, value)?;
        }

        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&registry.gather(), &mut buffer)
            .map_err(export_error)?;

        String::from_utf8(buffer).map_err(export_error)
    }
}

#[cfg(feature = "metrics")]
fn register_int_gauge(
    registry: &prometheus::Registry,
    name: &str,
    help: &str,
    value: usize,
) -> crate::PoolResult<()> {
    let gauge = prometheus::IntGauge::new(name, help).map_err(export_error)?;
    gauge.set(value as i64);
    registry.register(Box::new(gauge)).map_err(export_error)
}

#[cfg(feature = "metrics")]
fn register_counter(
    registry: &prometheus::Registry,
    name: &str,
    help: &str,
    value: usize,
) -> crate::PoolResult<()> {
    let counter = prometheus::IntCounter::new(name, help).map_err(export_error)?;
    counter.inc_by(value as u64);
    registry.register(Box::new(counter)).map_err(export_error)
}

#[cfg(feature = "metrics")]
fn export_error(err: impl std::fmt::Display) -> crate::PoolError {
    crate::PoolError::MetricsExport(err.to_string())
}

/// Internal metrics tracker
///
/// Counters are plain integers: every mutation happens through `&mut` on
/// the owning pool.
#[derive(Debug, Default)]
pub(crate) struct MetricsTracker {
    pub total_created: usize,
    pub total_taken: usize,
    pub total_returned: usize,
    pub total_adopted: usize,
    pub exhausted_events: usize,
    pub ignored_returns: usize,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_metrics(&self, active: usize, available: usize, cap: usize) -> PoolMetrics {
        let utilization = if cap > 0 {
            active as f64 / cap as f64
        } else {
            0.0
        };

        PoolMetrics {
            total_created: self.total_created,
            total_taken: self.total_taken,
            total_returned: self.total_returned,
            total_adopted: self.total_adopted,
            exhausted_events: self.exhausted_events,
            ignored_returns: self.ignored_returns,
            active_objects: active,
            available_objects: available,
            object_cap: cap,
            utilization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utilization_with_zero_cap() {
        let tracker = MetricsTracker::new();
        let metrics = tracker.get_metrics(0, 0, 0);
        assert_eq!(metrics.utilization, 0.0);
    }

    #[test]
    fn test_export_keys() {
        let mut tracker = MetricsTracker::new();
        tracker.total_created = 4;
        tracker.total_taken = 3;
        tracker.exhausted_events = 1;

        let exported = tracker.get_metrics(3, 1, 4).export();
        assert_eq!(exported["total_created"], "4");
        assert_eq!(exported["total_taken"], "3");
        assert_eq!(exported["exhausted_events"], "1");
        assert_eq!(exported["utilization"], "0.75");
    }

    #[cfg(feature = "metrics")]
    fn sample_value(output: &str, series: &str) -> f64 {
        output
            .lines()
            .find_map(|line| line.strip_prefix(series))
            .and_then(|rest| rest.trim().parse().ok())
            .unwrap_or_else(|| panic!("series {series} missing from:\n{output}"))
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn test_prometheus_export_contains_counters() {
        let mut tracker = MetricsTracker::new();
        tracker.total_taken = 7;
        tracker.total_returned = 5;

        tracker.total_adopted = 1;

        let metrics = tracker.get_metrics(2, 3, 10);
        let output = MetricsExporter::export_prometheus(&metrics, "effects", None).unwrap();

        assert!(output.contains("# TYPE spawnpool_objects_taken_total counter"));
        let series = |name: &str| sample_value(&output, &format!("{name}{{pool=\"effects\"}}"));
        assert_eq!(series("spawnpool_objects_taken_total"), 7.0);
        assert_eq!(series("spawnpool_objects_returned_total"), 5.0);
        assert_eq!(series("spawnpool_objects_adopted_total"), 1.0);
        assert_eq!(series("spawnpool_objects_active"), 2.0);
    }
}
