//! Core bounded object pool

use crate::config::PoolConfiguration;
use crate::errors::{PoolError, PoolResult};
use crate::health::HealthStatus;
use crate::metrics::{MetricsTracker, PoolMetrics};
use crate::poolable::{PoolHandle, PoolId, Poolable};

use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace};

type Factory<T> = Box<dyn FnMut() -> T + Send>;
type ReturnHook<T> = Box<dyn FnMut(PoolHandle, &mut T) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Free,
    Active,
}

struct Slot<T> {
    instance: T,
    state: SlotState,
    /// Take order of the current checkout, used to return in take order.
    taken_seq: u64,
}

/// Capacity-bounded pool of reusable instances
///
/// The pool owns every instance it creates and never destroys one while it
/// is alive. Instances alternate between a free stack (most recently
/// returned on top) and the active set. Callers address instances through
/// [`PoolHandle`]s and must hand them back with
/// [`return_object`](Self::return_object); nothing is reclaimed
/// automatically.
///
/// # Examples
///
/// ```
/// use spawnpool::{ObjectPool, PoolConfiguration, PoolId, Poolable};
///
/// #[derive(Clone, Default)]
/// struct Note {
///     lane: u8,
///     visible: bool,
///     pool: Option<PoolId>,
/// }
///
/// impl Poolable for Note {
///     fn enable_from_pool(&mut self) { self.visible = true; }
///     fn disable_into_pool(&mut self) { self.visible = false; }
///     fn parent_pool(&self) -> Option<PoolId> { self.pool }
///     fn set_parent_pool(&mut self, pool: PoolId) { self.pool = Some(pool); }
/// }
///
/// let config = PoolConfiguration::new().with_prewarm_amount(1).with_object_cap(2);
/// let mut pool = ObjectPool::from_prefab(Note::default(), config);
///
/// let first = pool.take().unwrap();
/// let _second = pool.take().unwrap();
/// assert!(pool.take().is_none());
///
/// pool.return_object(first);
/// assert_eq!(pool.free_count(), 1);
/// assert_eq!(pool.take(), Some(first));
/// ```
pub struct ObjectPool<T> {
    id: PoolId,
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    active_count: usize,
    next_take_seq: u64,
    factory: Factory<T>,
    on_returned: Option<ReturnHook<T>>,
    config: PoolConfiguration,
    metrics: MetricsTracker,
}

/// Builder for an [`ObjectPool`] with an optional return hook
pub struct PoolBuilder<T> {
    factory: Factory<T>,
    config: PoolConfiguration,
    on_returned: Option<ReturnHook<T>>,
}

impl<T: Poolable> PoolBuilder<T> {
    /// Use the given sizing configuration
    pub fn config(mut self, config: PoolConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Set the number of instances created at build time
    pub fn prewarm_amount(mut self, amount: usize) -> Self {
        self.config.prewarm_amount = amount;
        self
    }

    /// Set the hard cap on free + active instances
    pub fn object_cap(mut self, cap: usize) -> Self {
        self.config.object_cap = cap;
        self
    }

    /// Run `hook` after every accepted return, once the instance is back
    /// on the free list.
    ///
    /// The hook must not call back into the same pool. When the pool sits
    /// behind a [`SharedPool`](crate::SharedPool), the lock is held while
    /// the hook runs, so a hook that captures a clone of that `SharedPool`
    /// deadlocks on its first use.
    pub fn on_returned<F>(mut self, hook: F) -> Self
    where
        F: FnMut(PoolHandle, &mut T) + Send + 'static,
    {
        self.on_returned = Some(Box::new(hook));
        self
    }

    /// Build the pool and prewarm it
    pub fn build(self) -> ObjectPool<T> {
        let mut pool = ObjectPool {
            id: PoolId::next(),
            slots: Vec::with_capacity(self.config.effective_prewarm()),
            free: Vec::with_capacity(self.config.effective_prewarm()),
            active_count: 0,
            next_take_seq: 0,
            factory: self.factory,
            on_returned: self.on_returned,
            config: self.config,
            metrics: MetricsTracker::new(),
        };
        pool.prewarm();
        pool
    }
}

impl<T: Poolable> ObjectPool<T> {
    /// Create a new pool producing instances with `factory`
    ///
    /// `min(prewarm_amount, object_cap)` instances are created immediately
    /// and left inactive on the free list.
    pub fn new<F>(factory: F, config: PoolConfiguration) -> Self
    where
        F: FnMut() -> T + Send + 'static,
    {
        Self::builder(factory).config(config).build()
    }

    /// Create a pool whose instances are clones of `prefab`
    pub fn from_prefab(prefab: T, config: PoolConfiguration) -> Self
    where
        T: Clone + Send + 'static,
    {
        Self::new(move || prefab.clone(), config)
    }

    /// Start building a pool around `factory`
    pub fn builder<F>(factory: F) -> PoolBuilder<T>
    where
        F: FnMut() -> T + Send + 'static,
    {
        PoolBuilder {
            factory: Box::new(factory),
            config: PoolConfiguration::default(),
            on_returned: None,
        }
    }

    fn prewarm(&mut self) {
        for _ in 0..self.config.effective_prewarm() {
            match self.create_new() {
                Some(slot) => self.free.push(slot),
                None => break,
            }
        }

        debug!(
            pool = %self.id,
            prewarmed = self.free.len(),
            cap = self.config.object_cap,
            "Object pool initialized"
        );
    }

    /// Materialize one instance if the cap allows it. The new slot is left
    /// `Free` but is not pushed onto the free list.
    fn create_new(&mut self) -> Option<usize> {
        if self.total_count() + 1 > self.config.object_cap {
            return None;
        }

        let mut instance = (self.factory)();
        instance.set_parent_pool(self.id);

        let slot = self.slots.len();
        self.slots.push(Slot {
            instance,
            state: SlotState::Free,
            taken_seq: 0,
        });
        self.metrics.total_created += 1;

        trace!(pool = %self.id, slot, "Created pooled instance");
        Some(slot)
    }

    /// Whether `count` takes in a row are guaranteed to succeed
    ///
    /// True when the cap leaves room for `count` more instances, or when the
    /// free list alone already holds `count`.
    pub fn can_spawn_amount(&self, count: usize) -> bool {
        if self.total_count().saturating_add(count) <= self.config.object_cap {
            return true;
        }

        self.free.len() >= count
    }

    /// Take an instance without calling [`Poolable::enable_from_pool`]
    ///
    /// Lets the caller stage the instance before it becomes observable.
    /// Returns `None` when the pool is exhausted.
    pub fn take_without_enabling(&mut self) -> Option<PoolHandle> {
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => match self.create_new() {
                Some(slot) => slot,
                None => {
                    self.metrics.exhausted_events += 1;
                    debug!(pool = %self.id, cap = self.config.object_cap, "Object pool exhausted");
                    return None;
                }
            },
        };

        self.slots[slot].state = SlotState::Active;
        self.slots[slot].taken_seq = self.next_take_seq;
        self.next_take_seq += 1;
        self.active_count += 1;
        self.metrics.total_taken += 1;

        trace!(pool = %self.id, slot, "Took pooled instance");
        Some(self.handle(slot))
    }

    /// Take an instance and enable it
    pub fn take(&mut self) -> Option<PoolHandle> {
        let handle = self.take_without_enabling()?;
        self.slots[handle.slot].instance.enable_from_pool();
        Some(handle)
    }

    /// Like [`take`](Self::take), reporting exhaustion as an error
    pub fn try_take(&mut self) -> PoolResult<PoolHandle> {
        self.take().ok_or(PoolError::Exhausted {
            cap: self.config.object_cap,
        })
    }

    /// Take and enable exactly `count` instances, or none at all
    ///
    /// # Examples
    ///
    /// ```
    /// use spawnpool::{ObjectPool, PoolConfiguration, PoolError, PoolId, Poolable};
    ///
    /// # #[derive(Default)]
    /// # struct Note { pool: Option<PoolId> }
    /// # impl Poolable for Note {
    /// #     fn enable_from_pool(&mut self) {}
    /// #     fn disable_into_pool(&mut self) {}
    /// #     fn parent_pool(&self) -> Option<PoolId> { self.pool }
    /// #     fn set_parent_pool(&mut self, pool: PoolId) { self.pool = Some(pool); }
    /// # }
    /// let config = PoolConfiguration::new().with_prewarm_amount(0).with_object_cap(3);
    /// let mut pool = ObjectPool::new(Note::default, config);
    ///
    /// let chord = pool.take_batch(3).unwrap();
    /// assert_eq!(chord.len(), 3);
    ///
    /// let err = pool.take_batch(1).unwrap_err();
    /// assert!(matches!(err, PoolError::InsufficientCapacity { requested: 1, .. }));
    /// assert_eq!(pool.active_count(), 3);
    /// ```
    pub fn take_batch(&mut self, count: usize) -> PoolResult<Vec<PoolHandle>> {
        if !self.can_spawn_amount(count) {
            return Err(PoolError::InsufficientCapacity {
                requested: count,
                free: self.free.len(),
                cap: self.config.object_cap,
            });
        }

        // Either the cap has room for `count` new instances or the free list
        // already holds `count`, so every take below succeeds.
        let handles: Vec<PoolHandle> = (0..count).filter_map(|_| self.take()).collect();
        debug_assert_eq!(handles.len(), count);

        Ok(handles)
    }

    /// Give an instance back to the pool
    ///
    /// Returning an instance that is already free, or a handle issued by a
    /// different pool, does nothing. Otherwise the instance is disabled,
    /// pushed on top of the free list, and the return hook runs once.
    pub fn return_object(&mut self, handle: PoolHandle) {
        let Some(slot) = self.slot_index(handle) else {
            self.metrics.ignored_returns += 1;
            debug!(pool = %self.id, from = %handle.pool, "Ignored return of foreign handle");
            return;
        };

        if self.slots[slot].state == SlotState::Free {
            self.metrics.ignored_returns += 1;
            debug!(pool = %self.id, slot, "Ignored return of free instance");
            return;
        }

        self.slots[slot].state = SlotState::Free;
        self.active_count -= 1;
        self.slots[slot].instance.disable_into_pool();
        self.free.push(slot);
        self.metrics.total_returned += 1;

        if let Some(hook) = self.on_returned.as_mut() {
            hook(handle, &mut self.slots[slot].instance);
        }

        trace!(pool = %self.id, slot, "Returned pooled instance");
    }

    /// Return every active instance
    ///
    /// Instances go back in the order they were taken, so the most recently
    /// taken one ends up on top of the free list.
    pub fn return_all_objects(&mut self) {
        let mut active: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.state == SlotState::Active)
            .map(|(idx, _)| idx)
            .collect();
        active.sort_unstable_by_key(|&slot| self.slots[slot].taken_seq);

        debug!(pool = %self.id, count = active.len(), "Returning all active instances");

        for slot in active {
            self.return_object(self.handle(slot));
        }
    }

    /// Hand an externally created instance to the pool
    ///
    /// The instance is claimed, disabled and placed on the free list, and the
    /// return hook runs once. Adoptions are counted in
    /// [`PoolMetrics::total_adopted`], not as returns. When the pool is
    /// already at its cap the instance is given back as `Err`.
    pub fn adopt(&mut self, mut instance: T) -> Result<PoolHandle, T> {
        if self.total_count() >= self.config.object_cap {
            debug!(pool = %self.id, "Rejected adopted instance, pool at cap");
            return Err(instance);
        }

        instance.set_parent_pool(self.id);
        instance.disable_into_pool();

        let slot = self.slots.len();
        self.slots.push(Slot {
            instance,
            state: SlotState::Free,
            taken_seq: 0,
        });
        self.free.push(slot);
        self.metrics.total_adopted += 1;

        let handle = self.handle(slot);
        if let Some(hook) = self.on_returned.as_mut() {
            hook(handle, &mut self.slots[slot].instance);
        }

        trace!(pool = %self.id, slot, "Adopted external instance");
        Ok(handle)
    }

    /// Borrow any instance tracked by this pool
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.slot_index(handle).map(|slot| &self.slots[slot].instance)
    }

    /// Mutably borrow any instance tracked by this pool
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.slot_index(handle)
            .map(|slot| &mut self.slots[slot].instance)
    }

    /// Whether `handle` is currently checked out of this pool
    pub fn is_active(&self, handle: PoolHandle) -> bool {
        self.slot_index(handle)
            .is_some_and(|slot| self.slots[slot].state == SlotState::Active)
    }

    /// Whether `handle` currently sits on this pool's free list
    pub fn is_free(&self, handle: PoolHandle) -> bool {
        self.slot_index(handle)
            .is_some_and(|slot| self.slots[slot].state == SlotState::Free)
    }

    /// Iterate over the checked-out instances
    pub fn iter_active(&self) -> impl Iterator<Item = (PoolHandle, &T)> + '_ {
        let id = self.id;
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.state == SlotState::Active)
            .map(move |(idx, slot)| (PoolHandle { pool: id, slot: idx }, &slot.instance))
    }

    /// Iterate mutably over the checked-out instances
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (PoolHandle, &mut T)> + '_ {
        let id = self.id;
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, slot)| slot.state == SlotState::Active)
            .map(move |(idx, slot)| (PoolHandle { pool: id, slot: idx }, &mut slot.instance))
    }

    /// Identifier stored in each instance's parent pool back-reference
    pub fn id(&self) -> PoolId {
        self.id
    }

    pub fn config(&self) -> &PoolConfiguration {
        &self.config
    }

    pub fn object_cap(&self) -> usize {
        self.config.object_cap
    }

    /// Get free count
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Get active count
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Free plus active instances
    pub fn total_count(&self) -> usize {
        self.free.len() + self.active_count
    }

    /// Get health status
    pub fn health_status(&self) -> HealthStatus {
        HealthStatus::new(self.free.len(), self.active_count, self.config.object_cap)
    }

    /// Get pool metrics
    pub fn metrics(&self) -> PoolMetrics {
        self.metrics
            .get_metrics(self.active_count, self.free.len(), self.config.object_cap)
    }

    /// Export metrics
    pub fn export_metrics(&self) -> HashMap<String, String> {
        self.metrics().export()
    }

    /// Export metrics in Prometheus format
    #[cfg(feature = "metrics")]
    pub fn export_metrics_prometheus(
        &self,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> PoolResult<String> {
        crate::metrics::MetricsExporter::export_prometheus(&self.metrics(), pool_name, tags)
    }

    fn handle(&self, slot: usize) -> PoolHandle {
        PoolHandle {
            pool: self.id,
            slot,
        }
    }

    fn slot_index(&self, handle: PoolHandle) -> Option<usize> {
        (handle.pool == self.id && handle.slot < self.slots.len()).then_some(handle.slot)
    }
}

impl<T> fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPool")
            .field("id", &self.id)
            .field("free", &self.free.len())
            .field("active", &self.active_count)
            .field("config", &self.config)
            .field("has_return_hook", &self.on_returned.is_some())
            .finish()
    }
}
