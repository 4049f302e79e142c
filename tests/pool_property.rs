//! Property tests for take/return bookkeeping.
//!
//! After any sequence of takes and returns, `free + active <= cap`, no
//! instance is both free and active, and every instance points back at
//! its pool.

use spawnpool::{ObjectPool, PoolConfiguration, PoolHandle, PoolId, Poolable};
use proptest::prelude::*;

#[derive(Debug, Default)]
struct Prop {
    enabled: bool,
    enables: usize,
    disables: usize,
    pool: Option<PoolId>,
}

impl Poolable for Prop {
    fn enable_from_pool(&mut self) {
        self.enabled = true;
        self.enables += 1;
    }

    fn disable_into_pool(&mut self) {
        self.enabled = false;
        self.disables += 1;
    }

    fn parent_pool(&self) -> Option<PoolId> {
        self.pool
    }

    fn set_parent_pool(&mut self, pool: PoolId) {
        self.pool = Some(pool);
    }
}

#[derive(Debug, Clone)]
enum Op {
    Take,
    TakeWithoutEnabling,
    Return(usize),
    ReturnTwice(usize),
    ReturnAll,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Take),
        1 => Just(Op::TakeWithoutEnabling),
        3 => any::<usize>().prop_map(Op::Return),
        1 => any::<usize>().prop_map(Op::ReturnTwice),
        1 => Just(Op::ReturnAll),
    ]
}

fn pool(prewarm: usize, cap: usize) -> ObjectPool<Prop> {
    let config = PoolConfiguration::new()
        .with_prewarm_amount(prewarm)
        .with_object_cap(cap);
    ObjectPool::new(Prop::default, config)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn counts_stay_within_cap(
        prewarm in 0usize..12,
        cap in 0usize..10,
        ops in proptest::collection::vec(op_strategy(), 1..60),
    ) {
        let mut pool = pool(prewarm, cap);
        let mut issued: Vec<PoolHandle> = Vec::new();

        prop_assert_eq!(pool.free_count(), prewarm.min(cap));
        prop_assert_eq!(pool.active_count(), 0);

        for op in ops {
            match op {
                Op::Take => {
                    let could_spawn = pool.can_spawn_amount(1);
                    match pool.take() {
                        Some(handle) => {
                            prop_assert!(pool.get(handle).unwrap().enabled);
                            issued.push(handle);
                        }
                        None => prop_assert!(!could_spawn),
                    }
                }
                Op::TakeWithoutEnabling => {
                    if let Some(handle) = pool.take_without_enabling() {
                        prop_assert!(!pool.get(handle).unwrap().enabled);
                        issued.push(handle);
                    }
                }
                Op::Return(pick) if !issued.is_empty() => {
                    let handle = issued[pick % issued.len()];
                    pool.return_object(handle);
                    prop_assert!(pool.is_free(handle));
                }
                Op::ReturnTwice(pick) if !issued.is_empty() => {
                    let handle = issued[pick % issued.len()];
                    pool.return_object(handle);
                    let free = pool.free_count();
                    pool.return_object(handle);
                    prop_assert_eq!(pool.free_count(), free);
                }
                Op::ReturnAll => {
                    pool.return_all_objects();
                    prop_assert_eq!(pool.active_count(), 0);
                }
                _ => {}
            }

            prop_assert!(pool.free_count() + pool.active_count() <= cap);
            for handle in &issued {
                prop_assert!(pool.is_free(*handle) != pool.is_active(*handle));
                prop_assert_eq!(pool.get(*handle).unwrap().parent_pool(), Some(pool.id()));
            }
        }
    }

    #[test]
    fn can_spawn_amount_covers_free_list(
        prewarm in 0usize..20,
        cap in 0usize..20,
        taken in 0usize..20,
    ) {
        let mut pool = pool(prewarm, cap);
        for _ in 0..taken {
            let _ = pool.take();
        }

        for n in 0..=pool.free_count() {
            prop_assert!(pool.can_spawn_amount(n));
        }
    }

    #[test]
    fn take_batch_matches_can_spawn_amount(
        prewarm in 0usize..10,
        cap in 0usize..10,
        count in 0usize..12,
    ) {
        let mut pool = pool(prewarm, cap);
        let expected = pool.can_spawn_amount(count);
        let active_before = pool.active_count();

        match pool.take_batch(count) {
            Ok(handles) => {
                prop_assert!(expected);
                prop_assert_eq!(handles.len(), count);
                prop_assert_eq!(pool.active_count(), active_before + count);
            }
            Err(_) => {
                prop_assert!(!expected);
                prop_assert_eq!(pool.active_count(), active_before);
            }
        }
    }
}

#[test]
fn taking_cap_instances_then_one_more_is_exhausted() {
    let cap = 5;
    let mut pool = pool(2, cap);

    let handles: Vec<_> = (0..cap).map(|_| pool.take()).collect();
    assert!(handles.iter().all(Option::is_some));
    assert!(pool.take().is_none());
    assert_eq!(pool.metrics().exhausted_events, 1);
}

#[test]
fn return_all_grows_free_list_by_active_count() {
    let mut pool = pool(3, 10);
    let taken: Vec<_> = (0..7).filter_map(|_| pool.take()).collect();
    assert_eq!(taken.len(), 7);

    let free_before = pool.free_count();
    pool.return_all_objects();

    assert_eq!(pool.active_count(), 0);
    assert_eq!(pool.free_count(), free_before + 7);
    for handle in taken {
        let prop = pool.get(handle).unwrap();
        assert_eq!(prop.enables, 1);
        assert_eq!(prop.disables, 1);
    }
}
