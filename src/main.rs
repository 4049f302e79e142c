// Small walkthrough of the pool lifecycle with note props.
// Set RUST_LOG=spawnpool=trace to see every take and return.

use spawnpool::{ObjectPool, PoolConfiguration, PoolId, Poolable};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default)]
struct Note {
    lane: u8,
    visible: bool,
    pool: Option<PoolId>,
}

impl Poolable for Note {
    fn enable_from_pool(&mut self) {
        self.visible = true;
    }

    fn disable_into_pool(&mut self) {
        self.visible = false;
    }

    fn parent_pool(&self) -> Option<PoolId> {
        self.pool
    }

    fn set_parent_pool(&mut self, pool: PoolId) {
        self.pool = Some(pool);
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("spawnpool=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("=== spawnpool ===");

    let config = PoolConfiguration::new()
        .with_prewarm_amount(1)
        .with_object_cap(2);
    let mut pool = ObjectPool::from_prefab(Note::default(), config);
    report("after prewarm", &pool);

    let Some(first) = pool.take() else {
        println!("  pool exhausted immediately");
        return;
    };
    report("took first note", &pool);

    if let Some(second) = pool.take_without_enabling() {
        if let Some(note) = pool.get_mut(second) {
            note.lane = 3;
            note.enable_from_pool();
        }
        let lane = pool.get(second).map_or(0, |note| note.lane);
        report(&format!("staged second note on lane {lane}"), &pool);
    }

    match pool.take() {
        Some(_) => println!("  unexpected third note"),
        None => println!("  third take: exhausted"),
    }

    pool.return_object(first);
    report("returned first note", &pool);

    let reused = pool.take();
    println!("  reused first note: {}", reused == Some(first));

    pool.return_all_objects();
    report("returned everything", &pool);

    println!();
    for (key, value) in pool.export_metrics() {
        println!("  {}: {}", key, value);
    }
}

fn report(step: &str, pool: &ObjectPool<Note>) {
    println!(
        "  {:<30} active={} free={}",
        step,
        pool.active_count(),
        pool.free_count()
    );
}
