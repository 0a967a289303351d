use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{NaiveDate, TimeDelta};

use slotcal::{Engine, Interval, QuantumPolicy, Timestamp};

const THREADS: usize = 8;
const OPS_PER_THREAD: usize = 20_000;

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64) * p / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    if latencies.is_empty() {
        println!("  {label}: no samples");
        return;
    }
    latencies.sort();
    let total: Duration = latencies.iter().sum();
    let avg = total / latencies.len() as u32;
    println!("  {label}:");
    println!(
        "    n={}, avg={:.1}us, p50={:.1}us, p95={:.1}us, p99={:.1}us, max={:.1}us",
        latencies.len(),
        avg.as_secs_f64() * 1e6,
        percentile(latencies, 50.0).as_secs_f64() * 1e6,
        percentile(latencies, 95.0).as_secs_f64() * 1e6,
        percentile(latencies, 99.0).as_secs_f64() * 1e6,
        latencies[latencies.len() - 1].as_secs_f64() * 1e6,
    );
}

fn origin() -> Timestamp {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Deterministic pseudo-random stream per worker (xorshift).
struct Stream(u64);

impl Stream {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    /// Interval of 15 minutes to 4 hours somewhere in 2024-2026.
    fn interval(&mut self) -> Interval {
        let quarter = (self.next() % (3 * 365 * 96)) as i64;
        let len = 1 + (self.next() % 16) as i64;
        let start = origin() + TimeDelta::minutes(15 * quarter);
        Interval::new(start, start + TimeDelta::minutes(15 * len))
    }
}

struct WorkerStats {
    allocate: Vec<Duration>,
    reassign: Vec<Duration>,
    release: Vec<Duration>,
    committed: usize,
    rejected: usize,
}

fn worker(engine: Arc<Engine>, seed: u64) -> WorkerStats {
    let mut rng = Stream(seed);
    let mut held: Vec<Interval> = Vec::new();
    let mut stats = WorkerStats {
        allocate: Vec::new(),
        reassign: Vec::new(),
        release: Vec::new(),
        committed: 0,
        rejected: 0,
    };

    for _ in 0..OPS_PER_THREAD {
        let roll = rng.next() % 10;
        let started = Instant::now();
        let result = if roll < 6 || held.is_empty() {
            let iv = rng.interval();
            let r = engine.allocate(iv);
            stats.allocate.push(started.elapsed());
            if r.is_ok() {
                held.push(iv);
            }
            r
        } else if roll < 8 {
            let idx = (rng.next() as usize) % held.len();
            let new = rng.interval();
            let r = engine.reassign(held[idx], new);
            stats.reassign.push(started.elapsed());
            if r.is_ok() {
                held[idx] = new;
            }
            r
        } else {
            let idx = (rng.next() as usize) % held.len();
            let iv = held.swap_remove(idx);
            let r = engine.release(iv);
            stats.release.push(started.elapsed());
            if r.is_err() {
                held.push(iv);
            }
            r
        };
        match result {
            Ok(()) => stats.committed += 1,
            Err(_) => stats.rejected += 1,
        }
    }
    stats
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .init();

    println!("slotcal stress: {THREADS} threads x {OPS_PER_THREAD} ops");
    let engine = Arc::new(Engine::new(QuantumPolicy::Strict));

    let started = Instant::now();
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let engine = engine.clone();
            thread::spawn(move || worker(engine, 0x9E37_79B9_7F4A_7C15 ^ (i as u64 + 1)))
        })
        .collect();

    let mut allocate = Vec::new();
    let mut reassign = Vec::new();
    let mut release = Vec::new();
    let (mut committed, mut rejected) = (0, 0);
    for h in handles {
        let stats = h.join().expect("worker panicked");
        allocate.extend(stats.allocate);
        reassign.extend(stats.reassign);
        release.extend(stats.release);
        committed += stats.committed;
        rejected += stats.rejected;
    }
    let elapsed = started.elapsed();

    let total = committed + rejected;
    println!(
        "  {total} ops in {:.2}s ({:.0} ops/s), committed={committed}, rejected={rejected}",
        elapsed.as_secs_f64(),
        total as f64 / elapsed.as_secs_f64()
    );
    print_latency("allocate", &mut allocate);
    print_latency("reassign", &mut reassign);
    print_latency("release", &mut release);

    let years = engine.years();
    let reserved: usize = years.iter().map(|y| engine.reserved_slots(*y)).sum();
    println!("  partitions={}, reserved slots={reserved}", years.len());
}
