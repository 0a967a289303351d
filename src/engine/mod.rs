mod error;
mod mutations;
mod queries;
mod transaction;

pub use error::{EngineError, RejectionKind};

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::Config;
use crate::model::QuantumPolicy;
use crate::observability;
use crate::partition::Calendar;
use crate::snapshot;

use transaction::Transaction;

/// The scheduler: every calendar partition behind one engine-wide lock.
///
/// All mutating operations hold the lock across their check and commit
/// phases, so a transaction touching several years is atomic to every other
/// caller. Nothing inside the lock blocks on I/O.
pub struct Engine {
    calendar: Mutex<Calendar>,
    policy: QuantumPolicy,
    /// Bumped once per committed transaction.
    generation: AtomicU64,
    /// Held across encode and write so saves to one path never interleave.
    save_lock: Mutex<()>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(QuantumPolicy::default())
    }
}

impl Engine {
    pub fn new(policy: QuantumPolicy) -> Self {
        Self::with_calendar(Calendar::new(), policy)
    }

    pub fn with_calendar(calendar: Calendar, policy: QuantumPolicy) -> Self {
        metrics::gauge!(observability::PARTITIONS).set(calendar.len() as f64);
        Self {
            calendar: Mutex::new(calendar),
            policy,
            generation: AtomicU64::new(0),
            save_lock: Mutex::new(()),
        }
    }

    /// Restore from a snapshot file. A missing file yields an empty engine.
    pub fn restore(path: &Path, policy: QuantumPolicy) -> io::Result<Self> {
        let calendar = snapshot::load_file(path)?;
        info!(
            "restored {} calendar partitions from {}",
            calendar.len(),
            path.display()
        );
        Ok(Self::with_calendar(calendar, policy))
    }

    /// Restore using the snapshot path and quantum policy from `config`.
    pub fn open(config: &Config) -> io::Result<Self> {
        Self::restore(&config.snapshot_path, config.quantum_policy)
    }

    /// Write a snapshot of the current calendar to `path`. Returns the
    /// generation the snapshot reflects.
    ///
    /// Concurrent saves run one after another, so the file always holds the
    /// latest generation any of them encoded.
    pub fn save(&self, path: &Path) -> io::Result<u64> {
        let _saving = self.save_lock.lock();
        let started = Instant::now();
        // Encode under the calendar lock, write outside it.
        let (bytes, generation) = {
            let calendar = self.calendar.lock();
            (snapshot::encode(&calendar)?, self.generation())
        };
        snapshot::write_bytes(path, &bytes)?;
        metrics::histogram!(observability::SNAPSHOT_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        metrics::gauge!(observability::SNAPSHOT_BYTES).set(bytes.len() as f64);
        debug!(
            "saved snapshot generation {generation} ({} bytes) to {}",
            bytes.len(),
            path.display()
        );
        Ok(generation)
    }

    pub fn policy(&self) -> QuantumPolicy {
        self.policy
    }

    /// Number of transactions committed since this engine was constructed.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Clone of the whole calendar, taken under the lock.
    pub fn snapshot(&self) -> Calendar {
        self.calendar.lock().clone()
    }

    /// Run `body` as one transaction: commit if it succeeds, discard otherwise.
    fn transact<F>(&self, op: &'static str, body: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<(), EngineError>,
    {
        let started = Instant::now();
        let mut calendar = self.calendar.lock();
        let mut tx = Transaction::new(&mut calendar, self.policy);
        let result = body(&mut tx);

        let outcome = match result {
            Ok(()) => {
                let years = tx.commit();
                self.generation.fetch_add(1, Ordering::AcqRel);
                debug!("{op} committed, years {years:?}");
                "committed"
            }
            Err(ref e) => {
                let years = tx.touched_years();
                drop(tx);
                debug!("{op} rejected: {e} (years {years:?})");
                match e.kind() {
                    RejectionKind::Collision => "collision",
                    RejectionKind::InvalidInput => "invalid_input",
                }
            }
        };
        let partitions = calendar.len();
        drop(calendar);

        metrics::gauge!(observability::PARTITIONS).set(partitions as f64);
        metrics::counter!(observability::TRANSACTIONS_TOTAL, "op" => op, "outcome" => outcome)
            .increment(1);
        metrics::histogram!(observability::TRANSACTION_DURATION_SECONDS, "op" => op)
            .record(started.elapsed().as_secs_f64());
        result
    }
}
