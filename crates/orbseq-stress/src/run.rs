use std::{
    collections::HashSet,
    sync::{Arc, Barrier},
    thread,
    time::{Duration, Instant},
};

use anyhow::{anyhow, bail};
use orbseq::{AtomicCounterStore, NumberSequence, SequenceRegistry};

use crate::config::StressConfig;

/// Outcome of one sequence after the run.
#[derive(Debug)]
pub struct SequenceReport {
    pub name: String,
    pub ids: Vec<u64>,
    pub unique: usize,
}

impl SequenceReport {
    pub fn duplicates(&self) -> usize {
        self.ids.len() - self.unique
    }
}

#[derive(Debug)]
pub struct Report {
    pub elapsed: Duration,
    pub sample: usize,
    pub sequences: Vec<SequenceReport>,
}

impl Report {
    pub fn total(&self) -> usize {
        self.sequences.iter().map(|s| s.ids.len()).sum()
    }

    pub fn log(&self) {
        let total = self.total();
        let secs = self.elapsed.as_secs_f64();
        let per_sec = if secs > 0.0 { total as f64 / secs } else { f64::INFINITY };
        tracing::info!(
            total,
            elapsed_ms = self.elapsed.as_millis() as u64,
            ids_per_sec = per_sec as u64,
            "stress run finished"
        );

        for sequence in &self.sequences {
            let sample = &sequence.ids[..self.sample.min(sequence.ids.len())];
            tracing::info!(
                sequence = %sequence.name,
                issued = sequence.ids.len(),
                unique = sequence.unique,
                duplicates = sequence.duplicates(),
                ?sample,
                "sequence summary"
            );
        }
    }

    pub fn ensure_unique(&self) -> anyhow::Result<()> {
        let offenders: Vec<&str> = self
            .sequences
            .iter()
            .filter(|s| s.duplicates() > 0)
            .map(|s| s.name.as_str())
            .collect();
        if !offenders.is_empty() {
            bail!("duplicate ids issued by {offenders:?}");
        }
        Ok(())
    }
}

/// Drives every worker against one shared registry and gathers the ids.
pub fn run(config: &StressConfig) -> anyhow::Result<Report> {
    let registry = SequenceRegistry::new(AtomicCounterStore::default(), config.sequence.clone())?;

    // Resolve every sequence up front so a bad bound fails before any worker
    // is parked on the barrier.
    let sequences = config
        .sequences
        .iter()
        .map(|name| -> orbseq::Result<Arc<dyn NumberSequence>> {
            Ok(match config.upper_bound {
                Some(bound) => registry.scrambled(name, bound)? as Arc<dyn NumberSequence>,
                None => registry.sequence(name)? as Arc<dyn NumberSequence>,
            })
        })
        .collect::<orbseq::Result<Vec<_>>>()?;

    let barrier = Barrier::new(config.threads + 1);
    let (elapsed, results) = thread::scope(|s| {
        let handles: Vec<_> = (0..config.threads)
            .map(|worker| {
                let sequence = Arc::clone(&sequences[worker % sequences.len()]);
                let barrier = &barrier;
                s.spawn(move || {
                    tracing::debug!(worker, sequence = config.sequence_for(worker), "worker ready");
                    barrier.wait();
                    (0..config.ids_per_thread)
                        .map(|_| sequence.try_next_id())
                        .collect::<orbseq::Result<Vec<u64>>>()
                })
            })
            .collect();

        barrier.wait();
        let start = Instant::now();
        let results: Vec<_> = handles.into_iter().map(|h| h.join()).collect();
        (start.elapsed(), results)
    });

    let mut per_sequence: Vec<Vec<u64>> = vec![Vec::new(); sequences.len()];
    for (worker, result) in results.into_iter().enumerate() {
        let ids = result.map_err(|_| anyhow!("worker {worker} panicked"))??;
        per_sequence[worker % sequences.len()].extend(ids);
    }

    let sequences = config
        .sequences
        .iter()
        .zip(per_sequence)
        .map(|(name, ids)| {
            let unique = ids.iter().collect::<HashSet<_>>().len();
            SequenceReport {
                name: name.clone(),
                ids,
                unique,
            }
        })
        .collect();

    Ok(Report {
        elapsed,
        sample: config.sample,
        sequences,
    })
}
