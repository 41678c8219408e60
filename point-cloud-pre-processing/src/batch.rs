//! Fixed-size worker pool mapping a per-unit function over a batch.
use crate::error::{PreprocessError, Result};
use crate::progress::unit_progress_bar;
use log::{error, info};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

/// Runs `work` for every item on a pool of `num_workers` threads.
///
/// Every unit runs to completion. Failures are logged with `describe(item)`
/// and reported together as a [`PreprocessError::Batch`]; the successful
/// outputs are returned in item order only when nothing failed.
pub fn run_batch<T, R, D, F>(
    num_workers: usize,
    items: &[T],
    unit: &str,
    describe: D,
    work: F,
) -> Result<Vec<R>>
where
    T: Sync,
    R: Send,
    D: Fn(&T) -> String + Sync,
    F: Fn(&T) -> Result<R> + Sync,
{
    let pool = ThreadPoolBuilder::new().num_threads(num_workers).build()?;
    let total = items.len();
    let pb = unit_progress_bar(total as u64, unit, "Processing");

    info!("Processing {total} {unit} on {num_workers} workers");
    let outcomes: Vec<Result<R>> = pool.install(|| {
        items
            .par_iter()
            .map(|item| {
                let outcome = work(item);
                if let Err(e) = &outcome {
                    error!("Failed to process {}: {e}", describe(item));
                }
                pb.inc(1);
                outcome
            })
            .collect()
    });
    pb.finish_and_clear();

    let failed = outcomes.iter().filter(|o| o.is_err()).count();
    if failed > 0 {
        return Err(PreprocessError::Batch { failed, total });
    }
    outcomes.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn outputs_keep_item_order() {
        let items: Vec<u32> = (0..20).collect();
        let doubled = run_batch(4, &items, "items", |i| i.to_string(), |i| Ok(i * 2)).unwrap();
        assert_eq!(doubled, items.iter().map(|i| i * 2).collect::<Vec<_>>());
    }

    #[test]
    fn failures_do_not_stop_other_units() {
        let items: Vec<u32> = (0..10).collect();
        let ran = AtomicUsize::new(0);
        let result = run_batch(
            2,
            &items,
            "items",
            |i| format!("item {i}"),
            |i| {
                ran.fetch_add(1, Ordering::SeqCst);
                if i % 3 == 0 {
                    Err(PreprocessError::Input(format!("bad item {i}")))
                } else {
                    Ok(())
                }
            },
        );

        assert_eq!(ran.load(Ordering::SeqCst), 10);
        assert!(matches!(
            result,
            Err(PreprocessError::Batch {
                failed: 4,
                total: 10
            })
        ));
    }

    #[test]
    fn empty_batch_succeeds() {
        let items: Vec<u32> = Vec::new();
        let out = run_batch(1, &items, "items", |i| i.to_string(), |_| Ok(())).unwrap();
        assert!(out.is_empty());
    }
}
