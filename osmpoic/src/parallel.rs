//! Worker pool for independent category jobs.

use std::sync::mpsc::sync_channel;

use parking_lot::Mutex;
use pbr::ProgressBar;

/// Runs every job on a pool of `num_workers` threads and returns the
/// outcomes in job order.
///
/// Workers drain the job list through a shared iterator; outcomes flow
/// back over a channel and advance the progress bar as they arrive. A
/// failed job is an ordinary outcome and never keeps the remaining jobs
/// from running. With one worker the pool degenerates to a strictly
/// sequential run.
pub fn parallel_process<Item, Out, Run>(
    progress_message: &str,
    jobs: Vec<Item>,
    num_workers: usize,
    run: Run,
) -> Vec<Out>
where
    Item: Send,
    Out: Send,
    Run: Fn(Item) -> Out + Sync,
{
    let num_workers = num_workers.max(1).min(jobs.len().max(1));
    let mut pb = ProgressBar::new(jobs.len() as u64);
    pb.message(progress_message);

    let jobs = Mutex::new(jobs.into_iter().enumerate());
    let mut outcomes = Vec::new();
    crossbeam::scope(|s| {
        let (sender, receiver) = sync_channel(num_workers);
        for _ in 0..num_workers {
            let sender = sender.clone();
            let jobs = &jobs;
            let run = &run;
            s.spawn(move |_| loop {
                let (idx, job) = match jobs.lock().next() {
                    Some(next) => next,
                    None => break,
                };
                if sender.send((idx, run(job))).is_err() {
                    break;
                }
            });
        }
        drop(sender); // makes the receiver finish once all workers are done

        for outcome in receiver {
            outcomes.push(outcome);
            pb.inc();
        }
    })
    .expect("worker thread panicked");
    pb.finish();

    outcomes.sort_by_key(|(idx, _)| *idx);
    outcomes.into_iter().map(|(_, out)| out).collect()
}
