//! Cancellable fixed-interval background tasks.
//!
//! Each `ScheduledTask` owns one thread that waits on a `crossbeam_channel::tick`
//! and a stop channel in a `select!`. Dropping the stop sender disconnects the
//! channel, which wakes the thread immediately, so cancellation never waits
//! for the next tick.
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Sender, bounded, select, tick};
use log::{debug, error, info};

use crate::result::Result;

/// Handle to a running periodic task. Cancelled on drop.
pub struct ScheduledTask {
    name: String,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    /// Runs `job` every `interval` on a dedicated thread.
    ///
    /// With `run_immediately` the job also runs once right after spawning,
    /// before the first tick.
    pub fn every<F>(
        name: &str,
        interval: Duration,
        run_immediately: bool,
        mut job: F,
    ) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let ticker = tick(interval);
        let task_name = name.to_string();

        let handle = thread::Builder::new()
            .name(task_name.clone())
            .spawn(move || {
                info!("Task {} started (every {:?})", task_name, interval);
                if run_immediately {
                    job();
                }
                loop {
                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(ticker) -> _ => {
                            debug!("Task {} tick", task_name);
                            job();
                        }
                    }
                }
                info!("Task {} stopped", task_name);
            })?;

        Ok(Self {
            name: name.to_string(),
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Task name, also used as the thread name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` until the task has been cancelled.
    pub fn is_running(&self) -> bool {
        self.stop_tx.is_some()
    }

    /// Stops the task and waits for its thread to exit.
    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Disconnecting the channel is the stop signal.
        self.stop_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Task {} panicked", self.name);
            }
        }
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.shutdown();
    }
}
