use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::controller::DashboardController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTask {
    Status,
    Stream,
}

impl PollTask {
    pub fn name(&self) -> &'static str {
        match self {
            PollTask::Status => "status",
            PollTask::Stream => "stream",
        }
    }
}

/// The two periodic refresh tasks. They run until the process exits or
/// the handles are aborted.
pub struct Pollers {
    status: JoinHandle<()>,
    stream: JoinHandle<()>,
}

impl Pollers {
    /// The stream task polls once right away, in the background, then every
    /// `period`. The status task's first tick lands one `period` after start.
    pub fn spawn(controller: Arc<DashboardController>, period: Duration) -> Self {
        info!("Polling status and stream every {}s", period.as_secs());
        let now = Instant::now();
        Self {
            status: spawn_periodic(Arc::clone(&controller), now + period, period, PollTask::Status),
            stream: spawn_periodic(controller, now, period, PollTask::Stream),
        }
    }

    pub fn abort(&self) {
        self.status.abort();
        self.stream.abort();
    }
}

fn spawn_periodic(
    controller: Arc<DashboardController>,
    start: Instant,
    period: Duration,
    task: PollTask,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let applied = match task {
                PollTask::Status => controller.poll_status().await,
                PollTask::Stream => controller.poll_stream().await,
            };
            debug!("{} poll finished (applied: {})", task.name(), applied);
        }
    })
}
