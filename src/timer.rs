//! Rest timer between sets

use std::time::Duration;

use tokio::sync::watch;
use tracing::info;

/// How a countdown ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finished {
    Completed,
    Cancelled { remaining_secs: u64 },
}

/// Handle to cancel a running countdown
#[derive(Debug, Clone)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.0.send(true);
    }
}

/// Countdown of `total_secs` ticks, one per `tick`
pub struct RestTimer {
    total_secs: u64,
    tick: Duration,
    cancel_tx: watch::Sender<bool>,
    cancel_rx: watch::Receiver<bool>,
}

impl RestTimer {
    pub fn new(total_secs: u64) -> Self {
        Self::with_tick(total_secs, Duration::from_secs(1))
    }

    pub fn with_tick(total_secs: u64, tick: Duration) -> Self {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        Self {
            total_secs,
            tick,
            cancel_tx,
            cancel_rx,
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(self.cancel_tx.clone())
    }

    /// Run the countdown, calling `on_tick` with the seconds left
    pub async fn run(mut self, mut on_tick: impl FnMut(u64)) -> Finished {
        info!("Rest timer started: {}s", self.total_secs);
        let mut interval = tokio::time::interval(self.tick);
        // first tick completes immediately
        interval.tick().await;

        let mut remaining = self.total_secs;
        on_tick(remaining);
        while remaining > 0 {
            tokio::select! {
                _ = interval.tick() => {
                    remaining -= 1;
                    on_tick(remaining);
                }
                changed = self.cancel_rx.changed() => {
                    // only ever set to true
                    if changed.is_ok() {
                        info!("Rest timer cancelled with {}s left", remaining);
                        return Finished::Cancelled { remaining_secs: remaining };
                    }
                }
            }
        }
        info!("Rest timer finished");
        Finished::Completed
    }
}

pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_countdown_ticks_to_zero() {
        let mut seen = Vec::new();
        let timer = RestTimer::with_tick(3, Duration::from_millis(1));
        let result = timer.run(|left| seen.push(left)).await;
        assert_eq!(result, Finished::Completed);
        assert_eq!(seen, vec![3, 2, 1, 0]);
    }

    #[tokio::test]
    async fn test_zero_seconds_completes_immediately() {
        let timer = RestTimer::with_tick(0, Duration::from_millis(1));
        assert_eq!(timer.run(|_| {}).await, Finished::Completed);
    }

    #[tokio::test]
    async fn test_cancel() {
        let timer = RestTimer::with_tick(1000, Duration::from_millis(5));
        let handle = timer.cancel_handle();
        let task = tokio::spawn(timer.run(|_| {}));
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
        match task.await.unwrap() {
            Finished::Cancelled { remaining_secs } => assert!(remaining_secs > 0),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(90), "01:30");
        assert_eq!(format_clock(5), "00:05");
    }
}
