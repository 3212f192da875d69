use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Cancellable delayed task.
///
/// Every `schedule` aborts the previous timer and hands out a new ticket.
/// The firing task must `claim` its ticket before acting, so a timer that
/// was replaced while waiting for a lock still cannot fire.
#[derive(Debug, Default)]
pub struct Debouncer {
    ticket: u64,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any pending timer with `task(ticket)` run after `delay`.
    pub fn schedule<F, Fut>(&mut self, delay: Duration, task: F) -> u64
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.ticket += 1;
        let fut = task(self.ticket);
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            fut.await;
        }));
        self.ticket
    }

    /// Abort the pending timer. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some_and(|handle| {
            handle.abort();
            true
        })
    }

    /// Called by a firing timer: true only for the latest uncancelled ticket.
    pub fn claim(&mut self, ticket: u64) -> bool {
        if self.pending.is_some() && self.ticket == ticket {
            // Dropping the handle detaches; the caller is that very task.
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::Mutex;

    type Fired = Arc<Mutex<Vec<u64>>>;

    fn schedule_recording(debouncer: &mut Debouncer, fired: &Fired, delay_ms: u64) -> u64 {
        let fired = Arc::clone(fired);
        debouncer.schedule(Duration::from_millis(delay_ms), move |ticket| async move {
            fired.lock().unwrap().push(ticket);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_latest_fires() {
        let fired = Fired::default();
        let mut debouncer = Debouncer::new();

        schedule_recording(&mut debouncer, &fired, 750);
        tokio::time::sleep(Duration::from_millis(500)).await;
        let second = schedule_recording(&mut debouncer, &fired, 750);
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert_eq!(*fired.lock().unwrap(), vec![second]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_firing() {
        let fired = Fired::default();
        let mut debouncer = Debouncer::new();

        schedule_recording(&mut debouncer, &fired, 100);
        assert!(debouncer.is_pending());
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(fired.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_claim_only_once_and_only_latest() {
        let mut debouncer = Debouncer::new();
        let first = debouncer.schedule(Duration::from_secs(60), |_| async {});
        let second = debouncer.schedule(Duration::from_secs(60), |_| async {});

        assert!(!debouncer.claim(first));
        assert!(debouncer.claim(second));
        assert!(!debouncer.claim(second));
        assert!(!debouncer.is_pending());
    }
}
