use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Payload sent to every browser session after a successful rebuild.
pub const RELOAD_MESSAGE: &str = "update";

pub type ClientId = u64;

#[derive(Debug)]
struct ReloadClient {
    id: ClientId,
    tx: UnboundedSender<&'static str>,
}

/// Registry of browser sessions waiting for the next reload.
///
/// Every client registered at the time of [`ReloadChannel::notify_all`] gets
/// exactly one message and is then dropped from the set; a session that
/// connects afterwards waits for the following rebuild.
#[derive(Debug, Default)]
pub struct ReloadChannel {
    clients: Mutex<Vec<ReloadClient>>,
    next_id: AtomicU64,
}

impl ReloadChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a client and returns the receiving half its socket task drains.
    pub fn register(&self) -> (ClientId, UnboundedReceiver<&'static str>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = unbounded_channel();
        self.clients.lock().push(ReloadClient { id, tx });
        (id, rx)
    }

    /// Drops a client whose socket went away before the next rebuild.
    pub fn unregister(&self, id: ClientId) {
        self.clients.lock().retain(|client| client.id != id);
    }

    /// Sends one reload message to every tracked client and clears the set.
    /// Returns how many clients were notified.
    pub fn notify_all(&self) -> usize {
        let clients = std::mem::take(&mut *self.clients.lock());

        for client in &clients {
            // The socket task may already be gone.
            let _ = client.tx.send(RELOAD_MESSAGE);
        }

        clients.len()
    }

    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_client_gets_exactly_one_update() {
        let channel = ReloadChannel::new();
        let mut receivers: Vec<_> = (0..3).map(|_| channel.register().1).collect();
        assert_eq!(channel.len(), 3);

        assert_eq!(channel.notify_all(), 3);
        assert!(channel.is_empty());

        for rx in &mut receivers {
            assert_eq!(rx.try_recv(), Ok(RELOAD_MESSAGE));
            // The sender was dropped with the cleared set.
            assert!(rx.try_recv().is_err());
        }
    }

    #[test]
    fn late_clients_wait_for_the_next_rebuild() {
        let channel = ReloadChannel::new();
        let (_, mut early) = channel.register();

        channel.notify_all();
        let (_, mut late) = channel.register();

        assert_eq!(early.try_recv(), Ok(RELOAD_MESSAGE));
        assert!(late.try_recv().is_err());
        assert_eq!(channel.len(), 1);

        assert_eq!(channel.notify_all(), 1);
        assert_eq!(late.try_recv(), Ok(RELOAD_MESSAGE));
    }

    #[test]
    fn closed_clients_do_not_break_notification() {
        let channel = ReloadChannel::new();
        let (_, dropped) = channel.register();
        let (_, mut alive) = channel.register();
        drop(dropped);

        assert_eq!(channel.notify_all(), 2);
        assert_eq!(alive.try_recv(), Ok(RELOAD_MESSAGE));
    }

    #[test]
    fn unregister_removes_only_that_client() {
        let channel = ReloadChannel::new();
        let (first, _rx1) = channel.register();
        let (_, _rx2) = channel.register();

        channel.unregister(first);

        assert_eq!(channel.len(), 1);
    }

    #[test]
    fn notify_without_clients_is_a_no_op() {
        assert_eq!(ReloadChannel::new().notify_all(), 0);
    }
}
