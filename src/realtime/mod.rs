//! Realtime data feed: push when available, interval polling otherwise.
//!
//! A background worker owns the gateway connection and forwards messages
//! over a flume channel. If a push transport is configured it is drained
//! until it errors, after which the worker degrades to polling the REST
//! endpoints on a fixed interval. The first poll happens immediately so the
//! dashboard never starts blank.

use std::thread;
use std::time::Duration;

use crate::api::{AlertsPayload, GatewayApi, LogsPayload, MetricsSnapshot};
use crate::error::ConsoleError;

/// Polling cadence when no push transport is connected.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(30_000);

/// How long one push wait blocks before the worker re-checks for shutdown.
const PUSH_WAIT: Duration = Duration::from_millis(250);

/// One update from the gateway, regardless of how it arrived.
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeMessage {
    Metrics(MetricsSnapshot),
    Alerts(AlertsPayload),
    Logs(LogsPayload),
}

/// A connected push stream (e.g. a websocket bridge). The worker drains it
/// until it errors; there is no reconnect, the channel falls back to polling
/// for the rest of its life.
pub trait PushTransport: Send {
    /// Wait up to `timeout` for the next pushed message. `Ok(None)` means
    /// nothing arrived yet.
    fn poll_message(&mut self, timeout: Duration) -> Result<Option<RealtimeMessage>, ConsoleError>;
}

/// Handle to a running realtime worker. Dropping it stops the worker;
/// [`RealtimeHandle::stop`] does the same but waits for the thread.
pub struct RealtimeHandle {
    kill_tx: flume::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl RealtimeHandle {
    /// Signal the worker and wait for it to exit.
    pub fn stop(mut self) {
        let _ = self.kill_tx.send(());
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RealtimeHandle {
    fn drop(&mut self) {
        let _ = self.kill_tx.send(());
    }
}

/// Spawn the realtime worker. Returns the control handle and the message
/// stream; the stream ends when the worker stops.
pub fn start(
    api: Box<dyn GatewayApi>,
    push: Option<Box<dyn PushTransport>>,
    interval: Duration,
) -> (RealtimeHandle, flume::Receiver<RealtimeMessage>) {
    let (tx, rx) = flume::unbounded();
    let (kill_tx, kill_rx) = flume::bounded(1);

    let thread = thread::spawn(move || {
        run_worker(api, push, interval, tx, kill_rx);
    });

    (
        RealtimeHandle {
            kill_tx,
            thread: Some(thread),
        },
        rx,
    )
}

fn run_worker(
    api: Box<dyn GatewayApi>,
    mut push: Option<Box<dyn PushTransport>>,
    interval: Duration,
    tx: flume::Sender<RealtimeMessage>,
    kill_rx: flume::Receiver<()>,
) {
    loop {
        if let Some(transport) = push.as_mut() {
            match transport.poll_message(PUSH_WAIT) {
                Ok(Some(message)) => {
                    if tx.send(message).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    log::warn!("push transport lost, falling back to polling: {err}");
                    push = None;
                }
            }
            match kill_rx.try_recv() {
                Ok(()) => return,
                Err(flume::TryRecvError::Disconnected) => return,
                Err(flume::TryRecvError::Empty) => {}
            }
        } else {
            for message in poll_once(api.as_ref()) {
                if tx.send(message).is_err() {
                    return;
                }
            }
            match kill_rx.recv_timeout(interval) {
                Ok(()) => return,
                Err(flume::RecvTimeoutError::Disconnected) => return,
                Err(flume::RecvTimeoutError::Timeout) => {}
            }
        }
    }
}

/// One polling round. Endpoint failures are logged and skipped so a flaky
/// gateway degrades to stale panels rather than a dead feed.
fn poll_once(api: &dyn GatewayApi) -> Vec<RealtimeMessage> {
    let mut messages = Vec::with_capacity(3);
    match api.fetch_metrics() {
        Ok(snapshot) => messages.push(RealtimeMessage::Metrics(snapshot)),
        Err(err) => log::warn!("metrics poll failed: {err}"),
    }
    match api.fetch_alerts() {
        Ok(alerts) => messages.push(RealtimeMessage::Alerts(alerts)),
        Err(err) => log::warn!("alerts poll failed: {err}"),
    }
    match api.fetch_logs() {
        Ok(logs) => messages.push(RealtimeMessage::Logs(logs)),
        Err(err) => log::warn!("logs poll failed: {err}"),
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ShareRecord, ShareTotals};
    use crate::form::ShareCreationRequest;
    use serde_json::Value;

    struct StubApi {
        fail_logs: bool,
    }

    impl GatewayApi for StubApi {
        fn submit_share_request(&self, _: &ShareCreationRequest) -> Result<(), ConsoleError> {
            Ok(())
        }

        fn fetch_metrics(&self) -> Result<MetricsSnapshot, ConsoleError> {
            Ok(MetricsSnapshot {
                shares: ShareTotals {
                    total: 3,
                    active: 2,
                    storage: 0,
                },
                ..MetricsSnapshot::default()
            })
        }

        fn fetch_alerts(&self) -> Result<AlertsPayload, ConsoleError> {
            Ok(AlertsPayload::default())
        }

        fn fetch_logs(&self) -> Result<LogsPayload, ConsoleError> {
            if self.fail_logs {
                Err(ConsoleError::Transport {
                    status: Some(503),
                    message: "logs endpoint down".to_string(),
                })
            } else {
                Ok(LogsPayload::default())
            }
        }

        fn list_shares(&self) -> Result<Vec<ShareRecord>, ConsoleError> {
            Ok(Vec::new())
        }

        fn save_settings(&self, _: &str, _: &Value) -> Result<(), ConsoleError> {
            Ok(())
        }

        fn start_backup(&self, _: Option<&str>) -> Result<(), ConsoleError> {
            Ok(())
        }
    }

    struct OneShotPush {
        sent: bool,
    }

    impl PushTransport for OneShotPush {
        fn poll_message(
            &mut self,
            _timeout: Duration,
        ) -> Result<Option<RealtimeMessage>, ConsoleError> {
            if self.sent {
                Err(ConsoleError::Transport {
                    status: None,
                    message: "stream closed".to_string(),
                })
            } else {
                self.sent = true;
                Ok(Some(RealtimeMessage::Logs(LogsPayload {
                    logs: vec!["pushed".to_string()],
                })))
            }
        }
    }

    #[test]
    fn polling_delivers_an_immediate_first_round() {
        let (handle, rx) = start(
            Box::new(StubApi { fail_logs: false }),
            None,
            Duration::from_secs(60),
        );
        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(first, RealtimeMessage::Metrics(m) if m.shares.total == 3));
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(2)).unwrap(),
            RealtimeMessage::Alerts(_)
        ));
        handle.stop();
    }

    #[test]
    fn failed_endpoint_is_skipped_not_fatal() {
        let (handle, rx) = start(
            Box::new(StubApi { fail_logs: true }),
            None,
            Duration::from_secs(60),
        );
        let mut kinds = Vec::new();
        for _ in 0..2 {
            kinds.push(rx.recv_timeout(Duration::from_secs(2)).unwrap());
        }
        handle.stop();
        assert!(kinds.iter().any(|m| matches!(m, RealtimeMessage::Metrics(_))));
        assert!(!kinds.iter().any(|m| matches!(m, RealtimeMessage::Logs(_))));
    }

    #[test]
    fn push_failure_falls_back_to_polling() {
        let (handle, rx) = start(
            Box::new(StubApi { fail_logs: false }),
            Some(Box::new(OneShotPush { sent: false })),
            Duration::from_secs(60),
        );
        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(first, RealtimeMessage::Logs(ref l) if l.logs == ["pushed"]));
        // After the stream drops, the polling round takes over.
        let next = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(next, RealtimeMessage::Metrics(_)));
        handle.stop();
    }

    #[test]
    fn stop_ends_the_stream() {
        let (handle, rx) = start(
            Box::new(StubApi { fail_logs: false }),
            None,
            Duration::from_millis(10),
        );
        handle.stop();
        // Sender dropped with the worker; the stream drains then disconnects.
        while rx.recv_timeout(Duration::from_secs(1)).is_ok() {}
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }
}
