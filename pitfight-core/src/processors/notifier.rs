//! Notifier processor.
//!
//! Drains the outbound channel into the attached presenter. Keeping
//! delivery on its own task means a slow presenter backs up this
//! channel instead of stalling the matchmaker or the fight engine.

use crate::events::OutboundReceiver;
use crate::presenter::Presenter;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

pub struct Notifier {
    presenter: Arc<dyn Presenter>,
    outbound_rx: OutboundReceiver,
    shutdown_rx: watch::Receiver<bool>,
}

impl Notifier {
    pub fn new(
        presenter: Arc<dyn Presenter>,
        outbound_rx: OutboundReceiver,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            presenter,
            outbound_rx,
            shutdown_rx,
        }
    }

    /// Run the Notifier.
    pub async fn run(mut self) {
        info!("Notifier started");

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("Notifier received shutdown signal");
                        break;
                    }
                }

                Some(event) = self.outbound_rx.recv() => {
                    self.presenter.deliver(&event).await;
                }

                else => {
                    info!("outbound channel closed");
                    break;
                }
            }
        }

        // Flush whatever is already queued before going down.
        while let Ok(event) = self.outbound_rx.try_recv() {
            self.presenter.deliver(&event).await;
        }

        info!("Notifier shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{outbound_channel, NoticeKind, Outbound, Recipient};
    use tokio::sync::Mutex;

    struct RecordingPresenter {
        seen: Mutex<Vec<Outbound>>,
    }

    #[async_trait::async_trait]
    impl Presenter for RecordingPresenter {
        async fn deliver(&self, event: &Outbound) {
            self.seen.lock().await.push(event.clone());
        }
    }

    #[tokio::test]
    async fn delivers_queued_events_before_shutdown() {
        let presenter = Arc::new(RecordingPresenter {
            seen: Mutex::new(Vec::new()),
        });
        let (outbound, outbound_rx) = outbound_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let notifier = Notifier::new(presenter.clone(), outbound_rx, shutdown_rx);

        for i in 0..3 {
            outbound
                .send(Outbound::Notice {
                    to: Recipient::Broadcast,
                    kind: NoticeKind::Info,
                    text: format!("notice {i}"),
                })
                .await
                .unwrap();
        }
        shutdown_tx.send(true).unwrap();
        notifier.run().await;

        assert_eq!(presenter.seen.lock().await.len(), 3);
    }
}
