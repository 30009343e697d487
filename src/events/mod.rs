use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the channel is closed.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "Dropping purchase order event");
        }
    }
}

/// Purchase order lifecycle events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    PurchaseOrderCreated {
        id: i32,
        po_no: String,
        grand_total: Decimal,
    },
    PurchaseOrderUpdated {
        id: i32,
        po_no: String,
        grand_total: Decimal,
    },
    PurchaseOrderDeleted {
        id: i32,
        po_no: String,
        detached_children: u64,
    },
    DetailsChanged {
        po_id: i32,
        grand_total: Decimal,
    },
}

pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::PurchaseOrderCreated {
                id,
                po_no,
                grand_total,
            } => {
                info!(po_id = id, %po_no, %grand_total, "Purchase order created");
            }
            Event::PurchaseOrderUpdated {
                id,
                po_no,
                grand_total,
            } => {
                info!(po_id = id, %po_no, %grand_total, "Purchase order updated");
            }
            Event::PurchaseOrderDeleted {
                id,
                po_no,
                detached_children,
            } => {
                if detached_children > 0 {
                    info!(
                        po_id = id,
                        %po_no,
                        detached_children,
                        "Purchase order deleted; child orders detached"
                    );
                } else {
                    info!(po_id = id, %po_no, "Purchase order deleted");
                }
            }
            Event::DetailsChanged { po_id, grand_total } => {
                info!(po_id, %grand_total, "Purchase order lines changed");
            }
        }
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn sender_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        let event = Event::DetailsChanged {
            po_id: 3,
            grand_total: dec!(10.50),
        };

        sender.send(event.clone()).await.unwrap();
        assert_eq!(rx.recv().await, Some(event));
    }

    #[tokio::test]
    async fn send_fails_once_receiver_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        let result = sender
            .send(Event::PurchaseOrderDeleted {
                id: 1,
                po_no: "PO1".into(),
                detached_children: 0,
            })
            .await;
        assert!(result.is_err());
    }
}
