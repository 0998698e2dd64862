use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

/// Events emitted by the invoicing services. Consumers are in-process
/// only; delivery is best-effort and never fails a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    InvoiceCreated(Uuid),
    InvoiceUpdated(Uuid),
    InvoiceDeleted(Uuid),
    InvoiceStatusChanged {
        invoice_id: Uuid,
        old_status: String,
        new_status: String,
    },
    CustomerCreated(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
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
}

/// Drains the event channel, logging each event. Runs until every sender
/// is dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::InvoiceCreated(id) => info!(invoice_id = %id, "event: invoice created"),
            Event::InvoiceUpdated(id) => info!(invoice_id = %id, "event: invoice updated"),
            Event::InvoiceDeleted(id) => info!(invoice_id = %id, "event: invoice deleted"),
            Event::InvoiceStatusChanged {
                invoice_id,
                old_status,
                new_status,
            } => info!(
                invoice_id = %invoice_id,
                old_status = %old_status,
                new_status = %new_status,
                "event: invoice status changed"
            ),
            Event::CustomerCreated(id) => info!(customer_id = %id, "event: customer created"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_event() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);
        let id = Uuid::new_v4();

        sender.send(Event::InvoiceCreated(id)).await.unwrap();

        match rx.recv().await {
            Some(Event::InvoiceCreated(got)) => assert_eq!(got, id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_fails_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        assert!(sender.send(Event::InvoiceDeleted(Uuid::new_v4())).await.is_err());
    }
}
