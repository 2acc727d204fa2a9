use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

// Events emitted by the services after their database work commits.
// Consumers only observe; nothing here feeds back into stock levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    SupplyCreated(i32),
    SupplyUpdated(i32),
    SupplyDeleted(i32),
    UsageRecorded {
        supply_id: i32,
        quantity_used: i32,
        remaining: i32,
    },
}

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
}

/// Drains the event channel and logs each event. Runs for the lifetime
/// of the process; ends only when every `EventSender` has been dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::SupplyCreated(id) => {
                info!(supply_id = id, "Supply created");
            }
            Event::SupplyUpdated(id) => {
                info!(supply_id = id, "Supply updated");
            }
            Event::SupplyDeleted(id) => {
                info!(supply_id = id, "Supply deleted");
            }
            Event::UsageRecorded {
                supply_id,
                quantity_used,
                remaining,
            } => {
                info!(
                    supply_id,
                    quantity_used, remaining, "Usage recorded against supply"
                );
                if *remaining == 0 {
                    warn!(supply_id, "Supply is fully depleted");
                }
            }
        }
    }

    warn!("Event processing loop has ended");
}
