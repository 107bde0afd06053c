use anyhow::bail;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub const THANK_YOU: &str = "Thank you for your feedback! We will use this information to \
improve our noise pollution mitigation efforts in Palghar.";

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackReceipt {
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
    pub message: &'static str,
}

/// Acknowledges a feedback message. Nothing is forwarded or stored.
pub fn submit(message: &str) -> anyhow::Result<FeedbackReceipt> {
    let message = message.trim();
    if message.is_empty() {
        bail!("feedback message is empty");
    }

    let receipt = FeedbackReceipt {
        id: Uuid::new_v4(),
        received_at: Utc::now(),
        message: THANK_YOU,
    };
    tracing::info!(id = %receipt.id, chars = message.chars().count(), "feedback received");
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_feedback_is_rejected() {
        assert!(submit("   \n").is_err());
    }

    #[test]
    fn each_submission_gets_its_own_receipt() {
        let first = submit("Horns near the station all night").unwrap();
        let second = submit("Horns near the station all night").unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(first.message, THANK_YOU);
    }
}
