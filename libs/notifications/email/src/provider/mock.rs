//! In-process transport for tests and local runs

use super::{MailTransport, SendResult};
use crate::models::OutgoingEmail;
use async_trait::async_trait;
use eyre::{eyre, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Records every message instead of sending it.
///
/// Sending and verification failures can be toggled independently.
#[derive(Default)]
pub struct MockMailTransport {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    fail_send: AtomicBool,
    fail_verify: AtomicBool,
}

impl MockMailTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts the connection check but rejects every send
    pub fn failing() -> Self {
        let transport = Self::default();
        transport.set_fail_send(true);
        transport
    }

    /// Fails the startup connection check
    pub fn unreachable() -> Self {
        let transport = Self::default();
        transport.fail_verify.store(true, Ordering::SeqCst);
        transport
    }

    pub fn set_fail_send(&self, fail: bool) {
        self.fail_send.store(fail, Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn was_sent_to(&self, address: &str) -> bool {
        self.sent.lock().await.iter().any(|email| email.to == address)
    }
}

#[async_trait]
impl MailTransport for MockMailTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<SendResult> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(eyre!("mock transport rejected message to {}", email.to));
        }

        let mut sent = self.sent.lock().await;
        sent.push(email.clone());

        Ok(SendResult {
            message_id: Some(format!("mock-{}", sent.len())),
        })
    }

    async fn verify(&self) -> Result<()> {
        if self.fail_verify.load(Ordering::SeqCst) {
            return Err(eyre!("mock transport unreachable"));
        }
        Ok(())
    }
}
