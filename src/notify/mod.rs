pub mod email;

pub use email::EmailNotifier;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("bad address {address:?}: {reason}")]
    Address { address: String, reason: String },
    #[error("could not build message: {0}")]
    Message(String),
    #[error("smtp transport failed: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub subject: String,
    pub body: String,
}

/// Plain-text delivery to the configured recipient. Callers log failures and
/// move on; nothing is retried.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&mut self, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Logs every message instead of delivering it. Used when email is not
/// configured; clones share the outbox so messages can be inspected.
#[derive(Debug, Clone, Default)]
pub struct DryRunNotifier {
    outbox: Arc<Mutex<Vec<Message>>>,
}

impl DryRunNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.outbox
            .lock()
            .map(|m| m.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }
}

#[async_trait]
impl Notifier for DryRunNotifier {
    async fn send(&mut self, subject: &str, body: &str) -> Result<(), NotifyError> {
        info!("[dry-run] {}\n{}", subject, body);
        let mut outbox = self.outbox.lock().unwrap_or_else(|e| e.into_inner());
        outbox.push(Message {
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// SMTP when all email settings are present, otherwise a dry run.
pub fn from_config(cfg: &Config) -> Box<dyn Notifier> {
    if !cfg.email_enabled() {
        warn!("EMAIL_FROM / EMAIL_TO / APP_PASSWORD not all set; emails will only be logged");
        return Box::new(DryRunNotifier::new());
    }
    match EmailNotifier::new(cfg) {
        Ok(n) => Box::new(n),
        Err(e) => {
            warn!("Email disabled: {}", e);
            Box::new(DryRunNotifier::new())
        }
    }
}
