//! Moderator notification capability.
//!
//! The core only needs `send(subject, body)`; delivery goes through a
//! configured HTTP mail gateway. Without gateway settings the notifier is
//! disabled and dispatch becomes a logged no-op, which keeps local setups
//! and tests runnable.

use std::sync::{Arc, Mutex};

use reqwest::Client;
use serde_json::json;

use crate::comment::Comment;
use crate::config::NotifyConfig;

/// A dispatched notification, as captured by the memory transport.
#[derive(Clone, Debug)]
pub struct Mail {
    pub subject: String,
    pub body: String,
}

#[derive(Clone)]
pub struct Notifier {
    transport: Transport,
}

#[derive(Clone)]
enum Transport {
    Gateway { client: Client, config: NotifyConfig },
    Memory(Arc<Mutex<Vec<Mail>>>),
    Disabled,
}

impl Notifier {
    pub fn from_config(config: Option<NotifyConfig>) -> Self {
        match config {
            Some(config) => Self {
                transport: Transport::Gateway {
                    client: Client::new(),
                    config,
                },
            },
            None => Self::disabled(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            transport: Transport::Disabled,
        }
    }

    /// A transport that keeps mails in memory instead of delivering them.
    /// Lets tests follow the moderation link the way a moderator would.
    pub fn recording() -> (Self, Arc<Mutex<Vec<Mail>>>) {
        let outbox = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                transport: Transport::Memory(outbox.clone()),
            },
            outbox,
        )
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self.transport, Transport::Disabled)
    }

    pub async fn send(&self, subject: &str, body: &str) -> Result<(), reqwest::Error> {
        match &self.transport {
            Transport::Gateway { client, config } => {
                client
                    .post(&config.gateway_url)
                    .json(&json!({
                        "from": config.sender,
                        "to": config.recipient,
                        "subject": subject,
                        "text": body,
                    }))
                    .send()
                    .await?
                    .error_for_status()?;
                Ok(())
            }
            Transport::Memory(outbox) => {
                let mut outbox = outbox
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
                outbox.push(Mail {
                    subject: subject.to_string(),
                    body: body.to_string(),
                });
                Ok(())
            }
            Transport::Disabled => {
                tracing::debug!(subject, "notifications disabled, skipping dispatch");
                Ok(())
            }
        }
    }
}

/// Builds the subject and body of the moderation mail, including the
/// single-use acceptance link.
pub fn moderation_mail(comment: &Comment, service_url: &str, instance: &str) -> (String, String) {
    let subject = format!("New comment received for murmur instance \"{instance}\"");
    let additional = serde_json::to_string(&comment.additional.0).unwrap_or_default();
    let body = format!(
        "A new comment has been submitted.\n\
         \n\
         ID: \"{id}\"\n\
         Author: \"{author}\"\n\
         Target post: \"{target}\"\n\
         Additional data: \"{additional}\"\n\
         \n\
         Comment:\n\
         \"{message}\"\n\
         \n\
         Use the following link to accept the comment:\n\
         {service_url}/token/{id}/{token}\n\
         \n\
         If you don't want to accept the comment, you don't need to do anything.\n",
        id = comment.id,
        author = comment.author,
        target = comment.target,
        message = comment.message,
        token = comment.accept_token,
    );
    (subject, body)
}
