// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! RsvpService
//!
//! Validates rsvp entries, writes them to the [`RsvpStore`] and computes the aggregated counts.
//! Every successfully saved single entry is handed to the [`NotificationSink`] on a detached task.
use super::NotificationSink;
use crate::BlockingError;
use database::DatabaseError;
use db_storage::rsvps::{NewRsvp, Rsvp, RsvpStatus, RsvpStore};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

#[derive(Debug, thiserror::Error)]
pub enum RsvpError {
    #[error("Invalid RSVP status{}.", in_entry(.index))]
    InvalidStatus { index: Option<usize> },
    #[error("Invalid email address{}.", in_entry(.index))]
    InvalidEmail { index: Option<usize> },
    #[error("Missing required field `{field}`{}.", in_entry(.index))]
    MissingField {
        index: Option<usize>,
        field: &'static str,
    },
    #[error("Player not found.")]
    NotFound,
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Blocking(#[from] BlockingError),
}

fn in_entry(index: &Option<usize>) -> String {
    index
        .map(|index| format!(" in entry {index}"))
        .unwrap_or_default()
}

/// Unvalidated rsvp as received from a client
#[derive(Debug, Clone, Default)]
pub struct RsvpEntry {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
}

/// Aggregated counts over all stored rsvps
///
/// `Maybe` answers are only part of the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RsvpCounts {
    pub total: i64,
    pub confirmed: i64,
    pub declined: i64,
}

pub struct RsvpService {
    store: Arc<dyn RsvpStore>,
    notifier: Arc<dyn NotificationSink>,
    notification_timeout: Duration,
}

impl RsvpService {
    pub fn new(
        store: Arc<dyn RsvpStore>,
        notifier: Arc<dyn NotificationSink>,
        notification_timeout: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            notification_timeout,
        }
    }

    /// Validates and saves a single entry, replacing an existing rsvp with the same id
    ///
    /// Sends a notification for the saved rsvp without waiting for its outcome.
    #[tracing::instrument(err, skip_all)]
    pub async fn upsert_one(&self, entry: RsvpEntry) -> Result<Rsvp, RsvpError> {
        let new_rsvp = validate_entry(entry)?;

        let store = self.store.clone();
        let rsvp = crate::block(move || store.put(new_rsvp)).await??;

        self.notify_detached(rsvp.clone());

        Ok(rsvp)
    }

    /// Validates all entries and saves them in a single transaction
    ///
    /// The first invalid entry aborts the whole batch before anything is written.
    #[tracing::instrument(err, skip_all, fields(len = entries.len()))]
    pub async fn upsert_bulk(&self, entries: Vec<RsvpEntry>) -> Result<Vec<Rsvp>, RsvpError> {
        let new_rsvps = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| validate_bulk_entry(index, entry))
            .collect::<Result<Vec<_>, _>>()?;

        if new_rsvps.is_empty() {
            return Ok(Vec::new());
        }

        let store = self.store.clone();
        let rsvps = crate::block(move || store.put_all(new_rsvps)).await??;

        Ok(rsvps)
    }

    pub async fn list_all(&self) -> Result<Vec<Rsvp>, RsvpError> {
        let store = self.store.clone();

        Ok(crate::block(move || store.list_all()).await??)
    }

    pub async fn get_confirmed(&self) -> Result<Vec<Rsvp>, RsvpError> {
        let store = self.store.clone();

        Ok(crate::block(move || store.filter_by_status(RsvpStatus::Yes)).await??)
    }

    pub async fn get_counts(&self) -> Result<RsvpCounts, RsvpError> {
        let store = self.store.clone();

        let counts = crate::block(move || -> database::Result<_> {
            Ok(RsvpCounts {
                total: store.count_all()?,
                confirmed: store.count_by_status(RsvpStatus::Yes)?,
                declined: store.count_by_status(RsvpStatus::No)?,
            })
        })
        .await??;

        Ok(counts)
    }

    pub async fn get_one(&self, id: String) -> Result<Rsvp, RsvpError> {
        let store = self.store.clone();

        crate::block(move || store.get(&id))
            .await??
            .ok_or(RsvpError::NotFound)
    }

    #[tracing::instrument(err, skip(self))]
    pub async fn delete_one(&self, id: String) -> Result<(), RsvpError> {
        let store = self.store.clone();

        if crate::block(move || store.delete(&id)).await?? {
            Ok(())
        } else {
            Err(RsvpError::NotFound)
        }
    }

    fn notify_detached(&self, rsvp: Rsvp) {
        let notifier = self.notifier.clone();
        let timeout = self.notification_timeout;

        tokio::spawn(
            async move {
                match tokio::time::timeout(timeout, notifier.notify(&rsvp)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        log::warn!("Failed to send notification for rsvp {}, {:?}", rsvp.id, e)
                    }
                    Err(_) => log::warn!(
                        "Notification for rsvp {} timed out after {:?}",
                        rsvp.id,
                        timeout
                    ),
                }
            }
            .instrument(tracing::Span::current()),
        );
    }
}

fn validate_entry(entry: RsvpEntry) -> Result<NewRsvp, RsvpError> {
    let RsvpEntry {
        id,
        name,
        email,
        status,
    } = entry;

    let status = parse_status(status.as_deref(), None)?;
    let email = check_email(email, None)?;
    let id = required(id, "id", None)?;
    let name = required(name, "name", None)?;

    Ok(NewRsvp {
        id,
        name,
        email,
        status,
    })
}

fn validate_bulk_entry(index: usize, entry: RsvpEntry) -> Result<NewRsvp, RsvpError> {
    let RsvpEntry {
        id,
        name,
        email,
        status,
    } = entry;

    let index = Some(index);

    let id = required(id, "id", index)?;
    let name = required(name, "name", index)?;
    let email = required(email, "email", index)?;
    let status = required(status, "status", index)?;

    let status = parse_status(Some(&status), index)?;
    let email = check_email(Some(email), index)?;

    Ok(NewRsvp {
        id,
        name,
        email,
        status,
    })
}

fn required(
    value: Option<String>,
    field: &'static str,
    index: Option<usize>,
) -> Result<String, RsvpError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(RsvpError::MissingField { index, field }),
    }
}

fn parse_status(status: Option<&str>, index: Option<usize>) -> Result<RsvpStatus, RsvpError> {
    status
        .and_then(|status| status.parse().ok())
        .ok_or(RsvpError::InvalidStatus { index })
}

fn check_email(email: Option<String>, index: Option<usize>) -> Result<String, RsvpError> {
    match email {
        Some(email) if email.contains('@') => Ok(email),
        _ => Err(RsvpError::InvalidEmail { index }),
    }
}
