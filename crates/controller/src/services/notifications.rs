// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use anyhow::Result;
use async_trait::async_trait;
use db_storage::rsvps::Rsvp;

/// Receiver of best-effort notifications about saved rsvps
///
/// Errors returned here are logged by the caller and never reach the client.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, rsvp: &Rsvp) -> Result<()>;
}
