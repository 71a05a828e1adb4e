// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! MailService
//!
//! Hands mails about saved rsvps to the external mail worker.
use super::NotificationSink;
use anyhow::{Context, Result};
use async_trait::async_trait;
use controller_shared::settings::SharedSettings;
use db_storage::rsvps::Rsvp;
use mail_worker_proto::MailTask;
use std::sync::Arc;

#[derive(Clone)]
pub struct MailService {
    settings: SharedSettings,
    rabbit_mq_channel: Option<Arc<lapin::Channel>>,
}

impl MailService {
    /// Creates a new MailService
    ///
    /// Without a channel every mail task is dropped.
    pub fn new(settings: SharedSettings, rabbit_mq_channel: Option<Arc<lapin::Channel>>) -> Self {
        Self {
            settings,
            rabbit_mq_channel,
        }
    }

    async fn send_to_rabbitmq(&self, mail_task: MailTask) -> Result<()> {
        let queue_name = self
            .settings
            .load()
            .rabbit_mq
            .as_ref()
            .and_then(|rabbit_mq| rabbit_mq.mail_task_queue.clone());

        match (&self.rabbit_mq_channel, queue_name) {
            (Some(channel), Some(queue_name)) => {
                channel
                    .basic_publish(
                        "",
                        &queue_name,
                        Default::default(),
                        &serde_json::to_vec(&mail_task).context("Failed to serialize mail_task")?,
                        Default::default(),
                    )
                    .await?;

                log::debug!(
                    "Published {} mail task to {}",
                    mail_task.as_kind_str(),
                    queue_name
                );
            }
            _ => {
                log::debug!(
                    "No mail task queue configured, dropping {} mail task",
                    mail_task.as_kind_str()
                );
            }
        }

        Ok(())
    }

    /// Sends a rsvp notification mail task to the rabbit mq queue, if configured.
    pub async fn send_rsvp_notification(&self, rsvp: &Rsvp) -> Result<()> {
        let mail_task =
            MailTask::rsvp_notification(rsvp.name.clone(), rsvp.email.as_str(), rsvp.status);

        self.send_to_rabbitmq(mail_task).await
    }
}

#[async_trait]
impl NotificationSink for MailService {
    async fn notify(&self, rsvp: &Rsvp) -> Result<()> {
        self.send_rsvp_notification(rsvp).await
    }
}
