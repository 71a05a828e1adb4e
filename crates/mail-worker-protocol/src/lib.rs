// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Messages handed from the rsvp controller to the mail worker via RabbitMQ
use serde::Deserialize;
#[cfg(any(test, feature = "client"))]
use serde::Serialize;
pub mod v1;

/// Versioned Mail Task Protocol
#[derive(Deserialize, PartialEq, Eq, Debug)]
#[cfg_attr(any(test, feature = "client"), derive(Serialize))]
#[serde(tag = "version")]
pub enum MailTask {
    #[serde(rename = "1")]
    V1(v1::Message),
}

#[cfg(feature = "client")]
impl MailTask {
    /// Creates a MailTask notifying a participant about their saved rsvp
    pub fn rsvp_notification<E, S>(name: String, email: E, status: S) -> MailTask
    where
        E: Into<v1::Email>,
        S: Into<v1::RsvpStatus>,
    {
        Self::V1(v1::Message::RsvpNotification(v1::RsvpNotification {
            participant: v1::Participant {
                name,
                email: email.into(),
            },
            status: status.into(),
        }))
    }

    pub fn as_kind_str(&self) -> &'static str {
        match self {
            MailTask::V1(message) => match message {
                v1::Message::RsvpNotification(_) => "rsvp_notification",
            },
        }
    }
}

#[cfg(feature = "client")]
impl From<db_storage::rsvps::RsvpStatus> for v1::RsvpStatus {
    fn from(val: db_storage::rsvps::RsvpStatus) -> Self {
        use db_storage::rsvps::RsvpStatus;

        match val {
            RsvpStatus::Yes => Self::Yes,
            RsvpStatus::No => Self::No,
            RsvpStatus::Maybe => Self::Maybe,
        }
    }
}
