// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use serde::Deserialize;
use serde::Serialize;

mod rsvps;

pub use rsvps::{Participant, RsvpNotification, RsvpStatus};

#[derive(Deserialize, Serialize, PartialEq, Eq, Debug)]
pub struct Email(String);

impl Email {
    pub fn new(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Email {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Email {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The different kinds of MailTasks that are currently supported
#[derive(Deserialize, PartialEq, Eq, Debug)]
#[cfg_attr(any(test, feature = "client"), derive(Serialize))]
#[serde(tag = "message", rename_all = "snake_case")]
pub enum Message {
    /// A mail sent to a participant after their rsvp was saved
    RsvpNotification(RsvpNotification),
}
