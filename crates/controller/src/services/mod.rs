// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Long Running Services that expose clean APIs and hide implementation details from endpoints
mod mail;
mod notifications;
mod rsvps;

pub use mail::MailService;
pub use notifications::NotificationSink;
pub use rsvps::{RsvpCounts, RsvpEntry, RsvpError, RsvpService};
