// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use super::Email;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, PartialEq, Eq, Debug, Clone, Copy)]
pub enum RsvpStatus {
    Yes,
    No,
    Maybe,
}

#[derive(Deserialize, Serialize, PartialEq, Eq, Debug)]
pub struct Participant {
    pub name: String,
    pub email: Email,
}

#[derive(Deserialize, Serialize, PartialEq, Eq, Debug)]
pub struct RsvpNotification {
    pub participant: Participant,
    pub status: RsvpStatus,
}
