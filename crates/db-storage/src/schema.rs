// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

diesel::table! {
    rsvps (id) {
        id -> Varchar,
        name -> Varchar,
        email -> Varchar,
        status -> Varchar,
    }
}
