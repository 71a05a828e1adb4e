// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Shared types for the rsvp controller crates.
//! Keeps the settings out of the controller core so the storage crates can use them.

pub mod settings;
