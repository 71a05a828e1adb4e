// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Contains the database ORM and database migrations for the rsvp controller
//! Builds upon rsvp-database
//!
//! Records are accessed through the [`rsvps::RsvpStore`] trait, which is implemented for the
//! pooled [`database::Db`].

mod schema;

pub mod migrations;
pub mod rsvps;
