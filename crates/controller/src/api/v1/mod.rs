// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! REST API v1
//!
//! Served below `/api`. Current Endpoints. See their respective function:
//! - `/rsvp` ([GET](rsvps::get_all), [POST](rsvps::post))
//! - `/rsvp/bulk` ([POST](rsvps::post_bulk))
//! - `/rsvp/confirmed` ([GET](rsvps::get_confirmed))
//! - `/rsvp/counts` ([GET](rsvps::get_counts))
//! - `/rsvp/{id}` ([GET](rsvps::get), [DELETE](rsvps::delete))

pub mod response;
pub mod rsvps;
