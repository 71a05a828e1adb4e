// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Response types for REST APIv1
//!
//! These all implement the [`Responder`](actix_web::Responder) or
//! [`ResponseError`](actix_web::ResponseError) trait.
pub mod error;

pub use error::{json_error_handler, ApiError};

pub const CODE_INVALID_EMAIL: &str = "invalid_email";
pub const CODE_INVALID_LENGTH: &str = "invalid_length";
pub const CODE_INVALID_STATUS: &str = "invalid_status";
pub const CODE_INVALID_VALUE: &str = "invalid_value";
pub const CODE_MISSING_FIELD: &str = "missing_field";
