// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Error response types for REST APIv1
use super::{
    CODE_INVALID_EMAIL, CODE_INVALID_LENGTH, CODE_INVALID_STATUS, CODE_INVALID_VALUE,
    CODE_MISSING_FIELD,
};
use crate::services::RsvpError;
use actix_web::error::JsonPayloadError;
use actix_web::http::header::{self, HeaderValue};
use actix_web::http::StatusCode;
use actix_web::HttpRequest;
use actix_web::{body::BoxBody, HttpResponse, ResponseError};
use itertools::Itertools;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use validator::ValidationErrors;

/// Error handler for the actix JSON extractor
///
/// Gets called when a incoming request results in an [`JsonPayloadError`].
/// Returns a `Bad Request` [`ApiError`] error with an appropriate error code and message.
pub fn json_error_handler(err: JsonPayloadError, _: &HttpRequest) -> actix_web::error::Error {
    let error_code = match err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            "payload_overflow"
        }
        JsonPayloadError::ContentType => "invalid_content_type",
        JsonPayloadError::Deserialize(_) | JsonPayloadError::Serialize(_) => "invalid_json",
        _ => "invalid_payload",
    };
    ApiError::bad_request()
        .with_code(error_code)
        .with_message(err.to_string())
        .into()
}

#[derive(Debug, Serialize)]
struct StandardErrorBody {
    // Human readable message
    error: Cow<'static, str>,
    // Machine readable error code
    code: Cow<'static, str>,
}

#[derive(Debug, Serialize)]
pub struct ValidationErrorEntry {
    /// The field related to the error
    /// It's a struct level error when no field is set
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<Cow<'static, str>>,
    /// Machine readable error message
    code: Cow<'static, str>,
    /// Human readable error message
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<Cow<'static, str>>,
}

#[derive(Debug, Serialize)]
struct ValidationErrorBody {
    // Human readable message
    error: Cow<'static, str>,
    /// Machine readable error message
    code: Cow<'static, str>,
    // A list validation errors
    errors: Vec<ValidationErrorEntry>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ErrorBody {
    /// The standard error body
    Standard(StandardErrorBody),
    /// Special error body for validation errors
    Validation(ValidationErrorBody),
}

/// The default REST API error
///
/// Can be build via the associated functions to represent various HTTP errors. Each
/// HTTP error has their default error code and message that get send in a JSON body.
/// The error code and message can be overwritten when creating an error.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new_standard<T>(status: StatusCode, code: T, message: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        Self {
            status,
            body: ErrorBody::Standard(StandardErrorBody {
                error: message.into(),
                code: code.into(),
            }),
        }
    }

    /// Override the default code for an error
    pub fn with_code<T>(mut self, code: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        match &mut self.body {
            ErrorBody::Standard(std) => std.code = code.into(),
            ErrorBody::Validation(val) => val.code = code.into(),
        }

        self
    }

    /// Override the default message for an error
    pub fn with_message<T>(mut self, message: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        match &mut self.body {
            ErrorBody::Standard(std) => std.error = message.into(),
            ErrorBody::Validation(val) => val.error = message.into(),
        }

        self
    }

    /// Create a new 400 Bad Request error
    pub fn bad_request() -> Self {
        Self::new_standard(
            StatusCode::BAD_REQUEST,
            "bad_request",
            "Invalid request due to malformed syntax",
        )
    }

    /// Create a new 404 Not Found error
    pub fn not_found() -> Self {
        Self::new_standard(
            StatusCode::NOT_FOUND,
            "not_found",
            "A requested resource could not be found",
        )
    }

    /// Create a new 400 Bad Request error with a list of invalid fields
    ///
    /// This error is normally created from [`ValidationErrors`] from the validator crate.
    pub fn invalid_fields<T, I>(errors: I) -> Self
    where
        T: Into<ValidationErrorEntry>,
        I: IntoIterator<Item = T>,
    {
        let errors = errors.into_iter().map(|entry| entry.into()).collect();

        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody::Validation(ValidationErrorBody {
                error: "Some provided values are invalid".into(),
                code: "validation_failed".into(),
                errors,
            }),
        }
    }

    /// Create a new 500 Internal Server Error
    pub fn internal() -> Self {
        Self::new_standard(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_server_error",
            "An internal server error occurred",
        )
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            ErrorBody::Standard(StandardErrorBody { error, code }) => {
                write!(f, "status={}, code={}, error={}", self.status, code, error)
            }
            ErrorBody::Validation(ValidationErrorBody {
                error,
                code,
                errors,
            }) => {
                write!(
                    f,
                    "status={}, code={}, error={}, errors={}",
                    self.status,
                    code,
                    error,
                    serde_json::to_string(errors)
                        .unwrap_or_else(|_| "unserializable errors".to_string())
                )
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let mut response = HttpResponse::new(self.status_code());

        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        match serde_json::to_string(&self.body) {
            Ok(body) => response.set_body(BoxBody::new(body)),
            Err(e) => {
                log::error!("Unable to serialize API error body, {}", e);
                HttpResponse::InternalServerError().finish()
            }
        }
    }
}

impl From<RsvpError> for ApiError {
    fn from(e: RsvpError) -> Self {
        let code = match &e {
            RsvpError::InvalidStatus { .. } => CODE_INVALID_STATUS,
            RsvpError::InvalidEmail { .. } => CODE_INVALID_EMAIL,
            RsvpError::MissingField { .. } => CODE_MISSING_FIELD,
            RsvpError::NotFound => return Self::not_found().with_message(e.to_string()),
            RsvpError::Database(_) | RsvpError::Blocking(_) => {
                log::error!("REST API threw internal error from rsvp service: {}", e);
                return Self::internal();
            }
        };

        Self::bad_request()
            .with_code(code)
            .with_message(e.to_string())
    }
}

impl From<ValidationErrors> for ApiError {
    /// Creates a 400 Bad Request response from the [`ValidationErrors`]
    ///
    /// Note:
    ///
    /// Each validation error is mapped to a field. Errors inside of lists (e.g. the entries of a bulk
    /// request) are reported once per list with the offending indexes in the message.
    fn from(validation_errors: ValidationErrors) -> Self {
        let mut entries = Vec::with_capacity(validation_errors.errors().len());

        collect_validation_errors(validation_errors, &mut entries);

        Self::invalid_fields(entries)
    }
}

/// Convert [`ValidationErrors`] into multiple [`ValidationErrorEntries`](ValidationErrorEntry) and collect them in `entries`
fn collect_validation_errors(
    validation_errors: ValidationErrors,
    entries: &mut Vec<ValidationErrorEntry>,
) {
    let errors = validation_errors.into_errors();

    for (field, error_kind) in errors {
        let field = match field {
            "__all__" => None,
            field => Some(field.into()),
        };

        match error_kind {
            validator::ValidationErrorsKind::Field(v) => {
                for error in v {
                    let code = convert_validation_code(&error.code);

                    entries.push(ValidationErrorEntry {
                        field: field.clone(),
                        code: Cow::Borrowed(code),
                        message: error.message,
                    });
                }
            }
            validator::ValidationErrorsKind::Struct(inner_errors) => {
                // Assume all fields were flattened when we encounter a struct level validation error
                collect_validation_errors(*inner_errors, entries);
            }
            validator::ValidationErrorsKind::List(list) => {
                let invalid_indexes = list.keys().take(15).join(", ");

                let message = format!("Invalid values at index {invalid_indexes}");

                entries.push(ValidationErrorEntry {
                    field,
                    code: "invalid_values".into(),
                    message: Some(Cow::Owned(message)),
                })
            }
        };
    }
}

fn convert_validation_code(code: &str) -> &'static str {
    match code {
        "length" => CODE_INVALID_LENGTH,
        _ => CODE_INVALID_VALUE,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use database::DatabaseError;
    use pretty_assertions::assert_eq;
    use test_util::assert_eq_json;
    use validator::Validate;

    #[derive(Debug, Validate)]
    struct ValidationTester {
        #[validate(length(max = 5))]
        name: String,
        #[validate(contains = "@")]
        email: String,
        #[validate]
        entries: Vec<InnerValidationTester>,
    }

    #[derive(Debug, Validate)]
    struct InnerValidationTester {
        #[validate(length(max = 2))]
        id: String,
    }

    #[test]
    fn api_validation_error() {
        let tester = ValidationTester {
            name: "looong".into(),
            email: "nobody".into(),
            entries: vec![
                InnerValidationTester { id: "ok".into() },
                InnerValidationTester { id: "too long".into() },
            ],
        };

        let mut api_error = match tester.validate() {
            Ok(_) => panic!("Validation should fail"),
            Err(err) => ApiError::from(err),
        };

        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);

        match &mut api_error.body {
            ErrorBody::Standard(_) => panic!("Expected validation error body"),
            ErrorBody::Validation(val) => val.errors.sort_by(|a, b| a.field.cmp(&b.field)),
        }

        assert_eq_json!(
            api_error.body,
            {
                "error": "Some provided values are invalid",
                "code": "validation_failed",
                "errors": [
                  {
                    "field": "email",
                    "code": "invalid_value"
                  },
                  {
                    "field": "entries",
                    "code": "invalid_values",
                    "message": "Invalid values at index 1"
                  },
                  {
                    "field": "name",
                    "code": "invalid_length"
                  }
                ]
            }
        );
    }

    #[test]
    fn api_error_with_code() {
        let error = ApiError::not_found().with_code("custom_code");

        assert_eq_json!(
            error.body,
            {
                "error": "A requested resource could not be found",
                "code": "custom_code"
            }
        );
    }

    #[test]
    fn rsvp_errors() {
        let error = ApiError::from(RsvpError::MissingField {
            index: Some(2),
            field: "email",
        });

        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq_json!(
            error.body,
            {
                "error": "Missing required field `email` in entry 2.",
                "code": "missing_field"
            }
        );

        let error = ApiError::from(RsvpError::NotFound);

        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert_eq_json!(
            error.body,
            {
                "error": "Player not found.",
                "code": "not_found"
            }
        );
    }

    #[test]
    fn database_errors_are_not_leaked() {
        let error = ApiError::from(RsvpError::Database(DatabaseError::custom(
            "password authentication failed for user postgres",
        )));

        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq_json!(
            error.body,
            {
                "error": "An internal server error occurred",
                "code": "internal_server_error"
            }
        );
    }
}
