// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Test utility functions for use with the rsvp controller and its storage
pub use ::serde_json;
pub use pretty_assertions::assert_eq;

pub mod memory;

pub use memory::MemoryRsvpStore;

#[cfg(feature = "database")]
pub mod database;

/// Helper macro to compare a `[Serialize]` implementor with a JSON literal
///
/// Asserts that the left expression equals the right JSON literal when serialized.
///
/// # Examples
///
/// ```
/// use rsvp_test_util::assert_eq_json;
///
/// let counts = rsvp_test_util::serde_json::json!({ "total": 4, "confirmed": 2 });
///
/// assert_eq_json!(
///     counts,
///     {
///         "total": 4,
///         "confirmed": 2,
///     }
/// );
/// ```
#[macro_export]
macro_rules! assert_eq_json {
    ($val:expr,$($json:tt)+) => {
        let val: $crate::serde_json::Value = $crate::serde_json::to_value(&$val).expect("Expected value to be serializable");

        $crate::assert_eq!(val, $crate::serde_json::json!($($json)+));
    };
}
