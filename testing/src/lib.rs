//! # todolist testing
//!
//! Testing utilities shared by the todolist crates.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given-When-Then harness for reducers, with the
//!   effect [`assertions`] that go with it
//! - [`properties`]: proptest strategies for todo text
//!
//! ## Example
//!
//! ```ignore
//! use todolist_testing::properties::valid_text;
//!
//! proptest! {
//!     #[test]
//!     fn accepted_text_is_trimmed(raw in valid_text()) {
//!         prop_assert_eq!(TodoText::parse(&raw)?.as_str(), raw.trim());
//!     }
//! }
//! ```


/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;
    use todolist_core::todo::MAX_TEXT_CHARS;

    /// Raw input that [`TodoText::parse`](todolist_core::todo::TodoText::parse)
    /// accepts: a non-blank body with optional surrounding whitespace.
    pub fn valid_text() -> impl Strategy<Value = String> {
        ("[ \t]{0,4}", "[a-zA-Z0-9][a-zA-Z0-9 ,.!?-]{0,120}", "[ \t\n]{0,4}")
            .prop_map(|(left, body, right)| format!("{left}{body}{right}"))
    }

    /// Whitespace-only input, including the empty string.
    pub fn blank_text() -> impl Strategy<Value = String> {
        "[ \t\n\r]{0,16}"
    }

    /// Input that is too long even after trimming.
    pub fn overlong_text() -> impl Strategy<Value = String> {
        (1usize..64).prop_map(|extra| "a".repeat(MAX_TEXT_CHARS + extra))
    }
}

pub use reducer_test::{ReducerTest, assertions};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::properties::{blank_text, overlong_text, valid_text};
    use proptest::prelude::*;
    use todolist_core::todo::{TodoText, ValidationError};

    proptest! {
        #[test]
        fn valid_text_strategy_always_parses(raw in valid_text()) {
            prop_assert!(TodoText::parse(&raw).is_ok());
        }

        #[test]
        fn blank_text_strategy_never_parses(raw in blank_text()) {
            prop_assert_eq!(TodoText::parse(&raw), Err(ValidationError::MissingText));
        }

        #[test]
        fn overlong_text_strategy_never_parses(raw in overlong_text()) {
            let rejected = matches!(
                TodoText::parse(&raw),
                Err(ValidationError::TextTooLong { .. })
            );
            prop_assert!(rejected);
        }
    }
}
