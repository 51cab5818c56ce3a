//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create validated string ID wrappers that
//! prevent accidentally mixing IDs from different entity types.

use thiserror::Error;

/// Errors that can occur when parsing an ID.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The input string is empty (after trimming).
    #[error("{kind} cannot be empty")]
    Empty {
        /// The kind of ID being parsed.
        kind: &'static str,
    },
    /// The input string is shorter than allowed.
    #[error("{kind} must be at least {min} characters")]
    TooShort {
        /// The kind of ID being parsed.
        kind: &'static str,
        /// Minimum allowed length.
        min: usize,
    },
    /// The input string is longer than allowed.
    #[error("{kind} must be at most {max} characters")]
    TooLong {
        /// The kind of ID being parsed.
        kind: &'static str,
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside the allowed set.
    #[error("{kind} contains invalid character {found:?}")]
    InvalidCharacter {
        /// The kind of ID being parsed.
        kind: &'static str,
        /// The offending character.
        found: char,
    },
}

/// Macro to define a validated string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` as a plain string, validated on deserialize
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `parse()`, `as_str()`, `into_inner()`
/// - `Display`, `FromStr`, `AsRef<str>` and `TryFrom<String>` implementations
///
/// The second argument is a `fn(&str) -> Result<String, IdError>` that
/// validates the raw input and returns the normalized value.
///
/// # Example
///
/// ```rust
/// # use verdant_core::{define_id, IdError};
/// fn any_non_empty(s: &str) -> Result<String, IdError> {
///     if s.is_empty() {
///         return Err(IdError::Empty { kind: "sku" });
///     }
///     Ok(s.to_owned())
/// }
///
/// define_id!(Sku, any_non_empty);
///
/// let sku = Sku::parse("fern-001").unwrap();
/// assert_eq!(sku.as_str(), "fern-001");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident, $validate:path) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse and validate an ID from a string.
            ///
            /// # Errors
            ///
            /// Returns an `IdError` if the input fails validation.
            pub fn parse(s: &str) -> ::core::result::Result<Self, $crate::IdError> {
                $validate(s).map(Self)
            }

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the ID and returns its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl ::core::convert::TryFrom<String> for $name {
            type Error = $crate::IdError;

            fn try_from(s: String) -> ::core::result::Result<Self, Self::Error> {
                Self::parse(&s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// =============================================================================
// Product IDs
// =============================================================================

/// Maximum length of a product ID.
pub const PRODUCT_ID_MAX_LENGTH: usize = 128;

fn validate_product_id(s: &str) -> Result<String, IdError> {
    const KIND: &str = "product id";

    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(IdError::Empty { kind: KIND });
    }
    if trimmed.chars().count() > PRODUCT_ID_MAX_LENGTH {
        return Err(IdError::TooLong {
            kind: KIND,
            max: PRODUCT_ID_MAX_LENGTH,
        });
    }
    if let Some(found) = trimmed.chars().find(|c| c.is_control()) {
        return Err(IdError::InvalidCharacter { kind: KIND, found });
    }
    Ok(trimmed.to_owned())
}

define_id!(ProductId, validate_product_id);

// =============================================================================
// Session IDs
// =============================================================================

/// Minimum length of a session identifier.
pub const SESSION_ID_MIN_LENGTH: usize = 8;

/// Maximum length of a session identifier.
pub const SESSION_ID_MAX_LENGTH: usize = 128;

/// Session token used for requests that carry no session of their own.
const ANONYMOUS_SESSION: &str = "anonymous";

fn validate_session_id(s: &str) -> Result<String, IdError> {
    const KIND: &str = "session id";

    if s.is_empty() {
        return Err(IdError::Empty { kind: KIND });
    }
    if let Some(found) = s
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(IdError::InvalidCharacter { kind: KIND, found });
    }
    // Only ASCII remains, so byte length equals character count.
    if s.len() < SESSION_ID_MIN_LENGTH {
        return Err(IdError::TooShort {
            kind: KIND,
            min: SESSION_ID_MIN_LENGTH,
        });
    }
    if s.len() > SESSION_ID_MAX_LENGTH {
        return Err(IdError::TooLong {
            kind: KIND,
            max: SESSION_ID_MAX_LENGTH,
        });
    }
    Ok(s.to_owned())
}

define_id!(SessionId, validate_session_id);

impl SessionId {
    /// The shared session used when a request does not identify one.
    #[must_use]
    pub fn anonymous() -> Self {
        Self(ANONYMOUS_SESSION.to_owned())
    }

    /// Returns true if this is the shared anonymous session.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS_SESSION
    }
}
