//! Newtype IDs and keys for type-safe entity references.
//!
//! Two flavors exist:
//!
//! - `define_id!` wraps an `i32` database key (users).
//! - `define_key!` wraps a validated, non-empty string key (products,
//!   variants, cart lines). These come from external systems or are generated
//!   by the cart, so they are opaque strings rather than integers.

use thiserror::Error;

/// Maximum length of a string key.
pub const MAX_KEY_LENGTH: usize = 128;

/// Product prefix length kept in generated line IDs (32 hex chars follow).
const LINE_PREFIX_LENGTH: usize = 64;

/// Errors that can occur when parsing a string key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The input is empty or only whitespace.
    #[error("key cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("key must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// Macro to define a type-safe integer ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i32()`
/// - `From<i32>` and `Into<i32>` implementations
///
/// # Example
///
/// ```rust
/// # use mercato_core::define_id;
/// define_id!(CustomerId);
/// define_id!(InvoiceId);
///
/// let customer_id = CustomerId::new(1);
/// let invoice_id = InvoiceId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: CustomerId = invoice_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Macro to define a validated string key wrapper.
///
/// Keys are trimmed on parse and must be non-empty and at most
/// [`MAX_KEY_LENGTH`] characters. Deserialization runs the same validation,
/// so a key read back from storage is as trustworthy as a freshly parsed one.
///
/// # Example
///
/// ```rust
/// # use mercato_core::define_key;
/// define_key!(CouponCode);
///
/// let code = CouponCode::parse(" SPRING ").unwrap();
/// assert_eq!(code.as_str(), "SPRING");
/// assert!(CouponCode::parse("   ").is_err());
/// ```
#[macro_export]
macro_rules! define_key {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse a key, trimming surrounding whitespace.
            ///
            /// # Errors
            ///
            /// Returns an error if the trimmed input is empty or too long.
            pub fn parse(s: &str) -> Result<Self, $crate::types::id::KeyError> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err($crate::types::id::KeyError::Empty);
                }
                if trimmed.chars().count() > $crate::types::id::MAX_KEY_LENGTH {
                    return Err($crate::types::id::KeyError::TooLong {
                        max: $crate::types::id::MAX_KEY_LENGTH,
                    });
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Returns the key as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the key and returns its inner string.
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
            type Err = $crate::types::id::KeyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let raw = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                Self::parse(&raw).map_err(::serde::de::Error::custom)
            }
        }
    };
}

define_id!(UserId);

define_key!(ProductId);
define_key!(VariantId);
define_key!(LineId);

impl LineId {
    /// Generate a fresh line ID for a product.
    ///
    /// The ID is `{product}_{discriminator}` where the discriminator is a
    /// time-ordered UUID v7, so two inserts of the same product never collide
    /// even within the same millisecond. The product prefix is cut to 64
    /// characters so the result stays a valid key.
    #[must_use]
    pub fn generate(product_id: &ProductId) -> Self {
        let prefix: String = product_id.as_str().chars().take(LINE_PREFIX_LENGTH).collect();
        Self(format!("{prefix}_{}", uuid::Uuid::now_v7().simple()))
    }
}
