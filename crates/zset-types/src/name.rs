use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

macro_rules! text_name {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create from text, rejecting the empty string.
            pub fn new(text: impl Into<String>) -> Result<Self, TypeError> {
                let text = text.into();
                if text.is_empty() {
                    return Err(TypeError::Empty { kind: $kind });
                }
                Ok(Self(text))
            }

            /// The text form, as carried in URLs and response headers.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn as_bytes(&self) -> &[u8] {
                self.0.as_bytes()
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeError;

            fn try_from(text: String) -> Result<Self, Self::Error> {
                Self::new(text)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeError;

            fn try_from(text: &str) -> Result<Self, Self::Error> {
                Self::new(text)
            }
        }

        impl From<$name> for String {
            fn from(name: $name) -> String {
                name.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

text_name!(
    /// Top-level identifier addressing one bucket.
    ///
    /// Keys are opaque non-empty text compared byte for byte.
    Key,
    "key"
);

text_name!(
    /// Identifier of a record within a bucket.
    ///
    /// Fields are opaque non-empty text; where an order is needed it is
    /// lexicographic over the bytes.
    Field,
    "field"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_rejected() {
        let err = Key::new("").unwrap_err();
        assert_eq!(err, TypeError::Empty { kind: "key" });
        assert_eq!(err.to_string(), "key must not be empty");
    }

    #[test]
    fn empty_field_is_rejected() {
        assert_eq!(
            "".parse::<Field>().unwrap_err(),
            TypeError::Empty { kind: "field" }
        );
    }

    #[test]
    fn display_is_raw_text() {
        let key = Key::new("users:42").unwrap();
        assert_eq!(key.to_string(), "users:42");
        assert_eq!(format!("{key:?}"), "Key(\"users:42\")");
    }

    #[test]
    fn fields_order_lexicographically() {
        let a = Field::new("a").unwrap();
        let b = Field::new("b").unwrap();
        let aa = Field::new("aa").unwrap();
        assert!(a < aa);
        assert!(aa < b);
    }

    #[test]
    fn serde_is_a_plain_string() {
        let field = Field::new("F").unwrap();
        assert_eq!(serde_json::to_string(&field).unwrap(), "\"F\"");
        let parsed: Field = serde_json::from_str("\"F\"").unwrap();
        assert_eq!(parsed, field);
    }

    #[test]
    fn serde_rejects_empty_text() {
        assert!(serde_json::from_str::<Key>("\"\"").is_err());
    }
}
