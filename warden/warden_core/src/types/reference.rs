//! References to entities.
//!
//! Callers name entities in three ways: by canonical identifier, by natural
//! key (an email or a name), or with a structured lookup that carries both.
//! A [`Reference`] only describes the request; turning it into an
//! identifier is the resolver's job.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{Error, Result};
use crate::id::ObjectId;
use crate::types::entity::Entity;
use crate::types::grant::WILDCARD;

/// A reference to an entity.
///
/// In JSON a reference is either a string or an object. Both directions go
/// through [`Reference::from_value`], so whatever a reference serializes to
/// reads back as an equivalent reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Reference {
    /// A canonical identifier.
    Id(ObjectId),

    /// A natural key.
    Key(String),

    /// A structured lookup with candidate keys.
    ///
    /// The identifier field takes precedence when it names an existing
    /// entity; otherwise the natural key is used.
    Lookup {
        /// Candidate identifier, as text.
        id: Option<String>,

        /// Candidate natural key.
        key: Option<String>,
    },
}

impl Reference {
    /// Parse a textual reference.
    ///
    /// UUID text becomes [`Reference::Id`], anything else a natural key.
    ///
    /// # Examples
    ///
    /// ```
    /// use warden_core::types::Reference;
    ///
    /// assert!(matches!(
    ///     Reference::parse("550e8400-e29b-41d4-a716-446655440000"),
    ///     Reference::Id(_)
    /// ));
    /// assert!(matches!(Reference::parse("admins"), Reference::Key(_)));
    /// ```
    pub fn parse(text: &str) -> Self {
        match text.parse::<ObjectId>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Key(text.to_string()),
        }
    }

    /// Build a reference from a JSON value.
    ///
    /// Strings are parsed with [`Reference::parse`]. Objects become a
    /// lookup, reading the identifier from `id` or `object_id` and the key
    /// from `key`, `email` or `name`.
    ///
    /// # Errors
    ///
    /// `Error::InvalidReference` for any other JSON shape, for non-string
    /// fields, and for objects that carry neither an identifier nor a key.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(text) => Ok(Self::parse(text)),
            Value::Object(map) => {
                let field = |names: &[&str]| -> Result<Option<String>> {
                    for name in names {
                        match map.get(*name) {
                            None | Some(Value::Null) => continue,
                            Some(Value::String(s)) => return Ok(Some(s.clone())),
                            Some(other) => {
                                return Err(Error::InvalidReference(format!(
                                    "field '{}' must be a string, got {}",
                                    name, other
                                )))
                            }
                        }
                    }
                    Ok(None)
                };

                let id = field(&["id", "object_id"])?;
                let key = field(&["key", "email", "name"])?;

                if id.is_none() && key.is_none() {
                    return Err(Error::InvalidReference(
                        "lookup carries neither an identifier nor a key".to_string(),
                    ));
                }

                Ok(Self::Lookup { id, key })
            }
            other => Err(Error::InvalidReference(format!(
                "unsupported reference shape: {}",
                other
            ))),
        }
    }

    /// Whether this reference is the wildcard `*`.
    ///
    /// Wildcards are only meaningful as privileges; grant validation uses
    /// this to reject them as objects before resolution.
    pub fn is_wildcard(&self) -> bool {
        let is_star = |s: &Option<String>| s.as_deref().map(str::trim) == Some(WILDCARD);
        match self {
            Self::Id(_) => false,
            Self::Key(key) => key.trim() == WILDCARD,
            Self::Lookup { id, key } => is_star(id) || is_star(key),
        }
    }
}

impl From<ObjectId> for Reference {
    fn from(id: ObjectId) -> Self {
        Self::Id(id)
    }
}

impl From<&Entity> for Reference {
    fn from(entity: &Entity) -> Self {
        Self::Id(entity.id)
    }
}

impl From<&str> for Reference {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<String> for Reference {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl TryFrom<Value> for Reference {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(&value)
    }
}

impl From<Reference> for Value {
    fn from(reference: Reference) -> Self {
        match reference {
            Reference::Id(id) => Value::String(id.to_string()),
            // Key text that looks like a UUID would read back as an id
            Reference::Key(key) if key.parse::<ObjectId>().is_ok() => {
                serde_json::json!({ "key": key })
            }
            Reference::Key(key) => Value::String(key),
            Reference::Lookup { id, key } => {
                let mut map = serde_json::Map::new();
                if let Some(id) = id {
                    map.insert("id".to_string(), Value::String(id));
                }
                if let Some(key) = key {
                    map.insert("key".to_string(), Value::String(key));
                }
                Value::Object(map)
            }
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Key(key) => write!(f, "{}", key),
            Self::Lookup { id, key } => write!(
                f,
                "{{id: {}, key: {}}}",
                id.as_deref().unwrap_or("-"),
                key.as_deref().unwrap_or("-")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse() {
        let id = ObjectId::new();
        assert_eq!(Reference::parse(&id.to_string()), Reference::Id(id));
        assert_eq!(
            Reference::parse("alice@example.com"),
            Reference::Key("alice@example.com".into())
        );
    }

    #[test]
    fn test_from_value_string() {
        let id = ObjectId::new();
        assert_eq!(
            Reference::from_value(&json!(id.to_string())).unwrap(),
            Reference::Id(id)
        );
        assert_eq!(
            Reference::from_value(&json!("editors")).unwrap(),
            Reference::Key("editors".into())
        );
    }

    #[test]
    fn test_from_value_object() {
        let reference =
            Reference::from_value(&json!({"object_id": "abc", "email": "a@b.c"})).unwrap();
        assert_eq!(
            reference,
            Reference::Lookup {
                id: Some("abc".into()),
                key: Some("a@b.c".into())
            }
        );

        let reference = Reference::from_value(&json!({"name": "admins", "id": null})).unwrap();
        assert_eq!(
            reference,
            Reference::Lookup {
                id: None,
                key: Some("admins".into())
            }
        );
    }

    #[test]
    fn test_from_value_invalid_shapes() {
        for value in [json!(42), json!(true), json!(null), json!(["a"]), json!({})] {
            assert!(matches!(
                Reference::from_value(&value),
                Err(Error::InvalidReference(_))
            ));
        }
        assert!(matches!(
            Reference::from_value(&json!({"id": 7})),
            Err(Error::InvalidReference(_))
        ));
    }

    #[test]
    fn test_deserialize_accepts_strings_and_lookups() {
        let reference: Reference = serde_json::from_str(r#""alice@example.com""#).unwrap();
        assert_eq!(reference, Reference::Key("alice@example.com".into()));

        let reference: Reference = serde_json::from_str(r#"{"email": "a@b.c"}"#).unwrap();
        assert_eq!(
            reference,
            Reference::Lookup {
                id: None,
                key: Some("a@b.c".into())
            }
        );

        assert!(serde_json::from_str::<Reference>("42").is_err());
        assert!(serde_json::from_str::<Reference>("{}").is_err());
    }

    #[test]
    fn test_serialized_form_reads_back() {
        let id = ObjectId::new();
        let references = [
            Reference::Id(id),
            Reference::Key("editors".into()),
            Reference::Lookup {
                id: Some("abc".into()),
                key: Some("a@b.c".into()),
            },
        ];
        for reference in references {
            let text = serde_json::to_string(&reference).unwrap();
            let back: Reference = serde_json::from_str(&text).unwrap();
            assert_eq!(back, reference);
        }

        assert_eq!(
            serde_json::to_value(Reference::Id(id)).unwrap(),
            json!(id.to_string())
        );
    }

    #[test]
    fn test_uuid_shaped_key_stays_a_key_lookup() {
        let text = ObjectId::new().to_string();
        let value = serde_json::to_value(Reference::Key(text.clone())).unwrap();
        assert_eq!(value, json!({ "key": text }));
        assert_eq!(
            Reference::from_value(&value).unwrap(),
            Reference::Lookup {
                id: None,
                key: Some(text)
            }
        );
    }

    #[test]
    fn test_wildcard() {
        assert!(Reference::parse("*").is_wildcard());
        assert!(Reference::parse(" * ").is_wildcard());
        assert!(Reference::Lookup {
            id: Some("*".into()),
            key: None
        }
        .is_wildcard());
        assert!(!Reference::parse("admins").is_wildcard());
        assert!(!Reference::Id(ObjectId::universal()).is_wildcard());
    }
}
