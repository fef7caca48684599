//! Shape validation for kit lists read from storage or an import file.
//!
//! Each record is checked on its own and turned into a typed
//! `Result<Kit, Rejection>` before anything touches the catalog. Rules:
//!
//! - `id`: non-empty string (a number is accepted and stringified)
//! - `name`: non-empty string
//! - `reagents`: non-empty array; each entry an object with a string `name`;
//!   `volumePerReaction` goes through [`crate::calc::coerce_number`]
//! - `protocol` / `notes`: optional strings
//!
//! Volumes are not checked for positivity here; that rule belongs to saving.
use serde_json::Value;

use crate::calc::coerce_number;
use crate::kit::{Kit, KitId, Reagent};
use crate::{KitError, Result};

/// Why a record was left out.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Rejection {
    NotAnObject,
    MissingId,
    MissingName,
    MissingReagents,
    NoReagents,
    /// The reagent at this index is not an object with a string name.
    MalformedReagent(usize),
}

impl core::fmt::Display for Rejection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Rejection::NotAnObject => f.write_str("record is not an object"),
            Rejection::MissingId => f.write_str("missing id"),
            Rejection::MissingName => f.write_str("missing name"),
            Rejection::MissingReagents => f.write_str("reagents is not a list"),
            Rejection::NoReagents => f.write_str("reagent list is empty"),
            Rejection::MalformedReagent(i) => write!(f, "reagent #{} is malformed", i + 1),
        }
    }
}

/// Parse `raw` as a JSON array of kit records.
///
/// Fails as a whole only when the text is not JSON ([`KitError::ImportParse`]) or
/// the top level is not an array ([`KitError::ImportFormat`]).
pub fn parse_kit_list(raw: &str) -> Result<Vec<std::result::Result<Kit, Rejection>>> {
    let value: Value = serde_json::from_str(raw).map_err(KitError::ImportParse)?;
    let Value::Array(items) = value else {
        return Err(KitError::ImportFormat);
    };
    Ok(items.iter().map(validate_record).collect())
}

/// Validate a single record.
pub fn validate_record(v: &Value) -> std::result::Result<Kit, Rejection> {
    let obj = v.as_object().ok_or(Rejection::NotAnObject)?;
    let id = match obj.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(Rejection::MissingId),
    };
    let name = match obj.get("name") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => return Err(Rejection::MissingName),
    };
    let entries = obj.get("reagents").and_then(Value::as_array).ok_or(Rejection::MissingReagents)?;
    if entries.is_empty() {
        return Err(Rejection::NoReagents);
    }
    let reagents = entries
        .iter()
        .enumerate()
        .map(|(i, r)| reagent(r).ok_or(Rejection::MalformedReagent(i)))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(Kit {
        id: KitId(id),
        name,
        reagents,
        protocol: text_field(obj.get("protocol")),
        notes: text_field(obj.get("notes")),
    })
}

fn reagent(v: &Value) -> Option<Reagent> {
    let name = v.get("name")?.as_str()?;
    let volume = match v.get("volumePerReaction") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => coerce_number(s),
        _ => 0.0,
    };
    Some(Reagent::new(name, volume))
}

fn text_field(v: Option<&Value>) -> String {
    v.and_then(Value::as_str).unwrap_or_default().to_string()
}

#[cfg(test)]
mod schema_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_complete_record() {
        let k = validate_record(&json!({
            "id": "kit-1", "name": "K",
            "reagents": [{"name": "A", "volumePerReaction": 2.5}],
            "protocol": "65°C 5 min"
        })).unwrap();
        assert_eq!(k.id.as_str(), "kit-1");
        assert_eq!(k.reagents[0].volume_per_reaction, 2.5);
        assert_eq!(k.protocol, "65°C 5 min");
        assert!(k.notes.is_empty());
    }

    #[test]
    fn rejects_missing_fields() {
        let r = |v: Value| validate_record(&v).unwrap_err();
        assert_eq!(r(json!({"name": "K", "reagents": [{"name": "A"}]})), Rejection::MissingId);
        assert_eq!(r(json!({"id": "", "name": "K", "reagents": [{"name": "A"}]})), Rejection::MissingId);
        assert_eq!(r(json!({"id": "x", "reagents": [{"name": "A"}]})), Rejection::MissingName);
        assert_eq!(r(json!({"id": "x", "name": "K", "reagents": "A"})), Rejection::MissingReagents);
        assert_eq!(r(json!({"id": "x", "name": "K", "reagents": []})), Rejection::NoReagents);
        assert_eq!(r(json!({"id": "x", "name": "K", "reagents": [{"name": "A"}, 3]})), Rejection::MalformedReagent(1));
        assert_eq!(r(json!("kit")), Rejection::NotAnObject);
    }

    #[test]
    fn numeric_ids_and_string_volumes_are_coerced() {
        let k = validate_record(&json!({
            "id": 42, "name": "K",
            "reagents": [{"name": "A", "volumePerReaction": "1.5"}, {"name": "B", "volumePerReaction": "?"}]
        })).unwrap();
        assert_eq!(k.id.as_str(), "42");
        assert_eq!(k.reagents[0].volume_per_reaction, 1.5);
        assert_eq!(k.reagents[1].volume_per_reaction, 0.0);
    }

    #[test]
    fn top_level_errors() {
        assert!(matches!(parse_kit_list("{not json"), Err(KitError::ImportParse(_))));
        assert!(matches!(parse_kit_list(r#"{"id":"x"}"#), Err(KitError::ImportFormat)));
        assert_eq!(parse_kit_list("[]").unwrap().len(), 0);
    }
}
