//! Declarative model descriptors: table name, mass-assignable columns,
//! hidden fields and casts, plus the helpers that enforce them.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use time::{
    format_description::{well_known::Rfc3339, FormatItem},
    macros::format_description,
    OffsetDateTime, PrimitiveDateTime,
};
use tracing::debug;

const NAIVE_FRACTIONAL: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
const NAIVE: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("attribute `{field}` must be {expected}")]
    InvalidAttribute {
        field: &'static str,
        expected: &'static str,
    },
    #[error("cannot cast `{field}`: {message}")]
    Cast { field: String, message: String },
    #[error("attributes must be a JSON object")]
    NotAnObject,
    #[error(transparent)]
    Hydrate(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
}

impl ColumnKind {
    fn check(self, field: &'static str, value: &Value) -> Result<(), ModelError> {
        let ok = match (self, value) {
            (_, Value::Null) => true,
            (ColumnKind::Text, Value::String(_)) => true,
            (ColumnKind::Integer, Value::Number(n)) => n
                .as_i64()
                .map(|v| i32::try_from(v).is_ok())
                .unwrap_or(false),
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(ModelError::InvalidAttribute {
                field,
                expected: self.expected(),
            })
        }
    }

    fn expected(self) -> &'static str {
        match self {
            ColumnKind::Text => "a string or null",
            ColumnKind::Integer => "a 32-bit integer or null",
        }
    }
}

/// A column that may be set through mass assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Text,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Integer,
        }
    }
}

/// Conversion applied when a raw stored value is materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cast {
    DateTime,
}

impl Cast {
    /// Normalizes `raw` into the canonical representation for this cast.
    ///
    /// `DateTime` yields an RFC 3339 string. Offset-less inputs are read as UTC.
    pub fn apply(self, field: &str, raw: &Value) -> Result<Value, ModelError> {
        match self {
            Cast::DateTime => {
                let parsed = match raw {
                    Value::Null => return Ok(Value::Null),
                    Value::String(s) => parse_datetime(s),
                    Value::Number(n) => n
                        .as_i64()
                        .ok_or_else(|| "unix timestamp must be an integer".to_string())
                        .and_then(|secs| {
                            OffsetDateTime::from_unix_timestamp(secs).map_err(|e| e.to_string())
                        }),
                    other => Err(format!("unsupported value {other}")),
                };
                let dt = parsed.map_err(|message| ModelError::Cast {
                    field: field.to_string(),
                    message,
                })?;
                let formatted = dt.format(&Rfc3339).map_err(|e| ModelError::Cast {
                    field: field.to_string(),
                    message: e.to_string(),
                })?;
                Ok(Value::String(formatted))
            }
        }
    }
}

fn parse_datetime(raw: &str) -> Result<OffsetDateTime, String> {
    // "2024-05-01 10:00:00" and "2024-05-01T10:00:00" are both common in stored rows
    let mut normalized = raw.trim().replacen(' ', "T", 1);
    if has_hour_only_offset(&normalized) {
        normalized.push_str(":00");
    }
    if let Ok(dt) = OffsetDateTime::parse(&normalized, &Rfc3339) {
        return Ok(dt);
    }
    PrimitiveDateTime::parse(&normalized, NAIVE_FRACTIONAL)
        .or_else(|_| PrimitiveDateTime::parse(&normalized, NAIVE))
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|e| format!("`{raw}` is not a date-time: {e}"))
}

/// PostgreSQL prints whole-hour offsets as `+00` / `-05`.
fn has_hour_only_offset(value: &str) -> bool {
    let Some((_, time)) = value.split_once('T') else {
        return false;
    };
    match time.rfind(|c| c == '+' || c == '-') {
        Some(at) => {
            let offset = &time[at + 1..];
            offset.len() == 2 && offset.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Shape and constraints of a persisted record.
pub trait Model: Serialize + DeserializeOwned {
    const TABLE: &'static str;
    /// Columns settable from untrusted input.
    const FILLABLE: &'static [Column];
    /// Keys omitted from external representations.
    const HIDDEN: &'static [&'static str];
    const CASTS: &'static [(&'static str, Cast)];
}

/// Mass-assignment input after allow-list filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    values: Vec<(&'static Column, Value)>,
}

impl Attributes {
    /// Keeps the keys of `input` that `M` declares fillable and drops the rest.
    pub fn fill<M: Model>(input: &Map<String, Value>) -> Result<Self, ModelError> {
        let mut values = Vec::with_capacity(input.len());
        for (key, value) in input {
            let Some(column) = M::FILLABLE.iter().find(|c| c.name == key.as_str()) else {
                debug!(table = M::TABLE, field = %key, "dropping non-fillable attribute");
                continue;
            };
            column.kind.check(column.name, value)?;
            values.push((column, value.clone()));
        }
        Ok(Self { values })
    }

    pub fn fill_value<M: Model>(input: &Value) -> Result<Self, ModelError> {
        match input {
            Value::Object(map) => Self::fill::<M>(map),
            _ => Err(ModelError::NotAnObject),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.iter().map(|(c, _)| c.name)
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(c, _)| c.name == key)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static Column, &Value)> + '_ {
        self.values.iter().map(|(c, v)| (*c, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[cfg(test)]
    pub fn into_map(self) -> Map<String, Value> {
        self.values
            .into_iter()
            .map(|(c, v)| (c.name.to_string(), v))
            .collect()
    }
}

/// Builds a typed model from a raw stored row, running every declared cast first.
pub fn hydrate<M: Model>(raw: Value) -> Result<M, ModelError> {
    let Value::Object(mut row) = raw else {
        return Err(ModelError::NotAnObject);
    };
    for (field, cast) in M::CASTS {
        if let Some(value) = row.get_mut(*field) {
            *value = cast.apply(field, value)?;
        }
    }
    Ok(serde_json::from_value(Value::Object(row))?)
}

/// Serializes `model` without its hidden keys.
pub fn to_public<M: Model>(model: &M) -> Result<Value, ModelError> {
    let mut value = serde_json::to_value(model)?;
    if let Value::Object(map) = &mut value {
        for key in M::HIDDEN {
            map.remove(*key);
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize)]
    struct Pet {
        name: Option<String>,
        legs: Option<i32>,
        secret: Option<String>,
        #[serde(with = "time::serde::rfc3339")]
        born_at: OffsetDateTime,
    }

    impl Model for Pet {
        const TABLE: &'static str = "pets";
        const FILLABLE: &'static [Column] = &[Column::text("name"), Column::integer("legs")];
        const HIDDEN: &'static [&'static str] = &["secret"];
        const CASTS: &'static [(&'static str, Cast)] = &[("born_at", Cast::DateTime)];
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn fill_keeps_only_fillable_keys() {
        let input = object(json!({
            "name": "Rex",
            "legs": 4,
            "secret": "bone",
            "id": 7,
            "born_at": "2020-01-01"
        }));
        let attrs = Attributes::fill::<Pet>(&input).unwrap();
        let mut keys: Vec<_> = attrs.keys().collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["legs", "name"]);
        assert_eq!(attrs.get("name"), Some(&json!("Rex")));
        assert!(attrs.get("secret").is_none());
    }

    #[test]
    fn fill_accepts_empty_and_partial_input() {
        assert!(Attributes::fill::<Pet>(&Map::new()).unwrap().is_empty());
        let attrs = Attributes::fill::<Pet>(&object(json!({ "legs": 3 }))).unwrap();
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn fill_allows_null_values() {
        let attrs = Attributes::fill::<Pet>(&object(json!({ "name": null }))).unwrap();
        assert_eq!(attrs.get("name"), Some(&Value::Null));
    }

    #[test]
    fn fill_rejects_mistyped_fillable_values() {
        let err = Attributes::fill::<Pet>(&object(json!({ "legs": "four" }))).unwrap_err();
        assert!(matches!(
            err,
            ModelError::InvalidAttribute { field: "legs", .. }
        ));

        let err = Attributes::fill::<Pet>(&object(json!({ "legs": 1u64 << 40 }))).unwrap_err();
        assert!(matches!(err, ModelError::InvalidAttribute { .. }));
    }

    #[test]
    fn fill_ignores_mistyped_non_fillable_values() {
        let attrs = Attributes::fill::<Pet>(&object(json!({ "secret": [1, 2] }))).unwrap();
        assert!(attrs.is_empty());
    }

    #[test]
    fn fill_value_requires_an_object() {
        let err = Attributes::fill_value::<Pet>(&json!(["name"])).unwrap_err();
        assert!(matches!(err, ModelError::NotAnObject));
    }

    #[test]
    fn datetime_cast_accepts_stored_shapes() {
        let expected = json!("2024-05-01T10:00:00Z");
        for raw in [
            json!("2024-05-01T10:00:00Z"),
            json!("2024-05-01T10:00:00+00:00"),
            json!("2024-05-01 10:00:00+00"),
            json!("2024-05-01 12:00:00+02"),
            json!("2024-05-01 10:00:00"),
            json!("2024-05-01T10:00:00"),
            json!(1714557600),
        ] {
            assert_eq!(Cast::DateTime.apply("born_at", &raw).unwrap(), expected, "{raw}");
        }
        let fractional = Cast::DateTime
            .apply("born_at", &json!("2024-05-01T10:00:00.123456"))
            .unwrap();
        let parsed = OffsetDateTime::parse(fractional.as_str().unwrap(), &Rfc3339).unwrap();
        assert_eq!(parsed.nanosecond(), 123_456_000);
    }

    #[test]
    fn datetime_cast_keeps_hour_only_offsets() {
        let cast = Cast::DateTime
            .apply("born_at", &json!("2024-05-01 10:00:00.25-05"))
            .unwrap();
        let parsed = OffsetDateTime::parse(cast.as_str().unwrap(), &Rfc3339).unwrap();
        assert_eq!(parsed.offset().whole_hours(), -5);
        assert_eq!(parsed.hour(), 10);
        assert_eq!(parsed.millisecond(), 250);
    }

    #[test]
    fn hydrate_reports_deserialization_failures() {
        let err = hydrate::<Pet>(json!({ "legs": 4, "born_at": 0, "name": 12 })).unwrap_err();
        assert!(matches!(err, ModelError::Hydrate(_)));
    }

    #[test]
    fn datetime_cast_rejects_garbage() {
        let err = Cast::DateTime.apply("born_at", &json!("yesterday")).unwrap_err();
        assert!(err.to_string().contains("born_at"));
        assert!(Cast::DateTime.apply("born_at", &json!(true)).is_err());
        assert_eq!(Cast::DateTime.apply("born_at", &Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn hydrate_casts_before_deserializing() {
        let pet: Pet = hydrate(json!({
            "name": "Rex",
            "legs": 4,
            "secret": null,
            "born_at": "2021-03-04 05:06:07"
        }))
        .unwrap();
        assert_eq!(pet.born_at.year(), 2021);
        assert_eq!(pet.born_at.offset(), time::UtcOffset::UTC);
    }

    #[test]
    fn to_public_strips_hidden_keys() {
        let pet = Pet {
            name: Some("Rex".into()),
            legs: Some(4),
            secret: Some("bone".into()),
            born_at: OffsetDateTime::UNIX_EPOCH,
        };
        let value = to_public(&pet).unwrap();
        assert!(value.get("secret").is_none());
        assert_eq!(value["name"], json!("Rex"));
    }
}
