//! Field-level fallbacks for mission parameter bags.
//!
//! A malformed field degrades to its default and a malformed list entry is
//! dropped, so one bad record never discards the rest of the authored data.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize a field, falling back to `T::default()` when the value has
/// the wrong shape.
pub(crate) fn field<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_else(|err| {
        log::warn!("malformed parameter field, using default: {err}");
        T::default()
    }))
}

/// Accept a string or a bare number as text.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected text or a number, found {other}"
        ))),
    }
}

/// Deserialize a list, skipping entries that fail to parse.
pub(crate) fn list<'de, D, C, E>(deserializer: D) -> Result<C, D::Error>
where
    D: Deserializer<'de>,
    C: FromIterator<E>,
    E: DeserializeOwned,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries,
        Value::Null => Vec::new(),
        other => {
            log::warn!("expected a list of parameter entries, found {other}");
            Vec::new()
        }
    };
    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                log::warn!("skipping malformed entry {index}: {err}");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Entry {
        id: String,
        #[serde(default, deserialize_with = "super::field")]
        weight: u32,
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Bag {
        #[serde(default, deserialize_with = "super::list")]
        entries: Vec<Entry>,
        #[serde(default, deserialize_with = "super::field")]
        label: Option<String>,
    }

    #[test]
    fn bad_entries_are_dropped_and_bad_fields_defaulted() {
        let bag: Bag = serde_json::from_value(json!({
            "entries": [
                { "id": "a", "weight": 3 },
                { "weight": 4 },
                { "id": "c", "weight": "heavy" }
            ],
            "label": 5
        }))
        .unwrap();
        assert_eq!(
            bag.entries,
            vec![
                Entry {
                    id: "a".into(),
                    weight: 3
                },
                Entry {
                    id: "c".into(),
                    weight: 0
                },
            ]
        );
        assert_eq!(bag.label, None);
    }

    #[derive(Debug, Deserialize)]
    struct Dated {
        #[serde(deserialize_with = "super::text")]
        year: String,
    }

    #[test]
    fn text_accepts_numbers() {
        let dated: Dated = serde_json::from_value(json!({ "year": 1792 })).unwrap();
        assert_eq!(dated.year, "1792");
        assert!(serde_json::from_value::<Dated>(json!({ "year": [1] })).is_err());
    }

    #[test]
    fn non_list_values_become_empty() {
        let bag: Bag = serde_json::from_value(json!({ "entries": "oops", "label": null })).unwrap();
        assert_eq!(bag, Bag::default());
    }
}
