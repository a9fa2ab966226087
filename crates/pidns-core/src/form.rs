// ── Form serialization ──

use serde_json::{Map, Value};

/// Submitted form fields in document order. Names may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: Vec<(String, String)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// First value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// Convert form fields into a JSON object.
///
/// A name seen once maps to its string value; a repeated name maps to an
/// array of every value in submission order.
pub fn serialize_form(form: &FormData) -> Map<String, Value> {
    let mut out = Map::new();
    for (name, value) in form.iter() {
        let value = Value::String(value.to_owned());
        match out.get_mut(name) {
            None => {
                out.insert(name.to_owned(), value);
            }
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn single_fields_map_to_strings() {
        let form = FormData::new()
            .with("domain", "ads.example.com")
            .with("category", "ads");
        assert_eq!(
            Value::Object(serialize_form(&form)),
            json!({ "domain": "ads.example.com", "category": "ads" })
        );
    }

    #[test]
    fn repeated_names_collapse_into_ordered_array() {
        let form = FormData::new()
            .with("tag", "a")
            .with("name", "x")
            .with("tag", "b")
            .with("tag", "c");
        assert_eq!(
            Value::Object(serialize_form(&form)),
            json!({ "tag": ["a", "b", "c"], "name": "x" })
        );
    }

    #[test]
    fn get_returns_first_value() {
        let form = FormData::new().with("k", "1").with("k", "2");
        assert_eq!(form.get("k"), Some("1"));
        assert_eq!(form.get("missing"), None);
    }
}
