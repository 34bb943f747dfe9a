//! Untyped rows and attribute maps.

use std::collections::{btree_map, BTreeMap};

use rusqlite::{
    types::{FromSql, Value},
    Row,
};
use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::traits::{FromRow, Persistable};

/// Column → value mapping used for inserts, updates and saves.
///
/// Columns are kept sorted by name so the generated SQL is stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(BTreeMap<String, Value>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    ///
    /// ```rust
    /// use repokit_db::Attributes;
    ///
    /// let data = Attributes::new()
    ///     .with("name", "Ada".to_string())
    ///     .with("age", 36);
    /// assert_eq!(data.len(), 2);
    /// ```
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(column.into(), value.into())
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.0.remove(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Attributes {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A row of an arbitrary table.
///
/// The accessor knows nothing about the schema; every column of the result
/// set is captured as a SQLite [`Value`]. Columns keep result-set order,
/// with columns added later appended at the end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    attributes: Attributes,
    columns: Vec<String>,
}

impl Record {
    pub fn new(attributes: Attributes) -> Self {
        let columns = attributes.columns().map(str::to_string).collect();
        Self {
            attributes,
            columns,
        }
    }

    /// Column names in result-set order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.attributes.get(column)
    }

    /// Reads a column converted to `T`.
    ///
    /// Returns `None` when the column is missing or does not convert.
    pub fn get_as<T: FromSql>(&self, column: &str) -> Option<T> {
        let value = self.attributes.get(column)?;
        T::column_result(value.into()).ok()
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        if self.attributes.insert(column.clone(), value).is_none() {
            self.columns.push(column);
        }
    }

    /// Fills the record from `data`, overwriting columns it already holds.
    pub fn fill(&mut self, data: Attributes) {
        for (column, value) in data {
            self.set(column, value);
        }
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn into_attributes(self) -> Attributes {
        self.attributes
    }
}

impl From<Attributes> for Record {
    fn from(attributes: Attributes) -> Self {
        Self::new(attributes)
    }
}

impl FromRow for Record {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let stmt = row.as_ref();
        let mut record = Record::default();
        for idx in 0..stmt.column_count() {
            let value: Value = row.get(idx)?;
            record.set(stmt.column_name(idx)?, value);
        }
        Ok(record)
    }
}

impl Persistable for Record {
    fn attributes(&self) -> Attributes {
        self.attributes.clone()
    }
}

struct JsonValue<'a>(&'a Value);

impl Serialize for JsonValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Null => serializer.serialize_none(),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Real(f) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Blob(b) => serializer.collect_seq(b.iter()),
        }
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, &JsonValue(value))?;
        }
        map.end()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in &self.columns {
            if let Some(value) = self.attributes.get(column) {
                map.serialize_entry(column, &JsonValue(value))?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_builder_sorted() {
        let data = Attributes::new()
            .with("name", "Ada".to_string())
            .with("age", 36)
            .with("email", None::<String>);

        let columns: Vec<_> = data.columns().collect();
        assert_eq!(columns, vec!["age", "email", "name"]);
        assert_eq!(data.get("email"), Some(&Value::Null));
    }

    #[test]
    fn test_record_get_as() {
        let record = Record::new(
            Attributes::new()
                .with("id", 7)
                .with("name", "Ada".to_string()),
        );

        assert_eq!(record.get_as::<i64>("id"), Some(7));
        assert_eq!(record.get_as::<String>("name"), Some("Ada".to_string()));
        assert_eq!(record.get_as::<i64>("name"), None);
        assert_eq!(record.get_as::<i64>("missing"), None);
    }

    #[test]
    fn test_record_fill_overwrites() {
        let mut record = Record::new(Attributes::new().with("status", "draft".to_string()));
        record.fill(Attributes::new().with("status", "published".to_string()));
        assert_eq!(
            record.get_as::<String>("status").as_deref(),
            Some("published")
        );
    }

    #[test]
    fn test_record_serializes_to_json_object() {
        let record = Record::new(
            Attributes::new()
                .with("id", 1)
                .with("score", 2.5)
                .with("name", "Ada".to_string())
                .with("deleted_at", None::<String>)
                .with("avatar", vec![1u8, 2]),
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "avatar": [1, 2],
                "deleted_at": null,
                "id": 1,
                "name": "Ada",
                "score": 2.5
            })
        );
    }

    #[test]
    fn test_record_keeps_result_set_column_order() {
        let conn = crate::DbConnection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT);
             INSERT INTO people (name) VALUES ('Ada');",
        )
        .unwrap();

        let rows = conn
            .select("SELECT name, id FROM people", &crate::Bindings::None)
            .unwrap();
        assert_eq!(rows[0].columns().collect::<Vec<_>>(), vec!["name", "id"]);
        assert_eq!(
            serde_json::to_string(&rows[0]).unwrap(),
            r#"{"name":"Ada","id":1}"#
        );

        let mut record = rows[0].clone();
        record.set("email", None::<String>);
        record.set("name", "Grace".to_string());
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"name":"Grace","id":1,"email":null}"#
        );
    }
}
