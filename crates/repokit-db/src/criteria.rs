//! Declarative filter and order descriptions.
//!
//! A [`Filter`] maps column names to either a single value (equality) or a
//! list of values (membership). An [`OrderSpec`] lists sort directives in
//! precedence order. Both are translated into query-builder clauses by the
//! repositories; neither touches the database on its own.

use std::{
    collections::{btree_map, BTreeMap},
    fmt,
    str::FromStr,
};

use rusqlite::types::Value;

use crate::{
    error::{DbError, Result},
    expr::validate_identifier,
};

/// The predicate applied to one filtered column.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// `column = value`, or `column IS NULL` when the value is `NULL`.
    Eq(Value),
    /// `column IN (values...)`. An empty list matches nothing.
    In(Vec<Value>),
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        FilterValue::Eq(value)
    }
}

impl From<Vec<Value>> for FilterValue {
    fn from(values: Vec<Value>) -> Self {
        FilterValue::In(values)
    }
}

/// Column → predicate mapping. All entries must hold (logical AND).
///
/// # Example
///
/// ```rust
/// use repokit_db::Filter;
///
/// let filter = Filter::new()
///     .eq("status", "active".to_string())
///     .any_of("id", [1, 2, 3]);
/// assert_eq!(filter.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(BTreeMap<String, FilterValue>);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `column` to equal `value`.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0
            .insert(column.into(), FilterValue::Eq(value.into()));
        self
    }

    /// Requires `column` to be one of `values`.
    pub fn any_of<T, I>(mut self, column: impl Into<String>, values: I) -> Self
    where
        T: Into<Value>,
        I: IntoIterator<Item = T>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.0.insert(column.into(), FilterValue::In(values));
        self
    }

    /// Inserts a predicate, replacing any previous one for the same column.
    pub fn insert(&mut self, column: impl Into<String>, value: FilterValue) -> Option<FilterValue> {
        self.0.insert(column.into(), value)
    }

    pub fn get(&self, column: &str) -> Option<&FilterValue> {
        self.0.get(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FilterValue> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for Filter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Filter {
    type Item = (&'a String, &'a FilterValue);
    type IntoIter = btree_map::Iter<'a, String, FilterValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Parses a textual value: `null` becomes `NULL`, and numbers are
/// recognised only when they print back to the same text. Anything else,
/// such as `007`, `1e3` or `nan`, stays text.
pub fn parse_value(raw: &str) -> Value {
    if raw.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if let Some(int) = raw.parse::<i64>().ok().filter(|i| i.to_string() == raw) {
        return Value::Integer(int);
    }
    if let Some(real) = raw
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite() && r.to_string() == raw)
    {
        return Value::Real(real);
    }
    Value::Text(raw.to_string())
}

/// A single `column=value` or `column=v1,v2,...` filter entry.
///
/// A value containing a comma becomes a membership predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterEntry {
    pub column: String,
    pub value: FilterValue,
}

impl FromStr for FilterEntry {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self> {
        let (column, raw) = s
            .split_once('=')
            .ok_or_else(|| DbError::InvalidFilter(s.to_string()))?;
        let column = column.trim();
        validate_identifier(column)?;

        let value = if raw.contains(',') {
            FilterValue::In(
                raw.split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(parse_value)
                    .collect(),
            )
        } else {
            FilterValue::Eq(parse_value(raw.trim()))
        };

        Ok(Self {
            column: column.to_string(),
            value,
        })
    }
}

impl FromIterator<FilterEntry> for Filter {
    fn from_iter<I: IntoIterator<Item = FilterEntry>>(iter: I) -> Self {
        Self(iter.into_iter().map(|e| (e.column, e.value)).collect())
    }
}

/// Sort direction for queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn is_desc(self) -> bool {
        self == SortDirection::Desc
    }
}

impl FromStr for SortDirection {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(DbError::InvalidSortDirection(s.to_string())),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// One sort directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

impl From<&str> for OrderBy {
    fn from(column: &str) -> Self {
        OrderBy::asc(column)
    }
}

impl From<String> for OrderBy {
    fn from(column: String) -> Self {
        OrderBy::asc(column)
    }
}

impl<C: Into<String>> From<(C, SortDirection)> for OrderBy {
    fn from((column, direction): (C, SortDirection)) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }
}

impl TryFrom<(&str, &str)> for OrderBy {
    type Error = DbError;

    fn try_from((column, direction): (&str, &str)) -> Result<Self> {
        Ok(Self {
            column: column.to_string(),
            direction: direction.parse()?,
        })
    }
}

/// Parses `column` or `column:direction`.
impl FromStr for OrderBy {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self> {
        let order = match s.split_once(':') {
            Some((column, direction)) => OrderBy::try_from((column.trim(), direction))?,
            None => OrderBy::asc(s.trim()),
        };
        validate_identifier(&order.column)?;
        Ok(order)
    }
}

/// Sort directives in precedence order.
///
/// ```rust
/// use repokit_db::{OrderSpec, SortDirection};
///
/// let orders = OrderSpec::new().asc("name").desc("created_at");
/// assert_eq!(orders.iter().last().unwrap().direction, SortDirection::Desc);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderSpec(Vec<OrderBy>);

impl OrderSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asc(mut self, column: impl Into<String>) -> Self {
        self.0.push(OrderBy::asc(column));
        self
    }

    pub fn desc(mut self, column: impl Into<String>) -> Self {
        self.0.push(OrderBy::desc(column));
        self
    }

    pub fn push(&mut self, order: impl Into<OrderBy>) {
        self.0.push(order.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OrderBy> {
        self.0.iter()
    }
}

impl<O: Into<OrderBy>> FromIterator<O> for OrderSpec {
    fn from_iter<I: IntoIterator<Item = O>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a OrderSpec {
    type Item = &'a OrderBy;
    type IntoIter = std::slice::Iter<'a, OrderBy>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_builder() {
        let filter = Filter::new()
            .eq("status", "active".to_string())
            .any_of("id", [1, 2, 3]);

        assert_eq!(
            filter.get("status"),
            Some(&FilterValue::Eq(Value::Text("active".into())))
        );
        assert_eq!(
            filter.get("id"),
            Some(&FilterValue::In(vec![
                Value::Integer(1),
                Value::Integer(2),
                Value::Integer(3)
            ]))
        );
    }

    #[test]
    fn test_filter_insertion_order_irrelevant() {
        let a = Filter::new().eq("a", 1).eq("b", 2);
        let b = Filter::new().eq("b", 2).eq("a", 1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_filter_entry_parse() {
        let entry: FilterEntry = "status=active".parse().unwrap();
        assert_eq!(entry.column, "status");
        assert_eq!(entry.value, FilterValue::Eq(Value::Text("active".into())));

        let entry: FilterEntry = "id=1,2,3".parse().unwrap();
        assert_eq!(
            entry.value,
            FilterValue::In(vec![
                Value::Integer(1),
                Value::Integer(2),
                Value::Integer(3)
            ])
        );

        let entry: FilterEntry = "deleted_at=null".parse().unwrap();
        assert_eq!(entry.value, FilterValue::Eq(Value::Null));

        assert!(matches!(
            "status".parse::<FilterEntry>(),
            Err(DbError::InvalidFilter(_))
        ));
        assert!(matches!(
            "st atus=1".parse::<FilterEntry>(),
            Err(DbError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("42"), Value::Integer(42));
        assert_eq!(parse_value("-1.5"), Value::Real(-1.5));
        assert_eq!(parse_value("NULL"), Value::Null);
        assert_eq!(parse_value("ada"), Value::Text("ada".into()));
        assert_eq!(parse_value("-7"), Value::Integer(-7));
    }

    #[test]
    fn test_parse_value_keeps_non_canonical_numbers_as_text() {
        for raw in ["nan", "NaN", "inf", "-infinity", "007", "+5", "1e3", "0.50"] {
            assert_eq!(parse_value(raw), Value::Text(raw.into()), "{raw}");
        }

        let entry: FilterEntry = "code=007,nan".parse().unwrap();
        assert_eq!(
            entry.value,
            FilterValue::In(vec![Value::Text("007".into()), Value::Text("nan".into())])
        );
    }

    #[test]
    fn test_sort_direction_parse() {
        assert_eq!("asc".parse::<SortDirection>().unwrap(), SortDirection::Asc);
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert!(matches!(
            "sideways".parse::<SortDirection>(),
            Err(DbError::InvalidSortDirection(_))
        ));
    }

    #[test]
    fn test_order_by_forms() {
        assert_eq!(OrderBy::from("name"), OrderBy::asc("name"));
        assert_eq!(
            OrderBy::from(("name", SortDirection::Desc)),
            OrderBy::desc("name")
        );
        assert_eq!(
            OrderBy::try_from(("name", "desc")).unwrap(),
            OrderBy::desc("name")
        );
        assert_eq!(
            "created_at:desc".parse::<OrderBy>().unwrap(),
            OrderBy::desc("created_at")
        );
        assert_eq!("name".parse::<OrderBy>().unwrap(), OrderBy::asc("name"));
        assert!("name:up".parse::<OrderBy>().is_err());
    }

    #[test]
    fn test_order_spec_keeps_precedence() {
        let orders: OrderSpec = ["status", "name"].into_iter().collect();
        let columns: Vec<_> = orders.iter().map(|o| o.column.as_str()).collect();
        assert_eq!(columns, vec!["status", "name"]);
    }
}
