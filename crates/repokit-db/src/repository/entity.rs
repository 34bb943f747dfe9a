//! Generic record accessor bound to one table.

use std::collections::VecDeque;

use rusqlite::types::Value;
use tracing::debug;

use crate::{
    connection::{Bindings, DbConnection, NativeResult},
    criteria::{Filter, FilterValue, OrderSpec},
    error::Result,
    expr::{validate_identifier, Col},
    query::{DeleteQuery, InsertQuery, SelectQuery, UpdateQuery},
    record::Attributes,
    traits::{Expression, FromRow, Model, Persistable},
};

/// CRUD, filtering and staging for the rows of one table.
///
/// `E` is the row type: [`crate::Record`] for untyped access or any type
/// implementing [`FromRow`] and [`Persistable`].
///
/// # Example
///
/// ```rust
/// use repokit_db::{Attributes, DbConnection, EntityRepository, Filter, OrderSpec, Record};
///
/// let conn = DbConnection::open_in_memory().unwrap();
/// conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, status TEXT)").unwrap();
///
/// let users = EntityRepository::<Record>::for_table(conn, "users", "id").unwrap();
/// users.create(Attributes::new().with("name", "Ada".to_string()).with("status", "active".to_string())).unwrap();
///
/// let active = users
///     .find_by(&Filter::new().eq("status", "active".to_string()), &OrderSpec::new().asc("name"))
///     .unwrap();
/// assert_eq!(active.len(), 1);
/// ```
pub struct EntityRepository<E> {
    conn: DbConnection,
    table: String,
    primary_key: String,
    pending: VecDeque<E>,
}

impl<E: Model> EntityRepository<E> {
    /// Creates an accessor for a model's own table and primary key.
    pub fn new(conn: DbConnection) -> Self {
        Self {
            conn,
            table: E::TABLE.to_string(),
            primary_key: E::PRIMARY_KEY.to_string(),
            pending: VecDeque::new(),
        }
    }
}

impl<E: FromRow + Persistable> EntityRepository<E> {
    /// Creates an accessor for an arbitrary table.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DbError::InvalidIdentifier`] if `table` or
    /// `primary_key` is not a plain identifier.
    pub fn for_table(
        conn: DbConnection,
        table: impl Into<String>,
        primary_key: impl Into<String>,
    ) -> Result<Self> {
        let table = table.into();
        let primary_key = primary_key.into();
        validate_identifier(&table)?;
        validate_identifier(&primary_key)?;

        Ok(Self {
            conn,
            table,
            primary_key,
            pending: VecDeque::new(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    fn pk_column(&self) -> Result<Col<Value>> {
        Col::dynamic(self.primary_key.clone())
    }

    fn query(&self) -> SelectQuery<E> {
        SelectQuery::from(self.conn.clone(), self.table.clone())
    }

    fn filtered(&self, filters: &Filter) -> Result<SelectQuery<E>> {
        let mut query = self.query();
        for (column, value) in filters {
            let col = Col::dynamic(column.clone())?;
            query = match value {
                FilterValue::Eq(Value::Null) => query.filter(col.null()),
                FilterValue::Eq(value) => query.filter(col.eq(value.clone())),
                FilterValue::In(values) => query.filter(col.in_(values.iter().cloned())),
            };
        }
        Ok(query)
    }

    fn ordered(query: SelectQuery<E>, orders: &OrderSpec) -> Result<SelectQuery<E>> {
        let mut query = query;
        for order in orders {
            query = query.order_by(Col::dynamic(order.column.clone())?, order.direction.is_desc());
        }
        Ok(query)
    }

    fn check_columns(data: &Attributes) -> Result<()> {
        data.columns().try_for_each(validate_identifier)
    }

    /// Every row of the table, in the store's default order.
    pub fn find_all(&self) -> Result<Vec<E>> {
        self.query().fetch()
    }

    /// Rows matching every filter entry, sorted by `orders`.
    ///
    /// A scalar entry requires equality (`NULL` requires `IS NULL`); a list
    /// entry requires membership. Empty filters match every row.
    pub fn find_by(&self, filters: &Filter, orders: &OrderSpec) -> Result<Vec<E>> {
        Self::ordered(self.filtered(filters)?, orders)?.fetch()
    }

    /// The first matching row by ascending primary key.
    pub fn find_one_by(&self, criteria: &Filter) -> Result<Option<E>> {
        self.filtered(criteria)?
            .order_by(self.pk_column()?, false)
            .fetch_one()
    }

    /// The first matching row under an explicit order.
    pub fn find_one_by_ordered(&self, criteria: &Filter, orders: &OrderSpec) -> Result<Option<E>> {
        Self::ordered(self.filtered(criteria)?, orders)?.fetch_one()
    }

    /// Looks a row up by primary key.
    pub fn get_by_id(&self, id: impl Into<Value>) -> Result<Option<E>> {
        self.query()
            .filter(self.pk_column()?.eq(id))
            .fetch_one()
    }

    /// Number of rows matching `filters`.
    pub fn count_by(&self, filters: &Filter) -> Result<u64> {
        self.filtered(filters)?.count()
    }

    /// One page of [`Self::find_by`]. Pages start at 1.
    pub fn paginate(
        &self,
        filters: &Filter,
        orders: &OrderSpec,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<E>> {
        Self::ordered(self.filtered(filters)?, orders)?
            .page(page, per_page)
            .fetch()
    }

    /// Inserts a row and returns it as stored, including any generated key
    /// and column defaults.
    pub fn create(&self, data: Attributes) -> Result<E> {
        Self::check_columns(&data)?;
        InsertQuery::into(self.conn.clone(), self.table.clone())
            .values(&data)
            .execute_returning()
    }

    /// Applies `data` to the row identified by `id`.
    ///
    /// Returns `None` without touching the table when the row does not
    /// exist. Empty `data` returns the current row unchanged.
    pub fn update(&self, id: impl Into<Value>, data: Attributes) -> Result<Option<E>> {
        let id = id.into();
        Self::check_columns(&data)?;

        let Some(current) = self.get_by_id(id.clone())? else {
            debug!(table = %self.table, "update target not found");
            return Ok(None);
        };
        if data.is_empty() {
            return Ok(Some(current));
        }

        let mut updated = UpdateQuery::table(self.conn.clone(), self.table.clone())
            .values(&data)
            .filter(self.pk_column()?.eq(id))
            .execute_returning::<E>()?;
        Ok(updated.pop())
    }

    /// Removes the row identified by `id`. A missing row is not an error.
    pub fn delete(&self, id: impl Into<Value>) -> Result<()> {
        let removed = DeleteQuery::from(self.conn.clone(), self.table.clone())
            .filter(self.pk_column()?.eq(id))
            .execute()?;
        debug!(table = %self.table, removed, "delete");
        Ok(())
    }

    /// Runs raw SQL on the accessor's connection.
    ///
    /// With `is_select` the produced rows are returned; otherwise the
    /// statement is executed and its success reported.
    pub fn native_query(
        &self,
        sql: &str,
        bindings: Bindings,
        is_select: bool,
    ) -> Result<NativeResult> {
        self.conn.native_query(sql, &bindings, is_select)
    }

    /// Writes one record: inserts when its primary key is unset or `NULL`,
    /// otherwise upserts on the primary key. Returns the stored row.
    pub fn save(&self, record: &E) -> Result<E> {
        let mut data = record.attributes();
        Self::check_columns(&data)?;

        let has_key = !matches!(data.get(&self.primary_key), None | Some(Value::Null));
        if !has_key {
            data.remove(&self.primary_key);
            return InsertQuery::into(self.conn.clone(), self.table.clone())
                .values(&data)
                .execute_returning();
        }

        let mut update_cols: Vec<&str> = data
            .columns()
            .filter(|c| *c != self.primary_key)
            .collect();
        if update_cols.is_empty() {
            update_cols.push(&self.primary_key);
        }

        InsertQuery::into(self.conn.clone(), self.table.clone())
            .values(&data)
            .on_conflict_update(&[self.primary_key.as_str()], &update_cols)
            .execute_returning()
    }

    /// Stages a record for the next [`Self::flush`]. No I/O happens.
    pub fn persist(&mut self, record: E) {
        self.pending.push_back(record);
    }

    /// Staged records, in staging order.
    pub fn pending(&self) -> impl Iterator<Item = &E> {
        self.pending.iter()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Saves every staged record in staging order and returns the stored rows.
    ///
    /// Stops at the first failing save and returns its error. Records saved
    /// before it leave the staging set; the failing record and everything
    /// after it stay staged.
    pub fn flush(&mut self) -> Result<Vec<E>> {
        let mut saved = Vec::with_capacity(self.pending.len());
        while let Some(record) = self.pending.front() {
            let stored = self.save(record)?;
            self.pending.pop_front();
            saved.push(stored);
        }
        debug!(table = %self.table, count = saved.len(), "flushed");
        Ok(saved)
    }

    pub fn begin_transaction(&self) -> Result<()> {
        self.conn.begin_transaction()
    }

    pub fn commit(&self) -> Result<()> {
        self.conn.commit()
    }

    pub fn rollback(&self) -> Result<()> {
        self.conn.rollback()
    }

    pub fn get_connection(&self) -> &DbConnection {
        &self.conn
    }
}
