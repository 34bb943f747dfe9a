use repokit_db::{
    criteria::parse_value, DbConnection, EntityRepository, Filter, FilterEntry, OrderBy,
    OrderSpec, Record,
};
use tracing::{debug, info};

use crate::{error::CliResult, utils::print_json_line};

#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub table: String,
    pub filters: Vec<FilterEntry>,
    pub orders: Vec<OrderBy>,
    pub id: Option<String>,
    pub one: bool,
    pub limit: Option<u32>,
    pub page: u32,
    pub primary_key: String,
    pub count: bool,
}

#[derive(Debug, PartialEq)]
pub enum FindOutput {
    Rows(Vec<Record>),
    Count(u64),
}

pub fn find_records(conn: DbConnection, options: &FindOptions) -> CliResult<FindOutput> {
    let repo = EntityRepository::<Record>::for_table(
        conn,
        options.table.as_str(),
        options.primary_key.as_str(),
    )?;
    let filters: Filter = options.filters.iter().cloned().collect();
    let orders: OrderSpec = options.orders.iter().cloned().collect();

    if options.count {
        return Ok(FindOutput::Count(repo.count_by(&filters)?));
    }

    let rows = if let Some(id) = &options.id {
        debug!("looking up {} by {} = {id}", repo.table(), repo.primary_key());
        repo.get_by_id(parse_value(id))?.into_iter().collect()
    } else if options.one {
        let found = if orders.is_empty() {
            repo.find_one_by(&filters)?
        } else {
            repo.find_one_by_ordered(&filters, &orders)?
        };
        found.into_iter().collect()
    } else if let Some(limit) = options.limit {
        repo.paginate(&filters, &orders, options.page, limit)?
    } else {
        repo.find_by(&filters, &orders)?
    };

    Ok(FindOutput::Rows(rows))
}

pub fn find(conn: DbConnection, options: &FindOptions) -> CliResult<()> {
    match find_records(conn, options)? {
        FindOutput::Count(count) => print_json_line(&count)?,
        FindOutput::Rows(rows) => {
            if rows.is_empty() {
                info!("No rows found in {}", options.table);
            }
            for row in &rows {
                print_json_line(row)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use repokit_db::{Bindings, DbError, SortDirection};

    use super::*;
    use crate::error::CliError;

    fn setup() -> DbConnection {
        let conn = DbConnection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE books (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                genre TEXT NOT NULL,
                year INTEGER NOT NULL
            );
            INSERT INTO books (title, genre, year) VALUES
                ('Dune', 'scifi', 1965),
                ('Emma', 'classic', 1815),
                ('Neuromancer', 'scifi', 1984),
                ('Ubik', 'scifi', 1969);",
        )
        .unwrap();
        conn
    }

    fn options(table: &str) -> FindOptions {
        FindOptions {
            table: table.into(),
            page: 1,
            primary_key: "id".into(),
            ..Default::default()
        }
    }

    fn titles(output: FindOutput) -> Vec<String> {
        match output {
            FindOutput::Rows(rows) => rows
                .iter()
                .map(|r| r.get_as::<String>("title").unwrap())
                .collect(),
            FindOutput::Count(_) => panic!("expected rows"),
        }
    }

    #[test]
    fn test_filters_and_orders_from_cli_syntax() {
        let conn = setup();
        let mut opts = options("books");
        opts.filters = vec!["genre=scifi".parse().unwrap()];
        opts.orders = vec!["year:desc".parse().unwrap()];

        let found = titles(find_records(conn, &opts).unwrap());
        assert_eq!(found, vec!["Neuromancer", "Ubik", "Dune"]);
    }

    #[test]
    fn test_membership_filter() {
        let conn = setup();
        let mut opts = options("books");
        opts.filters = vec!["year=1815,1969".parse().unwrap()];
        opts.orders = vec![OrderBy::asc("title")];

        let found = titles(find_records(conn, &opts).unwrap());
        assert_eq!(found, vec!["Emma", "Ubik"]);
    }

    #[test]
    fn test_by_id() {
        let conn = setup();
        let mut opts = options("books");
        opts.id = Some("2".into());
        assert_eq!(titles(find_records(conn.clone(), &opts).unwrap()), vec!["Emma"]);

        opts.id = Some("99".into());
        assert!(titles(find_records(conn, &opts).unwrap()).is_empty());
    }

    #[test]
    fn test_one_uses_primary_key_or_explicit_order() {
        let conn = setup();
        let mut opts = options("books");
        opts.one = true;
        opts.filters = vec!["genre=scifi".parse().unwrap()];
        assert_eq!(titles(find_records(conn.clone(), &opts).unwrap()), vec!["Dune"]);

        opts.orders = vec![OrderBy::from(("title", SortDirection::Desc))];
        assert_eq!(titles(find_records(conn, &opts).unwrap()), vec!["Ubik"]);
    }

    #[test]
    fn test_paging_and_count() {
        let conn = setup();
        let mut opts = options("books");
        opts.orders = vec![OrderBy::asc("id")];
        opts.limit = Some(3);
        opts.page = 2;
        assert_eq!(titles(find_records(conn.clone(), &opts).unwrap()), vec!["Ubik"]);

        let mut opts = options("books");
        opts.count = true;
        opts.filters = vec!["genre=scifi".parse().unwrap()];
        assert_eq!(find_records(conn, &opts).unwrap(), FindOutput::Count(3));
    }

    #[test]
    fn test_text_values_that_look_numeric() {
        let conn = DbConnection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE items (id INTEGER PRIMARY KEY, code TEXT NOT NULL);
            INSERT INTO items (code) VALUES ('nan'), ('inf'), ('007'), ('7');",
        )
        .unwrap();

        for raw in ["nan", "inf", "007", "7"] {
            let mut opts = options("items");
            opts.filters = vec![format!("code={raw}").parse().unwrap()];
            let rows = match find_records(conn.clone(), &opts).unwrap() {
                FindOutput::Rows(rows) => rows,
                FindOutput::Count(_) => panic!("expected rows"),
            };
            assert_eq!(rows.len(), 1, "{raw}");
            assert_eq!(rows[0].get_as::<String>("code").as_deref(), Some(raw));
        }
    }

    #[test]
    fn test_rejects_unsafe_table_name() {
        let conn = setup();
        let err = find_records(conn.clone(), &options("books; DROP TABLE books")).unwrap_err();
        assert!(matches!(err, CliError::Db(DbError::InvalidIdentifier(_))));
        assert_eq!(
            conn.select("SELECT * FROM books", &Bindings::None)
                .unwrap()
                .len(),
            4
        );
    }
}
