//! Candidate table access: pending selection and completion updates.

use std::path::Path;

use chrono::{Local, NaiveDate};
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use sea_query::{
    Alias, ColumnDef, Expr, OnConflict, Query, SqliteQueryBuilder, Table,
};
use tracing::debug;

use super::util::{build_sql, statement_error, BoundStatement};
use super::{
    StoreError, DATE_FORMAT, DOWNLOADED_AT_COLUMN, DOWNLOADED_COLUMN, SOURCE_URL_COLUMN,
    URN_COLUMN, URN_YEAR_COLUMN,
};
use crate::config::DbConfig;
use crate::models::{CandidateRecord, Field, FieldSet, PendingRecord};
use crate::urn::urn_year;

/// Pending/completed totals of the candidate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreCounts {
    pub pending: u64,
    pub downloaded: u64,
}

/// SQLite-backed candidate store holding one connection.
pub struct RecordStore {
    conn: Connection,
    table: String,
}

impl RecordStore {
    /// Open the database named in the configuration.
    pub fn open(config: &DbConfig) -> Result<Self, StoreError> {
        Self::open_path(&config.name, &config.tablename)
    }

    pub fn open_path(path: &Path, table: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Ok(Self::from_connection(conn, table))
    }

    pub fn from_connection(conn: Connection, table: &str) -> Self {
        Self {
            conn,
            table: table.to_string(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    fn table(&self) -> Alias {
        Alias::new(self.table.as_str())
    }

    /// Create the candidate table if it does not exist yet.
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        let mut stmt = Table::create();
        stmt.table(self.table())
            .if_not_exists()
            .col(
                ColumnDef::new(Alias::new(URN_COLUMN))
                    .text()
                    .not_null()
                    .unique_key(),
            )
            .col(ColumnDef::new(Alias::new(SOURCE_URL_COLUMN)).text().not_null())
            .col(ColumnDef::new(Alias::new(URN_YEAR_COLUMN)).integer())
            .col(
                ColumnDef::new(Alias::new(DOWNLOADED_COLUMN))
                    .boolean()
                    .not_null()
                    .default(false),
            )
            .col(ColumnDef::new(Alias::new(DOWNLOADED_AT_COLUMN)).date());
        for field in Field::ALL {
            stmt.col(ColumnDef::new(Alias::new(field.column())).text());
        }

        let sql = stmt.to_string(SqliteQueryBuilder);
        self.conn.execute_batch(&sql).map_err(statement_error(&sql))?;
        Ok(())
    }

    /// Insert a pending candidate. Returns false when the URN already exists.
    pub fn insert_candidate(&self, urn: &str, source_url: &str) -> Result<bool, StoreError> {
        let stmt = Query::insert()
            .into_table(self.table())
            .columns([
                Alias::new(URN_COLUMN),
                Alias::new(SOURCE_URL_COLUMN),
                Alias::new(URN_YEAR_COLUMN),
            ])
            .values_panic([urn.into(), source_url.into(), urn_year(urn).into()])
            .on_conflict(
                OnConflict::column(Alias::new(URN_COLUMN))
                    .do_nothing()
                    .to_owned(),
            )
            .to_owned();

        let changed = self.execute(&build_sql(&stmt))?;
        Ok(changed > 0)
    }

    /// Records not yet downloaded, or the rows of `override_query` when given.
    ///
    /// An override query must project `urn` and `url_lexml`. Every call
    /// re-runs the query against the current table state.
    pub fn fetch_pending(
        &self,
        override_query: Option<&str>,
    ) -> Result<Vec<PendingRecord>, StoreError> {
        if let Some(sql) = override_query {
            return self.query_pending(sql, &[]);
        }

        let stmt = Query::select()
            .columns([Alias::new(URN_COLUMN), Alias::new(SOURCE_URL_COLUMN)])
            .from(self.table())
            .and_where(Expr::col(Alias::new(DOWNLOADED_COLUMN)).eq(false))
            .to_owned();
        let bound = build_sql(&stmt);
        self.query_pending(&bound.sql, &bound.params)
    }

    fn query_pending(
        &self,
        sql: &str,
        params: &[rusqlite::types::Value],
    ) -> Result<Vec<PendingRecord>, StoreError> {
        let mut stmt = self.conn.prepare(sql).map_err(statement_error(sql))?;
        let rows = stmt
            .query_map(params_from_iter(params), |row| {
                Ok(PendingRecord {
                    urn: row.get(URN_COLUMN)?,
                    source_url: row.get(SOURCE_URL_COLUMN)?,
                })
            })
            .map_err(statement_error(sql))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(statement_error(sql))
    }

    /// Write the obtainable fields and mark the record downloaded today.
    pub fn apply_update(&mut self, urn: &str, fields: &FieldSet) -> Result<(), StoreError> {
        self.apply_update_on(urn, fields, Local::now().date_naive())
    }

    /// Write the obtainable fields and mark the record downloaded on `date`.
    ///
    /// Null and empty values are left out of the statement so the columns
    /// keep whatever they held. The flag and date are always set. Runs in
    /// its own transaction and commits before returning.
    pub fn apply_update_on(
        &mut self,
        urn: &str,
        fields: &FieldSet,
        date: NaiveDate,
    ) -> Result<(), StoreError> {
        let mut stmt = Query::update();
        stmt.table(self.table());
        let mut written = 0usize;
        for (field, value) in fields {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                stmt.value(Alias::new(field.column()), value);
                written += 1;
            }
        }
        stmt.value(Alias::new(DOWNLOADED_COLUMN), true)
            .value(
                Alias::new(DOWNLOADED_AT_COLUMN),
                date.format(DATE_FORMAT).to_string(),
            )
            .and_where(Expr::col(Alias::new(URN_COLUMN)).eq(urn));

        let bound = build_sql(&stmt);
        let tx = self.conn.transaction()?;
        let changed = tx
            .execute(&bound.sql, params_from_iter(&bound.params))
            .map_err(statement_error(&bound.sql))?;
        if changed == 0 {
            return Err(StoreError::NoSuchRecord(urn.to_string()));
        }
        tx.commit()?;

        debug!("Updated {} ({} fields written)", urn, written);
        Ok(())
    }

    /// Load one record by URN.
    pub fn get(&self, urn: &str) -> Result<Option<CandidateRecord>, StoreError> {
        let mut columns = vec![
            Alias::new(URN_COLUMN),
            Alias::new(SOURCE_URL_COLUMN),
            Alias::new(DOWNLOADED_COLUMN),
            Alias::new(DOWNLOADED_AT_COLUMN),
        ];
        columns.extend(Field::ALL.iter().map(|f| Alias::new(f.column())));

        let stmt = Query::select()
            .columns(columns)
            .from(self.table())
            .and_where(Expr::col(Alias::new(URN_COLUMN)).eq(urn))
            .to_owned();
        let bound = build_sql(&stmt);

        self.conn
            .query_row(&bound.sql, params_from_iter(&bound.params), candidate_from_row)
            .optional()
            .map_err(statement_error(&bound.sql))
    }

    /// Count pending and downloaded records.
    pub fn counts(&self) -> Result<StoreCounts, StoreError> {
        Ok(StoreCounts {
            pending: self.count_where(false)?,
            downloaded: self.count_where(true)?,
        })
    }

    fn count_where(&self, downloaded: bool) -> Result<u64, StoreError> {
        let stmt = Query::select()
            .expr(Expr::cust("COUNT(*)"))
            .from(self.table())
            .and_where(Expr::col(Alias::new(DOWNLOADED_COLUMN)).eq(downloaded))
            .to_owned();
        let bound = build_sql(&stmt);
        let count: i64 = self
            .conn
            .query_row(&bound.sql, params_from_iter(&bound.params), |row| row.get(0))
            .map_err(statement_error(&bound.sql))?;
        Ok(count.max(0) as u64)
    }

    fn execute(&self, bound: &BoundStatement) -> Result<usize, StoreError> {
        self.conn
            .execute(&bound.sql, params_from_iter(&bound.params))
            .map_err(statement_error(&bound.sql))
    }

    /// Close the connection, surfacing any error SQLite reports.
    pub fn close(self) -> Result<(), StoreError> {
        self.conn
            .close()
            .map_err(|(_, e)| StoreError::Database(e))
    }
}

fn candidate_from_row(row: &Row<'_>) -> rusqlite::Result<CandidateRecord> {
    let downloaded_at = row
        .get::<_, Option<String>>(DOWNLOADED_AT_COLUMN)?
        .and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok());

    let mut fields = FieldSet::new();
    for field in Field::ALL {
        fields.insert(field, row.get::<_, Option<String>>(field.column())?);
    }

    Ok(CandidateRecord {
        urn: row.get(URN_COLUMN)?,
        source_url: row.get(SOURCE_URL_COLUMN)?,
        downloaded: row
            .get::<_, Option<bool>>(DOWNLOADED_COLUMN)?
            .unwrap_or(false),
        downloaded_at,
        fields,
    })
}
