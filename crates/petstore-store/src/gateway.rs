// ABOUTME: URI-routed CRUD gateway over the pets table: query, insert, update, delete, resource_type.
// ABOUTME: Classifies the URI, validates writes, runs one statement, and notifies observers on success.

use std::path::PathBuf;

use petstore_core::contract::{COLUMN_ID, PETS_TABLE, TABLE_NAME};
use petstore_core::{
    Field, PetFields, Route, Router, UpdatePlan, validate_for_insert, validate_for_update,
};
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use tokio::sync::broadcast;

use crate::cursor::Cursor;
use crate::error::ProviderError;
use crate::lifecycle::StoreHelper;
use crate::notify::{Change, ChangeKind, ChangeNotifier};

/// Row filter after the route has been applied: a SQL predicate using
/// anonymous `?` placeholders plus the values bound to them.
#[derive(Debug, Default)]
struct Filter {
    clause: Option<String>,
    args: Vec<Value>,
}

impl Filter {
    fn from_caller(selection: Option<&str>, selection_args: &[&str]) -> Self {
        Self {
            clause: selection.filter(|s| !s.trim().is_empty()).map(str::to_string),
            args: selection_args
                .iter()
                .map(|arg| Value::Text((*arg).to_string()))
                .collect(),
        }
    }

    fn for_id(id: i64) -> Self {
        Self {
            clause: Some(format!("{COLUMN_ID} = ?")),
            args: vec![Value::Integer(id)],
        }
    }

    fn where_sql(&self) -> String {
        match &self.clause {
            Some(clause) => format!(" WHERE {clause}"),
            None => String::new(),
        }
    }
}

/// Entry point for all reads and writes of pet records.
///
/// Stateless across calls: every operation classifies its URI against the
/// owned [`Router`], acquires the shared store handle for one statement, and
/// releases it before returning. Calls block for the duration of the
/// statement; dispatch them off any latency-sensitive thread.
pub struct PetGateway {
    store: StoreHelper,
    router: Router,
    notifier: ChangeNotifier,
}

impl PetGateway {
    pub fn new(store: StoreHelper, router: Router) -> Self {
        Self {
            store,
            router,
            notifier: ChangeNotifier::new(),
        }
    }

    /// Gateway over the store file at `path`, serving URIs under `authority`.
    /// The file is created on first use.
    pub fn open(path: impl Into<PathBuf>, authority: &str) -> Self {
        Self::new(StoreHelper::new(path), Router::new(authority))
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn store(&self) -> &StoreHelper {
        &self.store
    }

    /// Observe changes committed through this gateway.
    pub fn subscribe(&self) -> broadcast::Receiver<Change> {
        self.notifier.subscribe()
    }

    /// Query rows under `uri`. For an item URI the caller's selection is
    /// replaced by an id match. `projection` of `None` selects every column.
    pub fn query(
        &self,
        uri: &str,
        projection: Option<&[&str]>,
        selection: Option<&str>,
        selection_args: &[&str],
        sort_order: Option<&str>,
    ) -> Result<Cursor, ProviderError> {
        let route = self.router.classify(uri)?;
        let filter = self.route_filter(route, uri, selection, selection_args);

        let columns = match projection {
            Some(columns) if !columns.is_empty() => {
                for column in columns {
                    if !PETS_TABLE.has_column(column) {
                        return Err(ProviderError::UnknownColumn((*column).to_string()));
                    }
                }
                columns.join(", ")
            }
            _ => PETS_TABLE.column_names().join(", "),
        };

        let mut sql = format!("SELECT {columns} FROM {TABLE_NAME}{}", filter.where_sql());
        if let Some(order) = sort_order.filter(|s| !s.trim().is_empty()) {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }
        tracing::debug!(%sql, "query");

        let conn = self.store.open_for_read()?;
        let mut stmt = conn.prepare(&sql)?;
        Cursor::capture(&mut stmt, params_from_iter(filter.args.iter()))
    }

    /// Insert a pet into the collection and return the URI of the new row.
    pub fn insert(&self, uri: &str, fields: &PetFields) -> Result<String, ProviderError> {
        match self.router.classify(uri)? {
            Route::Collection => {}
            Route::Item(_) => {
                return Err(ProviderError::UnsupportedOperation {
                    operation: "insert",
                    uri: uri.to_string(),
                });
            }
        }

        validate_for_insert(fields)?;

        let (columns, values) = assignments(fields);
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {TABLE_NAME} ({}) VALUES ({placeholders})",
            columns.join(", ")
        );

        let id = {
            let conn = self.store.open_for_write()?;
            let inserted = conn
                .execute(&sql, params_from_iter(values.iter()))
                .map_err(|source| ProviderError::InsertFailed {
                    uri: uri.to_string(),
                    source: Some(source),
                })?;
            if inserted != 1 {
                return Err(ProviderError::InsertFailed {
                    uri: uri.to_string(),
                    source: None,
                });
            }
            conn.last_insert_rowid()
        };

        if id <= 0 {
            return Err(ProviderError::InsertFailed {
                uri: uri.to_string(),
                source: None,
            });
        }

        let new_uri = self.router.item_uri(id);
        tracing::info!(id, uri = %new_uri, "pet inserted");
        self.notifier.notify(Change {
            uri: new_uri.clone(),
            kind: ChangeKind::Inserted,
            rows: 1,
        });
        Ok(new_uri)
    }

    /// Update the supplied fields of every row matched by `uri` and the
    /// selection. Returns the number of rows changed. An empty field set
    /// changes nothing and never reaches the store.
    pub fn update(
        &self,
        uri: &str,
        fields: &PetFields,
        selection: Option<&str>,
        selection_args: &[&str],
    ) -> Result<usize, ProviderError> {
        let route = self.router.classify(uri)?;

        if validate_for_update(fields)? == UpdatePlan::NoOp {
            tracing::debug!(uri, "empty update, nothing to do");
            return Ok(0);
        }

        let filter = self.route_filter(route, uri, selection, selection_args);
        let (columns, mut values) = assignments(fields);
        let set_clause = columns
            .iter()
            .map(|column| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {TABLE_NAME} SET {set_clause}{}",
            filter.where_sql()
        );
        values.extend(filter.args);

        let count = {
            let conn = self.store.open_for_write()?;
            conn.execute(&sql, params_from_iter(values.iter()))?
        };

        if count > 0 {
            tracing::info!(uri, rows = count, "pets updated");
            self.notifier.notify(Change {
                uri: uri.to_string(),
                kind: ChangeKind::Updated,
                rows: count,
            });
        }
        Ok(count)
    }

    /// Delete every row matched by `uri` and the selection. Returns the
    /// number of rows removed.
    pub fn delete(
        &self,
        uri: &str,
        selection: Option<&str>,
        selection_args: &[&str],
    ) -> Result<usize, ProviderError> {
        let route = self.router.classify(uri)?;
        let filter = self.route_filter(route, uri, selection, selection_args);
        let sql = format!("DELETE FROM {TABLE_NAME}{}", filter.where_sql());

        let count = {
            let conn = self.store.open_for_write()?;
            conn.execute(&sql, params_from_iter(filter.args.iter()))?
        };

        if count > 0 {
            tracing::info!(uri, rows = count, "pets deleted");
            self.notifier.notify(Change {
                uri: uri.to_string(),
                kind: ChangeKind::Deleted,
                rows: count,
            });
        }
        Ok(count)
    }

    /// Content kind marker for `uri`: a list marker for the collection, an
    /// item marker for a single pet.
    pub fn resource_type(&self, uri: &str) -> Result<String, ProviderError> {
        let route = self.router.classify(uri)?;
        Ok(route.content_kind(self.router.authority()))
    }

    fn route_filter(
        &self,
        route: Route,
        uri: &str,
        selection: Option<&str>,
        selection_args: &[&str],
    ) -> Filter {
        match route {
            Route::Collection => Filter::from_caller(selection, selection_args),
            Route::Item(id) => {
                if selection.is_some() || !selection_args.is_empty() {
                    tracing::warn!(uri, "selection ignored for item uri");
                }
                Filter::for_id(id)
            }
        }
    }
}

/// Column names and bound values for every supplied field, in column order.
/// A field supplied as null binds SQL NULL.
fn assignments(fields: &PetFields) -> (Vec<&'static str>, Vec<Value>) {
    let mut columns = Vec::with_capacity(4);
    let mut values = Vec::with_capacity(4);

    for field in fields.present() {
        let value = match field {
            Field::Name => text_value(&fields.name),
            Field::Breed => text_value(&fields.breed),
            Field::Gender => integer_value(fields.gender),
            Field::Weight => integer_value(fields.weight),
        };
        columns.push(field.column());
        values.push(value);
    }

    (columns, values)
}

fn text_value(field: &Option<Option<String>>) -> Value {
    match field {
        Some(Some(text)) => Value::Text(text.clone()),
        _ => Value::Null,
    }
}

fn integer_value(field: Option<Option<i64>>) -> Value {
    match field {
        Some(Some(v)) => Value::Integer(v),
        _ => Value::Null,
    }
}
