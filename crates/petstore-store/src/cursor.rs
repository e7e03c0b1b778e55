// ABOUTME: Forward-only, single-pass row sequence returned by gateway queries.
// ABOUTME: Rows are captured while the store handle is held, so iteration never blocks writers.

use std::sync::Arc;

use petstore_core::contract::{COLUMN_BREED, COLUMN_GENDER, COLUMN_ID, COLUMN_NAME, COLUMN_WEIGHT};
use petstore_core::{Gender, Pet};
use rusqlite::Statement;
use rusqlite::types::Value;

use crate::error::ProviderError;

/// The rows of one query, consumed front to back.
///
/// The cursor holds a snapshot taken at query time; later writes are not
/// reflected. Dropping it, or calling [`Cursor::close`], releases the rows.
#[derive(Debug)]
pub struct Cursor {
    columns: Arc<[String]>,
    rows: std::vec::IntoIter<Vec<Value>>,
}

impl Cursor {
    /// Step a prepared statement to completion and capture every row.
    pub(crate) fn capture(
        stmt: &mut Statement<'_>,
        params: impl rusqlite::Params,
    ) -> Result<Self, ProviderError> {
        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut raw = stmt.query(params)?;
        while let Some(row) = raw.next()? {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                values.push(row.get::<_, Value>(idx)?);
            }
            rows.push(values);
        }

        Ok(Self {
            columns,
            rows: rows.into_iter(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows not yet consumed.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    /// Release the cursor before the end of its scope.
    pub fn close(self) {}

    /// Consume the cursor, converting every row into a [`Pet`].
    pub fn into_pets(self) -> Result<Vec<Pet>, ProviderError> {
        self.map(|row| row.to_pet()).collect()
    }
}

impl Iterator for Cursor {
    type Item = CursorRow;

    fn next(&mut self) -> Option<Self::Item> {
        let values = self.rows.next()?;
        Some(CursorRow {
            columns: Arc::clone(&self.columns),
            values,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for Cursor {}

/// One row of a cursor, addressed by column name.
#[derive(Debug, Clone)]
pub struct CursorRow {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl CursorRow {
    pub fn get(&self, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values.get(idx)
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        match self.get(column)? {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_text(&self, column: &str) -> Option<&str> {
        match self.get(column)? {
            Value::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Build a [`Pet`] from this row. Needs every column of the table in the
    /// projection.
    pub fn to_pet(&self) -> Result<Pet, ProviderError> {
        let missing = |column: &str| ProviderError::UnknownColumn(column.to_string());

        let id = self.get_i64(COLUMN_ID).ok_or_else(|| missing(COLUMN_ID))?;
        let name = self
            .get_text(COLUMN_NAME)
            .ok_or_else(|| missing(COLUMN_NAME))?
            .to_string();
        let breed = match self.get(COLUMN_BREED) {
            Some(Value::Text(breed)) => Some(breed.clone()),
            Some(Value::Null) => None,
            _ => return Err(missing(COLUMN_BREED)),
        };
        let code = self
            .get_i64(COLUMN_GENDER)
            .ok_or_else(|| missing(COLUMN_GENDER))?;
        let gender = Gender::from_code(code).ok_or(ProviderError::InvalidStoredValue {
            column: COLUMN_GENDER,
            value: code,
        })?;
        let weight = self
            .get_i64(COLUMN_WEIGHT)
            .ok_or_else(|| missing(COLUMN_WEIGHT))?;

        Ok(Pet {
            id,
            name,
            breed,
            gender,
            weight,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn seeded() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE pets (_id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL,
                breed TEXT, gender INTEGER NOT NULL, weight INTEGER NOT NULL DEFAULT 0);
             INSERT INTO pets (name, breed, gender, weight) VALUES ('Toto', 'Terrier', 1, 7);
             INSERT INTO pets (name, breed, gender, weight) VALUES ('Kit', NULL, 2, 3);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn cursor_is_forward_only_snapshot() {
        let conn = seeded();
        let mut stmt = conn.prepare("SELECT * FROM pets ORDER BY _id").unwrap();
        let mut cursor = Cursor::capture(&mut stmt, []).unwrap();
        drop(stmt);

        assert_eq!(cursor.columns(), ["_id", "name", "breed", "gender", "weight"]);
        assert_eq!(cursor.remaining(), 2);

        conn.execute("DELETE FROM pets", []).unwrap();

        let first = cursor.next().unwrap();
        assert_eq!(first.get_text("name"), Some("Toto"));
        assert_eq!(cursor.remaining(), 1);
        let second = cursor.next().unwrap();
        assert_eq!(second.get("breed"), Some(&Value::Null));
        assert!(cursor.next().is_none());
    }

    #[test]
    fn rows_convert_to_pets() {
        let conn = seeded();
        let mut stmt = conn.prepare("SELECT * FROM pets ORDER BY _id").unwrap();
        let pets = Cursor::capture(&mut stmt, []).unwrap().into_pets().unwrap();

        assert_eq!(pets.len(), 2);
        assert_eq!(pets[0].name, "Toto");
        assert_eq!(pets[0].breed.as_deref(), Some("Terrier"));
        assert_eq!(pets[0].gender, Gender::Male);
        assert_eq!(pets[1].breed, None);
        assert_eq!(pets[1].gender, Gender::Female);
    }

    #[test]
    fn partial_projection_cannot_become_pet() {
        let conn = seeded();
        let mut stmt = conn.prepare("SELECT name FROM pets").unwrap();
        let mut cursor = Cursor::capture(&mut stmt, []).unwrap();
        let row = cursor.next().unwrap();
        assert!(row.get_i64("_id").is_none());
        assert!(matches!(row.to_pet(), Err(ProviderError::UnknownColumn(_))));
        cursor.close();
    }

    #[test]
    fn out_of_range_gender_names_column_and_value() {
        let conn = seeded();
        conn.execute("UPDATE pets SET gender = 5 WHERE name = 'Toto'", [])
            .unwrap();
        let mut stmt = conn.prepare("SELECT * FROM pets ORDER BY _id").unwrap();
        let err = Cursor::capture(&mut stmt, []).unwrap().into_pets().unwrap_err();

        assert!(matches!(
            err,
            ProviderError::InvalidStoredValue {
                column: "gender",
                value: 5
            }
        ));
        assert_eq!(err.to_string(), "stored value 5 in column gender is out of range");
    }
}
