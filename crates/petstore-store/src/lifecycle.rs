// ABOUTME: Opens or creates the SQLite store, applies the schema once, and stamps its version.
// ABOUTME: Guarantees single initialization under concurrent first access via double-checked locking.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::Duration;

use petstore_core::contract::{DATABASE_VERSION, PETS_TABLE};
use rusqlite::{Connection, TransactionBehavior};
use thiserror::Error;

/// Errors raised while opening or preparing the store.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("cannot create store directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open store at {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("schema setup failed: {0}")]
    Schema(#[from] rusqlite::Error),

    #[error("store connection lock poisoned")]
    Poisoned,
}

/// Called when the stored schema version differs from `DATABASE_VERSION`.
/// Runs inside the same transaction that restamps the version.
pub trait VersionHook: Send + Sync {
    fn on_version_change(&self, conn: &Connection, old: i32, new: i32) -> rusqlite::Result<()>;
}

/// Leaves existing data untouched on a version change.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMigration;

impl VersionHook for NoMigration {
    fn on_version_change(&self, _conn: &Connection, _old: i32, _new: i32) -> rusqlite::Result<()> {
        Ok(())
    }
}

/// A handle to the shared connection. Released when dropped.
pub type StoreHandle<'a> = MutexGuard<'a, Connection>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Lazily opens the store file and hands out the process-wide connection.
/// Construction never touches the disk; the first open does.
pub struct StoreHelper {
    path: PathBuf,
    hook: Box<dyn VersionHook>,
    conn: OnceLock<Mutex<Connection>>,
    init_lock: Mutex<()>,
}

impl StoreHelper {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_hook(path, NoMigration)
    }

    pub fn with_hook(path: impl Into<PathBuf>, hook: impl VersionHook + 'static) -> Self {
        Self {
            path: path.into(),
            hook: Box::new(hook),
            conn: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Handle for reads. SQLite serializes writers itself, so reads and writes
    /// share the one connection.
    pub fn open_for_read(&self) -> Result<StoreHandle<'_>, LifecycleError> {
        self.connection()?.lock().map_err(|_| LifecycleError::Poisoned)
    }

    /// Handle for writes.
    pub fn open_for_write(&self) -> Result<StoreHandle<'_>, LifecycleError> {
        self.connection()?.lock().map_err(|_| LifecycleError::Poisoned)
    }

    /// The schema version currently stamped in the store.
    pub fn version(&self) -> Result<i32, LifecycleError> {
        let conn = self.open_for_read()?;
        Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
    }

    fn connection(&self) -> Result<&Mutex<Connection>, LifecycleError> {
        if let Some(conn) = self.conn.get() {
            return Ok(conn);
        }

        let _guard = self.init_lock.lock().map_err(|_| LifecycleError::Poisoned)?;
        // Another caller may have finished while we waited for the lock.
        if let Some(conn) = self.conn.get() {
            return Ok(conn);
        }

        let conn = self.open_connection()?;
        Ok(self.conn.get_or_init(|| Mutex::new(conn)))
    }

    fn open_connection(&self) -> Result<Connection, LifecycleError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| LifecycleError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let mut conn = Connection::open(&self.path).map_err(|source| LifecycleError::Open {
            path: self.path.clone(),
            source,
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        self.prepare_schema(&mut conn)?;

        tracing::debug!(path = %self.path.display(), "store opened");
        Ok(conn)
    }

    /// Create the table on a fresh store, or run the version hook when the
    /// stamped version differs. The version is re-read inside an immediate
    /// transaction so a second process racing on the same file sees the
    /// first one's work.
    fn prepare_schema(&self, conn: &mut Connection) -> Result<(), LifecycleError> {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let stored: i32 = tx.pragma_query_value(None, "user_version", |row| row.get(0))?;

        if stored == DATABASE_VERSION {
            tx.commit()?;
            return Ok(());
        }

        if stored == 0 {
            tx.execute_batch(&PETS_TABLE.create_statement())?;
            tracing::info!(
                path = %self.path.display(),
                version = DATABASE_VERSION,
                "created pets store"
            );
        } else {
            tracing::warn!(
                old = stored,
                new = DATABASE_VERSION,
                "store version changed; running version hook"
            );
            self.hook.on_version_change(&tx, stored, DATABASE_VERSION)?;
        }

        tx.pragma_update(None, "user_version", DATABASE_VERSION)?;
        tx.commit()?;
        Ok(())
    }
}
