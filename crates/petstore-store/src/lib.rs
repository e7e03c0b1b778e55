// ABOUTME: Persistence layer for petstore: SQLite lifecycle, row cursors, and the CRUD gateway.
// ABOUTME: Callers address records by URI; the gateway routes, validates, writes, and notifies.

pub mod cursor;
pub mod error;
pub mod gateway;
pub mod lifecycle;
pub mod notify;

pub use cursor::{Cursor, CursorRow};
pub use error::ProviderError;
pub use gateway::PetGateway;
pub use lifecycle::{LifecycleError, NoMigration, StoreHandle, StoreHelper, VersionHook};
pub use notify::{Change, ChangeKind, ChangeNotifier};
