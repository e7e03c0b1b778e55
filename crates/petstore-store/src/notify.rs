// ABOUTME: Broadcasts change notifications after committed writes, scoped to a resource URI.
// ABOUTME: Sending is synchronous, so the gateway never needs an async runtime to notify.

use tokio::sync::broadcast;

/// What kind of write produced a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Inserted,
    Updated,
    Deleted,
}

/// A committed write under `uri` that touched `rows` rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub uri: String,
    pub kind: ChangeKind,
    pub rows: usize,
}

impl Change {
    /// True when the change is at `uri` itself or lies beneath it, so an
    /// observer of the collection hears about every item.
    pub fn concerns(&self, uri: &str) -> bool {
        is_within(&self.uri, uri)
    }
}

fn is_within(child: &str, parent: &str) -> bool {
    let parent = parent.trim_end_matches('/');
    match child.strip_prefix(parent) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

const CHANNEL_CAPACITY: usize = 256;

/// Fan-out of change notifications to any number of observers.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<Change>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Change> {
        self.tx.subscribe()
    }

    pub fn notify(&self, change: Change) {
        tracing::debug!(uri = %change.uri, kind = ?change.kind, rows = change.rows, "change committed");
        // No subscribers is fine
        let _ = self.tx.send(change);
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
