// ABOUTME: Classifies resource URIs into the pets collection or a single pet by id.
// ABOUTME: Matching is structural: segment count plus an all-digit trailing segment for items.

use thiserror::Error;

use crate::contract::{self, CONTENT_SCHEME, PATH_PETS};

/// Errors produced while classifying a resource URI.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("unrecognized resource: {0}")]
    Unrecognized(String),
}

/// The result of classifying a resource URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The whole pets collection.
    Collection,
    /// One pet, addressed by its id.
    Item(i64),
}

impl Route {
    /// Content kind marker for this route under the given authority.
    pub fn content_kind(&self, authority: &str) -> String {
        match self {
            Route::Collection => contract::list_kind(authority),
            Route::Item(_) => contract::item_kind(authority),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// One or more ASCII digits that fit in an i64.
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteKind {
    Collection,
    Item,
}

#[derive(Debug, Clone)]
struct RouteEntry {
    segments: Vec<Segment>,
    kind: RouteKind,
}

/// An immutable routing table for one scheme and authority. Built once and
/// owned by whoever dispatches requests.
#[derive(Debug, Clone)]
pub struct Router {
    scheme: String,
    authority: String,
    entries: Vec<RouteEntry>,
}

impl Router {
    /// Build the table for `content://<authority>/pets` and
    /// `content://<authority>/pets/#`.
    pub fn new(authority: impl Into<String>) -> Self {
        let entries = vec![
            RouteEntry {
                segments: vec![Segment::Literal(PATH_PETS.to_string())],
                kind: RouteKind::Collection,
            },
            RouteEntry {
                segments: vec![Segment::Literal(PATH_PETS.to_string()), Segment::Number],
                kind: RouteKind::Item,
            },
        ];

        Self {
            scheme: CONTENT_SCHEME.to_string(),
            authority: authority.into(),
            entries,
        }
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn collection_uri(&self) -> String {
        format!("{}://{}/{}", self.scheme, self.authority, PATH_PETS)
    }

    pub fn item_uri(&self, id: i64) -> String {
        format!("{}/{}", self.collection_uri(), id)
    }

    /// Classify a URI. Any `?query` or `#fragment` is ignored, and empty path
    /// segments are skipped, so a trailing slash does not change the result.
    pub fn classify(&self, uri: &str) -> Result<Route, RouteError> {
        let unrecognized = || RouteError::Unrecognized(uri.to_string());

        let (scheme, rest) = uri.split_once("://").ok_or_else(unrecognized)?;
        let rest = rest.split(['?', '#']).next().unwrap_or(rest);
        let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
        if scheme != self.scheme || authority != self.authority {
            return Err(unrecognized());
        }

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        for entry in &self.entries {
            if let Some(route) = entry.match_segments(&segments) {
                tracing::debug!(uri, ?route, "classified resource");
                return Ok(route);
            }
        }

        Err(unrecognized())
    }
}

impl RouteEntry {
    fn match_segments(&self, segments: &[&str]) -> Option<Route> {
        if segments.len() != self.segments.len() {
            return None;
        }

        let mut id = None;
        for (pattern, actual) in self.segments.iter().zip(segments) {
            match pattern {
                Segment::Literal(expected) => {
                    if expected != actual {
                        return None;
                    }
                }
                Segment::Number => {
                    if !actual.bytes().all(|b| b.is_ascii_digit()) {
                        return None;
                    }
                    id = Some(actual.parse::<i64>().ok()?);
                }
            }
        }

        match self.kind {
            RouteKind::Collection => Some(Route::Collection),
            RouteKind::Item => id.map(Route::Item),
        }
    }
}
