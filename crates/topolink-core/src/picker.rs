//! Add-device picker state and in-flight collaborator requests.

use crate::collaborators::CatalogEntry;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Token tying a collaborator result back to the request that asked for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub(crate) u64);

/// Candidate devices for the current category.
#[derive(Debug, Clone, Default)]
pub struct DevicePicker {
    category: Option<String>,
    entries: Vec<CatalogEntry>,
    pending: Option<RequestId>,
}

impl DevicePicker {
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Switch to a category and wait for `request`. Clears the old list.
    pub(crate) fn begin(&mut self, category: &str, request: RequestId) {
        self.category = Some(category.to_string());
        self.entries.clear();
        self.pending = Some(request);
    }

    /// Accept the result only if it answers the latest request.
    pub(crate) fn accepts(&self, request: RequestId) -> bool {
        self.pending == Some(request)
    }

    pub(crate) fn fill(&mut self, entries: Vec<CatalogEntry>) {
        self.entries = entries;
        self.pending = None;
    }

    pub(crate) fn fail(&mut self) {
        self.entries.clear();
        self.pending = None;
    }
}

/// A catalog device dropped on the surface, waiting for its port inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDrop {
    pub entry: CatalogEntry,
    /// Category tag, also used as the icon type.
    pub kind: String,
    /// Drop position in content space.
    pub position: Point,
}
