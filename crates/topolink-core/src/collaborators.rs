//! Boundary to the device catalog and port telemetry services.
//!
//! Both lookups are asynchronous and owned by the host: the editor hands out
//! request tokens, the host drives the futures, and the results are delivered
//! back to the editor whenever they complete.

use crate::entities::Port;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::RwLock;
use thiserror::Error;

/// Collaborator call failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

/// Boxed future for collaborator calls.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A real-world device offered by the add-device picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub ip: String,
}

impl CatalogEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ip: ip.into(),
        }
    }
}

/// Lists candidate devices for a category tag.
pub trait DeviceCatalog: Send + Sync {
    fn lookup(&self, category: &str) -> BoxFuture<'_, CollaboratorResult<Vec<CatalogEntry>>>;
}

/// Reports the live port inventory of a catalog device.
pub trait PortTelemetry: Send + Sync {
    fn ports(&self, device_id: &str) -> BoxFuture<'_, CollaboratorResult<Vec<Port>>>;
}

/// In-memory catalog for tests and demos.
#[derive(Default)]
pub struct StaticCatalog {
    entries: RwLock<HashMap<String, Vec<CatalogEntry>>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, category: impl Into<String>, entry: CatalogEntry) {
        if let Ok(mut entries) = self.entries.write() {
            entries.entry(category.into()).or_default().push(entry);
        }
    }
}

impl DeviceCatalog for StaticCatalog {
    fn lookup(&self, category: &str) -> BoxFuture<'_, CollaboratorResult<Vec<CatalogEntry>>> {
        let category = category.to_string();
        Box::pin(async move {
            let entries = self
                .entries
                .read()
                .map_err(|e| CollaboratorError::Unavailable(format!("lock error: {e}")))?;
            Ok(entries.get(&category).cloned().unwrap_or_default())
        })
    }
}

/// In-memory telemetry for tests and demos.
#[derive(Default)]
pub struct StaticTelemetry {
    ports: RwLock<HashMap<String, Vec<Port>>>,
}

impl StaticTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, device_id: impl Into<String>, ports: Vec<Port>) {
        if let Ok(mut map) = self.ports.write() {
            map.insert(device_id.into(), ports);
        }
    }
}

impl PortTelemetry for StaticTelemetry {
    fn ports(&self, device_id: &str) -> BoxFuture<'_, CollaboratorResult<Vec<Port>>> {
        let device_id = device_id.to_string();
        Box::pin(async move {
            let map = self
                .ports
                .read()
                .map_err(|e| CollaboratorError::Unavailable(format!("lock error: {e}")))?;
            map.get(&device_id)
                .cloned()
                .ok_or(CollaboratorError::NotFound(device_id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollster::block_on;

    #[test]
    fn test_catalog_lookup() {
        let catalog = StaticCatalog::new();
        catalog.insert("switch", CatalogEntry::new("sw-1", "core-sw-1", "10.0.0.1"));
        catalog.insert("switch", CatalogEntry::new("sw-2", "core-sw-2", "10.0.0.2"));

        let entries = block_on(catalog.lookup("switch")).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].name, "core-sw-2");
    }

    #[test]
    fn test_unknown_category_is_empty() {
        let catalog = StaticCatalog::new();
        assert!(block_on(catalog.lookup("router")).unwrap().is_empty());
    }

    #[test]
    fn test_telemetry_ports() {
        let telemetry = StaticTelemetry::new();
        telemetry.insert("sw-1", vec![Port::new(1, "Gi0/1", 1e9)]);

        let ports = block_on(telemetry.ports("sw-1")).unwrap();
        assert_eq!(ports, vec![Port::new(1, "Gi0/1", 1e9)]);
    }

    #[test]
    fn test_telemetry_not_found() {
        let telemetry = StaticTelemetry::new();
        let result = block_on(telemetry.ports("missing"));
        assert_eq!(result, Err(CollaboratorError::NotFound("missing".into())));
    }
}
