//! Topolink Core Library
//!
//! Platform-agnostic data model and interaction logic for the Topolink
//! network topology editor.

pub mod camera;
pub mod collaborators;
pub mod config;
pub mod diagram;
pub mod editor;
pub mod entities;
pub mod history;
pub mod input;
pub mod interaction;
pub mod picker;
pub mod ports;

pub use camera::Camera;
pub use collaborators::{
    CatalogEntry, CollaboratorError, CollaboratorResult, DeviceCatalog, PortTelemetry,
    StaticCatalog, StaticTelemetry,
};
pub use config::{ConfigError, EditorConfig};
pub use diagram::{Diagram, DiagramError, DiagramResult, DiagramSnapshot, Hit};
pub use editor::{Editor, Notification, NotificationLevel};
pub use entities::{
    Connection, ConnectionId, Device, DeviceId, DeviceSpec, Entity, Group, GroupId, GroupSpec,
    Port, PortId, PortRef,
};
pub use history::History;
pub use input::{MouseButton, PointerEvent};
pub use interaction::{InteractionController, InteractionOutcome, InteractionState};
pub use picker::{DevicePicker, RequestId};
pub use ports::{PortAnchor, PortSide};
