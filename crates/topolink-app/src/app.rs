//! Scripted editing session driving the editor like a host page would.

use kurbo::{Point, Size, Vec2};
use std::fmt;
use std::path::Path;
use thiserror::Error;
use topolink_core::ports::port_position;
use topolink_core::{
    CatalogEntry, ConfigError, DeviceCatalog, DeviceId, Editor, EditorConfig, GroupSpec,
    MouseButton, Notification, NotificationLevel, PointerEvent, Port, PortId, PortTelemetry,
    StaticCatalog, StaticTelemetry,
};
use topolink_render::{DisplayList, DisplayListRenderer, GridStyle, RenderContext, Renderer};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to export snapshot: {0}")]
    Export(#[from] serde_json::Error),
    #[error("session step failed: {0}")]
    Session(String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub grid_style: GridStyle,
    pub editor: EditorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Topolink".to_string(),
            width: 1280,
            height: 800,
            grid_style: GridStyle::Lines,
            editor: EditorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults, with editor settings read from `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut config = Self::default();
        if let Some(path) = path {
            log::info!("Loading config from {}", path.display());
            config.editor = EditorConfig::load(path)?;
        }
        Ok(config)
    }

    fn viewport(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }
}

/// Outcome of a session run.
#[derive(Debug)]
pub struct SessionReport {
    pub title: String,
    pub devices: usize,
    pub groups: usize,
    pub connections: usize,
    pub notifications: Vec<Notification>,
    pub display_list: DisplayList,
    pub snapshot_json: String,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(
            f,
            "  {} devices, {} groups, {} connections",
            self.devices, self.groups, self.connections
        )?;
        writeln!(
            f,
            "  frame: generation {}, {} draw items",
            self.display_list.generation,
            self.display_list.items.len()
        )?;
        for note in &self.notifications {
            let level = match note.level {
                NotificationLevel::Info => "info",
                NotificationLevel::Warning => "warning",
                NotificationLevel::Error => "error",
            };
            writeln!(f, "  [{level}] {}", note.message)?;
        }
        Ok(())
    }
}

/// In-memory inventory used by the scripted session.
pub fn demo_collaborators() -> (StaticCatalog, StaticTelemetry) {
    let catalog = StaticCatalog::new();
    catalog.insert("switch", CatalogEntry::new("sw-core-1", "core-sw-1", "10.0.0.1"));
    catalog.insert("switch", CatalogEntry::new("sw-access-2", "access-sw-2", "10.0.0.2"));
    catalog.insert("firewall", CatalogEntry::new("fw-edge", "edge-fw", "10.0.0.254"));

    let telemetry = StaticTelemetry::new();
    let uplinks = |prefix: &str| {
        (0..4)
            .map(|i| Port::new(i, format!("{prefix}0/{i}"), 1e9))
            .collect::<Vec<_>>()
    };
    telemetry.insert("sw-core-1", uplinks("Te"));
    telemetry.insert("sw-access-2", uplinks("Gi"));
    // No telemetry for the firewall: its drop exercises the failure path.
    (catalog, telemetry)
}

pub struct App {
    config: AppConfig,
    editor: Editor,
    renderer: DisplayListRenderer,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let editor = Editor::new(config.editor.clone());
        Self {
            config,
            editor,
            renderer: DisplayListRenderer::new(),
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Load config, run the scripted session and report the result.
    pub async fn run(config_path: Option<&Path>) -> Result<SessionReport, AppError> {
        let config = AppConfig::load(config_path)?;
        let (catalog, telemetry) = demo_collaborators();
        let mut app = App::new(config);
        app.run_session(&catalog, &telemetry).await?;
        app.report()
    }

    /// Place devices from the catalog, group one and wire two together.
    pub async fn run_session(
        &mut self,
        catalog: &dyn DeviceCatalog,
        telemetry: &dyn PortTelemetry,
    ) -> Result<(), AppError> {
        let mut switches = self.place_category(catalog, telemetry, "switch", 100.0).await;
        self.place_category(catalog, telemetry, "firewall", 300.0).await;

        let (Some(access), Some(core)) = (switches.pop(), switches.pop()) else {
            return Err(AppError::Session("catalog returned fewer than two switches".into()));
        };

        let room = self
            .editor
            .add_group(GroupSpec::new("Server room", Point::new(60.0, 60.0)));
        let center = self.device_center(core)?;
        self.drag(center, center + Vec2::new(20.0, 20.0));
        if self.editor.diagram().device(core).and_then(|d| d.group_id()) != Some(room) {
            log::warn!("core switch did not land in the server room");
        }

        let from = self.port_on_screen(access, 1)?;
        let to = self.port_on_screen(core, 0)?;
        self.drag(from, to);

        // A mistaken move, undone.
        self.editor.move_device(access, 900.0, 900.0);
        self.editor.undo();

        let viewport = self.config.viewport();
        self.editor.fit_to_content(viewport);
        Ok(())
    }

    async fn place_category(
        &mut self,
        catalog: &dyn DeviceCatalog,
        telemetry: &dyn PortTelemetry,
        category: &str,
        y: f64,
    ) -> Vec<DeviceId> {
        let lookup = self.editor.begin_catalog_lookup(category);
        let result = catalog.lookup(category).await;
        self.editor.complete_catalog_lookup(lookup, result);

        let entries = self.editor.picker().entries().to_vec();
        let mut placed = Vec::with_capacity(entries.len());
        for (i, entry) in entries.into_iter().enumerate() {
            let position = Point::new(100.0 + i as f64 * 300.0, y);
            let catalog_id = entry.id.clone();
            let request = self.editor.begin_device_drop(entry, category, position);
            let ports = telemetry.ports(&catalog_id).await;
            if let Some(id) = self.editor.complete_device_drop(request, ports) {
                placed.push(id);
            }
        }
        placed
    }

    fn device_center(&self, id: DeviceId) -> Result<Point, AppError> {
        let device = self
            .editor
            .diagram()
            .device(id)
            .ok_or_else(|| AppError::Session(format!("device {id} missing")))?;
        Ok(self.editor.camera().content_to_screen(device.center()))
    }

    fn port_on_screen(&self, id: DeviceId, port: PortId) -> Result<Point, AppError> {
        let device = self
            .editor
            .diagram()
            .device(id)
            .ok_or_else(|| AppError::Session(format!("device {id} missing")))?;
        Ok(self
            .editor
            .camera()
            .content_to_screen(port_position(device, port)))
    }

    fn drag(&mut self, from: Point, to: Point) {
        self.editor.handle_pointer_event(PointerEvent::Down {
            position: from,
            button: MouseButton::Left,
        });
        self.editor
            .handle_pointer_event(PointerEvent::Move { position: to });
        self.editor.handle_pointer_event(PointerEvent::Up {
            position: to,
            button: MouseButton::Left,
        });
    }

    /// Build the current frame and collect the session summary.
    pub fn report(&mut self) -> Result<SessionReport, AppError> {
        let ctx = RenderContext::new(&self.editor, self.config.viewport())
            .with_grid(self.config.grid_style);
        self.renderer.build_scene(&ctx);

        let diagram = self.editor.diagram();
        Ok(SessionReport {
            title: self.config.title.clone(),
            devices: diagram.device_count(),
            groups: diagram.group_count(),
            connections: diagram.connections().len(),
            notifications: self.editor.drain_notifications(),
            display_list: self.renderer.take_display_list(),
            snapshot_json: self.editor.export_snapshot()?,
        })
    }
}
