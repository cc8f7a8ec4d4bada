use crate::editor::arbiter::InteractionMode;
use crate::editor::context_menu::ContextMenuAction;
use crate::editor::EditorContext;
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarCommand {
    AddCube,
    AddSphere,
    AddCylinder,
    AddTorus,
    AddModel,
    ExportScene,
    ImportScene,
}

impl ToolbarCommand {
    pub const ALL: [ToolbarCommand; 7] = [
        ToolbarCommand::AddCube,
        ToolbarCommand::AddSphere,
        ToolbarCommand::AddCylinder,
        ToolbarCommand::AddTorus,
        ToolbarCommand::AddModel,
        ToolbarCommand::ExportScene,
        ToolbarCommand::ImportScene,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ToolbarCommand::AddCube => "add-cube",
            ToolbarCommand::AddSphere => "add-sphere",
            ToolbarCommand::AddCylinder => "add-cylinder",
            ToolbarCommand::AddTorus => "add-torus",
            ToolbarCommand::AddModel => "add-model",
            ToolbarCommand::ExportScene => "export-scene",
            ToolbarCommand::ImportScene => "import-scene",
        }
    }

    /// Factory name for the four add-primitive buttons.
    pub fn primitive_name(self) -> Option<&'static str> {
        match self {
            ToolbarCommand::AddCube => Some("cube"),
            ToolbarCommand::AddSphere => Some("sphere"),
            ToolbarCommand::AddCylinder => Some("cylinder"),
            ToolbarCommand::AddTorus => Some("torus"),
            _ => None,
        }
    }
}

/// Read-only properties panel. Rotation is shown in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertiesPanel {
    pub mode: &'static str,
    pub name: String,
    pub position: [f32; 3],
    pub rotation_deg: [f32; 3],
    pub scale: [f32; 3],
}

impl PropertiesPanel {
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("{}: {}", self.mode, self.name),
            format!("Position {}", format_triplet(self.position)),
            format!("Rotation {}", format_triplet(self.rotation_deg)),
            format!("Scale    {}", format_triplet(self.scale)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuView {
    pub position: Vec2,
    pub entries: Vec<(ContextMenuAction, &'static str)>,
}

#[derive(Debug, Default)]
pub struct UiState {
    properties: Option<PropertiesPanel>,
    menu: Option<MenuView>,
    summary: String,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-derives everything from the editor; nothing here is authoritative.
    pub fn update(&mut self, editor: &EditorContext) {
        let mode = editor.mode();
        let arbiter = editor.arbiter();
        self.properties = arbiter.snapshot().and_then(|snapshot| {
            let node = editor.registry().get(snapshot.node)?;
            Some(PropertiesPanel {
                mode: mode.label(),
                name: node.name.clone(),
                position: snapshot.position.to_array(),
                rotation_deg: [
                    snapshot.rotation.x.to_degrees(),
                    snapshot.rotation.y.to_degrees(),
                    snapshot.rotation.z.to_degrees(),
                ],
                scale: snapshot.scale.to_array(),
            })
        });
        self.menu = editor.menu().state().map(|state| MenuView {
            position: state.position,
            entries: editor
                .menu()
                .actions(arbiter)
                .into_iter()
                .map(|action| (action, action.label()))
                .collect(),
        });

        let mut summary = match mode {
            InteractionMode::Idle => "Idle".to_string(),
            InteractionMode::Selected(_) => format!("Selected {}", self.focus_name()),
            InteractionMode::Editing(_) => format!(
                "Editing {} ({})",
                self.focus_name(),
                arbiter.gizmo().mode().label()
            ),
        };
        summary.push_str(&format!(" | {} objects", editor.registry().editable_ids().len()));
        let pending = editor.pending_imports();
        if pending > 0 {
            summary.push_str(&format!(" | {pending} importing"));
        }
        self.summary = summary;
    }

    pub fn properties(&self) -> Option<&PropertiesPanel> {
        self.properties.as_ref()
    }

    pub fn menu(&self) -> Option<&MenuView> {
        self.menu.as_ref()
    }

    #[cfg(test)]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn window_title(&self, base: &str) -> String {
        format!("{} - {}", base, self.summary)
    }

    fn focus_name(&self) -> &str {
        self.properties
            .as_ref()
            .map(|panel| panel.name.as_str())
            .unwrap_or("?")
    }
}

fn format_triplet(values: [f32; 3]) -> String {
    format!("{:.2}, {:.2}, {:.2}", values[0], values[1], values[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::editor::PointerButton;

    fn editor() -> EditorContext {
        let mut config = EditorConfig::default();
        config.camera.position = [0.0, 0.5, 8.0];
        config.camera.target = [0.0, 0.5, 0.0];
        EditorContext::new(config)
    }

    #[test]
    fn toolbar_ids_match_commands() {
        let ids: Vec<&str> = ToolbarCommand::ALL.iter().map(|c| c.id()).collect();
        assert_eq!(
            ids,
            vec![
                "add-cube",
                "add-sphere",
                "add-cylinder",
                "add-torus",
                "add-model",
                "export-scene",
                "import-scene"
            ]
        );
        assert_eq!(ToolbarCommand::AddCube.primitive_name(), Some("cube"));
        assert_eq!(ToolbarCommand::AddModel.primitive_name(), None);
    }

    #[test]
    fn idle_has_no_panel() {
        let mut ui = UiState::new();
        ui.update(&editor());
        assert!(ui.properties().is_none());
        assert!(ui.menu().is_none());
        assert_eq!(ui.summary(), "Idle | 0 objects");
    }

    #[test]
    fn selection_and_menu_are_reflected() {
        let mut editor = editor();
        editor.add_primitive("cube").unwrap();
        let click = Vec2::new(640.0, 360.0);
        editor.pointer_down(PointerButton::Secondary, click);

        let mut ui = UiState::new();
        ui.update(&editor);
        let panel = ui.properties().unwrap();
        assert_eq!(panel.mode, "Selected");
        assert_eq!(panel.name, "Box 1");
        assert_eq!(panel.position, [0.0, 0.5, 0.0]);
        assert_eq!(panel.lines()[1], "Position 0.00, 0.50, 0.00");

        let menu = ui.menu().unwrap();
        assert_eq!(menu.position, click);
        assert_eq!(
            menu.entries,
            vec![
                (ContextMenuAction::Delete, "Delete"),
                (ContextMenuAction::EnterEditMode, "Enter edit mode")
            ]
        );
        assert_eq!(ui.window_title("Scene Editor"), "Scene Editor - Selected Box 1 | 1 objects");
    }

    #[test]
    fn editing_shows_gizmo_mode() {
        let mut editor = editor();
        editor.add_primitive("sphere").unwrap();
        editor.pointer_down(PointerButton::Secondary, Vec2::new(640.0, 360.0));
        editor.dispatch_menu_action(ContextMenuAction::EnterEditMode);
        editor.set_gizmo_mode(crate::render::GizmoMode::Rotate);

        let mut ui = UiState::new();
        ui.update(&editor);
        assert_eq!(ui.summary(), "Editing Sphere 1 (Rotate) | 1 objects");
        assert_eq!(ui.properties().unwrap().mode, "Editing");
    }
}
