use crate::editor::PointerButton;
use crate::render::GizmoMode;
use crate::ui::ToolbarCommand;
use winit::event::{Modifiers, MouseButton, MouseScrollDelta};
use winit::keyboard::{KeyCode, PhysicalKey};

/// What a key press asks the shell to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Toolbar(ToolbarCommand),
    GizmoMode(GizmoMode),
    Quit,
    None,
}

pub fn map_mouse_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        _ => None,
    }
}

/// Wheel travel in notches; pixel deltas are scaled down to roughly one
/// notch per 40 px.
pub fn wheel_notches(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 40.0,
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct InputState {
    modifiers: Modifiers,
}

impl InputState {
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    fn command_held(&self) -> bool {
        let state = self.modifiers.state();
        state.control_key() || state.super_key()
    }

    pub fn handle_key(&self, key: PhysicalKey, pressed: bool) -> InputAction {
        if !pressed {
            return InputAction::None;
        }
        let PhysicalKey::Code(code) = key else {
            return InputAction::None;
        };
        if self.command_held() {
            return match code {
                KeyCode::KeyS => InputAction::Toolbar(ToolbarCommand::ExportScene),
                KeyCode::KeyO => InputAction::Toolbar(ToolbarCommand::ImportScene),
                _ => InputAction::None,
            };
        }
        match code {
            KeyCode::Escape => InputAction::Quit,
            KeyCode::Digit1 => InputAction::Toolbar(ToolbarCommand::AddCube),
            KeyCode::Digit2 => InputAction::Toolbar(ToolbarCommand::AddSphere),
            KeyCode::Digit3 => InputAction::Toolbar(ToolbarCommand::AddCylinder),
            KeyCode::Digit4 => InputAction::Toolbar(ToolbarCommand::AddTorus),
            KeyCode::KeyM => InputAction::Toolbar(ToolbarCommand::AddModel),
            KeyCode::KeyW => InputAction::GizmoMode(GizmoMode::Translate),
            KeyCode::KeyE => InputAction::GizmoMode(GizmoMode::Rotate),
            KeyCode::KeyR => InputAction::GizmoMode(GizmoMode::Scale),
            _ => InputAction::None,
        }
    }
}
