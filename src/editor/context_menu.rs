use crate::editor::arbiter::InteractionArbiter;
use crate::scene::{NodeId, SceneRegistry};
use glam::Vec2;

pub const MENU_WIDTH: f32 = 180.0;
pub const MENU_ITEM_HEIGHT: f32 = 28.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextMenuAction {
    Delete,
    EnterEditMode,
    CancelEditMode,
}

impl ContextMenuAction {
    pub fn label(self) -> &'static str {
        match self {
            ContextMenuAction::Delete => "Delete",
            ContextMenuAction::EnterEditMode => "Enter edit mode",
            ContextMenuAction::CancelEditMode => "Cancel edit mode",
        }
    }
}

/// Open menu: top-left corner in client pixels plus the node it was opened on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextMenuState {
    pub position: Vec2,
    pub target: NodeId,
}

#[derive(Debug, Default)]
pub struct ContextMenuController {
    state: Option<ContextMenuState>,
}

impl ContextMenuController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Option<&ContextMenuState> {
        self.state.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    pub fn open(&mut self, position: Vec2, target: NodeId) {
        self.state = Some(ContextMenuState { position, target });
    }

    pub fn close(&mut self) {
        self.state = None;
    }

    /// Delete always, plus whichever of enter/cancel matches the gizmo state.
    pub fn actions(&self, arbiter: &InteractionArbiter) -> Vec<ContextMenuAction> {
        let Some(state) = self.state else {
            return Vec::new();
        };
        let toggle = if arbiter.attached() == Some(state.target) {
            ContextMenuAction::CancelEditMode
        } else {
            ContextMenuAction::EnterEditMode
        };
        vec![ContextMenuAction::Delete, toggle]
    }

    pub fn contains(&self, point: Vec2, arbiter: &InteractionArbiter) -> bool {
        self.item_index_at(point, arbiter).is_some()
    }

    pub fn item_at(&self, point: Vec2, arbiter: &InteractionArbiter) -> Option<ContextMenuAction> {
        let index = self.item_index_at(point, arbiter)?;
        self.actions(arbiter).get(index).copied()
    }

    fn item_index_at(&self, point: Vec2, arbiter: &InteractionArbiter) -> Option<usize> {
        let state = self.state?;
        let local = point - state.position;
        let count = self.actions(arbiter).len();
        let height = MENU_ITEM_HEIGHT * count as f32;
        if local.x < 0.0 || local.y < 0.0 || local.x > MENU_WIDTH || local.y >= height {
            return None;
        }
        Some((local.y / MENU_ITEM_HEIGHT) as usize)
    }

    /// Document click: closes unless it landed inside the menu.
    pub fn on_document_click(&mut self, point: Vec2, arbiter: &InteractionArbiter) {
        if !self.contains(point, arbiter) {
            self.close();
        }
    }

    /// Runs `action` if it is currently offered and closes the menu either way.
    pub fn dispatch(
        &mut self,
        action: ContextMenuAction,
        arbiter: &mut InteractionArbiter,
        registry: &mut SceneRegistry,
    ) -> bool {
        let offered = self.actions(arbiter).contains(&action);
        let target = self.state.map(|state| state.target);
        self.close();
        let Some(target) = target.filter(|_| offered) else {
            log::debug!("Menu action {action:?} not offered; ignored");
            return false;
        };
        match action {
            ContextMenuAction::Delete => arbiter.delete_node(target, registry),
            ContextMenuAction::EnterEditMode => arbiter.enter_edit_mode(registry),
            ContextMenuAction::CancelEditMode => {
                arbiter.cancel_edit_mode(registry);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrbitConfig;
    use crate::editor::arbiter::SecondaryClick;
    use crate::render::pick::PickOutcome;
    use crate::render::{Camera, OrbitControls};
    use crate::scene::factory::ObjectFactory;
    use glam::Vec3;

    fn setup() -> (SceneRegistry, InteractionArbiter, NodeId) {
        let mut registry = SceneRegistry::with_fixtures(20.0, 20);
        let node = ObjectFactory::new()
            .create_primitive(&mut registry, "torus")
            .unwrap();
        let camera = Camera::new(Vec3::new(0.0, 2.0, 6.0), Vec3::ZERO, 60.0, 1.0);
        let arbiter = InteractionArbiter::new(OrbitControls::new(camera, &OrbitConfig::default()));
        (registry, arbiter, node)
    }

    fn open_on(
        menu: &mut ContextMenuController,
        arbiter: &mut InteractionArbiter,
        registry: &SceneRegistry,
        node: NodeId,
    ) {
        let outcome = PickOutcome::Editable { node, distance: 2.0 };
        let SecondaryClick::ShowMenu(target) = arbiter.secondary_click(outcome, registry) else {
            panic!("menu should open");
        };
        menu.open(Vec2::new(100.0, 100.0), target);
    }

    #[test]
    fn offers_exactly_one_edit_toggle() {
        let (mut registry, mut arbiter, node) = setup();
        let mut menu = ContextMenuController::new();
        assert!(menu.actions(&arbiter).is_empty());

        open_on(&mut menu, &mut arbiter, &registry, node);
        assert_eq!(
            menu.actions(&arbiter),
            vec![ContextMenuAction::Delete, ContextMenuAction::EnterEditMode]
        );
        assert!(menu.dispatch(ContextMenuAction::EnterEditMode, &mut arbiter, &mut registry));
        assert!(!menu.is_open());

        open_on(&mut menu, &mut arbiter, &registry, node);
        assert_eq!(
            menu.actions(&arbiter),
            vec![ContextMenuAction::Delete, ContextMenuAction::CancelEditMode]
        );
    }

    #[test]
    fn action_not_offered_is_ignored_but_closes() {
        let (mut registry, mut arbiter, node) = setup();
        let mut menu = ContextMenuController::new();
        open_on(&mut menu, &mut arbiter, &registry, node);
        assert!(!menu.dispatch(ContextMenuAction::CancelEditMode, &mut arbiter, &mut registry));
        assert!(!menu.is_open());
        assert_eq!(arbiter.attached(), None);
    }

    #[test]
    fn document_click_outside_closes() {
        let (registry, mut arbiter, node) = setup();
        let mut menu = ContextMenuController::new();
        open_on(&mut menu, &mut arbiter, &registry, node);

        let delete_row = Vec2::new(110.0, 110.0);
        let toggle_row = Vec2::new(110.0, 100.0 + MENU_ITEM_HEIGHT + 5.0);
        assert_eq!(menu.item_at(delete_row, &arbiter), Some(ContextMenuAction::Delete));
        assert_eq!(menu.item_at(toggle_row, &arbiter), Some(ContextMenuAction::EnterEditMode));

        menu.on_document_click(delete_row, &arbiter);
        assert!(menu.is_open());
        menu.on_document_click(Vec2::new(10.0, 10.0), &arbiter);
        assert!(!menu.is_open());
    }

    #[test]
    fn delete_removes_target_and_resets() {
        let (mut registry, mut arbiter, node) = setup();
        let mut menu = ContextMenuController::new();
        open_on(&mut menu, &mut arbiter, &registry, node);
        assert!(menu.dispatch(ContextMenuAction::Delete, &mut arbiter, &mut registry));
        assert!(!registry.contains(node));
        assert_eq!(arbiter.selection(), None);
        assert!(arbiter.orbit_enabled());
    }

    #[test]
    fn delete_acts_on_menu_target_not_latest_selection() {
        let (mut registry, mut arbiter, node) = setup();
        let other = ObjectFactory::new()
            .create_primitive(&mut registry, "cube")
            .unwrap();
        let mut menu = ContextMenuController::new();
        open_on(&mut menu, &mut arbiter, &registry, node);
        arbiter.primary_click(PickOutcome::Editable { node: other, distance: 1.0 }, &registry);
        assert_eq!(arbiter.selection(), Some(other));

        assert!(menu.dispatch(ContextMenuAction::Delete, &mut arbiter, &mut registry));
        assert!(!registry.contains(node));
        assert!(registry.contains(other));
    }
}
