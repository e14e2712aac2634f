//! Enable/disable lifecycle shared by entity components.
//!
//! A component is *effectively enabled* when both its own flag and its
//! entity's flag are set. The scene graph reports entity changes through
//! [`Lifecycle::set_entity_enabled`]; the owner toggles the component itself
//! through [`Lifecycle::set_enabled`]. Only changes of the effective state
//! reach [`Lifecycle::on_enable`] / [`Lifecycle::on_disable`], and the
//! [`ComponentBase`] bookkeeping always runs before them.

/// Change of the effective enabled state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Enabled,
    Disabled,
}

/// Enabled flags common to every component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentBase {
    enabled: bool,
    entity_enabled: bool,
}

impl ComponentBase {
    pub fn new(enabled: bool, entity_enabled: bool) -> Self {
        Self {
            enabled,
            entity_enabled,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn entity_enabled(&self) -> bool {
        self.entity_enabled
    }

    pub fn is_effectively_enabled(&self) -> bool {
        self.enabled && self.entity_enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) -> Option<Transition> {
        let before = self.is_effectively_enabled();
        self.enabled = enabled;
        Self::transition(before, self.is_effectively_enabled())
    }

    pub fn set_entity_enabled(&mut self, enabled: bool) -> Option<Transition> {
        let before = self.is_effectively_enabled();
        self.entity_enabled = enabled;
        Self::transition(before, self.is_effectively_enabled())
    }

    fn transition(before: bool, after: bool) -> Option<Transition> {
        match (before, after) {
            (false, true) => Some(Transition::Enabled),
            (true, false) => Some(Transition::Disabled),
            _ => None,
        }
    }
}

/// Lifecycle callbacks of an entity component.
pub trait Lifecycle {
    fn base(&self) -> &ComponentBase;
    fn base_mut(&mut self) -> &mut ComponentBase;

    /// Called when the component becomes effectively enabled.
    fn on_enable(&mut self);
    /// Called when the component stops being effectively enabled.
    fn on_disable(&mut self);

    fn is_effectively_enabled(&self) -> bool {
        self.base().is_effectively_enabled()
    }

    /// Sets the component's own enabled flag.
    fn set_enabled(&mut self, enabled: bool) {
        if let Some(transition) = self.base_mut().set_enabled(enabled) {
            self.apply_transition(transition);
        }
    }

    /// Entry point for the scene graph when the entity (or an ancestor) is toggled.
    fn set_entity_enabled(&mut self, enabled: bool) {
        if let Some(transition) = self.base_mut().set_entity_enabled(enabled) {
            self.apply_transition(transition);
        }
    }

    fn apply_transition(&mut self, transition: Transition) {
        match transition {
            Transition::Enabled => self.on_enable(),
            Transition::Disabled => self.on_disable(),
        }
    }
}
