//! Enable/disable lifecycle of [`ShaderReplacement`].
//!
//! A toggle added enabled activates on the next `PostUpdate`, including one
//! inserted over an existing toggle.
//! [`ShaderReplacement::set_enabled`] fires the transition on the spot, and
//! removing the component deactivates it.

use bevy::prelude::*;

use crate::{camera::ReplacementShaderSlot, components::ShaderReplacement};

#[derive(Debug, thiserror::Error)]
pub enum ReplacementError {
    #[error("ShaderReplacement on {0} requires a Camera on the same entity")]
    MissingCamera(Entity),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum ToggleState {
    #[default]
    Inactive,
    Active,
}

impl<M: Material> ShaderReplacement<M> {
    /// Install the configured shader on the camera, keyed by this toggle's tag.
    /// Does nothing when no shader is configured.
    pub fn on_activate(&self, slot: &mut ReplacementShaderSlot<M>) {
        if let Some(shader) = &self.shader {
            slot.set_replacement_shader(shader.clone(), self.tag.clone());
        }
    }

    /// Drop any replacement from the camera.
    pub fn on_deactivate(&self, slot: &mut ReplacementShaderSlot<M>) {
        deactivate(slot);
    }

    /// Enable or disable the replacement, running `on_activate` or
    /// `on_deactivate` right away when the state flips.
    ///
    /// ```ignore
    /// replacement.configure(Some(other_shader));
    /// replacement.set_enabled(false, &mut slot);
    /// replacement.set_enabled(true, &mut slot); // `other_shader` is now installed
    /// ```
    pub fn set_enabled(&mut self, enabled: bool, slot: &mut ReplacementShaderSlot<M>) {
        self.enabled = enabled;
        if self.apply_state(slot).is_none() && !enabled && slot.is_active() {
            // Inserted over an active toggle and not yet applied.
            deactivate(slot);
        }
    }

    /// Returns the state entered, or `None` if already there.
    pub(crate) fn apply_state(&mut self, slot: &mut ReplacementShaderSlot<M>) -> Option<ToggleState> {
        let target = if self.enabled {
            ToggleState::Active
        } else {
            ToggleState::Inactive
        };
        if self.state == target {
            return None;
        }
        match target {
            ToggleState::Active => self.on_activate(slot),
            ToggleState::Inactive => self.on_deactivate(slot),
        }
        self.state = target;
        Some(target)
    }
}

/// The one way a camera leaves the replacement, shared by disabling and removal.
fn deactivate<M: Material>(slot: &mut ReplacementShaderSlot<M>) {
    slot.reset_replacement_shader();
}

/// Gives newly added toggles their camera slot.
pub fn init_replacement_cameras<M: Material>(
    mut commands: Commands,
    added: Query<(Entity, Has<Camera>), Added<ShaderReplacement<M>>>,
) -> Result {
    let mut first_error = None;

    for (entity, has_camera) in added.iter() {
        if !has_camera {
            first_error.get_or_insert(ReplacementError::MissingCamera(entity));
            continue;
        }
        commands
            .entity(entity)
            .insert_if_new(ReplacementShaderSlot::<M>::default());
    }

    match first_error {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

/// Applies toggles that were added, or inserted over an existing toggle.
///
/// An inactive toggle means an unset slot, so one that shows up inactive
/// clears whatever its predecessor installed before applying its own state.
/// Later transitions go through [`ShaderReplacement::set_enabled`].
pub fn apply_inserted_toggles<M: Material>(
    mut toggles: Query<
        (Entity, &mut ShaderReplacement<M>, &mut ReplacementShaderSlot<M>),
        Changed<ShaderReplacement<M>>,
    >,
) {
    for (entity, mut toggle, mut slot) in toggles.iter_mut() {
        if toggle.state() != ToggleState::Inactive {
            continue;
        }
        if slot.is_active() {
            deactivate(&mut slot);
            debug!("Stale shader replacement cleared on {entity}");
        }
        if toggle.apply_state(&mut slot) == Some(ToggleState::Active) && toggle.shader.is_some() {
            debug!("Shader replacement activated on {entity} (tag {:?})", toggle.tag);
        }
    }
}

/// Removing the toggle deactivates it.
pub fn deactivate_removed_toggles<M: Material>(
    mut removed: RemovedComponents<ShaderReplacement<M>>,
    mut slots: Query<&mut ReplacementShaderSlot<M>>,
) {
    for entity in removed.read() {
        if let Ok(mut slot) = slots.get_mut(entity) {
            deactivate(&mut slot);
            debug!("Shader replacement removed from {entity}");
        }
    }
}
