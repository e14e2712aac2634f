//! The sound component: a set of named slots attached to one entity.
//!
//! The component owns its [`SoundSlot`]s, applies component-wide volume,
//! pitch and distance settings on top of every slot, and follows the entity
//! lifecycle: disabling pauses what was playing and enabling resumes it.
//!
//! ```ignore
//! let assets = AssetRegistry::new();
//! let clip = assets.register_path("assets/beep.wav");
//!
//! let mut sound = SoundComponent::new("player", SoundComponentDesc::default(), assets)?;
//! sound.add_slot("beep", SlotConfig::new().asset(clip));
//! sound.play("beep");
//!
//! loop {
//!     sound.update(frame_time);
//!     for event in sound.poll_events() { /* ... */ }
//! }
//! ```

mod property;

#[cfg(test)]
mod tests;

pub use property::ComponentProperty;
pub(crate) use property::ComponentMix;

use crate::asset::{AssetEvent, AssetRegistry};
use crate::config::{DistanceModel, SlotConfig, SoundComponentDesc};
use crate::error::Result;
use crate::events::{ComponentId, EventBus, SoundEvent};
use crate::lifecycle::{ComponentBase, Lifecycle};
use crate::playback::{InstanceFactory, PlaybackFactory};
use crate::slot::{InstanceId, SlotInput, SoundSlot};
use crossbeam_channel::Receiver;
use glam::Vec3;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

/// Entity component playing sounds through named slots.
#[derive(Debug)]
pub struct SoundComponent {
    id: ComponentId,
    entity: String,
    desc: SoundComponentDesc,
    base: ComponentBase,
    mix: ComponentMix,
    slots: BTreeMap<String, SoundSlot>,
    /// Non-overlapping slots that were playing when the component was last
    /// disabled
    playing_before_disable: HashMap<String, bool>,
    assets: AssetRegistry,
    asset_events: Receiver<AssetEvent>,
    factory: Arc<dyn InstanceFactory>,
    events: EventBus,
}

impl SoundComponent {
    /// Creates a component with headless [`PlaybackFactory`] instances.
    pub fn new(
        entity: impl Into<String>,
        desc: SoundComponentDesc,
        assets: AssetRegistry,
    ) -> Result<Self> {
        Self::with_factory(entity, desc, assets, Arc::new(PlaybackFactory))
    }

    /// Creates a component whose slots build instances with `factory`.
    ///
    /// The entity is assumed enabled; the scene reports otherwise through
    /// [`Lifecycle::set_entity_enabled`]. No slot exists yet, so nothing is
    /// reconciled here.
    pub fn with_factory(
        entity: impl Into<String>,
        desc: SoundComponentDesc,
        assets: AssetRegistry,
        factory: Arc<dyn InstanceFactory>,
    ) -> Result<Self> {
        desc.validate()?;

        let entity = entity.into();
        let id = ComponentId::new();
        log::debug!("Creating sound component {} on entity {}", id, entity);

        Ok(Self {
            id,
            entity,
            base: ComponentBase::new(desc.enabled, true),
            mix: ComponentMix::from_desc(&desc, Vec3::ZERO),
            desc,
            slots: BTreeMap::new(),
            playing_before_disable: HashMap::new(),
            asset_events: assets.subscribe(),
            assets,
            factory,
            events: EventBus::new(),
        })
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn desc(&self) -> &SoundComponentDesc {
        &self.desc
    }

    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    pub fn volume(&self) -> f32 {
        self.desc.volume
    }

    pub fn pitch(&self) -> f32 {
        self.desc.pitch
    }

    pub fn positional(&self) -> bool {
        self.desc.positional
    }

    pub fn distance_model(&self) -> DistanceModel {
        self.desc.distance.model
    }

    pub fn ref_distance(&self) -> f32 {
        self.desc.distance.ref_distance
    }

    pub fn max_distance(&self) -> f32 {
        self.desc.distance.max_distance
    }

    pub fn roll_off_factor(&self) -> f32 {
        self.desc.distance.roll_off_factor
    }

    pub fn position(&self) -> Vec3 {
        self.mix.position
    }

    pub fn suppress_playback_side_effects(&self) -> bool {
        self.desc.suppress_playback_side_effects
    }

    /// While set, enabling the component leaves playback untouched.
    pub fn set_suppress_playback_side_effects(&mut self, suppress: bool) {
        self.desc.suppress_playback_side_effects = suppress;
    }

    // Component-wide properties

    /// Applies a component-wide property and propagates it to the live
    /// instances of every non-overlapping slot.
    ///
    /// Invalid values are rejected with a warning. Setting a property to
    /// its current value does nothing: no fan-out reaches the slots, so
    /// instances are not touched and a positional flag that did not change
    /// does not rebuild them.
    pub fn set_property(&mut self, property: ComponentProperty) {
        if let Err(e) = property.validate() {
            log::warn!(
                "Ignoring {} for sound component on Entity {}: {}",
                property.name(),
                self.entity,
                e
            );
            return;
        }

        let Some(mix) = self.mix.with(property) else {
            return;
        };
        log::debug!(
            "Sound component on Entity {} set {:?}",
            self.entity,
            property
        );
        mix.write_back(&mut self.desc);
        self.mix = mix;

        for slot in self.slots.values_mut() {
            slot.apply_component_property(property, &self.mix);
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.set_property(ComponentProperty::Volume(volume));
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.set_property(ComponentProperty::Pitch(pitch));
    }

    pub fn set_ref_distance(&mut self, ref_distance: f32) {
        self.set_property(ComponentProperty::RefDistance(ref_distance));
    }

    pub fn set_max_distance(&mut self, max_distance: f32) {
        self.set_property(ComponentProperty::MaxDistance(max_distance));
    }

    pub fn set_roll_off_factor(&mut self, factor: f32) {
        self.set_property(ComponentProperty::RollOffFactor(factor));
    }

    pub fn set_distance_model(&mut self, model: DistanceModel) {
        self.set_property(ComponentProperty::DistanceModel(model));
    }

    /// Switches between positional and non-positional playback. Live
    /// instances of non-overlapping slots are rebuilt, keeping their
    /// playing state and offset.
    pub fn set_positional(&mut self, positional: bool) {
        self.set_property(ComponentProperty::Positional(positional));
    }

    /// Moves the emitter. Positional instances of every slot follow.
    pub fn set_position(&mut self, position: Vec3) {
        self.mix.position = position;
        for slot in self.slots.values_mut() {
            slot.set_position(position);
        }
    }

    // Slots

    pub fn slot(&self, name: &str) -> Option<&SoundSlot> {
        self.slots.get(name)
    }

    pub fn slot_mut(&mut self, name: &str) -> Option<&mut SoundSlot> {
        self.slots.get_mut(name)
    }

    pub fn has_slot(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn slots(&self) -> impl Iterator<Item = &SoundSlot> {
        self.slots.values()
    }

    /// Builds a slot bound to this component's assets and settings without
    /// adding it. Pass it to [`set_slots`](Self::set_slots) to adopt it.
    pub fn new_slot(&self, name: impl Into<String>, config: SlotConfig) -> SoundSlot {
        let mut slot = SoundSlot::new(name, config, self.assets.clone(), self.factory.clone());
        slot.set_mix(&self.mix);
        slot
    }

    /// Adds a slot under `name`.
    ///
    /// Returns `None` with a warning when the name is taken or the config is
    /// invalid. An autoplay slot starts right away if the component is
    /// effectively enabled.
    pub fn add_slot(&mut self, name: &str, config: SlotConfig) -> Option<&mut SoundSlot> {
        if self.slots.contains_key(name) {
            log::warn!(
                "A sound slot with name {} already exists on Entity {}",
                name,
                self.entity
            );
            return None;
        }
        if let Err(e) = config.validate() {
            log::warn!(
                "Cannot add sound slot {} on Entity {}: {}",
                name,
                self.entity,
                e
            );
            return None;
        }

        let mut slot = self.new_slot(name, config);
        if slot.auto_play() && self.is_effectively_enabled() {
            slot.play();
        }
        log::debug!("Added sound slot {} on Entity {}", name, self.entity);

        Some(self.slots.entry(name.to_string()).or_insert(slot))
    }

    /// Stops and removes the slot, handing it back. Asset completions no
    /// longer reach it.
    pub fn remove_slot(&mut self, name: &str) -> Option<SoundSlot> {
        let mut slot = self.slots.remove(name)?;
        slot.stop();
        self.playing_before_disable.remove(name);
        log::debug!("Removed sound slot {} from Entity {}", name, self.entity);
        Some(slot)
    }

    /// Replaces every slot.
    ///
    /// All current slots are stopped first. Existing slots are adopted under
    /// their own name; configs build new slots and are skipped when unnamed
    /// or invalid. Later entries win on duplicate names. If the component is
    /// effectively enabled the enable reconciliation runs afterwards.
    pub fn set_slots<I>(&mut self, inputs: I)
    where
        I: IntoIterator<Item = SlotInput>,
    {
        for slot in self.slots.values_mut() {
            slot.stop();
        }

        let mut slots = BTreeMap::new();
        for input in inputs {
            let slot = match input {
                SlotInput::Existing(mut slot) => {
                    slot.adopt_mix(&self.mix);
                    slot
                }
                SlotInput::Config(config) => {
                    let Some(name) = config.name.clone() else {
                        log::debug!("Skipping unnamed sound slot on Entity {}", self.entity);
                        continue;
                    };
                    if let Err(e) = config.validate() {
                        log::warn!(
                            "Skipping sound slot {} on Entity {}: {}",
                            name,
                            self.entity,
                            e
                        );
                        continue;
                    }
                    self.new_slot(name, config)
                }
            };
            slots.insert(slot.name().to_string(), slot);
        }

        log::debug!(
            "Sound component on Entity {} now has {} slots",
            self.entity,
            slots.len()
        );
        self.slots = slots;

        if self.is_effectively_enabled() {
            self.on_enable();
        }
    }

    // Playback

    /// Plays the named slot and emits [`SoundEvent::Play`].
    ///
    /// Does nothing while the component is not effectively enabled. An
    /// unknown name logs a warning. The event carries the new instance, or
    /// `None` when the slot could not create one.
    pub fn play(&mut self, name: &str) -> Option<InstanceId> {
        if !self.is_effectively_enabled() {
            return None;
        }

        let Some(slot) = self.slots.get_mut(name) else {
            log::warn!(
                "Trying to play sound slot with name {} which does not exist",
                name
            );
            return None;
        };

        let instance = slot.play();
        self.events.emit(SoundEvent::Play {
            component: self.id,
            slot: name.to_string(),
            instance,
        });
        instance
    }

    /// Pauses one slot, or every slot when `name` is `None`.
    pub fn pause(&mut self, name: Option<&str>) {
        match name {
            Some(name) => {
                let Some(slot) = self.slots.get_mut(name) else {
                    log::warn!(
                        "Trying to pause sound slot with name {} which does not exist",
                        name
                    );
                    return;
                };
                slot.pause();
                self.emit_pause(Some(name));
            }
            None => {
                for slot in self.slots.values_mut() {
                    slot.pause();
                }
                self.emit_pause(None);
            }
        }
    }

    /// Resumes one slot, or every slot when `name` is `None`.
    ///
    /// A named slot emits [`SoundEvent::Resume`] only when it was paused and
    /// actually resumed.
    pub fn resume(&mut self, name: Option<&str>) {
        match name {
            Some(name) => {
                let Some(slot) = self.slots.get_mut(name) else {
                    log::warn!(
                        "Trying to resume sound slot with name {} which does not exist",
                        name
                    );
                    return;
                };
                if slot.is_paused() && slot.resume() {
                    self.emit_resume(Some(name));
                }
            }
            None => {
                for slot in self.slots.values_mut() {
                    slot.resume();
                }
                self.emit_resume(None);
            }
        }
    }

    /// Stops one slot, or every slot when `name` is `None`.
    ///
    /// A named slot emits [`SoundEvent::Stop`] only when something was
    /// actually stopped.
    pub fn stop(&mut self, name: Option<&str>) {
        match name {
            Some(name) => {
                let Some(slot) = self.slots.get_mut(name) else {
                    log::warn!(
                        "Trying to stop sound slot with name {} which does not exist",
                        name
                    );
                    return;
                };
                if slot.stop() {
                    self.emit_stop(Some(name));
                }
            }
            None => {
                for slot in self.slots.values_mut() {
                    slot.stop();
                }
                self.emit_stop(None);
            }
        }
    }

    fn emit_pause(&mut self, slot: Option<&str>) {
        self.events.emit(SoundEvent::Pause {
            component: self.id,
            slot: slot.map(str::to_string),
        });
    }

    fn emit_resume(&mut self, slot: Option<&str>) {
        self.events.emit(SoundEvent::Resume {
            component: self.id,
            slot: slot.map(str::to_string),
        });
    }

    fn emit_stop(&mut self, slot: Option<&str>) {
        self.events.emit(SoundEvent::Stop {
            component: self.id,
            slot: slot.map(str::to_string),
        });
    }

    /// Slots recorded by the last disable, cleared once an enable resumes
    /// them.
    pub fn playing_before_disable(&self) -> &HashMap<String, bool> {
        &self.playing_before_disable
    }

    // Frame driving

    /// Delivers finished asset loads to the slots, then advances every
    /// instance by `elapsed`.
    pub fn update(&mut self, elapsed: Duration) {
        while let Ok(event) = self.asset_events.try_recv() {
            match event {
                AssetEvent::Loaded(asset) => {
                    let Some(data) = self.assets.data(asset) else {
                        continue;
                    };
                    for slot in self.slots.values_mut() {
                        slot.on_asset_loaded(asset, &data);
                    }
                }
                AssetEvent::Failed { asset, error } => {
                    log::warn!(
                        "Sound component on Entity {}: {} failed to load: {}",
                        self.entity,
                        asset,
                        error
                    );
                    for slot in self.slots.values_mut() {
                        slot.on_asset_failed(asset);
                    }
                }
            }
        }

        for slot in self.slots.values_mut() {
            slot.update(elapsed);
        }
    }

    /// Opens an extra receiver that sees every event emitted from now on.
    pub fn subscribe(&mut self) -> Receiver<SoundEvent> {
        self.events.subscribe()
    }

    /// Takes the events emitted since the last poll.
    pub fn poll_events(&self) -> Vec<SoundEvent> {
        self.events.drain()
    }
}

impl Lifecycle for SoundComponent {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    /// Brings each slot back to life: autoplay slots that are stopped start,
    /// slots paused by the last disable resume, and the rest get their asset
    /// requested.
    fn on_enable(&mut self) {
        if self.desc.suppress_playback_side_effects {
            log::debug!(
                "Sound component on Entity {} enabled with playback suppressed",
                self.entity
            );
            return;
        }

        for (name, slot) in self.slots.iter_mut() {
            if slot.auto_play() && slot.is_stopped() {
                slot.play();
            } else if self.playing_before_disable.contains_key(name) {
                slot.resume();
            } else if !slot.is_loaded() {
                slot.load();
            }
        }
        self.playing_before_disable.clear();
    }

    /// Pauses non-overlapping slots that are playing or about to start once
    /// their asset loads, and records them for the next enable.
    fn on_disable(&mut self) {
        self.playing_before_disable.clear();
        for (name, slot) in self.slots.iter_mut() {
            if !slot.overlap() && (slot.is_playing() || slot.is_waiting_to_play()) {
                slot.pause();
                self.playing_before_disable.insert(name.clone(), true);
            }
        }
        log::debug!(
            "Sound component on Entity {} disabled, {} slots paused",
            self.entity,
            self.playing_before_disable.len()
        );
    }
}
