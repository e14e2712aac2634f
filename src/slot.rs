//! Sound slots: named playback units owning the instances of one asset.

use crate::asset::{AssetId, AssetRegistry, AssetState};
use crate::audio_data::AudioData;
use crate::component::{ComponentMix, ComponentProperty};
use crate::config::{DistanceParams, SlotConfig, validate_pitch, validate_volume};
use crate::playback::{InstanceFactory, InstanceParams, SoundInstance};
use glam::Vec3;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(0);

/// Handle for an instance owned by a slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    fn next() -> Self {
        Self(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InstanceId({})", self.0)
    }
}

/// Entry accepted by [`SoundComponent::set_slots`](crate::SoundComponent::set_slots).
#[derive(Debug)]
pub enum SlotInput {
    /// A slot built elsewhere, adopted under its own name
    Existing(SoundSlot),
    /// Settings for a new slot; dropped when `name` is missing
    Config(SlotConfig),
}

impl From<SoundSlot> for SlotInput {
    fn from(slot: SoundSlot) -> Self {
        Self::Existing(slot)
    }
}

impl From<SlotConfig> for SlotInput {
    fn from(config: SlotConfig) -> Self {
        Self::Config(config)
    }
}

/// What happens to an instance created before its asset finished loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingStart {
    /// Starts as soon as the data arrives
    Play,
    /// Paused before the data arrived; comes up paused at offset 0
    Held,
}

#[derive(Debug)]
struct SlotInstance {
    id: InstanceId,
    instance: Box<dyn SoundInstance>,
    pending: Option<PendingStart>,
}

impl SlotInstance {
    fn is_paused(&self) -> bool {
        self.instance.is_paused() || self.pending == Some(PendingStart::Held)
    }
}

/// A named sound owned by a [`SoundComponent`](crate::SoundComponent).
///
/// Non-overlapping slots keep at most one active instance: every `play`
/// stops the previous one first. Overlapping slots append a new instance per
/// `play` and leave earlier ones running.
#[derive(Debug)]
pub struct SoundSlot {
    name: String,
    config: SlotConfig,
    instances: Vec<SlotInstance>,
    mix: ComponentMix,
    assets: AssetRegistry,
    factory: Arc<dyn InstanceFactory>,
}

impl SoundSlot {
    pub fn new(
        name: impl Into<String>,
        mut config: SlotConfig,
        assets: AssetRegistry,
        factory: Arc<dyn InstanceFactory>,
    ) -> Self {
        let name = name.into();
        config.name = Some(name.clone());
        Self {
            name,
            config,
            instances: Vec::new(),
            mix: ComponentMix::default(),
            assets,
            factory,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &SlotConfig {
        &self.config
    }

    pub fn volume(&self) -> f32 {
        self.config.volume
    }

    pub fn pitch(&self) -> f32 {
        self.config.pitch
    }

    pub fn looping(&self) -> bool {
        self.config.looping
    }

    pub fn start_time(&self) -> f64 {
        self.config.start_time
    }

    pub fn duration(&self) -> Option<f64> {
        self.config.duration
    }

    pub fn overlap(&self) -> bool {
        self.config.overlap
    }

    pub fn auto_play(&self) -> bool {
        self.config.auto_play
    }

    pub fn asset(&self) -> Option<AssetId> {
        self.config.asset
    }

    /// Sets the slot volume; live instances of a non-overlapping slot follow.
    pub fn set_volume(&mut self, volume: f32) {
        if let Err(e) = validate_volume(volume) {
            log::warn!("Ignoring volume for sound slot {}: {}", self.name, e);
            return;
        }
        self.config.volume = volume;
        if !self.config.overlap {
            let effective = volume * self.mix.volume;
            for entry in &mut self.instances {
                entry.instance.set_volume(effective);
            }
        }
    }

    /// Sets the slot pitch; live instances of a non-overlapping slot follow.
    pub fn set_pitch(&mut self, pitch: f32) {
        if let Err(e) = validate_pitch(pitch) {
            log::warn!("Ignoring pitch for sound slot {}: {}", self.name, e);
            return;
        }
        self.config.pitch = pitch;
        if !self.config.overlap {
            let effective = pitch * self.mix.pitch;
            for entry in &mut self.instances {
                entry.instance.set_pitch(effective);
            }
        }
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.config.looping = looping;
        if !self.config.overlap {
            for entry in &mut self.instances {
                entry.instance.set_looping(looping);
            }
        }
    }

    /// Applies to instances created from now on.
    pub fn set_start_time(&mut self, seconds: f64) {
        self.config.start_time = seconds.max(0.0);
    }

    /// Applies to instances created from now on.
    pub fn set_duration(&mut self, seconds: Option<f64>) {
        self.config.duration = seconds.map(|s| s.max(0.0));
    }

    pub fn set_overlap(&mut self, overlap: bool) {
        self.config.overlap = overlap;
    }

    pub fn set_auto_play(&mut self, auto_play: bool) {
        self.config.auto_play = auto_play;
    }

    /// Points the slot at another asset, stopping whatever it was playing.
    pub fn set_asset(&mut self, asset: Option<AssetId>) {
        if self.config.asset == asset {
            return;
        }
        self.stop();
        self.config.asset = asset;
    }

    pub fn is_loaded(&self) -> bool {
        self.config
            .asset
            .is_some_and(|asset| self.assets.is_loaded(asset))
    }

    pub fn is_playing(&self) -> bool {
        self.instances.iter().any(|e| e.instance.is_playing())
    }

    /// True when the slot has instances and all of them are paused, counting
    /// instances paused while their asset was still loading.
    pub fn is_paused(&self) -> bool {
        !self.instances.is_empty() && self.instances.iter().all(SlotInstance::is_paused)
    }

    /// True when an instance will start as soon as the asset loads.
    pub fn is_waiting_to_play(&self) -> bool {
        self.instances
            .iter()
            .any(|e| e.pending == Some(PendingStart::Play))
    }

    /// True when no instance is playing or paused (including no instances).
    pub fn is_stopped(&self) -> bool {
        self.instances
            .iter()
            .all(|e| e.instance.is_stopped() && !e.is_paused())
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn instance_ids(&self) -> Vec<InstanceId> {
        self.instances.iter().map(|e| e.id).collect()
    }

    pub fn instance(&self, id: InstanceId) -> Option<&dyn SoundInstance> {
        self.instances
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.instance.as_ref())
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> Option<&mut dyn SoundInstance> {
        match self.instances.iter_mut().find(|e| e.id == id) {
            Some(entry) => Some(entry.instance.as_mut()),
            None => None,
        }
    }

    pub fn instances(&self) -> impl Iterator<Item = (InstanceId, &dyn SoundInstance)> {
        self.instances.iter().map(|e| (e.id, e.instance.as_ref()))
    }

    /// Whether `id` is waiting for the asset to load before it starts.
    pub fn is_pending(&self, id: InstanceId) -> bool {
        self.instances
            .iter()
            .any(|e| e.id == id && e.pending.is_some())
    }

    /// Creates and starts a new instance.
    ///
    /// A non-overlapping slot stops its current instance first. When the asset
    /// is not loaded yet the instance is created stopped, a load is requested
    /// and playback starts once the component sees the completion. Returns
    /// `None` (with a warning) when the slot has no asset or the asset
    /// failed to load.
    pub fn play(&mut self) -> Option<InstanceId> {
        if !self.config.overlap {
            self.stop();
        }

        let Some(asset) = self.config.asset else {
            log::warn!("Trying to play sound slot {} but it has no asset", self.name);
            return None;
        };
        match self.assets.state(asset) {
            None => {
                log::warn!(
                    "Trying to play sound slot {} but {} is not registered",
                    self.name,
                    asset
                );
                return None;
            }
            Some(AssetState::Failed(error)) => {
                log::warn!(
                    "Trying to play sound slot {} but {} failed to load: {}",
                    self.name,
                    asset,
                    error
                );
                return None;
            }
            Some(_) => {}
        }

        let data = self.assets.data(asset);
        let pending = data.is_none();
        let mut instance = self.create_instance(data);
        if pending {
            self.load();
        } else {
            instance.play();
        }

        let id = InstanceId::next();
        log::debug!(
            "Sound slot {} created {} (pending load: {})",
            self.name,
            id,
            pending
        );
        self.instances.push(SlotInstance {
            id,
            instance,
            pending: pending.then_some(PendingStart::Play),
        });
        Some(id)
    }

    /// Pauses every playing instance. An instance still waiting for its
    /// asset is held instead of starting on load. True if anything changed.
    pub fn pause(&mut self) -> bool {
        let mut paused = false;
        for entry in &mut self.instances {
            if entry.pending == Some(PendingStart::Play) {
                entry.pending = Some(PendingStart::Held);
                paused = true;
            } else {
                paused |= entry.instance.pause();
            }
        }
        paused
    }

    /// Resumes every paused instance, including ones held before their asset
    /// loaded. True if anything changed.
    pub fn resume(&mut self) -> bool {
        let mut resumed = false;
        for entry in &mut self.instances {
            if entry.pending == Some(PendingStart::Held) {
                entry.pending = Some(PendingStart::Play);
                resumed = true;
            } else {
                resumed |= entry.instance.resume();
            }
        }
        resumed
    }

    /// Stops and drops every instance. True if anything was running or
    /// waiting to start.
    pub fn stop(&mut self) -> bool {
        let mut stopped = false;
        for entry in &mut self.instances {
            stopped |= entry.instance.stop() || entry.pending.is_some();
        }
        self.instances.clear();
        stopped
    }

    /// Requests the asset. No-op without an asset or when it is already
    /// loading or loaded.
    pub fn load(&self) {
        let Some(asset) = self.config.asset else {
            return;
        };
        if let Err(e) = self.assets.load(asset) {
            log::warn!("Sound slot {} could not load {}: {}", self.name, asset, e);
        }
    }

    fn asset_data(&self) -> Option<Arc<AudioData>> {
        self.config.asset.and_then(|asset| self.assets.data(asset))
    }

    fn instance_params(&self) -> InstanceParams {
        InstanceParams {
            volume: self.config.volume * self.mix.volume,
            pitch: self.config.pitch * self.mix.pitch,
            looping: self.config.looping,
            start_time: self.config.start_time,
            duration: self.config.duration,
            positional: self.mix.positional,
            distance: self.mix.distance,
            position: self.mix.position,
        }
    }

    fn create_instance(&self, data: Option<Arc<AudioData>>) -> Box<dyn SoundInstance> {
        self.factory.create(&self.instance_params(), data)
    }

    /// Replaces every instance with one built under the current
    /// spatialization mode, carrying over the playing state and offset.
    fn recreate_instances(&mut self) {
        let data = self.asset_data();
        for index in 0..self.instances.len() {
            let (active, offset) = {
                let old = &mut self.instances[index].instance;
                let active = old.is_playing() || old.is_suspended();
                let offset = old.current_time();
                if active {
                    old.stop();
                }
                (active, offset)
            };

            let mut fresh = self.create_instance(data.clone());
            if active {
                fresh.play();
                fresh.set_current_time(offset);
            }

            let entry = &mut self.instances[index];
            log::debug!(
                "Sound slot {} recreated {} (active: {}, offset: {:.3}s)",
                self.name,
                entry.id,
                active,
                offset
            );
            entry.id = InstanceId::next();
            entry.instance = fresh;
        }
    }

    /// Stores the component-wide values and, for non-overlapping slots,
    /// pushes the changed one into every live instance.
    pub(crate) fn apply_component_property(
        &mut self,
        property: ComponentProperty,
        mix: &ComponentMix,
    ) {
        self.mix = mix.clone();
        if self.config.overlap {
            return;
        }

        match property {
            ComponentProperty::Volume(volume) => {
                let effective = self.config.volume * volume;
                for entry in &mut self.instances {
                    entry.instance.set_volume(effective);
                }
            }
            ComponentProperty::Pitch(pitch) => {
                let effective = self.config.pitch * pitch;
                for entry in &mut self.instances {
                    entry.instance.set_pitch(effective);
                }
            }
            ComponentProperty::RefDistance(ref_distance) => self.update_distance(|d| {
                d.ref_distance = ref_distance;
            }),
            ComponentProperty::MaxDistance(max_distance) => self.update_distance(|d| {
                d.max_distance = max_distance;
            }),
            ComponentProperty::RollOffFactor(factor) => self.update_distance(|d| {
                d.roll_off_factor = factor;
            }),
            ComponentProperty::DistanceModel(model) => self.update_distance(|d| {
                d.model = model;
            }),
            ComponentProperty::Positional(_) => self.recreate_instances(),
        }
    }

    fn update_distance(&mut self, change: impl Fn(&mut DistanceParams)) {
        for entry in &mut self.instances {
            let mut distance = entry.instance.distance();
            change(&mut distance);
            entry.instance.set_distance(distance);
        }
    }

    /// Takes on the component-wide values without touching live instances.
    pub(crate) fn set_mix(&mut self, mix: &ComponentMix) {
        self.mix = mix.clone();
    }

    /// Takes on the values of a new owner. Live instances of a
    /// non-overlapping slot follow, except for the spatialization mode.
    pub(crate) fn adopt_mix(&mut self, mix: &ComponentMix) {
        self.set_mix(mix);
        if self.config.overlap {
            return;
        }
        let params = self.instance_params();
        for entry in &mut self.instances {
            entry.instance.set_volume(params.volume);
            entry.instance.set_pitch(params.pitch);
            entry.instance.set_distance(params.distance);
            if entry.instance.is_positional() {
                entry.instance.set_position(params.position);
            }
        }
    }

    pub(crate) fn set_position(&mut self, position: Vec3) {
        self.mix.position = position;
        for entry in &mut self.instances {
            if entry.instance.is_positional() {
                entry.instance.set_position(position);
            }
        }
    }

    /// Hands the data to instances that were waiting for `asset`. Held
    /// instances come up paused.
    pub(crate) fn on_asset_loaded(&mut self, asset: AssetId, data: &Arc<AudioData>) {
        if self.config.asset != Some(asset) {
            return;
        }
        for entry in &mut self.instances {
            let Some(pending) = entry.pending.take() else {
                continue;
            };
            entry.instance.set_data(data.clone());
            entry.instance.play();
            if pending == PendingStart::Held {
                entry.instance.pause();
            }
        }
    }

    pub(crate) fn on_asset_failed(&mut self, asset: AssetId) {
        if self.config.asset != Some(asset) {
            return;
        }
        for entry in &mut self.instances {
            entry.pending = None;
        }
    }

    /// Advances instance clocks and drops overlapping instances that ended.
    pub(crate) fn update(&mut self, elapsed: Duration) {
        for entry in &mut self.instances {
            entry.instance.advance(elapsed);
        }
        if self.config.overlap {
            self.instances
                .retain(|e| e.pending.is_some() || !e.instance.is_stopped());
        }
    }
}
