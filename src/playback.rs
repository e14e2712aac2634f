//! Sound instances: the low-level playback primitive slots create and control.
//!
//! This module provides:
//! - [`SoundInstance`]: contract for one playing/paused unit of audio
//! - [`InstanceParams`]: everything an instance is constructed with
//! - [`InstanceFactory`]: how slots obtain new instances
//! - [`PlaybackInstance`]/[`PlaybackFactory`]: a headless implementation that
//!   tracks state and a playback clock without touching an audio device
//!
//! Hosts with a real audio backend implement [`SoundInstance`] and
//! [`InstanceFactory`] on top of it. The spatialization mode of an instance is
//! fixed at construction; changing it means building a new instance.

use crate::audio_data::AudioData;
use crate::config::DistanceParams;
use glam::Vec3;
use std::sync::Arc;
use std::time::Duration;

/// Construction parameters for a sound instance.
///
/// Volume and pitch are already the effective values (slot value multiplied by
/// the component-wide value).
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceParams {
    pub volume: f32,
    pub pitch: f32,
    pub looping: bool,
    /// Offset in seconds into the asset where playback starts
    pub start_time: f64,
    /// Seconds to play from `start_time` (None = until the end)
    pub duration: Option<f64>,
    pub positional: bool,
    pub distance: DistanceParams,
    pub position: Vec3,
}

impl Default for InstanceParams {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pitch: 1.0,
            looping: false,
            start_time: 0.0,
            duration: None,
            positional: false,
            distance: DistanceParams::default(),
            position: Vec3::ZERO,
        }
    }
}

/// One playing, paused or stopped unit of audio.
///
/// `pause`, `resume` and `stop` return `true` only when they caused a state
/// transition. `current_time` is measured from the instance's start time.
pub trait SoundInstance: std::fmt::Debug {
    /// Starts playback from the beginning. Returns `false` without data.
    fn play(&mut self) -> bool;
    fn pause(&mut self) -> bool;
    fn resume(&mut self) -> bool;
    fn stop(&mut self) -> bool;

    fn is_playing(&self) -> bool;
    fn is_paused(&self) -> bool;
    fn is_stopped(&self) -> bool;
    /// Playback requested but held by the output (e.g. a suspended device).
    fn is_suspended(&self) -> bool {
        false
    }

    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);

    /// Attaches decoded audio to an instance created before its asset loaded.
    fn set_data(&mut self, data: Arc<AudioData>);

    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);
    fn pitch(&self) -> f32;
    fn set_pitch(&mut self, pitch: f32);
    fn looping(&self) -> bool;
    fn set_looping(&mut self, looping: bool);

    fn distance(&self) -> DistanceParams;
    fn set_distance(&mut self, distance: DistanceParams);
    fn is_positional(&self) -> bool;
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);

    /// Moves the playback clock of instances that do not run on their own.
    fn advance(&mut self, _elapsed: Duration) {}
}

/// Builds instances for a slot.
pub trait InstanceFactory: std::fmt::Debug {
    fn create(&self, params: &InstanceParams, data: Option<Arc<AudioData>>)
    -> Box<dyn SoundInstance>;
}

/// Represents the current playback state of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Playing,
    /// Retains playback position
    Paused,
    Stopped,
}

/// Headless [`SoundInstance`] driven by [`advance`](SoundInstance::advance).
#[derive(Debug)]
pub struct PlaybackInstance {
    params: InstanceParams,
    data: Option<Arc<AudioData>>,
    state: PlayState,
    /// Seconds since `start_time`
    cursor: f64,
}

impl PlaybackInstance {
    pub fn new(params: InstanceParams, data: Option<Arc<AudioData>>) -> Self {
        Self {
            params,
            data,
            state: PlayState::Stopped,
            cursor: 0.0,
        }
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn params(&self) -> &InstanceParams {
        &self.params
    }

    /// Length of the region this instance plays, in seconds.
    pub fn region_length(&self) -> f64 {
        let Some(data) = &self.data else {
            return 0.0;
        };
        let available = (data.duration().as_secs_f64() - self.params.start_time).max(0.0);
        match self.params.duration {
            Some(duration) => duration.min(available),
            None => available,
        }
    }
}

impl SoundInstance for PlaybackInstance {
    fn play(&mut self) -> bool {
        if self.data.is_none() {
            return false;
        }
        self.cursor = 0.0;
        self.state = PlayState::Playing;
        true
    }

    fn pause(&mut self) -> bool {
        if self.state != PlayState::Playing {
            return false;
        }
        log::debug!("Instance paused at {:.3}s", self.cursor);
        self.state = PlayState::Paused;
        true
    }

    fn resume(&mut self) -> bool {
        if self.state != PlayState::Paused {
            return false;
        }
        log::debug!("Instance resuming from {:.3}s", self.cursor);
        self.state = PlayState::Playing;
        true
    }

    fn stop(&mut self) -> bool {
        if self.state == PlayState::Stopped {
            return false;
        }
        self.state = PlayState::Stopped;
        self.cursor = 0.0;
        true
    }

    fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    fn is_paused(&self) -> bool {
        self.state == PlayState::Paused
    }

    fn is_stopped(&self) -> bool {
        self.state == PlayState::Stopped
    }

    fn current_time(&self) -> f64 {
        self.cursor
    }

    fn set_current_time(&mut self, seconds: f64) {
        let length = self.region_length();
        self.cursor = if length > 0.0 {
            seconds.clamp(0.0, length)
        } else {
            0.0
        };
    }

    fn set_data(&mut self, data: Arc<AudioData>) {
        self.data = Some(data);
    }

    fn volume(&self) -> f32 {
        self.params.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.params.volume = volume;
    }

    fn pitch(&self) -> f32 {
        self.params.pitch
    }

    fn set_pitch(&mut self, pitch: f32) {
        self.params.pitch = pitch;
    }

    fn looping(&self) -> bool {
        self.params.looping
    }

    fn set_looping(&mut self, looping: bool) {
        self.params.looping = looping;
    }

    fn distance(&self) -> DistanceParams {
        self.params.distance
    }

    fn set_distance(&mut self, distance: DistanceParams) {
        self.params.distance = distance;
    }

    fn is_positional(&self) -> bool {
        self.params.positional
    }

    fn position(&self) -> Vec3 {
        self.params.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.params.position = position;
    }

    fn advance(&mut self, elapsed: Duration) {
        if self.state != PlayState::Playing {
            return;
        }

        let length = self.region_length();
        self.cursor += elapsed.as_secs_f64() * self.params.pitch as f64;

        if self.cursor >= length {
            if self.params.looping && length > 0.0 {
                self.cursor %= length;
            } else {
                log::debug!("Instance reached end after {:.3}s", length);
                self.state = PlayState::Stopped;
                self.cursor = 0.0;
            }
        }
    }
}

/// Factory producing [`PlaybackInstance`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaybackFactory;

impl InstanceFactory for PlaybackFactory {
    fn create(
        &self,
        params: &InstanceParams,
        data: Option<Arc<AudioData>>,
    ) -> Box<dyn SoundInstance> {
        Box::new(PlaybackInstance::new(params.clone(), data))
    }
}
