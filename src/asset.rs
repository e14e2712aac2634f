//! Asset registry resolving asset ids to decoded audio.
//!
//! Loading is the one asynchronous boundary of the crate: [`AssetRegistry::load`]
//! returns immediately and decoding happens on a background thread. Completion
//! is announced as an [`AssetEvent`] to every subscriber; sound components drain
//! their subscription in [`SoundComponent::update`](crate::SoundComponent::update).

use crate::audio_data::{AudioData, AudioDataLoader, LoadOptions, SymphoniaLoader};
use crate::error::{Result, SoundError};
use crossbeam_channel::{Receiver, Sender};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Lightweight handle for a registered audio asset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AssetId(u64);

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AssetId({})", self.0)
    }
}

/// Load state of a registered asset.
#[derive(Debug, Clone)]
pub enum AssetState {
    /// Registered but never requested
    Unloaded,
    Loading,
    Loaded(Arc<AudioData>),
    Failed(String),
}

impl AssetState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Completion notifications broadcast to subscribers.
#[derive(Debug, Clone)]
pub enum AssetEvent {
    Loaded(AssetId),
    Failed { asset: AssetId, error: String },
}

struct AssetEntry {
    path: Option<String>,
    state: AssetState,
}

struct RegistryInner {
    entries: HashMap<AssetId, AssetEntry>,
    next_id: u64,
    subscribers: Vec<Sender<AssetEvent>>,
}

/// Shared, cheaply clonable store of audio assets.
#[derive(Clone)]
pub struct AssetRegistry {
    inner: Arc<Mutex<RegistryInner>>,
    loader: Arc<dyn AudioDataLoader>,
    options: LoadOptions,
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AssetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetRegistry")
            .field("assets", &self.lock().entries.len())
            .field("options", &self.options)
            .finish()
    }
}

impl AssetRegistry {
    /// Registry decoding files with [`SymphoniaLoader`].
    pub fn new() -> Self {
        Self::with_loader(SymphoniaLoader, LoadOptions::default())
    }

    pub fn with_loader(loader: impl AudioDataLoader + 'static, options: LoadOptions) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryInner {
                entries: HashMap::new(),
                next_id: 0,
                subscribers: Vec::new(),
            })),
            loader: Arc::new(loader),
            options,
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(&self, path: Option<String>, state: AssetState) -> AssetId {
        let mut inner = self.lock();
        let id = AssetId(inner.next_id);
        inner.next_id += 1;
        inner.entries.insert(id, AssetEntry { path, state });
        id
    }

    /// Registers a file that will be decoded on the first [`load`](Self::load).
    pub fn register_path(&self, path: impl Into<String>) -> AssetId {
        self.insert(Some(path.into()), AssetState::Unloaded)
    }

    /// Registers an asset that is resolved externally through
    /// [`complete`](Self::complete) or [`fail`](Self::fail).
    pub fn register_pending(&self) -> AssetId {
        self.insert(None, AssetState::Unloaded)
    }

    /// Registers audio that is already decoded.
    pub fn insert_loaded(&self, data: AudioData) -> AssetId {
        self.insert(None, AssetState::Loaded(Arc::new(data)))
    }

    /// Returns a receiver for load completions from now on.
    pub fn subscribe(&self) -> Receiver<AssetEvent> {
        let (sender, receiver) = crossbeam_channel::unbounded();
        self.lock().subscribers.push(sender);
        receiver
    }

    pub fn state(&self, id: AssetId) -> Option<AssetState> {
        self.lock().entries.get(&id).map(|entry| entry.state.clone())
    }

    pub fn is_loaded(&self, id: AssetId) -> bool {
        self.lock()
            .entries
            .get(&id)
            .is_some_and(|entry| entry.state.is_loaded())
    }

    pub fn data(&self, id: AssetId) -> Option<Arc<AudioData>> {
        match self.lock().entries.get(&id).map(|entry| &entry.state) {
            Some(AssetState::Loaded(data)) => Some(data.clone()),
            _ => None,
        }
    }

    pub fn contains(&self, id: AssetId) -> bool {
        self.lock().entries.contains_key(&id)
    }

    /// Starts loading an asset.
    ///
    /// No-op when the asset is already loading, loaded or failed. File-backed
    /// assets are decoded on a background thread; pending assets simply move
    /// to [`AssetState::Loading`] and wait for [`complete`](Self::complete).
    pub fn load(&self, id: AssetId) -> Result<()> {
        let path = {
            let mut inner = self.lock();
            let entry = inner
                .entries
                .get_mut(&id)
                .ok_or(SoundError::AssetNotFound(id))?;
            if !matches!(entry.state, AssetState::Unloaded) {
                return Ok(());
            }
            entry.state = AssetState::Loading;
            entry.path.clone()
        };

        let Some(path) = path else {
            log::debug!("{} waiting for external completion", id);
            return Ok(());
        };

        log::debug!("Loading {} from {}", id, path);
        let registry = self.clone();
        std::thread::Builder::new()
            .name(format!("asset-load-{}", id.0))
            .spawn(move || match registry.loader.load(&path, &registry.options) {
                Ok(data) => registry.finish(id, AssetState::Loaded(data)),
                Err(e) => registry.finish(id, AssetState::Failed(e.to_string())),
            })?;
        Ok(())
    }

    /// Resolves a loading asset with decoded data.
    pub fn complete(&self, id: AssetId, data: AudioData) {
        self.finish(id, AssetState::Loaded(Arc::new(data)));
    }

    /// Marks a loading asset as failed.
    pub fn fail(&self, id: AssetId, error: impl Into<String>) {
        self.finish(id, AssetState::Failed(error.into()));
    }

    fn finish(&self, id: AssetId, state: AssetState) {
        let mut inner = self.lock();
        let Some(entry) = inner.entries.get_mut(&id) else {
            log::debug!("Dropping completion for unknown {}", id);
            return;
        };

        let event = match &state {
            AssetState::Loaded(_) => AssetEvent::Loaded(id),
            AssetState::Failed(error) => {
                log::warn!("Failed to load {}: {}", id, error);
                AssetEvent::Failed {
                    asset: id,
                    error: error.clone(),
                }
            }
            AssetState::Unloaded | AssetState::Loading => return,
        };
        entry.state = state;

        inner
            .subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}
