//! Notifications emitted by sound components

use crate::slot::InstanceId;
use crossbeam_channel::{Receiver, Sender};
use uuid::Uuid;

/// Identity of a sound component, carried by every event it emits.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComponentId(Uuid);

impl ComponentId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

/// Playback notifications.
///
/// `slot` is `None` for bulk operations (pause/resume/stop called without a
/// slot name); observers cannot tell which slots were affected in that case.
#[derive(Debug, Clone, PartialEq)]
pub enum SoundEvent {
    Play {
        component: ComponentId,
        slot: String,
        /// None when the slot refused to create an instance (no asset)
        instance: Option<InstanceId>,
    },
    Pause {
        component: ComponentId,
        slot: Option<String>,
    },
    Resume {
        component: ComponentId,
        slot: Option<String>,
    },
    Stop {
        component: ComponentId,
        slot: Option<String>,
    },
}

impl SoundEvent {
    pub fn component(&self) -> ComponentId {
        match self {
            Self::Play { component, .. }
            | Self::Pause { component, .. }
            | Self::Resume { component, .. }
            | Self::Stop { component, .. } => *component,
        }
    }

    /// Slot the event refers to, `None` for bulk operations.
    pub fn slot(&self) -> Option<&str> {
        match self {
            Self::Play { slot, .. } => Some(slot),
            Self::Pause { slot, .. } | Self::Resume { slot, .. } | Self::Stop { slot, .. } => {
                slot.as_deref()
            }
        }
    }

    pub fn is_bulk(&self) -> bool {
        self.slot().is_none()
    }
}

/// Fan-out channel for [`SoundEvent`]s.
///
/// The bus keeps one receiver for [`drain`](Self::drain) and hands out extra
/// receivers to observers; subscribers whose receiver was dropped are pruned
/// on the next emit.
#[derive(Debug)]
pub struct EventBus {
    subscribers: Vec<Sender<SoundEvent>>,
    local: Receiver<SoundEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, local) = crossbeam_channel::unbounded();
        Self {
            subscribers: vec![sender],
            local,
        }
    }

    pub fn subscribe(&mut self) -> Receiver<SoundEvent> {
        let (sender, receiver) = crossbeam_channel::unbounded();
        self.subscribers.push(sender);
        receiver
    }

    pub fn emit(&mut self, event: SoundEvent) {
        log::debug!("Emitting {:?}", event);
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    /// Takes every event queued on the bus's own receiver.
    pub fn drain(&self) -> Vec<SoundEvent> {
        self.local.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_and_local_receiver_see_events() {
        let mut bus = EventBus::new();
        let observer = bus.subscribe();
        let component = ComponentId::new();

        bus.emit(SoundEvent::Pause {
            component,
            slot: None,
        });

        let local = bus.drain();
        assert_eq!(local.len(), 1);
        assert!(local[0].is_bulk());
        assert_eq!(observer.try_recv().unwrap().component(), component);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut bus = EventBus::new();
        drop(bus.subscribe());
        bus.emit(SoundEvent::Stop {
            component: ComponentId::new(),
            slot: Some("beep".to_string()),
        });
        assert_eq!(bus.subscribers.len(), 1);
        assert_eq!(bus.drain()[0].slot(), Some("beep"));
    }
}
