use super::*;
use crate::audio_data::AudioData;
use crate::events::SoundEvent;

fn clip(assets: &AssetRegistry) -> crate::asset::AssetId {
    assets.insert_loaded(AudioData::silence(Duration::from_secs(2), 100))
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn component() -> (SoundComponent, crate::asset::AssetId) {
    init_logger();
    let assets = AssetRegistry::new();
    let clip = clip(&assets);
    let component = SoundComponent::new("player", SoundComponentDesc::default(), assets).unwrap();
    (component, clip)
}

fn only_instance(component: &SoundComponent, slot: &str) -> InstanceId {
    let ids = component.slot(slot).unwrap().instance_ids();
    assert_eq!(ids.len(), 1, "expected one instance in {}", slot);
    ids[0]
}

#[test]
fn invalid_desc_is_rejected() {
    let desc = SoundComponentDesc::default().volume(-1.0);
    assert!(SoundComponent::new("player", desc, AssetRegistry::new()).is_err());
}

#[test]
fn duplicate_slot_name_is_refused() {
    let (mut sound, clip) = component();
    assert!(sound.add_slot("beep", SlotConfig::new().asset(clip)).is_some());
    assert!(
        sound
            .add_slot("beep", SlotConfig::new().asset(clip).volume(0.2))
            .is_none()
    );
    assert_eq!(sound.slot("beep").unwrap().volume(), 1.0);
}

#[test]
fn slot_keys_track_adds_and_removes() {
    let (mut sound, clip) = component();
    for name in ["a", "b", "c"] {
        sound.add_slot(name, SlotConfig::new().asset(clip));
    }
    sound.remove_slot("b");
    sound.remove_slot("missing");
    sound.add_slot("d", SlotConfig::new().asset(clip));

    let names: Vec<_> = sound.slot_names().collect();
    assert_eq!(names, vec!["a", "c", "d"]);
    assert!(sound.slots().all(|slot| sound.slot(slot.name()).is_some()));
}

#[test]
fn invalid_slot_config_is_refused() {
    let (mut sound, clip) = component();
    assert!(
        sound
            .add_slot("beep", SlotConfig::new().asset(clip).pitch(0.0))
            .is_none()
    );
    assert!(!sound.has_slot("beep"));
}

#[test]
fn autoplay_slot_starts_when_added_to_enabled_component() {
    let (mut sound, clip) = component();
    let slot = sound
        .add_slot("music", SlotConfig::new().asset(clip).auto_play(true))
        .unwrap();
    assert!(slot.is_playing());

    sound.set_enabled(false);
    let slot = sound
        .add_slot("ambience", SlotConfig::new().asset(clip).auto_play(true))
        .unwrap();
    assert_eq!(slot.instance_count(), 0);
}

#[test]
fn play_emits_event_with_instance() {
    let (mut sound, clip) = component();
    sound.add_slot("beep", SlotConfig::new().asset(clip));

    let id = sound.play("beep").unwrap();
    assert_eq!(
        sound.poll_events(),
        vec![SoundEvent::Play {
            component: sound.id(),
            slot: "beep".to_string(),
            instance: Some(id),
        }]
    );
    assert!(sound.slot("beep").unwrap().is_playing());
}

#[test]
fn play_is_silent_while_disabled() {
    let (mut sound, clip) = component();
    sound.add_slot("beep", SlotConfig::new().asset(clip));
    sound.set_entity_enabled(false);

    assert!(sound.play("beep").is_none());
    assert!(sound.poll_events().is_empty());
    assert_eq!(sound.slot("beep").unwrap().instance_count(), 0);
}

#[test]
fn play_of_unknown_slot_does_nothing() {
    let (mut sound, _) = component();
    assert!(sound.play("missing").is_none());
    assert!(sound.poll_events().is_empty());
}

#[test]
fn play_without_asset_still_reports() {
    let (mut sound, _) = component();
    sound.add_slot("empty", SlotConfig::new());

    assert!(sound.play("empty").is_none());
    let events = sound.poll_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        SoundEvent::Play { instance: None, slot, .. } if slot == "empty"
    ));
}

#[test]
fn volume_fans_out_to_non_overlapping_slots_only() {
    let (mut sound, clip) = component();
    sound.add_slot("voice", SlotConfig::new().asset(clip).volume(0.5));
    sound.add_slot("steps", SlotConfig::new().asset(clip).volume(0.5).overlap(true));
    sound.play("voice");
    sound.play("steps");

    sound.set_volume(0.5);

    let voice = only_instance(&sound, "voice");
    let steps = only_instance(&sound, "steps");
    assert_eq!(sound.slot("voice").unwrap().instance(voice).unwrap().volume(), 0.25);
    assert_eq!(sound.slot("steps").unwrap().instance(steps).unwrap().volume(), 0.5);

    // new overlapping instances pick up the current component volume
    let fresh = sound.play("steps").unwrap();
    assert_eq!(sound.slot("steps").unwrap().instance(fresh).unwrap().volume(), 0.25);
}

#[test]
fn raising_component_volume_updates_live_instance() {
    let assets = AssetRegistry::new();
    let clip = clip(&assets);
    let desc = SoundComponentDesc::default().volume(0.5);
    let mut sound = SoundComponent::new("player", desc, assets).unwrap();
    sound.add_slot("voice", SlotConfig::new().asset(clip).volume(0.4));
    let id = sound.play("voice").unwrap();
    assert!((sound.slot("voice").unwrap().instance(id).unwrap().volume() - 0.2).abs() < 1e-6);

    sound.set_volume(1.0);
    assert!((sound.slot("voice").unwrap().instance(id).unwrap().volume() - 0.4).abs() < 1e-6);
}

#[test]
fn pitch_and_distance_fan_out() {
    let (mut sound, clip) = component();
    sound.add_slot("engine", SlotConfig::new().asset(clip).pitch(2.0));
    let id = sound.play("engine").unwrap();

    sound.set_pitch(0.5);
    sound.set_ref_distance(3.0);
    sound.set_max_distance(50.0);
    sound.set_roll_off_factor(2.0);
    sound.set_distance_model(DistanceModel::Inverse);

    let instance = sound.slot("engine").unwrap().instance(id).unwrap();
    assert_eq!(instance.pitch(), 1.0);
    let distance = instance.distance();
    assert_eq!(distance.ref_distance, 3.0);
    assert_eq!(distance.max_distance, 50.0);
    assert_eq!(distance.roll_off_factor, 2.0);
    assert_eq!(distance.model, DistanceModel::Inverse);
    assert_eq!(sound.distance_model(), DistanceModel::Inverse);
}

#[test]
fn invalid_property_is_ignored() {
    let (mut sound, clip) = component();
    sound.add_slot("beep", SlotConfig::new().asset(clip));
    let id = sound.play("beep").unwrap();

    sound.set_volume(f32::NAN);
    sound.set_pitch(-1.0);
    sound.set_max_distance(-5.0);

    assert_eq!(sound.volume(), 1.0);
    assert_eq!(sound.pitch(), 1.0);
    assert_eq!(sound.max_distance(), 10000.0);
    assert_eq!(sound.slot("beep").unwrap().instance(id).unwrap().volume(), 1.0);
}

#[test]
fn positional_toggle_keeps_playing_state_and_offset() {
    let (mut sound, clip) = component();
    sound.add_slot("music", SlotConfig::new().asset(clip));
    sound.play("music");
    sound.update(Duration::from_millis(500));

    sound.set_positional(false);

    let slot = sound.slot("music").unwrap();
    let id = only_instance(&sound, "music");
    let instance = slot.instance(id).unwrap();
    assert!(!instance.is_positional());
    assert!(instance.is_playing());
    assert!((instance.current_time() - 0.5).abs() < 1e-9);
}

#[test]
fn positional_toggle_turns_paused_instance_into_stopped_one() {
    let (mut sound, clip) = component();
    sound.add_slot("music", SlotConfig::new().asset(clip));
    let before = sound.play("music").unwrap();
    sound.pause(Some("music"));

    sound.set_positional(false);

    let after = only_instance(&sound, "music");
    assert_ne!(before, after);
    assert!(sound.slot("music").unwrap().instance(after).unwrap().is_stopped());
}

#[test]
fn positional_toggle_leaves_overlapping_instances() {
    let (mut sound, clip) = component();
    sound.add_slot("steps", SlotConfig::new().asset(clip).overlap(true));
    let id = sound.play("steps").unwrap();

    sound.set_positional(false);

    let slot = sound.slot("steps").unwrap();
    assert!(slot.instance(id).unwrap().is_positional());
    let fresh = sound.play("steps").unwrap();
    assert!(!sound.slot("steps").unwrap().instance(fresh).unwrap().is_positional());
}

#[test]
fn position_follows_to_positional_instances() {
    let (mut sound, clip) = component();
    sound.add_slot("beep", SlotConfig::new().asset(clip));
    let id = sound.play("beep").unwrap();

    let target = Vec3::new(1.0, 2.0, 3.0);
    sound.set_position(target);

    assert_eq!(sound.position(), target);
    assert_eq!(sound.slot("beep").unwrap().instance(id).unwrap().position(), target);
}

#[test]
fn disable_pauses_and_enable_resumes() {
    let (mut sound, clip) = component();
    sound.add_slot("music", SlotConfig::new().asset(clip));
    sound.add_slot("steps", SlotConfig::new().asset(clip).overlap(true));
    sound.add_slot("idle", SlotConfig::new().asset(clip));
    sound.play("music");
    sound.play("steps");

    sound.set_enabled(false);

    assert!(sound.slot("music").unwrap().is_paused());
    assert!(sound.slot("steps").unwrap().is_playing());
    assert!(!sound.slot("idle").unwrap().is_paused());
    assert_eq!(sound.playing_before_disable().len(), 1);
    assert_eq!(sound.playing_before_disable().get("music"), Some(&true));

    sound.set_enabled(true);

    assert!(sound.slot("music").unwrap().is_playing());
    assert!(sound.playing_before_disable().is_empty());
}

#[test]
fn slot_paused_by_user_stays_paused_after_reenable() {
    let (mut sound, clip) = component();
    sound.add_slot("music", SlotConfig::new().asset(clip));
    sound.play("music");
    sound.pause(Some("music"));

    sound.set_entity_enabled(false);
    assert!(sound.playing_before_disable().is_empty());
    sound.set_entity_enabled(true);

    assert!(sound.slot("music").unwrap().is_paused());
}

#[test]
fn enable_starts_stopped_autoplay_slots() {
    let assets = AssetRegistry::new();
    let clip = clip(&assets);
    let desc = SoundComponentDesc::default().enabled(false);
    let mut sound = SoundComponent::new("player", desc, assets).unwrap();

    sound.add_slot("music", SlotConfig::new().asset(clip).auto_play(true));
    assert!(sound.slot("music").unwrap().is_stopped());

    sound.set_enabled(true);
    assert!(sound.slot("music").unwrap().is_playing());
}

#[test]
fn enable_requests_unloaded_assets() {
    let assets = AssetRegistry::new();
    let pending = assets.register_pending();
    let desc = SoundComponentDesc::default().enabled(false);
    let mut sound = SoundComponent::new("player", desc, assets.clone()).unwrap();
    sound.add_slot("voice", SlotConfig::new().asset(pending));

    sound.set_enabled(true);

    assert!(matches!(
        assets.state(pending),
        Some(crate::asset::AssetState::Loading)
    ));
}

#[test]
fn suppressed_enable_leaves_playback_alone() {
    let assets = AssetRegistry::new();
    let clip = clip(&assets);
    let desc = SoundComponentDesc::default()
        .enabled(false)
        .suppress_playback_side_effects(true);
    let mut sound = SoundComponent::new("editor", desc, assets).unwrap();
    sound.add_slot("music", SlotConfig::new().asset(clip).auto_play(true));

    sound.set_enabled(true);
    assert!(sound.slot("music").unwrap().is_stopped());

    sound.set_suppress_playback_side_effects(false);
    sound.set_enabled(false);
    sound.set_enabled(true);
    assert!(sound.slot("music").unwrap().is_playing());
}

#[test]
fn set_slots_replaces_everything() {
    let (mut sound, clip) = component();
    sound.add_slot("old", SlotConfig::new().asset(clip));
    sound.play("old");

    let mut kept = sound.new_slot("kept", SlotConfig::new().asset(clip));
    let kept_id = kept.play().unwrap();

    sound.set_slots([
        SlotInput::from(kept),
        SlotConfig::named("music").asset(clip).auto_play(true).into(),
        SlotConfig::new().asset(clip).into(),
    ]);

    let names: Vec<_> = sound.slot_names().collect();
    assert_eq!(names, vec!["kept", "music"]);
    assert!(sound.slot("old").is_none());
    assert!(sound.slot("kept").unwrap().instance(kept_id).is_some());
    assert!(sound.slot("music").unwrap().is_playing());
}

#[test]
fn remove_slot_hands_back_stopped_slot() {
    let (mut sound, clip) = component();
    sound.add_slot("old", SlotConfig::new().asset(clip));
    sound.play("old");

    let mut old = sound.remove_slot("old").unwrap();
    assert!(old.is_stopped());
    assert!(!old.stop());
    assert!(sound.remove_slot("old").is_none());

    sound.set_slots(Vec::new());
    assert_eq!(sound.slots().count(), 0);
}

#[test]
fn adopted_slot_takes_component_volume() {
    let (mut sound, clip) = component();
    sound.set_volume(0.5);

    let assets = sound.assets().clone();
    let mut foreign = SoundSlot::new(
        "voice",
        SlotConfig::new().asset(clip),
        assets,
        Arc::new(PlaybackFactory),
    );
    let id = foreign.play().unwrap();
    assert_eq!(foreign.instance(id).unwrap().volume(), 1.0);

    sound.set_slots([SlotInput::Existing(foreign)]);
    assert_eq!(sound.slot("voice").unwrap().instance(id).unwrap().volume(), 0.5);
}

#[test]
fn named_pause_always_emits() {
    let (mut sound, clip) = component();
    sound.add_slot("beep", SlotConfig::new().asset(clip));

    sound.pause(Some("beep"));
    sound.pause(Some("missing"));

    assert_eq!(
        sound.poll_events(),
        vec![SoundEvent::Pause {
            component: sound.id(),
            slot: Some("beep".to_string()),
        }]
    );
}

#[test]
fn bulk_pause_emits_with_nothing_playing() {
    let (mut sound, _) = component();
    sound.pause(None);
    assert_eq!(
        sound.poll_events(),
        vec![SoundEvent::Pause {
            component: sound.id(),
            slot: None,
        }]
    );
}

#[test]
fn named_resume_and_stop_emit_only_on_change() {
    let (mut sound, clip) = component();
    sound.add_slot("beep", SlotConfig::new().asset(clip));
    sound.play("beep");
    sound.poll_events();

    sound.resume(Some("beep"));
    assert!(sound.poll_events().is_empty());

    sound.pause(Some("beep"));
    sound.resume(Some("beep"));
    let events = sound.poll_events();
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[1], SoundEvent::Resume { slot: Some(s), .. } if s == "beep"));

    sound.stop(Some("beep"));
    sound.stop(Some("beep"));
    let events = sound.poll_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], SoundEvent::Stop { slot: Some(s), .. } if s == "beep"));
}

#[test]
fn bulk_operations_emit_without_slot() {
    let (mut sound, clip) = component();
    sound.add_slot("a", SlotConfig::new().asset(clip));
    sound.add_slot("b", SlotConfig::new().asset(clip));
    sound.play("a");
    sound.play("b");
    sound.poll_events();

    sound.pause(None);
    assert!(sound.slots().all(|slot| slot.is_paused()));
    sound.resume(None);
    assert!(sound.slots().all(|slot| slot.is_playing()));
    sound.stop(None);
    assert!(sound.slots().all(|slot| slot.instance_count() == 0));

    let events = sound.poll_events();
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(SoundEvent::is_bulk));
    assert!(matches!(events[0], SoundEvent::Pause { .. }));
    assert!(matches!(events[1], SoundEvent::Resume { .. }));
    assert!(matches!(events[2], SoundEvent::Stop { .. }));
}

#[test]
fn deferred_play_starts_after_update() {
    let assets = AssetRegistry::new();
    let pending = assets.register_pending();
    let mut sound = SoundComponent::new("player", SoundComponentDesc::default(), assets.clone())
        .unwrap();
    sound.add_slot("voice", SlotConfig::new().asset(pending));

    let id = sound.play("voice").unwrap();
    assert!(sound.slot("voice").unwrap().is_pending(id));

    assets.complete(pending, AudioData::silence(Duration::from_secs(1), 100));
    assert!(!sound.slot("voice").unwrap().is_playing());

    sound.update(Duration::ZERO);
    assert!(sound.slot("voice").unwrap().instance(id).unwrap().is_playing());
}

#[test]
fn failed_load_clears_pending_instances() {
    let assets = AssetRegistry::new();
    let pending = assets.register_pending();
    let mut sound = SoundComponent::new("player", SoundComponentDesc::default(), assets.clone())
        .unwrap();
    sound.add_slot("voice", SlotConfig::new().asset(pending));
    let id = sound.play("voice").unwrap();

    assets.fail(pending, "decoder error");
    sound.update(Duration::ZERO);

    let slot = sound.slot("voice").unwrap();
    assert!(!slot.is_pending(id));
    assert!(slot.is_stopped());
}

#[test]
fn removed_slot_ignores_completion() {
    let assets = AssetRegistry::new();
    let pending = assets.register_pending();
    let mut sound = SoundComponent::new("player", SoundComponentDesc::default(), assets.clone())
        .unwrap();
    sound.add_slot("voice", SlotConfig::new().asset(pending));
    sound.play("voice");

    let removed = sound.remove_slot("voice").unwrap();
    assets.complete(pending, AudioData::silence(Duration::from_secs(1), 100));
    sound.update(Duration::ZERO);

    assert_eq!(removed.instance_count(), 0);
    assert!(!sound.has_slot("voice"));
}

#[test]
fn subscribers_receive_events() {
    let (mut sound, clip) = component();
    let observer = sound.subscribe();
    sound.add_slot("beep", SlotConfig::new().asset(clip));

    sound.play("beep");
    sound.stop(None);

    let received: Vec<_> = observer.try_iter().collect();
    assert_eq!(received.len(), 2);
    assert!(received.iter().all(|event| event.component() == sound.id()));
}

#[test]
fn ended_overlapping_instances_are_pruned_on_update() {
    let (mut sound, clip) = component();
    sound.add_slot("steps", SlotConfig::new().asset(clip).overlap(true));
    sound.play("steps");
    sound.play("steps");

    sound.update(Duration::from_secs(3));
    assert_eq!(sound.slot("steps").unwrap().instance_count(), 0);
}

#[test]
fn pending_slot_stays_silent_while_disabled() {
    let assets = AssetRegistry::new();
    let pending = assets.register_pending();
    let mut sound = SoundComponent::new("player", SoundComponentDesc::default(), assets.clone())
        .unwrap();
    sound.add_slot("voice", SlotConfig::new().asset(pending));
    sound.play("voice");

    sound.set_entity_enabled(false);
    assert_eq!(sound.playing_before_disable().get("voice"), Some(&true));

    assets.complete(pending, AudioData::silence(Duration::from_secs(1), 100));
    sound.update(Duration::ZERO);
    assert!(!sound.slot("voice").unwrap().is_playing());
    assert!(sound.slot("voice").unwrap().is_paused());

    sound.set_entity_enabled(true);
    assert!(sound.slot("voice").unwrap().is_playing());
}

#[test]
fn disable_then_enable_before_load_still_starts_on_load() {
    let assets = AssetRegistry::new();
    let pending = assets.register_pending();
    let mut sound = SoundComponent::new("player", SoundComponentDesc::default(), assets.clone())
        .unwrap();
    sound.add_slot("voice", SlotConfig::new().asset(pending));
    sound.play("voice");

    sound.set_enabled(false);
    sound.set_enabled(true);
    assets.complete(pending, AudioData::silence(Duration::from_secs(1), 100));
    sound.update(Duration::ZERO);

    assert!(sound.slot("voice").unwrap().is_playing());
}

#[test]
fn pause_before_load_is_honoured() {
    let assets = AssetRegistry::new();
    let pending = assets.register_pending();
    let mut sound = SoundComponent::new("player", SoundComponentDesc::default(), assets.clone())
        .unwrap();
    sound.add_slot("voice", SlotConfig::new().asset(pending));
    sound.play("voice");
    sound.pause(Some("voice"));

    assets.complete(pending, AudioData::silence(Duration::from_secs(1), 100));
    sound.update(Duration::ZERO);

    let slot = sound.slot("voice").unwrap();
    assert!(!slot.is_playing());
    assert!(slot.is_paused());

    sound.poll_events();
    sound.resume(Some("voice"));
    assert!(sound.slot("voice").unwrap().is_playing());
    assert_eq!(
        sound.poll_events(),
        vec![SoundEvent::Resume {
            component: sound.id(),
            slot: Some("voice".to_string()),
        }]
    );
}

#[test]
fn failed_asset_does_not_accumulate_instances() {
    let assets = AssetRegistry::new();
    let broken = assets.register_pending();
    let mut sound = SoundComponent::new("player", SoundComponentDesc::default(), assets.clone())
        .unwrap();
    sound.add_slot("steps", SlotConfig::new().asset(broken).overlap(true));
    sound.play("steps");
    assets.fail(broken, "unsupported codec");
    sound.update(Duration::ZERO);

    for _ in 0..100 {
        assert!(sound.play("steps").is_none());
        sound.update(Duration::from_secs(5));
    }
    assert_eq!(sound.slot("steps").unwrap().instance_count(), 0);

    sound.poll_events();
    sound.stop(Some("steps"));
    assert!(sound.poll_events().is_empty());
}

#[test]
fn second_disable_overwrites_record() {
    let (mut sound, clip) = component();
    sound.add_slot("music", SlotConfig::new().asset(clip));
    sound.play("music");

    sound.set_enabled(false);
    assert_eq!(sound.playing_before_disable().get("music"), Some(&true));

    sound.on_disable();
    assert!(sound.playing_before_disable().is_empty());
    assert!(sound.slot("music").unwrap().is_paused());
}
