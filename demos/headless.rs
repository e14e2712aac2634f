use anyhow::Result;
use soundslots::{
    AssetRegistry, AudioData, Lifecycle, SlotConfig, SoundComponent, SoundComponentDesc, Vec3,
};
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .init();

    let assets = AssetRegistry::new();
    // Decode a file when one is given, otherwise fall back to silence
    let music = match std::env::args().nth(1) {
        Some(path) => assets.register_path(path),
        None => assets.insert_loaded(AudioData::silence(Duration::from_secs(3), 48000)),
    };
    let step = assets.insert_loaded(AudioData::silence(Duration::from_millis(250), 48000));

    let desc = SoundComponentDesc::default().volume(0.8).ref_distance(2.0);
    let mut sound = SoundComponent::new("player", desc, assets)?;
    sound.add_slot("music", SlotConfig::new().asset(music).looping(true));
    sound.add_slot("steps", SlotConfig::new().asset(step).overlap(true));

    log::info!("Starting playback...");
    sound.play("music");
    for frame in 0..120 {
        if frame % 20 == 0 {
            sound.play("steps");
        }
        sound.set_position(Vec3::new(frame as f32 * 0.1, 0.0, 0.0));
        sound.update(FRAME);
        for event in sound.poll_events() {
            log::info!("{:?}", event);
        }
    }

    log::info!("Disabling entity...");
    sound.set_entity_enabled(false);
    log::info!("Paused before disable: {:?}", sound.playing_before_disable());

    log::info!("Enabling entity...");
    sound.set_entity_enabled(true);
    sound.update(FRAME);

    log::info!("Switching to non-positional playback...");
    sound.set_positional(false);

    sound.stop(None);
    for event in sound.poll_events() {
        log::info!("{:?}", event);
    }
    log::info!("Headless demo completed");
    Ok(())
}
