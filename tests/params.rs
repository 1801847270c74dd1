//! Panel parameter edges and their side effects.

use courtyard::audio::{apply_sound_toggle, Playback};
use courtyard::gfx::anim::AnimationMixer;
use courtyard::scene::{ControlParams, ParamChanges};

#[derive(Default)]
struct FakePlayback {
    plays: u32,
    stops: u32,
}

impl Playback for FakePlayback {
    fn play(&mut self) {
        self.plays += 1;
    }
    fn stop(&mut self) {
        self.stops += 1;
    }
}

#[test]
fn sound_side_effect_fires_only_on_edges() {
    let mut audio = FakePlayback::default();
    let mut prev = ControlParams::default();
    // frames: off off on on off on
    let frames = [false, false, true, true, false, true];
    for sound_on in frames {
        let cur = ControlParams { sound_on, ..prev };
        if let Some(on) = ParamChanges::diff(&prev, &cur).sound {
            apply_sound_toggle(&mut audio, on);
        }
        prev = cur;
    }
    assert_eq!(audio.plays, 2);
    assert_eq!(audio.stops, 1);
}

#[test]
fn duration_edge_restarts_the_loop() {
    let mut mixer = AnimationMixer::new(2.0, 10.0);
    mixer.update(6.5);
    assert!(mixer.clip_time() > 0.0);

    let prev = ControlParams::default();
    let cur = ControlParams {
        duration: 4.0,
        ..prev
    };
    let changes = ParamChanges::diff(&prev, &cur);
    if let Some(d) = changes.duration {
        mixer.set_duration(d);
    }
    assert_eq!(mixer.clip_time(), 0.0);
    mixer.update(2.0);
    assert!((mixer.clip_time() - 1.0).abs() < 1e-5);
}

#[test]
fn animation_off_freezes_the_mixer() {
    let mut mixer = AnimationMixer::new(2.0, 10.0);
    let mut params = ControlParams::default();
    mixer.update(1.0);
    let frozen_at = mixer.clip_time();

    params.animation_on = false;
    for _ in 0..10 {
        if params.animation_on {
            mixer.update(0.5);
        }
    }
    assert_eq!(mixer.clip_time(), frozen_at);

    params.animation_on = true;
    if params.animation_on {
        mixer.update(0.5);
    }
    assert!(mixer.clip_time() > frozen_at);
}

#[test]
fn defaults_match_the_panel() {
    let p = ControlParams::default();
    assert!(!p.sound_on);
    assert!(p.animation_on);
    assert_eq!(p.duration, 10.0);
    assert_eq!(p.position, -8.0);
    assert_eq!(p.rotation, 0.0);
    assert!(ControlParams::DURATION_RANGE.contains(&p.duration));
    assert!(ControlParams::POSITION_RANGE.contains(&p.position));
}
