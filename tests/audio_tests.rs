// Host-side tests for the ambient audio mapper using a recording fake engine.

use recueil_core::{
    rate_for_step, volume_for_step, AmbientAudio, AmbientAudioParams, AudioEngine, AudioError,
    AudioVoice, FrameTicker, LoadOutcome, ProgressionStore, VoiceSource, VoiceState,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct VoiceLog {
    volume: f32,
    rate: Option<f32>,
    volumes: Vec<f32>,
    stops: usize,
    unloads: usize,
}

struct FakeVoice {
    log: Rc<RefCell<VoiceLog>>,
    fail_release: bool,
}

impl AudioVoice for FakeVoice {
    fn volume(&self) -> f32 {
        self.log.borrow().volume
    }

    fn set_volume(&mut self, volume: f32) {
        let mut log = self.log.borrow_mut();
        log.volume = volume;
        log.volumes.push(volume);
    }

    fn set_rate(&mut self, rate: f32) {
        self.log.borrow_mut().rate = Some(rate);
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.log.borrow_mut().stops += 1;
        if self.fail_release {
            return Err(AudioError::Playback("already stopped".into()));
        }
        Ok(())
    }

    fn unload(&mut self) -> Result<(), AudioError> {
        self.log.borrow_mut().unloads += 1;
        if self.fail_release {
            return Err(AudioError::Release("gone".into()));
        }
        Ok(())
    }
}

#[derive(Default)]
struct FakeEngine {
    unavailable: bool,
    fail_construct: bool,
    fail_release: bool,
    loads: RefCell<Vec<VoiceSource>>,
    outcome: Rc<RefCell<Option<LoadOutcome>>>,
    log: Rc<RefCell<VoiceLog>>,
}

impl FakeEngine {
    fn finish_load(&self, result: Result<(), AudioError>) {
        let cb = self.outcome.borrow_mut().take().expect("load pending");
        cb(result);
    }
}

impl AudioEngine for FakeEngine {
    fn is_available(&self) -> bool {
        !self.unavailable
    }

    fn load(
        &self,
        source: &VoiceSource,
        on_outcome: LoadOutcome,
    ) -> Result<Box<dyn AudioVoice>, AudioError> {
        self.loads.borrow_mut().push(source.clone());
        if self.fail_construct {
            return Err(AudioError::Load("bad source".into()));
        }
        *self.outcome.borrow_mut() = Some(on_outcome);
        self.log.borrow_mut().volume = source.initial_volume;
        Ok(Box::new(FakeVoice {
            log: self.log.clone(),
            fail_release: self.fail_release,
        }))
    }
}

struct Rig {
    engine: FakeEngine,
    store: ProgressionStore,
    ticker: FrameTicker,
    now: f64,
}

impl Rig {
    fn new(engine: FakeEngine) -> Self {
        let ticker = FrameTicker::default();
        ticker.tick(0.0);
        Self {
            engine,
            store: ProgressionStore::new(),
            ticker,
            now: 0.0,
        }
    }

    fn mount(&self) -> AmbientAudio {
        AmbientAudio::mount(
            &self.engine,
            &self.store,
            &self.ticker,
            AmbientAudioParams::default(),
        )
    }

    fn advance(&mut self, ms: f64) {
        self.now += ms;
        self.ticker.tick(self.now);
    }

    fn volume(&self) -> f32 {
        self.engine.log.borrow().volume
    }

    fn rate(&self) -> Option<f32> {
        self.engine.log.borrow().rate
    }
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

#[test]
fn volume_table_and_fallback() {
    let p = AmbientAudioParams::default();
    let expected = [0.05, 0.1, 0.15, 0.2, 0.18, 0.15, 0.12, 0.08, 0.05];
    for (step, v) in expected.iter().enumerate() {
        assert_eq!(volume_for_step(&p, step as i32), *v);
    }
    assert_eq!(volume_for_step(&p, 9), 0.05);
    assert_eq!(volume_for_step(&p, 99), 0.05);
    assert_eq!(volume_for_step(&p, -1), 0.05);
}

#[test]
fn rate_is_linear_in_step() {
    let p = AmbientAudioParams::default();
    assert!(approx(rate_for_step(&p, 0), 0.85));
    assert!(approx(rate_for_step(&p, 1), 0.88));
    assert!(approx(rate_for_step(&p, 8), 1.09));
    assert!(approx(rate_for_step(&p, 99), 3.82));
}

#[test]
fn mount_requests_a_looping_silent_voice() {
    let rig = Rig::new(FakeEngine::default());
    let audio = rig.mount();
    assert_eq!(audio.state(), VoiceState::Loading);
    let loads = rig.engine.loads.borrow();
    assert_eq!(loads.len(), 1);
    assert!(loads[0].looping);
    assert!(loads[0].autoplay);
    assert_eq!(loads[0].initial_volume, 0.0);
    assert!(loads[0].url.ends_with("humming_waves.ogg"));
}

#[test]
fn unavailable_environment_stays_uninitialized() {
    let mut rig = Rig::new(FakeEngine {
        unavailable: true,
        ..FakeEngine::default()
    });
    let audio = rig.mount();
    assert_eq!(audio.state(), VoiceState::Uninitialized);
    assert!(rig.engine.loads.borrow().is_empty());
    rig.store.start_intro();
    rig.advance(5000.0);
    assert_eq!(audio.state(), VoiceState::Uninitialized);
}

#[test]
fn construction_failure_leaves_voice_inert() {
    let mut rig = Rig::new(FakeEngine {
        fail_construct: true,
        ..FakeEngine::default()
    });
    let audio = rig.mount();
    assert_eq!(audio.state(), VoiceState::Uninitialized);
    rig.store.set_intro_step(3);
    rig.advance(3000.0);
    assert!(rig.engine.log.borrow().volumes.is_empty());
}

#[test]
fn load_success_fades_in_to_baseline() {
    let mut rig = Rig::new(FakeEngine::default());
    let audio = rig.mount();
    rig.engine.finish_load(Ok(()));
    assert_eq!(audio.state(), VoiceState::Playing);
    assert!(audio.is_fading());
    rig.advance(1500.0);
    assert!(approx(rig.volume(), 0.025));
    rig.advance(1500.0);
    assert!(approx(rig.volume(), 0.05));
    assert!(!audio.is_fading());
}

#[test]
fn load_failure_is_contained() {
    let mut rig = Rig::new(FakeEngine::default());
    let audio = rig.mount();
    rig.engine.finish_load(Err(AudioError::Load("404".into())));
    assert_eq!(audio.state(), VoiceState::Uninitialized);
    rig.store.start_intro();
    rig.advance(3000.0);
    assert!(rig.engine.log.borrow().volumes.is_empty());
    assert_eq!(rig.rate(), None);
}

#[test]
fn step_during_loading_applies_rate_on_load() {
    let rig = Rig::new(FakeEngine::default());
    let _audio = rig.mount();
    rig.store.set_intro_step(4);
    assert_eq!(rig.rate(), None);
    rig.engine.finish_load(Ok(()));
    assert!(approx(rig.rate().unwrap_or_default(), 0.97));
}

#[test]
fn narrative_steps_drive_volume_and_rate() {
    let mut rig = Rig::new(FakeEngine::default());
    let audio = rig.mount();
    rig.engine.finish_load(Ok(()));
    rig.advance(3000.0);

    rig.store.finish_loading();
    rig.store.start_intro();
    assert!(approx(rig.rate().unwrap_or_default(), 0.88));
    rig.advance(2000.0);
    assert!(approx(rig.volume(), 0.1));

    rig.store.set_intro_step(8);
    assert!(approx(rig.rate().unwrap_or_default(), 1.09));
    rig.advance(1000.0);
    assert!(approx(rig.volume(), 0.075));
    rig.advance(1000.0);
    assert!(approx(rig.volume(), 0.05));

    rig.store.set_intro_step(99);
    assert!(approx(rig.rate().unwrap_or_default(), 3.82));
    rig.advance(2000.0);
    assert!(approx(rig.volume(), 0.05));
    assert_eq!(audio.state(), VoiceState::Playing);
}

#[test]
fn new_step_supersedes_running_fade() {
    let mut rig = Rig::new(FakeEngine::default());
    let _audio = rig.mount();
    rig.engine.finish_load(Ok(()));
    rig.advance(3000.0);
    rig.store.set_intro_step(3); // 0.05 -> 0.2
    rig.advance(1000.0);
    assert!(approx(rig.volume(), 0.125));
    rig.store.set_intro_step(1); // from the volume heard now -> 0.1
    rig.advance(1000.0);
    assert!(approx(rig.volume(), 0.1125));
    rig.advance(1000.0);
    assert!(approx(rig.volume(), 0.1));
}

#[test]
fn release_stops_and_unloads_once() {
    let mut rig = Rig::new(FakeEngine::default());
    let mut audio = rig.mount();
    rig.engine.finish_load(Ok(()));
    audio.release();
    audio.release();
    assert_eq!(audio.state(), VoiceState::Released);
    assert_eq!(rig.engine.log.borrow().stops, 1);
    assert_eq!(rig.engine.log.borrow().unloads, 1);
    assert_eq!(rig.store.subscriber_count(), 0);
    assert_eq!(rig.ticker.registered_count(), 0);

    let before = rig.engine.log.borrow().volumes.len();
    rig.store.set_intro_step(2);
    rig.advance(2000.0);
    assert_eq!(rig.engine.log.borrow().volumes.len(), before);
}

#[test]
fn release_failures_are_swallowed() {
    let rig = Rig::new(FakeEngine {
        fail_release: true,
        ..FakeEngine::default()
    });
    let mut audio = rig.mount();
    rig.engine.finish_load(Ok(()));
    audio.release();
    assert_eq!(audio.state(), VoiceState::Released);
    assert_eq!(rig.engine.log.borrow().unloads, 1);
}

#[test]
fn late_load_after_release_is_ignored() {
    let rig = Rig::new(FakeEngine::default());
    let mut audio = rig.mount();
    audio.release();
    rig.engine.finish_load(Ok(()));
    assert_eq!(audio.state(), VoiceState::Released);
}

#[test]
fn manual_fade_only_while_playing() {
    let mut rig = Rig::new(FakeEngine::default());
    let audio = rig.mount();
    audio.fade(0.0, 1.0, 100.0);
    assert!(!audio.is_fading());
    rig.engine.finish_load(Ok(()));
    rig.advance(3000.0);
    audio.fade(0.5, 0.0, 100.0);
    rig.advance(50.0);
    assert!(approx(rig.volume(), 0.25));
}
