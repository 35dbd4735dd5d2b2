// Host-side tests for the frame ticker and tweens.

use recueil_core::{expo_out, Easing, FrameTicker, LagSmoothing, Tick, TickerOptions, Tween};
use std::cell::RefCell;
use std::rc::Rc;

fn recording(ticker: &FrameTicker) -> (Rc<RefCell<Vec<Tick>>>, recueil_core::Registration) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let reg = ticker.register(move |t| sink.borrow_mut().push(*t));
    (seen, reg)
}

#[test]
fn first_tick_has_zero_delta() {
    let ticker = FrameTicker::default();
    let (seen, _reg) = recording(&ticker);
    ticker.tick(5000.0);
    ticker.tick(5016.0);
    let seen = seen.borrow();
    assert_eq!(seen[0].delta_ms, 0.0);
    assert_eq!(seen[0].time_ms, 0.0);
    assert_eq!(seen[0].frame, 1);
    assert_eq!(seen[1].delta_ms, 16.0);
    assert_eq!(seen[1].time_ms, 16.0);
    assert_eq!(seen[1].frame, 2);
}

#[test]
fn backwards_clock_yields_zero_delta() {
    let ticker = FrameTicker::default();
    let (seen, _reg) = recording(&ticker);
    ticker.tick(100.0);
    ticker.tick(50.0);
    assert_eq!(seen.borrow()[1].delta_ms, 0.0);
}

#[test]
fn lag_smoothing_disabled_reports_raw_gaps() {
    let ticker = FrameTicker::new(TickerOptions::default());
    assert_eq!(ticker.lag_smoothing(), LagSmoothing::Disabled);
    let (seen, _reg) = recording(&ticker);
    ticker.tick(0.0);
    ticker.tick(2000.0);
    assert_eq!(seen.borrow()[1].delta_ms, 2000.0);
}

#[test]
fn lag_smoothing_caps_long_gaps() {
    let ticker = FrameTicker::default();
    ticker.set_lag_smoothing(LagSmoothing::standard());
    let (seen, _reg) = recording(&ticker);
    ticker.tick(0.0);
    ticker.tick(2000.0);
    ticker.tick(2016.0);
    let seen = seen.borrow();
    assert_eq!(seen[1].delta_ms, 33.0);
    assert_eq!(seen[2].delta_ms, 16.0);
    assert_eq!(seen[2].time_ms, 49.0);
}

#[test]
fn callbacks_run_in_registration_order() {
    let ticker = FrameTicker::default();
    let order = Rc::new(RefCell::new(Vec::new()));
    let a = order.clone();
    let b = order.clone();
    let _ra = ticker.register(move |_| a.borrow_mut().push("a"));
    let _rb = ticker.register(move |_| b.borrow_mut().push("b"));
    ticker.tick(0.0);
    assert_eq!(*order.borrow(), vec!["a", "b"]);
}

#[test]
fn released_callback_is_not_called() {
    let ticker = FrameTicker::default();
    let (seen, mut reg) = recording(&ticker);
    ticker.tick(0.0);
    reg.release();
    ticker.tick(16.0);
    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(ticker.registered_count(), 0);
}

#[test]
fn callback_released_mid_tick_is_skipped() {
    let ticker = FrameTicker::default();
    let later: Rc<RefCell<Option<recueil_core::Registration>>> = Rc::new(RefCell::new(None));
    let slot = later.clone();
    let _first = ticker.register(move |_| {
        if let Some(mut reg) = slot.borrow_mut().take() {
            reg.release();
        }
    });
    let calls = Rc::new(RefCell::new(0));
    let counter = calls.clone();
    *later.borrow_mut() = Some(ticker.register(move |_| *counter.borrow_mut() += 1));
    ticker.tick(0.0);
    assert_eq!(*calls.borrow(), 0);
}

#[test]
fn expo_out_reaches_one_before_the_end() {
    assert!(expo_out(0.0).abs() < 0.002);
    assert_eq!(expo_out(1.0), 1.0);
    assert_eq!(expo_out(0.999), 1.0);
    assert!(expo_out(0.5) > 0.95);
}

#[test]
fn linear_tween_interpolates() {
    let mut t = Tween::linear(0.0, 10.0, 100.0);
    assert_eq!(t.value(), 0.0);
    assert_eq!(t.advance(25.0), 2.5);
    assert!(!t.is_finished());
    assert_eq!(t.advance(100.0), 10.0);
    assert!(t.is_finished());
}

#[test]
fn zero_duration_tween_finishes_immediately() {
    let t = Tween::new(3.0, 7.0, 0.0, Easing::ExpoOut);
    assert!(t.is_finished());
    assert_eq!(t.value(), 7.0);
}

#[test]
fn negative_dt_does_not_rewind() {
    let mut t = Tween::linear(0.0, 1.0, 100.0);
    t.advance(50.0);
    assert_eq!(t.advance(-30.0), 0.5);
}
