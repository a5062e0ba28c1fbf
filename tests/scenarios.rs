//! End-to-end engine scenarios driven through the control loop.

use redblue::alloc::VoiceId;
use redblue::cv::OutputFrame;
use redblue::io::{ControlSink, MidiEvent, ModJack};
use redblue::runtime::ControlLoop;

/// Discards the committed levels; these tests assert on the returned
/// output frames instead.
struct NullSink;

impl ControlSink for NullSink {
    fn pitch_cv(&mut self, _: VoiceId, _: f32) {}
    fn gate(&mut self, _: VoiceId, _: bool) {}
    fn mod_cv(&mut self, _: ModJack, _: f32) {}
}

const RED: usize = 0;
const BLUE: usize = 1;

fn note_on(channel: u8, key: u8, velocity: u8) -> MidiEvent {
    MidiEvent::NoteOn {
        channel,
        key,
        velocity,
    }
}

fn note_off(channel: u8, key: u8) -> MidiEvent {
    MidiEvent::NoteOff {
        channel,
        key,
        velocity: 0,
    }
}

fn cc(controller: u8, value: u8) -> MidiEvent {
    MidiEvent::ControlChange {
        channel: 0,
        controller,
        value,
    }
}

fn send(engine: &mut ControlLoop, event: MidiEvent) -> OutputFrame {
    engine.tick(Some(event), &mut NullSink)
}

fn idle(engine: &mut ControlLoop) -> OutputFrame {
    engine.tick(None, &mut NullSink)
}

fn volts(note: u8) -> f32 {
    (note as f32 - 36.0) / 12.0
}

#[test]
fn duophonic_scenario() {
    let mut engine = ControlLoop::default();

    let frame = send(&mut engine, note_on(1, 48, 100));
    assert_eq!(frame.pitch[RED], volts(48));
    assert!(frame.gate[RED] && frame.retrigger[RED]);
    assert!(engine.allocator().voice(VoiceId::Red).accent());

    let frame = send(&mut engine, note_on(1, 52, 60));
    assert_eq!(frame.pitch[BLUE], volts(52));
    assert!(frame.gate[BLUE] && frame.retrigger[BLUE]);
    assert!(!engine.allocator().voice(VoiceId::Blue).accent());
    assert!(frame.gate[RED], "first note keeps sounding");

    let frame = send(&mut engine, note_off(1, 48));
    assert!(!frame.gate[RED]);
    assert!(frame.gate[BLUE]);

    let frame = send(&mut engine, note_off(1, 52));
    assert!(!frame.gate[BLUE]);
}

#[test]
fn unison_scenario() {
    let mut engine = ControlLoop::default();

    // First note after silence always triggers, accent at full velocity.
    let frame = send(&mut engine, note_on(0, 60, 127));
    assert_eq!(frame.pitch, [volts(60); 2]);
    assert!(frame.gate[RED] && frame.gate[BLUE]);
    assert!(frame.retrigger[RED] && frame.retrigger[BLUE]);
    assert!(engine.allocator().voice(VoiceId::Red).accent());

    // Glide lane low: the second note snaps immediately, no trigger.
    let frame = send(&mut engine, note_on(0, 67, 40));
    assert_eq!(frame.pitch, [volts(67); 2]);
    assert!(!frame.retrigger[RED] && !frame.retrigger[BLUE]);
    assert!(frame.gate[RED] && frame.gate[BLUE]);

    // Releasing the older note changes nothing audible: legato onto the
    // note still held.
    let frame = send(&mut engine, note_off(0, 60));
    assert_eq!(frame.pitch, [volts(67); 2]);
    assert!(frame.gate[RED] && frame.gate[BLUE]);
    assert!(!frame.retrigger[RED]);
}

#[test]
fn duophonic_two_held_notes_occupy_distinct_voices() {
    // Exhaustive over a small grid of note pairs and orders.
    for first in [40u8, 52, 60] {
        for second in [45u8, 55, 64] {
            let mut engine = ControlLoop::default();
            send(&mut engine, note_on(1, first, 100));
            send(&mut engine, note_on(1, second, 100));

            let alloc = engine.allocator();
            let red = alloc.voice(VoiceId::Red).assigned().map(|p| p.note());
            let blue = alloc.voice(VoiceId::Blue).assigned().map(|p| p.note());
            assert!(
                (red == Some(first) && blue == Some(second))
                    || (red == Some(second) && blue == Some(first)),
                "notes {first}/{second} must land on distinct voices, got {red:?}/{blue:?}"
            );
        }
    }
}

#[test]
fn duophonic_fairness_alternates_voices() {
    let mut engine = ControlLoop::default();

    // Sequential note-ons with no releases: target alternates R,B,R,B,…
    let mut landed = Vec::new();
    for (i, key) in (0..6).map(|i| (i, 50 + 2 * i as u8)) {
        let frame = send(&mut engine, note_on(1, key, 100));
        let voice = if frame.retrigger[RED] { RED } else { BLUE };
        landed.push(voice);
        assert!(frame.retrigger[voice], "note {i} must trigger exactly once");
    }
    assert_eq!(landed, [RED, BLUE, RED, BLUE, RED, BLUE]);
}

#[test]
fn mode_switch_clears_previous_assignments() {
    let mut engine = ControlLoop::default();

    send(&mut engine, note_on(0, 60, 100)); // unison
    let frame = send(&mut engine, note_on(1, 52, 100)); // duophonic switch

    assert!(frame.retrigger[RED], "switch note is a fresh attack");
    assert!(!frame.gate[BLUE], "unison partner did not survive the reset");
    assert_eq!(engine.state().notes(), &[52]);
}

#[test]
fn unison_glide_is_monotonic_with_no_trigger() {
    let mut engine = ControlLoop::default();

    send(&mut engine, note_on(0, 60, 100));
    send(&mut engine, cc(64, 127)); // glide lane at full
    let frame = send(&mut engine, note_on(0, 64, 100));
    assert!(!frame.retrigger[RED], "glide continuation must not trigger");

    let mut previous = frame.pitch[RED];
    let target = volts(64);
    for _ in 0..120 {
        let frame = idle(&mut engine);
        assert!(frame.pitch[RED] >= previous, "glide must be monotonic");
        assert!(frame.pitch[RED] <= target, "glide must not overshoot");
        previous = frame.pitch[RED];
    }
    assert_eq!(previous, target);
}

#[test]
fn unison_snap_reaches_target_immediately() {
    let mut engine = ControlLoop::default();

    send(&mut engine, note_on(0, 60, 100));
    let frame = send(&mut engine, note_on(0, 64, 100)); // glide lanes at 0
    assert_eq!(frame.pitch[RED], volts(64));
    assert!(!frame.retrigger[RED]);
}

#[test]
fn first_note_after_silence_triggers_even_with_glide_enabled() {
    let mut engine = ControlLoop::default();

    send(&mut engine, cc(65, 127));
    let frame = send(&mut engine, note_on(0, 60, 100));
    assert!(frame.retrigger[RED] && frame.retrigger[BLUE]);
    assert_eq!(frame.pitch[RED], volts(60));
}

#[test]
fn unassigned_note_off_changes_nothing() {
    let mut engine = ControlLoop::default();

    send(&mut engine, note_on(1, 48, 100));
    idle(&mut engine); // let the trigger expire
    let before = idle(&mut engine);

    let after = send(&mut engine, note_off(1, 71));
    assert_eq!(before, after);
}

#[test]
fn panic_controller_silences_everything() {
    let mut engine = ControlLoop::default();

    send(&mut engine, note_on(1, 48, 100));
    send(&mut engine, note_on(1, 52, 100));
    let frame = send(&mut engine, cc(123, 0));

    assert!(!frame.gate[RED] && !frame.gate[BLUE]);
    assert!(engine.state().notes().is_empty());
}
