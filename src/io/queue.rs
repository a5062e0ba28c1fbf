#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

use crate::io::midi::MidiEvent;

/// Source of at most one event per control tick.
///
/// The MIDI transport runs on its own thread; the control loop polls this
/// once per tick and must never block or allocate doing so.
pub trait EventSource {
    fn poll(&mut self) -> Option<MidiEvent>;
}

#[cfg(feature = "rtrb")]
impl EventSource for Consumer<MidiEvent> {
    fn poll(&mut self) -> Option<MidiEvent> {
        Consumer::pop(self).ok()
    }
}

/// An always-empty source, for driving the loop without a transport.
impl EventSource for () {
    fn poll(&mut self) -> Option<MidiEvent> {
        None
    }
}

/// Build the lock-free SPSC queue connecting the transport thread to the
/// control loop.
#[cfg(feature = "rtrb")]
pub fn event_queue(capacity: usize) -> (Producer<MidiEvent>, Consumer<MidiEvent>) {
    RingBuffer::new(capacity)
}

#[cfg(all(test, feature = "rtrb"))]
mod tests {
    use super::*;

    #[test]
    fn queue_delivers_in_arrival_order() {
        let (mut tx, mut rx) = event_queue(8);

        tx.push(MidiEvent::NoteOn {
            channel: 0,
            key: 60,
            velocity: 100,
        })
        .unwrap();
        tx.push(MidiEvent::NoteOff {
            channel: 0,
            key: 60,
            velocity: 0,
        })
        .unwrap();

        assert!(matches!(
            rx.poll(),
            Some(MidiEvent::NoteOn { key: 60, .. })
        ));
        assert!(matches!(
            rx.poll(),
            Some(MidiEvent::NoteOff { key: 60, .. })
        ));
        assert_eq!(rx.poll(), None);
    }
}
