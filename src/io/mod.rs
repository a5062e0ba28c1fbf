// Purpose - external interfaces: decoded events in, control voltages out

pub mod midi;
pub mod queue;
pub mod sink;

pub use midi::MidiEvent;
pub use queue::EventSource;
pub use sink::{ControlSink, ModJack};
