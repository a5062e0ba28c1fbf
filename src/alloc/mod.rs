// Purpose: the voice allocation state machine.
// Two fixed voice slots, Unison/Duophonic policy, legato vs trigger
// decisions. Everything here is fixed-capacity; the tick path never
// touches the heap.

pub mod allocator;
pub mod voice;

pub use allocator::{Allocator, AllocatorConfig, PlayMode};
pub use voice::{AssignedPitch, Voice, VoiceId};
