//! Thompson-sampling allocation engine: sticky per-session assignment,
//! goal-driven win/loss recording and read-side introspection over a
//! shared counter store.

#![warn(clippy::unwrap_used)]

pub mod allocator;
pub mod bandits;
pub mod coordinator;
pub mod events;
pub mod introspection;
pub mod random;
pub mod recorder;
pub mod session;

pub use allocator::Allocator;
pub use bandits::{ArmStats, BanditEngine};
pub use coordinator::{AssignmentCoordinator, DEFAULT_OPTIONS};
pub use events::{EventSink, MemorySink, StdoutSink, TracingSink};
pub use introspection::{Introspection, TestSummary};
pub use random::{RandomSource, SeededRandom, ThreadRandom};
pub use recorder::OutcomeRecorder;
pub use session::{MemorySession, SessionHandle, MANUAL_OVERRIDE_KEY};
