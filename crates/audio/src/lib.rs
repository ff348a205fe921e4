pub mod backend;
pub mod error;
pub mod schedule;
pub mod transport;

pub use backend::{AudioRenderer, SimulatedClock, SimulatedRenderer, WallClockRenderer};
pub use error::AudioError;
pub use schedule::{schedule_notes, ScheduledNote};
pub use transport::{validate_tempo_scale, TimingInfo, Transport, TransportClock};
