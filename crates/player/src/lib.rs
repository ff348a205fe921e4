pub mod config;
pub mod error;
pub mod events;
pub mod frame;
pub mod player;
pub mod practice;

pub use config::PlayerConfig;
pub use error::PlayerError;
pub use events::{EventBus, EventKind, PlayerEvent, SubscriptionId};
pub use frame::{FrameLoop, FrameToken};
pub use player::{PlaybackController, PlaybackState, PlayerSnapshot, PlayerStatus};
pub use practice::{group_steps, PracticeSession, PracticeState, PracticeStatus, PracticeStep};
