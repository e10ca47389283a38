pub mod controller;
pub mod engine;
pub mod state;

pub use controller::{TimerController, TimerSnapshot};
pub use engine::PhaseTimer;
pub use state::{AlertRequest, Phase, TimerEvent, TimerState};
