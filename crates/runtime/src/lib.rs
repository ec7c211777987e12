pub mod controller;
pub mod engine;
pub mod events;
pub mod live;
pub mod logging;
pub mod notify;
pub mod settings;

pub use controller::SimController;
pub use engine::{EngineError, EngineSnapshot, GreenRequest, RunTicket, SignalView, SimEngine, TICK_PERIOD};
pub use events::{LogCategory, LogEntry};
pub use settings::{EngineSettings, SettingsPatch, SourceKind};
