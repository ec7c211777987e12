use std::sync::Arc;

use core_sim::RunState;
use runtime::{live::PushLocationService, LogEntry, SimController};

#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum StreamEvent {
    Connected { run_state: RunState },
    Log { entry: LogEntry },
}

#[derive(Clone)]
pub struct AppState {
    controller: SimController,
    location: Option<Arc<PushLocationService>>,
}

impl AppState {
    /// `location` is the push feed behind `/feed/*`; `None` when the server
    /// runs without a live location source.
    pub fn new(controller: SimController, location: Option<Arc<PushLocationService>>) -> Self {
        Self {
            controller,
            location,
        }
    }

    pub fn controller(&self) -> &SimController {
        &self.controller
    }

    pub fn location(&self) -> Option<&PushLocationService> {
        self.location.as_deref()
    }
}
