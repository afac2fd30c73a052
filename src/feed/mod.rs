mod script;
mod types;

pub use script::{parse_script, ScriptError};
pub use types::{EventKind, TraceEvent};

/// Source of location events. The controller is polymorphic over anything
/// satisfying this contract: native instrumentation, process-level tracing,
/// or a scripted feed for tests and replays.
pub trait EventSource {
    fn next_event(&mut self) -> Option<TraceEvent>;
}

/// Pre-recorded feed, usually parsed from a trace script.
pub struct ScriptedFeed {
    events: std::vec::IntoIter<TraceEvent>,
}

impl ScriptedFeed {
    pub fn from_script(text: &str) -> Result<Self, ScriptError> {
        Ok(Self::from_events(parse_script(text)?))
    }

    pub fn from_events(events: Vec<TraceEvent>) -> Self {
        Self {
            events: events.into_iter(),
        }
    }
}

impl EventSource for ScriptedFeed {
    fn next_event(&mut self) -> Option<TraceEvent> {
        self.events.next()
    }
}
