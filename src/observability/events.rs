//! Lifecycle events

use std::fmt;

/// Observable events in the service lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    BootStart,
    ConfigLoaded,
    /// Storage handle established
    StorageConnected,
    /// Storage handle could not be established (FATAL)
    StorageConnectFailed,
    /// Listener bound, ready for requests
    ServerListening,
    /// One HTTP request answered
    RequestCompleted,
    /// A request failed on the server side
    RequestFailed,
    ShutdownStart,
    ShutdownComplete,
    /// Lessons loaded by the seed command
    SeedComplete,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "AFTERSCHOOL_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StorageConnected => "STORAGE_CONNECTED",
            Event::StorageConnectFailed => "STORAGE_CONNECT_FAILED",
            Event::ServerListening => "AFTERSCHOOL_SERVING",
            Event::RequestCompleted => "REQUEST_COMPLETED",
            Event::RequestFailed => "REQUEST_FAILED",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",
            Event::SeedComplete => "SEED_COMPLETE",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::StorageConnectFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
