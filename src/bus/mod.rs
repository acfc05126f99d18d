pub mod channel;
pub mod client;
pub mod command;
pub mod device;
pub mod dispatcher;
pub mod ioctl;
pub mod manager;
pub mod protocol;
pub mod queue;
pub mod registry;
pub mod request;
pub mod status;

#[cfg(test)]
pub mod channel_test;
#[cfg(test)]
pub mod manager_test;
#[cfg(test)]
pub mod protocol_test;
#[cfg(test)]
pub mod registry_test;

use std::fmt::Display;

use crate::usb::{ChildIdentity, Family};

/// Identity of an application talking to the bus. On D-Bus this is the
/// unique name of the sender (e.g. ":1.42").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallerId(pub String);

impl Display for CallerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CallerId {
    fn from(value: &str) -> Self {
        CallerId(value.to_string())
    }
}

/// Where a control request came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// An application, subject to ownership checks
    Application(CallerId),
    /// Another in-process component, bypasses ownership checks
    Internal,
}

impl Origin {
    pub fn caller(&self) -> Option<&CallerId> {
        match self {
            Origin::Application(caller) => Some(caller),
            Origin::Internal => None,
        }
    }
}

/// Enumeration changes produced by the bus. These are announced to the
/// consuming stack by the manager.
#[derive(Debug, Clone, PartialEq)]
pub enum BusEvent {
    ChildArrived {
        serial: u32,
        family: Family,
        identity: ChildIdentity,
    },
    ChildRemoved {
        serial: u32,
        /// Number of parked requests completed by the removal
        drained: usize,
    },
}
