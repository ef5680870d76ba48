//! Replays a recorded transport trace through the [Interpreter]. A trace
//! carries the report descriptor of a device and the sequence of transport
//! notifications it produced.
//!
//! ```yaml
//! device_id: 1
//! descriptor:
//!   - { key: 1, kind: collection, collection_type: application, usage_page: 13, usage: 4 }
//!   - { key: 2, parent: 1, kind: collection, collection_type: logical, usage_page: 13, usage: 34 }
//!   - { key: 3, parent: 2, kind: input, usage_page: 1, usage: 48, logical_max: 4095 }
//!   - { key: 4, parent: 1, kind: input, usage_page: 13, usage: 84, logical_max: 10 }
//! events:
//!   - event: attach
//!   - event: report
//!     values: [[3, 2048], [4, 1]]
//!   - event: remove
//! ```
use std::{io, path::Path, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config::InterpreterConfig,
    hid::{
        memory::{DescriptorError, DescriptorTree, ElementSpec, MemoryDevice},
        DeviceId, ElementKey, HidDevice,
    },
    interpreter::{delegate::TouchDelegate, Interpreter, TransportEvent},
};

/// Possible errors loading or running a [Trace]
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
    #[error("Invalid descriptor: {0}")]
    DescriptorError(#[from] DescriptorError),
    #[error("Event {index} references unknown element `{key}`")]
    UnknownElement { index: usize, key: ElementKey },
}

/// A single transport notification in a [Trace]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// The device was connected
    Attach,
    /// The device was removed
    Remove,
    /// A complete report: every value is observed and queued, then the
    /// queue is drained
    Report { values: Vec<(ElementKey, i64)> },
    /// A single value notification without a queue drain
    Value { key: ElementKey, value: i64 },
}

/// A recorded device session
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct Trace {
    #[serde(default)]
    pub device_id: u64,
    pub descriptor: Vec<ElementSpec>,
    pub events: Vec<TraceEvent>,
}

impl Trace {
    /// Load a [Trace] from the given YAML string
    pub fn from_yaml(content: String) -> Result<Trace, ReplayError> {
        let trace: Trace = serde_yaml::from_str(content.as_str())?;
        Ok(trace)
    }

    /// Load a [Trace] from the given YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Trace, ReplayError> {
        let file = std::fs::File::open(path)?;
        let trace: Trace = serde_yaml::from_reader(file)?;
        Ok(trace)
    }

    /// Feed every event of the trace into a new [Interpreter] and return
    /// its delegate
    pub fn run<D: TouchDelegate>(
        &self,
        config: InterpreterConfig,
        delegate: D,
    ) -> Result<D, ReplayError> {
        let tree = Arc::new(DescriptorTree::from_specs(&self.descriptor)?);
        let device = MemoryDevice::new(DeviceId(self.device_id), tree.clone());
        let queue = device.queue_handle();
        let mut interpreter = Interpreter::new(config, delegate);

        for (index, event) in self.events.iter().enumerate() {
            log::trace!("Replaying event {index}: {event:?}");
            match event {
                TraceEvent::Attach => {
                    interpreter.handle(TransportEvent::Attached(Box::new(device.clone())));
                }
                TraceEvent::Remove => {
                    interpreter.handle(TransportEvent::Removed(device.id()));
                }
                TraceEvent::Report { values } => {
                    for (key, value) in values {
                        let Some(value) = tree.value(*key, *value) else {
                            return Err(ReplayError::UnknownElement { index, key: *key });
                        };
                        interpreter.handle(TransportEvent::ValueObserved(value));
                        queue.enqueue(value);
                    }
                    interpreter.handle(TransportEvent::ValuesAvailable);
                }
                TraceEvent::Value { key, value } => {
                    let Some(value) = tree.value(*key, *value) else {
                        return Err(ReplayError::UnknownElement { index, key: *key });
                    };
                    interpreter.handle(TransportEvent::ValueObserved(value));
                }
            }
        }

        Ok(interpreter.into_delegate())
    }
}
