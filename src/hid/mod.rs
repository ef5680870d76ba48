pub mod memory;
pub mod usage;

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use usage::Usage;

/// Stable per-connection identity of an element. Used as the value cache key.
pub type ElementKey = u32;

/// Identifies one physical connection of a device as reported by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct DeviceId(pub u64);

impl Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Kind of collection an element groups its children into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionType {
    Physical,
    Application,
    Logical,
    Report,
    NamedArray,
    UsageSwitch,
    UsageModifier,
}

/// Kind of a node in the report descriptor tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Input,
    Output,
    Feature,
    Collection(CollectionType),
}

impl ElementKind {
    pub fn is_collection(&self, collection_type: CollectionType) -> bool {
        matches!(self, ElementKind::Collection(kind) if *kind == collection_type)
    }
}

/// Snapshot of a single element's introspectable attributes. The tree
/// itself is owned by the transport and is read-only for the lifetime of a
/// connection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    pub key: ElementKey,
    pub usage_page: u32,
    pub usage: u32,
    pub logical_min: i64,
    pub logical_max: i64,
    pub kind: ElementKind,
}

impl Element {
    /// Returns the well-known usage of this element
    pub fn usage(&self) -> Usage {
        Usage::from_page_usage(self.usage_page, self.usage)
    }
}

/// A single integer value observed for an element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementValue {
    pub element: Element,
    pub value: i64,
}

impl Display for ElementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let element = &self.element;
        let usage = element.usage();
        write!(
            f,
            "{}\t| {:#04x} {}\t| {:#04x} {}\t|{:8}\t({}-{})",
            element.key,
            element.usage_page,
            usage.page_name(),
            element.usage,
            usage.name(),
            self.value,
            element.logical_min,
            element.logical_max
        )
    }
}

/// Possible errors reported by the transport
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("unable to create ingestion queue for device {0}: {1}")]
    QueueCreation(DeviceId, String),
    #[error("device {0} is no longer available")]
    Unavailable(DeviceId),
}

/// Element introspection for one connected device
pub trait HidDevice: Send {
    /// Identity of this connection
    fn id(&self) -> DeviceId;
    /// Look up the element with the given key
    fn element(&self, key: ElementKey) -> Option<Element>;
    /// Returns the key of the parent of the given element, if any
    fn parent(&self, key: ElementKey) -> Option<ElementKey>;
    /// Returns the keys of the direct children of the given element, in
    /// descriptor order
    fn children(&self, key: ElementKey) -> Vec<ElementKey>;
    /// Create and start the batched value queue for this device
    fn create_queue(&self, depth: usize) -> Result<Box<dyn IngestionQueue>, TransportError>;
}

/// Pull-based access to the batched values of one device. Only values of
/// elements that were added to the queue are delivered through it.
pub trait IngestionQueue: Send {
    fn contains(&self, key: ElementKey) -> bool;
    fn add_element(&mut self, key: ElementKey);
    /// Pop the next queued value, or `None` once the queue is empty
    fn drain_next(&mut self) -> Option<ElementValue>;
    fn stop(&mut self);
}
