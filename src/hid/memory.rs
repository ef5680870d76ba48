//! In-memory implementation of the transport collaborators. A
//! [DescriptorTree] holds a report descriptor as an element list with parent
//! links, a [MemoryDevice] exposes it through [HidDevice], and the
//! [MemoryQueue] it creates behaves like a bounded transport queue that only
//! accepts values for registered elements.
use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

use super::{
    CollectionType, DeviceId, Element, ElementKey, ElementKind, ElementValue, HidDevice,
    IngestionQueue, TransportError,
};

/// Possible errors building a [DescriptorTree]
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("element key `{0}` is defined more than once")]
    DuplicateKey(ElementKey),
    #[error("element `{key}` references unknown parent `{parent}`")]
    UnknownParent { key: ElementKey, parent: ElementKey },
    #[error("collection element `{0}` has no collection type")]
    MissingCollectionType(ElementKey),
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ElementSpecKind {
    Input,
    Output,
    Feature,
    Collection,
}

/// Serializable description of one element
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct ElementSpec {
    pub key: ElementKey,
    pub parent: Option<ElementKey>,
    pub kind: ElementSpecKind,
    pub collection_type: Option<CollectionType>,
    #[serde(default)]
    pub usage_page: u32,
    #[serde(default)]
    pub usage: u32,
    #[serde(default)]
    pub logical_min: i64,
    #[serde(default)]
    pub logical_max: i64,
}

impl ElementSpec {
    fn to_element(&self) -> Result<Element, DescriptorError> {
        let kind = match self.kind {
            ElementSpecKind::Input => ElementKind::Input,
            ElementSpecKind::Output => ElementKind::Output,
            ElementSpecKind::Feature => ElementKind::Feature,
            ElementSpecKind::Collection => {
                let Some(collection_type) = self.collection_type else {
                    return Err(DescriptorError::MissingCollectionType(self.key));
                };
                ElementKind::Collection(collection_type)
            }
        };
        Ok(Element {
            key: self.key,
            usage_page: self.usage_page,
            usage: self.usage,
            logical_min: self.logical_min,
            logical_max: self.logical_max,
            kind,
        })
    }
}

#[derive(Debug, Clone)]
struct Node {
    element: Element,
    parent: Option<ElementKey>,
    children: Vec<ElementKey>,
}

/// Fields of one slot in the layout built by [DescriptorTree::touchscreen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotField {
    TipSwitch = 1,
    TouchValid = 2,
    ContactIdentifier = 3,
    X = 4,
    Y = 5,
    Width = 6,
    Height = 7,
    Azimuth = 8,
}

/// A read-only report descriptor tree
#[derive(Debug, Clone, Default)]
pub struct DescriptorTree {
    nodes: HashMap<ElementKey, Node>,
}

impl DescriptorTree {
    /// Key of the application collection in [DescriptorTree::touchscreen]
    pub const APPLICATION_KEY: ElementKey = 1;
    /// Key of the contact count element in [DescriptorTree::touchscreen]
    pub const CONTACT_COUNT_KEY: ElementKey = 2;
    /// Key of the scan time element in [DescriptorTree::touchscreen]
    pub const SCAN_TIME_KEY: ElementKey = 3;

    /// Build a tree from a list of element specs. Children keep the order in
    /// which they appear in the list.
    pub fn from_specs(specs: &[ElementSpec]) -> Result<Self, DescriptorError> {
        let mut tree = Self::default();
        for spec in specs {
            let element = spec.to_element()?;
            tree.insert(element, spec.parent)?;
        }
        Ok(tree)
    }

    /// Build the descriptor of a typical touchscreen with the given number
    /// of slots. X and Y both report in `0..=logical_max`.
    pub fn touchscreen(slots: usize, logical_max: i64) -> Result<Self, DescriptorError> {
        let mut tree = Self::default();
        let collection = |key, collection_type| Element {
            key,
            usage_page: PAGE_DIGITIZER,
            usage: 0,
            logical_min: 0,
            logical_max: 0,
            kind: ElementKind::Collection(collection_type),
        };
        let input = |key, usage_page, usage, logical_max| Element {
            key,
            usage_page,
            usage,
            logical_min: 0,
            logical_max,
            kind: ElementKind::Input,
        };

        let mut application = collection(Self::APPLICATION_KEY, CollectionType::Application);
        application.usage = USAGE_DIG_TOUCH_SCREEN;
        tree.insert(application, None)?;

        for slot in 0..slots {
            let slot_key = Self::slot_key(slot);
            tree.insert(
                collection(slot_key, CollectionType::Logical),
                Some(Self::APPLICATION_KEY),
            )?;
            let fields = [
                (SlotField::TipSwitch, PAGE_DIGITIZER, USAGE_DIG_TIP_SWITCH, 1),
                (SlotField::TouchValid, PAGE_DIGITIZER, USAGE_DIG_TOUCH_VALID, 1),
                (
                    SlotField::ContactIdentifier,
                    PAGE_DIGITIZER,
                    USAGE_DIG_CONTACT_IDENTIFIER,
                    255,
                ),
                (SlotField::X, PAGE_GENERIC_DESKTOP, USAGE_GD_X, logical_max),
                (SlotField::Y, PAGE_GENERIC_DESKTOP, USAGE_GD_Y, logical_max),
                (SlotField::Width, PAGE_DIGITIZER, USAGE_DIG_WIDTH, 255),
                (SlotField::Height, PAGE_DIGITIZER, USAGE_DIG_HEIGHT, 255),
                (SlotField::Azimuth, PAGE_DIGITIZER, USAGE_DIG_AZIMUTH, 360),
            ];
            for (field, page, usage, max) in fields {
                let key = Self::slot_field_key(slot, field);
                tree.insert(input(key, page, usage, max), Some(slot_key))?;
            }
        }

        tree.insert(
            input(
                Self::CONTACT_COUNT_KEY,
                PAGE_DIGITIZER,
                USAGE_DIG_CONTACT_COUNT,
                255,
            ),
            Some(Self::APPLICATION_KEY),
        )?;
        tree.insert(
            input(
                Self::SCAN_TIME_KEY,
                PAGE_DIGITIZER,
                USAGE_DIG_RELATIVE_SCAN_TIME,
                65535,
            ),
            Some(Self::APPLICATION_KEY),
        )?;

        Ok(tree)
    }

    /// Key of the logical collection for the given slot in
    /// [DescriptorTree::touchscreen]
    pub fn slot_key(slot: usize) -> ElementKey {
        100 + slot as ElementKey * 10
    }

    /// Key of a field of the given slot in [DescriptorTree::touchscreen]
    pub fn slot_field_key(slot: usize, field: SlotField) -> ElementKey {
        Self::slot_key(slot) + field as ElementKey
    }

    fn insert(
        &mut self,
        element: Element,
        parent: Option<ElementKey>,
    ) -> Result<(), DescriptorError> {
        let key = element.key;
        if self.nodes.contains_key(&key) {
            return Err(DescriptorError::DuplicateKey(key));
        }
        if let Some(parent) = parent {
            let Some(node) = self.nodes.get_mut(&parent) else {
                return Err(DescriptorError::UnknownParent { key, parent });
            };
            node.children.push(key);
        }
        self.nodes.insert(
            key,
            Node {
                element,
                parent,
                children: Vec::new(),
            },
        );
        Ok(())
    }

    pub fn element(&self, key: ElementKey) -> Option<Element> {
        self.nodes.get(&key).map(|node| node.element)
    }

    pub fn parent(&self, key: ElementKey) -> Option<ElementKey> {
        self.nodes.get(&key).and_then(|node| node.parent)
    }

    pub fn children(&self, key: ElementKey) -> Vec<ElementKey> {
        self.nodes
            .get(&key)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// Returns the value of the given element, or `None` if the key is unknown
    pub fn value(&self, key: ElementKey, value: i64) -> Option<ElementValue> {
        let element = self.element(key)?;
        Some(ElementValue { element, value })
    }
}

#[derive(Debug, Default)]
struct QueueState {
    started: bool,
    depth: usize,
    registered: HashSet<ElementKey>,
    values: VecDeque<ElementValue>,
}

/// Transport side of a [MemoryQueue], used to feed values into it
#[derive(Debug, Clone, Default)]
pub struct QueueHandle {
    state: Arc<Mutex<QueueState>>,
}

impl QueueHandle {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Enqueue the given value. Returns false if the value was dropped
    /// because the queue is stopped, the element is not registered, or the
    /// queue is full.
    pub fn enqueue(&self, value: ElementValue) -> bool {
        let mut state = self.lock();
        if !state.started || !state.registered.contains(&value.element.key) {
            return false;
        }
        if state.values.len() >= state.depth {
            log::trace!("Queue full, dropping value for element {}", value.element.key);
            return false;
        }
        state.values.push_back(value);
        true
    }

    /// Returns true if the queue has been created and not stopped
    pub fn is_started(&self) -> bool {
        self.lock().started
    }

    /// Number of values waiting to be drained
    pub fn len(&self) -> usize {
        self.lock().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bounded value queue created by a [MemoryDevice]
#[derive(Debug)]
pub struct MemoryQueue {
    handle: QueueHandle,
}

impl IngestionQueue for MemoryQueue {
    fn contains(&self, key: ElementKey) -> bool {
        self.handle.lock().registered.contains(&key)
    }

    fn add_element(&mut self, key: ElementKey) {
        self.handle.lock().registered.insert(key);
    }

    fn drain_next(&mut self) -> Option<ElementValue> {
        self.handle.lock().values.pop_front()
    }

    fn stop(&mut self) {
        let mut state = self.handle.lock();
        state.started = false;
        state.values.clear();
    }
}

/// A connected device backed by a [DescriptorTree]
#[derive(Debug, Clone)]
pub struct MemoryDevice {
    id: DeviceId,
    tree: Arc<DescriptorTree>,
    queue: QueueHandle,
    fail_queue_creation: bool,
}

impl MemoryDevice {
    pub fn new(id: DeviceId, tree: Arc<DescriptorTree>) -> Self {
        Self {
            id,
            tree,
            queue: QueueHandle::default(),
            fail_queue_creation: false,
        }
    }

    /// Returns a device whose queue can never be created
    pub fn without_queue(id: DeviceId, tree: Arc<DescriptorTree>) -> Self {
        Self {
            fail_queue_creation: true,
            ..Self::new(id, tree)
        }
    }

    /// Handle used to feed values into the queue once it has been created
    pub fn queue_handle(&self) -> QueueHandle {
        self.queue.clone()
    }

    pub fn tree(&self) -> &DescriptorTree {
        &self.tree
    }
}

impl HidDevice for MemoryDevice {
    fn id(&self) -> DeviceId {
        self.id
    }

    fn element(&self, key: ElementKey) -> Option<Element> {
        self.tree.element(key)
    }

    fn parent(&self, key: ElementKey) -> Option<ElementKey> {
        self.tree.parent(key)
    }

    fn children(&self, key: ElementKey) -> Vec<ElementKey> {
        self.tree.children(key)
    }

    fn create_queue(&self, depth: usize) -> Result<Box<dyn IngestionQueue>, TransportError> {
        if self.fail_queue_creation {
            return Err(TransportError::QueueCreation(
                self.id,
                "queue creation rejected".to_string(),
            ));
        }
        {
            let mut state = self.queue.lock();
            *state = QueueState {
                started: true,
                depth,
                ..Default::default()
            };
        }
        Ok(Box::new(MemoryQueue {
            handle: self.queue.clone(),
        }))
    }
}
