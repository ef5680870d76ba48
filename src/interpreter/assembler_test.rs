use std::{error::Error, sync::Arc};

use crate::{
    config::{InterpreterConfig, PositionMapping},
    hid::{
        memory::{DescriptorTree, MemoryDevice, SlotField},
        DeviceId,
    },
    interpreter::{
        assembler::{assemble_slot, dispatch},
        cache::ValueCache,
        directory::ElementDirectory,
        event::{TouchEvent, TouchPosition, TouchSize},
    },
};

const LOGICAL_MAX: i64 = 4095;

struct Fixture {
    tree: Arc<DescriptorTree>,
    directory: ElementDirectory,
    cache: ValueCache,
}

impl Fixture {
    fn new(slots: usize) -> Self {
        let tree = Arc::new(DescriptorTree::touchscreen(slots, LOGICAL_MAX).unwrap());
        let device = MemoryDevice::new(DeviceId(1), tree.clone());
        let mut directory = ElementDirectory::new();
        directory.identify(&device, DescriptorTree::CONTACT_COUNT_KEY, false);
        Self {
            tree,
            directory,
            cache: ValueCache::new(),
        }
    }

    fn store(&mut self, key: u32, value: i64) {
        let value = self.tree.value(key, value).unwrap();
        self.cache.store(&value, self.directory.slot_count());
    }

    fn store_field(&mut self, slot: usize, field: SlotField, value: i64) {
        self.store(DescriptorTree::slot_field_key(slot, field), value);
    }

    fn dispatch(&mut self, config: &InterpreterConfig) -> Vec<TouchEvent> {
        dispatch(&self.directory, &mut self.cache, config)
    }
}

fn positions(events: &[TouchEvent]) -> Vec<TouchPosition> {
    events
        .iter()
        .filter_map(|event| match event {
            TouchEvent::Position(position) => Some(*position),
            _ => None,
        })
        .collect()
}

#[test]
fn test_paged_frame_reassembly() -> Result<(), Box<dyn Error>> {
    let config = InterpreterConfig::default();
    let mut fixture = Fixture::new(5);
    fixture.store(DescriptorTree::CONTACT_COUNT_KEY, 12);

    let first = fixture.dispatch(&config);
    assert_eq!(positions(&first).len(), 5);
    assert!(!first.contains(&TouchEvent::FrameProcessed));
    assert_eq!(fixture.cache.contacts().hybrid_offset, 5);

    let second = fixture.dispatch(&config);
    assert_eq!(positions(&second).len(), 5);
    assert!(!second.contains(&TouchEvent::FrameProcessed));
    assert_eq!(fixture.cache.contacts().hybrid_offset, 10);

    let third = fixture.dispatch(&config);
    assert_eq!(positions(&third).len(), 2);
    assert_eq!(third.last(), Some(&TouchEvent::FrameProcessed));
    assert_eq!(fixture.cache.contacts().hybrid_offset, 0);

    Ok(())
}

#[test]
fn test_update_window_is_bounded_by_contact_count() {
    let config = InterpreterConfig::default();
    let mut fixture = Fixture::new(5);
    fixture.store(DescriptorTree::CONTACT_COUNT_KEY, 3);

    let events = fixture.dispatch(&config);
    assert_eq!(positions(&events).len(), 3);
    assert_eq!(events.last(), Some(&TouchEvent::FrameProcessed));
}

#[test]
fn test_no_contacts_still_completes_frame() {
    let config = InterpreterConfig::default();
    let mut fixture = Fixture::new(5);

    let events = fixture.dispatch(&config);
    assert_eq!(events, vec![TouchEvent::FrameProcessed]);
}

#[test]
fn test_slot_values() {
    let config = InterpreterConfig::default();
    let mut fixture = Fixture::new(2);
    fixture.store(DescriptorTree::CONTACT_COUNT_KEY, 2);
    fixture.store_field(0, SlotField::ContactIdentifier, 7);
    fixture.store_field(0, SlotField::TipSwitch, 1);
    fixture.store_field(0, SlotField::TouchValid, 1);
    fixture.store_field(0, SlotField::X, 0);
    fixture.store_field(0, SlotField::Y, LOGICAL_MAX);
    // Slot 1 only ever reported its contact id
    fixture.store_field(1, SlotField::ContactIdentifier, 8);

    let events = fixture.dispatch(&config);
    assert_eq!(
        positions(&events),
        vec![
            TouchPosition {
                contact_id: 7,
                x: Some(0.0),
                y: Some(1.0),
                on_surface: true,
                is_valid: true,
            },
            TouchPosition {
                contact_id: 8,
                x: None,
                y: None,
                on_surface: false,
                is_valid: false,
            },
        ]
    );
}

#[test]
fn test_stale_slots_keep_last_value() {
    let config = InterpreterConfig::default();
    let mut fixture = Fixture::new(2);
    fixture.store(DescriptorTree::CONTACT_COUNT_KEY, 2);
    fixture.store_field(1, SlotField::ContactIdentifier, 3);
    fixture.store_field(1, SlotField::X, 100);
    fixture.dispatch(&config);

    // Next report only updates slot 0
    fixture.store(DescriptorTree::CONTACT_COUNT_KEY, 2);
    fixture.store_field(0, SlotField::X, 200);
    let events = fixture.dispatch(&config);
    let positions = positions(&events);
    assert_eq!(positions[1].contact_id, 3);
    assert_eq!(positions[1].x, Some(100.0 / LOGICAL_MAX as f64));
}

#[test]
fn test_touch_size_reporting() {
    let mut config = InterpreterConfig::default();
    let mut fixture = Fixture::new(2);
    fixture.store(DescriptorTree::CONTACT_COUNT_KEY, 2);
    fixture.store_field(0, SlotField::ContactIdentifier, 1);
    fixture.store_field(0, SlotField::Width, 48);
    fixture.store_field(0, SlotField::Height, 32);
    fixture.store_field(0, SlotField::Azimuth, 90);
    // Slot 1 is missing its azimuth
    fixture.store_field(1, SlotField::Width, 48);
    fixture.store_field(1, SlotField::Height, 32);

    let events = fixture.dispatch(&config);
    assert!(!events
        .iter()
        .any(|event| matches!(event, TouchEvent::Size(_))));

    config.report_touch_size = true;
    fixture.store(DescriptorTree::CONTACT_COUNT_KEY, 2);
    let events = fixture.dispatch(&config);
    let sizes: Vec<&TouchEvent> = events
        .iter()
        .filter(|event| matches!(event, TouchEvent::Size(_)))
        .collect();
    assert_eq!(
        sizes,
        vec![&TouchEvent::Size(TouchSize {
            contact_id: 1,
            width: 48.0,
            height: 32.0,
            azimuth: 90.0,
        })]
    );
    // Size follows the position of the same slot
    assert!(matches!(events[1], TouchEvent::Size(_)));
}

#[test]
fn test_assemble_slot_with_normalized_mapping() {
    let mut fixture = Fixture::new(1);
    fixture.store_field(0, SlotField::X, LOGICAL_MAX / 2 + 1);
    let slot = &fixture.directory.slots()[0];

    let literal = assemble_slot(slot, &fixture.cache, PositionMapping::Literal);
    let normalized = assemble_slot(slot, &fixture.cache, PositionMapping::Normalized);
    // Logical minimum is zero, so both mappings agree
    assert_eq!(literal.position.x, normalized.position.x);
    assert_eq!(literal.position.x, Some(2048.0 / 4095.0));
    assert!(literal.size.is_none());
}
