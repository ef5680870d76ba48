use std::{error::Error, sync::Arc};

use crate::{
    hid::{
        memory::{DescriptorTree, ElementSpec, ElementSpecKind, MemoryDevice, SlotField},
        usage::Usage,
        CollectionType, DeviceId,
    },
    interpreter::directory::ElementDirectory,
};

fn spec(
    key: u32,
    parent: Option<u32>,
    kind: ElementSpecKind,
    collection_type: Option<CollectionType>,
    usage_page: u32,
    usage: u32,
) -> ElementSpec {
    ElementSpec {
        key,
        parent,
        kind,
        collection_type,
        usage_page,
        usage,
        logical_min: 0,
        logical_max: 100,
    }
}

#[test]
fn test_identify_touchscreen() -> Result<(), Box<dyn Error>> {
    let tree = DescriptorTree::touchscreen(3, 4095)?;
    let device = MemoryDevice::new(DeviceId(1), Arc::new(tree));
    let mut directory = ElementDirectory::new();
    assert!(!directory.is_built());

    let x_key = DescriptorTree::slot_field_key(1, SlotField::X);
    directory.identify(&device, x_key, true);

    assert!(directory.is_built());
    assert_eq!(directory.application(), Some(DescriptorTree::APPLICATION_KEY));
    assert_eq!(directory.slot_count(), 3);
    let slot_keys: Vec<u32> = directory.slots().iter().map(|slot| slot.key).collect();
    assert_eq!(
        slot_keys,
        vec![
            DescriptorTree::slot_key(0),
            DescriptorTree::slot_key(1),
            DescriptorTree::slot_key(2),
        ]
    );
    assert_eq!(directory.slots()[0].fields.len(), 8);
    assert_eq!(directory.slots()[0].fields[3].usage(), Usage::X);
    assert_eq!(
        directory.contact_count(),
        Some(DescriptorTree::CONTACT_COUNT_KEY)
    );
    assert_eq!(directory.scan_time(), Some(DescriptorTree::SCAN_TIME_KEY));

    Ok(())
}

#[test]
fn test_identify_twice_does_not_duplicate_slots() {
    let tree = DescriptorTree::touchscreen(2, 4095).unwrap();
    let device = MemoryDevice::new(DeviceId(1), Arc::new(tree));
    let mut directory = ElementDirectory::new();

    directory.identify(&device, DescriptorTree::CONTACT_COUNT_KEY, false);
    directory.identify(
        &device,
        DescriptorTree::slot_field_key(0, SlotField::TipSwitch),
        false,
    );

    assert_eq!(directory.slot_count(), 2);
}

#[test]
fn test_identify_through_nested_collections() -> Result<(), Box<dyn Error>> {
    // application -> logical (slot) -> physical -> X
    let specs = vec![
        spec(
            1,
            None,
            ElementSpecKind::Collection,
            Some(CollectionType::Application),
            0x0D,
            0x04,
        ),
        spec(
            2,
            Some(1),
            ElementSpecKind::Collection,
            Some(CollectionType::Logical),
            0x0D,
            0x22,
        ),
        spec(
            3,
            Some(2),
            ElementSpecKind::Collection,
            Some(CollectionType::Physical),
            0x01,
            0x01,
        ),
        spec(4, Some(3), ElementSpecKind::Input, None, 0x01, 0x30),
        spec(5, Some(1), ElementSpecKind::Input, None, 0x0D, 0x54),
        // Vendor usage directly below the application collection is ignored
        spec(6, Some(1), ElementSpecKind::Feature, None, 0xFF00, 0x01),
    ];
    let tree = DescriptorTree::from_specs(&specs)?;
    let device = MemoryDevice::new(DeviceId(2), Arc::new(tree));
    let mut directory = ElementDirectory::new();

    directory.identify(&device, 4, true);

    assert_eq!(directory.application(), Some(1));
    assert_eq!(directory.slot_count(), 1);
    assert_eq!(directory.contact_count(), Some(5));
    assert_eq!(directory.scan_time(), None);

    Ok(())
}

#[test]
fn test_identify_without_application_collection() -> Result<(), Box<dyn Error>> {
    let specs = vec![
        spec(
            1,
            None,
            ElementSpecKind::Collection,
            Some(CollectionType::Physical),
            0x01,
            0x02,
        ),
        spec(
            2,
            Some(1),
            ElementSpecKind::Collection,
            Some(CollectionType::Logical),
            0x0D,
            0x22,
        ),
        spec(3, Some(2), ElementSpecKind::Input, None, 0x01, 0x30),
    ];
    let tree = DescriptorTree::from_specs(&specs)?;
    let device = MemoryDevice::new(DeviceId(3), Arc::new(tree));
    let mut directory = ElementDirectory::new();

    directory.identify(&device, 3, true);

    assert!(directory.is_built());
    assert_eq!(directory.application(), None);
    assert_eq!(directory.slot_count(), 0);

    Ok(())
}
