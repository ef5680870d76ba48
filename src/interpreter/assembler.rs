use crate::{
    config::{InterpreterConfig, PositionMapping},
    hid::usage::Usage,
};

use super::{
    cache::ValueCache,
    directory::{ElementDirectory, Slot},
    event::{TouchEvent, TouchPosition, TouchSize},
};

/// Values read from the cache for a single slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotUpdate {
    pub position: TouchPosition,
    /// Present only if width, height and azimuth were all observed
    pub size: Option<TouchSize>,
}

/// Turn the cached values of the next window of slots into touch events and
/// advance the paging cursor. `FrameProcessed` is appended once the paging
/// cursor wraps back to the start of a frame.
pub fn dispatch(
    directory: &ElementDirectory,
    cache: &mut ValueCache,
    config: &InterpreterConfig,
) -> Vec<TouchEvent> {
    let slots = directory.slots();
    let num_updates = cache.remaining().min(slots.len() as i64);
    let contacts = cache.contacts();
    log::trace!(
        "Update {num_updates} out of {} touches beginning with {}",
        contacts.contact_count,
        contacts.hybrid_offset
    );

    let mut events = Vec::with_capacity(num_updates as usize * 2 + 1);
    for slot in slots.iter().take(num_updates as usize) {
        let update = assemble_slot(slot, cache, config.position_mapping);
        log::trace!(
            "Slot {}: [{}] {:?}, {:?} tip={} valid={}",
            slot.key,
            update.position.contact_id,
            update.position.x,
            update.position.y,
            update.position.on_surface,
            update.position.is_valid
        );
        events.push(TouchEvent::Position(update.position));
        if config.report_touch_size {
            if let Some(size) = update.size {
                events.push(TouchEvent::Size(size));
            }
        }
    }

    if cache.advance(num_updates) {
        events.push(TouchEvent::FrameProcessed);
    }

    events
}

/// Read every field of the slot from the value cache. Fields that were never
/// observed fall back to "unknown" for positions and zero for flags.
pub fn assemble_slot(slot: &Slot, cache: &ValueCache, mapping: PositionMapping) -> SlotUpdate {
    let mut x = None;
    let mut y = None;
    let mut contact_id = 0;
    let mut tip_switch = 0;
    let mut is_valid = 0;
    let mut width = None;
    let mut height = None;
    let mut azimuth = None;

    for field in slot.fields.iter() {
        let Some(value) = cache.value_of(field.key) else {
            continue;
        };
        match field.usage() {
            Usage::X => x = mapping.map(value, field.logical_min, field.logical_max),
            Usage::Y => y = mapping.map(value, field.logical_min, field.logical_max),
            Usage::ContactIdentifier => contact_id = value,
            Usage::TipSwitch => tip_switch = value,
            Usage::TouchValid => is_valid = value,
            Usage::Width => width = Some(value),
            Usage::Height => height = Some(value),
            Usage::Azimuth => azimuth = Some(value),
            _ => (),
        }
    }

    let size = match (width, height, azimuth) {
        (Some(width), Some(height), Some(azimuth)) => Some(TouchSize {
            contact_id,
            width: width as f64,
            height: height as f64,
            azimuth: azimuth as f64,
        }),
        _ => None,
    };

    SlotUpdate {
        position: TouchPosition {
            contact_id,
            x,
            y,
            on_surface: tip_switch != 0,
            is_valid: is_valid != 0,
        },
        size,
    }
}
