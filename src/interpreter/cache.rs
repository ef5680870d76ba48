use std::collections::HashMap;

use crate::hid::{usage::Usage, ElementKey, ElementValue};

/// Contact counter bookkeeping used to reassemble frames that the device
/// pages across several reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactState {
    /// Last authoritative number of active touches reported by the device
    pub contact_count: i64,
    /// Number of touches already dispatched towards `contact_count`
    pub hybrid_offset: i64,
    /// Set once the device has been seen paging its reports
    pub hybrid_mode: bool,
}

/// Latest value of every element observed during a connection. Entries are
/// kept across dispatch cycles so that a slot which did not change in a
/// later page still reports its last known state.
#[derive(Debug, Default)]
pub struct ValueCache {
    values: HashMap<ElementKey, i64>,
    contacts: ContactState,
}

impl ValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the cached value of the element. A contact count value is
    /// also applied to the [ContactState], unless it is the zero a paging
    /// device sends while a multi-page frame is still being delivered.
    pub fn store(&mut self, value: &ElementValue, slot_count: usize) {
        let key = value.element.key;
        self.values.insert(key, value.value);

        if value.element.usage() != Usage::ContactCount {
            return;
        }

        // Paging is only possible if the previous count did not fit into
        // the slots of a single report
        let state = &mut self.contacts;
        if state.contact_count > slot_count as i64 && value.value == 0 && state.hybrid_offset > 0 {
            if !state.hybrid_mode {
                log::debug!(
                    "Device pages its reports ({} contacts over {} slots)",
                    state.contact_count,
                    slot_count
                );
            }
            state.hybrid_mode = true;
            log::trace!(
                "Continuing paged frame at {}/{}",
                state.hybrid_offset,
                state.contact_count
            );
            return;
        }

        state.contact_count = value.value;
        state.hybrid_offset = 0;
    }

    /// Returns the cached value of the element, or `None` if it was never
    /// observed during this connection
    pub fn value_of(&self, key: ElementKey) -> Option<i64> {
        self.values.get(&key).copied()
    }

    pub fn contacts(&self) -> ContactState {
        self.contacts
    }

    /// Record that `processed` more touches were dispatched. Returns true if
    /// the current frame is now complete.
    pub fn advance(&mut self, processed: i64) -> bool {
        let state = &mut self.contacts;
        state.hybrid_offset += processed;
        if state.hybrid_offset == state.contact_count {
            state.hybrid_offset = 0;
        }
        state.hybrid_offset == 0
    }

    /// Number of touches still to be dispatched for the current frame
    pub fn remaining(&self) -> i64 {
        (self.contacts.contact_count - self.contacts.hybrid_offset).max(0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Forget every cached value and reset the contact state
    pub fn clear(&mut self) {
        self.values.clear();
        self.contacts = ContactState::default();
    }
}
