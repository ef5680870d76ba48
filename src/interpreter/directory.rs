use crate::hid::{usage::Usage, CollectionType, Element, ElementKey, HidDevice};

/// Upper bound on ancestor links followed when looking for the application
/// collection. Deeper chains are treated as a malformed descriptor.
const MAX_TREE_DEPTH: usize = 64;

/// One per-touch logical collection and the elements it contains
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub key: ElementKey,
    pub fields: Vec<Element>,
}

/// Logical structure of a connected touchscreen, discovered once per
/// connection from any element observed in a live report.
#[derive(Debug, Default)]
pub struct ElementDirectory {
    built: bool,
    application: Option<ElementKey>,
    slots: Vec<Slot>,
    contact_count: Option<ElementKey>,
    scan_time: Option<ElementKey>,
}

impl ElementDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once [ElementDirectory::identify] has run
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Walk up from the given element to the application collection and
    /// classify its direct children. Any previously discovered structure is
    /// replaced. If no application collection is found the directory stays
    /// empty.
    pub fn identify(&mut self, device: &dyn HidDevice, any_element: ElementKey, log_tree: bool) {
        *self = Self {
            built: true,
            ..Default::default()
        };

        let Some(application) = find_application_collection(device, any_element) else {
            log::warn!(
                "No application collection found above element {any_element}, touches will not be reported"
            );
            return;
        };
        self.application = Some(application);

        let children = device.children(application);
        if log_tree {
            log::debug!(
                "# application collection {application} has {} children:",
                children.len()
            );
        }

        for key in children {
            let Some(element) = device.element(key) else {
                log::trace!("Child {key} of application collection is not introspectable");
                continue;
            };

            if element.kind.is_collection(CollectionType::Logical) {
                let fields: Vec<Element> = device
                    .children(key)
                    .into_iter()
                    .filter_map(|child| device.element(child))
                    .collect();
                if log_tree {
                    log::debug!(" > Logical collection {key}");
                    for field in fields.iter() {
                        log::debug!(
                            "    > {:#04x} {:#04x}  [{}]",
                            field.usage_page,
                            field.usage,
                            field.key
                        );
                    }
                }
                self.slots.push(Slot { key, fields });
                continue;
            }

            match element.usage() {
                Usage::ContactCount => {
                    if log_tree {
                        log::debug!(" > Contact Count");
                    }
                    self.contact_count = Some(key);
                }
                Usage::RelativeScanTime => {
                    if log_tree {
                        log::debug!(" > Scan Time");
                    }
                    self.scan_time = Some(key);
                }
                _ => {
                    if log_tree {
                        log::debug!(" > {:#04x} {:#04x}", element.usage_page, element.usage);
                    }
                }
            }
        }

        if self.slots.is_empty() {
            log::warn!("Application collection {application} has no touch slots");
        }
        log::debug!(
            "Identified {} touch slots (contact count: {:?}, scan time: {:?})",
            self.slots.len(),
            self.contact_count,
            self.scan_time
        );
    }

    /// Touch slots in descriptor order
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Maximum number of touches the device reports in a single page
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn application(&self) -> Option<ElementKey> {
        self.application
    }

    pub fn contact_count(&self) -> Option<ElementKey> {
        self.contact_count
    }

    pub fn scan_time(&self) -> Option<ElementKey> {
        self.scan_time
    }
}

/// Follow parent links until an application collection is reached
fn find_application_collection(device: &dyn HidDevice, key: ElementKey) -> Option<ElementKey> {
    let mut current = key;
    for _ in 0..MAX_TREE_DEPTH {
        current = device.parent(current)?;
        let is_application = device
            .element(current)
            .is_some_and(|element| element.kind.is_collection(CollectionType::Application));
        if is_application {
            return Some(current);
        }
    }
    log::warn!("Descriptor nesting above element {key} exceeds {MAX_TREE_DEPTH} levels");
    None
}
