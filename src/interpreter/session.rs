use crate::{
    config::InterpreterConfig,
    hid::{DeviceId, ElementKey, ElementValue, HidDevice, IngestionQueue, TransportError},
};

use super::{
    assembler,
    cache::{ContactState, ValueCache},
    directory::ElementDirectory,
    event::TouchEvent,
};

/// State of one physical connection. A new session is created on every
/// attach and dropped on removal, which stops its ingestion queue.
pub struct Session {
    device: Box<dyn HidDevice>,
    queue: Box<dyn IngestionQueue>,
    directory: ElementDirectory,
    cache: ValueCache,
}

impl Session {
    /// Create the ingestion queue for the device and start a new session
    pub fn open(
        device: Box<dyn HidDevice>,
        config: &InterpreterConfig,
    ) -> Result<Self, TransportError> {
        let queue = device.create_queue(config.queue_depth)?;
        Ok(Self {
            device,
            queue,
            directory: ElementDirectory::new(),
            cache: ValueCache::new(),
        })
    }

    pub fn device_id(&self) -> DeviceId {
        self.device.id()
    }

    pub fn is_identified(&self) -> bool {
        self.directory.is_built()
    }

    pub fn directory(&self) -> &ElementDirectory {
        &self.directory
    }

    pub fn value_of(&self, key: ElementKey) -> Option<i64> {
        self.cache.value_of(key)
    }

    pub fn contacts(&self) -> ContactState {
        self.cache.contacts()
    }

    /// Handle a value delivered outside of the ingestion queue. The first
    /// one of a connection identifies the element tree. Elements not yet
    /// registered with the queue are registered and the value applied
    /// directly so it is not lost; values of registered elements arrive
    /// again through the queue.
    pub fn observe(&mut self, value: ElementValue, config: &InterpreterConfig) {
        if !self.directory.is_built() {
            self.directory.identify(
                self.device.as_ref(),
                value.element.key,
                config.log_descriptor_tree,
            );
        }

        let key = value.element.key;
        if self.queue.contains(key) {
            return;
        }
        log::trace!("Registering element {key} with the ingestion queue");
        self.queue.add_element(key);
        self.store(&value, config);
    }

    /// Apply every queued value to the cache, then dispatch the frame
    pub fn drain(&mut self, config: &InterpreterConfig) -> Vec<TouchEvent> {
        while let Some(value) = self.queue.drain_next() {
            self.store(&value, config);
        }
        assembler::dispatch(&self.directory, &mut self.cache, config)
    }

    fn store(&mut self, value: &ElementValue, config: &InterpreterConfig) {
        if config.log_values {
            log::trace!("{value}");
        }
        self.cache.store(value, self.directory.slot_count());
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        log::debug!("Stopping ingestion queue for device {}", self.device.id());
        self.queue.stop();
    }
}
