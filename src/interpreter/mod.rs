//! Decodes the value stream of a multi-touch digitizer into per-contact
//! touch events. The [Interpreter] reacts to [TransportEvent]s, discovers the
//! element tree on the first value of a connection, caches every value by
//! element key and dispatches a frame each time the ingestion queue has been
//! drained.
pub mod assembler;
#[cfg(test)]
pub mod assembler_test;
pub mod cache;
pub mod delegate;
pub mod directory;
#[cfg(test)]
pub mod directory_test;
pub mod event;
pub mod session;

use std::{
    fmt::{self, Debug},
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{
    config::InterpreterConfig,
    hid::{DeviceId, ElementKey, ElementValue, HidDevice},
};

use cache::ContactState;
use delegate::TouchDelegate;
use event::TouchEvent;
use session::Session;

/// Notifications delivered by the transport
pub enum TransportEvent {
    /// A matching device was connected
    Attached(Box<dyn HidDevice>),
    /// The device with the given id was removed
    Removed(DeviceId),
    /// A value was observed for an element
    ValueObserved(ElementValue),
    /// The ingestion queue has values available
    ValuesAvailable,
}

impl Debug for TransportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportEvent::Attached(device) => write!(f, "Attached({})", device.id()),
            TransportEvent::Removed(id) => write!(f, "Removed({id})"),
            TransportEvent::ValueObserved(value) => write!(
                f,
                "ValueObserved({}: {})",
                value.element.key, value.value
            ),
            TransportEvent::ValuesAvailable => write!(f, "ValuesAvailable"),
        }
    }
}

/// Connection state of the [Interpreter]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Disconnected,
    /// Attached, but no value has been seen yet to discover the element tree
    ConnectedUnidentified,
    ConnectedSteady,
}

/// Report interpreter for a single touchscreen connection at a time
pub struct Interpreter<D: TouchDelegate> {
    config: InterpreterConfig,
    delegate: D,
    session: Option<Session>,
}

impl<D: TouchDelegate> Interpreter<D> {
    pub fn new(config: InterpreterConfig, delegate: D) -> Self {
        Self {
            config,
            delegate,
            session: None,
        }
    }

    /// Process a single transport notification
    pub fn handle(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Attached(device) => self.attach(device),
            TransportEvent::Removed(id) => self.remove(id),
            TransportEvent::ValueObserved(value) => self.observe(value),
            TransportEvent::ValuesAvailable => self.drain(),
        }
    }

    /// Start a new session for the device. Any existing session is
    /// discarded first.
    pub fn attach(&mut self, device: Box<dyn HidDevice>) {
        let id = device.id();
        if let Some(previous) = self.session.take() {
            log::debug!(
                "Device {id} attached while {} is still connected, discarding old session",
                previous.device_id()
            );
        }

        match Session::open(device, &self.config) {
            Ok(session) => {
                log::info!("Touchscreen {id} connected");
                self.session = Some(session);
                self.emit(TouchEvent::Connected);
            }
            Err(e) => {
                log::error!("Unable to start session for touchscreen {id}: {e}");
            }
        }
    }

    /// End the session of the given device. Removal of a device that is not
    /// connected is ignored.
    pub fn remove(&mut self, id: DeviceId) {
        let Some(session) = self.session.as_ref() else {
            log::debug!("Removal of {id} while disconnected, ignoring");
            return;
        };
        if session.device_id() != id {
            log::warn!(
                "Removal of unknown device {id} while {} is connected, ignoring",
                session.device_id()
            );
            return;
        }

        self.session = None;
        log::info!("Touchscreen {id} disconnected");
        self.emit(TouchEvent::Disconnected);
    }

    /// Handle a value notification from the transport
    pub fn observe(&mut self, value: ElementValue) {
        let Some(session) = self.session.as_mut() else {
            log::trace!("Value for element {} while disconnected", value.element.key);
            return;
        };
        session.observe(value, &self.config);
    }

    /// Drain the ingestion queue and dispatch the resulting frame
    pub fn drain(&mut self) {
        let Some(session) = self.session.as_mut() else {
            log::trace!("Queue drain requested while disconnected");
            return;
        };
        let events = session.drain(&self.config);
        for event in events {
            self.emit(event);
        }
    }

    /// Forward an event to the delegate. Every delegate callback goes
    /// through here.
    fn emit(&mut self, event: TouchEvent) {
        match event {
            TouchEvent::Position(position) => self.delegate.update_touch_position(position),
            TouchEvent::Size(size) => self.delegate.update_touch_size(size),
            TouchEvent::FrameProcessed => self.delegate.frame_processed(),
            TouchEvent::Connected => self.delegate.device_connected(),
            TouchEvent::Disconnected => self.delegate.device_disconnected(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        match self.session.as_ref() {
            None => LifecycleState::Disconnected,
            Some(session) if session.is_identified() => LifecycleState::ConnectedSteady,
            Some(_) => LifecycleState::ConnectedUnidentified,
        }
    }

    /// Latest cached value of the element, or `None` if it was never
    /// observed during the current connection
    pub fn value_of(&self, key: ElementKey) -> Option<i64> {
        self.session.as_ref()?.value_of(key)
    }

    /// Latest value of the scan time element, if the device has one
    pub fn scan_time(&self) -> Option<i64> {
        let session = self.session.as_ref()?;
        let key = session.directory().scan_time()?;
        session.value_of(key)
    }

    pub fn contact_state(&self) -> ContactState {
        self.session
            .as_ref()
            .map(|session| session.contacts())
            .unwrap_or_default()
    }

    /// Number of touch slots discovered for the current connection
    pub fn slot_count(&self) -> usize {
        self.session
            .as_ref()
            .map(|session| session.directory().slot_count())
            .unwrap_or_default()
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.delegate
    }

    pub fn into_delegate(self) -> D {
        self.delegate
    }
}

/// An [Interpreter] shared between threads. Each event is processed under a
/// single lock so that storing values and dispatching a frame never
/// interleave.
pub struct SharedInterpreter<D: TouchDelegate> {
    inner: Arc<Mutex<Interpreter<D>>>,
}

impl<D: TouchDelegate> Clone for SharedInterpreter<D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<D: TouchDelegate> SharedInterpreter<D> {
    pub fn new(interpreter: Interpreter<D>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(interpreter)),
        }
    }

    pub fn handle(&self, event: TransportEvent) {
        self.lock().handle(event);
    }

    /// Lock the interpreter, recovering from a poisoned lock
    pub fn lock(&self) -> MutexGuard<'_, Interpreter<D>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
