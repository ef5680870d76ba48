use tokio::sync::mpsc;

use super::event::{TouchEvent, TouchPosition, TouchSize};

/// Consumer of decoded touches
pub trait TouchDelegate {
    /// Called once per processed slot in every dispatch cycle
    fn update_touch_position(&mut self, position: TouchPosition);

    /// Called after the position update of a slot when size reporting is
    /// enabled and the slot has reported width, height and azimuth.
    fn update_touch_size(&mut self, _size: TouchSize) {}

    /// Called when every active contact of the current frame has been sent
    fn frame_processed(&mut self);

    fn device_connected(&mut self);

    fn device_disconnected(&mut self);
}

/// Records every event in order
impl TouchDelegate for Vec<TouchEvent> {
    fn update_touch_position(&mut self, position: TouchPosition) {
        self.push(TouchEvent::Position(position));
    }

    fn update_touch_size(&mut self, size: TouchSize) {
        self.push(TouchEvent::Size(size));
    }

    fn frame_processed(&mut self) {
        self.push(TouchEvent::FrameProcessed);
    }

    fn device_connected(&mut self) {
        self.push(TouchEvent::Connected);
    }

    fn device_disconnected(&mut self) {
        self.push(TouchEvent::Disconnected);
    }
}

/// Forwards events to a consumer running on another task
#[derive(Debug, Clone)]
pub struct ChannelDelegate {
    tx: mpsc::UnboundedSender<TouchEvent>,
}

impl ChannelDelegate {
    pub fn new(tx: mpsc::UnboundedSender<TouchEvent>) -> Self {
        Self { tx }
    }

    /// Create a delegate along with the receiver its events arrive on
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TouchEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn send(&self, event: TouchEvent) {
        if let Err(e) = self.tx.send(event) {
            log::debug!("Touch consumer has gone away, dropping event: {:?}", e.0);
        }
    }
}

impl TouchDelegate for ChannelDelegate {
    fn update_touch_position(&mut self, position: TouchPosition) {
        self.send(TouchEvent::Position(position));
    }

    fn update_touch_size(&mut self, size: TouchSize) {
        self.send(TouchEvent::Size(size));
    }

    fn frame_processed(&mut self) {
        self.send(TouchEvent::FrameProcessed);
    }

    fn device_connected(&mut self) {
        self.send(TouchEvent::Connected);
    }

    fn device_disconnected(&mut self) {
        self.send(TouchEvent::Disconnected);
    }
}
