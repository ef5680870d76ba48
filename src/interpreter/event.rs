use std::fmt::{self, Display};

/// Position update for a single contact
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchPosition {
    pub contact_id: i64,
    /// `None` if X was never reported for this slot
    pub x: Option<f64>,
    /// `None` if Y was never reported for this slot
    pub y: Option<f64>,
    pub on_surface: bool,
    pub is_valid: bool,
}

/// Size and orientation of a single contact, in logical units
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchSize {
    pub contact_id: i64,
    pub width: f64,
    pub height: f64,
    pub azimuth: f64,
}

/// Everything the interpreter tells its consumer
#[derive(Clone, Debug, PartialEq)]
pub enum TouchEvent {
    Position(TouchPosition),
    Size(TouchSize),
    FrameProcessed,
    Connected,
    Disconnected,
}

impl Display for TouchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let axis = |value: Option<f64>| match value {
            Some(value) => format!("{value:.4}"),
            None => "-".to_string(),
        };
        match self {
            TouchEvent::Position(p) => write!(
                f,
                "TOUCH [{}] {}, {} tip={} valid={}",
                p.contact_id,
                axis(p.x),
                axis(p.y),
                p.on_surface,
                p.is_valid
            ),
            TouchEvent::Size(s) => write!(
                f,
                "SIZE [{}] {}x{} azimuth={}",
                s.contact_id, s.width, s.height, s.azimuth
            ),
            TouchEvent::FrameProcessed => write!(f, "FRAME"),
            TouchEvent::Connected => write!(f, "CONNECTED"),
            TouchEvent::Disconnected => write!(f, "DISCONNECTED"),
        }
    }
}
