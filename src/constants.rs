/// Generic Desktop usage page
pub const PAGE_GENERIC_DESKTOP: u32 = 0x01;
/// Digitizer usage page
pub const PAGE_DIGITIZER: u32 = 0x0D;

pub const USAGE_GD_X: u32 = 0x30;
pub const USAGE_GD_Y: u32 = 0x31;

pub const USAGE_DIG_TOUCH_SCREEN: u32 = 0x04;
pub const USAGE_DIG_TIP_SWITCH: u32 = 0x42;
pub const USAGE_DIG_TOUCH_VALID: u32 = 0x47;
pub const USAGE_DIG_WIDTH: u32 = 0x48;
pub const USAGE_DIG_HEIGHT: u32 = 0x49;
pub const USAGE_DIG_CONTACT_IDENTIFIER: u32 = 0x51;
pub const USAGE_DIG_CONTACT_COUNT: u32 = 0x54;
pub const USAGE_DIG_RELATIVE_SCAN_TIME: u32 = 0x56;
pub const USAGE_DIG_AZIMUTH: u32 = 0x5B;

/// Default capacity of the per-device ingestion queue
pub const DEFAULT_QUEUE_DEPTH: usize = 1000;
