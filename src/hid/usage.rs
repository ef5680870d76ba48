use crate::constants::*;

/// Usages the interpreter understands. Everything else is carried as
/// [Usage::Other] and ignored when assembling touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    X,
    Y,
    TipSwitch,
    ContactIdentifier,
    ContactCount,
    TouchValid,
    RelativeScanTime,
    Width,
    Height,
    Azimuth,
    Other { page: u32, usage: u32 },
}

impl Usage {
    pub fn from_page_usage(page: u32, usage: u32) -> Self {
        match (page, usage) {
            (PAGE_GENERIC_DESKTOP, USAGE_GD_X) => Usage::X,
            (PAGE_GENERIC_DESKTOP, USAGE_GD_Y) => Usage::Y,
            (PAGE_DIGITIZER, USAGE_DIG_TIP_SWITCH) => Usage::TipSwitch,
            (PAGE_DIGITIZER, USAGE_DIG_CONTACT_IDENTIFIER) => Usage::ContactIdentifier,
            (PAGE_DIGITIZER, USAGE_DIG_CONTACT_COUNT) => Usage::ContactCount,
            (PAGE_DIGITIZER, USAGE_DIG_TOUCH_VALID) => Usage::TouchValid,
            (PAGE_DIGITIZER, USAGE_DIG_RELATIVE_SCAN_TIME) => Usage::RelativeScanTime,
            (PAGE_DIGITIZER, USAGE_DIG_WIDTH) => Usage::Width,
            (PAGE_DIGITIZER, USAGE_DIG_HEIGHT) => Usage::Height,
            (PAGE_DIGITIZER, USAGE_DIG_AZIMUTH) => Usage::Azimuth,
            (page, usage) => Usage::Other { page, usage },
        }
    }

    /// Short name of the usage page, used in debug output
    pub fn page_name(&self) -> &'static str {
        match self {
            Usage::X | Usage::Y => "(GD) ",
            Usage::Other {
                page: PAGE_GENERIC_DESKTOP,
                ..
            } => "(GD) ",
            Usage::Other {
                page: PAGE_DIGITIZER,
                ..
            } => "(Dig)",
            Usage::Other { .. } => "(---)",
            _ => "(Dig)",
        }
    }

    /// Short name of the usage, used in debug output
    pub fn name(&self) -> &'static str {
        match self {
            Usage::X => "(X)      ",
            Usage::Y => "(Y)      ",
            Usage::TipSwitch => "(Tip)    ",
            Usage::ContactIdentifier => "(Cont ID)",
            Usage::ContactCount => "(ContCnt)",
            Usage::TouchValid => "(IsValid)",
            Usage::RelativeScanTime => "(ScnTime)",
            Usage::Width => "(Width)  ",
            Usage::Height => "(Height) ",
            Usage::Azimuth => "(Azimuth)",
            Usage::Other { .. } => "(-------)",
        }
    }
}
