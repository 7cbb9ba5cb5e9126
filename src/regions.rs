//! Regions shown in the satellite image list.
//!
//! The table is a `static`, so it is fixed before the first request and never
//! mutated. Concurrent handlers read it without synchronisation.

/// A geographic area with its imagery provider code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Display name, also used as the list item caption
    pub name: &'static str,
    /// Provider code substituted into the image URL
    pub code: &'static str,
}

impl Region {
    const fn new(name: &'static str, code: &'static str) -> Self {
        Self { name, code }
    }
}

/// All regions, in display order.
///
/// Russia uses `RU`. Older data mapped it to `NL`, which duplicated the
/// Netherlands image under a different caption.
pub static REGIONS: [Region; 15] = [
    Region::new("Italia", "IT"),
    Region::new("Alpi", "ALPS"),
    Region::new("Europa", "EU"),
    Region::new("Germania", "DE"),
    Region::new("Francia", "FR"),
    Region::new("Spagna", "SP"),
    Region::new("Gran Bretagna", "GB"),
    Region::new("Russia", "RU"),
    Region::new("Polonia", "PL"),
    Region::new("Grecia", "GR"),
    Region::new("Turchia", "TU"),
    Region::new("Balcani", "BA"),
    Region::new("Ungheria", "HU"),
    Region::new("Olanda", "NL"),
    Region::new("Scandinavia", "SCAN"),
];

/// Iterate the regions in display order.
pub fn all() -> impl ExactSizeIterator<Item = &'static Region> {
    REGIONS.iter()
}
