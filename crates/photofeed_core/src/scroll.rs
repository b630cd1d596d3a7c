/// Fraction of the document that must be scrolled past before more posts
/// are requested.
pub const LOAD_MORE_THRESHOLD: f64 = 0.9;

/// Scroll metrics reported by the host, all in the same unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPosition {
    pub offset: f64,
    pub viewport: f64,
    pub document: f64,
}

impl ScrollPosition {
    pub fn new(offset: f64, viewport: f64, document: f64) -> Self {
        Self {
            offset,
            viewport,
            document,
        }
    }

    /// True once the bottom of the viewport passes [`LOAD_MORE_THRESHOLD`]
    /// of the document height.
    pub fn is_near_bottom(&self) -> bool {
        if self.document <= 0.0 {
            return true;
        }
        (self.offset + self.viewport) / self.document > LOAD_MORE_THRESHOLD
    }
}
