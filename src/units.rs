use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Centimetre → inch conversion for figure sizing
// ---------------------------------------------------------------------------

pub const CM_PER_INCH: f64 = 2.54;

/// Convert a single length from centimetres to inches.
pub fn inches(cm: f64) -> f64 {
    cm / CM_PER_INCH
}

/// A (width, height) figure size in centimetres.
///
/// Deserializes from a two-element JSON array: `[30.0, 9.6]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CmSize(pub f64, pub f64);

impl CmSize {
    pub fn new(width: f64, height: f64) -> Self {
        CmSize(width, height)
    }

    pub fn to_inches(self) -> (f64, f64) {
        (inches(self.0), inches(self.1))
    }
}

impl From<(f64, f64)> for CmSize {
    fn from((w, h): (f64, f64)) -> Self {
        CmSize::new(w, h)
    }
}

impl From<[f64; 2]> for CmSize {
    fn from([w, h]: [f64; 2]) -> Self {
        CmSize::new(w, h)
    }
}

/// Convert a centimetre size to inches, componentwise.
///
/// Accepts two separate numbers as a tuple or one two-element array:
/// `cm2inch((30.0, 9.6))`, `cm2inch([30.0, 9.6])`.
pub fn cm2inch(size: impl Into<CmSize>) -> (f64, f64) {
    size.into().to_inches()
}
