use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Profile – one measured series along the core
// ---------------------------------------------------------------------------

/// A series read from one source: `values[i]` was measured at `depth[i]`.
/// Missing cells are `NaN`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    /// File the series came from (empty for in-memory profiles).
    pub source: PathBuf,
    /// Depth along the core (mm).
    pub depth: Vec<f64>,
    /// Measured value at each depth – same length as `depth`.
    pub values: Vec<f64>,
}

impl Profile {
    pub fn new(depth: Vec<f64>, values: Vec<f64>) -> Self {
        Profile {
            source: PathBuf::new(),
            depth,
            values,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.depth.len().min(self.values.len())
    }

    /// Plot points `[value, depth]`, one per row, missing values included.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.values
            .iter()
            .zip(self.depth.iter())
            .map(|(&v, &d)| [v, d])
            .collect()
    }

    /// Finite (min, max) of the depth column.
    pub fn depth_range(&self) -> Option<(f64, f64)> {
        finite_range(&self.depth)
    }

    /// First and last finite values, in row order.
    pub fn value_endpoints(&self) -> Option<(f64, f64)> {
        let first = self.values.iter().copied().find(|v| v.is_finite())?;
        let last = self.values.iter().rev().copied().find(|v| v.is_finite())?;
        Some((first, last))
    }
}

/// (min, max) over the finite entries of `values`.
pub fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

// ---------------------------------------------------------------------------
// CoreDataset – everything the figure needs
// ---------------------------------------------------------------------------

/// All series loaded for one figure. A `None` profile means the panel's
/// source is absent or disabled.
#[derive(Debug, Clone, Default)]
pub struct CoreDataset {
    /// Age model: depth (MCD) → calendar age.
    pub age_model: Option<Profile>,
    /// XRF titanium counts against XRF depth.
    pub titanium: Option<Profile>,
    /// One entry per configured extra panel, in panel order.
    pub extra: Vec<Option<Profile>>,
}

impl CoreDataset {
    /// Profiles in panel order: age model, titanium, extras.
    pub fn panel_profiles(&self) -> impl Iterator<Item = Option<&Profile>> {
        [self.age_model.as_ref(), self.titanium.as_ref()]
            .into_iter()
            .chain(self.extra.iter().map(Option::as_ref))
    }

    /// Finite depth range over every loaded profile.
    pub fn depth_range(&self) -> Option<(f64, f64)> {
        self.panel_profiles()
            .flatten()
            .filter_map(Profile::depth_range)
            .reduce(|(a_lo, a_hi), (b_lo, b_hi)| (a_lo.min(b_lo), a_hi.max(b_hi)))
    }
}
