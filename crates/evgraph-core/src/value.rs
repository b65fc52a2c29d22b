//! Plain value records attached to particles, vertices and events

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Four-component vector used for both momentum (px, py, pz, e) and
/// position (x, y, z, t)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FourVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub t: f64,
}

impl FourVector {
    pub const fn new(x: f64, y: f64, z: f64, t: f64) -> Self {
        Self { x, y, z, t }
    }

    pub fn px(&self) -> f64 {
        self.x
    }

    pub fn py(&self) -> f64 {
        self.y
    }

    pub fn pz(&self) -> f64 {
        self.z
    }

    pub fn e(&self) -> f64 {
        self.t
    }

    /// Invariant mass squared
    pub fn m2(&self) -> f64 {
        self.t * self.t - (self.x * self.x + self.y * self.y + self.z * self.z)
    }

    /// Invariant mass; negative for space-like vectors
    pub fn m(&self) -> f64 {
        let m2 = self.m2();
        if m2 < 0.0 {
            -(-m2).sqrt()
        } else {
            m2.sqrt()
        }
    }

    /// Transverse component
    pub fn perp(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub(crate) fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.x * factor,
            self.y * factor,
            self.z * factor,
            self.t * factor,
        )
    }
}

/// Colour flow codes, keyed by code index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flow(BTreeMap<i32, i32>);

impl Flow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Code stored at `index`, 0 if unset
    pub fn icode(&self, index: i32) -> i32 {
        self.0.get(&index).copied().unwrap_or(0)
    }

    pub fn set_icode(&mut self, index: i32, code: i32) {
        self.0.insert(index, code);
    }

    pub fn with_icode(mut self, index: i32, code: i32) -> Self {
        self.set_icode(index, code);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// (index, code) pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.0.iter().map(|(i, c)| (*i, *c))
    }
}

/// Polarization angles in radians
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Polarization {
    theta: f64,
    phi: f64,
    defined: bool,
}

impl Polarization {
    pub fn new(theta: f64, phi: f64) -> Self {
        Self {
            theta,
            phi,
            defined: true,
        }
    }

    pub fn undefined() -> Self {
        Self::default()
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }

    pub fn is_defined(&self) -> bool {
        self.defined
    }
}

/// Ordered weights with optional names
///
/// Unnamed weights are reported under their position ("0", "1", ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightContainer {
    values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    names: Vec<String>,
}

impl WeightContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            values,
            names: Vec::new(),
        }
    }

    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    /// Append a named weight
    pub fn push_named(&mut self, name: impl Into<String>, value: f64) {
        let position = self.values.len();
        self.fill_default_names(position);
        self.names.push(name.into());
        self.values.push(value);
    }

    /// Replace the names of the existing weights
    ///
    /// Returns false (and changes nothing) if the count does not match.
    pub fn set_names(&mut self, names: Vec<String>) -> bool {
        if names.len() != self.values.len() {
            return false;
        }
        self.names = names;
        true
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<f64> {
        self.names()
            .into_iter()
            .position(|n| n == name)
            .and_then(|i| self.get(i))
    }

    pub fn names(&self) -> Vec<String> {
        if self.names.len() == self.values.len() {
            return self.names.clone();
        }
        (0..self.values.len()).map(|i| i.to_string()).collect()
    }

    /// True when names other than the positional defaults were set
    pub fn has_names(&self) -> bool {
        !self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn fill_default_names(&mut self, upto: usize) {
        while self.names.len() < upto {
            self.names.push(self.names.len().to_string());
        }
    }
}

/// Cross section of the generated process
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossSection {
    pub value: f64,
    pub error: f64,
}

/// Parton density information for the hard scatter
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfInfo {
    pub id1: i32,
    pub id2: i32,
    pub x1: f64,
    pub x2: f64,
    pub scale: f64,
    pub pdf1: f64,
    pub pdf2: f64,
    #[serde(default)]
    pub pdf_id1: i32,
    #[serde(default)]
    pub pdf_id2: i32,
}

/// Heavy-ion collision summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeavyIon {
    pub ncoll_hard: i32,
    pub npart_proj: i32,
    pub npart_targ: i32,
    pub ncoll: i32,
    pub spectator_neutrons: i32,
    pub spectator_protons: i32,
    pub n_nwounded_collisions: i32,
    pub nwounded_n_collisions: i32,
    pub nwounded_nwounded_collisions: i32,
    pub impact_parameter: f64,
    pub event_plane_angle: f64,
    pub eccentricity: f64,
    pub sigma_inel_nn: f64,
}
