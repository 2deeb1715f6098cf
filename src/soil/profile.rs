//! Layered soil profile model
//!
//! A profile is an ordered stack of strata, each carrying depth-varying
//! property samples:
//! - undrained shear strength su (kPa) for clay
//! - friction angle phi (degrees) for sand
//! - submerged unit weight (kN/m³) for both
//!
//! # Internal units
//!
//! All depths are stored in **METERS below mudline**, all property samples
//! in the SI units above. This is consistent throughout spudcan-core.
//!
//! Lookup is purely functional: linear interpolation between a layer's
//! bounding sample points, constant beyond the first/last sample. A depth
//! with no covering layer is an error, never a guess.

use crate::types::*;
use serde::{Deserialize, Serialize};

/// Sampling step for running-average strength windows (m)
const AVG_SAMPLE_STEP_M: f64 = 0.05;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Profile has no layers")]
    Empty,

    #[error("Layer '{layer}' has invalid depth interval {top_m}..{bottom_m} m")]
    InvalidInterval {
        layer: String,
        top_m: f64,
        bottom_m: f64,
    },

    #[error("Layers '{upper}' and '{lower}' are out of depth order")]
    LayersOutOfOrder { upper: String, lower: String },

    #[error("Layers '{upper}' and '{lower}' overlap above {depth}")]
    LayersOverlap {
        upper: String,
        lower: String,
        depth: DisplayDepth,
    },

    #[error("No soil layer covers depth {0}")]
    NoLayerAtDepth(DisplayDepth),

    #[error("Layer '{layer}' is missing {property} samples")]
    MissingProperty {
        layer: String,
        property: &'static str,
    },

    #[error("Layer '{layer}' {property} samples are not ordered by depth")]
    UnorderedSamples {
        layer: String,
        property: &'static str,
    },
}

/// Stratum classification. Determines which strength property the layer
/// carries and which bearing formula governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilType {
    Clay,
    Sand,
}

/// One (depth, value) property sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilPoint {
    /// Depth below mudline (m)
    pub depth_m: f64,

    /// Property value at that depth (kPa, degrees, or kN/m³)
    pub value: f64,
}

/// One stratum of the profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilLayer {
    /// Borehole log label (e.g. "Unit II - soft clay")
    pub name: String,

    /// Top of the stratum, meters below mudline
    pub top_m: f64,

    /// Bottom of the stratum, meters below mudline (exclusive)
    pub bottom_m: f64,

    pub soil_type: SoilType,

    /// su (kPa) for clay, phi (degrees) for sand
    pub strength: Vec<SoilPoint>,

    /// Submerged unit weight (kN/m³)
    pub unit_weight: Vec<SoilPoint>,
}

impl SoilLayer {
    pub fn clay(name: impl Into<String>, top_m: f64, bottom_m: f64) -> Self {
        Self {
            name: name.into(),
            top_m,
            bottom_m,
            soil_type: SoilType::Clay,
            strength: Vec::new(),
            unit_weight: Vec::new(),
        }
    }

    pub fn sand(name: impl Into<String>, top_m: f64, bottom_m: f64) -> Self {
        Self {
            name: name.into(),
            top_m,
            bottom_m,
            soil_type: SoilType::Sand,
            strength: Vec::new(),
            unit_weight: Vec::new(),
        }
    }

    /// Set strength samples from (depth_m, value) pairs
    pub fn with_strength(mut self, samples: &[(f64, f64)]) -> Self {
        self.strength = samples
            .iter()
            .map(|&(depth_m, value)| SoilPoint { depth_m, value })
            .collect();
        self
    }

    /// Set unit-weight samples from (depth_m, value) pairs
    pub fn with_unit_weight(mut self, samples: &[(f64, f64)]) -> Self {
        self.unit_weight = samples
            .iter()
            .map(|&(depth_m, value)| SoilPoint { depth_m, value })
            .collect();
        self
    }

    /// Constant strength across the layer
    pub fn with_uniform_strength(self, value: f64) -> Self {
        let top = self.top_m;
        self.with_strength(&[(top, value)])
    }

    /// Constant unit weight across the layer
    pub fn with_uniform_unit_weight(self, value: f64) -> Self {
        let top = self.top_m;
        self.with_unit_weight(&[(top, value)])
    }

    /// Layer thickness (m)
    pub fn thickness_m(&self) -> f64 {
        self.bottom_m - self.top_m
    }

    fn property_name(&self) -> &'static str {
        match self.soil_type {
            SoilType::Clay => "su",
            SoilType::Sand => "phi",
        }
    }

    fn validate(&self) -> Result<(), ProfileError> {
        if !(self.top_m < self.bottom_m) || !self.top_m.is_finite() || !self.bottom_m.is_finite() {
            return Err(ProfileError::InvalidInterval {
                layer: self.name.clone(),
                top_m: self.top_m,
                bottom_m: self.bottom_m,
            });
        }
        if self.strength.is_empty() {
            return Err(ProfileError::MissingProperty {
                layer: self.name.clone(),
                property: self.property_name(),
            });
        }
        if self.unit_weight.is_empty() {
            return Err(ProfileError::MissingProperty {
                layer: self.name.clone(),
                property: "unit weight",
            });
        }
        if !samples_ordered(&self.strength) {
            return Err(ProfileError::UnorderedSamples {
                layer: self.name.clone(),
                property: self.property_name(),
            });
        }
        if !samples_ordered(&self.unit_weight) {
            return Err(ProfileError::UnorderedSamples {
                layer: self.name.clone(),
                property: "unit weight",
            });
        }
        Ok(())
    }

    /// Interpolated strength at depth, clamped beyond the sample range
    pub fn strength_at(&self, z_m: f64) -> f64 {
        interp(&self.strength, z_m)
    }

    /// Interpolated unit weight at depth, clamped beyond the sample range
    pub fn unit_weight_at(&self, z_m: f64) -> f64 {
        interp(&self.unit_weight, z_m)
    }

    /// Arithmetic mean of strength over the window [z1, z2]
    pub fn strength_avg(&self, z1_m: f64, z2_m: f64) -> f64 {
        avg_over(&self.strength, z1_m, z2_m)
    }

    /// Arithmetic mean of unit weight over the window [z1, z2]
    pub fn unit_weight_avg(&self, z1_m: f64, z2_m: f64) -> f64 {
        avg_over(&self.unit_weight, z1_m, z2_m)
    }
}

fn samples_ordered(points: &[SoilPoint]) -> bool {
    points.windows(2).all(|w| w[0].depth_m <= w[1].depth_m)
}

/// Linear interpolation within the sample list, constant outside it
fn interp(points: &[SoilPoint], z_m: f64) -> f64 {
    debug_assert!(!points.is_empty());
    if z_m <= points[0].depth_m {
        return points[0].value;
    }
    for pair in points.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        if z_m <= p2.depth_m {
            if p2.depth_m == p1.depth_m {
                return p1.value;
            }
            let frac = (z_m - p1.depth_m) / (p2.depth_m - p1.depth_m);
            return p1.value + frac * (p2.value - p1.value);
        }
    }
    points[points.len() - 1].value
}

/// Arithmetic mean of the interpolated property over [z1, z2]
fn avg_over(points: &[SoilPoint], z1_m: f64, z2_m: f64) -> f64 {
    if z2_m <= z1_m {
        return interp(points, z1_m);
    }
    let mut sum = 0.0;
    let mut count = 0u32;
    let mut z = z1_m;
    while z <= z2_m + 1e-9 {
        sum += interp(points, z);
        count += 1;
        z += AVG_SAMPLE_STEP_M;
    }
    sum / count as f64
}

/// A validated stack of soil layers, queryable by depth.
///
/// Construction checks ordering, overlap and property completeness; queries
/// for an uncovered depth fail with [`ProfileError::NoLayerAtDepth`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilProfile {
    layers: Vec<SoilLayer>,
}

impl SoilProfile {
    pub fn new(layers: Vec<SoilLayer>) -> Result<Self, ProfileError> {
        if layers.is_empty() {
            return Err(ProfileError::Empty);
        }
        for layer in &layers {
            layer.validate()?;
        }
        for pair in layers.windows(2) {
            let (upper, lower) = (&pair[0], &pair[1]);
            if lower.top_m < upper.top_m {
                return Err(ProfileError::LayersOutOfOrder {
                    upper: upper.name.clone(),
                    lower: lower.name.clone(),
                });
            }
            if lower.top_m < upper.bottom_m {
                return Err(ProfileError::LayersOverlap {
                    upper: upper.name.clone(),
                    lower: lower.name.clone(),
                    depth: DisplayDepth(from_depth_m(upper.bottom_m)),
                });
            }
        }
        Ok(Self { layers })
    }

    pub fn layers(&self) -> &[SoilLayer] {
        &self.layers
    }

    /// Top of the shallowest layer (m)
    pub fn top_m(&self) -> f64 {
        self.layers[0].top_m
    }

    /// Bottom of the deepest layer (m)
    pub fn bottom_m(&self) -> f64 {
        self.layers[self.layers.len() - 1].bottom_m
    }

    /// Index of the layer covering `z_m`.
    ///
    /// Intervals are half-open [top, bottom); the bottom of the deepest
    /// layer is treated as covered so an analysis ceiling placed exactly at
    /// the profile bottom remains valid.
    pub fn layer_index_at(&self, z_m: f64) -> Result<usize, ProfileError> {
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.top_m <= z_m && z_m < layer.bottom_m {
                return Ok(i);
            }
        }
        let last = self.layers.len() - 1;
        if (z_m - self.layers[last].bottom_m).abs() < 1e-9 {
            return Ok(last);
        }
        Err(ProfileError::NoLayerAtDepth(DisplayDepth(from_depth_m(
            z_m,
        ))))
    }

    /// The layer covering `z_m`
    pub fn layer_at(&self, z_m: f64) -> Result<&SoilLayer, ProfileError> {
        Ok(&self.layers[self.layer_index_at(z_m)?])
    }

    /// The layer directly beneath the one covering `z_m`, if any
    pub fn layer_below(&self, z_m: f64) -> Result<Option<&SoilLayer>, ProfileError> {
        let idx = self.layer_index_at(z_m)?;
        Ok(self.layers.get(idx + 1))
    }

    /// Interpolated strength at depth: su (kPa) in clay, phi (degrees) in sand
    pub fn strength_at(&self, z_m: f64) -> Result<f64, ProfileError> {
        Ok(self.layer_at(z_m)?.strength_at(z_m))
    }

    /// Interpolated submerged unit weight at depth (kN/m³)
    pub fn unit_weight_at(&self, z_m: f64) -> Result<f64, ProfileError> {
        Ok(self.layer_at(z_m)?.unit_weight_at(z_m))
    }

    /// su at `z_m` clamped into the covered depth range; `None` if the
    /// clamped depth lands in sand. Used for strength-gradient estimates
    /// that probe half a diameter beneath the query depth.
    pub(crate) fn su_clamped(&self, z_m: f64) -> Option<f64> {
        let z = z_m.clamp(self.top_m(), self.bottom_m());
        match self.layer_at(z) {
            Ok(layer) if layer.soil_type == SoilType::Clay => Some(layer.strength_at(z)),
            _ => None,
        }
    }

    /// Effective overburden pressure p0 at depth (kPa): trapezoidal
    /// integral of the submerged unit weight from the mudline down.
    pub fn overburden_kpa(&self, z_m: f64) -> Result<f64, ProfileError> {
        const STEP_M: f64 = 0.1;
        if z_m <= 0.0 {
            return Ok(0.0);
        }
        let mut p0 = 0.0;
        let mut z_prev = 0.0;
        let mut g_prev = self.unit_weight_at(0.0)?;
        let mut z = STEP_M;
        while z < z_m - 1e-9 {
            let g = self.unit_weight_at(z)?;
            p0 += 0.5 * (g_prev + g) * (z - z_prev);
            z_prev = z;
            g_prev = g;
            z += STEP_M;
        }
        let g_end = self.unit_weight_at(z_m)?;
        p0 += 0.5 * (g_prev + g_end) * (z_m - z_prev);
        Ok(p0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_layer_profile() -> SoilProfile {
        SoilProfile::new(vec![
            SoilLayer::clay("soft clay", 0.0, 10.0)
                .with_strength(&[(0.0, 20.0), (10.0, 40.0)])
                .with_uniform_unit_weight(8.0),
            SoilLayer::sand("dense sand", 10.0, 30.0)
                .with_uniform_strength(35.0)
                .with_uniform_unit_weight(10.0),
        ])
        .unwrap()
    }

    #[test]
    fn interpolates_between_samples() {
        let profile = two_layer_profile();
        assert_relative_eq!(profile.strength_at(0.0).unwrap(), 20.0);
        assert_relative_eq!(profile.strength_at(5.0).unwrap(), 30.0);
        assert_relative_eq!(profile.strength_at(10.0).unwrap(), 35.0); // sand phi
    }

    #[test]
    fn clamps_outside_sample_range() {
        let layer = SoilLayer::clay("c", 0.0, 10.0)
            .with_strength(&[(2.0, 20.0), (8.0, 50.0)])
            .with_uniform_unit_weight(8.0);
        assert_relative_eq!(layer.strength_at(0.0), 20.0);
        assert_relative_eq!(layer.strength_at(9.5), 50.0);
        assert_relative_eq!(layer.strength_at(5.0), 35.0);
    }

    #[test]
    fn profile_bottom_is_covered() {
        let profile = two_layer_profile();
        assert!(profile.strength_at(30.0).is_ok());
        assert!(matches!(
            profile.strength_at(30.5),
            Err(ProfileError::NoLayerAtDepth(_))
        ));
    }

    #[test]
    fn gap_between_layers_fails_at_query() {
        let profile = SoilProfile::new(vec![
            SoilLayer::clay("a", 0.0, 5.0)
                .with_uniform_strength(20.0)
                .with_uniform_unit_weight(8.0),
            SoilLayer::clay("b", 8.0, 20.0)
                .with_uniform_strength(60.0)
                .with_uniform_unit_weight(9.0),
        ])
        .unwrap();
        assert!(profile.strength_at(4.0).is_ok());
        assert!(matches!(
            profile.strength_at(6.0),
            Err(ProfileError::NoLayerAtDepth(_))
        ));
    }

    #[test]
    fn overlapping_layers_rejected() {
        let result = SoilProfile::new(vec![
            SoilLayer::clay("a", 0.0, 6.0)
                .with_uniform_strength(20.0)
                .with_uniform_unit_weight(8.0),
            SoilLayer::clay("b", 5.0, 20.0)
                .with_uniform_strength(60.0)
                .with_uniform_unit_weight(9.0),
        ]);
        assert!(matches!(result, Err(ProfileError::LayersOverlap { .. })));
    }

    #[test]
    fn out_of_order_layers_rejected() {
        let result = SoilProfile::new(vec![
            SoilLayer::clay("deep", 10.0, 20.0)
                .with_uniform_strength(60.0)
                .with_uniform_unit_weight(9.0),
            SoilLayer::clay("shallow", 0.0, 10.0)
                .with_uniform_strength(20.0)
                .with_uniform_unit_weight(8.0),
        ]);
        assert!(matches!(result, Err(ProfileError::LayersOutOfOrder { .. })));
    }

    #[test]
    fn missing_strength_rejected() {
        let result = SoilProfile::new(vec![
            SoilLayer::clay("bare", 0.0, 10.0).with_uniform_unit_weight(8.0),
        ]);
        assert!(matches!(result, Err(ProfileError::MissingProperty { .. })));
    }

    #[test]
    fn unordered_samples_rejected() {
        let result = SoilProfile::new(vec![
            SoilLayer::clay("scrambled", 0.0, 10.0)
                .with_strength(&[(5.0, 30.0), (1.0, 20.0)])
                .with_uniform_unit_weight(8.0),
        ]);
        assert!(matches!(result, Err(ProfileError::UnorderedSamples { .. })));
    }

    #[test]
    fn overburden_uniform_unit_weight() {
        let profile = two_layer_profile();
        // 8 kN/m³ over 10 m, except the boundary sample at z = 10 lands in
        // the 10 kN/m³ layer (half-open intervals), lifting the last
        // trapezoid: 79.2 + 0.5·(8 + 10)·0.1 = 80.1
        assert_relative_eq!(profile.overburden_kpa(10.0).unwrap(), 80.1, epsilon = 0.01);
        // plus 10 kN/m³ over the next 5 m
        assert_relative_eq!(
            profile.overburden_kpa(15.0).unwrap(),
            130.1,
            epsilon = 0.05
        );
        assert_relative_eq!(profile.overburden_kpa(0.0).unwrap(), 0.0);
    }

    #[test]
    fn strength_average_over_window() {
        let profile = two_layer_profile();
        // linear 20..40 over 0..10 → mean of 0..5 window is 25
        let layer = profile.layer_at(0.0).unwrap();
        assert_relative_eq!(layer.strength_avg(0.0, 5.0), 25.0, epsilon = 0.2);
    }
}
