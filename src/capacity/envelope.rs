//! Penetration capacity envelope
//!
//! Sweeps the ultimate vertical bearing capacity over a fixed depth grid,
//! letting squeezing and punch-through mechanisms cap the single-layer
//! bearing value wherever they apply. Capacities are reported in MN.

use crate::capacity::bearing::{
    DEFAULT_MEYERHOF_TABLE, backflow_occurs, clay_capacity, punchthrough_capacity, sand_capacity,
    squeeze_capacity,
};
use crate::soil::{ProfileError, SoilProfile, SoilType};
use crate::spudcan::Spudcan;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Hard ceiling on envelope size; a grid this fine is a configuration
/// mistake, not a legitimate analysis.
pub const MAX_ENVELOPE_SAMPLES: usize = 100_000;

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Profile(#[from] ProfileError),
}

/// Envelope sweep controls. Field defaults follow the SNAME-recommended
/// practice; every knob is named so a report can state exactly what was run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeOptions {
    /// Analysis ceiling below mudline (m)
    pub max_depth_m: f64,

    /// Depth grid increment (m)
    #[serde(default = "default_dz")]
    pub dz_m: f64,

    /// Use min(point, averaged) undrained strength in clay
    #[serde(default = "default_true")]
    pub use_min_cu: bool,

    /// Enforce the geometric squeezing trigger before applying the
    /// squeezing cap
    #[serde(default = "default_true")]
    pub squeeze_trigger: bool,

    /// Derate sand friction angle by 5°
    #[serde(default)]
    pub phi_reduction: bool,

    /// Apply the 0.8 windward-leg factor to every capacity
    #[serde(default)]
    pub windward_factor: bool,

    /// Override for the Meyerhof N(D/B) backflow table
    #[serde(default)]
    pub meyerhof_table: Option<Vec<(f64, f64)>>,
}

fn default_dz() -> f64 {
    0.25
}

fn default_true() -> bool {
    true
}

impl EnvelopeOptions {
    pub fn new(max_depth: Depth) -> Self {
        Self {
            max_depth_m: to_depth_m(max_depth),
            dz_m: 0.25,
            use_min_cu: true,
            squeeze_trigger: true,
            phi_reduction: false,
            windward_factor: false,
            meyerhof_table: None,
        }
    }

    pub fn validate(&self) -> Result<(), EnvelopeError> {
        if !(self.max_depth_m > 0.0) || !self.max_depth_m.is_finite() {
            return Err(EnvelopeError::InvalidConfig(format!(
                "max_depth must be positive, got {} m",
                self.max_depth_m
            )));
        }
        if !(self.dz_m > 0.0) || !self.dz_m.is_finite() {
            return Err(EnvelopeError::InvalidConfig(format!(
                "dz must be positive, got {} m",
                self.dz_m
            )));
        }
        let count = (self.max_depth_m / self.dz_m).floor() as usize + 2;
        if count > MAX_ENVELOPE_SAMPLES {
            return Err(EnvelopeError::InvalidConfig(format!(
                "grid of {} samples exceeds the {} sample ceiling",
                count, MAX_ENVELOPE_SAMPLES
            )));
        }
        Ok(())
    }
}

/// Mechanism that governs the capacity at one depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mechanism {
    ClayBearing,
    SandBearing,
    Squeezing,
    PunchThrough,
}

/// One point of the capacity envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeSample {
    pub depth_m: f64,

    /// Governing ultimate vertical capacity (MN)
    pub capacity_mn: f64,

    /// None above the spudcan tip offset, where nothing bears
    pub mechanism: Option<Mechanism>,

    /// Squeezing cap applies at this depth
    pub squeezing: bool,

    /// Soil flows back over the spudcan at this depth
    pub backflow: bool,
}

/// Capacity against depth at a fixed increment, mudline to the analysis
/// ceiling inclusive. Computed once per run and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityEnvelope {
    pub samples: Vec<EnvelopeSample>,
    pub dz_m: f64,
}

impl CapacityEnvelope {
    /// Wrap an existing curve, for callers that compute capacities
    /// elsewhere
    pub fn from_samples(samples: Vec<EnvelopeSample>, dz_m: f64) -> Self {
        Self { samples, dz_m }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Largest capacity on the curve and the depth it occurs at (MN, m)
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.samples
            .iter()
            .max_by(|a, b| a.capacity_mn.total_cmp(&b.capacity_mn))
            .map(|s| (s.capacity_mn, s.depth_m))
    }
}

/// Depth grid: every multiple of dz up to the ceiling, plus a final sample
/// exactly at the ceiling when dz does not divide it
fn depth_grid(max_depth_m: f64, dz_m: f64) -> Vec<f64> {
    let steps = (max_depth_m / dz_m).floor() as usize;
    let mut depths: Vec<f64> = (0..=steps).map(|k| k as f64 * dz_m).collect();
    if let Some(&last) = depths.last()
        && last < max_depth_m - 1e-9
    {
        depths.push(max_depth_m);
    }
    depths
}

/// Compute the capacity envelope for one spudcan in one profile.
///
/// Fails fast on a bad grid and propagates profile gaps; a depth ceiling
/// reaching past the deepest layer is a data problem the caller has to see.
pub fn compute_envelope(
    spudcan: &Spudcan,
    profile: &SoilProfile,
    options: &EnvelopeOptions,
) -> Result<CapacityEnvelope, EnvelopeError> {
    options.validate()?;
    let meyerhof: &[(f64, f64)] = options
        .meyerhof_table
        .as_deref()
        .unwrap_or(&DEFAULT_MEYERHOF_TABLE);

    let depths = depth_grid(options.max_depth_m, options.dz_m);
    let mut samples = Vec::with_capacity(depths.len());

    for z in depths {
        if z < spudcan.tip_offset_m {
            samples.push(EnvelopeSample {
                depth_m: z,
                capacity_mn: 0.0,
                mechanism: None,
                squeezing: false,
                backflow: false,
            });
            continue;
        }

        let backflow = backflow_occurs(spudcan, z, profile, meyerhof)?;
        let layer_type = profile.layer_at(z)?.soil_type;

        let bearing = match layer_type {
            SoilType::Clay => clay_capacity(spudcan, z, profile, options.use_min_cu, backflow)?
                .map(|kn| (kn, Mechanism::ClayBearing)),
            SoilType::Sand => sand_capacity(spudcan, z, profile, options.phi_reduction)?
                .map(|kn| (kn, Mechanism::SandBearing)),
        };
        let squeeze =
            squeeze_capacity(spudcan, z, profile, options.squeeze_trigger, backflow)?
                .map(|kn| (kn, Mechanism::Squeezing));
        let punch = punchthrough_capacity(spudcan, z, profile, backflow)?
            .map(|kn| (kn, Mechanism::PunchThrough));

        let governing = [bearing, squeeze, punch]
            .into_iter()
            .flatten()
            .min_by(|a, b| a.0.total_cmp(&b.0));

        let (capacity_kn, mechanism) = match governing {
            Some((kn, mech)) => (kn, Some(mech)),
            None => (0.0, None),
        };
        let factor = if options.windward_factor { 0.8 } else { 1.0 };

        samples.push(EnvelopeSample {
            depth_m: z,
            capacity_mn: capacity_kn * factor / 1000.0,
            mechanism,
            squeezing: squeeze.is_some(),
            backflow,
        });
    }

    Ok(CapacityEnvelope {
        samples,
        dz_m: options.dz_m,
    })
}
