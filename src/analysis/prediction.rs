//! Failure-mode classification and penetration range prediction
//!
//! Turns the capacity envelope and the zone analysis into an installation
//! prediction: where the leg reaches static equilibrium, how far past it
//! the leg can travel, and which failure mechanism controls the answer.
//! Every numeric claim in a warning is carried as structured data so that
//! report layers never re-derive it.

use crate::analysis::zones::{Crossing, CrossingDirection, Zone, find_zones};
use crate::capacity::CapacityEnvelope;
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Capacity never reaches preload inside the analyzed depth range.
    /// A legitimate engineering finding: extend the analysis ceiling or
    /// revisit the preload.
    #[error(
        "No static equilibrium: capacity peaks at {max_capacity} within {max_depth}, below the preload"
    )]
    NoEquilibrium {
        max_capacity: DisplayCapacity,
        max_depth: DisplayDepth,
    },

    #[error("Invalid analysis options: {0}")]
    InvalidOptions(String),
}

/// Tuning knobs for the range predictor. Defaults follow the published
/// guidance; every value is named so a report can state what was run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Fraction of the static depth the leg may overshoot on inertia
    pub overshoot_factor: f64,

    /// Hard cap on the overshoot distance (m)
    pub max_overshoot_m: f64,

    /// Mean capacity/preload ratio above which an intervening layer is
    /// judged too strong for the leg to re-enter a deeper weak zone.
    /// A tractable proxy for the penetration energy integral, not a
    /// physics model.
    pub reentry_strength_threshold: f64,

    /// How close past the static depth a weak zone must start to count
    /// as an imminent breakthrough (m)
    pub proximity_window_m: f64,

    /// Weak zones thinner than this are discarded as noise (m)
    pub min_zone_thickness_m: f64,

    /// Recovery ratio below which the soil past a weak zone is judged
    /// too marginal to arrest the leg
    pub weak_recovery_ratio: f64,

    /// Mean capacity/preload ratio above which the soil just below the
    /// static depth counts as strong
    pub strong_soil_ratio: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            overshoot_factor: 0.10,
            max_overshoot_m: 3.0,
            reentry_strength_threshold: 2.0,
            proximity_window_m: 2.0,
            min_zone_thickness_m: 1.0,
            weak_recovery_ratio: 1.2,
            strong_soil_ratio: 1.5,
        }
    }
}

impl AnalysisOptions {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        // zero is a legitimate setting for the distances and factors;
        // the ratio thresholds divide or gate and must stay positive
        let non_negative = [
            (self.overshoot_factor, "overshoot_factor"),
            (self.max_overshoot_m, "max_overshoot"),
            (self.proximity_window_m, "proximity_window"),
            (self.min_zone_thickness_m, "min_zone_thickness"),
        ];
        for (value, name) in non_negative {
            if !(value >= 0.0) {
                return Err(AnalysisError::InvalidOptions(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }
        let positive = [
            (
                self.reentry_strength_threshold,
                "reentry_strength_threshold",
            ),
            (self.weak_recovery_ratio, "weak_recovery_ratio"),
            (self.strong_soil_ratio, "strong_soil_ratio"),
        ];
        for (value, name) in positive {
            if !(value > 0.0) {
                return Err(AnalysisError::InvalidOptions(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Mechanism that controls the predicted penetration range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Single clean crossing, nothing notable below
    SimpleArrest,
    /// Markedly stronger soil just below the static depth limits overshoot
    StrongLayerArrest,
    /// A weak zone starts right below the static depth and the soil past
    /// it barely recovers
    PunchThroughBreakthrough,
    /// A deeper weak zone exists but the intervening layer is too strong
    /// to punch through
    ReentryPrevented,
    /// A deeper weak zone is reachable; penetration may continue into it
    MultiZonePenetration,
}

/// How urgently a warning needs the engineer's attention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Installation hazard, act on it
    Critical,
    /// Context the engineer should know
    Informational,
    /// Confirms the prediction is well behaved
    Confirmatory,
}

/// Structured warning payloads; numbers the presentation layer needs are
/// fields, never baked into strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningDetail {
    /// Breakthrough into the named weak zone is likely
    PunchThroughZone {
        start_m: f64,
        end_m: f64,
        thickness_m: f64,
    },
    /// Strong soil below the static depth, overshoot bounded
    MinimalOvershoot { overshoot_m: f64 },
    /// The layer between the crossings is too strong to re-enter
    ReentryPrevented { strength_ratio: f64 },
    /// The layer between the crossings cannot rule out deeper penetration
    DeeperPenetrationPossible {
        second_crossing_m: f64,
        strength_ratio: f64,
    },
    /// Squeezing governs somewhere inside the predicted range
    SqueezingInRange { start_m: f64, end_m: f64 },
    /// Range width commentary
    NarrowRange { width_m: f64 },
    ModerateRange { width_m: f64 },
    WideRange { width_m: f64 },
}

impl WarningDetail {
    pub fn severity(&self) -> Severity {
        match self {
            WarningDetail::PunchThroughZone { .. }
            | WarningDetail::DeeperPenetrationPossible { .. } => Severity::Critical,
            WarningDetail::MinimalOvershoot { .. }
            | WarningDetail::SqueezingInRange { .. }
            | WarningDetail::ModerateRange { .. }
            | WarningDetail::WideRange { .. } => Severity::Informational,
            WarningDetail::ReentryPrevented { .. } | WarningDetail::NarrowRange { .. } => {
                Severity::Confirmatory
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionWarning {
    pub severity: Severity,
    pub detail: WarningDetail,
}

impl From<WarningDetail> for PredictionWarning {
    fn from(detail: WarningDetail) -> Self {
        Self {
            severity: detail.severity(),
            detail,
        }
    }
}

/// The installation prediction. A value object: built once, serialized for
/// reports, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub failure_mode: FailureMode,

    /// Depth of static equilibrium at the widest section (m)
    pub static_depth_m: f64,

    /// Predicted final range at the widest section (m)
    pub range_lower_m: f64,
    pub range_upper_m: f64,

    /// Always the upper bound of the range, the conservative design value
    pub recommended_design_depth_m: f64,

    /// A deeper weak zone remains reachable
    pub re_entry_possible: bool,

    /// Same figures at the spudcan tip
    pub static_tip_m: f64,
    pub range_lower_tip_m: f64,
    pub range_upper_tip_m: f64,

    /// Weak zones retained by the zone analyzer
    pub zones: Vec<Zone>,

    pub warnings: Vec<PredictionWarning>,
}

/// Mean capacity/preload ratio over samples with depth in (from, to],
/// or in (from, to) when `exclusive_end`
fn mean_ratio(
    envelope: &CapacityEnvelope,
    preload_mn: f64,
    from_m: f64,
    to_m: f64,
    exclusive_end: bool,
) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0u32;
    for sample in &envelope.samples {
        let past_start = sample.depth_m > from_m + 1e-9;
        let before_end = if exclusive_end {
            sample.depth_m < to_m - 1e-9
        } else {
            sample.depth_m <= to_m + 1e-9
        };
        if past_start && before_end {
            sum += sample.capacity_mn;
            count += 1;
        }
    }
    if count == 0 {
        None
    } else {
        Some(sum / (count as f64 * preload_mn))
    }
}

/// Classify the failure mode and predict the penetration range.
///
/// Depths in the result are referenced to the widest section; tip figures
/// add `tip_offset_m`. Fails with [`AnalysisError::NoEquilibrium`] when the
/// envelope never reaches the preload.
pub fn analyze(
    envelope: &CapacityEnvelope,
    preload_mn: f64,
    tip_offset_m: f64,
    options: &AnalysisOptions,
) -> Result<PredictionResult, AnalysisError> {
    options.validate()?;

    let (crossings, zones) = find_zones(envelope, preload_mn, options.min_zone_thickness_m);

    let static_depth = crossings
        .iter()
        .find(|c| c.direction == CrossingDirection::Upward)
        .map(|c| c.depth_m)
        .ok_or_else(|| {
            let (max_capacity, max_depth) = envelope.peak().unwrap_or((0.0, 0.0));
            AnalysisError::NoEquilibrium {
                max_capacity: DisplayCapacity(from_capacity_mn(max_capacity)),
                max_depth: DisplayDepth(from_depth_m(max_depth)),
            }
        })?;

    let mut warnings: Vec<PredictionWarning> = Vec::new();

    // Imminent breakthrough: a weak zone opens just past the static depth
    // and the soil beyond it barely recovers. The leg will not stop at the
    // static prediction.
    let breakthrough = zones.iter().find(|z| {
        z.start_m >= static_depth - 1e-9
            && z.start_m - static_depth < options.proximity_window_m
            && z.recovery_ratio
                .map_or(true, |r| r < options.weak_recovery_ratio)
    });
    if let Some(zone) = breakthrough {
        warnings.push(
            WarningDetail::PunchThroughZone {
                start_m: zone.start_m,
                end_m: zone.end_m,
                thickness_m: zone.thickness_m,
            }
            .into(),
        );
        let upper = zone.end_m;
        return Ok(finish(
            FailureMode::PunchThroughBreakthrough,
            static_depth,
            static_depth,
            upper,
            false,
            tip_offset_m,
            envelope,
            zones,
            warnings,
        ));
    }

    let overshoot = (static_depth * options.overshoot_factor).min(options.max_overshoot_m);
    let strong_below = mean_ratio(
        envelope,
        preload_mn,
        static_depth,
        static_depth + overshoot,
        false,
    )
    .is_some_and(|r| r >= options.strong_soil_ratio);

    // Next crossing past the static depth. Indexing the crossing list
    // would go wrong when the curve starts above preload: the first list
    // entry is then the downward crossing into the surface dip and the
    // second is the static depth itself.
    let second = crossings
        .iter()
        .find(|c| c.depth_m > static_depth + 1e-9)
        .copied();

    let (mode, upper, re_entry) = match second {
        Some(Crossing { depth_m: second_depth, .. }) => {
            let between = mean_ratio(envelope, preload_mn, static_depth, second_depth, true);
            let ratio = between.unwrap_or(0.0);
            if ratio > options.reentry_strength_threshold {
                warnings.push(WarningDetail::ReentryPrevented { strength_ratio: ratio }.into());
                if strong_below {
                    warnings
                        .push(WarningDetail::MinimalOvershoot { overshoot_m: overshoot }.into());
                }
                (FailureMode::ReentryPrevented, static_depth + overshoot, false)
            } else {
                warnings.push(
                    WarningDetail::DeeperPenetrationPossible {
                        second_crossing_m: second_depth,
                        strength_ratio: ratio,
                    }
                    .into(),
                );
                (FailureMode::MultiZonePenetration, second_depth, true)
            }
        }
        None if strong_below => {
            warnings.push(WarningDetail::MinimalOvershoot { overshoot_m: overshoot }.into());
            (FailureMode::StrongLayerArrest, static_depth + overshoot, false)
        }
        None => (FailureMode::SimpleArrest, static_depth, false),
    };

    Ok(finish(
        mode,
        static_depth,
        static_depth,
        upper,
        re_entry,
        tip_offset_m,
        envelope,
        zones,
        warnings,
    ))
}

/// Assemble the result: squeeze check, range-width note, tip conversion
#[allow(clippy::too_many_arguments)]
fn finish(
    failure_mode: FailureMode,
    static_depth: f64,
    lower: f64,
    upper: f64,
    re_entry_possible: bool,
    tip_offset_m: f64,
    envelope: &CapacityEnvelope,
    zones: Vec<Zone>,
    mut warnings: Vec<PredictionWarning>,
) -> PredictionResult {
    let squeezing: Vec<f64> = envelope
        .samples
        .iter()
        .filter(|s| s.squeezing && s.depth_m >= lower - 1e-9 && s.depth_m <= upper + 1e-9)
        .map(|s| s.depth_m)
        .collect();
    if let (Some(&first), Some(&last)) = (squeezing.first(), squeezing.last()) {
        warnings.push(
            WarningDetail::SqueezingInRange {
                start_m: first,
                end_m: last,
            }
            .into(),
        );
    }

    let width = upper - lower;
    let note = if width < 1.0 {
        WarningDetail::NarrowRange { width_m: width }
    } else if width < 3.0 {
        WarningDetail::ModerateRange { width_m: width }
    } else {
        WarningDetail::WideRange { width_m: width }
    };
    warnings.push(note.into());

    PredictionResult {
        failure_mode,
        static_depth_m: static_depth,
        range_lower_m: lower,
        range_upper_m: upper,
        recommended_design_depth_m: upper,
        re_entry_possible,
        static_tip_m: static_depth + tip_offset_m,
        range_lower_tip_m: lower + tip_offset_m,
        range_upper_tip_m: upper + tip_offset_m,
        zones,
        warnings,
    }
}
