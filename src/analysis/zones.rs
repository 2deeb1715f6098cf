//! Preload intersections and weak-zone extraction
//!
//! Walks the capacity envelope against the preload line: every crossing of
//! the two curves, and every contiguous span where capacity sits strictly
//! below preload. These feed the failure-mode classifier.

use crate::capacity::CapacityEnvelope;
use serde::{Deserialize, Serialize};

/// Which way capacity passes through the preload line with increasing depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossingDirection {
    /// Capacity rises through preload: a depth the spudcan can stop at
    Upward,
    /// Capacity falls through preload: the floor gives way
    Downward,
}

/// One intersection of the capacity curve with the preload line
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Crossing {
    pub depth_m: f64,
    pub direction: CrossingDirection,
}

/// Maximal contiguous span with capacity strictly below preload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    /// Interpolated depth where capacity drops below preload (0 when the
    /// curve starts weak)
    pub start_m: f64,

    /// Interpolated depth where capacity recovers to preload, or the last
    /// sample depth when it never does
    pub end_m: f64,

    pub thickness_m: f64,

    /// Smallest capacity/preload ratio inside the span
    pub min_ratio: f64,

    /// capacity/preload at the first sample at or above preload past the
    /// span; `None` when the span runs off the end of the envelope
    pub recovery_ratio: Option<f64>,
}

/// Depth where the segment between two samples meets the preload line
fn interpolate_crossing(z1: f64, c1: f64, z2: f64, c2: f64, preload: f64) -> f64 {
    if c2 == c1 {
        return z1;
    }
    z1 + (preload - c1) * (z2 - z1) / (c2 - c1)
}

/// Find every preload crossing and weak zone on the envelope.
///
/// Equality at a sample counts as *at* the line: it neither opens a zone
/// nor registers a downward crossing. Zones thinner than
/// `min_thickness_m` are discarded as numerical noise.
pub fn find_zones(
    envelope: &CapacityEnvelope,
    preload_mn: f64,
    min_thickness_m: f64,
) -> (Vec<Crossing>, Vec<Zone>) {
    let samples = &envelope.samples;
    let mut crossings = Vec::new();
    let mut zones = Vec::new();
    if samples.is_empty() || !(preload_mn > 0.0) {
        return (crossings, zones);
    }

    // (start depth, running min ratio) of the zone currently open
    let mut open: Option<(f64, f64)> = None;
    if samples[0].capacity_mn < preload_mn {
        open = Some((samples[0].depth_m, samples[0].capacity_mn / preload_mn));
    }

    for pair in samples.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);

        if a.capacity_mn < preload_mn && b.capacity_mn >= preload_mn {
            let depth =
                interpolate_crossing(a.depth_m, a.capacity_mn, b.depth_m, b.capacity_mn, preload_mn);
            crossings.push(Crossing {
                depth_m: depth,
                direction: CrossingDirection::Upward,
            });
            if let Some((start, min_ratio)) = open.take() {
                zones.push(Zone {
                    start_m: start,
                    end_m: depth,
                    thickness_m: depth - start,
                    min_ratio,
                    recovery_ratio: Some(b.capacity_mn / preload_mn),
                });
            }
        } else if a.capacity_mn >= preload_mn && b.capacity_mn < preload_mn {
            let depth =
                interpolate_crossing(a.depth_m, a.capacity_mn, b.depth_m, b.capacity_mn, preload_mn);
            crossings.push(Crossing {
                depth_m: depth,
                direction: CrossingDirection::Downward,
            });
            open = Some((depth, b.capacity_mn / preload_mn));
        } else if b.capacity_mn < preload_mn
            && let Some((_, min_ratio)) = open.as_mut()
        {
            *min_ratio = min_ratio.min(b.capacity_mn / preload_mn);
        }
    }

    // weak all the way to the analysis ceiling
    if let Some((start, min_ratio)) = open {
        let end = samples[samples.len() - 1].depth_m;
        zones.push(Zone {
            start_m: start,
            end_m: end,
            thickness_m: end - start,
            min_ratio,
            recovery_ratio: None,
        });
    }

    zones.retain(|z| z.thickness_m >= min_thickness_m);
    (crossings, zones)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capacity::{CapacityEnvelope, EnvelopeSample};
    use approx::assert_relative_eq;

    fn envelope_from(capacities_mn: &[f64], dz_m: f64) -> CapacityEnvelope {
        let samples = capacities_mn
            .iter()
            .enumerate()
            .map(|(i, &capacity_mn)| EnvelopeSample {
                depth_m: i as f64 * dz_m,
                capacity_mn,
                mechanism: None,
                squeezing: false,
                backflow: false,
            })
            .collect();
        CapacityEnvelope::from_samples(samples, dz_m)
    }

    #[test]
    fn monotone_curve_has_one_upward_crossing_and_no_zone_above_threshold() {
        let envelope = envelope_from(&[10.0, 20.0, 30.0, 40.0, 50.0], 1.0);
        let (crossings, zones) = find_zones(&envelope, 35.0, 1.0);
        assert_eq!(crossings.len(), 1);
        assert_eq!(crossings[0].direction, CrossingDirection::Upward);
        // between 30 at z=2 and 40 at z=3: crossing at z=2.5
        assert_relative_eq!(crossings[0].depth_m, 2.5);
        // leading weak span [0, 2.5] *is* a zone
        assert_eq!(zones.len(), 1);
        assert_relative_eq!(zones[0].start_m, 0.0);
        assert_relative_eq!(zones[0].end_m, 2.5);
    }

    #[test]
    fn dip_produces_downward_then_upward_crossings_and_a_zone() {
        let envelope = envelope_from(&[0.0, 60.0, 20.0, 20.0, 20.0, 80.0], 1.0);
        let (crossings, zones) = find_zones(&envelope, 50.0, 0.5);
        assert_eq!(crossings.len(), 3);
        assert_eq!(crossings[1].direction, CrossingDirection::Downward);
        assert_eq!(crossings[2].direction, CrossingDirection::Upward);
        // down through 50 between (1, 60) and (2, 20): z = 1.25
        assert_relative_eq!(crossings[1].depth_m, 1.25);
        // up through 50 between (4, 20) and (5, 80): z = 4.5
        assert_relative_eq!(crossings[2].depth_m, 4.5);

        // the second zone is the dip
        assert_eq!(zones.len(), 2);
        let dip = &zones[1];
        assert_relative_eq!(dip.start_m, 1.25);
        assert_relative_eq!(dip.end_m, 4.5);
        assert_relative_eq!(dip.min_ratio, 0.4);
        assert_relative_eq!(dip.recovery_ratio.unwrap(), 1.6);
    }

    #[test]
    fn exact_equality_at_a_sample_does_not_open_a_zone() {
        let envelope = envelope_from(&[10.0, 60.0, 50.0, 60.0, 70.0], 1.0);
        let (crossings, zones) = find_zones(&envelope, 50.0, 0.0);
        // only the initial upward crossing; touching the line is not a dip
        assert_eq!(
            crossings
                .iter()
                .filter(|c| c.direction == CrossingDirection::Downward)
                .count(),
            0
        );
        assert_eq!(zones.len(), 1);
        assert!(zones[0].end_m < 1.0);
    }

    #[test]
    fn upward_crossing_landing_on_a_sample_interpolates_to_it() {
        let envelope = envelope_from(&[10.0, 50.0, 90.0], 1.0);
        let (crossings, _) = find_zones(&envelope, 50.0, 0.0);
        assert_eq!(crossings.len(), 1);
        assert_relative_eq!(crossings[0].depth_m, 1.0);
    }

    #[test]
    fn thin_zones_are_discarded() {
        // dip lasts half a sample interval
        let envelope = envelope_from(&[10.0, 60.0, 45.0, 60.0, 70.0], 0.25);
        let (crossings, zones) = find_zones(&envelope, 50.0, 1.0);
        assert_eq!(crossings.len(), 3);
        // the dip is real but thinner than 1 m
        assert_eq!(zones.len(), 0);
    }

    #[test]
    fn open_ended_zone_reaches_the_last_sample() {
        let envelope = envelope_from(&[10.0, 60.0, 70.0, 30.0, 20.0], 1.0);
        let (_, zones) = find_zones(&envelope, 50.0, 0.5);
        let tail = zones.last().unwrap();
        assert_relative_eq!(tail.end_m, 4.0);
        assert!(tail.recovery_ratio.is_none());
    }

    #[test]
    fn curve_entirely_above_preload_yields_nothing() {
        let envelope = envelope_from(&[60.0, 70.0, 80.0], 1.0);
        let (crossings, zones) = find_zones(&envelope, 50.0, 0.0);
        assert!(crossings.is_empty());
        assert!(zones.is_empty());
    }
}
