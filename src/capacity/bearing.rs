//! SNAME vertical bearing capacities for a penetrating spudcan
//!
//! # Internal units
//!
//! All capacities in this module are computed in **kilonewtons**; the
//! envelope layer converts to MN at its boundary. Depths are meters below
//! mudline, strengths kPa, unit weights kN/m³.
//!
//! Each mechanism returns `Ok(None)` when it does not apply at the query
//! depth (wrong soil type, no weaker layer beneath, trigger not met) and
//! propagates a profile error when the depth itself is uncovered.

use crate::capacity::nc_chart::interpolate_nc_prime;
use crate::soil::{ProfileError, SoilProfile, SoilType};
use crate::spudcan::Spudcan;

/// Flat-plate clay bearing factor
const NC_FLAT: f64 = 5.14;

/// Shape factor for a circular footing in clay
const SC_CIRCULAR: f64 = 1.2;

/// Guard against division by a degenerate diameter
const MIN_DIAMETER_M: f64 = 1e-6;

/// Meyerhof stability number N against normalized depth D/B, used for the
/// backflow criterion. Row order is ascending D/B.
pub const DEFAULT_MEYERHOF_TABLE: [(f64, f64); 7] = [
    (0.0, 0.0),
    (0.25, 2.0),
    (0.5, 3.0),
    (0.75, 3.6),
    (1.0, 4.0),
    (1.5, 4.7),
    (2.0, 5.1),
];

/// Stability number N(D/B), linearly interpolated and clamped at the table
/// ends.
pub fn meyerhof_n(d_over_b: f64, table: &[(f64, f64)]) -> f64 {
    if table.is_empty() {
        return 0.0;
    }
    if d_over_b <= table[0].0 {
        return table[0].1;
    }
    for pair in table.windows(2) {
        let ((x1, y1), (x2, y2)) = (pair[0], pair[1]);
        if d_over_b <= x2 {
            if x2 == x1 {
                return y1;
            }
            return y1 + (d_over_b - x1) * (y2 - y1) / (x2 - x1);
        }
    }
    table[table.len() - 1].1
}

/// Cavity wall collapse check: soil flows back over the spudcan once the
/// hole is deeper than N·cu/γ'. Backflowing clay restores no overburden
/// on the bearing surface, so p0 is zeroed in the clay formula.
pub fn backflow_occurs(
    spudcan: &Spudcan,
    z_m: f64,
    profile: &SoilProfile,
    table: &[(f64, f64)],
) -> Result<bool, ProfileError> {
    let b = spudcan.diameter_m.max(MIN_DIAMETER_M);
    let layer = profile.layer_at(z_m)?;
    if layer.soil_type != SoilType::Clay {
        return Ok(false);
    }
    let cu_avg = layer.strength_avg(z_m, z_m + b / 2.0);
    let gamma_avg = layer.unit_weight_avg(z_m, z_m + b / 2.0);
    if !(cu_avg > 0.0) || !(gamma_avg > 0.0) {
        return Ok(false);
    }
    let n = meyerhof_n(z_m / b, table);
    Ok(z_m > n * cu_avg / gamma_avg)
}

/// Depth factor for the flat-plate clay formula, switching to the arctan
/// form below one diameter of embedment
fn clay_depth_factor(z_over_b: f64) -> f64 {
    if z_over_b <= 1.0 {
        1.0 + 0.4 * z_over_b
    } else {
        1.0 + 0.4 * z_over_b.atan()
    }
}

/// Normalized strength gradient rho·2R/cum feeding the Nc' chart lookup:
/// gradient over the half-diameter window below z, scaled by diameter and
/// the mudline strength.
fn strength_gradient_ratio(z_m: f64, b_m: f64, profile: &SoilProfile) -> f64 {
    let cu_mudline = match profile.su_clamped(0.0) {
        Some(v) if v > 0.0 => v,
        _ => return 0.0,
    };
    let z2 = z_m + b_m / 2.0;
    let (su1, su2) = match (profile.su_clamped(z_m), profile.su_clamped(z2)) {
        (Some(a), Some(b)) => (a, b),
        _ => return 0.0,
    };
    let rho = (su2 - su1) / (z2 - z_m).max(1e-6);
    rho * b_m / cu_mudline
}

/// Clay bearing capacity (kN).
///
/// `use_min_cu` takes the lesser of the point strength and the running
/// average over the half-diameter below the bearing level; averaging alone
/// can mask a locally soft seam. `backflow_zero` drops the overburden term.
pub fn clay_capacity(
    spudcan: &Spudcan,
    z_m: f64,
    profile: &SoilProfile,
    use_min_cu: bool,
    backflow_zero: bool,
) -> Result<Option<f64>, ProfileError> {
    let (b, a) = (spudcan.diameter_m, spudcan.bearing_area_m2);
    if b <= 0.0 || a <= 0.0 {
        return Ok(None);
    }
    if z_m < spudcan.tip_offset_m {
        return Ok(Some(0.0));
    }
    let layer = profile.layer_at(z_m)?;
    if layer.soil_type != SoilType::Clay {
        return Ok(None);
    }

    let cu_point = layer.strength_at(z_m);
    let cu_avg = layer.strength_avg(z_m, z_m + b / 2.0);
    let cu_eff = if use_min_cu {
        cu_point.min(cu_avg)
    } else {
        cu_avg
    };
    if !(cu_eff > 0.0) {
        return Ok(None);
    }

    let (nc, sc, dc) = match (spudcan.beta_deg, spudcan.alpha) {
        (Some(beta), Some(alpha)) => {
            let d_over_2r = (z_m / (b / 2.0).max(MIN_DIAMETER_M)).min(2.5);
            let rho = strength_gradient_ratio(z_m, b, profile);
            (
                interpolate_nc_prime(beta, alpha, d_over_2r, rho),
                SC_CIRCULAR,
                1.0,
            )
        }
        _ => (NC_FLAT, SC_CIRCULAR, clay_depth_factor(z_m / b)),
    };

    let p0 = if backflow_zero {
        0.0
    } else {
        profile.overburden_kpa(z_m)?
    };
    Ok(Some((cu_eff * nc * sc * dc + p0) * a))
}

/// Drained bearing factor Nq
fn nq(phi_rad: f64) -> f64 {
    (std::f64::consts::PI * phi_rad.tan()).exp()
        * (std::f64::consts::FRAC_PI_4 + phi_rad / 2.0).tan().powi(2)
}

/// Drained bearing factor Nγ (Vesić)
fn ngamma(phi_rad: f64) -> f64 {
    2.0 * (nq(phi_rad) + 1.0) * phi_rad.tan()
}

/// Sand bearing capacity (kN).
///
/// `apply_phi_reduction` derates the friction angle by 5° before the
/// bearing factors, the conventional allowance for penetration disturbance.
pub fn sand_capacity(
    spudcan: &Spudcan,
    z_m: f64,
    profile: &SoilProfile,
    apply_phi_reduction: bool,
) -> Result<Option<f64>, ProfileError> {
    let (b, a) = (spudcan.diameter_m, spudcan.bearing_area_m2);
    if b <= 0.0 || a <= 0.0 {
        return Ok(None);
    }
    if z_m < spudcan.tip_offset_m {
        return Ok(Some(0.0));
    }
    let layer = profile.layer_at(z_m)?;
    if layer.soil_type != SoilType::Sand {
        return Ok(None);
    }

    let mut phi_deg = layer.strength_at(z_m);
    if !(phi_deg > 0.0) {
        return Ok(None);
    }
    if apply_phi_reduction {
        phi_deg = (phi_deg - 5.0).max(0.0);
    }
    let phi = phi_deg.to_radians();

    let gamma_p = layer.unit_weight_at(z_m);
    let p0 = profile.overburden_kpa(z_m)?;
    let sq = 1.0 + phi.tan();
    let sg = 0.6;
    let dq = 1.0 + 2.0 * phi.tan() * (1.0 - phi.sin()).powi(2) * (z_m / b.max(MIN_DIAMETER_M));
    let fv = (0.5 * gamma_p * b * ngamma(phi) * sg + p0 * nq(phi) * sq * dq) * a;
    Ok(Some(fv.max(0.0)))
}

/// Squeezing capacity (kN): a thin clay layer over much stronger clay is
/// extruded sideways before the bearing failure can mobilize.
///
/// Applies only when the underlying clay is at least 1.5× stronger. With
/// `enforce_trigger`, the SNAME geometric criterion
/// B ≥ 3.45·T·(1 + 1.025·z/B) must also hold.
pub fn squeeze_capacity(
    spudcan: &Spudcan,
    z_m: f64,
    profile: &SoilProfile,
    enforce_trigger: bool,
    backflow_zero: bool,
) -> Result<Option<f64>, ProfileError> {
    if z_m < spudcan.tip_offset_m {
        return Ok(Some(0.0));
    }
    let (b, a) = (spudcan.diameter_m, spudcan.bearing_area_m2);
    let top = profile.layer_at(z_m)?;
    let below = match profile.layer_below(z_m)? {
        Some(layer) => layer,
        None => return Ok(None),
    };
    if top.soil_type != SoilType::Clay || below.soil_type != SoilType::Clay {
        return Ok(None);
    }

    let cu_t = top.strength_avg(z_m, z_m + b / 2.0);
    let cu_b = below.strength_avg(top.bottom_m, top.bottom_m + b / 2.0);
    if cu_b <= 1.5 * cu_t {
        return Ok(None);
    }
    let t = top.bottom_m - z_m;
    if t <= 0.0 {
        return Ok(None);
    }
    let z_over_b = z_m / b.max(MIN_DIAMETER_M);
    if enforce_trigger && b < 3.45 * t * (1.0 + 1.025 * z_over_b) {
        return Ok(None);
    }

    let p0 = if backflow_zero {
        0.0
    } else {
        profile.overburden_kpa(z_m)?
    };
    let fv = a * ((5.0 + 0.33 * (b / t) + 1.2 * z_over_b) * cu_t + p0);
    Ok(Some(fv))
}

/// Punch-through capacity (kN) for the two layered cases the SNAME
/// guidance covers.
///
/// Clay over weaker clay: the upper plug shears down into the soft layer;
/// capped by the intact clay capacity at z so the punch estimate never
/// exceeds the single-layer one. Sand over clay: load spread through the
/// sand crust onto the clay, less the displaced crust weight.
pub fn punchthrough_capacity(
    spudcan: &Spudcan,
    z_m: f64,
    profile: &SoilProfile,
    backflow_zero: bool,
) -> Result<Option<f64>, ProfileError> {
    if z_m < spudcan.tip_offset_m {
        return Ok(Some(0.0));
    }
    let (b, a) = (spudcan.diameter_m, spudcan.bearing_area_m2);
    let b_safe = b.max(MIN_DIAMETER_M);
    let top = profile.layer_at(z_m)?;
    let below = match profile.layer_below(z_m)? {
        Some(layer) => layer,
        None => return Ok(None),
    };
    let h = top.bottom_m - z_m;
    if h <= 0.0 {
        return Ok(None);
    }

    match (top.soil_type, below.soil_type) {
        (SoilType::Clay, SoilType::Clay) => {
            let cu_t = top.strength_avg(z_m, z_m + b / 2.0);
            let cu_b = below.strength_avg(top.bottom_m, top.bottom_m + b / 2.0);
            if cu_t <= cu_b {
                return Ok(None);
            }
            let p0b = if backflow_zero {
                0.0
            } else {
                profile.overburden_kpa(z_m + h)?
            };
            let mut fv = a
                * (3.0 * (h / b_safe) * cu_t
                    + NC_FLAT * SC_CIRCULAR * (1.0 + 0.2 * ((z_m + h) / b_safe)) * cu_b
                    + p0b);
            if let Some(upper) = clay_capacity(spudcan, z_m, profile, true, backflow_zero)? {
                fv = fv.min(upper);
            }
            Ok(Some(fv))
        }
        (SoilType::Sand, SoilType::Clay) => {
            let fv_b = match clay_capacity(spudcan, z_m + h, profile, true, false)? {
                Some(v) => v,
                None => return Ok(None),
            };
            let gamma_s = top.unit_weight_at(top.bottom_m);
            let p0_s = profile.overburden_kpa(z_m)?;
            let cu_c = below.strength_avg(top.bottom_m, top.bottom_m + b / 2.0);
            if !(gamma_s > 0.0) {
                return Ok(None);
            }
            // Punching shear coefficient Ks·tanφ from the clay/crust
            // strength contrast
            let ks_tan_phi = (3.0 * cu_c) / (b_safe * gamma_s.max(1e-6));
            let fv = fv_b - a * h * gamma_s
                + 2.0 * (h / b_safe) * (h * gamma_s + 2.0 * p0_s) * ks_tan_phi * a;
            Ok(Some(fv))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soil::SoilLayer;
    use crate::types::*;
    use approx::assert_relative_eq;

    fn spudcan() -> Spudcan {
        Spudcan::new(
            "Test Rig",
            Diameter::new::<meter>(10.0),
            BearingArea::new::<square_meter>(78.54),
            from_depth_m(0.0),
            from_capacity_mn(50.0),
        )
    }

    fn uniform_clay(su_kpa: f64) -> SoilProfile {
        SoilProfile::new(vec![
            SoilLayer::clay("clay", 0.0, 40.0)
                .with_uniform_strength(su_kpa)
                .with_uniform_unit_weight(8.0),
        ])
        .unwrap()
    }

    #[test]
    fn meyerhof_table_interpolates_and_clamps() {
        assert_relative_eq!(meyerhof_n(0.0, &DEFAULT_MEYERHOF_TABLE), 0.0);
        assert_relative_eq!(meyerhof_n(0.375, &DEFAULT_MEYERHOF_TABLE), 2.5);
        assert_relative_eq!(meyerhof_n(5.0, &DEFAULT_MEYERHOF_TABLE), 5.1);
    }

    #[test]
    fn clay_capacity_at_mudline_is_surface_formula() {
        // z = 0: dc = 1, p0 = 0, Fv = cu·5.14·1.2·A
        let profile = uniform_clay(50.0);
        let fv = clay_capacity(&spudcan(), 0.0, &profile, true, false)
            .unwrap()
            .unwrap();
        assert_relative_eq!(fv, 50.0 * 5.14 * 1.2 * 78.54, epsilon = 1e-6);
    }

    #[test]
    fn cone_geometry_switches_clay_to_the_chart_factor() {
        // uniform strength: rho = 0, and at z = 0 also D/2R = 0, so the
        // chart lookup reduces to the first cell of the 90° table (5.02)
        let spud = spudcan().with_cone_geometry(ConeAngle::new::<degree>(90.0), 0.0);
        let profile = uniform_clay(50.0);
        let fv = clay_capacity(&spud, 0.0, &profile, true, false)
            .unwrap()
            .unwrap();
        assert_relative_eq!(fv, 50.0 * 5.02 * 1.2 * 78.54, epsilon = 1e-6);
    }

    #[test]
    fn clay_depth_factor_switches_form_below_one_diameter() {
        assert_relative_eq!(clay_depth_factor(0.5), 1.2);
        assert_relative_eq!(clay_depth_factor(2.0), 1.0 + 0.4 * 2.0_f64.atan());
    }

    #[test]
    fn backflow_zeroes_overburden() {
        let profile = uniform_clay(50.0);
        let with_p0 = clay_capacity(&spudcan(), 10.0, &profile, true, false)
            .unwrap()
            .unwrap();
        let without_p0 = clay_capacity(&spudcan(), 10.0, &profile, true, true)
            .unwrap()
            .unwrap();
        let p0 = profile.overburden_kpa(10.0).unwrap();
        assert_relative_eq!(with_p0 - without_p0, p0 * 78.54, epsilon = 1e-6);
    }

    #[test]
    fn min_cu_picks_the_weaker_of_point_and_average() {
        // strength increasing with depth: the point value governs
        let profile = SoilProfile::new(vec![
            SoilLayer::clay("clay", 0.0, 40.0)
                .with_strength(&[(0.0, 20.0), (40.0, 100.0)])
                .with_uniform_unit_weight(8.0),
        ])
        .unwrap();
        let min_cu = clay_capacity(&spudcan(), 0.0, &profile, true, true)
            .unwrap()
            .unwrap();
        let avg_cu = clay_capacity(&spudcan(), 0.0, &profile, false, true)
            .unwrap()
            .unwrap();
        assert!(min_cu < avg_cu);
        assert_relative_eq!(min_cu, 20.0 * 5.14 * 1.2 * 78.54, epsilon = 1e-6);
    }

    #[test]
    fn capacity_is_zero_above_the_spudcan_tip() {
        let mut spud = spudcan();
        spud.tip_offset_m = 2.0;
        let profile = uniform_clay(50.0);
        let fv = clay_capacity(&spud, 1.0, &profile, true, false)
            .unwrap()
            .unwrap();
        assert_relative_eq!(fv, 0.0);
    }

    #[test]
    fn sand_bearing_factors_match_reference_values() {
        // phi = 30°: Nq ≈ 18.40, Nγ ≈ 22.40
        let phi = 30.0_f64.to_radians();
        assert_relative_eq!(nq(phi), 18.401, epsilon = 1e-2);
        assert_relative_eq!(ngamma(phi), 22.402, epsilon = 1e-2);
    }

    #[test]
    fn sand_capacity_surface_term_only_at_mudline() {
        let profile = SoilProfile::new(vec![
            SoilLayer::sand("sand", 0.0, 40.0)
                .with_uniform_strength(30.0)
                .with_uniform_unit_weight(10.0),
        ])
        .unwrap();
        let fv = sand_capacity(&spudcan(), 0.0, &profile, false)
            .unwrap()
            .unwrap();
        // p0 = 0 at z = 0, so only the 0.5·γ'·B·Nγ·sγ term remains
        let phi = 30.0_f64.to_radians();
        let expected = 0.5 * 10.0 * 10.0 * ngamma(phi) * 0.6 * 78.54;
        assert_relative_eq!(fv, expected, epsilon = 1e-6);
    }

    #[test]
    fn phi_reduction_lowers_sand_capacity() {
        let profile = SoilProfile::new(vec![
            SoilLayer::sand("sand", 0.0, 40.0)
                .with_uniform_strength(30.0)
                .with_uniform_unit_weight(10.0),
        ])
        .unwrap();
        let full = sand_capacity(&spudcan(), 5.0, &profile, false)
            .unwrap()
            .unwrap();
        let derated = sand_capacity(&spudcan(), 5.0, &profile, true)
            .unwrap()
            .unwrap();
        assert!(derated < full);
    }

    fn soft_over_strong() -> SoilProfile {
        SoilProfile::new(vec![
            SoilLayer::clay("soft", 0.0, 2.0)
                .with_uniform_strength(20.0)
                .with_uniform_unit_weight(7.0),
            SoilLayer::clay("strong", 2.0, 40.0)
                .with_uniform_strength(100.0)
                .with_uniform_unit_weight(9.0),
        ])
        .unwrap()
    }

    #[test]
    fn squeezing_requires_a_much_stronger_layer() {
        let profile = soft_over_strong();
        let fv = squeeze_capacity(&spudcan(), 0.0, &profile, true, false).unwrap();
        assert!(fv.is_some());

        // contrast below the 1.5x threshold: mechanism not applicable
        let mild = SoilProfile::new(vec![
            SoilLayer::clay("soft", 0.0, 2.0)
                .with_uniform_strength(20.0)
                .with_uniform_unit_weight(7.0),
            SoilLayer::clay("stronger", 2.0, 40.0)
                .with_uniform_strength(25.0)
                .with_uniform_unit_weight(9.0),
        ])
        .unwrap();
        assert!(
            squeeze_capacity(&spudcan(), 0.0, &mild, true, false)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn squeeze_trigger_gates_a_thick_upper_layer() {
        // T = 5 m under a 10 m spudcan: B < 3.45·T so the trigger fails
        let thick = SoilProfile::new(vec![
            SoilLayer::clay("soft", 0.0, 5.0)
                .with_uniform_strength(20.0)
                .with_uniform_unit_weight(7.0),
            SoilLayer::clay("strong", 5.0, 40.0)
                .with_uniform_strength(100.0)
                .with_uniform_unit_weight(9.0),
        ])
        .unwrap();
        assert!(
            squeeze_capacity(&spudcan(), 0.0, &thick, true, false)
                .unwrap()
                .is_none()
        );
        assert!(
            squeeze_capacity(&spudcan(), 0.0, &thick, false, false)
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn squeeze_capacity_matches_hand_calculation() {
        // z = 0, T = 2, B = 10: Fv = A·(5 + 0.33·5)·cu_t
        let profile = soft_over_strong();
        let fv = squeeze_capacity(&spudcan(), 0.0, &profile, true, false)
            .unwrap()
            .unwrap();
        assert_relative_eq!(fv, 78.54 * (5.0 + 0.33 * 5.0) * 20.0, epsilon = 1e-6);
    }

    fn strong_over_soft() -> SoilProfile {
        SoilProfile::new(vec![
            SoilLayer::clay("crust", 0.0, 3.0)
                .with_uniform_strength(120.0)
                .with_uniform_unit_weight(9.0),
            SoilLayer::clay("soft", 3.0, 40.0)
                .with_uniform_strength(30.0)
                .with_uniform_unit_weight(7.0),
        ])
        .unwrap()
    }

    #[test]
    fn punch_through_applies_only_strong_over_weak() {
        let profile = strong_over_soft();
        assert!(
            punchthrough_capacity(&spudcan(), 0.0, &profile, false)
                .unwrap()
                .is_some()
        );
        let reversed = soft_over_strong();
        assert!(
            punchthrough_capacity(&spudcan(), 0.0, &reversed, false)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn punch_through_never_exceeds_intact_clay_capacity() {
        let profile = strong_over_soft();
        let punch = punchthrough_capacity(&spudcan(), 0.0, &profile, false)
            .unwrap()
            .unwrap();
        let intact = clay_capacity(&spudcan(), 0.0, &profile, true, false)
            .unwrap()
            .unwrap();
        assert!(punch <= intact);
    }

    #[test]
    fn sand_over_clay_punch_uses_the_underlying_clay() {
        let profile = SoilProfile::new(vec![
            SoilLayer::sand("crust", 0.0, 3.0)
                .with_uniform_strength(35.0)
                .with_uniform_unit_weight(10.0),
            SoilLayer::clay("soft", 3.0, 40.0)
                .with_uniform_strength(30.0)
                .with_uniform_unit_weight(7.0),
        ])
        .unwrap();
        let punch = punchthrough_capacity(&spudcan(), 0.0, &profile, false)
            .unwrap()
            .unwrap();
        assert!(punch > 0.0);
        // well below the intact sand capacity of the crust
        let sand = sand_capacity(&spudcan(), 0.0, &profile, false)
            .unwrap()
            .unwrap();
        assert!(punch < sand);
    }

    #[test]
    fn deepest_layer_has_no_punch_mechanism() {
        let profile = uniform_clay(50.0);
        assert!(
            punchthrough_capacity(&spudcan(), 10.0, &profile, false)
                .unwrap()
                .is_none()
        );
    }
}
