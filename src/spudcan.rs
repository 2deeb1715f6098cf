//! Spudcan geometry and preload
//!
//! Public APIs accept UOM types and convert at boundaries; fields are stored
//! as raw f64 in the internal standard units (meters, m², MN).

use crate::types::*;
use serde::{Deserialize, Serialize};

/// Jack-up leg foundation geometry and installation preload.
///
/// Immutable for the duration of one analysis run; the engine only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spudcan {
    /// Rig identifier for reports
    pub rig_name: String,

    /// Diameter of the widest section B (m)
    pub diameter_m: f64,

    /// Effective bearing area A (m²)
    pub bearing_area_m2: f64,

    /// Vertical distance from the widest section to the tip (m).
    /// Depths shallower than this carry no bearing resistance.
    pub tip_offset_m: f64,

    /// Preload per leg (MN)
    pub preload_mn: f64,

    /// Equivalent cone angle beta (degrees). Together with `alpha` this
    /// switches clay capacity from the flat-plate Nc to the SNAME Nc' charts.
    pub beta_deg: Option<f64>,

    /// Cone roughness alpha, 0 (smooth) to 1 (rough)
    pub alpha: Option<f64>,
}

impl Spudcan {
    pub fn new(
        rig_name: impl Into<String>,
        diameter: Diameter,
        bearing_area: BearingArea,
        tip_offset: Depth,
        preload: Preload,
    ) -> Self {
        Self {
            rig_name: rig_name.into(),
            diameter_m: diameter.get::<meter>(),
            bearing_area_m2: bearing_area.get::<square_meter>(),
            tip_offset_m: to_depth_m(tip_offset),
            preload_mn: to_capacity_mn(preload),
            beta_deg: None,
            alpha: None,
        }
    }

    /// Enable the SNAME Nc' chart path for conical spudcans
    pub fn with_cone_geometry(mut self, beta: ConeAngle, alpha: f64) -> Self {
        self.beta_deg = Some(beta.get::<degree>());
        self.alpha = Some(alpha.clamp(0.0, 1.0));
        self
    }

    /// Preload as a UOM force
    pub fn preload(&self) -> Preload {
        from_capacity_mn(self.preload_mn)
    }

    /// Diameter as a UOM length
    pub fn diameter(&self) -> Diameter {
        Diameter::new::<meter>(self.diameter_m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn converts_at_the_boundary() {
        let spud = Spudcan::new(
            "Test Rig",
            Diameter::new::<meter>(14.0),
            BearingArea::new::<square_meter>(150.0),
            Depth::new::<meter>(2.5),
            Preload::new::<meganewton>(85.0),
        );
        assert_relative_eq!(spud.diameter_m, 14.0);
        assert_relative_eq!(spud.bearing_area_m2, 150.0);
        assert_relative_eq!(spud.tip_offset_m, 2.5);
        assert_relative_eq!(spud.preload_mn, 85.0);
        assert!(spud.beta_deg.is_none());
    }

    #[test]
    fn cone_geometry_clamps_alpha() {
        let spud = Spudcan::new(
            "Test Rig",
            Diameter::new::<meter>(14.0),
            BearingArea::new::<square_meter>(150.0),
            Depth::new::<meter>(2.5),
            Preload::new::<meganewton>(85.0),
        )
        .with_cone_geometry(ConeAngle::new::<degree>(150.0), 1.4);
        assert_relative_eq!(spud.beta_deg.unwrap(), 150.0);
        assert_relative_eq!(spud.alpha.unwrap(), 1.0);
    }
}
