pub use uom::si::f64::*;
pub use uom::si::{
    angle::{degree, radian},
    area::{square_foot, square_meter},
    force::{kilonewton, meganewton, newton},
    length::{foot, meter, millimeter},
    pressure::{kilopascal, pascal},
};
pub use uom::si::{angle, area, force, length, pressure};

// Type aliases for domain clarity (zero cost)
pub type Depth = Length;
pub type Diameter = Length;
pub type BearingArea = Area;
pub type Preload = Force;
pub type BearingCapacity = Force;
pub type ShearStrength = Pressure;
pub type ConeAngle = Angle;

// Standard units we use internally (just documentation)
/// Internal standard: meters below mudline
pub const INTERNAL_DEPTH_UNIT: &str = "meters";
/// Internal standard: meganewtons
pub const INTERNAL_CAPACITY_UNIT: &str = "meganewtons";
/// Internal standard: kilopascals (undrained shear strength)
pub const INTERNAL_STRENGTH_UNIT: &str = "kilopascals";
/// Internal standard: kN/m³ (submerged unit weight)
pub const INTERNAL_UNIT_WEIGHT_UNIT: &str = "kN/m³";

use std::fmt;

#[derive(Debug)]
pub struct DisplayDepth(pub Depth);
#[derive(Debug)]
pub struct DisplayCapacity(pub BearingCapacity);
#[derive(Debug)]
pub struct DisplayStrength(pub ShearStrength);

impl fmt::Display for DisplayDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} m", self.0.get::<meter>())
    }
}

impl fmt::Display for DisplayCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mn = self.0.get::<meganewton>();
        let kn = self.0.get::<kilonewton>();
        write!(f, "{:.2} MN ({:.0} kN)", mn, kn)
    }
}

impl fmt::Display for DisplayStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} kPa", self.0.get::<kilopascal>())
    }
}

/// Convert UOM Depth to internal coordinate (meters)
#[inline]
pub fn to_depth_m(depth: Depth) -> f64 {
    depth.get::<meter>()
}

/// Convert internal coordinate (meters) to UOM Depth
#[inline]
pub fn from_depth_m(value: f64) -> Depth {
    Depth::new::<meter>(value)
}

/// Convert UOM force to internal capacity (meganewtons)
#[inline]
pub fn to_capacity_mn(force: Force) -> f64 {
    force.get::<meganewton>()
}

/// Convert internal capacity (meganewtons) to UOM force
#[inline]
pub fn from_capacity_mn(value: f64) -> Force {
    Force::new::<meganewton>(value)
}
