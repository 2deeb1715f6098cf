use spudcan_core::analysis::{AnalysisOptions, analyze};
use spudcan_core::capacity::{EnvelopeOptions, compute_envelope};
use spudcan_core::soil::{SoilLayer, SoilProfile};
use spudcan_core::spudcan::Spudcan;
use spudcan_core::types::*;

fn main() {
    println!("=== Spudcan Penetration Analysis ===\n");

    let s = "-".repeat(50);

    println!("Case 1: Soft clay with strength gradient");
    println!("{}", s);
    case_soft_clay();

    println!("\n");

    println!("Case 2: Stiff crust over soft clay (punch-through)");
    println!("{}", s);
    case_punch_through();

    println!("\n");

    println!("Case 3: Sand over clay");
    println!("{}", s);
    case_sand_over_clay();
}

fn rig() -> Spudcan {
    Spudcan::new(
        "Demo Rig",
        Diameter::new::<meter>(12.0),
        BearingArea::new::<square_meter>(113.1),
        from_depth_m(1.8),
        from_capacity_mn(65.0),
    )
}

fn run(profile: &SoilProfile, max_depth_m: f64) {
    let spud = rig();
    let options = EnvelopeOptions::new(from_depth_m(max_depth_m));

    let envelope = match compute_envelope(&spud, profile, &options) {
        Ok(env) => env,
        Err(e) => {
            println!("Envelope failed: {}", e);
            return;
        }
    };

    if let Some((peak_mn, peak_depth)) = envelope.peak() {
        println!("Envelope: {} samples, peak {:.1} MN at {:.1} m", envelope.len(), peak_mn, peak_depth);
    }

    match analyze(
        &envelope,
        spud.preload_mn,
        spud.tip_offset_m,
        &AnalysisOptions::default(),
    ) {
        Ok(result) => {
            println!("Failure mode:       {:?}", result.failure_mode);
            println!("Static equilibrium: {:.1} m", result.static_depth_m);
            println!(
                "Predicted range:    {:.1} to {:.1} m (tip {:.1} to {:.1} m)",
                result.range_lower_m,
                result.range_upper_m,
                result.range_lower_tip_m,
                result.range_upper_tip_m
            );
            println!("Design depth:       {:.1} m", result.recommended_design_depth_m);
            for warning in &result.warnings {
                println!("  [{:?}] {:?}", warning.severity, warning.detail);
            }
        }
        Err(e) => println!("Analysis: {}", e),
    }
}

fn case_soft_clay() {
    let profile = SoilProfile::new(vec![
        SoilLayer::clay("soft clay", 0.0, 40.0)
            .with_strength(&[(0.0, 15.0), (40.0, 95.0)])
            .with_uniform_unit_weight(7.5),
    ])
    .expect("valid profile");
    run(&profile, 35.0);
}

fn case_punch_through() {
    let profile = SoilProfile::new(vec![
        SoilLayer::clay("stiff crust", 0.0, 6.0)
            .with_uniform_strength(110.0)
            .with_uniform_unit_weight(9.0),
        SoilLayer::clay("soft clay", 6.0, 25.0)
            .with_strength(&[(6.0, 25.0), (25.0, 70.0)])
            .with_uniform_unit_weight(7.0),
        SoilLayer::clay("firm clay", 25.0, 45.0)
            .with_uniform_strength(130.0)
            .with_uniform_unit_weight(8.5),
    ])
    .expect("valid profile");
    run(&profile, 40.0);
}

fn case_sand_over_clay() {
    let profile = SoilProfile::new(vec![
        SoilLayer::sand("dense sand", 0.0, 5.0)
            .with_uniform_strength(34.0)
            .with_uniform_unit_weight(10.5),
        SoilLayer::clay("marine clay", 5.0, 40.0)
            .with_strength(&[(5.0, 30.0), (40.0, 110.0)])
            .with_uniform_unit_weight(7.8),
    ])
    .expect("valid profile");
    run(&profile, 35.0);
}
