//! Margin and interpolation walkthrough.
//!
//! Usage:
//! ```text
//! cargo run --example margin_demo
//! RUST_LOG=slicefield=debug cargo run --example margin_demo
//! ```

use slicefield::math::{Point2, Vector2, Vector3};
use slicefield::{BlendMode, Contour, ContourEngine, InterpolationOptions, SlicefieldError};

fn circle(center: Point2, radius: f64, z: f64) -> Contour {
    let points = (0..96)
        .map(|k| {
            let a = std::f64::consts::TAU * f64::from(k) / 96.0;
            center + Vector2::new(radius * a.cos(), radius * a.sin())
        })
        .collect();
    Contour::new(points, z)
}

fn area(contours: &[Contour]) -> f64 {
    contours.iter().map(Contour::area).sum()
}

fn main() -> Result<(), SlicefieldError> {
    // Default: WARN for everything, INFO for slicefield.
    // Override with RUST_LOG env var (e.g. RUST_LOG=slicefield=trace).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("margin_demo=info".parse().unwrap_or_default())
        .add_directive("slicefield=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let engine = ContourEngine::default();
    let spacing = Vector2::new(0.5, 0.5);
    let base = [circle(Point2::origin(), 10.0, 0.0)];

    println!("input area: {:.2} mm²", area(&base));
    for margin in [-3.0, -1.0, 1.0, 3.0] {
        let out = engine.margin_single_slice(&base, margin, spacing)?;
        println!("margin {margin:+.1} mm: {} contour(s), {:.2} mm²", out.len(), area(&out));
    }

    let stack: Vec<Contour> = (0..5)
        .map(|k| circle(Point2::origin(), 6.0 + f64::from(k), 2.5 * f64::from(k)))
        .collect();
    let grown = engine.margin_multi_slice(&stack, Vector3::new(2.0, 2.0, 2.5), spacing, 2.5)?;
    for c in &grown {
        println!("3D margin slice z = {:+.2}: {:.2} mm²", c.z, c.area());
    }

    let a = [circle(Point2::origin(), 6.0, 0.0)];
    let b = [circle(Point2::new(4.0, 0.0), 10.0, 10.0)];
    for blend in [BlendMode::Linear, BlendMode::SmoothMin, BlendMode::PivotPiecewise] {
        let options = InterpolationOptions {
            blend,
            ..InterpolationOptions::default()
        };
        for z in [2.5, 5.0, 7.5] {
            let out = engine.interpolate_slice(&a, 0.0, &b, 10.0, z, options)?;
            println!("{blend:?} z = {z}: {:.2} mm²", area(&out));
        }
    }
    Ok(())
}
