//! Kubische Hermite-Interpolation zwischen zwei orientierten Endpunkten.
//!
//! Konvention: `p(t) = h00·p0 + h10·m0 + h01·p1 + h11·m1` mit
//! `h00 = 2t³ − 3t² + 1`, `h10 = t³ − 2t² + t`, `h01 = −2t³ + 3t²`,
//! `h11 = t³ − t²`. Die Tangenten sind die Vorwärtsachsen der Endpunkte
//! (`rotation * -Z`), skaliert mit der Kurvenlänge. `t = 0` liefert den Start,
//! `t = 1` das Ende; Werte außerhalb von `[0, 1]` extrapolieren.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::{rotation_from_heading, FORWARD, LATERAL};
use crate::ppd::NavCurve;
use crate::shared::options::MAX_SAMPLES;

/// Position mit Orientierung (Endpunkt einer Kurve oder Stützpunkt einer Straße).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedPoint {
    /// Weltposition
    pub position: Vec3,
    /// Orientierung
    pub rotation: Quat,
}

impl OrientedPoint {
    /// Erstellt einen orientierten Punkt.
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Einheitsvektor in Fahrtrichtung.
    pub fn heading(&self) -> Vec3 {
        (self.rotation * FORWARD).normalize_or_zero()
    }

    /// Einheitsvektor der Querachse.
    pub fn lateral(&self) -> Vec3 {
        (self.rotation * LATERAL).normalize_or_zero()
    }

    /// Punkt um `offset` Meter quer versetzt (Vorzeichenkonvention der Lane-Offsets).
    pub fn offset_laterally(&self, offset: f32) -> Vec3 {
        self.position - self.lateral() * offset
    }
}

/// Hermite-Basis an der Stelle `t`.
fn basis(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        2.0 * t3 - 3.0 * t2 + 1.0,
        t3 - 2.0 * t2 + t,
        -2.0 * t3 + 3.0 * t2,
        t3 - t2,
    ]
}

/// Ableitung der Hermite-Basis an der Stelle `t`.
fn basis_derivative(t: f32) -> [f32; 4] {
    let t2 = t * t;
    [
        6.0 * t2 - 6.0 * t,
        3.0 * t2 - 4.0 * t + 1.0,
        -6.0 * t2 + 6.0 * t,
        3.0 * t2 - 2.0 * t,
    ]
}

/// Punkt auf dem Hermite-Segment `p0 → p1` mit Tangenten `m0`, `m1`.
pub fn hermite_point(p0: Vec3, m0: Vec3, p1: Vec3, m1: Vec3, t: f32) -> Vec3 {
    let [h00, h10, h01, h11] = basis(t);
    p0 * h00 + m0 * h10 + p1 * h01 + m1 * h11
}

/// Ableitung `dp/dt` des Hermite-Segments.
pub fn hermite_tangent(p0: Vec3, m0: Vec3, p1: Vec3, m1: Vec3, t: f32) -> Vec3 {
    let [d00, d10, d01, d11] = basis_derivative(t);
    p0 * d00 + m0 * d10 + p1 * d01 + m1 * d11
}

fn is_degenerate(length: f32) -> bool {
    !(length.is_finite() && length > 0.0)
}

/// Position zwischen zwei orientierten Endpunkten einer Kurve der Länge `length`.
///
/// Länge ≤ 0 gilt als Ein-Punkt-Kurve und liefert immer den Start.
pub fn interpolate_between(
    start: &OrientedPoint,
    end: &OrientedPoint,
    length: f32,
    t: f32,
) -> Vec3 {
    if is_degenerate(length) {
        return start.position;
    }
    hermite_point(
        start.position,
        start.heading() * length,
        end.position,
        end.heading() * length,
        t,
    )
}

/// Orientierter Punkt zwischen zwei Endpunkten; die Rotation folgt der Kurventangente.
pub fn oriented_between(
    start: &OrientedPoint,
    end: &OrientedPoint,
    length: f32,
    t: f32,
) -> OrientedPoint {
    if is_degenerate(length) {
        return *start;
    }
    let m0 = start.heading() * length;
    let m1 = end.heading() * length;
    let position = hermite_point(start.position, m0, end.position, m1, t);
    let tangent = hermite_tangent(start.position, m0, end.position, m1, t);
    let rotation = rotation_from_heading(tangent)
        .unwrap_or_else(|| start.rotation.slerp(end.rotation, t.clamp(0.0, 1.0)));
    OrientedPoint { position, rotation }
}

/// Position auf einer Prefab-Navigationskurve.
pub fn interpolate(curve: &NavCurve, t: f32) -> Vec3 {
    let start = OrientedPoint::new(curve.start_position, curve.start_rotation);
    let end = OrientedPoint::new(curve.end_position, curve.end_rotation);
    interpolate_between(&start, &end, curve.length, t)
}

/// Ableitung `dp/dt` einer Navigationskurve; `Vec3::ZERO` für Ein-Punkt-Kurven.
pub fn tangent(curve: &NavCurve, t: f32) -> Vec3 {
    if is_degenerate(curve.length) {
        return Vec3::ZERO;
    }
    let start = OrientedPoint::new(curve.start_position, curve.start_rotation);
    let end = OrientedPoint::new(curve.end_position, curve.end_rotation);
    hermite_tangent(
        start.position,
        start.heading() * curve.length,
        end.position,
        end.heading() * curve.length,
        t,
    )
}

/// Parameterwerte für das Abtasten einer Kurve.
///
/// Schrittweite `step = 1 / (length / resolution)`; die Folge läuft von
/// `-step` bis einschließlich `1 + step`, damit benachbarte Kurven
/// lückenlos aneinanderstoßen. Degenerierte Kurven liefern `[0.0]`.
/// Mehr als [`MAX_SAMPLES`] Schritte werden auf gröbere Schritte verteilt.
pub fn sample_steps(length: f32, resolution: f32) -> Vec<f32> {
    if is_degenerate(length) || !(resolution.is_finite() && resolution > 0.0) {
        return vec![0.0];
    }

    let segments = length / resolution;
    let step = if segments > MAX_SAMPLES as f32 {
        1.0 / MAX_SAMPLES as f32
    } else {
        1.0 / segments
    };
    let count = ((1.0 / step).ceil() as usize).min(MAX_SAMPLES);
    let mut steps = Vec::with_capacity(count + 3);
    steps.push(-step);
    for i in 0..count {
        steps.push((i as f32 * step).min(1.0));
    }
    steps.push(1.0);
    steps.push(1.0 + step);
    steps.dedup();
    steps
}

/// Tastet eine Navigationskurve mit `resolution` Metern Abstand ab.
pub fn sample_curve(curve: &NavCurve, resolution: f32) -> Vec<Vec3> {
    sample_steps(curve.length, resolution)
        .into_iter()
        .map(|t| interpolate(curve, t))
        .collect()
}
