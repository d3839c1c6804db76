//! Geometrie-Rekonstruktion: Hermite-Kurven, Fahrspur-Offsets, Übergangs-Blending.
//!
//! Koordinatenkonvention des Spiels: Y zeigt nach oben, die Vorwärtsrichtung
//! einer Rotation ist `rotation * -Z`, die Querachse `rotation * X`.

pub mod blend;
pub mod hermite;
pub mod lanes;

pub use blend::{blend_offset, BlendPolicy};
pub use hermite::{interpolate, sample_curve, sample_steps, tangent, OrientedPoint};
pub use lanes::{compute_lane_centers, LaneGeometry, LaneGeometryCalculator};

use glam::{EulerRot, Quat, Vec3};

/// Lokale Vorwärtsachse.
pub const FORWARD: Vec3 = Vec3::NEG_Z;
/// Lokale Querachse (Projektion der Fahrspur-Offsets).
pub const LATERAL: Vec3 = Vec3::X;

/// Gierwinkel einer Blickrichtung (0 = Blick nach -Z).
pub fn yaw_from_heading(heading: Vec3) -> f32 {
    (-heading.x).atan2(-heading.z)
}

/// Gierwinkel (Rotation um Y) einer Quaternion.
pub fn yaw_of(rotation: Quat) -> f32 {
    rotation.to_euler(EulerRot::YXZ).0
}

/// Rotation, deren Vorwärtsachse entlang `heading` zeigt (Gier + Nick, ohne Rollen).
///
/// `None` für (nahezu) Nullvektoren.
pub fn rotation_from_heading(heading: Vec3) -> Option<Quat> {
    let dir = heading.try_normalize()?;
    let yaw = yaw_from_heading(dir);
    let pitch = dir.y.clamp(-1.0, 1.0).asin();
    Some(Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0))
}

/// Lineare Interpolation zweier Skalare.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn yaw_of_forward_axis_is_zero() {
        assert_relative_eq!(yaw_from_heading(FORWARD), 0.0);
        assert_relative_eq!(yaw_from_heading(Vec3::NEG_X), FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn rotation_from_heading_points_forward_axis_along_heading() {
        let heading = Vec3::new(3.0, 1.0, -4.0);
        let rotation = rotation_from_heading(heading).expect("Rotation erwartet");
        let forward = rotation * FORWARD;
        let expected = heading.normalize();

        assert_relative_eq!(forward.x, expected.x, epsilon = 1e-5);
        assert_relative_eq!(forward.y, expected.y, epsilon = 1e-5);
        assert_relative_eq!(forward.z, expected.z, epsilon = 1e-5);
        // Querachse bleibt horizontal
        assert_relative_eq!((rotation * LATERAL).y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn rotation_from_zero_heading_is_none() {
        assert!(rotation_from_heading(Vec3::ZERO).is_none());
    }

    #[test]
    fn yaw_roundtrip_through_quaternion() {
        assert_relative_eq!(yaw_of(Quat::from_rotation_y(-1.2)), -1.2, epsilon = 1e-6);
    }
}
