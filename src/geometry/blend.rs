//! Übergangs-Blending der Fahrspur-Offsets zwischen verbundenen Straßen.
//!
//! Benachbarte Straßen haben unabhängige Templates; ohne Blending springt der
//! Spurversatz an der Nahtstelle. Der Offset wird daher entlang der Straße
//! vom Offset der vorherigen Straße zum eigenen Offset übergeblendet.

use serde::{Deserialize, Serialize};

use super::lerp;

/// Verlauf des Übergangs über die normierte Position auf der Straße.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendPolicy {
    /// Linear über die gesamte Straße
    #[default]
    Linear,
    /// Smoothstep (weicher Ein- und Auslauf) über die gesamte Straße
    SmoothStep,
    /// Kein Blending, immer der eigene Offset
    Off,
}

impl BlendPolicy {
    /// Gewicht des eigenen Offsets an der normierten Position `t ∈ [0, 1]`.
    pub fn weight(self, t: f32) -> f32 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 1.0 };
        match self {
            Self::Linear => t,
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::Off => 1.0,
        }
    }
}

/// Offset der Spur `lane_index` am Stützpunkt `sample_index` von `sample_count`.
///
/// - keine vorherige Straße bzw. deren Seite leer: eigener Offset
/// - vorherige Straße mit weniger Spuren: fehlende Spuren zählen als `0.0`
pub fn blend_offset(
    policy: BlendPolicy,
    previous: Option<&[f32]>,
    own: f32,
    lane_index: usize,
    sample_index: usize,
    sample_count: usize,
) -> f32 {
    let from = match previous {
        Some(prev) if !prev.is_empty() => prev.get(lane_index).copied().unwrap_or(0.0),
        _ => own,
    };

    let t = if sample_count > 1 {
        sample_index as f32 / (sample_count - 1) as f32
    } else {
        1.0
    };
    lerp(from, own, policy.weight(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linear_blend_runs_from_previous_to_own() {
        let prev = [1.0, 5.0];
        let first = blend_offset(BlendPolicy::Linear, Some(&prev[..]), 3.0, 0, 0, 5);
        let middle = blend_offset(BlendPolicy::Linear, Some(&prev[..]), 3.0, 0, 2, 5);
        let last = blend_offset(BlendPolicy::Linear, Some(&prev[..]), 3.0, 0, 4, 5);

        assert_relative_eq!(first, 1.0);
        assert_relative_eq!(middle, 2.0);
        assert_relative_eq!(last, 3.0);
    }

    #[test]
    fn missing_previous_lane_is_zero_padded() {
        let prev = [1.0];
        let first = blend_offset(BlendPolicy::Linear, Some(&prev[..]), 6.75, 1, 0, 3);
        assert_relative_eq!(first, 0.0);
    }

    #[test]
    fn no_previous_road_keeps_own_offset() {
        assert_relative_eq!(blend_offset(BlendPolicy::Linear, None, 2.25, 0, 0, 4), 2.25);
        assert_relative_eq!(blend_offset(BlendPolicy::Linear, Some(&[][..]), 2.25, 0, 0, 4), 2.25);
    }

    #[test]
    fn off_policy_ignores_previous() {
        let prev = [10.0];
        assert_relative_eq!(blend_offset(BlendPolicy::Off, Some(&prev[..]), 2.25, 0, 0, 4), 2.25);
    }

    #[test]
    fn smoothstep_matches_linear_at_ends_and_middle() {
        for t in [0.0, 0.5, 1.0] {
            assert_relative_eq!(BlendPolicy::SmoothStep.weight(t), BlendPolicy::Linear.weight(t));
        }
        assert!(BlendPolicy::SmoothStep.weight(0.1) < BlendPolicy::Linear.weight(0.1));
    }

    #[test]
    fn single_sample_uses_own_offset() {
        let prev = [9.0];
        assert_relative_eq!(blend_offset(BlendPolicy::Linear, Some(&prev[..]), 1.0, 0, 0, 1), 1.0);
    }
}
