use fletch_core::{BallisticsSettings, ShotSolution};

use crate::launch_speed;

/// Height of the arrow `distance` blocks away from the shooter, ignoring drag.
///
/// A quick closed-form check of how close a shot lands to where it was meant
/// to. Returns `None` when the arrow never gets that far, i.e. it is fired
/// straight up or down or not at all.
pub fn estimate_height_at(
    distance: f64,
    solution: &ShotSolution,
    settings: &BallisticsSettings,
) -> Option<f64> {
    let angle = solution.launch_angle().to_radians();
    let speed = launch_speed(solution.power);
    let horizontal = speed * angle.cos();
    if horizontal <= settings.min_horizontal_speed {
        return None;
    }

    let t = distance / horizontal;
    Some(settings.eye_height + speed * angle.sin() * t - settings.gravity / 2.0 * t * t)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_level_shot() {
        let settings = BallisticsSettings::default();
        let solution = ShotSolution::new(1.0, 0.0, 0.0);
        // 3 blocks per tick, so 2 ticks to cover 6 blocks
        let height = estimate_height_at(6.0, &solution, &settings).unwrap();
        assert_relative_eq!(height, 1.62 - 0.025 * 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_upward_shot_rises_first() {
        let settings = BallisticsSettings::default();
        let solution = ShotSolution::new(1.0, -30.0, 0.0);
        let near = estimate_height_at(3.0, &solution, &settings).unwrap();
        assert!(near > settings.eye_height);
    }

    #[test]
    fn test_vertical_shot_has_no_estimate() {
        let settings = BallisticsSettings::default();
        assert!(estimate_height_at(5.0, &ShotSolution::new(1.0, 90.0, 0.0), &settings).is_none());
        assert!(estimate_height_at(5.0, &ShotSolution::new(0.0, 0.0, 0.0), &settings).is_none());
    }
}
