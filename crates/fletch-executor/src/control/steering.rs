use fletch_core::{angle_delta, Orientation, SteeringSettings};

use crate::CommandSink;

/// Turn rate in [-1, 1] towards `target` from `current`, in degrees.
///
/// A logistic curve over the shortest signed difference: small errors give a
/// gentle, roughly proportional rate, large ones saturate towards full speed.
pub fn angular_velocity(target: f64, current: f64, scale: f64) -> f64 {
    let delta = angle_delta(target, current);
    2.0 / (1.0 + (-delta / scale).exp()) - 1.0
}

/// Emit one tick of turn and pitch rates towards `target`.
///
/// Returns `true`, after commanding both axes to stop, once the summed pitch
/// and yaw errors drop below the tolerance.
pub fn steer(
    current: Orientation,
    target: Orientation,
    settings: &SteeringSettings,
    sink: &mut impl CommandSink,
) -> bool {
    let pitch_error = angle_delta(target.pitch, current.pitch);
    let yaw_error = angle_delta(target.yaw, current.yaw);

    if pitch_error.abs() + yaw_error.abs() < settings.tolerance {
        sink.turn(0.0);
        sink.pitch(0.0);
        return true;
    }

    sink.turn(angular_velocity(target.yaw, current.yaw, settings.scale));
    sink.pitch(angular_velocity(target.pitch, current.pitch, settings.scale));
    false
}

/// Drives the agent's view towards a setpoint, one call per tick.
pub struct SteeringController {
    settings: SteeringSettings,
    setpoint: Option<Orientation>,
}

impl SteeringController {
    pub fn new(settings: SteeringSettings) -> Self {
        Self {
            settings,
            setpoint: None,
        }
    }

    pub fn set_setpoint(&mut self, setpoint: Orientation) {
        self.setpoint = Some(setpoint);
    }

    pub fn setpoint(&self) -> Option<Orientation> {
        self.setpoint
    }

    pub fn clear_setpoint(&mut self) {
        self.setpoint = None;
    }

    pub fn update_settings(&mut self, settings: SteeringSettings) {
        self.settings = settings;
    }

    /// Without a setpoint the agent is told to stop and this never reports
    /// being on target.
    pub fn steer(&self, current: Orientation, sink: &mut impl CommandSink) -> bool {
        match self.setpoint {
            Some(target) => {
                let on_target = steer(current, target, &self.settings, sink);
                if on_target {
                    log::debug!(
                        "On target at pitch {:.2}, yaw {:.2}",
                        current.pitch,
                        current.yaw
                    );
                }
                on_target
            }
            None => {
                sink.turn(0.0);
                sink.pitch(0.0);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{Command, RecordingSink};

    /// Degrees the host turns the view per tick at full rate.
    const TURN_SPEED: f64 = 9.0;

    fn apply(current: &mut Orientation, sink: &RecordingSink) {
        current.yaw += TURN_SPEED * sink.last_turn().unwrap_or(0.0);
        current.pitch += TURN_SPEED * sink.last_pitch().unwrap_or(0.0);
    }

    #[test]
    fn test_angular_velocity() {
        assert_eq!(angular_velocity(10.0, 10.0, 50.0), 0.0);
        assert!(angular_velocity(40.0, 10.0, 50.0) > 0.0);
        assert!(angular_velocity(-40.0, 10.0, 50.0) < 0.0);
        // 2 / (1 + e^-1) - 1
        assert_relative_eq!(angular_velocity(50.0, 0.0, 50.0), 0.462117, epsilon = 1e-6);
        // Rates saturate but never reach full speed
        let full = angular_velocity(180.0, 0.0, 50.0);
        assert!(full > 0.9 && full < 1.0);
    }

    #[test]
    fn test_angular_velocity_turns_the_short_way() {
        assert!(angular_velocity(170.0, -170.0, 50.0) < 0.0);
        assert!(angular_velocity(-170.0, 170.0, 50.0) > 0.0);
        assert_relative_eq!(
            angular_velocity(170.0, -170.0, 50.0),
            angular_velocity(-20.0, 0.0, 50.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_steer_emits_both_rates() {
        let mut sink = RecordingSink::new();
        let done = steer(
            Orientation::new(0.0, 0.0),
            Orientation::new(-10.0, 30.0),
            &SteeringSettings::default(),
            &mut sink,
        );

        assert!(!done);
        let commands = sink.take();
        assert_eq!(commands.len(), 2);
        assert!(matches!(commands[0], Command::Turn(rate) if rate > 0.0));
        assert!(matches!(commands[1], Command::Pitch(rate) if rate < 0.0));
    }

    #[test]
    fn test_steer_stops_within_tolerance() {
        let mut sink = RecordingSink::new();
        let done = steer(
            Orientation::new(5.02, 359.97),
            Orientation::new(5.0, -0.01),
            &SteeringSettings::default(),
            &mut sink,
        );

        assert!(done);
        assert_eq!(sink.take(), vec![Command::Turn(0.0), Command::Pitch(0.0)]);
    }

    #[test_log::test]
    fn test_converges_from_any_start() {
        let settings = SteeringSettings::default();
        for start_pitch in (-180..=180).step_by(30) {
            for start_yaw in (-180..=180).step_by(15) {
                let target = Orientation::new(0.0, 45.0);
                let mut controller = SteeringController::new(settings.clone());
                controller.set_setpoint(target);

                let mut current = Orientation::new(
                    target.pitch + start_pitch as f64,
                    target.yaw + start_yaw as f64,
                );
                let mut sink = RecordingSink::new();
                let converged = (0..200).any(|_| {
                    sink.take();
                    if controller.steer(current, &mut sink) {
                        return true;
                    }
                    apply(&mut current, &sink);
                    false
                });
                assert!(
                    converged,
                    "did not converge from pitch {} yaw {}",
                    start_pitch, start_yaw
                );
            }
        }
    }

    #[test]
    fn test_no_setpoint() {
        let mut controller = SteeringController::new(SteeringSettings::default());
        let mut sink = RecordingSink::new();
        assert!(!controller.steer(Orientation::default(), &mut sink));
        assert_eq!(sink.take(), vec![Command::Turn(0.0), Command::Pitch(0.0)]);

        controller.set_setpoint(Orientation::default());
        assert!(controller.steer(Orientation::default(), &mut sink));
        controller.clear_setpoint();
        assert_eq!(controller.setpoint(), None);
    }
}
