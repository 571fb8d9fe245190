use fletch_core::{Orientation, ShotSettings, ShotSolution, SteeringSettings};

use crate::{CommandSink, SteeringController};

/// Where a [`ShotCycle`] is at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotPhase {
    /// Turning towards the solution's pitch and yaw.
    Aiming,
    /// Holding the trigger to draw the bow.
    Charging,
    /// Waiting before aiming the next arrow.
    Cooldown,
    /// All arrows are away.
    Done,
}

#[derive(Debug, Clone)]
struct Timer {
    elapsed: f64,
    duration: f64,
}

impl Timer {
    fn new(duration: f64) -> Self {
        Self {
            elapsed: 0.0,
            duration,
        }
    }

    fn tick(&mut self, dt: f64) -> bool {
        self.elapsed += dt;
        self.elapsed >= self.duration
    }
}

/// Fires the arrows for one shot solution, driven one tick at a time.
///
/// Each arrow is aimed until the steering controller reports being on
/// target, then the trigger is held for `power` seconds and released. The
/// caller supplies the elapsed time on every tick.
pub struct ShotCycle {
    solution: ShotSolution,
    steering: SteeringController,
    settings: ShotSettings,
    phase: ShotPhase,
    timer: Timer,
    shots_fired: usize,
}

impl ShotCycle {
    pub fn new(solution: ShotSolution, steering: SteeringSettings, settings: ShotSettings) -> Self {
        let mut controller = SteeringController::new(steering);
        controller.set_setpoint(Orientation::new(solution.pitch, solution.yaw));
        let phase = if settings.shots_per_target == 0 {
            ShotPhase::Done
        } else {
            ShotPhase::Aiming
        };
        Self {
            solution,
            steering: controller,
            settings,
            phase,
            timer: Timer::new(0.0),
            shots_fired: 0,
        }
    }

    pub fn solution(&self) -> &ShotSolution {
        &self.solution
    }

    pub fn phase(&self) -> ShotPhase {
        self.phase
    }

    pub fn shots_fired(&self) -> usize {
        self.shots_fired
    }

    pub fn is_done(&self) -> bool {
        self.phase == ShotPhase::Done
    }

    /// Advance by `dt` seconds given the agent's current orientation.
    pub fn tick(
        &mut self,
        current: Orientation,
        dt: f64,
        sink: &mut impl CommandSink,
    ) -> ShotPhase {
        match self.phase {
            ShotPhase::Aiming => {
                if self.steering.steer(current, sink) {
                    sink.use_item(true);
                    self.timer = Timer::new(self.solution.power);
                    self.transition(ShotPhase::Charging);
                }
            }
            ShotPhase::Charging => {
                if self.timer.tick(dt) {
                    sink.use_item(false);
                    self.shots_fired += 1;
                    if self.shots_fired >= self.settings.shots_per_target {
                        self.transition(ShotPhase::Done);
                    } else {
                        self.timer = Timer::new(self.settings.cooldown);
                        self.transition(ShotPhase::Cooldown);
                    }
                }
            }
            ShotPhase::Cooldown => {
                if self.timer.tick(dt) {
                    self.transition(ShotPhase::Aiming);
                }
            }
            ShotPhase::Done => {}
        }
        self.phase
    }

    fn transition(&mut self, phase: ShotPhase) {
        log::debug!(
            "Shot {}/{}: {:?} -> {:?}",
            self.shots_fired + 1,
            self.settings.shots_per_target,
            self.phase,
            phase
        );
        self.phase = phase;
    }
}
