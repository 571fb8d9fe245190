use fletch_ballistics::{launch_speed, simulate, Aim, ShotOutcome, ShotProblem};
use fletch_core::BallisticsSettings;

/// Running tally of how shots turned out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShotStats {
    misses: Vec<f64>,
    unsolved: usize,
}

impl ShotStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fly every problem's shot as `aim` would take it and tally the outcomes.
    pub fn evaluate<A: Aim>(
        aim: &A,
        problems: &[ShotProblem],
        ballistics: &BallisticsSettings,
    ) -> Self {
        let mut stats = Self::new();
        for problem in problems {
            match aim.aim(problem) {
                Some(solution) => {
                    let flight = simulate(
                        solution.launch_angle(),
                        launch_speed(solution.power),
                        &problem.target,
                        &problem.obstacles,
                        ballistics,
                    );
                    stats.record(flight.outcome);
                }
                None => stats.record_unsolved(),
            }
        }
        log::info!(
            "{} shots, {} hits, {} unsolved",
            stats.shots(),
            stats.hits(),
            stats.unsolved()
        );
        stats
    }

    pub fn record(&mut self, outcome: ShotOutcome) {
        self.record_miss(outcome.miss_distance());
    }

    /// Record a shot by how far it missed, 0 for a hit.
    pub fn record_miss(&mut self, miss: f64) {
        self.misses.push(miss);
    }

    /// Record a target no shot was found for.
    pub fn record_unsolved(&mut self) {
        self.unsolved += 1;
    }

    pub fn shots(&self) -> usize {
        self.misses.len()
    }

    pub fn hits(&self) -> usize {
        self.misses.iter().filter(|m| **m == 0.0).count()
    }

    pub fn unsolved(&self) -> usize {
        self.unsolved
    }

    pub fn hit_fraction(&self) -> Option<f64> {
        if self.misses.is_empty() {
            return None;
        }
        Some(self.hits() as f64 / self.shots() as f64)
    }

    /// Mean miss distance over all shots, hits counting as 0.
    pub fn mean_miss(&self) -> Option<f64> {
        if self.misses.is_empty() {
            return None;
        }
        Some(self.misses.iter().sum::<f64>() / self.misses.len() as f64)
    }

    pub fn median_miss(&self) -> Option<f64> {
        if self.misses.is_empty() {
            return None;
        }
        let mut sorted = self.misses.clone();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        Some(if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        })
    }
}
