use web_time::Duration;

use crate::config::AutoRotationConfig;
use crate::timeline::Epoch;

/// Fixed-cadence driver for the idle spin shown in overview mode.
///
/// The host feeds frame times through [`tick`](Self::tick); the ticker turns
/// them into whole ticks at the configured rate and adds one angle step per
/// tick unless paused. Stopping bumps the epoch, so a frame that was already
/// in flight with the old epoch cannot advance the angle.
#[derive(Debug)]
pub struct AutoRotationTicker {
    interval: Duration,
    step: f32,
    max_catch_up: u32,

    running: bool,
    epoch: Epoch,
    accumulated: Duration,
}

impl AutoRotationTicker {
    pub fn new(config: &AutoRotationConfig) -> Self {
        Self {
            interval: Duration::from_secs(1) / config.rate_hz.max(1),
            step: config.step_degrees.to_radians(),
            max_catch_up: config.max_catch_up_ticks.max(1),

            running: false,
            epoch: Epoch::default(),
            accumulated: Duration::ZERO,
        }
    }

    pub fn start(&mut self) -> Epoch {
        if !self.running {
            log::debug!("Auto-rotation started");
            self.running = true;
            self.accumulated = Duration::ZERO;
            self.epoch.bump();
        }

        self.epoch
    }

    pub fn stop(&mut self) {
        if self.running {
            log::debug!("Auto-rotation stopped");
            self.running = false;
            self.accumulated = Duration::ZERO;
            self.epoch.bump();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Advance the clock by `dt`; returns how many ticks moved `angle`.
    pub fn tick(&mut self, dt: Duration, angle: &mut f32, paused: bool) -> u32 {
        let epoch = self.epoch;
        self.tick_for(epoch, dt, angle, paused)
    }

    /// Like [`tick`](Self::tick), but only if `epoch` is still current.
    pub fn tick_for(&mut self, epoch: Epoch, dt: Duration, angle: &mut f32, paused: bool) -> u32 {
        if !self.running || epoch != self.epoch {
            return 0;
        }

        self.accumulated += dt;

        let mut ticks = 0;
        while self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            ticks += 1;

            if ticks >= self.max_catch_up {
                // A long stall should not turn into a visible lurch.
                self.accumulated = Duration::ZERO;
                break;
            }
        }

        if paused || ticks == 0 {
            return 0;
        }

        *angle += self.step * ticks as f32;
        log::trace!("Auto-rotation advanced {ticks} ticks to {angle}");

        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker() -> AutoRotationTicker {
        AutoRotationTicker::new(&AutoRotationConfig::default())
    }

    #[test]
    fn idle_until_started() {
        let mut ticker = ticker();
        let mut angle = 0.;

        assert_eq!(ticker.tick(Duration::from_secs(1), &mut angle, false), 0);
        assert_eq!(angle, 0.);
    }

    #[test]
    fn thirty_ticks_per_second() {
        let mut ticker = ticker();
        ticker.start();
        let mut angle = 0.;

        let mut ticks = 0;
        for _ in 0..60 {
            ticks += ticker.tick(Duration::from_secs(1) / 60, &mut angle, false);
        }

        assert!((29..=30).contains(&ticks), "got {ticks}");
        assert!((angle - ticks as f32 * 0.1_f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn paused_ticks_do_not_move_angle() {
        let mut ticker = ticker();
        ticker.start();
        let mut angle = 1.;

        ticker.tick(Duration::from_millis(500), &mut angle, true);

        assert_eq!(angle, 1.);
    }

    #[test]
    fn long_frames_are_capped() {
        let mut ticker = ticker();
        ticker.start();
        let mut angle = 0.;

        let ticks = ticker.tick(Duration::from_secs(5), &mut angle, false);

        assert_eq!(ticks, AutoRotationConfig::default().max_catch_up_ticks);
    }

    #[test]
    fn stop_invalidates_earlier_epoch() {
        let mut ticker = ticker();
        let stale = ticker.start();
        ticker.stop();
        ticker.start();

        let mut angle = 0.;
        assert_eq!(ticker.tick_for(stale, Duration::from_secs(1), &mut angle, false), 0);
        assert!(ticker.tick(Duration::from_millis(100), &mut angle, false) > 0);
    }
}
