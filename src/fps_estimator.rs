use std::time::{Duration, Instant};

// Counts frames and reports the average rate once per reporting period.
#[derive(Debug)]
pub struct FpsEstimator {
    period_start: Instant,
    frames: u32,
    pub period: Duration,
}

impl FpsEstimator {
    pub fn new(now: Instant) -> FpsEstimator {
        FpsEstimator {
            period_start: now,
            frames: 0,
            period: Duration::from_secs(1),
        }
    }

    /// Records one frame; returns the frame rate when a period has elapsed.
    pub fn tick(&mut self, now: Instant) -> Option<f64> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.period_start);
        if elapsed < self.period {
            return None;
        }
        let fps = self.frames as f64 / elapsed.as_secs_f64();
        self.frames = 0;
        self.period_start = now;
        Some(fps)
    }
}

pub fn title_with_fps(title: &str, fps: f64) -> String {
    format!("{} - {:.0} fps", title, fps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_second() {
        let start = Instant::now();
        let mut fps = FpsEstimator::new(start);
        for frame in 1..60 {
            assert_eq!(fps.tick(start + Duration::from_millis(frame * 16)), None);
        }
        let rate = fps.tick(start + Duration::from_secs(1)).unwrap();
        assert!((rate - 60.0).abs() < 1e-9);
        // The count restarts after a report.
        assert_eq!(fps.tick(start + Duration::from_millis(1500)), None);
        let rate = fps.tick(start + Duration::from_secs(2)).unwrap();
        assert!((rate - 2.0).abs() < 1e-9);
    }

    #[test]
    fn title() {
        assert_eq!(title_with_fps("Feedback Particles", 59.7), "Feedback Particles - 60 fps");
    }
}
