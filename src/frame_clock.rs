#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    // Seconds since the demo started.
    pub time: f64,
    // Seconds since the previous frame, never negative.
    pub delta: f64,
}

#[derive(Debug)]
pub struct FrameClock {
    last_update: f64,
}

impl FrameClock {
    pub fn start(now: f64) -> FrameClock {
        FrameClock { last_update: now }
    }

    pub fn tick(&mut self, now: f64) -> FrameTiming {
        let delta = (now - self.last_update).max(0.0);
        self.last_update = now;
        FrameTiming { time: now, delta }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_since_last_tick() {
        let mut clock = FrameClock::start(1.0);
        let timing = clock.tick(1.25);
        assert_eq!(timing, FrameTiming { time: 1.25, delta: 0.25 });
        assert_eq!(clock.tick(2.0).delta, 0.75);
    }

    #[test]
    fn delta_is_never_negative() {
        let mut clock = FrameClock::start(5.0);
        assert_eq!(clock.tick(4.0).delta, 0.0);
        assert_eq!(clock.tick(4.5).delta, 0.5);
    }
}
