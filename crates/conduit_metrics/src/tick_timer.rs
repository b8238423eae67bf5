//! Rolling tick timing

use std::time::{Duration, Instant};

/// Times script ticks and keeps the most recent `window` samples.
pub struct TickTimer {
    started: Option<Instant>,
    samples: Vec<Duration>,
    window: usize,
    next: usize,
}

impl TickTimer {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            started: None,
            samples: Vec::with_capacity(window),
            window,
            next: 0,
        }
    }

    pub fn begin(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Close the tick opened by `begin`. Without a matching `begin` this
    /// records nothing.
    pub fn end(&mut self) {
        if let Some(started) = self.started.take() {
            self.push(started.elapsed());
        }
    }

    pub fn push(&mut self, sample: Duration) {
        if self.samples.len() < self.window {
            self.samples.push(sample);
        } else {
            self.samples[self.next] = sample;
        }
        self.next = (self.next + 1) % self.window;
    }

    pub fn ticks(&self) -> usize {
        self.samples.len()
    }

    pub fn average(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        self.samples.iter().sum::<Duration>() / self.samples.len() as u32
    }

    pub fn average_ms(&self) -> f64 {
        self.average().as_secs_f64() * 1000.0
    }

    /// Fastest and slowest tick in the window.
    pub fn range(&self) -> (Duration, Duration) {
        let min = self.samples.iter().min().copied().unwrap_or_default();
        let max = self.samples.iter().max().copied().unwrap_or_default();
        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_rolls_over() {
        let mut timer = TickTimer::new(3);
        timer.push(Duration::from_millis(10));
        assert_eq!(timer.average(), Duration::from_millis(10));

        timer.push(Duration::from_millis(20));
        timer.push(Duration::from_millis(30));
        assert_eq!(timer.average(), Duration::from_millis(20));

        // oldest sample drops out
        timer.push(Duration::from_millis(40));
        assert_eq!(timer.average(), Duration::from_millis(30));
        assert_eq!(timer.ticks(), 3);
        assert_eq!(
            timer.range(),
            (Duration::from_millis(20), Duration::from_millis(40))
        );
    }

    #[test]
    fn end_without_begin_is_ignored() {
        let mut timer = TickTimer::new(4);
        timer.end();
        assert_eq!(timer.ticks(), 0);
        timer.begin();
        timer.end();
        assert_eq!(timer.ticks(), 1);
    }
}
