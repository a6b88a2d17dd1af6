use std::time::{Duration, Instant};

/// Flat collection of named wall-clock spans.
///
/// Used to time the build phases (tree, ordering, factorization) and the
/// solve; totals are reported when the solver runs verbose.
#[derive(Default, Debug)]
pub struct Timers {
    spans: Vec<(&'static str, Duration)>,
    active: Option<(&'static str, Instant)>,
}

impl Timers {
    pub fn start(&mut self, key: &'static str) {
        //spans do not nest; a still-active span is closed first
        self.stop();
        self.active = Some((key, Instant::now()));
    }

    pub fn stop(&mut self) {
        if let Some((key, start)) = self.active.take() {
            let elapsed = start.elapsed();
            match self.spans.iter_mut().find(|(k, _)| *k == key) {
                Some((_, d)) => *d += elapsed,
                None => self.spans.push((key, elapsed)),
            }
        }
    }

    pub fn elapsed(&self, key: &'static str) -> Duration {
        self.spans
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, d)| *d)
            .unwrap_or(Duration::ZERO)
    }

    pub fn total_time(&self) -> Duration {
        self.spans.iter().map(|(_, d)| *d).sum()
    }

    pub fn print(&self) {
        for (key, d) in self.spans.iter() {
            println!("  {:<16}: {:?}", key, d);
        }
    }
}

macro_rules! timeit {
    ($timer:ident => $key:literal; $($tt:tt)+) => {
        $timer.start($key);
        $(
            $tt
        )+
        $timer.stop();
    }
}
pub(crate) use timeit;

#[test]
fn test_timer_accumulates() {
    let mut t = Timers::default();
    timeit! {t => "a"; {
        std::hint::black_box(0);
    }}
    timeit! {t => "a"; {
        std::hint::black_box(0);
    }}
    assert!(t.elapsed("a") <= t.total_time());
    assert_eq!(t.elapsed("missing"), std::time::Duration::ZERO);
}
