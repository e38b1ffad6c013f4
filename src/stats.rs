//! Line statistics for a file, a directory or a whole snapshot, and the
//! comparison of two such values.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

/// Lower bound (inclusive) of the "good" band.
pub const GOOD_THRESHOLD: f64 = 90.0;
/// Lower bound (inclusive) of the "ok" band.
pub const OK_THRESHOLD: f64 = 75.0;

/// Aggregate line counts. Percentages are always derived, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Physical lines.
    pub total_lines: u64,
    /// Executable lines (non-null entries).
    pub relevant_lines: u64,
    /// Executable lines hit at least once.
    pub covered_lines: u64,
    /// Sum of all hit counts.
    pub total_hits: u64,
}

impl Stats {
    /// Stats of one per-line coverage vector.
    #[must_use]
    pub fn from_coverage(coverage: &[Option<u64>]) -> Self {
        let mut stats = Self {
            total_lines: coverage.len() as u64,
            ..Self::default()
        };
        for hits in coverage.iter().flatten() {
            stats.relevant_lines += 1;
            if *hits > 0 {
                stats.covered_lines += 1;
            }
            stats.total_hits = stats.total_hits.saturating_add(*hits);
        }
        stats
    }

    /// Percentage of relevant lines covered, 0.0 when nothing is relevant.
    #[must_use]
    pub fn coverage_percent(&self) -> f64 {
        if self.relevant_lines == 0 {
            0.0
        } else {
            100.0 * self.covered_lines as f64 / self.relevant_lines as f64
        }
    }

    /// Hits per relevant line, scaled by 100 (`250` means 2.50).
    #[must_use]
    pub fn average_hits(&self) -> u64 {
        if self.relevant_lines == 0 {
            0
        } else {
            let scaled = 100 * u128::from(self.total_hits) / u128::from(self.relevant_lines);
            u64::try_from(scaled).unwrap_or(u64::MAX)
        }
    }

    #[must_use]
    pub fn missed_lines(&self) -> u64 {
        self.relevant_lines - self.covered_lines
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        Severity::classify(self.coverage_percent())
    }
}

impl AddAssign for Stats {
    fn add_assign(&mut self, rhs: Self) {
        self.total_lines += rhs.total_lines;
        self.relevant_lines += rhs.relevant_lines;
        self.covered_lines += rhs.covered_lines;
        self.total_hits = self.total_hits.saturating_add(rhs.total_hits);
    }
}

impl Add for Stats {
    type Output = Stats;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl Sum for Stats {
    fn sum<I: Iterator<Item = Stats>>(iter: I) -> Self {
        iter.fold(Stats::default(), Add::add)
    }
}

impl<'a> Sum<&'a Stats> for Stats {
    fn sum<I: Iterator<Item = &'a Stats>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Coverage band used for colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Good,
    Ok,
    Bad,
}

impl Severity {
    #[must_use]
    pub fn classify(percent: f64) -> Self {
        if percent >= GOOD_THRESHOLD {
            Severity::Good
        } else if percent >= OK_THRESHOLD {
            Severity::Ok
        } else {
            Severity::Bad
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Good => "good",
            Severity::Ok => "ok",
            Severity::Bad => "bad",
        }
    }
}

/// Direction of change between a previous and a current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Same,
    Up,
    Down,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Same => "same",
            Trend::Up => "up",
            Trend::Down => "down",
        }
    }

    pub fn sign(&self) -> &'static str {
        match self {
            Trend::Same => "",
            Trend::Up => "+",
            Trend::Down => "-",
        }
    }
}

/// A current value together with how far it moved from the previous one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delta<T> {
    pub current: T,
    pub trend: Trend,
    /// Absolute difference; zero when the trend is `Same`.
    pub magnitude: T,
}

impl<T> Delta<T>
where
    T: Copy + Default + PartialOrd + Sub<Output = T>,
{
    /// Without a previous value there is nothing to compare against and the
    /// delta is `Same`.
    pub fn between(current: T, previous: Option<T>) -> Self {
        let (trend, magnitude) = match previous {
            Some(prev) if current > prev => (Trend::Up, current - prev),
            Some(prev) if current < prev => (Trend::Down, prev - current),
            _ => (Trend::Same, T::default()),
        };
        Self {
            current,
            trend,
            magnitude,
        }
    }
}

/// The deltas of every column shown in the reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsDelta {
    pub coverage: Delta<f64>,
    pub total: Delta<u64>,
    pub relevant: Delta<u64>,
    pub covered: Delta<u64>,
    pub missed: Delta<u64>,
    pub average: Delta<u64>,
}

impl StatsDelta {
    pub fn between(current: &Stats, previous: Option<&Stats>) -> Self {
        Self {
            coverage: Delta::between(
                current.coverage_percent(),
                previous.map(Stats::coverage_percent),
            ),
            total: Delta::between(current.total_lines, previous.map(|p| p.total_lines)),
            relevant: Delta::between(current.relevant_lines, previous.map(|p| p.relevant_lines)),
            covered: Delta::between(current.covered_lines, previous.map(|p| p.covered_lines)),
            missed: Delta::between(current.missed_lines(), previous.map(Stats::missed_lines)),
            average: Delta::between(current.average_hits(), previous.map(Stats::average_hits)),
        }
    }
}

/// `87.50%`
#[must_use]
pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// `250` → `2.50`
#[must_use]
pub fn format_average(value: u64) -> String {
    format!("{}.{:02}", value / 100, value % 100)
}
