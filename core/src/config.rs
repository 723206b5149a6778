//! Configuration knobs shared by the FP, TC, KB engines and the congruence
//! dispatcher (`spec.md` §6).

use std::time::Duration;

/// Sentinel meaning "no upper bound", used by [`Config::max_rules`] and
/// [`Config::max_overlap`].
pub const UNBOUNDED: usize = usize::MAX;

/// Ordering used to enumerate Knuth-Bendix critical-pair overlaps when
/// `knuth_bendix`'s "by overlap length" variant is selected (`spec.md`
/// §4.B point 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapMeasure {
    /// `|AB|`: length of the combined overlap word.
    #[default]
    Ab,
    /// `max(|AB|, |BC|)`.
    MaxAbBc,
    /// `|A| + |B| + |C|`.
    AbBc,
}

/// Configuration shared by every engine in this crate. Each setter consumes
/// and returns `self`, the way the teacher's `GroupBuilder`/`CoxeterGroup`
/// constructors chain construction steps.
#[derive(Debug, Clone)]
pub struct Config {
    max_threads: usize,
    pack: usize,
    max_rules: usize,
    max_overlap: usize,
    overlap_measure: OverlapMeasure,
    check_confluence_interval: Option<usize>,
    report: bool,
    report_interval: Duration,
    batch_size: usize,
    max_time: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_threads: num_cpus::get().max(1),
            pack: 120_000,
            max_rules: UNBOUNDED,
            max_overlap: UNBOUNDED,
            overlap_measure: OverlapMeasure::default(),
            check_confluence_interval: Some(128),
            report: false,
            report_interval: Duration::from_millis(1000),
            batch_size: 8192,
            max_time: None,
        }
    }
}

impl Config {
    /// Constructs a configuration with the default knob values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds cooperative parallelism: `set_max_threads(n)`.
    pub fn set_max_threads(mut self, n: usize) -> Self {
        self.max_threads = n.max(1);
        self
    }
    /// Returns the configured maximum number of worker threads.
    pub fn max_threads(&self) -> usize {
        self.max_threads
    }

    /// Sets the Todd-Coxeter active-coset threshold for lookahead:
    /// `set_pack(n)`.
    pub fn set_pack(mut self, n: usize) -> Self {
        self.pack = n;
        self
    }
    /// Returns the configured packing threshold.
    pub fn pack(&self) -> usize {
        self.pack
    }

    /// Caps the number of active Knuth-Bendix rules: `set_max_rules(n)`.
    pub fn set_max_rules(mut self, n: usize) -> Self {
        self.max_rules = n;
        self
    }
    /// Returns the configured rule cap (`UNBOUNDED` if none).
    pub fn max_rules(&self) -> usize {
        self.max_rules
    }

    /// Caps the length of a single Knuth-Bendix overlap: `set_max_overlap(n)`.
    pub fn set_max_overlap(mut self, n: usize) -> Self {
        self.max_overlap = n;
        self
    }
    /// Returns the configured overlap-length cap (`UNBOUNDED` if none).
    pub fn max_overlap(&self) -> usize {
        self.max_overlap
    }

    /// Sets the Knuth-Bendix overlap ordering: `set_overlap_measure(...)`.
    pub fn set_overlap_measure(mut self, measure: OverlapMeasure) -> Self {
        self.overlap_measure = measure;
        self
    }
    /// Returns the configured overlap ordering.
    pub fn overlap_measure(&self) -> OverlapMeasure {
        self.overlap_measure
    }

    /// Sets the Knuth-Bendix confluence polling cadence, in rules processed
    /// between checks; `None` disables periodic checking (the source's
    /// `-1` sentinel): `set_check_confluence_interval(n)`.
    pub fn set_check_confluence_interval(mut self, n: Option<usize>) -> Self {
        self.check_confluence_interval = n;
        self
    }
    /// Returns the configured confluence-polling cadence.
    pub fn check_confluence_interval(&self) -> Option<usize> {
        self.check_confluence_interval
    }

    /// Toggles progress reporting: `set_report(bool)`.
    pub fn set_report(mut self, report: bool) -> Self {
        self.report = report;
        self
    }
    /// Returns whether progress reporting is enabled.
    pub fn report(&self) -> bool {
        self.report
    }

    /// Sets the progress-reporting cadence: `set_report_interval(n)`.
    pub fn set_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }
    /// Returns the configured reporting cadence.
    pub fn report_interval(&self) -> Duration {
        self.report_interval
    }

    /// Sets the Froidure-Pin enumeration batch size: `set_batch_size(n)`.
    pub fn set_batch_size(mut self, n: usize) -> Self {
        self.batch_size = n.max(1);
        self
    }
    /// Returns the configured enumeration batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Sets a wall-clock cap applied alongside cancellation flags at every
    /// suspension point (`spec.md` §5 "Timeouts"): `Congruence::set_config`
    /// applies it to every strategy it builds; a bare `FroidurePin`,
    /// `ToddCoxeter` or `RewritingSystem` used outside a `Congruence` honors
    /// it once `configure`/`knuth_bendix` is given this `Config`.
    pub fn set_max_time(mut self, limit: Option<Duration>) -> Self {
        self.max_time = limit;
        self
    }
    /// Returns the configured wall-clock cap, if any.
    pub fn max_time(&self) -> Option<Duration> {
        self.max_time
    }
}
