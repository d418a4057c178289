//! Element counters, recorded through the `metrics` facade when the
//! `metrics` feature is enabled.
//!
//! Every counter carries a `sequence` label holding the sequence name
//! (`anonymous` when unnamed).

pub const ELEMENTS_TOTAL: &str = "seqweld_elements_total";
pub const FAILURES_TOTAL: &str = "seqweld_failures_total";
pub const EXHAUSTED_TOTAL: &str = "seqweld_exhausted_total";
pub const STOPPED_TOTAL: &str = "seqweld_stopped_total";

#[cfg(feature = "metrics")]
fn increment(counter: &'static str, sequence: &str) {
    ::metrics::counter!(counter, "sequence" => sequence.to_string()).increment(1);
}

#[cfg(not(feature = "metrics"))]
fn increment(_counter: &'static str, _sequence: &str) {}

pub(crate) fn element(sequence: &str, failed: bool) {
    increment(ELEMENTS_TOTAL, sequence);
    if failed {
        increment(FAILURES_TOTAL, sequence);
    }
}

pub(crate) fn exhausted(sequence: &str) {
    increment(EXHAUSTED_TOTAL, sequence);
}

pub(crate) fn stopped(sequence: &str) {
    increment(STOPPED_TOTAL, sequence);
}
