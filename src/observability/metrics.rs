//! Metrics recording.
//!
//! # Metrics
//! - `selector_probes_total` (counter): probes by candidate
//! - `selector_probe_failures_total` (counter): failed probes by candidate
//! - `selector_selections_total` (counter): selections by outcome
//!   (cache-hit, selected, exhausted)
//! - `selector_unhealthy_size` / `selector_backup_size` (gauge): current
//!   quarantine set sizes
//! - `selector_regressed_mode` (gauge): 1 while the relaxed bar is active

use metrics::{counter, gauge};

pub fn record_probe(candidate: &str, ok: bool) {
    counter!("selector_probes_total", "candidate" => candidate.to_string()).increment(1);
    if !ok {
        counter!("selector_probe_failures_total", "candidate" => candidate.to_string())
            .increment(1);
    }
}

pub fn record_selection(outcome: &str) {
    counter!("selector_selections_total", "outcome" => outcome.to_string()).increment(1);
}

pub fn record_set_sizes(unhealthy: usize, backups: usize) {
    gauge!("selector_unhealthy_size").set(unhealthy as f64);
    gauge!("selector_backup_size").set(backups as f64);
}

pub fn record_regressed(active: bool) {
    gauge!("selector_regressed_mode").set(if active { 1.0 } else { 0.0 });
}
