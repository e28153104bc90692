//! Selection state: quarantine sets, counters, regressed mode.
//!
//! # States
//! - Unhealthy: candidate excluded from rounds until its entry expires
//! - Backup: candidate held as last-resort material until its entry expires
//!
//! # State Transitions
//! ```text
//! racing → unhealthy: transport failure, bad version, malformed response
//! racing → backup:    reachable and compatible but too stale
//! unhealthy → eligible: unhealthy_ttl elapsed since marking
//! backup → eligible:    backups_ttl elapsed since recording
//! ```
//!
//! # Design Decisions
//! - Per-entry expiry is authoritative; membership is checked against the
//!   caller-supplied `now` on every read
//! - The round-rescheduled decay sweeps only prune already-expired entries,
//!   so they can never disagree with per-entry expiry
//! - A candidate is in at most one set at a time

use crate::probe::ProbeOutcome;
use crate::source::Candidate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time;

/// A stale-but-usable candidate, kept for last-resort selection.
#[derive(Debug, Clone)]
pub struct BackupEntry {
    pub outcome: ProbeOutcome,
    pub staleness: u64,
    expires_at: Instant,
    /// Order of first observation; the ranking tie-break.
    observed_seq: u64,
}

/// Mutable core of one selection session.
///
/// Mutated only by the orchestrating task after a round settles and by the
/// decay sweeps (which remove nothing an eligibility read would still see).
#[derive(Debug, Default)]
pub struct SelectionState {
    unhealthy: HashMap<Candidate, Instant>,
    backups: HashMap<Candidate, BackupEntry>,
    next_seq: u64,
    total_attempts: u64,
    regressed_until: Option<Instant>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quarantine a candidate until `now + ttl`. Re-marking refreshes the
    /// expiry. Removes any backup entry so the sets stay disjoint.
    pub fn mark_unhealthy(&mut self, candidate: Candidate, now: Instant, ttl: Duration) {
        self.backups.remove(&candidate);
        self.unhealthy.insert(candidate, now + ttl);
    }

    /// Record a stale candidate, replacing any prior entry but keeping its
    /// original observation order.
    pub fn record_backup(
        &mut self,
        outcome: ProbeOutcome,
        staleness: u64,
        now: Instant,
        ttl: Duration,
    ) {
        let candidate = outcome.candidate.clone();
        self.unhealthy.remove(&candidate);
        let observed_seq = match self.backups.get(&candidate) {
            Some(existing) => existing.observed_seq,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                seq
            }
        };
        self.backups.insert(
            candidate,
            BackupEntry {
                outcome,
                staleness,
                expires_at: now + ttl,
                observed_seq,
            },
        );
    }

    /// True when the candidate sits in either set with an unexpired entry.
    pub fn is_excluded(&self, candidate: &Candidate, now: Instant) -> bool {
        if let Some(expires_at) = self.unhealthy.get(candidate) {
            if *expires_at > now {
                return true;
            }
        }
        if let Some(entry) = self.backups.get(candidate) {
            if entry.expires_at > now {
                return true;
            }
        }
        false
    }

    /// Best-ranked unexpired backup: lowest staleness, earliest observation
    /// breaking ties.
    pub fn best_backup(&self, now: Instant) -> Option<Candidate> {
        self.backups
            .values()
            .filter(|entry| entry.expires_at > now)
            .min_by_key(|entry| (entry.staleness, entry.observed_seq))
            .map(|entry| entry.outcome.candidate.clone())
    }

    pub fn prune_expired_unhealthy(&mut self, now: Instant) {
        self.unhealthy.retain(|_, expires_at| *expires_at > now);
    }

    pub fn prune_expired_backups(&mut self, now: Instant) {
        self.backups.retain(|_, entry| entry.expires_at > now);
    }

    pub fn prune_expired(&mut self, now: Instant) {
        self.prune_expired_unhealthy(now);
        self.prune_expired_backups(now);
    }

    /// Full reset of both sets, used when the pool is exhausted with
    /// nothing to fall back on. Distinct from per-entry expiry.
    pub fn reset(&mut self) {
        self.unhealthy.clear();
        self.backups.clear();
    }

    pub fn note_attempts(&mut self, count: u64) {
        self.total_attempts += count;
    }

    pub fn total_attempts(&self) -> u64 {
        self.total_attempts
    }

    pub fn unhealthy_len(&self) -> usize {
        self.unhealthy.len()
    }

    pub fn backup_len(&self) -> usize {
        self.backups.len()
    }

    pub fn enter_regressed(&mut self, now: Instant, timeout: Duration) {
        self.regressed_until = Some(now + timeout);
    }

    pub fn leave_regressed(&mut self) {
        self.regressed_until = None;
    }

    pub fn is_regressed(&self, now: Instant) -> bool {
        self.regressed_until.is_some_and(|until| until > now)
    }
}

/// The two round-level decay sweeps, rescheduled as a pair so two competing
/// clears can never race each other.
#[derive(Debug, Default)]
pub struct DecaySweeps {
    unhealthy: Option<JoinHandle<()>>,
    backups: Option<JoinHandle<()>>,
}

impl DecaySweeps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending sweeps and schedule fresh ones measured from this
    /// round's completion.
    pub fn reschedule(
        &mut self,
        state: Arc<Mutex<SelectionState>>,
        unhealthy_ttl: Duration,
        backups_ttl: Duration,
    ) {
        self.cancel();

        let for_unhealthy = state.clone();
        self.unhealthy = Some(tokio::spawn(async move {
            time::sleep(unhealthy_ttl).await;
            if let Ok(mut state) = for_unhealthy.lock() {
                state.prune_expired_unhealthy(Instant::now());
            }
        }));

        self.backups = Some(tokio::spawn(async move {
            time::sleep(backups_ttl).await;
            if let Ok(mut state) = state.lock() {
                state.prune_expired_backups(Instant::now());
            }
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.unhealthy.take() {
            handle.abort();
        }
        if let Some(handle) = self.backups.take() {
            handle.abort();
        }
    }
}

impl Drop for DecaySweeps {
    fn drop(&mut self) {
        self.cancel();
    }
}
