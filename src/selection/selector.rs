//! Selection orchestrator.
//!
//! # Data Flow
//! ```text
//! select()
//!     → shortcircuit hook (taken as-is when set)
//!     → cached selection younger than reselect_timeout
//!     → pool snapshot from the candidate source (once per call)
//!     → whitelist filter
//!     → round loop:
//!         eligible = pool − whitelist-excluded − quarantined
//!         empty → best backup (regressed mode) or full reset + None
//!         sample round → race probes → classify settled outcomes
//!         → quarantine / record backups → reschedule decay sweeps
//!         healthy winner → cache write-through → return
//! ```
//!
//! # Design Decisions
//! - The retry loop is explicit and bounded: a round with no winner always
//!   shrinks the eligible set, so the loop terminates
//! - State mutation happens only between rounds, never from probe tasks
//! - No single candidate failure reaches the caller; only pool exhaustion
//!   is observable, as `None`

use crate::config::{validate_config, ConfigError, SelectorConfig};
use crate::error::SelectorResult;
use crate::observability::metrics;
use crate::policy::{Classification, HealthPolicy};
use crate::probe::HealthProber;
use crate::race::Racer;
use crate::selection::cache::{cache_key, unix_ms, CachedSelection, FreshnessMonitor, SelectionCache};
use crate::selection::state::{DecaySweeps, SelectionState};
use crate::source::{Candidate, CandidateSource};
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

type ShortCircuit = Box<dyn Fn() -> Option<Candidate> + Send + Sync>;

/// Picks a healthy endpoint out of a dynamic, untrusted pool.
///
/// One selector owns one selection session; independent service types get
/// independent selectors and can never interfere with each other.
pub struct ServiceSelector {
    config: SelectorConfig,
    source: Arc<dyn CandidateSource>,
    cache: Option<Arc<dyn SelectionCache>>,
    cache_key: String,
    prober: HealthProber,
    racer: Racer,
    whitelist: Option<HashSet<Candidate>>,
    state: Arc<Mutex<SelectionState>>,
    sweeps: Mutex<DecaySweeps>,
    shortcircuit: Option<ShortCircuit>,
}

impl ServiceSelector {
    /// Build a selector. Configuration problems and malformed whitelist
    /// entries fail here, never mid-round.
    pub fn new(config: SelectorConfig, source: Arc<dyn CandidateSource>) -> SelectorResult<Self> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let whitelist = match &config.whitelist {
            Some(entries) => {
                let mut set = HashSet::with_capacity(entries.len());
                for entry in entries {
                    set.insert(Candidate::parse(entry)?);
                }
                Some(set)
            }
            None => None,
        };

        let prober = HealthProber::new(&config.probe);
        let racer = Racer::new(
            config.selection.max_concurrent_requests,
            config.probe.spacing(),
        );
        let cache_key = cache_key(&config.service_name);

        Ok(Self {
            config,
            source,
            cache: None,
            cache_key,
            prober,
            racer,
            whitelist,
            state: Arc::new(Mutex::new(SelectionState::new())),
            sweeps: Mutex::new(DecaySweeps::new()),
            shortcircuit: None,
        })
    }

    /// Attach a cache for selections; enables the reselect short-path and
    /// the freshness monitor.
    pub fn with_cache(mut self, cache: Arc<dyn SelectionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Install a hook that can skip selection entirely. Its result is used
    /// as-is, without validation.
    pub fn with_shortcircuit<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> Option<Candidate> + Send + Sync + 'static,
    {
        self.shortcircuit = Some(Box::new(hook));
        self
    }

    /// Pick a healthy candidate, or `None` when the whole pool is down.
    pub async fn select(&self) -> SelectorResult<Option<Candidate>> {
        if let Some(hook) = &self.shortcircuit {
            if let Some(candidate) = hook() {
                return Ok(Some(candidate));
            }
        }

        if let Some(cached) = self.read_fresh_cache().await? {
            metrics::record_selection("cache-hit");
            return Ok(Some(cached));
        }

        // One snapshot per call; every round works off it.
        let pool = self.source.candidates().await?;
        let known_versions = self.source.known_versions().await?;
        let policy = HealthPolicy::new(known_versions, self.config.selection.unhealthy_block_diff);

        let winner = self.run_rounds(&pool, &policy).await;

        match &winner {
            Some(candidate) => {
                self.write_cache(candidate).await?;
                metrics::record_selection("selected");
            }
            None => {
                tracing::warn!(
                    service = %self.config.service_name,
                    "no candidate found; pool exhausted"
                );
                metrics::record_selection("exhausted");
            }
        }

        Ok(winner)
    }

    /// Spawn the background task that keeps the cached selection honest.
    /// Returns `None` when no cache is attached.
    pub fn spawn_freshness_monitor(
        &self,
        shutdown: broadcast::Receiver<()>,
    ) -> Option<JoinHandle<()>> {
        let cache = self.cache.clone()?;
        let monitor = FreshnessMonitor::new(
            cache,
            self.prober.clone(),
            self.cache_key.clone(),
            self.config.cache.timestamp_interval(),
        );
        Some(tokio::spawn(monitor.run(shutdown)))
    }

    /// Total number of candidates attempted over this session.
    pub fn total_attempts(&self) -> u64 {
        self.state().total_attempts()
    }

    pub fn unhealthy_size(&self) -> usize {
        self.state().unhealthy_len()
    }

    pub fn backup_size(&self) -> usize {
        self.state().backup_len()
    }

    /// True while the relaxed acceptance bar from a backup fallback is
    /// still in effect.
    pub fn is_in_regressed_mode(&self) -> bool {
        self.state().is_regressed(Instant::now())
    }

    fn state(&self) -> MutexGuard<'_, SelectionState> {
        self.state.lock().expect("selection state lock poisoned")
    }

    fn allowed(&self, candidate: &Candidate) -> bool {
        self.whitelist
            .as_ref()
            .map_or(true, |whitelist| whitelist.contains(candidate))
    }

    async fn run_rounds(&self, pool: &[Candidate], policy: &HealthPolicy) -> Option<Candidate> {
        let allowed: Vec<Candidate> = pool
            .iter()
            .filter(|candidate| self.allowed(candidate))
            .cloned()
            .collect();

        loop {
            let now = Instant::now();
            let (round, relaxed) = {
                let mut state = self.state();
                state.prune_expired(now);

                let eligible: Vec<Candidate> = allowed
                    .iter()
                    .filter(|candidate| !state.is_excluded(candidate, now))
                    .cloned()
                    .collect();

                if eligible.is_empty() {
                    if let Some(best) = state.best_backup(now) {
                        tracing::warn!(
                            candidate = %best,
                            "no healthy candidate anywhere; falling back to least-stale backup"
                        );
                        state.enter_regressed(now, self.config.selection.regressed_mode_timeout());
                        metrics::record_regressed(true);
                        return Some(best);
                    }
                    tracing::warn!("pool exhausted with no backups; resetting quarantine state");
                    state.reset();
                    return None;
                }

                let mut round = eligible;
                {
                    // RNG must not be held across an await point.
                    let mut rng = rand::thread_rng();
                    round.shuffle(&mut rng);
                }
                round.truncate(self.config.selection.max_concurrent_requests);
                state.note_attempts(round.len() as u64);

                (round, state.is_regressed(now))
            };

            tracing::debug!(round_size = round.len(), relaxed, "racing selection round");

            let prober = self.prober.clone();
            let outcome = self
                .racer
                .run(
                    round,
                    move |candidate| {
                        let prober = prober.clone();
                        async move { prober.probe(&candidate).await }
                    },
                    |outcome| policy.classify(outcome, relaxed).is_healthy(),
                    |winner| {
                        tracing::info!(
                            candidate = %winner.candidate,
                            latency_ms = winner.latency.as_millis() as u64,
                            "healthy candidate selected"
                        );
                    },
                )
                .await;

            {
                let now = Instant::now();
                let mut state = self.state();
                for settled in outcome.settled {
                    match policy.classify(&settled, relaxed) {
                        Classification::Unhealthy(reason) => {
                            tracing::debug!(
                                candidate = %settled.candidate,
                                reason = ?reason,
                                "quarantining candidate"
                            );
                            state.mark_unhealthy(
                                settled.candidate.clone(),
                                now,
                                self.config.selection.unhealthy_ttl(),
                            );
                        }
                        Classification::Backup { staleness } => {
                            tracing::debug!(
                                candidate = %settled.candidate,
                                staleness,
                                "recording backup candidate"
                            );
                            state.record_backup(
                                settled,
                                staleness,
                                now,
                                self.config.selection.backups_ttl(),
                            );
                        }
                        // Healthy outcomes either latched as the winner or
                        // completed after it; nothing to record.
                        Classification::Healthy => {}
                    }
                }
                metrics::record_set_sizes(state.unhealthy_len(), state.backup_len());

                if let Some(winner) = &outcome.winner {
                    // A win under the strict bar ends any regressed window.
                    if policy.classify(winner, false).is_healthy() {
                        state.leave_regressed();
                        metrics::record_regressed(false);
                    }
                }
            }

            self.sweeps.lock().expect("sweep lock poisoned").reschedule(
                self.state.clone(),
                self.config.selection.unhealthy_ttl(),
                self.config.selection.backups_ttl(),
            );

            if let Some(winner) = outcome.winner {
                return Some(winner.candidate);
            }
        }
    }

    async fn read_fresh_cache(&self) -> SelectorResult<Option<Candidate>> {
        let Some(cache) = &self.cache else {
            return Ok(None);
        };
        let Some(raw) = cache.read(&self.cache_key).await? else {
            return Ok(None);
        };

        let cached = match CachedSelection::from_json(&raw) {
            Ok(cached) => cached,
            Err(e) => {
                // A corrupt entry is a miss, not a failure.
                tracing::warn!(error = %e, "discarding unreadable cached selection");
                cache.evict(&self.cache_key).await?;
                return Ok(None);
            }
        };

        if cached.age(unix_ms()) < self.config.cache.reselect_timeout() {
            tracing::debug!(candidate = %cached.candidate, "returning cached selection");
            return Ok(Some(cached.candidate));
        }
        Ok(None)
    }

    async fn write_cache(&self, candidate: &Candidate) -> SelectorResult<()> {
        let Some(cache) = &self.cache else {
            return Ok(());
        };
        let entry = CachedSelection::now(candidate.clone());
        cache.write(&self.cache_key, &entry.to_json()?).await
    }
}
