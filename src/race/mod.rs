//! Concurrent probe racing.
//!
//! # Responsibilities
//! - Fire a round of probes with bounded concurrency and optional spacing
//! - Latch the first outcome the caller's predicate accepts
//! - Abort the rest of the round once a winner is latched
//!
//! # Design Decisions
//! - Cancellation is cooperative and best-effort: aborted probes are never
//!   awaited for, and a probe that completes after the latch is discarded
//! - Losing outcomes are returned with their failure kinds intact so the
//!   caller can quarantine candidates precisely

use crate::probe::ProbeOutcome;
use crate::source::Candidate;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time;

/// Result of racing one round.
#[derive(Debug)]
pub struct RaceOutcome {
    /// First accepted outcome, if any.
    pub winner: Option<ProbeOutcome>,
    /// Every outcome that completed without being accepted, failure
    /// metadata preserved. Empty when a winner latched before the rest
    /// settled.
    pub settled: Vec<ProbeOutcome>,
}

/// Races probes against each other within one round.
#[derive(Debug, Clone)]
pub struct Racer {
    max_concurrency: usize,
    spacing: Duration,
}

impl Racer {
    pub fn new(max_concurrency: usize, spacing: Duration) -> Self {
        Self {
            max_concurrency,
            spacing,
        }
    }

    /// Run one round. `probe` produces the future for one candidate,
    /// `accept` decides whether an outcome stops the round, and
    /// `on_winner` fires synchronously with the latched winner.
    pub async fn run<P, Fut, A, W>(
        &self,
        round: Vec<Candidate>,
        probe: P,
        accept: A,
        mut on_winner: W,
    ) -> RaceOutcome
    where
        P: Fn(Candidate) -> Fut,
        Fut: Future<Output = ProbeOutcome> + Send + 'static,
        A: Fn(&ProbeOutcome) -> bool,
        W: FnMut(&ProbeOutcome),
    {
        let mut set: JoinSet<ProbeOutcome> = JoinSet::new();
        let mut pending = round.into_iter();
        let cap = self.max_concurrency.max(1);

        let mut launched = 0usize;
        while set.len() < cap {
            let Some(candidate) = pending.next() else {
                break;
            };
            if launched > 0 && !self.spacing.is_zero() {
                time::sleep(self.spacing).await;
            }
            set.spawn(probe(candidate));
            launched += 1;
        }

        let mut winner: Option<ProbeOutcome> = None;
        let mut settled = Vec::new();

        while let Some(joined) = set.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                // Aborted losers and panicked probe tasks land here;
                // neither carries anything worth recording.
                Err(_) => continue,
            };

            if winner.is_some() {
                // Completed between the latch and its abort; discard.
                continue;
            }

            if accept(&outcome) {
                tracing::debug!(candidate = %outcome.candidate, "round winner latched");
                on_winner(&outcome);
                winner = Some(outcome);
                set.abort_all();
                continue;
            }

            settled.push(outcome);

            // Refill the freed slot from the unlaunched remainder.
            if let Some(candidate) = pending.next() {
                if !self.spacing.is_zero() {
                    time::sleep(self.spacing).await;
                }
                set.spawn(probe(candidate));
            }
        }

        RaceOutcome { winner, settled }
    }
}
