//! Sticky per-session assignment.
//!
//! A (test, session) pair is Unassigned until its first decision and Assigned
//! from then on. Later decisions return the stored option as long as it is
//! still offered, or unconditionally when the session is in manual mode.

use crate::bandits::{ArmStats, BanditEngine};
use crate::events::{emit_for, EventSink};
use crate::random::RandomSource;
use crate::session::SessionHandle;
use banditry_core::{BanditError, BanditResult, EventKind, KeySpace};
use banditry_store::CounterStore;
use std::sync::Arc;
use tracing::debug;

/// Options used by callers that only need an on/off split.
pub const DEFAULT_OPTIONS: &[&str] = &["true", "false"];

pub struct AssignmentCoordinator {
    store: Arc<dyn CounterStore>,
    keys: KeySpace,
    bandit: BanditEngine,
    random: Arc<dyn RandomSource>,
    sink: Arc<dyn EventSink>,
}

fn ensure_options(test: &str, options: &[&str]) -> BanditResult<()> {
    if options.is_empty() {
        return Err(BanditError::InvalidInput(format!(
            "test {test:?} offered no options"
        )));
    }
    Ok(())
}

impl AssignmentCoordinator {
    pub fn new(
        store: Arc<dyn CounterStore>,
        keys: KeySpace,
        random: Arc<dyn RandomSource>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            store,
            keys,
            bandit: BanditEngine::new(random.clone()),
            random,
            sink,
        }
    }

    /// Uniform random assignment with no goal and no bandit.
    pub async fn measure<S: SessionHandle + ?Sized>(
        &self,
        test: &str,
        options: &[&str],
        session: &mut S,
    ) -> BanditResult<String> {
        ensure_options(test, options)?;

        if let Some(current) = session.get(test) {
            if options.contains(&current.as_str()) {
                return Ok(current);
            }
        }

        let choice = options[self.random.index(options.len())];
        self.spin_for_choice(test, choice, session).await
    }

    /// Thompson-sampled assignment for a test reporting to `goal`.
    pub async fn spin<S: SessionHandle + ?Sized>(
        &self,
        test: &str,
        goal: &str,
        options: &[&str],
        session: &mut S,
    ) -> BanditResult<String> {
        ensure_options(test, options)?;

        if let Some(current) = session.get(test) {
            if options.contains(&current.as_str()) || session.manual_override() {
                debug!(test = test, choice = %current, "Returning sticky assignment");
                return Ok(current);
            }
        }

        if let [only] = options {
            return Ok(only.to_string());
        }

        self.store
            .add_to_set(&self.keys.goal(goal), test)
            .await?;
        let arms = self.data_for_options(test, options).await?;
        let choice = self.bandit.best_guess(&arms)?;
        self.spin_for_choice(test, &choice, session).await
    }

    /// Current spin and win counters for each offered option, in offer order.
    pub async fn data_for_options(
        &self,
        test: &str,
        options: &[&str],
    ) -> BanditResult<Vec<ArmStats>> {
        let mut arms = Vec::with_capacity(options.len());
        for option in options {
            let spins = self.store.get(&self.keys.spins(test, option)).await?;
            let wins = self.store.get(&self.keys.wins(test, option)).await?;
            arms.push(ArmStats::new(*option, spins, wins));
        }
        Ok(arms)
    }

    /// Log the spin, bump the spin counter and pin the choice in the session.
    async fn spin_for_choice<S: SessionHandle + ?Sized>(
        &self,
        test: &str,
        choice: &str,
        session: &mut S,
    ) -> BanditResult<String> {
        emit_for(
            self.sink.as_ref(),
            self.random.as_ref(),
            EventKind::Spin,
            test,
            choice,
            session,
        )?;
        self.store.increment(&self.keys.spins(test, choice)).await?;
        metrics::counter!("banditry.spins").increment(1);

        session.set(test, choice.to_string());
        Ok(choice.to_string())
    }
}
