//! Win/loss recording against previously spun options.
//!
//! Repeated `win` calls for the same goal and session are counted every time;
//! a goal that can legitimately complete more than once per session relies on it.

use crate::events::{emit_for, EventSink};
use crate::random::RandomSource;
use crate::session::SessionHandle;
use banditry_core::{BanditResult, EventKind, KeySpace};
use banditry_store::CounterStore;
use std::sync::Arc;
use tracing::debug;

pub struct OutcomeRecorder {
    store: Arc<dyn CounterStore>,
    keys: KeySpace,
    random: Arc<dyn RandomSource>,
    sink: Arc<dyn EventSink>,
}

impl OutcomeRecorder {
    pub fn new(
        store: Arc<dyn CounterStore>,
        keys: KeySpace,
        random: Arc<dyn RandomSource>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            store,
            keys,
            random,
            sink,
        }
    }

    /// Credit `choice` in `test`. An absent or empty choice is a no-op.
    pub async fn win_on_option<S: SessionHandle + ?Sized>(
        &self,
        test: &str,
        choice: Option<&str>,
        session: &mut S,
    ) -> BanditResult<()> {
        let Some(choice) = choice.filter(|c| !c.is_empty()) else {
            return Ok(());
        };

        self.emit(EventKind::Win, test, choice, session)?;
        self.store.increment(&self.keys.wins(test, choice)).await?;
        metrics::counter!("banditry.wins").increment(1);
        Ok(())
    }

    /// Take one win away from `choice` in `test`. The tally has no floor.
    pub async fn lose_on_option<S: SessionHandle + ?Sized>(
        &self,
        test: &str,
        choice: Option<&str>,
        session: &mut S,
    ) -> BanditResult<()> {
        let Some(choice) = choice.filter(|c| !c.is_empty()) else {
            return Ok(());
        };

        self.emit(EventKind::Lose, test, choice, session)?;
        self.store.decrement(&self.keys.wins(test, choice)).await?;
        metrics::counter!("banditry.losses").increment(1);
        Ok(())
    }

    /// Credit the session's option in every test reporting to `goal`.
    /// Returns how many tests were credited.
    pub async fn win<S: SessionHandle + ?Sized>(
        &self,
        goal: &str,
        session: &mut S,
    ) -> BanditResult<usize> {
        let mut tests: Vec<String> = self
            .store
            .members_of_set(&self.keys.goal(goal))
            .await?
            .into_iter()
            .collect();
        tests.sort();

        let mut credited = 0;
        for test in &tests {
            let Some(choice) = session.get(test).filter(|c| !c.is_empty()) else {
                continue;
            };
            self.win_on_option(test, Some(choice.as_str()), session).await?;
            credited += 1;
        }

        debug!(goal = goal, tests = tests.len(), credited = credited, "Goal recorded");
        Ok(credited)
    }

    fn emit<S: SessionHandle + ?Sized>(
        &self,
        kind: EventKind,
        test: &str,
        choice: &str,
        session: &mut S,
    ) -> BanditResult<()> {
        emit_for(
            self.sink.as_ref(),
            self.random.as_ref(),
            kind,
            test,
            choice,
            session,
        )
    }
}
