//! Review session: status mutations on top of the reducer
//!
//! Each mutation computes the new [`UserStatus`], updates the session's
//! inputs, recomputes the view and then writes through the store. A store
//! failure leaves the in-memory change in place and is reported to the caller.

use std::sync::Arc;

use notam_core::{identity, FlightContext, IdentityKey, RawNotam, ReviewState, UserStatus};
use tracing::{info, warn};

use crate::error::{SessionError, StoreError};
use crate::filter::FilterState;
use crate::review::{BriefingInputs, BriefingView, ReviewEngine};
use crate::store::{BriefingScope, StatusStore};

pub struct ReviewSession {
    engine: ReviewEngine,
    store: Arc<dyn StatusStore>,
    inputs: BriefingInputs,
    view: BriefingView,
}

impl ReviewSession {
    /// Start a session, loading statuses and the ignore list from `store`.
    ///
    /// Stored values take precedence over those already in `inputs`. If the
    /// store cannot be read the session starts from `inputs` alone.
    pub async fn open(
        engine: ReviewEngine,
        store: Arc<dyn StatusStore>,
        mut inputs: BriefingInputs,
    ) -> Self {
        let scope = BriefingScope::from(identity::keys(&inputs.notams));

        match store.load_statuses(&scope).await {
            Ok(statuses) => inputs.statuses.extend(statuses),
            Err(e) => warn!("Failed to load statuses, starting unread: {}", e),
        }
        match store.load_ignored().await {
            Ok(ignored) => inputs.ignored_keys.extend(ignored),
            Err(e) => warn!("Failed to load ignore list: {}", e),
        }

        let view = engine.compute(&inputs);
        info!(
            "Opened review session with {} notices ({} visible)",
            view.stats.total, view.visible_stats.total
        );

        Self {
            engine,
            store,
            inputs,
            view,
        }
    }

    pub fn view(&self) -> &BriefingView {
        &self.view
    }

    pub fn inputs(&self) -> &BriefingInputs {
        &self.inputs
    }

    pub fn status(&self, key: &IdentityKey) -> UserStatus {
        self.inputs.statuses.get(key).cloned().unwrap_or_default()
    }

    pub fn set_filter(&mut self, filter: FilterState) -> &BriefingView {
        self.inputs.filter = filter;
        self.recompute()
    }

    pub fn set_context(&mut self, context: FlightContext) -> &BriefingView {
        self.inputs.context = context;
        self.recompute()
    }

    /// Swap in a re-imported briefing. Statuses carry over by identity key and
    /// the old briefing's keys become the baseline for new-notice detection.
    pub fn replace_briefing(&mut self, notams: Vec<RawNotam>) -> &BriefingView {
        let previous_keys = identity::keys(&self.inputs.notams);
        let statuses = identity::transfer_statuses(&self.inputs.statuses, &notams);
        let new_count = identity::find_new(&notams, &previous_keys).len();

        info!(
            "Replacing briefing: {} notices, {} new",
            notams.len(),
            new_count
        );

        self.inputs.previous_keys = previous_keys;
        self.inputs.statuses = statuses;
        self.inputs.notams = notams;
        self.recompute()
    }

    pub async fn set_status(
        &mut self,
        key: &IdentityKey,
        state: ReviewState,
    ) -> Result<&BriefingView, SessionError> {
        let status = self.known_status(key)?.with_state(state);
        info!("Marking {} as {}", key, state);
        self.apply_status(key, status).await
    }

    /// Attach a note. A blank note removes the existing one.
    pub async fn add_note(
        &mut self,
        key: &IdentityKey,
        text: &str,
    ) -> Result<&BriefingView, SessionError> {
        let status = self.known_status(key)?.with_note(text);
        info!("Updating note on {}", key);
        self.apply_status(key, status).await
    }

    /// Hide a notice in this and every future briefing
    pub async fn ignore_globally(
        &mut self,
        key: &IdentityKey,
        reason: Option<&str>,
    ) -> Result<&BriefingView, SessionError> {
        self.known_status(key)?;
        info!("Ignoring {} globally", key);

        self.inputs.ignored_keys.insert(key.clone());
        self.recompute();

        let result = self.store.add_ignored(key, reason).await;
        self.persisted(result)
    }

    fn known_status(&self, key: &IdentityKey) -> Result<UserStatus, SessionError> {
        if self.view.find(key).is_none() {
            return Err(SessionError::UnknownNotice(key.clone()));
        }
        Ok(self.status(key))
    }

    async fn apply_status(
        &mut self,
        key: &IdentityKey,
        status: UserStatus,
    ) -> Result<&BriefingView, SessionError> {
        self.inputs.statuses.insert(key.clone(), status.clone());
        self.recompute();

        let result = self.store.save(key, &status).await;
        self.persisted(result)
    }

    fn persisted(&self, result: Result<(), StoreError>) -> Result<&BriefingView, SessionError> {
        match result {
            Ok(()) => Ok(&self.view),
            Err(e) => {
                warn!("Failed to persist status change: {}", e);
                Err(SessionError::Store(e))
            }
        }
    }

    fn recompute(&mut self) -> &BriefingView {
        self.view = self.engine.compute(&self.inputs);
        &self.view
    }
}
