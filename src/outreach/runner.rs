use tracing::{info, warn};
use uuid::Uuid;

use super::{BulkSession, DraftJob, OutreachError};
use crate::{state::AppState, store::Store};

/// Drives a session's drafting queue to completion, one request at a time.
///
/// The store lock is never held across a generator call. Each tick re-checks
/// that the session is still the open one, so tab navigation that dismisses
/// it stops the runner after the in-flight request.
pub struct DraftRunner {
    state: AppState,
    session_id: Uuid,
}

impl DraftRunner {
    pub fn new(state: AppState, session_id: Uuid) -> Self {
        Self { state, session_id }
    }

    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        info!(session_id = %self.session_id, "bulk drafting started");
        loop {
            match self.tick().await {
                Ok(true) => {}
                Ok(false) => break,
                Err(OutreachError::SessionGone) => {
                    info!(session_id = %self.session_id, "bulk session closed; drafting stopped");
                    break;
                }
                Err(err) => {
                    warn!(session_id = %self.session_id, error = %err, "bulk drafting aborted");
                    break;
                }
            }
        }
    }

    /// Runs one draft. Returns `false` once the queue is drained.
    pub async fn tick(&self) -> Result<bool, OutreachError> {
        let job: DraftJob = {
            let mut store = self.state.store.write().await;
            let session = active_session(&mut store, self.session_id)?;
            match session.next_pending() {
                Some(job) => job,
                None => {
                    if session.finish_drafting() {
                        let progress = session.progress();
                        info!(
                            session_id = %self.session_id,
                            completed = progress.completed,
                            total = progress.total,
                            "bulk drafting finished"
                        );
                    }
                    return Ok(false);
                }
            }
        };

        let result = self.state.drafts.try_generate(&job.request).await;

        let mut store = self.state.store.write().await;
        let session = active_session(&mut store, self.session_id)?;
        match result {
            Ok(draft) => session.record_ready(job.index, draft),
            Err(err) => {
                warn!(
                    session_id = %self.session_id,
                    publisher_id = %job.publisher_id,
                    error = %err,
                    "draft failed; continuing with next publisher"
                );
                session.record_failure(job.index, err.to_string());
            }
        }
        Ok(true)
    }
}

fn active_session(store: &mut Store, id: Uuid) -> Result<&mut BulkSession, OutreachError> {
    store
        .bulk_outreach_mut()
        .filter(|session| session.id() == id)
        .ok_or(OutreachError::SessionGone)
}
