use std::sync::Arc;

use crate::config::Config;
use crate::copilot::job_description::{JobDescriptionDrafter, JobDescriptionWriter};
use crate::interview::follow_up::{FollowUpProvider, QuestionGenerator};
use crate::interview::machine::InterviewEngine;
use crate::interview::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Live interviews, keyed by WebSocket connection id.
    pub interviews: InterviewEngine,
    /// Chat interviews, keyed by server-issued interview id. Evicted when idle.
    pub chat_interviews: InterviewEngine,
    pub copilot: Arc<JobDescriptionDrafter>,
}

impl AppState {
    /// Both transports share one follow-up provider but keep separate session stores.
    pub fn new(
        config: Config,
        generator: Option<Arc<dyn QuestionGenerator>>,
        writer: Option<Arc<dyn JobDescriptionWriter>>,
    ) -> Self {
        let follow_ups = Arc::new(FollowUpProvider::new(generator, config.follow_up_timeout));
        Self {
            interviews: InterviewEngine::new(Arc::new(SessionStore::new()), follow_ups.clone()),
            chat_interviews: InterviewEngine::new(Arc::new(SessionStore::new()), follow_ups),
            copilot: Arc::new(JobDescriptionDrafter::new(writer, config.job_description_timeout)),
            config,
        }
    }

    #[cfg(test)]
    pub fn for_testing(generator: Option<Arc<dyn QuestionGenerator>>) -> Self {
        Self::new(Config::for_testing(), generator, None)
    }

    #[cfg(test)]
    pub fn with_job_description_writer(mut self, writer: Option<Arc<dyn JobDescriptionWriter>>) -> Self {
        self.copilot = Arc::new(JobDescriptionDrafter::new(
            writer,
            self.config.job_description_timeout,
        ));
        self
    }
}
