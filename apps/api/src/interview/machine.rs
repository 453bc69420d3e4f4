//! Interview state machine.
//!
//! `transition` is pure: it takes the current session (or `None` when idle) and one
//! event, and returns the next session plus the effects the transport must carry out.
//! `InterviewEngine` binds it to a `SessionStore` and the follow-up provider.
//!
//! ```text
//! Idle ──start──▶ AwaitingAnswer ──answer──▶ (score) ──┬─▶ AwaitingFollowUp ──follow_up──▶ AwaitingAnswer
//!                                                      └─▶ Concluded (session removed)
//! any ──disconnect──▶ Idle
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::interview::follow_up::{FollowUpProvider, GenerationError};
use crate::interview::question_bank::Role;
use crate::interview::scorer::{score_answer, InterviewResult};
use crate::interview::session::{InterviewSession, Phase, SessionKey, SessionStore};

pub const UNKNOWN_ROLE_MESSAGE: &str =
    "No questions found for this role. Please choose a valid one.";

#[derive(Debug, Clone, PartialEq)]
pub enum InterviewEvent {
    Start {
        role: String,
    },
    Answer {
        text: String,
    },
    /// Outcome of a `RequestFollowUp` effect for the given turn.
    FollowUp {
        turn_index: usize,
        result: Result<String, GenerationError>,
    },
    Disconnect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUpRequest {
    pub role: Role,
    pub prior_answer: String,
    pub turn_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send a message (question or clarification) to the candidate.
    Say(String),
    /// The interview finished; the session is already gone.
    Conclude(InterviewResult),
    /// Fetch the next question and feed it back as `InterviewEvent::FollowUp`.
    RequestFollowUp(FollowUpRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: Option<InterviewSession>,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged(state: Option<InterviewSession>) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    fn to(state: Option<InterviewSession>, effect: Effect) -> Self {
        Self {
            state,
            effects: vec![effect],
        }
    }
}

pub fn transition(
    key: SessionKey,
    state: Option<InterviewSession>,
    event: InterviewEvent,
    now: DateTime<Utc>,
) -> Transition {
    match (state, event) {
        (_, InterviewEvent::Disconnect) => Transition::unchanged(None),

        (None, InterviewEvent::Start { role }) => match Role::parse(&role) {
            Ok(role) => {
                let session = InterviewSession::new(key, role, now);
                let first = session
                    .current_question()
                    .map(str::to_string)
                    .unwrap_or_else(|| FollowUpProvider::fallback(role, 0));
                Transition::to(Some(session), Effect::Say(first))
            }
            Err(_) => Transition::to(None, Effect::Say(UNKNOWN_ROLE_MESSAGE.to_string())),
        },

        (Some(session), InterviewEvent::Answer { text })
            if session.phase == Phase::AwaitingAnswer =>
        {
            if text.trim().is_empty() {
                return Transition::unchanged(Some(session));
            }
            answer(session, text, now)
        }

        (Some(mut session), InterviewEvent::FollowUp { turn_index, result })
            if session.phase == Phase::AwaitingFollowUp && session.current_index == turn_index =>
        {
            let question = match result {
                Ok(question) => question,
                Err(_) => FollowUpProvider::fallback(session.role, turn_index),
            };
            session.phase = Phase::AwaitingAnswer;
            session.last_activity = now;
            Transition::to(Some(session), Effect::Say(question))
        }

        // Start while a session exists, answers while idle or mid-follow-up, and
        // follow-ups for a gone or already-advanced session have no effect.
        (state, _) => Transition::unchanged(state),
    }
}

fn answer(mut session: InterviewSession, text: String, now: DateTime<Utc>) -> Transition {
    let Some(question) = session.current_question() else {
        return Transition::unchanged(Some(session));
    };

    let score = score_answer(question, &text);
    session.answer_history.push(text);
    session.cumulative_score += score;
    session.current_index += 1;
    session.last_activity = now;

    if session.is_complete() {
        let result =
            InterviewResult::from_totals(session.cumulative_score, session.role.question_count());
        return Transition::to(None, Effect::Conclude(result));
    }

    session.phase = Phase::AwaitingFollowUp;
    let request = FollowUpRequest {
        role: session.role,
        prior_answer: session
            .answer_history
            .last()
            .cloned()
            .unwrap_or_default(),
        turn_index: session.current_index,
    };
    Transition::to(Some(session), Effect::RequestFollowUp(request))
}

/// Runs transitions against a session store. Cheap to clone.
#[derive(Clone)]
pub struct InterviewEngine {
    store: Arc<SessionStore>,
    follow_ups: Arc<FollowUpProvider>,
}

impl InterviewEngine {
    pub fn new(store: Arc<SessionStore>, follow_ups: Arc<FollowUpProvider>) -> Self {
        Self { store, follow_ups }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn follow_ups(&self) -> &FollowUpProvider {
        &self.follow_ups
    }

    /// Loads the session for `key`, applies `event` and writes the result back.
    pub fn apply(&self, key: SessionKey, event: InterviewEvent) -> Vec<Effect> {
        if matches!(event, InterviewEvent::Disconnect) {
            if self.store.delete(key).is_some() {
                debug!(%key, "Interview session removed on disconnect");
            }
            return Vec::new();
        }

        let effects = self.store.update(key, |current| {
            let Transition { state, effects } = transition(key, current, event, Utc::now());
            (state, effects)
        });

        debug!(%key, ?effects, "Interview transition applied");
        effects
    }

    /// Executes a `RequestFollowUp` effect. Failures are logged, never propagated
    /// to the candidate; the state machine falls back on `Err`.
    pub async fn follow_up(&self, request: &FollowUpRequest) -> Result<String, GenerationError> {
        let result = self
            .follow_ups
            .generate(request.role, &request.prior_answer)
            .await;

        if let Err(e) = &result {
            match e {
                GenerationError::NotConfigured => {
                    debug!(role = %request.role, "No follow-up generator, using question bank")
                }
                _ => warn!(
                    role = %request.role,
                    turn_index = request.turn_index,
                    "Follow-up generation failed, using question bank: {e}"
                ),
            }
        }
        result
    }

    /// Runs one follow-up request to completion and feeds its outcome back in.
    pub async fn resolve_follow_up(&self, key: SessionKey, request: FollowUpRequest) -> Vec<Effect> {
        let result = self.follow_up(&request).await;
        self.apply(
            key,
            InterviewEvent::FollowUp {
                turn_index: request.turn_index,
                result,
            },
        )
    }

    /// Like `resolve_follow_up`, but on its own task: the `FollowUp` event still lands
    /// if the caller is dropped mid-generation, so the session cannot stay pending.
    pub async fn resolve_follow_up_detached(
        &self,
        key: SessionKey,
        request: FollowUpRequest,
    ) -> Result<Vec<Effect>, tokio::task::JoinError> {
        let engine = self.clone();
        tokio::spawn(async move { engine.resolve_follow_up(key, request).await }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::follow_up::tests::{FailingGenerator, FixedGenerator, HangingGenerator};
    use crate::interview::follow_up::QuestionGenerator;
    use crate::interview::scorer::FeedbackTier;
    use std::time::Duration;
    use uuid::Uuid;

    fn start(role: &str) -> InterviewEvent {
        InterviewEvent::Start {
            role: role.to_string(),
        }
    }

    fn answer_event(text: &str) -> InterviewEvent {
        InterviewEvent::Answer {
            text: text.to_string(),
        }
    }

    fn follow_up_failed(turn_index: usize) -> InterviewEvent {
        InterviewEvent::FollowUp {
            turn_index,
            result: Err(GenerationError::Timeout(Duration::from_secs(8))),
        }
    }

    fn started(role: &str) -> (SessionKey, InterviewSession) {
        let key = Uuid::new_v4();
        let t = transition(key, None, start(role), Utc::now());
        (key, t.state.expect("session should start"))
    }

    fn engine(generator: Option<Arc<dyn QuestionGenerator>>) -> InterviewEngine {
        InterviewEngine::new(
            Arc::new(SessionStore::new()),
            Arc::new(FollowUpProvider::new(generator, Duration::from_secs(8))),
        )
    }

    /// Drives a full engine turn, resolving any follow-up request.
    async fn turn(engine: &InterviewEngine, key: SessionKey, event: InterviewEvent) -> Vec<Effect> {
        let mut out = Vec::new();
        for effect in engine.apply(key, event) {
            match effect {
                Effect::RequestFollowUp(request) => {
                    out.extend(engine.resolve_follow_up(key, request).await)
                }
                other => out.push(other),
            }
        }
        out
    }

    #[test]
    fn test_start_emits_first_question() {
        let key = Uuid::new_v4();
        let t = transition(key, None, start("software engineer"), Utc::now());
        let session = t.state.unwrap();

        assert_eq!(session.key, key);
        assert_eq!(session.role, Role::SoftwareEngineer);
        assert_eq!(
            t.effects,
            vec![Effect::Say(Role::SoftwareEngineer.questions()[0].to_string())]
        );
    }

    #[test]
    fn test_start_with_unknown_role_creates_nothing() {
        let t = transition(Uuid::new_v4(), None, start("unknown role"), Utc::now());
        assert!(t.state.is_none());
        assert_eq!(t.effects, vec![Effect::Say(UNKNOWN_ROLE_MESSAGE.to_string())]);
    }

    #[test]
    fn test_mixed_case_role_resolves() {
        let (_, a) = started("Data Analyst");
        let (_, b) = started("data analyst");
        assert_eq!(a.role, b.role);
        assert_eq!(a.current_question(), b.current_question());
    }

    #[test]
    fn test_start_while_active_is_ignored() {
        let (key, session) = started("hr recruiter");
        let t = transition(key, Some(session.clone()), start("data analyst"), Utc::now());
        assert_eq!(t.state, Some(session));
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_answer_while_idle_is_ignored() {
        let t = transition(Uuid::new_v4(), None, answer_event("hello"), Utc::now());
        assert!(t.state.is_none());
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_blank_answer_is_ignored() {
        let (key, session) = started("data analyst");
        for blank in ["", "   ", "\n\t"] {
            let t = transition(key, Some(session.clone()), answer_event(blank), Utc::now());
            assert_eq!(t.state.as_ref(), Some(&session));
            assert!(t.effects.is_empty());
        }
    }

    #[test]
    fn test_answer_scores_and_requests_follow_up() {
        let (key, session) = started("software engineer");
        let q0 = Role::SoftwareEngineer.questions()[0];

        let t = transition(key, Some(session), answer_event(q0), Utc::now());
        let session = t.state.unwrap();

        assert_eq!(session.current_index, 1);
        assert_eq!(session.cumulative_score, 10);
        assert_eq!(session.answer_history, vec![q0.to_string()]);
        assert_eq!(session.phase, Phase::AwaitingFollowUp);
        assert_eq!(
            t.effects,
            vec![Effect::RequestFollowUp(FollowUpRequest {
                role: Role::SoftwareEngineer,
                prior_answer: q0.to_string(),
                turn_index: 1,
            })]
        );
    }

    #[test]
    fn test_answer_while_awaiting_follow_up_is_ignored() {
        let (key, session) = started("software engineer");
        let t = transition(key, Some(session), answer_event("first"), Utc::now());
        let pending = t.state.unwrap();

        let t = transition(key, Some(pending.clone()), answer_event("second"), Utc::now());
        assert_eq!(t.state, Some(pending));
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_generated_follow_up_is_emitted() {
        let (key, session) = started("hr recruiter");
        let pending = transition(key, Some(session), answer_event("I use LinkedIn"), Utc::now())
            .state
            .unwrap();

        let t = transition(
            key,
            Some(pending),
            InterviewEvent::FollowUp {
                turn_index: 1,
                result: Ok("Which LinkedIn filters work best for you?".to_string()),
            },
            Utc::now(),
        );
        assert_eq!(t.state.unwrap().phase, Phase::AwaitingAnswer);
        assert_eq!(
            t.effects,
            vec![Effect::Say(
                "Which LinkedIn filters work best for you?".to_string()
            )]
        );
    }

    #[test]
    fn test_failed_follow_up_uses_bank_question_for_turn() {
        let (key, session) = started("data analyst");
        let pending = transition(key, Some(session), answer_event("Tableau"), Utc::now())
            .state
            .unwrap();

        let t = transition(key, Some(pending), follow_up_failed(1), Utc::now());
        assert_eq!(
            t.effects,
            vec![Effect::Say(Role::DataAnalyst.questions()[1].to_string())]
        );
    }

    #[test]
    fn test_stale_or_orphaned_follow_up_is_discarded() {
        let key = Uuid::new_v4();
        let t = transition(key, None, follow_up_failed(1), Utc::now());
        assert!(t.state.is_none());
        assert!(t.effects.is_empty());

        let (key, session) = started("data analyst");
        let t = transition(key, Some(session.clone()), follow_up_failed(1), Utc::now());
        assert_eq!(t.state, Some(session));
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_disconnect_clears_any_state() {
        let (key, session) = started("data analyst");
        let t = transition(key, Some(session), InterviewEvent::Disconnect, Utc::now());
        assert!(t.state.is_none());
        assert!(t.effects.is_empty());

        let t = transition(key, None, InterviewEvent::Disconnect, Utc::now());
        assert!(t.state.is_none());
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_progress_is_monotonic() {
        let (key, mut session) = started("hr recruiter");
        let count = Role::HrRecruiter.question_count();

        for n in 1..count {
            let t = transition(key, Some(session), answer_event("an answer"), Utc::now());
            let pending = t.state.unwrap();
            assert_eq!(pending.current_index, n);
            assert_eq!(pending.answer_history.len(), n);

            session = transition(key, Some(pending), follow_up_failed(n), Utc::now())
                .state
                .unwrap();
        }
    }

    #[test]
    fn test_low_effort_interview_needs_improvement() {
        let (key, mut session) = started("hr recruiter");
        let count = Role::HrRecruiter.question_count();
        let mut conclusion = None;

        for n in 1..=count {
            let t = transition(key, Some(session.clone()), answer_event("ok"), Utc::now());
            if let [Effect::Conclude(result)] = t.effects.as_slice() {
                conclusion = Some(result.clone());
            }
            match t.state {
                Some(pending) => {
                    session = transition(key, Some(pending), follow_up_failed(n), Utc::now())
                        .state
                        .unwrap()
                }
                None => assert_eq!(n, count),
            }
        }

        // 5 × floor score 4 = 20 / 50 → 40%
        let result = conclusion.expect("interview should conclude");
        assert_eq!(result.score, 40);
        assert_eq!(result.tier, FeedbackTier::NeedsImprovement);
    }

    #[tokio::test]
    async fn test_end_to_end_perfect_software_engineer_interview() {
        let engine = engine(Some(Arc::new(FailingGenerator)));
        let key = Uuid::new_v4();
        let questions = Role::SoftwareEngineer.questions();

        assert_eq!(
            turn(&engine, key, start("software engineer")).await,
            vec![Effect::Say(questions[0].to_string())]
        );

        for (i, question) in questions.iter().enumerate() {
            let effects = turn(&engine, key, answer_event(question)).await;
            if i + 1 < questions.len() {
                assert_eq!(effects, vec![Effect::Say(questions[i + 1].to_string())]);
                let session = engine.store().get(key).unwrap();
                assert_eq!(session.current_index, i + 1);
                assert_eq!(session.cumulative_score, 10 * (i as u32 + 1));
            } else {
                match effects.as_slice() {
                    [Effect::Conclude(result)] => {
                        assert_eq!(result.score, 100);
                        assert_eq!(result.tier, FeedbackTier::Excellent);
                        assert!(result.message.contains("100"));
                        assert!(result.message.contains(FeedbackTier::Excellent.message()));
                    }
                    other => panic!("expected a conclusion, got {other:?}"),
                }
            }
        }

        assert!(engine.store().get(key).is_none());
        assert!(turn(&engine, key, answer_event("one more")).await.is_empty());
    }

    #[tokio::test]
    async fn test_engine_uses_generated_follow_up() {
        let engine = engine(Some(Arc::new(FixedGenerator("What was the hardest bug?"))));
        let key = Uuid::new_v4();

        turn(&engine, key, start("software engineer")).await;
        let effects = turn(&engine, key, answer_event("I built a scheduler")).await;

        assert_eq!(
            effects,
            vec![Effect::Say("What was the hardest bug?".to_string())]
        );
        assert_eq!(engine.store().get(key).unwrap().phase, Phase::AwaitingAnswer);
    }

    #[tokio::test(start_paused = true)]
    async fn test_engine_timeout_falls_back_to_bank() {
        let engine = engine(Some(Arc::new(HangingGenerator)));
        let key = Uuid::new_v4();

        turn(&engine, key, start("data analyst")).await;
        let effects = turn(&engine, key, answer_event("Power BI")).await;

        assert_eq!(
            effects,
            vec![Effect::Say(Role::DataAnalyst.questions()[1].to_string())]
        );
    }

    #[tokio::test]
    async fn test_follow_up_after_disconnect_is_silent_noop() {
        let engine = engine(None);
        let key = Uuid::new_v4();

        turn(&engine, key, start("data analyst")).await;
        let request = match engine.apply(key, answer_event("pandas")).as_slice() {
            [Effect::RequestFollowUp(request)] => request.clone(),
            other => panic!("expected a follow-up request, got {other:?}"),
        };

        engine.apply(key, InterviewEvent::Disconnect);
        assert!(engine.resolve_follow_up(key, request).await.is_empty());
        assert!(engine.store().get(key).is_none());
    }

    #[test]
    fn test_double_disconnect_leaves_store_unchanged() {
        let engine = engine(None);
        let other = Uuid::new_v4();
        engine.apply(other, start("hr recruiter"));

        let key = Uuid::new_v4();
        assert!(engine.apply(key, InterviewEvent::Disconnect).is_empty());
        assert!(engine.apply(key, InterviewEvent::Disconnect).is_empty());
        assert_eq!(engine.store().len(), 1);
        assert!(engine.store().get(other).is_some());
    }
}
