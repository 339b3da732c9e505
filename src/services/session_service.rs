//! Live quiz sessions.
//!
//! Each session sits behind its own mutex so transitions never interleave.
//! A timed session owns a [`SessionTimer`]; dropping it (finish, restart,
//! discard) cancels the countdown task, and the task only holds a weak
//! reference, so a discarded session is never kept alive by its timer.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info};
use uuid::Uuid;

use crate::dto::quiz_dto::PublicQuestion;
use crate::dto::session_dto::{ActionResponse, AnswerView, SessionView};
use crate::error::{Error, Result};
use crate::models::result::{ResultSubmission, ResultSummary};
use crate::models::session::{Outcome, SessionError, SessionState, Tick};
use crate::services::catalog_service::CatalogService;
use crate::services::grading_service::GradingService;
use crate::services::recorder_service::ResultSink;

type SharedSession = Arc<Mutex<LiveSession>>;

pub struct LiveSession {
    id: Uuid,
    user_id: Option<Uuid>,
    attempt: u32,
    state: SessionState,
    last_activity: DateTime<Utc>,
    timer: Option<SessionTimer>,
}

impl LiveSession {
    fn authorize(&self, caller: Option<Uuid>) -> Result<()> {
        match self.user_id {
            Some(owner) if caller != Some(owner) => {
                Err(Error::Forbidden("Session belongs to another user".to_string()))
            }
            _ => Ok(()),
        }
    }

    fn submission(&self, summary: &ResultSummary) -> ResultSubmission {
        let quiz = self.state.quiz();
        ResultSubmission {
            subject: quiz.subject.clone(),
            level: quiz.level.to_string(),
            title: quiz.display_title(),
            total_questions: summary.total_questions,
            correct: summary.correct,
            wrong: summary.wrong,
            score_percent: summary.score_percent,
            performance_tier: summary.performance_tier,
            user_id: self.user_id,
            quiz_id: quiz.quiz_id,
        }
    }

    pub fn view(&self) -> SessionView {
        let quiz = self.state.quiz();
        let current = self.state.current_index();
        let answered = self.state.answers().len();
        let question = &quiz.questions[current];
        let current_question =
            if self.state.is_finished() || self.state.answer(current).is_some() {
                PublicQuestion::revealed(current, question)
            } else {
                PublicQuestion::new(current, question)
            };
        SessionView {
            session_id: self.id,
            attempt: self.attempt,
            subject: quiz.subject.clone(),
            level: quiz.level.to_string(),
            title: quiz.display_title(),
            total_questions: quiz.questions.len(),
            current_index: current,
            current_question,
            answers: self
                .state
                .answers()
                .iter()
                .map(|(index, record)| AnswerView {
                    question_index: *index,
                    correct_index: quiz.questions[*index].correct_index,
                    record: *record,
                })
                .collect(),
            answered_count: answered,
            progress_percent: GradingService::score_percent(
                answered as u32,
                quiz.questions.len() as u32,
            ),
            timed: self.state.is_timed(),
            remaining_seconds: self.state.remaining().seconds(),
            finished: self.state.is_finished(),
            summary: self.state.summary().cloned(),
        }
    }
}

/// Countdown task handle. Dropping it cancels the task.
pub struct SessionTimer {
    _guard: DropGuard,
}

impl SessionTimer {
    fn spawn(session: Weak<Mutex<LiveSession>>, sink: Arc<dyn ResultSink>) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // first tick completes immediately
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = interval.tick() => {}
                }
                let Some(session) = session.upgrade() else {
                    break;
                };
                let mut live = session.lock().await;
                // a finish or restart won the race for the lock
                if cancelled.is_cancelled() {
                    break;
                }
                match live.state.tick() {
                    Tick::Running(_) => {}
                    Tick::Expired(summary) => {
                        info!(
                            session_id = %live.id,
                            score = summary.score_percent,
                            "Session time expired"
                        );
                        let submission = live.submission(&summary);
                        live.timer = None;
                        drop(live);
                        sink.dispatch(submission);
                        break;
                    }
                    Tick::Stale | Tick::Untimed => break,
                }
            }
        });

        Self {
            _guard: token.drop_guard(),
        }
    }
}

#[derive(Clone)]
pub struct SessionService {
    sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
    catalog: CatalogService,
    sink: Arc<dyn ResultSink>,
}

impl SessionService {
    pub fn new(catalog: CatalogService, sink: Arc<dyn ResultSink>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            catalog,
            sink,
        }
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    pub async fn start(&self, subject: &str, level: &str, user_id: Option<Uuid>) -> Result<SessionView> {
        let quiz = self
            .catalog
            .get_quiz(subject, level)
            .await?
            .ok_or_else(|| SessionError::NoQuestionsAvailable {
                subject: subject.to_string(),
                level: level.to_string(),
            })?;
        let state = SessionState::start(quiz)?;

        let id = Uuid::new_v4();
        let timed = state.is_timed();
        let session = Arc::new(Mutex::new(LiveSession {
            id,
            user_id,
            attempt: 1,
            state,
            last_activity: Utc::now(),
            timer: None,
        }));

        let view = {
            let mut live = session.lock().await;
            if timed {
                live.timer = Some(SessionTimer::spawn(
                    Arc::downgrade(&session),
                    Arc::clone(&self.sink),
                ));
            }
            live.view()
        };
        self.sessions.write().await.insert(id, session);

        info!(
            session_id = %id,
            subject = %view.subject,
            level = %view.level,
            questions = view.total_questions,
            timed,
            "Session started"
        );
        Ok(view)
    }

    async fn lookup(&self, id: Uuid) -> Result<SharedSession> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Session {} not found", id)))
    }

    async fn with_session<T>(
        &self,
        id: Uuid,
        caller: Option<Uuid>,
        f: impl FnOnce(&mut LiveSession) -> Result<T>,
    ) -> Result<T> {
        let session = self.lookup(id).await?;
        let mut live = session.lock().await;
        live.authorize(caller)?;
        live.last_activity = Utc::now();
        f(&mut live)
    }

    pub async fn get(&self, id: Uuid, caller: Option<Uuid>) -> Result<SessionView> {
        self.with_session(id, caller, |live| Ok(live.view())).await
    }

    pub async fn select_answer(
        &self,
        id: Uuid,
        caller: Option<Uuid>,
        question_index: usize,
        option_index: usize,
    ) -> Result<ActionResponse> {
        self.with_session(id, caller, |live| {
            let outcome = live.state.select_answer(question_index, option_index)?;
            debug!(session_id = %id, question_index, option_index, ?outcome, "Answer submitted");
            Ok(ActionResponse {
                outcome,
                session: live.view(),
            })
        })
        .await
    }

    pub async fn skip(
        &self,
        id: Uuid,
        caller: Option<Uuid>,
        question_index: usize,
    ) -> Result<ActionResponse> {
        self.with_session(id, caller, |live| {
            let outcome = live.state.skip(question_index)?;
            Ok(ActionResponse {
                outcome,
                session: live.view(),
            })
        })
        .await
    }

    pub async fn go_to(&self, id: Uuid, caller: Option<Uuid>, index: usize) -> Result<ActionResponse> {
        self.navigate(id, caller, |state| state.go_to(index)).await
    }

    pub async fn next(&self, id: Uuid, caller: Option<Uuid>) -> Result<ActionResponse> {
        self.navigate(id, caller, SessionState::next).await
    }

    pub async fn previous(&self, id: Uuid, caller: Option<Uuid>) -> Result<ActionResponse> {
        self.navigate(id, caller, SessionState::previous).await
    }

    async fn navigate(
        &self,
        id: Uuid,
        caller: Option<Uuid>,
        step: impl FnOnce(&mut SessionState) -> Outcome,
    ) -> Result<ActionResponse> {
        self.with_session(id, caller, |live| {
            let outcome = step(&mut live.state);
            Ok(ActionResponse {
                outcome,
                session: live.view(),
            })
        })
        .await
    }

    /// Finishes the session. Only the call that actually finishes it
    /// dispatches the result; later calls return the same summary.
    pub async fn finish(&self, id: Uuid, caller: Option<Uuid>) -> Result<ResultSummary> {
        let sink = Arc::clone(&self.sink);
        self.with_session(id, caller, move |live| {
            if let Some(summary) = live.state.summary() {
                return Ok(summary.clone());
            }
            let summary = live.state.finish();
            live.timer = None;
            info!(
                session_id = %live.id,
                correct = summary.correct,
                total = summary.total_questions,
                score = summary.score_percent,
                "Session finished"
            );
            sink.dispatch(live.submission(&summary));
            Ok(summary)
        })
        .await
    }

    pub async fn restart(&self, id: Uuid, caller: Option<Uuid>) -> Result<SessionView> {
        let session = self.lookup(id).await?;
        let mut live = session.lock().await;
        live.authorize(caller)?;

        live.timer = None;
        live.state = live.state.restart();
        live.attempt += 1;
        live.last_activity = Utc::now();
        if live.state.is_timed() {
            live.timer = Some(SessionTimer::spawn(
                Arc::downgrade(&session),
                Arc::clone(&self.sink),
            ));
        }
        info!(session_id = %id, attempt = live.attempt, "Session restarted");
        Ok(live.view())
    }

    pub async fn discard(&self, id: Uuid, caller: Option<Uuid>) -> Result<()> {
        let session = self.lookup(id).await?;
        session.lock().await.authorize(caller)?;
        if let Some(session) = self.sessions.write().await.remove(&id) {
            session.lock().await.timer = None;
        }
        debug!(session_id = %id, "Session discarded");
        Ok(())
    }

    /// Drops sessions with no user activity for `max_idle`. Sessions that
    /// are busy right now are left for the next sweep.
    pub async fn reap_idle(&self, max_idle: chrono::Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_lock() {
            Ok(mut live) if live.last_activity < cutoff => {
                live.timer = None;
                false
            }
            _ => true,
        });
        before - sessions.len()
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quiz::{Level, Question, QuizDefinition};
    use crate::models::result::PerformanceTier;
    use crate::models::session::IgnoreReason;
    use crate::services::recorder_service::MockResultSink;

    fn catalog(duration_seconds: Option<u32>) -> CatalogService {
        CatalogService::new(vec![
            QuizDefinition {
                quiz_id: None,
                subject: "js".into(),
                level: Level::Basic,
                title: Some("JavaScript Level 1".into()),
                duration_seconds,
                questions: vec![
                    Question {
                        text: "typeof null?".into(),
                        options: vec!["null".into(), "object".into()],
                        correct_index: 1,
                    },
                    Question {
                        text: "Strict equality?".into(),
                        options: vec!["==".into(), "===".into()],
                        correct_index: 1,
                    },
                ],
            },
            QuizDefinition {
                quiz_id: None,
                subject: "js".into(),
                level: Level::Advanced,
                title: None,
                duration_seconds: None,
                questions: vec![],
            },
        ])
    }

    fn sink_expecting(times: usize) -> Arc<MockResultSink> {
        let mut sink = MockResultSink::new();
        sink.expect_dispatch().times(times).return_const(());
        Arc::new(sink)
    }

    #[tokio::test]
    async fn missing_or_empty_quiz_creates_no_session() {
        let service = SessionService::new(catalog(None), sink_expecting(0));
        let err = service.start("cobol", "basic", None).await.unwrap_err();
        assert!(matches!(err, Error::Session(SessionError::NoQuestionsAvailable { .. })));
        let err = service.start("js", "advanced", None).await.unwrap_err();
        assert!(matches!(err, Error::Session(SessionError::NoQuestionsAvailable { .. })));
        assert_eq!(service.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn finish_dispatches_once() {
        let user = Uuid::new_v4();
        let mut sink = MockResultSink::new();
        sink.expect_dispatch()
            .withf(move |s| s.correct == 1 && s.wrong == 1 && s.user_id == Some(user))
            .times(1)
            .return_const(());
        let service = SessionService::new(catalog(None), Arc::new(sink));

        let view = service.start("js", "basic", Some(user)).await.unwrap();
        service
            .select_answer(view.session_id, Some(user), 0, 1)
            .await
            .unwrap();
        let first = service.finish(view.session_id, Some(user)).await.unwrap();
        let second = service.finish(view.session_id, Some(user)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.score_percent, 50);
        assert_eq!(first.performance_tier, PerformanceTier::Average);
    }

    #[tokio::test]
    async fn other_users_cannot_touch_an_owned_session() {
        let owner = Uuid::new_v4();
        let service = SessionService::new(catalog(None), sink_expecting(0));
        let view = service.start("js", "basic", Some(owner)).await.unwrap();

        let err = service.get(view.session_id, None).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
        let err = service
            .select_answer(view.session_id, Some(Uuid::new_v4()), 0, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn timer_expiry_finishes_and_dispatches() {
        let service = SessionService::new(catalog(Some(2)), sink_expecting(1));
        let view = service.start("js", "basic", None).await.unwrap();
        service.select_answer(view.session_id, None, 1, 1).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;
        let mid = service.get(view.session_id, None).await.unwrap();
        assert_eq!(mid.remaining_seconds, Some(1));
        assert!(!mid.finished);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        let done = service.get(view.session_id, None).await.unwrap();
        assert!(done.finished);
        assert_eq!(done.remaining_seconds, Some(0));
        let summary = done.summary.unwrap();
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.skipped, 1);

        // nothing left to resurrect the session
        tokio::time::sleep(Duration::from_secs(5)).await;
        let later = service.get(view.session_id, None).await.unwrap();
        assert_eq!(later.summary, Some(summary));
    }

    #[tokio::test(start_paused = true)]
    async fn user_finish_stops_the_timer() {
        let service = SessionService::new(catalog(Some(3)), sink_expecting(1));
        let view = service.start("js", "basic", None).await.unwrap();
        let summary = service.finish(view.session_id, None).await.unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;
        let after = service.get(view.session_id, None).await.unwrap();
        assert_eq!(after.remaining_seconds, Some(3));
        assert_eq!(after.summary, Some(summary));
        let outcome = service.skip(view.session_id, None, 0).await.unwrap().outcome;
        assert_eq!(outcome, Outcome::Ignored(IgnoreReason::SessionFinished));
    }

    #[tokio::test(start_paused = true)]
    async fn restart_resets_clock_and_answers() {
        let service = SessionService::new(catalog(Some(30)), sink_expecting(1));
        let view = service.start("js", "basic", None).await.unwrap();
        service.select_answer(view.session_id, None, 0, 0).await.unwrap();
        service.go_to(view.session_id, None, 1).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5500)).await;
        service.finish(view.session_id, None).await.unwrap();

        let fresh = service.restart(view.session_id, None).await.unwrap();
        assert_eq!(fresh.attempt, 2);
        assert!(fresh.answers.is_empty());
        assert_eq!(fresh.current_index, 0);
        assert_eq!(fresh.remaining_seconds, Some(30));
        assert!(!fresh.finished);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let ticking = service.get(view.session_id, None).await.unwrap();
        assert_eq!(ticking.remaining_seconds, Some(28));
    }

    #[tokio::test(start_paused = true)]
    async fn discard_cancels_the_timer() {
        let service = SessionService::new(catalog(Some(1)), sink_expecting(0));
        let view = service.start("js", "basic", None).await.unwrap();
        service.discard(view.session_id, None).await.unwrap();

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(matches!(
            service.get(view.session_id, None).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn reaper_removes_idle_sessions() {
        let service = SessionService::new(catalog(None), sink_expecting(0));
        service.start("js", "basic", None).await.unwrap();
        assert_eq!(service.reap_idle(chrono::Duration::minutes(5)).await, 0);
        assert_eq!(service.reap_idle(chrono::Duration::seconds(-1)).await, 1);
        assert_eq!(service.active_sessions().await, 0);
    }
}
