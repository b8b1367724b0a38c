//! Application state: the shared question bank and settings, plus the in-memory
//! session registry.
//!
//! Each session sits behind its own mutex so its transitions are serialized; the
//! registry lock is only held long enough to look a session up, insert or remove it.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, RwLock};
use tracing::{info, instrument};

use crate::config::{load_quiz_config_from_env, Pacing, QuizConfig, QuizSettings};
use crate::error::ConfigError;
use crate::repository::QuestionBank;
use crate::selector::RandomChooser;
use crate::session::Session;

pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Clone)]
pub struct AppState {
    pub bank: Arc<QuestionBank>,
    pub settings: Arc<QuizSettings>,
    pub pacing: Pacing,
    sessions: Arc<RwLock<HashMap<String, SessionHandle>>>,
}

impl AppState {
    /// Build state from env: load config, merge configured questions with the seeds, validate.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Result<Self, ConfigError> {
        let cfg = load_quiz_config_from_env()?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: QuizConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let settings = cfg.settings();
        let bank = QuestionBank::with_seeds(cfg.questions, settings.quiz.default_field)?;
        info!(
            target: "iqfield_backend",
            questions = bank.question_count(),
            session_length = settings.quiz.session_length,
            default_field = %settings.quiz.default_field,
            "Question bank ready"
        );
        Ok(Self {
            bank: Arc::new(bank),
            settings: Arc::new(settings),
            pacing: cfg.pacing,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Create and register a new session. Returns its id and handle.
    #[instrument(level = "debug", skip(self))]
    pub async fn create_session(&self, user_id: Option<String>) -> (String, SessionHandle) {
        let session = Session::new(
            self.bank.clone(),
            self.settings.clone(),
            Box::new(RandomChooser::from_entropy()),
            user_id,
        );
        let id = session.id().to_string();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id.clone(), handle.clone());
        info!(target: "quiz", session_id = %id, "Session created");
        (id, handle)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_session(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Remove a session from the registry. Returns false when it did not exist.
    #[instrument(level = "debug", skip(self))]
    pub async fn remove_session(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            info!(target: "quiz", session_id = %id, "Session removed");
        }
        removed
    }

    /// A reset assigns a new session id; move the registry entry along with it.
    /// A session deleted in the meantime stays deleted.
    #[instrument(level = "debug", skip(self, handle))]
    pub async fn rekey_session(&self, old_id: &str, new_id: &str, handle: SessionHandle) {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(old_id).is_some() {
            sessions.insert(new_id.to_string(), handle);
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::from_config(QuizConfig::default()).expect("default config is valid")
    }

    #[tokio::test]
    async fn sessions_can_be_created_found_and_removed() {
        let st = state();
        let (id, handle) = st.create_session(Some("u".into())).await;
        assert_eq!(handle.lock().await.id(), id);
        assert!(st.get_session(&id).await.is_some());
        assert_eq!(st.session_count().await, 1);
        assert!(st.remove_session(&id).await);
        assert!(!st.remove_session(&id).await);
        assert!(st.get_session(&id).await.is_none());
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let st = state();
        let (_, a) = st.create_session(None).await;
        let (_, b) = st.create_session(None).await;
        a.lock().await.select_field(crate::domain::Field::Math).unwrap();
        assert!(b.lock().await.state().selected_field.is_none());
    }

    #[tokio::test]
    async fn rekey_moves_the_entry() {
        let st = state();
        let (id, handle) = st.create_session(None).await;
        st.rekey_session(&id, "new", handle.clone()).await;
        assert!(st.get_session(&id).await.is_none());
        assert!(st.get_session("new").await.is_some());

        assert!(st.remove_session("new").await);
        st.rekey_session("new", "newer", handle).await;
        assert_eq!(st.session_count().await, 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = QuizConfig::default();
        cfg.quiz.default_field = crate::domain::Field::Math;
        cfg.quiz.session_length = 0;
        assert!(matches!(AppState::from_config(cfg), Err(ConfigError::InvalidSettings(_))));
    }
}
