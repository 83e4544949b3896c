//! Profile card store.
//!
//! One store per session, passed to whoever opens cards. State is published
//! through a `watch` channel.

use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::{PersonaApi, PersonaCard, PersonaId};

/// Observable profile card state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileCardState {
    pub is_open: bool,
    pub is_loading: bool,
    pub active_persona_id: Option<PersonaId>,
    pub card: Option<PersonaCard>,
}

pub struct ProfileCardStore {
    api: Arc<dyn PersonaApi>,
    state: watch::Sender<ProfileCardState>,
}

impl ProfileCardStore {
    pub fn new(api: Arc<dyn PersonaApi>) -> Self {
        let (state, _) = watch::channel(ProfileCardState::default());
        Self { api, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProfileCardState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ProfileCardState {
        self.state.borrow().clone()
    }

    /// Open the card for a persona and load its data.
    ///
    /// Blank ids are ignored. Fetch failures are logged and leave the card
    /// open without data. A response arriving after another persona was
    /// opened (or the card closed) is discarded.
    pub async fn open(&self, persona_id: &str) {
        let Ok(persona_id) = PersonaId::new(persona_id.to_string()) else {
            return;
        };
        tracing::debug!(%persona_id, "Opening profile card");

        self.state.send_modify(|state| {
            state.active_persona_id = Some(persona_id.clone());
            state.is_open = true;
            state.is_loading = true;
            state.card = None;
        });

        let result = self.api.fetch_persona(&persona_id).await;

        self.state.send_modify(|state| {
            if state.active_persona_id.as_ref() != Some(&persona_id) {
                tracing::debug!(%persona_id, "Discarding stale profile card response");
                return;
            }
            match result {
                Ok(card) => state.card = Some(card),
                Err(e) => tracing::error!("Failed to fetch persona card '{}': {}", persona_id, e),
            }
            state.is_loading = false;
        });
    }

    pub fn close(&self) {
        self.state.send_modify(|state| {
            state.is_open = false;
            state.is_loading = false;
            state.active_persona_id = None;
        });
    }
}
