use crate::config::Config;
use crate::library::logger::interface::Logger;
use crate::prediction_page::core::{init, transition, Effect, Event, Session};
use crate::prediction_page::render::PageView;
use crate::prediction_page::run_effect::RunEffect;
use std::collections::VecDeque;
use std::sync::Arc;

/// One user's page: owns the session and applies events to it one at a time.
pub struct PredictionPage {
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    run_effect: RunEffect,
    session: Session,
}

impl PredictionPage {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        run_effect: RunEffect,
    ) -> Self {
        let (session, _) = init();

        Self {
            config,
            logger: logger.with_namespace("prediction_page"),
            run_effect,
            session,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    #[allow(dead_code)]
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn run_effect(&self) -> &RunEffect {
        &self.run_effect
    }

    pub fn view(&self) -> PageView {
        PageView::from_session(&self.session)
    }

    /// Applies `event` and returns the effects the caller is expected to run.
    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        let _ = self.logger.info(&format!(
            "\nold session:\n\t{:?}\n\nevent:\n\t{}",
            self.session.page_state(),
            event.to_display_string(),
        ));

        let session = std::mem::take(&mut self.session);
        let (new_session, effects) = transition(session, event);
        self.session = new_session;

        let _ = self.logger.info(&format!(
            "\nnew session:\n\t{:?}\n\neffects:\n\t{:?}",
            self.session.page_state(),
            effects
                .iter()
                .map(Effect::to_display_string)
                .collect::<Vec<_>>()
        ));

        effects
    }

    /// Applies `event`, then runs every resulting effect in place until none remain.
    #[allow(dead_code)]
    pub fn dispatch(&mut self, event: Event) {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            for effect in self.apply(event) {
                queue.push_back(self.run_effect.run_effect(effect));
            }
        }
    }

    pub fn end_session(&mut self) {
        self.apply(Event::SessionEnded);
    }
}
