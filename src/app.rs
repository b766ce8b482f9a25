use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::Config;
use crate::error::LoadError;
use crate::fetch::AutoFetcher;
use crate::quiz::loader::QuestionLoader;
use crate::quiz::model::QuestionSet;
use crate::quiz::session::{Outcome, SessionState, Trainer};
use crate::store::json_store::JsonStore;
use crate::store::kv::{KeyValueStore, MemoryStore};
use crate::store::ledger::WrongLedger;
use crate::ui::theme::Theme;

const LOAD_HINT: &str = "check the manifest and source paths/formats";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    Loaded(usize),
    Failed(String),
}

impl LoadStatus {
    pub fn text(&self) -> String {
        match self {
            LoadStatus::Loaded(n) => format!("Loaded {n} questions"),
            LoadStatus::Failed(msg) => format!("Load failed: {msg} ({LOAD_HINT})"),
        }
    }
}

pub struct App {
    pub trainer: Option<Trainer<SmallRng>>,
    pub state: SessionState,
    pub status: LoadStatus,
    pub theme: Theme,
    pub confirm_reset: bool,
    pub should_quit: bool,
}

impl App {
    /// Open the ledger, run the startup load and draw the first question.
    pub fn start(config: &Config, wrong_only: bool) -> Self {
        let store: Box<dyn KeyValueStore> = match JsonStore::with_base_dir(config.data_dir()) {
            Ok(store) => Box::new(store),
            Err(e) => {
                tracing::warn!(error = %e, "data dir unavailable, wrong answers will not persist");
                Box::new(MemoryStore::new())
            }
        };
        let ledger = WrongLedger::new(store);

        let loaded = AutoFetcher::new(config.fetch_timeout_secs)
            .map_err(|e| LoadError::Manifest {
                location: config.manifest.clone(),
                reason: e.to_string(),
            })
            .and_then(|fetcher| QuestionLoader::new(fetcher).load(&config.manifest));

        let theme = Theme::load(&config.theme).unwrap_or_else(|| {
            tracing::warn!(
                theme = %config.theme,
                available = ?Theme::available_themes(),
                "unknown theme, using default"
            );
            Theme::default()
        });
        Self::from_load(
            loaded,
            ledger,
            SmallRng::from_entropy(),
            theme,
            wrong_only,
            config.prune_stale_ledger,
        )
    }

    pub fn from_load(
        loaded: Result<QuestionSet, LoadError>,
        ledger: WrongLedger,
        rng: SmallRng,
        theme: Theme,
        wrong_only: bool,
        prune_stale_ledger: bool,
    ) -> Self {
        let mut app = Self {
            trainer: None,
            state: SessionState::new(wrong_only),
            status: LoadStatus::Loaded(0),
            theme,
            confirm_reset: false,
            should_quit: false,
        };

        match loaded {
            Ok(all) => {
                if prune_stale_ledger {
                    match ledger.retain_known(all.ids()) {
                        Ok(0) => {}
                        Ok(n) => tracing::info!(dropped = n, "pruned stale wrong-answer entries"),
                        Err(e) => tracing::warn!(error = %e, "failed to prune wrong-answer ledger"),
                    }
                }
                app.status = LoadStatus::Loaded(all.len());
                let mut trainer = Trainer::new(all, ledger, rng);
                app.state = trainer.next_question(app.state);
                app.trainer = Some(trainer);
            }
            Err(e) => {
                tracing::error!(error = %e, "question load failed");
                app.status = LoadStatus::Failed(e.to_string());
            }
        }
        app
    }

    /// Feed `state` through one transition.
    fn apply(&mut self, f: impl FnOnce(&mut Trainer<SmallRng>, SessionState) -> SessionState) {
        if let Some(trainer) = self.trainer.as_mut() {
            let state = std::mem::take(&mut self.state);
            self.state = f(trainer, state);
        }
    }

    pub fn next_question(&mut self) {
        self.apply(|t, s| t.next_question(s));
    }

    pub fn choose(&mut self, key: &str) {
        self.apply(|t, s| t.choose(s, key));
    }

    pub fn reveal(&mut self) {
        self.apply(|t, s| t.reveal(s));
    }

    pub fn toggle_wrong_mode(&mut self) {
        self.apply(|t, s| t.toggle_wrong_mode(s));
    }

    pub fn reset_wrong_ledger(&mut self) {
        self.apply(|t, s| t.reset_wrong_ledger(s));
    }

    pub fn progress_text(&self) -> String {
        match &self.trainer {
            Some(t) => t.progress(&self.state).text(),
            None => "no questions loaded".to_string(),
        }
    }

    pub fn feedback_text(&self) -> Option<String> {
        if self.confirm_reset {
            return Some("Clear all wrong-answer records? [y/n]".to_string());
        }
        let notice = self.state.notice.as_ref().map(|n| n.message());
        let outcome = self.state.outcome().and_then(|outcome| {
            let question = self.state.current()?;
            let answer = match question.option(&question.answer) {
                Some(opt) => format!("{}) {}", opt.key, opt.text),
                None => question.answer.clone(),
            };
            Some(match outcome {
                Outcome::Correct { .. } => "Correct!".to_string(),
                Outcome::Incorrect { .. } => format!("Incorrect. The answer is {answer}."),
                Outcome::Revealed => format!("The answer is {answer}."),
            })
        });
        match (outcome, notice) {
            (Some(o), Some(n)) => Some(format!("{o} {n}")),
            (o, n) => o.or(n),
        }
    }

    /// Option key selected by `ch`: the option's own key, or its 1-based
    /// position for digits.
    fn option_for_char(&self, ch: char) -> Option<String> {
        if self.state.is_answered() {
            return None;
        }
        let question = self.state.current()?;
        let typed = ch.to_string();
        if question.option(&typed).is_some() {
            return Some(typed);
        }
        let idx = ch.to_digit(10)? as usize;
        question
            .options
            .get(idx.checked_sub(1)?)
            .map(|o| o.key.clone())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.confirm_reset {
            match key.code {
                KeyCode::Char('y') => {
                    self.confirm_reset = false;
                    self.reset_wrong_ledger();
                }
                KeyCode::Char('n') | KeyCode::Esc => self.confirm_reset = false,
                _ => {}
            }
            return;
        }

        // Command keys win over option keys; a clashing option stays
        // reachable by its digit.
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('n') | KeyCode::Enter => self.next_question(),
            KeyCode::Char('r') => self.reveal(),
            KeyCode::Char('w') => self.toggle_wrong_mode(),
            KeyCode::Char('x') => {
                if self.trainer.is_some() {
                    self.confirm_reset = true;
                }
            }
            KeyCode::Char(ch) => {
                if let Some(option_key) = self.option_for_char(ch) {
                    self.choose(&option_key);
                }
            }
            _ => {}
        }
    }
}
