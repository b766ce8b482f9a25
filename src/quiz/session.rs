use rand::Rng;

use crate::quiz::model::{Question, QuestionSet};
use crate::quiz::pool::derive_pool;
use crate::store::ledger::WrongLedger;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct { chosen: String },
    Incorrect { chosen: String },
    /// Answer shown without a choice; neither right nor wrong.
    Revealed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Unanswered(Question),
    Answered { question: Question, outcome: Outcome },
}

/// Something the feedback line should tell the user about the last transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    PoolEmpty,
    /// Wrong-only mode was requested but no wrong answers matched, so the full
    /// pool is in use and the mode was switched off.
    WrongPoolFallback,
    LedgerWriteFailed(String),
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::PoolEmpty => "The question pool is empty.".to_string(),
            Notice::WrongPoolFallback => {
                "No wrong answers recorded yet; practicing all questions.".to_string()
            }
            Notice::LedgerWriteFailed(e) => format!("Could not save wrong-answer record: {e}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionMark {
    Selectable,
    Disabled,
    Correct,
    Wrong,
    /// Correct option shown by `reveal`.
    Revealed,
}

/// The whole visible quiz state. Transitions take it by value and return the
/// successor; the renderer only ever reads it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub phase: Phase,
    pub wrong_only: bool,
    pub notice: Option<Notice>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(false)
    }
}

impl SessionState {
    pub fn new(wrong_only: bool) -> Self {
        Self {
            phase: Phase::Empty,
            wrong_only,
            notice: None,
        }
    }

    pub fn current(&self) -> Option<&Question> {
        match &self.phase {
            Phase::Empty => None,
            Phase::Unanswered(q) => Some(q),
            Phase::Answered { question, .. } => Some(question),
        }
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        match &self.phase {
            Phase::Answered { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self.phase, Phase::Answered { .. })
    }

    pub fn option_mark(&self, key: &str) -> OptionMark {
        match &self.phase {
            Phase::Empty => OptionMark::Disabled,
            Phase::Unanswered(_) => OptionMark::Selectable,
            Phase::Answered { question, outcome } => {
                let is_answer = question.is_correct(key);
                match outcome {
                    Outcome::Revealed if is_answer => OptionMark::Revealed,
                    Outcome::Correct { .. } | Outcome::Incorrect { .. } if is_answer => {
                        OptionMark::Correct
                    }
                    Outcome::Incorrect { chosen } if chosen == key => OptionMark::Wrong,
                    _ => OptionMark::Disabled,
                }
            }
        }
    }

    /// Explanation text, only once the question is answered.
    pub fn explanation(&self) -> Option<&str> {
        match &self.phase {
            Phase::Answered { question, .. } => question.explanation.as_deref(),
            _ => None,
        }
    }
}

/// Numbers for the progress line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub total: usize,
    pub wrong: usize,
    pub wrong_only: bool,
}

impl Progress {
    pub fn text(&self) -> String {
        let mode = if self.wrong_only { "wrong only" } else { "all questions" };
        format!("{} questions | {} wrong | {}", self.total, self.wrong, mode)
    }
}

/// Owns the loaded question set, the ledger and the randomness that the
/// session transitions need.
pub struct Trainer<R> {
    all: QuestionSet,
    ledger: WrongLedger,
    rng: R,
}

impl<R: Rng> Trainer<R> {
    pub fn new(all: QuestionSet, ledger: WrongLedger, rng: R) -> Self {
        Self { all, ledger, rng }
    }

    pub fn ledger(&self) -> &WrongLedger {
        &self.ledger
    }

    pub fn progress(&self, state: &SessionState) -> Progress {
        Progress {
            total: self.all.len(),
            wrong: self.ledger.count(),
            wrong_only: state.wrong_only,
        }
    }

    /// Re-derive the pool and draw one question uniformly at random.
    pub fn next_question(&mut self, state: SessionState) -> SessionState {
        let ledger = self.ledger.get();
        let pool = derive_pool(&self.all, &ledger, state.wrong_only);

        let mut notice = pool.fell_back.then_some(Notice::WrongPoolFallback);
        let phase = if pool.is_empty() {
            notice = Some(Notice::PoolEmpty);
            Phase::Empty
        } else {
            let idx = self.rng.gen_range(0..pool.len());
            Phase::Unanswered(pool.questions[idx].clone())
        };

        SessionState {
            phase,
            wrong_only: pool.wrong_only,
            notice,
        }
    }

    /// Answer the current question with option `key`. No-op unless a question
    /// is displayed and still unanswered.
    pub fn choose(&mut self, state: SessionState, key: &str) -> SessionState {
        let Phase::Unanswered(question) = state.phase else {
            return state;
        };

        let mut notice = None;
        let outcome = if question.is_correct(key) {
            Outcome::Correct {
                chosen: key.to_string(),
            }
        } else {
            if let Err(e) = self.ledger.increment(&question.id) {
                tracing::warn!(id = %question.id, error = %e, "failed to record wrong answer");
                notice = Some(Notice::LedgerWriteFailed(e.to_string()));
            }
            Outcome::Incorrect {
                chosen: key.to_string(),
            }
        };

        SessionState {
            phase: Phase::Answered { question, outcome },
            wrong_only: state.wrong_only,
            notice,
        }
    }

    /// Show the answer without choosing. Never touches the ledger.
    pub fn reveal(&mut self, state: SessionState) -> SessionState {
        let Phase::Unanswered(question) = state.phase else {
            return state;
        };
        SessionState {
            phase: Phase::Answered {
                question,
                outcome: Outcome::Revealed,
            },
            wrong_only: state.wrong_only,
            notice: None,
        }
    }

    pub fn toggle_wrong_mode(&mut self, state: SessionState) -> SessionState {
        let toggled = SessionState {
            wrong_only: !state.wrong_only,
            ..state
        };
        self.next_question(toggled)
    }

    /// Clear the ledger. In wrong-only mode the pool is re-derived right away,
    /// which falls back to all questions.
    pub fn reset_wrong_ledger(&mut self, state: SessionState) -> SessionState {
        if let Err(e) = self.ledger.clear() {
            tracing::warn!(error = %e, "failed to clear wrong-answer ledger");
            return SessionState {
                notice: Some(Notice::LedgerWriteFailed(e.to_string())),
                ..state
            };
        }
        if state.wrong_only {
            self.next_question(state)
        } else {
            state
        }
    }
}
