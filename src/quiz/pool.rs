use crate::quiz::model::{Question, QuestionSet};
use crate::store::ledger::LedgerMap;

/// The active practice pool plus the mode it was actually derived under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolSelection<'a> {
    pub questions: Vec<&'a Question>,
    /// Mode after derivation. Differs from the requested mode only when
    /// `fell_back` is set.
    pub wrong_only: bool,
    pub fell_back: bool,
}

impl PoolSelection<'_> {
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }
}

/// Derive the practice pool from ALL and the wrong-answer ledger.
///
/// With `wrong_only`, the pool is every question of `all` that has a ledger
/// entry, in `all` order. Ledger ids without a matching question are ignored.
/// An empty wrong-only pool forces the mode off and yields ALL instead.
pub fn derive_pool<'a>(all: &'a QuestionSet, ledger: &LedgerMap, wrong_only: bool) -> PoolSelection<'a> {
    if !wrong_only {
        return PoolSelection {
            questions: all.iter().collect(),
            wrong_only: false,
            fell_back: false,
        };
    }

    let wrong: Vec<&Question> = all.iter().filter(|q| ledger.contains_key(&q.id)).collect();
    if !wrong.is_empty() {
        return PoolSelection {
            questions: wrong,
            wrong_only: true,
            fell_back: false,
        };
    }

    tracing::debug!("wrong-only pool is empty, falling back to all questions");
    PoolSelection {
        questions: all.iter().collect(),
        wrong_only: false,
        fell_back: true,
    }
}
