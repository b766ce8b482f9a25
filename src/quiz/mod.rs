pub mod loader;
pub mod model;
pub mod pool;
pub mod session;

pub use loader::{Manifest, QuestionLoader, SourceDescriptor};
pub use model::{Question, QuestionSet, QuizOption};
pub use pool::{PoolSelection, derive_pool};
pub use session::{Notice, OptionMark, Outcome, Phase, Progress, SessionState, Trainer};
