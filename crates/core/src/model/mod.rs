mod bank;
mod ids;
mod letters;
mod question;

pub use bank::{Bank, normalize_questions};
pub use ids::{BankId, ParseIdError, QuestionId};
pub use letters::{LetterError, MAX_OPTIONS, OptionLetter, OptionSet};
pub use question::{Question, QuestionKind};
