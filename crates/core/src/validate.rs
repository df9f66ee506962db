//! Bank health report.
//!
//! Runs never reject a bank: unmatched correct letters are dropped when
//! options are shuffled. This report surfaces those problems to bank
//! authors instead.

use std::collections::HashSet;
use std::fmt;

use crate::model::{OptionLetter, Question, QuestionId, QuestionKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankIssue {
    /// A correct letter names an option the question does not have.
    UnknownCorrectLetter {
        question: QuestionId,
        letter: OptionLetter,
    },
    /// A single-select question lists more than one correct letter and can
    /// never be answered correctly.
    SingleSelectWithManyCorrect { question: QuestionId, count: usize },
    NoCorrectLetter { question: QuestionId },
    NoOptions { question: QuestionId },
    DuplicateId { question: QuestionId },
}

impl fmt::Display for BankIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCorrectLetter { question, letter } => {
                write!(f, "{question}: correct letter {letter} has no matching option")
            }
            Self::SingleSelectWithManyCorrect { question, count } => {
                write!(f, "{question}: single-select question lists {count} correct letters")
            }
            Self::NoCorrectLetter { question } => write!(f, "{question}: no correct letter"),
            Self::NoOptions { question } => write!(f, "{question}: no options"),
            Self::DuplicateId { question } => write!(f, "{question}: duplicate question id"),
        }
    }
}

/// Lists every problem found in the bank, in question order.
#[must_use]
pub fn validate_bank(questions: &[Question]) -> Vec<BankIssue> {
    let mut issues = Vec::new();
    let mut seen: HashSet<&QuestionId> = HashSet::new();

    for q in questions {
        if !seen.insert(&q.id) {
            issues.push(BankIssue::DuplicateId {
                question: q.id.clone(),
            });
        }
        if q.options.is_empty() {
            issues.push(BankIssue::NoOptions {
                question: q.id.clone(),
            });
        }
        if q.correct.is_empty() {
            issues.push(BankIssue::NoCorrectLetter {
                question: q.id.clone(),
            });
        }
        if q.kind == QuestionKind::SingleSelect && q.correct.len() > 1 {
            issues.push(BankIssue::SingleSelectWithManyCorrect {
                question: q.id.clone(),
                count: q.correct.len(),
            });
        }
        for letter in q.correct.iter().filter(|l| !q.options.contains(**l)) {
            issues.push(BankIssue::UnknownCorrectLetter {
                question: q.id.clone(),
                letter: *letter,
            });
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OptionSet;

    fn build_question(id: &str, kind: QuestionKind, options: &[&str], correct: &[char]) -> Question {
        Question {
            id: QuestionId::new(id),
            stem: String::new(),
            kind,
            options: OptionSet::from_texts(options.iter().copied()),
            correct: correct
                .iter()
                .filter_map(|c| OptionLetter::from_char(*c))
                .collect(),
            rationale: String::new(),
        }
    }

    #[test]
    fn clean_bank_has_no_issues() {
        let questions = vec![
            build_question("a", QuestionKind::SingleSelect, &["x", "y"], &['A']),
            build_question("b", QuestionKind::MultiSelect, &["x", "y", "z"], &['A', 'C']),
        ];
        assert!(validate_bank(&questions).is_empty());
    }

    #[test]
    fn reports_each_problem() {
        let questions = vec![
            build_question("a", QuestionKind::SingleSelect, &["x", "y"], &['D']),
            build_question("b", QuestionKind::SingleSelect, &["x", "y"], &['A', 'B']),
            build_question("c", QuestionKind::MultiSelect, &[], &[]),
            build_question("a", QuestionKind::SingleSelect, &["x"], &['A']),
        ];

        let issues = validate_bank(&questions);
        assert_eq!(
            issues,
            vec![
                BankIssue::UnknownCorrectLetter {
                    question: QuestionId::new("a"),
                    letter: OptionLetter::from_char('D').unwrap(),
                },
                BankIssue::SingleSelectWithManyCorrect {
                    question: QuestionId::new("b"),
                    count: 2,
                },
                BankIssue::NoOptions {
                    question: QuestionId::new("c"),
                },
                BankIssue::NoCorrectLetter {
                    question: QuestionId::new("c"),
                },
                BankIssue::DuplicateId {
                    question: QuestionId::new("a"),
                },
            ]
        );
    }

    #[test]
    fn issues_render_readably() {
        let issue = BankIssue::UnknownCorrectLetter {
            question: QuestionId::new("q7"),
            letter: OptionLetter::from_char('E').unwrap(),
        };
        assert_eq!(issue.to_string(), "q7: correct letter E has no matching option");
    }
}
