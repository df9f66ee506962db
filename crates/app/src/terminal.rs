use std::collections::BTreeSet;
use std::io::Write;

use quiz_core::model::{LetterError, OptionLetter, Question};
use services::{Counters, Feedback, QuizRenderer, RunSummary};

/// Plain-text renderer writing to any `Write` sink.
pub struct TerminalRenderer<W> {
    out: W,
    counters: Counters,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            counters: Counters {
                seen: 0,
                remaining: 0,
            },
        }
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(err) = self.out.write_all(text.as_bytes()).and_then(|()| self.out.flush()) {
            tracing::warn!(error = %err, "failed to write to terminal");
        }
    }
}

impl<W: Write> QuizRenderer for TerminalRenderer<W> {
    fn render_question(&mut self, question: &Question) {
        let mut text = format!("\n{}\n", question.stem);
        if question.is_multi() {
            text.push_str("(select all that apply)\n");
        }
        for (letter, option) in question.options.iter() {
            text.push_str(&format!("  {letter}. {option}\n"));
        }
        self.emit(&text);
    }

    fn render_feedback(&mut self, feedback: &Feedback) {
        let mut text = String::from(if feedback.correct {
            "Correct!\n"
        } else {
            "Incorrect.\n"
        });
        text.push_str("Correct answer:\n");
        for line in &feedback.correct_answer {
            text.push_str(&format!("  {line}\n"));
        }
        if !feedback.rationale.is_empty() {
            text.push_str(&format!("Rationale: {}\n", feedback.rationale));
        }
        self.emit(&text);
    }

    fn render_summary(&mut self, summary: &RunSummary) {
        let mut text = format!("\n=== {} complete ===\n", summary.bank);
        match summary.first_try {
            Some(stats) => text.push_str(&format!(
                "First-try accuracy: {}% ({}/{})\n",
                stats.percent, stats.correct, stats.total
            )),
            None => text.push_str("No questions answered.\n"),
        }
        for (n, item) in summary.review.iter().enumerate() {
            let mark = if item.correct { "ok" } else { "missed" };
            text.push_str(&format!("{:>3}. [{mark}] {}\n", n + 1, item.stem));
            for line in &item.correct_answer {
                text.push_str(&format!("       {line}\n"));
            }
        }
        self.emit(&text);
    }

    fn update_counters(&mut self, counters: Counters) {
        self.counters = counters;
        let text = format!(
            "[seen {} | remaining {}]\n",
            counters.seen, counters.remaining
        );
        self.emit(&text);
    }

    fn notify(&mut self, message: &str) {
        self.emit(&format!("! {message}\n"));
    }
}

/// Parses a typed answer such as `b`, `A, C` or `ac` into letters.
///
/// Commas and whitespace separate letters but are optional.
pub fn parse_selection(input: &str) -> Result<BTreeSet<OptionLetter>, LetterError> {
    input
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .map(|c| OptionLetter::from_char(c).ok_or_else(|| LetterError::Invalid(c.to_string())))
        .collect()
}

/// Letters in `picked` that the question does not offer.
pub fn unknown_letters(question: &Question, picked: &BTreeSet<OptionLetter>) -> Vec<OptionLetter> {
    picked
        .iter()
        .copied()
        .filter(|letter| !question.options.contains(*letter))
        .collect()
}
