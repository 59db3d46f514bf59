//! Grading rules for the two exercise kinds.
//!
//! Exercise content lives outside this crate; these types only carry what is
//! needed to decide whether an answer is correct.

//
// ─── MULTIPLE CHOICE ──────────────────────────────────────────────────────────
//

/// A multiple-choice exercise with exactly one correct option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipleChoice {
    options: Vec<String>,
    correct: usize,
}

impl MultipleChoice {
    /// Returns `None` when `correct` does not index into `options`.
    #[must_use]
    pub fn new(options: Vec<String>, correct: usize) -> Option<Self> {
        (correct < options.len()).then_some(Self { options, correct })
    }

    /// An out-of-range selection is graded as incorrect.
    #[must_use]
    pub fn grade(&self, selected: usize) -> bool {
        selected == self.correct
    }
}

//
// ─── FILL IN THE BLANKS ───────────────────────────────────────────────────────
//

/// A fill-in-the-blank exercise with one expected answer per blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillInBlanks {
    answers: Vec<String>,
}

/// Result of grading a fill-in-the-blank exercise.
///
/// `expected` is returned so the caller can reveal the right answers for
/// blanks that were wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlankGrade {
    pub per_blank: Vec<bool>,
    pub expected: Vec<String>,
}

impl BlankGrade {
    /// The exercise counts as correct only if every blank matched.
    #[must_use]
    pub fn all_correct(&self) -> bool {
        self.per_blank.iter().all(|ok| *ok)
    }
}

impl FillInBlanks {
    #[must_use]
    pub fn new(answers: Vec<String>) -> Self {
        Self { answers }
    }

    /// Compare inputs case-insensitively, ignoring surrounding whitespace.
    /// Missing inputs count as wrong; extra inputs are ignored.
    #[must_use]
    pub fn grade<S: AsRef<str>>(&self, inputs: &[S]) -> BlankGrade {
        let per_blank = self
            .answers
            .iter()
            .enumerate()
            .map(|(idx, expected)| {
                inputs.get(idx).is_some_and(|given| {
                    given.as_ref().trim().to_lowercase() == expected.to_lowercase()
                })
            })
            .collect();

        BlankGrade {
            per_blank,
            expected: self.answers.clone(),
        }
    }
}
