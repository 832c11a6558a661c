use buddy_core::model::{HintLevel, MAX_HINT_LEVEL, ProblemRecord};

/// What the user asked the assistant for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptIntent {
    Hint(HintLevel),
    Solution,
    Review { code: String },
}

impl PromptIntent {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            PromptIntent::Hint(_) => "hint",
            PromptIntent::Solution => "solution",
            PromptIntent::Review { .. } => "review",
        }
    }
}

/// Builds the prompt text sent to the generation endpoint.
#[must_use]
pub fn build_prompt(intent: &PromptIntent, problem: &ProblemRecord) -> String {
    let platform = if problem.platform.is_empty() {
        "LeetCode"
    } else {
        problem.platform.as_str()
    };
    let base = format!(
        "Problem: \"{}\" on {platform}.\nDescription: {}\n\n",
        problem.title, problem.description
    );

    match intent {
        PromptIntent::Hint(level) => format!(
            "{base}Provide a concise, progressively helpful hint for level {level} of {MAX_HINT_LEVEL}. \
             Generate only the hint for Level {level}:"
        ),
        PromptIntent::Solution => format!(
            "{base}Provide a complete, well-commented, and optimal solution in JavaScript. \
             Explain the time and space complexity."
        ),
        PromptIntent::Review { code } => format!(
            "{base}Review the following user-submitted code. Identify bugs, and suggest \
             improvements for logic, efficiency, or readability.\n\nUser Code:\n```\n{code}\n```"
        ),
    }
}
