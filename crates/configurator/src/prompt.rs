//! The I/O seam between configuration decisions and the operator

use nodectl_errors::ConfigureError;
use std::collections::VecDeque;

/// How prominently a notice is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// Collects answers from the operator.
///
/// Implementations apply the default on empty input themselves; the
/// configurator never sees an empty answer for a prompt that has one.
pub trait Prompter: Send {
    /// Pick one of `items`, returning its index
    ///
    /// # Errors
    ///
    /// Returns an error when no answer can be obtained.
    fn select(&mut self, prompt: &str, items: &[&str], default: usize)
        -> Result<usize, ConfigureError>;

    /// Yes/no question
    ///
    /// # Errors
    ///
    /// Returns an error when no answer can be obtained.
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, ConfigureError>;

    /// Free text; `default` is returned for empty input when present
    ///
    /// # Errors
    ///
    /// Returns an error when no answer can be obtained.
    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<String, ConfigureError>;

    /// Hidden input; may be empty
    ///
    /// # Errors
    ///
    /// Returns an error when no answer can be obtained.
    fn password(&mut self, prompt: &str) -> Result<String, ConfigureError>;

    fn notice(&mut self, level: NoticeLevel, message: &str);
}

/// One canned answer for [`ScriptedPrompter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Accept whatever default the prompt offers
    Default,
    Select(usize),
    Confirm(bool),
    Text(String),
}

impl Answer {
    #[must_use]
    pub fn text(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Replays a fixed answer list; used to drive the configurator in tests
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    prompts: Vec<String>,
    notices: Vec<(NoticeLevel, String)>,
}

impl ScriptedPrompter {
    #[must_use]
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Every prompt asked so far, in order
    #[must_use]
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    #[must_use]
    pub fn notices(&self) -> &[(NoticeLevel, String)] {
        &self.notices
    }

    #[must_use]
    pub fn warnings(&self) -> Vec<&str> {
        self.notices
            .iter()
            .filter(|(level, _)| *level == NoticeLevel::Warning)
            .map(|(_, message)| message.as_str())
            .collect()
    }

    /// Answers not consumed
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, prompt: &str) -> Result<Answer, ConfigureError> {
        self.prompts.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| ConfigureError::AnswersExhausted {
                prompt: prompt.to_string(),
            })
    }
}

fn mismatch(prompt: &str, answer: &Answer) -> ConfigureError {
    ConfigureError::InvalidAnswer {
        prompt: prompt.to_string(),
        message: format!("unexpected answer {answer:?}"),
    }
}

impl Prompter for ScriptedPrompter {
    fn select(
        &mut self,
        prompt: &str,
        items: &[&str],
        default: usize,
    ) -> Result<usize, ConfigureError> {
        match self.next(prompt)? {
            Answer::Default => Ok(default),
            Answer::Select(index) if index < items.len() => Ok(index),
            other => Err(mismatch(prompt, &other)),
        }
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, ConfigureError> {
        match self.next(prompt)? {
            Answer::Default => Ok(default),
            Answer::Confirm(value) => Ok(value),
            other => Err(mismatch(prompt, &other)),
        }
    }

    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<String, ConfigureError> {
        match self.next(prompt)? {
            Answer::Default => Ok(default.unwrap_or_default().to_string()),
            Answer::Text(text) if text.is_empty() => Ok(default.unwrap_or_default().to_string()),
            Answer::Text(text) => Ok(text),
            other => Err(mismatch(prompt, &other)),
        }
    }

    fn password(&mut self, prompt: &str) -> Result<String, ConfigureError> {
        match self.next(prompt)? {
            Answer::Default => Ok(String::new()),
            Answer::Text(text) => Ok(text),
            other => Err(mismatch(prompt, &other)),
        }
    }

    fn notice(&mut self, level: NoticeLevel, message: &str) {
        self.notices.push((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_exhaustion() {
        let mut prompter = ScriptedPrompter::new([Answer::Default, Answer::text("")]);
        assert_eq!(prompter.select("pick", &["a", "b"], 1).unwrap(), 1);
        assert_eq!(prompter.input("name", Some("x")).unwrap(), "x");
        assert!(matches!(
            prompter.confirm("ok?", true),
            Err(ConfigureError::AnswersExhausted { .. })
        ));
        assert_eq!(prompter.prompts().len(), 3);
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        let mut prompter = ScriptedPrompter::new([Answer::Select(5)]);
        assert!(matches!(
            prompter.select("pick", &["a", "b"], 0),
            Err(ConfigureError::InvalidAnswer { .. })
        ));
    }
}
