//! Terminal prompts backed by dialoguer

use console::Style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password, Select};
use nodectl_configurator::{NoticeLevel, Prompter};
use nodectl_errors::ConfigureError;

fn prompt_failed(e: &dialoguer::Error) -> ConfigureError {
    ConfigureError::PromptFailed {
        message: e.to_string(),
    }
}

/// Asks the operator on the controlling terminal
#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl Prompter for TerminalPrompter {
    fn select(
        &mut self,
        prompt: &str,
        items: &[&str],
        default: usize,
    ) -> Result<usize, ConfigureError> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact()
            .map_err(|e| prompt_failed(&e))
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, ConfigureError> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(|e| prompt_failed(&e))
    }

    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<String, ConfigureError> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        input.interact_text().map_err(|e| prompt_failed(&e))
    }

    fn password(&mut self, prompt: &str) -> Result<String, ConfigureError> {
        Password::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(|e| prompt_failed(&e))
    }

    fn notice(&mut self, level: NoticeLevel, message: &str) {
        let style = match level {
            NoticeLevel::Info => Style::new().cyan(),
            NoticeLevel::Warning => Style::new().yellow(),
        };
        eprintln!("{}", style.apply_to(message));
    }
}
