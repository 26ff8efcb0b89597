//! Interactive prompts.

use console::Term;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;

use crate::error::{Result, SetupError};

use super::Prompt;

/// Convert dialoguer errors to SetupError.
fn map_dialoguer_err(e: dialoguer::Error) -> SetupError {
    SetupError::Io(e.into())
}

/// Show a select prompt on `term` and return the chosen value.
pub fn prompt_user(prompt: &Prompt, term: &Term) -> Result<String> {
    let labels: Vec<_> = prompt.options.iter().map(|o| o.label.as_str()).collect();

    let default_idx = prompt
        .default
        .as_ref()
        .and_then(|d| prompt.options.iter().position(|o| o.value == *d))
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(&prompt.question)
        .items(&labels)
        .default(default_idx)
        .interact_on(term)
        .map_err(map_dialoguer_err)?;

    prompt
        .options
        .get(selection)
        .map(|o| o.value.clone())
        .ok_or_else(|| SetupError::MalformedInput {
            message: format!("no option selected for '{}'", prompt.key),
        })
}
