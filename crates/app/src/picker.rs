//! Interactive standard selection.

use inquire::Select;

use stdsync_model::Standard;
use stdsync_sync::{PickError, StandardPicker};

use crate::commands::describe_standard;

/// Asks the user to choose on the terminal.
pub(crate) struct PromptPicker;

impl StandardPicker for PromptPicker {
    fn pick(&self, standards: &[Standard]) -> Result<usize, PickError> {
        let options: Vec<String> = standards.iter().map(describe_standard).collect();
        let choice = Select::new("Which coding standard?", options)
            .with_page_size(15)
            .raw_prompt()?;
        Ok(choice.index)
    }
}
