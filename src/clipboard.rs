use log::debug;
use std::collections::HashSet;

use crate::errors::*;
use crate::scenario::*;
use crate::types::*;

pub trait FormulaClipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The desktop clipboard, opened for each write.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl FormulaClipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|err| format!("Failed to open the system clipboard: {}", err))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|err| format!("Failed to write to the system clipboard: {}", err))?;
        Ok(())
    }
}

/// Writes the selected categories' formula to the clipboard.  Nothing is written
/// when the selection is empty.
pub fn copy_selected_formula(
    engine: &ScenarioEngine,
    categories: &[Category],
    selected_ids: &HashSet<YnabCategoryId>,
    clipboard: &mut dyn FormulaClipboard,
) -> Result<Option<String>> {
    match engine.selected_formula(categories, selected_ids) {
        Some(formula) => {
            clipboard.set_text(&formula)?;
            debug!("Copied formula to clipboard: {}", formula);
            Ok(Some(formula))
        }
        None => Ok(None),
    }
}
