//! List-field normalisation
//!
//! List fields hold several items in one cell, separated by `|`. Each item is
//! trimmed and terminated with a period before it reaches a template.

use serde::{Deserialize, Serialize};

/// Separator between items of a list field
pub const LIST_DELIMITER: char = '|';

/// Punctuation every normalised item ends with
pub const ITEM_TERMINATOR: char = '.';

/// What to do with empty pieces, e.g. after a trailing `|`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyItemPolicy {
    /// Keep the piece; it normalises to a lone `"."`
    #[default]
    Keep,
    /// Drop the piece
    Drop,
}

/// Result of splitting a list field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListItems {
    /// Normalised items in source order
    pub items: Vec<String>,
    /// Positions (in the raw split) of pieces that were empty after trimming
    pub empty_positions: Vec<usize>,
}

impl ListItems {
    /// Check if there are no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Normalise a single item: trim, then make sure it ends with a period
pub fn normalize_item(raw: &str) -> String {
    let mut item = raw.trim().to_string();
    if !item.ends_with(ITEM_TERMINATOR) {
        item.push(ITEM_TERMINATOR);
    }
    item
}

/// Split a raw list field into normalised items
pub fn split_items(raw: &str, policy: EmptyItemPolicy) -> ListItems {
    let mut out = ListItems::default();

    for (position, piece) in raw.split(LIST_DELIMITER).enumerate() {
        if piece.trim().is_empty() {
            out.empty_positions.push(position);
            if policy == EmptyItemPolicy::Drop {
                continue;
            }
        }
        out.items.push(normalize_item(piece));
    }

    out
}

/// Join items back into a raw list field
pub fn join_items(items: &[String]) -> String {
    items.join(&LIST_DELIMITER.to_string())
}
