//! Row annotations derived for the table renderer

use crate::models::Holding;

/// A row is highlighted when it carries a non-blank comment
/// ("Bonus", "Split", "Rights", ...).
pub fn is_highlighted(holding: &Holding) -> bool {
    holding
        .comment
        .as_deref()
        .is_some_and(|c| !c.trim().is_empty())
}
