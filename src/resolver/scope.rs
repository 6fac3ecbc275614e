/// Sub-tree a resolution is confined to.
///
/// A scoped search runs inside the N-th match of `card_selector` (1-based)
/// instead of the whole document, so "the Book button" means "the Book button
/// of card 3", not the first one on the page. When the index is out of range
/// the first card is used; a selection that lands somewhere is more useful
/// than one that silently matches nothing.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub card_selector: Option<String>,
    /// 1-based card index; ignored when `card_selector` is None.
    pub index: Option<usize>,
}

impl Scope {
    /// Whole-document scope.
    pub fn page() -> Self {
        Self::default()
    }

    pub fn card(selector: impl Into<String>, index: usize) -> Self {
        Self {
            card_selector: Some(selector.into()),
            index: Some(index),
        }
    }

    pub fn is_scoped(&self) -> bool {
        self.card_selector.is_some()
    }

    /// Resolve the fallback deterministically against the number of cards
    /// actually on the page: an index of 0 or one past the last card becomes
    /// the first card. The in-page prelude applies the same rule, so a grid
    /// that shrinks between the count and the query still lands on card one.
    pub fn clamped(mut self, available: usize) -> Self {
        if let Some(index) = self.index {
            if index == 0 || index > available {
                self.index = Some(1);
            }
        }
        self
    }
}
