/// One way of locating a target element.
///
/// Strategies are tried in the order the caller lists them; each carries a
/// fixed confidence reflecting how precisely it identifies the element. A
/// strategy that finds nothing is a soft miss and the cascade moves on.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Exact CSS selector supplied by a site profile or a caller hint.
    Hint { selector: String },
    /// Positional: the first usable `target` inside the `index`-th (1-based)
    /// `container` match, skipping elements whose text hits `exclude`.
    Index {
        container: String,
        index: usize,
        target: String,
        exclude: Vec<String>,
    },
    /// Text match over a role selector: element text must contain one of
    /// `include` and none of `exclude`, case-insensitive.
    Text {
        role: String,
        include: Vec<String>,
        exclude: Vec<String>,
    },
    /// Last resort: harvest everything matching `role` and pick the best
    /// candidate by fuzzy scoring against the target description.
    Generic {
        role: String,
        target_text: String,
        target_price: Option<f64>,
    },
}

impl Strategy {
    pub fn confidence(&self) -> f64 {
        match self {
            Strategy::Hint { .. } => 0.95,
            Strategy::Index { .. } => 0.8,
            Strategy::Text { .. } => 0.65,
            Strategy::Generic { .. } => 0.4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Hint { .. } => "hint",
            Strategy::Index { .. } => "index",
            Strategy::Text { .. } => "text",
            Strategy::Generic { .. } => "generic",
        }
    }

    /// Short human-readable form for logs and failure reports.
    pub fn describe(&self) -> String {
        match self {
            Strategy::Hint { selector } => format!("hint({})", selector),
            Strategy::Index {
                container, index, ..
            } => format!("index({}#{})", container, index),
            Strategy::Text { role, include, .. } => {
                format!("text({} ~ {:?})", role, include)
            }
            Strategy::Generic { role, target_text, .. } => {
                format!("generic({} ~ {})", role, target_text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_order_matches_precision() {
        let hint = Strategy::Hint {
            selector: "#book".into(),
        };
        let index = Strategy::Index {
            container: ".card".into(),
            index: 1,
            target: "button".into(),
            exclude: vec![],
        };
        let text = Strategy::Text {
            role: "button".into(),
            include: vec!["book".into()],
            exclude: vec![],
        };
        let generic = Strategy::Generic {
            role: "button, a".into(),
            target_text: "Deluxe Double".into(),
            target_price: Some(120.0),
        };
        assert!(hint.confidence() > index.confidence());
        assert!(index.confidence() > text.confidence());
        assert!(text.confidence() > generic.confidence());
    }
}
