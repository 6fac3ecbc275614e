use crate::browser::CandidateElement;
use crate::resolver::price::extract_price;
use serde::{Deserialize, Serialize};

/// Relative importance of each scoring term. Terms must sum to 1.0 for the
/// composite to stay in [0, 1], but the matcher does not enforce it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub text: f64,
    pub price: f64,
    pub structure: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            text: 0.6,
            price: 0.3,
            structure: 0.1,
        }
    }
}

/// What the generic strategy is looking for.
#[derive(Debug, Clone)]
pub struct FuzzyTarget {
    pub text: String,
    pub price: Option<f64>,
}

/// Composite score for one candidate, kept for logging.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub order: usize,
    pub score: f64,
}

/// Score every usable candidate and return the best one at or above
/// `threshold`. Ties keep the earlier candidate in document order.
pub fn pick_best(
    candidates: &[CandidateElement],
    target: &FuzzyTarget,
    weights: &ScoreWeights,
    threshold: f64,
) -> Option<ScoredCandidate> {
    let mut best: Option<ScoredCandidate> = None;
    for candidate in candidates {
        if !candidate.visible || !candidate.enabled {
            continue;
        }
        let score = score_candidate(candidate, target, weights, candidates);
        if score < threshold {
            continue;
        }
        let better = match &best {
            Some(current) => score > current.score,
            None => true,
        };
        if better {
            best = Some(ScoredCandidate {
                order: candidate.order,
                score,
            });
        }
    }
    best
}

pub fn score_candidate(
    candidate: &CandidateElement,
    target: &FuzzyTarget,
    weights: &ScoreWeights,
    all: &[CandidateElement],
) -> f64 {
    let text = text_similarity(&candidate.context_text, &target.text)
        .max(text_similarity(&candidate.text, &target.text));

    let price = match target.price {
        Some(wanted) => price_proximity(extract_price(&candidate.context_text), wanted),
        // No price in the target: the term is neutral, not a penalty.
        None => 1.0,
    };

    let structure = structure_score(candidate, all);

    weights.text * text + weights.price * price + weights.structure * structure
}

/// Normalized Levenshtein similarity in [0, 1], case-insensitive. Also
/// grants full text credit when one string contains the other, so a short
/// room name matches a long card blurb.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a.contains(&b) || b.contains(&a) {
        return 1.0;
    }
    let dist = levenshtein(&a, &b) as f64;
    let max_len = a.chars().count().max(b.chars().count()) as f64;
    1.0 - dist / max_len
}

/// 1.0 at an exact price match, falling off linearly with relative distance.
pub fn price_proximity(found: Option<f64>, wanted: f64) -> f64 {
    match found {
        Some(found) => {
            let rel = (found - wanted).abs() / wanted.abs().max(1.0);
            (1.0 - rel).max(0.0)
        }
        None => 0.0,
    }
}

/// Elements sharing their tag+class signature with other candidates are
/// likely members of a repeated card layout, which is where room offers
/// live. Score is the repetition fraction among all candidates.
fn structure_score(candidate: &CandidateElement, all: &[CandidateElement]) -> f64 {
    if all.len() <= 1 {
        return 0.0;
    }
    let repeats = all
        .iter()
        .filter(|c| c.order != candidate.order && c.class_signature == candidate.class_signature)
        .count();
    repeats as f64 / (all.len() - 1) as f64
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(order: usize, text: &str, context: &str, sig: &str) -> CandidateElement {
        CandidateElement {
            order,
            text: text.to_string(),
            context_text: context.to_string(),
            tag: "button".to_string(),
            class_signature: sig.to_string(),
            visible: true,
            enabled: true,
        }
    }

    #[test]
    fn default_weights_sum_to_one() {
        let w = ScoreWeights::default();
        assert!((w.text + w.price + w.structure - 1.0).abs() < 1e-9);
    }

    #[test]
    fn levenshtein_bounds() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("deluxe", "deluxe"), 0);
    }

    #[test]
    fn similarity_is_symmetric_and_bounded() {
        let s = text_similarity("Camera Deluxe", "Deluxe Camera");
        assert!((0.0..=1.0).contains(&s));
        assert_eq!(s, text_similarity("Deluxe Camera", "Camera Deluxe"));
    }

    #[test]
    fn containment_counts_as_full_match() {
        assert_eq!(
            text_similarity("Camera Deluxe con balcone e vista mare €120", "Deluxe"),
            1.0
        );
    }

    #[test]
    fn closer_price_never_scores_lower() {
        let exact = price_proximity(Some(120.0), 120.0);
        let near = price_proximity(Some(125.0), 120.0);
        let far = price_proximity(Some(300.0), 120.0);
        assert_eq!(exact, 1.0);
        assert!(exact >= near);
        assert!(near > far);
        assert_eq!(price_proximity(None, 120.0), 0.0);
    }

    #[test]
    fn picks_candidate_matching_text_and_price() {
        let candidates = vec![
            candidate(0, "Prenota", "Camera Standard €80,00 a notte", "button.book"),
            candidate(1, "Prenota", "Camera Deluxe €120,00 a notte", "button.book"),
            candidate(2, "Maggiori info", "Informazioni hotel", "a.info"),
        ];
        let target = FuzzyTarget {
            text: "Camera Deluxe".to_string(),
            price: Some(120.0),
        };
        let best = pick_best(&candidates, &target, &ScoreWeights::default(), 0.5)
            .unwrap();
        assert_eq!(best.order, 1);
    }

    #[test]
    fn ties_keep_document_order() {
        let candidates = vec![
            candidate(0, "Prenota", "Camera Deluxe €120,00", "button.book"),
            candidate(1, "Prenota", "Camera Deluxe €120,00", "button.book"),
        ];
        let target = FuzzyTarget {
            text: "Camera Deluxe".to_string(),
            price: Some(120.0),
        };
        let best = pick_best(&candidates, &target, &ScoreWeights::default(), 0.5)
            .unwrap();
        assert_eq!(best.order, 0);
    }

    #[test]
    fn below_threshold_yields_none() {
        let candidates = vec![candidate(0, "FAQ", "Domande frequenti", "a.faq")];
        let target = FuzzyTarget {
            text: "Suite Presidenziale".to_string(),
            price: Some(900.0),
        };
        assert!(pick_best(&candidates, &target, &ScoreWeights::default(), 0.5).is_none());
    }

    #[test]
    fn invisible_candidates_are_skipped() {
        let mut hidden = candidate(0, "Prenota", "Camera Deluxe €120,00", "button.book");
        hidden.visible = false;
        let target = FuzzyTarget {
            text: "Camera Deluxe".to_string(),
            price: None,
        };
        assert!(pick_best(&[hidden], &target, &ScoreWeights::default(), 0.5).is_none());
    }
}
