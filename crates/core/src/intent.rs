use serde::{Deserialize, Serialize};

use crate::calculator;

/// Keywords and symbols whose mere presence routes an utterance to the
/// calculator. This is a coarse OR on purpose: "what can you add?" counts as
/// arithmetic even though no parseable expression follows, and any hyphen
/// anywhere in the text trips the `-` entry.
pub const ARITHMETIC_KEYWORDS: &[&str] = &[
    "add",
    "plus",
    "minus",
    "subtract",
    "times",
    "multiplied",
    "divide",
    "divided",
    "+",
    "-",
    "*",
    "/",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Arithmetic,
    ProductQuery,
    OutletQuery,
    GeneralConversation,
}

type RoutePredicate = fn(&str) -> bool;

/// Declaration order is the priority order. The first matching predicate
/// wins; ties between routes do not exist because evaluation short-circuits.
const ROUTES: &[(RoutePredicate, Intent)] = &[
    (is_arithmetic, Intent::Arithmetic),
    (is_product_query, Intent::ProductQuery),
    (is_outlet_query, Intent::OutletQuery),
];

impl Intent {
    /// Classify an utterance. Total and deterministic: every input maps to
    /// exactly one intent, falling back to `GeneralConversation` when no
    /// route predicate matches.
    pub fn classify(utterance: &str) -> Intent {
        let normalized = utterance.to_lowercase();
        ROUTES
            .iter()
            .find(|(predicate, _)| predicate(&normalized))
            .map(|(_, intent)| *intent)
            .unwrap_or(Intent::GeneralConversation)
    }
}

fn is_arithmetic(normalized: &str) -> bool {
    calculator::is_bare_expression(normalized)
        || ARITHMETIC_KEYWORDS.iter().any(|keyword| normalized.contains(keyword))
}

fn is_product_query(normalized: &str) -> bool {
    normalized.contains("product")
}

fn is_outlet_query(normalized: &str) -> bool {
    normalized.contains("outlet") || normalized.contains("store")
}
