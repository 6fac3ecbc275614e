pub mod fuzzy;
pub mod price;
pub mod resolve;
pub mod scope;
pub mod strategy;

pub use fuzzy::{FuzzyTarget, ScoreWeights};
pub use price::{extract_price, format_eur};
pub use resolve::{ElementResolver, Resolution};
pub use scope::Scope;
pub use strategy::Strategy;
