//! Hand-written learning primitives: a TF-IDF vectorizer and a random forest classifier.

pub mod forest;
pub mod vectorizer;

pub use forest::{DecisionTree, ForestParams, MaxFeatures, RandomForest};
pub use vectorizer::{TfidfVectorizer, VectorizerParams};
