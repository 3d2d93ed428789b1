//! The classification pipeline: feature extraction, content-seeded noise,
//! rule-based scoring, and ranking, behind a thread-safe facade.

mod builder;
#[allow(clippy::module_inception)]
mod classifier;
mod error;
pub mod features;
mod noise;
mod ranking;
mod scoring;

pub use builder::ClassifierBuilder;
pub use classifier::{Classifier, ClassifierInfo};
pub use error::ClassifierError;
pub use features::{
    ColorStatisticsExtractor, FeatureExtractor, FeatureSet, LesionCountExtractor, CANONICAL_SIZE,
};
pub use noise::{content_seed, ContentHashNoise, NoiseSequence, NoiseSource};
pub use ranking::{top_k, Prediction, DEFAULT_TOP_K};
pub use scoring::RuleTable;
