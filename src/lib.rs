//! # AgriLens
//!
//! A deterministic, heuristic plant-disease classifier. Raw image bytes go
//! through color and texture feature extraction, a rule-based scoring engine
//! with content-hash-seeded noise, and come out as a normalized probability
//! vector over a fixed class vocabulary.
//!
//! Prediction is infallible: bytes that do not decode as an image produce a
//! uniform distribution instead of an error.
//!
//! ```rust
//! use agrilens::{Classifier, ClassVocabulary};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let classifier = Classifier::builder()
//!     .with_vocabulary(ClassVocabulary::plant_village())
//!     .build()?;
//!
//! // Undecodable bytes fall back to the uniform distribution.
//! let probabilities = classifier.predict(b"corrupted upload");
//! assert_eq!(probabilities.len(), 38);
//! assert!((probabilities.iter().sum::<f32>() - 1.0).abs() < 1e-6);
//! # Ok(())
//! # }
//! ```
//!
//! With a real photo, identical bytes always yield identical rankings:
//!
//! ```rust,no_run
//! use agrilens::{Classifier, ClassVocabulary, DEFAULT_TOP_K};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let classifier = Classifier::builder()
//!     .with_vocabulary(ClassVocabulary::plant_village())
//!     .build()?;
//!
//! let bytes = std::fs::read("leaf.jpg")?;
//! for prediction in classifier.predict_top_k(&bytes, DEFAULT_TOP_K) {
//!     println!("{}. {} ({:.1}%)", prediction.rank, prediction.label,
//!         prediction.probability * 100.0);
//! }
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod geotag;
pub mod treatment;
pub mod vocabulary;

pub use classifier::{
    content_seed, Classifier, ClassifierBuilder, ClassifierError, ClassifierInfo,
    ColorStatisticsExtractor, ContentHashNoise, FeatureExtractor, FeatureSet,
    LesionCountExtractor, NoiseSequence, NoiseSource, Prediction, RuleTable, CANONICAL_SIZE,
    DEFAULT_TOP_K,
};
pub use geotag::{extract_location, Location};
pub use treatment::{TreatmentDatabase, TreatmentError, TreatmentInfo};
pub use vocabulary::{ClassVocabulary, DiseaseCategory};
