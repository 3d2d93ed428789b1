use std::sync::Arc;

use image::imageops::FilterType;
use log::debug;

use super::features::{FeatureExtractor, CANONICAL_SIZE};
use super::noise::NoiseSource;
use super::ranking::{self, Prediction};
use super::scoring::{self, RuleTable};
use crate::vocabulary::ClassVocabulary;

/// A thread-safe, deterministic plant-disease classifier.
///
/// Every prediction is a pure function of the input bytes: features are
/// extracted from the decoded image, the only random perturbation is seeded
/// by a content hash of those same bytes, and nothing is mutated between
/// calls.
///
/// # Thread Safety
///
/// This type is `Send + Sync`: the vocabulary, rule table, extractor, and
/// noise source are all read-only after construction and shared via `Arc`.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use agrilens::{Classifier, ClassVocabulary};
/// use std::sync::Arc;
/// use std::thread;
///
/// let classifier = Arc::new(
///     Classifier::builder()
///         .with_vocabulary(ClassVocabulary::plant_village())
///         .build()?,
/// );
///
/// let mut handles = vec![];
/// for _ in 0..3 {
///     let classifier = Arc::clone(&classifier);
///     handles.push(thread::spawn(move || {
///         classifier.predict(b"not an image");
///     }));
/// }
/// for handle in handles {
///     handle.join().unwrap();
/// }
/// # Ok(())
/// # }
/// ```
pub struct Classifier {
    pub(super) vocabulary: Arc<ClassVocabulary>,
    pub(super) rules: RuleTable,
    pub(super) extractor: Arc<dyn FeatureExtractor>,
    pub(super) noise: Arc<dyn NoiseSource>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Classifier>();
    }
};

/// A snapshot of the classifier's configuration.
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    pub num_classes: usize,
    pub class_labels: Vec<String>,
    pub healthy_classes: usize,
    pub extractor: &'static str,
    pub canonical_size: u32,
}

impl Classifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    /// Returns information about the classifier's current state
    pub fn info(&self) -> ClassifierInfo {
        ClassifierInfo {
            num_classes: self.vocabulary.len(),
            class_labels: self.vocabulary.labels().to_vec(),
            healthy_classes: self.vocabulary.healthy_count(),
            extractor: self.extractor.name(),
            canonical_size: CANONICAL_SIZE,
        }
    }

    /// The vocabulary the probability vector is aligned to.
    pub fn vocabulary(&self) -> &ClassVocabulary {
        &self.vocabulary
    }

    /// Predicts disease probabilities from raw image bytes.
    ///
    /// The returned vector is aligned with the vocabulary order, every entry
    /// is non-negative, and the entries sum to 1. This method never fails:
    /// bytes that cannot be decoded as an image (JPEG/PNG/WebP) produce a
    /// uniform distribution, so a caller always receives an answer.
    ///
    /// # Example
    /// ```rust
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use agrilens::{Classifier, ClassVocabulary};
    ///
    /// let classifier = Classifier::builder()
    ///     .with_vocabulary(ClassVocabulary::plant_village())
    ///     .build()?;
    ///
    /// let probabilities = classifier.predict(b"not an image");
    /// assert_eq!(probabilities.len(), 38);
    /// let sum: f32 = probabilities.iter().sum();
    /// assert!((sum - 1.0).abs() < 1e-6);
    /// # Ok(())
    /// # }
    /// ```
    pub fn predict(&self, image_bytes: &[u8]) -> Vec<f32> {
        let decoded = match image::load_from_memory(image_bytes) {
            Ok(img) => img,
            Err(e) => {
                debug!("unrecognized image ({}); returning uniform distribution", e);
                return ranking::uniform(self.vocabulary.len());
            }
        };

        let canonical = decoded
            .resize_exact(CANONICAL_SIZE, CANONICAL_SIZE, FilterType::Triangle)
            .to_rgb8();
        let features = self.extractor.extract(&canonical);
        debug!("features: {:?}", features);

        let mut noise = self.noise.sequence(image_bytes);
        let scores = scoring::score(&features, &self.vocabulary, &self.rules, noise.as_mut());
        ranking::normalize(&scores)
    }

    /// Predicts and returns the `k` most probable classes, ranked.
    ///
    /// Ties are broken by vocabulary order; `k` is clamped to the vocabulary
    /// size.
    pub fn predict_top_k(&self, image_bytes: &[u8], k: usize) -> Vec<Prediction> {
        let probabilities = self.predict(image_bytes);
        ranking::top_k(&probabilities, &self.vocabulary, k)
    }
}
