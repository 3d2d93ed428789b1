use std::sync::Arc;

use log::{info, warn};

use super::classifier::Classifier;
use super::error::ClassifierError;
use super::features::{ColorStatisticsExtractor, FeatureExtractor};
use super::noise::{ContentHashNoise, NoiseSource};
use super::scoring::RuleTable;
use crate::vocabulary::ClassVocabulary;

/// A builder for constructing a Classifier with a fluent interface.
///
/// The vocabulary is the only required input; the rule table, feature
/// extractor, and noise source all have canonical defaults.
///
/// # Example
/// ```rust
/// use agrilens::{Classifier, LesionCountExtractor};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let classifier = Classifier::builder()
///     .add_class("Tomato Late blight")?
///     .add_class("Tomato healthy")?
///     .with_extractor(LesionCountExtractor::default())
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ClassifierBuilder {
    vocabulary: Option<ClassVocabulary>,
    labels: Vec<String>,
    rules: RuleTable,
    extractor: Option<Arc<dyn FeatureExtractor>>,
    noise: Option<Arc<dyn NoiseSource>>,
}

impl ClassifierBuilder {
    /// Creates a new empty ClassifierBuilder instance with default
    /// configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the complete class vocabulary at once.
    ///
    /// Mutually exclusive with `add_class`.
    pub fn with_vocabulary(mut self, vocabulary: ClassVocabulary) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    /// Adds a single class label, preserving insertion order.
    ///
    /// # Errors
    /// Returns `ValidationError` if the label is empty.
    pub fn add_class(mut self, label: impl Into<String>) -> Result<Self, ClassifierError> {
        let label = label.into();
        if label.is_empty() {
            return Err(ClassifierError::ValidationError(
                "Class label cannot be empty".into(),
            ));
        }
        self.labels.push(label);
        Ok(self)
    }

    /// Replaces the canonical rule table with a custom one.
    pub fn with_rule_table(mut self, rules: RuleTable) -> Self {
        self.rules = rules;
        self
    }

    /// Selects the feature extraction strategy. Defaults to
    /// `ColorStatisticsExtractor`.
    pub fn with_extractor(mut self, extractor: impl FeatureExtractor + 'static) -> Self {
        self.extractor = Some(Arc::new(extractor));
        self
    }

    /// Replaces the content-hash noise source, primarily for tests that need
    /// a fixed generator.
    pub fn with_noise_source(mut self, noise: impl NoiseSource + 'static) -> Self {
        self.noise = Some(Arc::new(noise));
        self
    }

    /// Builds and returns the final Classifier instance.
    ///
    /// # Errors
    /// * `BuildError` if both `with_vocabulary` and `add_class` were used,
    ///   or neither was.
    /// * `VocabularyError` if the accumulated labels are empty or duplicated.
    pub fn build(self) -> Result<Classifier, ClassifierError> {
        let vocabulary = match (self.vocabulary, self.labels.is_empty()) {
            (Some(_), false) => {
                return Err(ClassifierError::BuildError(
                    "Use either with_vocabulary() or add_class(), not both".into(),
                ));
            }
            (Some(vocabulary), true) => vocabulary,
            (None, false) => ClassVocabulary::new(self.labels)?,
            (None, true) => {
                return Err(ClassifierError::BuildError(
                    "A class vocabulary is required; call with_vocabulary() or add_class()".into(),
                ));
            }
        };

        // Keyword dispatch is fragile; surface classes that can never earn a
        // category bonus as configuration warnings at startup.
        let uncategorized = vocabulary.uncategorized();
        for label in &uncategorized {
            warn!(
                "class '{}' matches no disease category and will only be ranked by noise",
                label
            );
        }

        let extractor = self
            .extractor
            .unwrap_or_else(|| Arc::new(ColorStatisticsExtractor));
        let noise = self.noise.unwrap_or_else(|| Arc::new(ContentHashNoise));

        info!(
            "classifier ready: {} classes ({} healthy, {} uncategorized), extractor '{}'",
            vocabulary.len(),
            vocabulary.healthy_count(),
            uncategorized.len(),
            extractor.name()
        );

        Ok(Classifier {
            vocabulary: Arc::new(vocabulary),
            rules: self.rules,
            extractor,
            noise,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_vocabulary_rejected() {
        assert!(Classifier::builder().build().is_err());
    }

    #[test]
    fn test_empty_label_rejected() {
        assert!(Classifier::builder().add_class("").is_err());
    }

    #[test]
    fn test_conflicting_vocabulary_sources_rejected() {
        let result = Classifier::builder()
            .with_vocabulary(ClassVocabulary::plant_village())
            .add_class("Tomato healthy")
            .unwrap()
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_add_class_preserves_order() {
        let classifier = Classifier::builder()
            .add_class("Potato Late blight")
            .unwrap()
            .add_class("Potato healthy")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(classifier.vocabulary().label(0), "Potato Late blight");
        assert_eq!(classifier.vocabulary().label(1), "Potato healthy");
    }

    #[test]
    fn test_default_configuration() {
        let classifier = Classifier::builder()
            .with_vocabulary(ClassVocabulary::plant_village())
            .build()
            .unwrap();
        let info = classifier.info();
        assert_eq!(info.num_classes, 38);
        assert_eq!(info.extractor, "color-statistics");
        assert_eq!(info.canonical_size, 224);
    }
}
