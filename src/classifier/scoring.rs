use log::debug;

use super::features::FeatureSet;
use super::noise::NoiseSequence;
use crate::vocabulary::{ClassVocabulary, DiseaseCategory};

/// Tunable constants for the scoring heuristics.
///
/// The defaults are the canonical rule table; an alternative table can be
/// supplied through the builder without touching the engine itself.
#[derive(Debug, Clone)]
pub struct RuleTable {
    /// Weight of the green index in the health score.
    pub green_weight: f32,
    /// Penalty weight of the necrosis index.
    pub necrosis_weight: f32,
    /// Penalty weight of the chlorosis index.
    pub chlorosis_weight: f32,
    /// Midpoint of the logistic squash applied to the health score.
    pub logistic_midpoint: f32,
    /// Steepness of the logistic squash.
    pub logistic_steepness: f32,
    /// Entropy (bits) above which the image is considered spotty.
    pub entropy_threshold: f32,
    /// Edge density above which the image is considered spotty.
    pub edge_threshold: f32,
    /// Necrosis index above which the image is considered necrotic.
    pub necrosis_threshold: f32,
    /// Chlorosis index above which the image is considered chlorotic.
    pub chlorosis_threshold: f32,
    /// Bonus added per matching active category.
    pub category_bonus: f32,
    /// Upper bound of the seeded uniform noise added per disease class.
    pub noise_range: f32,
    /// Dark-spot count at which the spotty flag activates, when the
    /// extractor provides counts.
    pub dark_spot_flag: u32,
    /// Lesion count at which the spotty flag activates, when the extractor
    /// provides counts.
    pub lesion_flag: u32,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self {
            green_weight: 2.0,
            necrosis_weight: 1.5,
            chlorosis_weight: 1.0,
            logistic_midpoint: 0.2,
            logistic_steepness: 5.0,
            entropy_threshold: 7.0,
            edge_threshold: 0.15,
            necrosis_threshold: 0.15,
            chlorosis_threshold: 0.15,
            category_bonus: 0.4,
            noise_range: 0.2,
            dark_spot_flag: 4,
            lesion_flag: 4,
        }
    }
}

impl RuleTable {
    /// The engine's belief that the plant is healthy, in (0, 1).
    ///
    /// A weighted linear combination of the color indices squashed through a
    /// logistic function, independent of which specific disease might be
    /// present.
    pub(crate) fn health_probability(&self, features: &FeatureSet) -> f32 {
        let health_score = self.green_weight * features.green_index
            - self.necrosis_weight * features.necrosis_index
            - self.chlorosis_weight * features.chlorosis_index;
        1.0 / (1.0 + (-self.logistic_steepness * (health_score - self.logistic_midpoint)).exp())
    }

    /// Threshold-derived category flags for this feature set.
    pub(crate) fn flags(&self, features: &FeatureSet) -> CategoryFlags {
        CategoryFlags {
            spotty: features.entropy > self.entropy_threshold
                || features.edge_density > self.edge_threshold
                || features
                    .dark_spot_count
                    .is_some_and(|n| n >= self.dark_spot_flag)
                || features.lesion_count.is_some_and(|n| n >= self.lesion_flag),
            necrotic: features.necrosis_index > self.necrosis_threshold,
            chlorotic: features.chlorosis_index > self.chlorosis_threshold,
        }
    }
}

/// Which disease categories the visual evidence supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CategoryFlags {
    pub spotty: bool,
    pub necrotic: bool,
    pub chlorotic: bool,
}

impl CategoryFlags {
    fn is_active(&self, category: DiseaseCategory) -> bool {
        match category {
            DiseaseCategory::Spotty => self.spotty,
            DiseaseCategory::Necrotic => self.necrotic,
            DiseaseCategory::Chlorotic => self.chlorotic,
        }
    }
}

/// Combines the feature set with the rule table into unnormalized per-class
/// scores, aligned with the vocabulary order.
///
/// Healthy classes score the health probability directly. Disease classes
/// accumulate a bonus per matching active category plus one noise draw, and
/// the sum is scaled by the disease mass `1 - health_prob`. Every score is
/// clamped to be non-negative.
pub(crate) fn score(
    features: &FeatureSet,
    vocabulary: &ClassVocabulary,
    rules: &RuleTable,
    noise: &mut dyn NoiseSequence,
) -> Vec<f32> {
    let health_prob = rules.health_probability(features);
    let flags = rules.flags(features);
    debug!(
        "health_prob={:.4} flags: spotty={} necrotic={} chlorotic={}",
        health_prob, flags.spotty, flags.necrotic, flags.chlorotic
    );

    let base = 1.0 - health_prob;
    (0..vocabulary.len())
        .map(|index| {
            if vocabulary.is_healthy(index) {
                health_prob
            } else {
                let mut bonus = 0.0f32;
                for category in DiseaseCategory::ALL {
                    if flags.is_active(category) && vocabulary.in_category(index, category) {
                        bonus += rules.category_bonus;
                    }
                }
                bonus += noise.next_uniform(0.0, rules.noise_range);
                (bonus * base).max(0.0)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Noise stub that always yields the same value, so the category bonus
    /// contribution can be checked exactly.
    struct FixedNoise(f32);

    impl NoiseSequence for FixedNoise {
        fn next_uniform(&mut self, _lo: f32, _hi: f32) -> f32 {
            self.0
        }
    }

    fn necrotic_features() -> FeatureSet {
        FeatureSet {
            green_index: 0.0,
            chlorosis_index: 0.0,
            necrosis_index: 0.5,
            entropy: 3.0,
            edge_density: 0.01,
            color_uniformity: 0.5,
            dark_spot_count: None,
            lesion_count: None,
        }
    }

    fn vocab(labels: &[&str]) -> ClassVocabulary {
        ClassVocabulary::new(labels.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_healthy_class_scores_health_probability() {
        let rules = RuleTable::default();
        let features = necrotic_features();
        let vocabulary = vocab(&["Tomato healthy", "Tomato Late blight"]);
        let scores = score(&features, &vocabulary, &rules, &mut FixedNoise(0.0));

        let expected = rules.health_probability(&features);
        assert!((scores[0] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_category_bonus_contribution_is_exact() {
        let rules = RuleTable::default();
        let features = necrotic_features();
        let vocabulary = vocab(&["Tomato Late blight", "Tomato mosaic virus"]);
        let scores = score(&features, &vocabulary, &rules, &mut FixedNoise(0.1));

        let base = 1.0 - rules.health_probability(&features);
        // Blight matches the active necrotic flag; mosaic virus matches the
        // inactive chlorotic flag and gets only the noise term.
        assert!((scores[0] - (0.4 + 0.1) * base).abs() < 1e-6);
        assert!((scores[1] - 0.1 * base).abs() < 1e-6);
    }

    #[test]
    fn test_spotty_flag_is_a_disjunction() {
        let rules = RuleTable::default();
        let mut features = necrotic_features();

        features.entropy = 7.5;
        features.edge_density = 0.01;
        assert!(rules.flags(&features).spotty);

        features.entropy = 3.0;
        features.edge_density = 0.2;
        assert!(rules.flags(&features).spotty);

        features.edge_density = 0.01;
        features.dark_spot_count = Some(5);
        assert!(rules.flags(&features).spotty);

        features.dark_spot_count = Some(1);
        assert!(!rules.flags(&features).spotty);
    }

    #[test]
    fn test_lesion_count_activates_spotty_flag() {
        let rules = RuleTable::default();
        let mut features = necrotic_features();
        features.necrosis_index = 0.0;

        features.lesion_count = Some(3);
        assert!(!rules.flags(&features).spotty);
        features.lesion_count = Some(4);
        assert!(rules.flags(&features).spotty);

        // A spot class scores higher once the lesion count crosses the
        // threshold, with everything else held fixed.
        let vocabulary = vocab(&["Tomato Bacterial spot"]);
        features.lesion_count = Some(3);
        let below = score(&features, &vocabulary, &rules, &mut FixedNoise(0.1));
        features.lesion_count = Some(4);
        let above = score(&features, &vocabulary, &rules, &mut FixedNoise(0.1));
        let base = 1.0 - rules.health_probability(&features);
        assert!((below[0] - 0.1 * base).abs() < 1e-6);
        assert!((above[0] - (0.4 + 0.1) * base).abs() < 1e-6);
    }

    #[test]
    fn test_scores_are_never_negative() {
        let rules = RuleTable::default();
        let features = necrotic_features();
        let vocabulary = vocab(&["Apple scab", "Apple healthy"]);
        let scores = score(&features, &vocabulary, &rules, &mut FixedNoise(-1.0));
        assert!(scores.iter().all(|&s| s >= 0.0));
    }

    #[test]
    fn test_double_category_match_stacks_bonuses() {
        let rules = RuleTable::default();
        let mut features = necrotic_features();
        features.entropy = 7.5; // spotty and necrotic both active

        // "rust" and "rot" style keywords in a single label.
        let vocabulary = vocab(&["Corn rust rot"]);
        let scores = score(&features, &vocabulary, &rules, &mut FixedNoise(0.0));
        let base = 1.0 - rules.health_probability(&features);
        assert!((scores[0] - 0.8 * base).abs() < 1e-6);
    }
}
