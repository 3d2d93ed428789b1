use std::collections::HashSet;

use crate::classifier::ClassifierError;

/// Visual disease categories used for keyword-based class dispatch.
///
/// Each category groups disease names that share a visual signature, so the
/// scoring engine can translate image evidence (texture, color) into a bonus
/// for the matching classes. The keyword table is static data rather than
/// ad-hoc string checks scattered through the scorer; the builder verifies
/// coverage against the vocabulary once at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiseaseCategory {
    /// Rust and leaf-spot diseases: complex texture, strong edges.
    Spotty,
    /// Blight and rot: browning/blackening tissue.
    Necrotic,
    /// Viral and yellowing conditions: chlorotic tissue.
    Chlorotic,
}

impl DiseaseCategory {
    pub const ALL: [DiseaseCategory; 3] = [
        DiseaseCategory::Spotty,
        DiseaseCategory::Necrotic,
        DiseaseCategory::Chlorotic,
    ];

    /// Lowercase substrings that assign a class label to this category.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            DiseaseCategory::Spotty => &["rust", "spot"],
            DiseaseCategory::Necrotic => &["blight", "rot"],
            DiseaseCategory::Chlorotic => &["virus", "yellow"],
        }
    }

    /// Returns true if the class label belongs to this category.
    pub fn matches(self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.keywords().iter().any(|kw| label.contains(kw))
    }
}

/// The 38 PlantVillage crop/condition labels, in canonical order.
const PLANT_VILLAGE_CLASSES: [&str; 38] = [
    "Apple scab",
    "Apple Black rot",
    "Cedar apple rust",
    "Apple healthy",
    "Blueberry healthy",
    "Cherry Powdery mildew",
    "Cherry healthy",
    "Corn Cercospora leaf spot",
    "Corn Common rust",
    "Corn Northern Leaf Blight",
    "Corn healthy",
    "Grape Black rot",
    "Grape Black Measles",
    "Grape Leaf blight",
    "Grape healthy",
    "Orange Haunglongbing",
    "Peach Bacterial spot",
    "Peach healthy",
    "Bell Peppers Bacterial spot",
    "Bell Peppers healthy",
    "Potato Early blight",
    "Potato Late blight",
    "Potato healthy",
    "Raspberry healthy",
    "Soybean healthy",
    "Squash Powdery mildew",
    "Strawberry Leaf scorch",
    "Strawberry healthy",
    "Tomato Bacterial spot",
    "Tomato Early blight",
    "Tomato Late blight",
    "Tomato Leaf Mold",
    "Tomato Septoria leaf spot",
    "Tomato Spider mites",
    "Tomato Target Spot",
    "Tomato Yellow Leaf Curl Virus",
    "Tomato mosaic virus",
    "Tomato healthy",
];

/// An ordered, validated list of disease-class labels.
///
/// The order is fixed at construction and defines the positional alignment of
/// every probability vector the classifier produces. Labels follow the
/// "crop + condition" convention (e.g. "Tomato Late blight", "Apple healthy");
/// a label containing "healthy" (case-insensitive) denotes a healthy state.
#[derive(Debug, Clone)]
pub struct ClassVocabulary {
    labels: Vec<String>,
    healthy: Vec<bool>,
    // Category membership per label, indexed by DiseaseCategory discriminant.
    // Computed once here so the scoring loop never re-lowercases labels.
    categories: Vec<[bool; 3]>,
}

impl ClassVocabulary {
    /// Creates a vocabulary from an ordered list of labels.
    ///
    /// # Errors
    /// Returns `ClassifierError::VocabularyError` if the list is empty,
    /// contains an empty label, or contains duplicates.
    pub fn new(labels: Vec<String>) -> Result<Self, ClassifierError> {
        if labels.is_empty() {
            return Err(ClassifierError::VocabularyError(
                "Vocabulary must contain at least one class".into(),
            ));
        }
        let mut seen = HashSet::new();
        for label in &labels {
            if label.is_empty() {
                return Err(ClassifierError::VocabularyError(
                    "Class labels cannot be empty".into(),
                ));
            }
            if !seen.insert(label.as_str()) {
                return Err(ClassifierError::VocabularyError(format!(
                    "Duplicate class label: '{}'",
                    label
                )));
            }
        }
        let mut healthy = Vec::with_capacity(labels.len());
        let mut categories = Vec::with_capacity(labels.len());
        for label in &labels {
            let lower = label.to_lowercase();
            healthy.push(lower.contains("healthy"));
            categories.push(
                DiseaseCategory::ALL
                    .map(|c| c.keywords().iter().any(|kw| lower.contains(kw))),
            );
        }
        Ok(Self {
            labels,
            healthy,
            categories,
        })
    }

    /// The built-in PlantVillage vocabulary (38 classes, 14 crops).
    pub fn plant_village() -> Self {
        let labels = PLANT_VILLAGE_CLASSES.iter().map(|s| s.to_string()).collect();
        Self::new(labels).expect("built-in vocabulary is valid")
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a constructed vocabulary; present for completeness.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn label(&self, index: usize) -> &str {
        &self.labels[index]
    }

    /// Whether the class at `index` denotes a healthy state.
    pub fn is_healthy(&self, index: usize) -> bool {
        self.healthy[index]
    }

    /// Whether the class at `index` belongs to the given disease category.
    pub fn in_category(&self, index: usize, category: DiseaseCategory) -> bool {
        self.categories[index][category as usize]
    }

    pub fn healthy_count(&self) -> usize {
        self.healthy.iter().filter(|&&h| h).count()
    }

    /// Iterates over `(label, is_healthy)` pairs in vocabulary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.labels
            .iter()
            .map(|l| l.as_str())
            .zip(self.healthy.iter().copied())
    }

    /// Labels of non-healthy classes that match no disease category.
    ///
    /// These classes can never receive a category bonus and will only be
    /// separated from their peers by seeded noise; the builder surfaces them
    /// as configuration warnings.
    pub(crate) fn uncategorized(&self) -> Vec<&str> {
        self.labels
            .iter()
            .enumerate()
            .filter(|&(i, _)| !self.healthy[i] && !self.categories[i].contains(&true))
            .map(|(_, label)| label.as_str())
            .collect()
    }
}
