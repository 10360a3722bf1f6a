//! Random forest temperament classifier.
//!
//! Bagged CART trees (gini impurity, sqrt(d) candidate features per split)
//! trained once on synthetic profiles drawn from `CATEGORY_PROFILES`. The
//! data generator and bootstrap share one seeded `StdRng`, so a given config
//! always produces the same forest.

use crate::classifier::{
    Classification, FeatureVector, TemperamentClassifier, CATEGORY_PROFILES, FEATURE_DIM,
};
use portrait_core::config::ClassifierConfig;
use portrait_core::TemperamentCategory;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const N_CLASSES: usize = TemperamentCategory::ALL.len();

/// One labelled training row.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub features: [f64; FEATURE_DIM],
    pub label: usize,
}

/// Draw `per_class` rows for every category profile. Trait columns are integral.
pub fn synthetic_dataset(per_class: usize, rng: &mut StdRng) -> Vec<Sample> {
    let mut samples = Vec::with_capacity(per_class * CATEGORY_PROFILES.len());
    for profile in CATEGORY_PROFILES.iter() {
        for _ in 0..per_class {
            let mut features = [0.0; FEATURE_DIM];
            let slots = features.iter_mut().zip(profile.ranges.iter());
            for (i, (slot, &(lo, hi))) in slots.enumerate() {
                *slot = if i < 5 {
                    rng.gen_range(lo as i64..hi as i64) as f64
                } else {
                    rng.gen_range(lo..hi)
                };
            }
            samples.push(Sample { features, label: profile.category.index() });
        }
    }
    samples
}

// ============================================================================
// Decision tree
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: usize,
}

impl TreeParams {
    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self {
            max_depth: config.max_depth.max(1),
            min_samples_split: config.min_samples_split.max(2),
            min_samples_leaf: config.min_samples_leaf.max(1),
            max_features: ((FEATURE_DIM as f64).sqrt() as usize).max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        probabilities: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, x: &[f64; FEATURE_DIM]) -> &[f64] {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { probabilities } => return probabilities,
                Node::Split { feature, threshold, left, right } => {
                    node = if x[*feature] <= *threshold { &**left } else { &**right };
                }
            }
        }
    }

    fn count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => 1 + left.count() + right.count(),
        }
    }
}

/// Gini impurity of a class histogram.
pub fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    1.0 - counts.iter().map(|&c| (c as f64 / n).powi(2)).sum::<f64>()
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

struct TreeBuilder<'a> {
    data: &'a [Sample],
    params: TreeParams,
}

impl TreeBuilder<'_> {
    fn histogram(&self, indices: &[usize]) -> [usize; N_CLASSES] {
        let mut counts = [0usize; N_CLASSES];
        for &i in indices {
            counts[self.data[i].label] += 1;
        }
        counts
    }

    fn leaf(counts: &[usize; N_CLASSES], total: usize) -> Node {
        let n = total.max(1) as f64;
        Node::Leaf {
            probabilities: counts.iter().map(|&c| c as f64 / n).collect(),
        }
    }

    fn build(&self, indices: &mut [usize], depth: usize, rng: &mut StdRng) -> Node {
        let counts = self.histogram(indices);
        let n = indices.len();
        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;

        if pure || depth >= self.params.max_depth || n < self.params.min_samples_split {
            return Self::leaf(&counts, n);
        }

        let Some(split) = self.best_split(indices, gini(&counts, n), rng) else {
            return Self::leaf(&counts, n);
        };

        let (mut left, mut right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.data[i].features[split.feature] <= split.threshold);

        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.build(&mut left, depth + 1, rng)),
            right: Box::new(self.build(&mut right, depth + 1, rng)),
        }
    }

    /// Examine features in random order until `max_features` have been tried
    /// and at least one valid split was found.
    fn best_split(
        &self,
        indices: &mut [usize],
        parent: f64,
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let mut order: Vec<usize> = (0..FEATURE_DIM).collect();
        order.shuffle(rng);

        let mut best: Option<SplitCandidate> = None;
        for (tried, &feature) in order.iter().enumerate() {
            if tried >= self.params.max_features && best.is_some() {
                break;
            }
            if let Some(candidate) = self.best_split_on(indices, feature) {
                if candidate.impurity < parent - 1e-12
                    && best.as_ref().map_or(true, |b| candidate.impurity < b.impurity)
                {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    fn best_split_on(&self, indices: &mut [usize], feature: usize) -> Option<SplitCandidate> {
        let data = self.data;
        indices.sort_by(|&a, &b| data[a].features[feature].total_cmp(&data[b].features[feature]));

        let n = indices.len();
        let min_leaf = self.params.min_samples_leaf;
        let mut left = [0usize; N_CLASSES];
        let mut right = self.histogram(indices);
        let mut best: Option<SplitCandidate> = None;

        for pos in 1..n {
            let moved = data[indices[pos - 1]].label;
            left[moved] += 1;
            right[moved] -= 1;

            if pos < min_leaf || n - pos < min_leaf {
                continue;
            }
            let lo = data[indices[pos - 1]].features[feature];
            let hi = data[indices[pos]].features[feature];
            if lo >= hi {
                continue;
            }

            let impurity = (pos as f64 * gini(&left, pos)
                + (n - pos) as f64 * gini(&right, n - pos))
                / n as f64;
            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                best = Some(SplitCandidate { feature, threshold: (lo + hi) / 2.0, impurity });
            }
        }
        best
    }
}

// ============================================================================
// Forest
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<Node>,
}

impl RandomForest {
    /// Fit `n_trees` trees, each on a bootstrap resample of `data`.
    pub fn fit(data: &[Sample], n_trees: usize, params: TreeParams, rng: &mut StdRng) -> Self {
        let mut trees = Vec::with_capacity(n_trees);
        if data.is_empty() {
            return Self { trees };
        }
        let builder = TreeBuilder { data, params };
        for _ in 0..n_trees {
            let mut bootstrap: Vec<usize> =
                (0..data.len()).map(|_| rng.gen_range(0..data.len())).collect();
            trees.push(builder.build(&mut bootstrap, 0, rng));
        }
        Self { trees }
    }

    /// Mean class probabilities over all trees; all zeros for an empty forest.
    pub fn predict_proba(&self, x: &[f64; FEATURE_DIM]) -> Vec<f64> {
        let mut sum = vec![0.0; N_CLASSES];
        for tree in &self.trees {
            for (acc, p) in sum.iter_mut().zip(tree.predict(x)) {
                *acc += p;
            }
        }
        if !self.trees.is_empty() {
            let n = self.trees.len() as f64;
            sum.iter_mut().for_each(|p| *p /= n);
        }
        sum
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.trees.iter().map(Node::count).sum()
    }
}

/// Forest-backed classifier with a confidence floor below which it answers `Mixed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestClassifier {
    forest: RandomForest,
    min_confidence: f64,
}

impl ForestClassifier {
    pub fn train(config: &ClassifierConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let data = synthetic_dataset(config.samples_per_class, &mut rng);
        let params = TreeParams::from_config(config);
        let forest = RandomForest::fit(&data, config.trees, params, &mut rng);
        tracing::debug!(
            "Forest fit on {} samples: {} trees, {} nodes",
            data.len(),
            forest.len(),
            forest.node_count()
        );
        Self {
            forest,
            min_confidence: config.min_confidence,
        }
    }

    pub fn tree_count(&self) -> usize {
        self.forest.len()
    }

    pub fn probabilities(&self, features: &FeatureVector) -> Vec<f64> {
        self.forest.predict_proba(features.values())
    }

    /// Serialize to JSON for persistence.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl TemperamentClassifier for ForestClassifier {
    fn name(&self) -> &'static str {
        "forest"
    }

    fn classify(&self, features: &FeatureVector) -> Classification {
        let proba = self.probabilities(features);
        // First maximum wins, so ties resolve to the earlier category.
        let (best, confidence) = proba
            .iter()
            .enumerate()
            .fold((N_CLASSES - 1, f64::MIN), |acc, (i, &p)| if p > acc.1 { (i, p) } else { acc });
        let confidence = confidence.max(0.0);

        let category = if confidence < self.min_confidence {
            TemperamentCategory::Mixed
        } else {
            TemperamentCategory::from_index(best)
        };
        Classification { category, confidence }
    }
}
