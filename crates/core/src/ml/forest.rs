//! Random forest classifier over dense feature rows.
//!
//! Trees are grown on bootstrap resamples with class-balanced sample weights and Gini impurity.
//! Each split considers a random subset of features; features that are constant within the node
//! do not count against that budget, which matters for sparse TF-IDF input where most columns are
//! zero in any given node.
//!
//! Fitting is parallel over trees. Every tree gets its own seed drawn up front from the forest
//! seed, so the fitted forest is identical regardless of thread scheduling.

use crate::error::{CoreError, CoreResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Values closer than this are treated as equal when looking for split points.
const FEATURE_THRESHOLD: f64 = 1e-7;

/// How many features each split may examine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least one.
    Sqrt,
    All,
    Fixed(usize),
}

impl MaxFeatures {
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Fixed(n) => (*n).min(n_features),
        };
        n.max(1)
    }
}

/// Hyperparameters for [`RandomForest::fit`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    /// Reweight samples by `n / (n_classes * class_count)`.
    pub balanced_class_weight: bool,
    pub oob_score: bool,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            max_depth: Some(30),
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            balanced_class_weight: true,
            oob_score: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Normalized class distribution, only non-zero entries.
    Leaf { distribution: Vec<(usize, f64)> },
}

/// A single fitted classification tree, stored as a flat node arena rooted at index 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn leaf_distribution(&self, features: &[f64]) -> &[(usize, f64)] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).copied().unwrap_or(0.0);
                    index = if value <= *threshold { *left } else { *right };
                }
                Node::Leaf { distribution } => return distribution,
            }
        }
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    pub fn depth(&self) -> usize {
        fn depth_from(nodes: &[Node], index: usize) -> usize {
            match &nodes[index] {
                Node::Split { left, right, .. } => {
                    1 + depth_from(nodes, *left).max(depth_from(nodes, *right))
                }
                Node::Leaf { .. } => 0,
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            depth_from(&self.nodes, 0)
        }
    }

    fn check_consistency(&self, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".into());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split { left, right, .. } => {
                    // Children are always pushed after their parent.
                    let n_nodes = self.nodes.len();
                    if *left <= index || *right <= index || *left >= n_nodes || *right >= n_nodes {
                        return Err(format!("node {index} has out-of-range children"));
                    }
                }
                Node::Leaf { distribution } => {
                    if distribution.iter().any(|(class, _)| *class >= n_classes) {
                        return Err(format!("leaf {index} references an unknown class"));
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    proxy: f64,
}

struct TreeBuilder<'a> {
    rows: &'a [Vec<f64>],
    targets: &'a [usize],
    weights: &'a [f64],
    n_classes: usize,
    n_features: usize,
    max_features: usize,
    params: &'a ForestParams,
    nodes: Vec<Node>,
}

impl TreeBuilder<'_> {
    fn class_weights(&self, indices: &[usize]) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_classes];
        for &i in indices {
            totals[self.targets[i]] += self.weights[i];
        }
        totals
    }

    fn build(&mut self, indices: &mut [usize], depth: usize, rng: &mut StdRng) -> usize {
        let totals = self.class_weights(indices);
        let occupied = totals.iter().filter(|w| **w > 0.0).count();
        let depth_ok = self.params.max_depth.map_or(true, |max| depth < max);
        let can_split = occupied > 1
            && depth_ok
            && indices.len() >= self.params.min_samples_split
            && indices.len() >= 2 * self.params.min_samples_leaf;

        if can_split {
            if let Some(split) = self.best_split(indices, &totals, rng) {
                let mid = partition(indices, |i| {
                    self.rows[i][split.feature] <= split.threshold
                });
                let id = self.nodes.len();
                self.nodes.push(Node::Leaf {
                    distribution: Vec::new(),
                });
                let (left_indices, right_indices) = indices.split_at_mut(mid);
                let left = self.build(left_indices, depth + 1, rng);
                let right = self.build(right_indices, depth + 1, rng);
                self.nodes[id] = Node::Split {
                    feature: split.feature,
                    threshold: split.threshold,
                    left,
                    right,
                };
                return id;
            }
        }

        let total: f64 = totals.iter().sum();
        let distribution = totals
            .iter()
            .enumerate()
            .filter(|(_, w)| **w > 0.0)
            .map(|(class, w)| (class, w / total))
            .collect();
        self.nodes.push(Node::Leaf { distribution });
        self.nodes.len() - 1
    }

    fn best_split(
        &self,
        indices: &[usize],
        totals: &[f64],
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let min_leaf = self.params.min_samples_leaf;
        let mut features: Vec<usize> = (0..self.n_features).collect();
        let mut remaining = self.n_features;
        let mut visited = 0;
        let mut best: Option<SplitCandidate> = None;
        let mut column: Vec<(f64, usize, f64)> = Vec::with_capacity(indices.len());

        while remaining > 0 && visited < self.max_features {
            let pick = rng.gen_range(0..remaining);
            remaining -= 1;
            features.swap(pick, remaining);
            let feature = features[remaining];

            column.clear();
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for &i in indices {
                let value = self.rows[i][feature];
                min = min.min(value);
                max = max.max(value);
                column.push((value, self.targets[i], self.weights[i]));
            }
            if max <= min + FEATURE_THRESHOLD {
                continue;
            }
            visited += 1;

            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left = vec![0.0; self.n_classes];
            let mut right = totals.to_vec();
            let mut left_sq = 0.0;
            let mut right_sq: f64 = right.iter().map(|w| w * w).sum();
            let mut left_weight = 0.0;
            let mut right_weight: f64 = totals.iter().sum();

            for pos in 0..column.len() - 1 {
                let (value, class, weight) = column[pos];
                left_sq += (left[class] + weight).powi(2) - left[class].powi(2);
                right_sq += (right[class] - weight).powi(2) - right[class].powi(2);
                left[class] += weight;
                right[class] -= weight;
                left_weight += weight;
                right_weight -= weight;

                let next = column[pos + 1].0;
                if next <= value + FEATURE_THRESHOLD {
                    continue;
                }
                let n_left = pos + 1;
                if n_left < min_leaf || column.len() - n_left < min_leaf {
                    continue;
                }
                if left_weight <= 0.0 || right_weight <= 0.0 {
                    continue;
                }

                // Maximizing this minimizes the weighted Gini impurity of the children.
                let proxy = left_sq / left_weight + right_sq / right_weight;
                if best.map_or(true, |b| proxy > b.proxy) {
                    let mut threshold = value / 2.0 + next / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        proxy,
                    });
                }
            }
        }

        best
    }
}

/// Moves indices satisfying `goes_left` to the front and returns how many there are.
fn partition(indices: &mut [usize], goes_left: impl Fn(usize) -> bool) -> usize {
    let mut mid = 0;
    for pos in 0..indices.len() {
        if goes_left(indices[pos]) {
            indices.swap(mid, pos);
            mid += 1;
        }
    }
    mid
}

/// `n / (n_classes * count)` for each class.
pub fn balanced_class_weights(targets: &[usize], n_classes: usize) -> Vec<f64> {
    let mut counts = vec![0usize; n_classes];
    for &t in targets {
        counts[t] += 1;
    }
    let n = targets.len() as f64;
    counts
        .iter()
        .map(|&c| {
            if c == 0 {
                0.0
            } else {
                n / (n_classes as f64 * c as f64)
            }
        })
        .collect()
}

/// A fitted random forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    classes: Vec<String>,
    n_features: usize,
    trees: Vec<DecisionTree>,
    oob_score: Option<f64>,
}

impl RandomForest {
    /// Fits a forest on `rows` labelled by `labels`.
    ///
    /// Classes are ordered alphabetically; probability vectors follow that order.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::TrainingData` if the inputs are empty, ragged, of mismatched length,
    /// or the parameters are unusable.
    pub fn fit<S: AsRef<str>>(
        rows: &[Vec<f64>],
        labels: &[S],
        params: ForestParams,
        seed: u64,
    ) -> CoreResult<Self> {
        if rows.is_empty() || rows.len() != labels.len() {
            return Err(CoreError::TrainingData(format!(
                "forest needs one label per row (rows: {}, labels: {})",
                rows.len(),
                labels.len()
            )));
        }
        let n_features = rows[0].len();
        if n_features == 0 || rows.iter().any(|r| r.len() != n_features) {
            return Err(CoreError::TrainingData(
                "feature rows must be non-empty and of equal length".into(),
            ));
        }
        if params.n_estimators == 0 || params.min_samples_split < 2 || params.min_samples_leaf == 0
        {
            return Err(CoreError::TrainingData(format!(
                "invalid forest parameters: {params:?}"
            )));
        }

        let classes: Vec<String> = labels
            .iter()
            .map(|l| l.as_ref().to_owned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let targets: Vec<usize> = labels
            .iter()
            .map(|l| {
                classes
                    .binary_search_by(|c| c.as_str().cmp(l.as_ref()))
                    .unwrap_or_default()
            })
            .collect();
        let n_classes = classes.len();
        let n_samples = rows.len();

        let class_weights = if params.balanced_class_weight {
            balanced_class_weights(&targets, n_classes)
        } else {
            vec![1.0; n_classes]
        };
        let max_features = params.max_features.resolve(n_features);

        let mut master = StdRng::seed_from_u64(seed);
        let tree_seeds: Vec<u64> = (0..params.n_estimators).map(|_| master.gen()).collect();

        tracing::debug!(
            n_samples,
            n_features,
            n_classes,
            n_estimators = params.n_estimators,
            max_features,
            "fitting random forest"
        );

        let fitted: Vec<(DecisionTree, Vec<bool>)> = tree_seeds
            .par_iter()
            .map(|&tree_seed| {
                let mut rng = StdRng::seed_from_u64(tree_seed);
                let mut counts = vec![0u32; n_samples];
                if params.bootstrap {
                    for _ in 0..n_samples {
                        counts[rng.gen_range(0..n_samples)] += 1;
                    }
                } else {
                    counts.fill(1);
                }

                let weights: Vec<f64> = counts
                    .iter()
                    .zip(&targets)
                    .map(|(&c, &t)| c as f64 * class_weights[t])
                    .collect();
                let mut indices: Vec<usize> = (0..n_samples).filter(|&i| counts[i] > 0).collect();

                let mut builder = TreeBuilder {
                    rows,
                    targets: &targets,
                    weights: &weights,
                    n_classes,
                    n_features,
                    max_features,
                    params: &params,
                    nodes: Vec::new(),
                };
                builder.build(&mut indices, 0, &mut rng);

                let in_bag = counts.iter().map(|&c| c > 0).collect();
                (DecisionTree { nodes: builder.nodes }, in_bag)
            })
            .collect();

        let mut trees = Vec::with_capacity(fitted.len());
        let mut in_bag_masks = Vec::with_capacity(fitted.len());
        for (tree, in_bag) in fitted {
            trees.push(tree);
            in_bag_masks.push(in_bag);
        }

        let mut forest = Self {
            params,
            classes,
            n_features,
            trees,
            oob_score: None,
        };

        if params.oob_score && params.bootstrap {
            forest.oob_score = forest.out_of_bag_accuracy(rows, &targets, &in_bag_masks);
        }

        Ok(forest)
    }

    fn out_of_bag_accuracy(
        &self,
        rows: &[Vec<f64>],
        targets: &[usize],
        in_bag_masks: &[Vec<bool>],
    ) -> Option<f64> {
        let outcomes: Vec<Option<bool>> = (0..rows.len())
            .into_par_iter()
            .map(|i| {
                let mut sums = vec![0.0; self.classes.len()];
                let mut voters = 0;
                for (tree, in_bag) in self.trees.iter().zip(in_bag_masks) {
                    if in_bag[i] {
                        continue;
                    }
                    voters += 1;
                    for &(class, p) in tree.leaf_distribution(&rows[i]) {
                        sums[class] += p;
                    }
                }
                (voters > 0).then(|| argmax(&sums) == targets[i])
            })
            .collect();

        let scored: Vec<bool> = outcomes.into_iter().flatten().collect();
        let unscored = rows.len() - scored.len();
        if unscored > 0 {
            tracing::warn!(
                unscored,
                "some samples were in every bootstrap and have no out-of-bag estimate"
            );
        }
        if scored.is_empty() {
            return None;
        }
        let correct = scored.iter().filter(|ok| **ok).count();
        Some(correct as f64 / scored.len() as f64)
    }

    /// Mean of the trees' leaf class distributions, ordered like [`Self::classes`].
    pub fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let mut sums = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for &(class, p) in tree.leaf_distribution(features) {
                sums[class] += p;
            }
        }
        let n_trees = self.trees.len().max(1) as f64;
        for value in &mut sums {
            *value /= n_trees;
        }
        sums
    }

    /// Row-parallel [`Self::predict_proba`]; output order matches input order.
    pub fn predict_proba_batch(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.par_iter().map(|row| self.predict_proba(row)).collect()
    }

    /// Most probable class label; the first class in alphabetical order wins ties.
    pub fn predict(&self, features: &[f64]) -> &str {
        let proba = self.predict_proba(features);
        &self.classes[argmax(&proba)]
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Out-of-bag accuracy computed at fit time, if requested and available.
    pub fn oob_score(&self) -> Option<f64> {
        self.oob_score
    }

    pub(crate) fn check_consistency(&self) -> CoreResult<()> {
        if self.classes.is_empty() || self.trees.is_empty() {
            return Err(CoreError::ArtifactInconsistent(
                "classifier has no classes or no trees".into(),
            ));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.check_consistency(self.classes.len())
                .map_err(|e| CoreError::ArtifactInconsistent(format!("tree {i}: {e}")))?;
        }
        Ok(())
    }
}

/// Index of the largest value; the lowest index wins ties.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<Vec<f64>>, Vec<&'static str>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..10 {
            let jitter = i as f64 * 0.01;
            rows.push(vec![0.1 + jitter, 0.5]);
            labels.push("low");
            rows.push(vec![0.9 - jitter, 0.5]);
            labels.push("high");
        }
        (rows, labels)
    }

    fn small_params() -> ForestParams {
        ForestParams {
            n_estimators: 25,
            ..ForestParams::default()
        }
    }

    #[test]
    fn learns_a_separable_boundary() {
        let (rows, labels) = separable();
        let forest = RandomForest::fit(&rows, &labels, small_params(), 42).unwrap();

        assert_eq!(forest.classes(), &["high".to_string(), "low".to_string()]);
        assert_eq!(forest.predict(&[0.05, 0.5]), "low");
        assert_eq!(forest.predict(&[0.95, 0.5]), "high");
        assert_eq!(forest.n_trees(), 25);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let (rows, labels) = separable();
        let forest = RandomForest::fit(&rows, &labels, small_params(), 7).unwrap();
        for probe in [[0.0, 0.5], [0.5, 0.5], [1.0, 0.5]] {
            let proba = forest.predict_proba(&probe);
            assert_eq!(proba.len(), 2);
            assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
        }
    }

    #[test]
    fn same_seed_gives_identical_forest() {
        let (rows, labels) = separable();
        let a = RandomForest::fit(&rows, &labels, small_params(), 99).unwrap();
        let b = RandomForest::fit(&rows, &labels, small_params(), 99).unwrap();
        for probe in [[0.3, 0.5], [0.55, 0.5], [0.7, 0.5]] {
            assert_eq!(a.predict_proba(&probe), b.predict_proba(&probe));
        }
        assert_eq!(a.oob_score(), b.oob_score());
    }

    #[test]
    fn constant_feature_is_never_split_on() {
        let (rows, labels) = separable();
        let forest = RandomForest::fit(&rows, &labels, small_params(), 3).unwrap();
        for tree in forest.trees() {
            for node in &tree.nodes {
                if let Node::Split { feature, .. } = node {
                    assert_eq!(*feature, 0);
                }
            }
        }
    }

    #[test]
    fn max_depth_limits_tree_depth() {
        let (rows, labels) = separable();
        let params = ForestParams {
            max_depth: Some(1),
            ..small_params()
        };
        let forest = RandomForest::fit(&rows, &labels, params, 5).unwrap();
        assert!(forest.trees().iter().all(|t| t.depth() <= 1));
        assert!(forest.trees().iter().all(|t| t.n_leaves() <= 2));
    }

    #[test]
    fn oob_score_is_reported_as_a_fraction() {
        let (rows, labels) = separable();
        let forest = RandomForest::fit(&rows, &labels, small_params(), 11).unwrap();
        let oob = forest.oob_score().expect("oob score should be computed");
        assert!((0.0..=1.0).contains(&oob));
    }

    #[test]
    fn balanced_weights_invert_class_frequency() {
        let weights = balanced_class_weights(&[0, 0, 0, 1], 2);
        assert!((weights[0] - 4.0 / 6.0).abs() < 1e-12);
        assert!((weights[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn sqrt_max_features_is_floored_and_at_least_one() {
        assert_eq!(MaxFeatures::Sqrt.resolve(1000), 31);
        assert_eq!(MaxFeatures::Sqrt.resolve(1), 1);
        assert_eq!(MaxFeatures::Fixed(50).resolve(10), 10);
        assert_eq!(MaxFeatures::All.resolve(7), 7);
    }

    #[test]
    fn argmax_prefers_first_on_ties() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), 1);
        assert_eq!(argmax(&[0.0, 0.0]), 0);
    }

    #[test]
    fn rejects_mismatched_inputs() {
        let rows = vec![vec![0.0], vec![1.0]];
        assert!(matches!(
            RandomForest::fit(&rows, &["a"], small_params(), 1),
            Err(CoreError::TrainingData(_))
        ));
        let ragged = vec![vec![0.0], vec![1.0, 2.0]];
        assert!(matches!(
            RandomForest::fit(&ragged, &["a", "b"], small_params(), 1),
            Err(CoreError::TrainingData(_))
        ));
    }

    #[test]
    fn serde_round_trip_preserves_predictions() {
        let (rows, labels) = separable();
        let forest = RandomForest::fit(&rows, &labels, small_params(), 21).unwrap();
        let json = serde_json::to_string(&forest).unwrap();
        let restored: RandomForest = serde_json::from_str(&json).unwrap();
        restored.check_consistency().unwrap();
        assert_eq!(
            forest.predict_proba(&[0.4, 0.5]),
            restored.predict_proba(&[0.4, 0.5])
        );
    }
}
