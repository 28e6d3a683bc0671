use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::screening::scoring::ScoringError;

/// Bagged ensemble of fully grown Gini decision trees.
///
/// The positive-class probability is the mean of the per-tree leaf fractions.
#[derive(Debug, Clone, Default)]
pub struct RandomForest {
    trees: Vec<Node>,
    width: usize,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        positive_fraction: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, row: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { positive_fraction } => return *positive_fraction,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

impl RandomForest {
    pub fn fit<R: AsRef<[f64]>>(
        rows: &[R],
        labels: &[bool],
        tree_count: usize,
        seed: u64,
    ) -> Result<Self, ScoringError> {
        let width = super::matrix_width(rows)?;
        super::check_labels(rows.len(), labels)?;
        if tree_count == 0 {
            return Err(ScoringError::InvalidModel(
                "forest needs at least one tree".to_string(),
            ));
        }

        let rows: Vec<&[f64]> = rows.iter().map(AsRef::as_ref).collect();
        let max_features = ((width as f64).sqrt().floor() as usize).max(1);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let trees = (0..tree_count)
            .map(|_| {
                let sample: Vec<usize> = (0..rows.len())
                    .map(|_| rng.gen_range(0..rows.len()))
                    .collect();
                let mut grower = TreeGrower {
                    rows: &rows,
                    labels,
                    max_features,
                    rng: &mut rng,
                };
                grower.grow(sample)
            })
            .collect();

        Ok(Self { trees, width })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn predict_proba(&self, row: &[f64]) -> Result<f64, ScoringError> {
        if self.trees.is_empty() {
            return Err(ScoringError::NotFitted {
                model: "random forest",
            });
        }
        if row.len() != self.width {
            return Err(ScoringError::FeatureWidth {
                expected: self.width,
                found: row.len(),
            });
        }

        let total: f64 = self.trees.iter().map(|tree| tree.predict(row)).sum();
        Ok(total / self.trees.len() as f64)
    }
}

struct TreeGrower<'a, 'r> {
    rows: &'a [&'a [f64]],
    labels: &'a [bool],
    max_features: usize,
    rng: &'r mut ChaCha8Rng,
}

struct Candidate {
    impurity: f64,
    feature: usize,
    threshold: f64,
}

impl TreeGrower<'_, '_> {
    fn grow(&mut self, sample: Vec<usize>) -> Node {
        let positives = self.positives(&sample);
        let positive_fraction = positives as f64 / sample.len() as f64;
        if positives == 0 || positives == sample.len() {
            return Node::Leaf { positive_fraction };
        }

        let Some(split) = self.best_split(&sample) else {
            return Node::Leaf { positive_fraction };
        };

        let (left, right): (Vec<usize>, Vec<usize>) = sample
            .into_iter()
            .partition(|&index| self.rows[index][split.feature] <= split.threshold);
        if left.is_empty() || right.is_empty() {
            return Node::Leaf { positive_fraction };
        }

        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.grow(left)),
            right: Box::new(self.grow(right)),
        }
    }

    fn positives(&self, sample: &[usize]) -> usize {
        sample.iter().filter(|&&index| self.labels[index]).count()
    }

    /// Searches random features until `max_features` non-constant ones were inspected.
    fn best_split(&mut self, sample: &[usize]) -> Option<Candidate> {
        let width = self.rows[0].len();
        let mut order: Vec<usize> = (0..width).collect();
        order.shuffle(&mut *self.rng);

        let mut best: Option<Candidate> = None;
        let mut inspected = 0;

        for feature in order {
            if inspected == self.max_features {
                break;
            }

            let mut values: Vec<f64> = sample
                .iter()
                .map(|&index| self.rows[index][feature])
                .collect();
            values.sort_by(f64::total_cmp);
            values.dedup();
            if values.len() < 2 {
                continue;
            }
            inspected += 1;

            for pair in values.windows(2) {
                let threshold = (pair[0] + pair[1]) / 2.0;
                let impurity = self.split_impurity(sample, feature, threshold);
                if best
                    .as_ref()
                    .map_or(true, |current| impurity < current.impurity)
                {
                    best = Some(Candidate {
                        impurity,
                        feature,
                        threshold,
                    });
                }
            }
        }

        best
    }

    fn split_impurity(&self, sample: &[usize], feature: usize, threshold: f64) -> f64 {
        let (mut left_total, mut left_pos, mut right_total, mut right_pos) = (0, 0, 0, 0);
        for &index in sample {
            let positive = usize::from(self.labels[index]);
            if self.rows[index][feature] <= threshold {
                left_total += 1;
                left_pos += positive;
            } else {
                right_total += 1;
                right_pos += positive;
            }
        }

        let n = sample.len() as f64;
        (left_total as f64 * gini(left_pos, left_total)
            + right_total as f64 * gini(right_pos, right_total))
            / n
    }
}

fn gini(positives: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = positives as f64 / total as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}
