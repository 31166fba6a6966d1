//! Trained classifiers that turn an encoded applicant into a probability of good credit.
//!
//! Models arrive as JSON exports. Two kinds are understood: a gradient boosted tree
//! ensemble in the nested node dump layout produced by XGBoost, and a plain logistic
//! regression. Both are validated and flattened once at load time so inference is a
//! bounded walk over plain vectors.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

/// Positive-class probability model shared read-only across scoring calls.
pub trait Classifier: Send + Sync {
    /// Probability of the GOOD class for one row of features.
    fn predict_probability(&self, features: &[f64]) -> Result<f64, InferenceError>;

    /// Artifact version string, when the export carried one.
    fn version(&self) -> Option<&str> {
        None
    }

    /// Number of boosted trees, for ensemble models.
    fn tree_count(&self) -> Option<usize> {
        None
    }
}

/// Failure of a single inference call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("classifier expects {expected} features but received {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("classifier returned {0}, which is not a probability")]
    MalformedOutput(f64),
}

/// Why a classifier export could not be turned into a usable model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelDefinitionError {
    #[error("unsupported objective '{0}', only binary:logistic is scored")]
    UnsupportedObjective(String),
    #[error("base_score must lie strictly between 0 and 1")]
    BaseScoreOutOfRange,
    #[error("feature names {found:?} do not match the expected order {expected:?}")]
    FeatureOrder {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("model declares {found} features but {expected} are required")]
    FeatureCount { expected: usize, found: usize },
    #[error("tree {tree} splits on unknown feature '{feature}'")]
    UnknownFeature { tree: usize, feature: String },
    #[error("tree {tree} repeats node id {node}")]
    DuplicateNode { tree: usize, node: u32 },
    #[error("tree {tree} node {node} routes to {target}, which is not one of its children")]
    DanglingChild { tree: usize, node: u32, target: u32 },
    #[error("tree {tree} contains a non-finite value")]
    NonFinite { tree: usize },
    #[error("coefficients and intercept must be finite")]
    NonFiniteCoefficient,
    #[error("model has no trees")]
    Empty,
}

/// Tagged classifier export.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    GradientBoostedTrees(TreeEnsembleArtifact),
    LogisticRegression(LogisticArtifact),
}

impl ClassifierArtifact {
    /// Validate the export against the feature layout the encoders produce.
    pub fn into_classifier(
        self,
        expected_features: &[&str],
    ) -> Result<Arc<dyn Classifier>, ModelDefinitionError> {
        match self {
            ClassifierArtifact::GradientBoostedTrees(artifact) => {
                Ok(Arc::new(TreeEnsemble::from_artifact(artifact, expected_features)?))
            }
            ClassifierArtifact::LogisticRegression(artifact) => {
                Ok(Arc::new(LogisticModel::from_artifact(artifact, expected_features)?))
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeEnsembleArtifact {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default = "default_objective")]
    pub objective: String,
    #[serde(default = "default_base_score")]
    pub base_score: f64,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    #[serde(default)]
    pub num_features: Option<usize>,
    pub trees: Vec<DumpNode>,
}

fn default_objective() -> String {
    "binary:logistic".to_string()
}

fn default_base_score() -> f64 {
    0.5
}

/// One node of a tree as dumped by the trainer.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DumpNode {
    Split {
        nodeid: u32,
        split: String,
        split_condition: f64,
        yes: u32,
        no: u32,
        #[serde(default)]
        missing: Option<u32>,
        children: Vec<DumpNode>,
    },
    Leaf {
        nodeid: u32,
        leaf: f64,
    },
}

impl DumpNode {
    fn id(&self) -> u32 {
        match self {
            DumpNode::Split { nodeid, .. } | DumpNode::Leaf { nodeid, .. } => *nodeid,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        yes: usize,
        no: usize,
        missing: usize,
    },
    Leaf(f64),
}

/// Flattened tree; index 0 is the root.
#[derive(Debug, Clone, PartialEq)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn leaf_value(&self, features: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf(value) => return *value,
                Node::Split {
                    feature,
                    threshold,
                    yes,
                    no,
                    missing,
                } => {
                    let value = features[*feature];
                    index = if value.is_nan() {
                        *missing
                    } else if value < *threshold {
                        *yes
                    } else {
                        *no
                    };
                }
            }
        }
    }
}

/// Gradient boosted trees with a logistic link.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEnsemble {
    version: Option<String>,
    base_margin: f64,
    feature_count: usize,
    trees: Vec<Tree>,
}

impl TreeEnsemble {
    pub fn from_artifact(
        artifact: TreeEnsembleArtifact,
        expected_features: &[&str],
    ) -> Result<Self, ModelDefinitionError> {
        if artifact.objective != "binary:logistic" {
            return Err(ModelDefinitionError::UnsupportedObjective(
                artifact.objective,
            ));
        }
        if !(artifact.base_score > 0.0 && artifact.base_score < 1.0) {
            return Err(ModelDefinitionError::BaseScoreOutOfRange);
        }
        check_feature_layout(
            artifact.feature_names.as_deref(),
            artifact.num_features,
            expected_features,
        )?;
        if artifact.trees.is_empty() {
            return Err(ModelDefinitionError::Empty);
        }

        let trees = artifact
            .trees
            .iter()
            .enumerate()
            .map(|(tree, root)| flatten_tree(tree, root, expected_features))
            .collect::<Result<Vec<_>, _>>()?;

        let base_margin = (artifact.base_score / (1.0 - artifact.base_score)).ln();

        Ok(Self {
            version: artifact.version,
            base_margin,
            feature_count: expected_features.len(),
            trees,
        })
    }

    /// Raw log-odds before the logistic link.
    pub fn margin(&self, features: &[f64]) -> Result<f64, InferenceError> {
        check_shape(self.feature_count, features)?;
        Ok(self.base_margin
            + self
                .trees
                .iter()
                .map(|tree| tree.leaf_value(features))
                .sum::<f64>())
    }
}

impl Classifier for TreeEnsemble {
    fn predict_probability(&self, features: &[f64]) -> Result<f64, InferenceError> {
        self.margin(features).map(sigmoid)
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn tree_count(&self) -> Option<usize> {
        Some(self.trees.len())
    }
}

fn resolve_feature(name: &str, expected_features: &[&str]) -> Option<usize> {
    if let Some(index) = expected_features.iter().position(|feature| *feature == name) {
        return Some(index);
    }

    name.strip_prefix('f')
        .and_then(|raw| raw.parse::<usize>().ok())
        .filter(|index| *index < expected_features.len())
}

fn flatten_tree(
    tree: usize,
    root: &DumpNode,
    expected_features: &[&str],
) -> Result<Tree, ModelDefinitionError> {
    let mut ordered: Vec<&DumpNode> = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        ordered.push(node);
        if let DumpNode::Split { children, .. } = node {
            stack.extend(children.iter().rev());
        }
    }

    let mut positions: HashMap<u32, usize> = HashMap::with_capacity(ordered.len());
    for (position, node) in ordered.iter().enumerate() {
        if positions.insert(node.id(), position).is_some() {
            return Err(ModelDefinitionError::DuplicateNode {
                tree,
                node: node.id(),
            });
        }
    }

    let mut nodes = Vec::with_capacity(ordered.len());
    for node in ordered {
        match node {
            DumpNode::Leaf { leaf, .. } => {
                if !leaf.is_finite() {
                    return Err(ModelDefinitionError::NonFinite { tree });
                }
                nodes.push(Node::Leaf(*leaf));
            }
            DumpNode::Split {
                nodeid,
                split,
                split_condition,
                yes,
                no,
                missing,
                children,
            } => {
                let feature = resolve_feature(split, expected_features).ok_or_else(|| {
                    ModelDefinitionError::UnknownFeature {
                        tree,
                        feature: split.clone(),
                    }
                })?;
                if !split_condition.is_finite() {
                    return Err(ModelDefinitionError::NonFinite { tree });
                }

                // Targets must be direct children so the arena stays a tree.
                let child_position = |target: u32| {
                    if children.iter().any(|child| child.id() == target) {
                        Ok(positions[&target])
                    } else {
                        Err(ModelDefinitionError::DanglingChild {
                            tree,
                            node: *nodeid,
                            target,
                        })
                    }
                };

                let yes = child_position(*yes)?;
                let no = child_position(*no)?;
                let missing = match missing {
                    Some(target) => child_position(*target)?,
                    None => yes,
                };

                nodes.push(Node::Split {
                    feature,
                    threshold: *split_condition,
                    yes,
                    no,
                    missing,
                });
            }
        }
    }

    Ok(Tree { nodes })
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogisticArtifact {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Linear log-odds model.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel {
    version: Option<String>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LogisticModel {
    pub fn from_artifact(
        artifact: LogisticArtifact,
        expected_features: &[&str],
    ) -> Result<Self, ModelDefinitionError> {
        check_feature_layout(
            artifact.feature_names.as_deref(),
            Some(artifact.coefficients.len()),
            expected_features,
        )?;
        if !artifact.intercept.is_finite()
            || artifact.coefficients.iter().any(|value| !value.is_finite())
        {
            return Err(ModelDefinitionError::NonFiniteCoefficient);
        }

        Ok(Self {
            version: artifact.version,
            coefficients: artifact.coefficients,
            intercept: artifact.intercept,
        })
    }
}

impl Classifier for LogisticModel {
    fn predict_probability(&self, features: &[f64]) -> Result<f64, InferenceError> {
        check_shape(self.coefficients.len(), features)?;
        let margin = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(weight, value)| weight * value)
                .sum::<f64>();
        Ok(sigmoid(margin))
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

fn check_feature_layout(
    names: Option<&[String]>,
    count: Option<usize>,
    expected_features: &[&str],
) -> Result<(), ModelDefinitionError> {
    if let Some(names) = names {
        if names.iter().map(String::as_str).ne(expected_features.iter().copied()) {
            return Err(ModelDefinitionError::FeatureOrder {
                expected: expected_features.iter().map(|name| name.to_string()).collect(),
                found: names.to_vec(),
            });
        }
    }

    if let Some(found) = count {
        if found != expected_features.len() {
            return Err(ModelDefinitionError::FeatureCount {
                expected: expected_features.len(),
                found,
            });
        }
    }

    Ok(())
}

fn check_shape(expected: usize, features: &[f64]) -> Result<(), InferenceError> {
    if features.len() == expected {
        Ok(())
    } else {
        Err(InferenceError::ShapeMismatch {
            expected,
            actual: features.len(),
        })
    }
}

pub(crate) fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}
