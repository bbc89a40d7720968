//! Tree ensemble inference.
//!
//! - [`tree`]: flat-node regression trees and their traversal
//! - [`ensemble`]: the binary gradient-boosting classifier over those trees

pub mod ensemble;
pub mod tree;

pub use ensemble::{
    GRADIENT_BOOSTING_CLASSIFIER, GradientBoostingModel, MODEL_FORMAT_VERSION, class_index, sigmoid,
};
pub use tree::{Node, Tree};
