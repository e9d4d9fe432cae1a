use thiserror::Error;

/// Broad failure categories. Every `GeonError` belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Axis sets cannot be reconciled, or an axis length is unresolved.
    Shape,
    /// A required input has no value for the round.
    Binding,
    /// Two parameters resolve to the same qualified name with different axes.
    NameCollision,
    /// Misuse of the graph API or a broken internal invariant.
    Internal,
}

/// Custom error type for the geon framework.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum GeonError {
    #[error("Shape mismatch during operation {operation}: axes {left:?} and {right:?} cannot be reconciled")]
    ShapeMismatch {
        operation: String,
        left: Vec<String>,
        right: Vec<String>,
    },

    #[error("No shared contraction axis between {left:?} and {right:?} in dot")]
    MissingContraction {
        left: Vec<String>,
        right: Vec<String>,
    },

    #[error("Axis '{axis}' has no length bound")]
    UnboundAxis { axis: String },

    #[error("Axis '{axis}' is already bound to length {bound}, cannot rebind to {requested}")]
    AxisLengthConflict {
        axis: String,
        bound: usize,
        requested: usize,
    },

    #[error("Axis '{axis}' appears more than once in {axes:?}")]
    DuplicateAxis { axis: String, axes: Vec<String> },

    #[error("Input '{input}' has no bound value for this round")]
    MissingBinding { input: String },

    #[error("Value bound to input '{input}' has shape {actual:?}, expected {expected:?}")]
    BindingShapeMismatch {
        input: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Parameter name collision for '{name}': existing axes {existing:?}, requested {requested:?}")]
    NameCollision {
        name: String,
        existing: Vec<String>,
        requested: Vec<String>,
    },

    #[error("Node {node} is not a parameter")]
    NotAParameter { node: String },

    #[error("Node {node} is not an update")]
    NotAnUpdate { node: String },

    #[error("Node {node} carries no value and cannot be used as an operand of {operation}")]
    NoValue { node: String, operation: String },

    #[error("Array creation error: data length {data_len} does not match shape {shape:?}")]
    ArrayCreation { data_len: usize, shape: Vec<usize> },

    #[error("Expected a single-element value, got shape {shape:?}")]
    NonScalar { shape: Vec<usize> },

    #[error("Index {index} is out of bounds for a dataset of {len} samples")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Label {label} is not below the class count {num_classes}")]
    InvalidLabel { label: usize, num_classes: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown node id {0}")]
    UnknownNode(usize),

    #[error("Code generation error: {0}")]
    CodeGen(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl GeonError {
    /// Maps the error onto its failure category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GeonError::ShapeMismatch { .. }
            | GeonError::MissingContraction { .. }
            | GeonError::UnboundAxis { .. }
            | GeonError::AxisLengthConflict { .. }
            | GeonError::DuplicateAxis { .. }
            | GeonError::BindingShapeMismatch { .. }
            | GeonError::ArrayCreation { .. }
            | GeonError::NonScalar { .. } => ErrorKind::Shape,
            GeonError::MissingBinding { .. } => ErrorKind::Binding,
            GeonError::NameCollision { .. } => ErrorKind::NameCollision,
            GeonError::NotAParameter { .. }
            | GeonError::NotAnUpdate { .. }
            | GeonError::NoValue { .. }
            | GeonError::IndexOutOfBounds { .. }
            | GeonError::InvalidLabel { .. }
            | GeonError::InvalidConfig(_)
            | GeonError::UnknownNode(_)
            | GeonError::CodeGen(_)
            | GeonError::InternalError(_) => ErrorKind::Internal,
        }
    }

    pub fn is_shape_error(&self) -> bool {
        self.kind() == ErrorKind::Shape
    }
}
