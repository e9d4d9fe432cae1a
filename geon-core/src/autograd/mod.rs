//! Symbolic reverse-mode differentiation.
//!
//! Derivatives are ordinary graph nodes built from the same op library as the
//! forward computation, so they can be evaluated, differentiated again or
//! fed into updates like any other node.

pub mod deriv;
pub mod grad_check;

pub use grad_check::{check_grad, GradCheckError};
