//! # Dumping the generated NumPy code of a gradient graph
//!
//! Builds the default classifier for 3x32x32 samples, differentiates its
//! error with respect to every parameter and prints the NumPy program the
//! code generator emits for those gradients.
//!
//! `cargo run --example dump_graph`

use geon_core::nn::{ClassifierGraph, ClassifierSpec};
use geon_core::{GeonError, NumPyGenerator};

fn main() -> Result<(), GeonError> {
    env_logger::init();
    let mut model = ClassifierGraph::new(3, &ClassifierSpec::default())?;
    model.bind_lengths(100, &[3, 32, 32], 10)?;

    let params = model.parameters()?;
    let grads = model.graph.derivs(model.error, &params)?;
    for (param, grad) in params.iter().zip(&grads) {
        eprintln!(
            "{} -> {}",
            model.graph.label(*param),
            model.graph.label(*grad)
        );
    }

    let generator = NumPyGenerator::new(&model.graph, &grads)?;
    eprintln!(
        "{} statements over {} slots",
        generator.program().statements().len(),
        generator.program().slot_count()
    );
    println!("{}", generator.source()?);
    Ok(())
}
