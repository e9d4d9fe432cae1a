use geon_core::Array;
use std::sync::Once;

static INIT: Once = Once::new();

/// Routes `log` output through env_logger once per test binary.
#[allow(dead_code)]
pub fn init_logger() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

#[allow(dead_code)]
pub fn arr(data: &[f64], shape: &[usize]) -> Array {
    Array::new(data.to_vec(), shape.to_vec()).expect("Test array creation failed")
}

#[allow(dead_code)]
pub fn assert_all_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            approx::relative_eq!(*a, *e, epsilon = 1e-9, max_relative = 1e-9),
            "element {}: {} != {}",
            i,
            a,
            e
        );
    }
}
