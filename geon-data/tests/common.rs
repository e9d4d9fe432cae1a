use geon_data::{gaussian_blobs, ArrayDataset, BlobConfig};
use std::sync::Once;

static INIT: Once = Once::new();

#[allow(dead_code)]
pub fn init_logger() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Three well separated classes of 2x2 samples, split into 240 training and
/// 60 validation samples.
#[allow(dead_code)]
pub fn blob_split() -> (ArrayDataset, ArrayDataset) {
    let config = BlobConfig {
        samples_per_class: 100,
        sample_shape: vec![2, 2],
        num_classes: 3,
        spread: 0.2,
        seed: 21,
    };
    gaussian_blobs(&config)
        .and_then(|dataset| dataset.split_at(240))
        .expect("Test dataset creation failed")
}
