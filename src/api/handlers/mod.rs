pub mod common;
pub mod health;
pub mod datasets;
pub mod clusters;

pub use health::health_check;
pub use datasets::{get_dataset_sample, get_dataset_view, get_datasets};
pub use clusters::get_kmeans;
