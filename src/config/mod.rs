pub mod db;
pub mod analytics;

pub use db::*;
pub use analytics::*;
