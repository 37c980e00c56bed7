pub mod helpers;
pub mod metrics;
pub mod tools;

pub use helpers::*;
pub use metrics::*;
pub use tools::*;
