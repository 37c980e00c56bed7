pub mod categorize;
pub mod pipeline;
pub mod preprocess;
pub mod stopwords;
pub mod tools;

pub use categorize::*;
pub use pipeline::*;
pub use preprocess::*;
pub use tools::*;
