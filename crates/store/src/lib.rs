pub mod documents;
pub mod migrations;
pub mod uploads;

pub use documents::*;
pub use uploads::*;
