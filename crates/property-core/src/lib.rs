pub mod analysis;
pub mod error;
pub mod stats;
pub mod traits;
pub mod types;

pub use analysis::*;
pub use error::*;
pub use traits::*;
pub use types::*;
