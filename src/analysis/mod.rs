pub mod deriver;
pub mod types;

pub use deriver::derive;
pub use types::{AnalysisContext, FlowDirection, Transaction};
