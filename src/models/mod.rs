pub mod analysis;
pub mod analysis_task;
pub mod gait;
pub mod landmark;

pub use analysis::*;
pub use analysis_task::*;
pub use gait::*;
pub use landmark::*;
