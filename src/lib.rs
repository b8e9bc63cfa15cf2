pub mod core;
pub mod error;
pub mod linalg;
pub mod logger;
pub mod parallel;
pub mod solvers;

pub use error::{FrontalError, FrontalResult};
pub use logger::{init_logger, init_logger_with_level};
