// 工具模块

pub mod clock;

pub mod error;

pub mod logging;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AppError, AppResult};
pub use logging::init_logging;
