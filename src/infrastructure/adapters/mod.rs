//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod encoder;
pub mod model;
pub mod storage;
pub mod telegram;

pub use encoder::*;
pub use model::*;
pub use storage::*;
pub use telegram::*;
