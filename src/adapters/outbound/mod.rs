pub mod buffered_logger;
pub mod console_logger;
pub mod file_logger;
pub mod in_memory_renderer;
pub mod multi_logger;
pub mod nominatim;
pub mod noop_logger;
pub mod ors_routing;

pub use buffered_logger::*;
pub use console_logger::*;
pub use file_logger::*;
pub use in_memory_renderer::*;
pub use multi_logger::*;
pub use nominatim::*;
pub use noop_logger::*;
pub use ors_routing::*;
