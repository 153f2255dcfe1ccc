pub mod events;
pub mod ports;
pub mod position_tracker;
pub mod proximity;
pub mod route_orchestrator;
pub mod session;
pub mod types;
pub mod waypoint_store;

pub use events::*;
pub use ports::*;
pub use position_tracker::*;
pub use proximity::*;
pub use route_orchestrator::*;
pub use session::*;
pub use types::*;
pub use waypoint_store::*;
