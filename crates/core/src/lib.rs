pub mod context;
pub mod error;
pub mod models;
pub mod route;

pub use context::{build_context, merge_trip_details};
pub use error::{Capability, PlanError};
pub use models::*;
pub use route::{route, TravelPath};
