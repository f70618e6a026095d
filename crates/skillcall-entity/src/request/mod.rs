//! Call request entities.

pub mod model;
pub mod status;

pub use model::{CallRequest, NewCallRequest, RequestDirection, RequestFilter};
pub use status::RequestStatus;
