mod clone;
pub mod dto;
mod repos;
pub mod response;
mod router;
mod session;
pub mod validation;

pub use router::{AppState, create_router};
