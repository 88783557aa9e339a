mod broker;
pub mod cookie;
mod middleware;

pub use broker::{AuthenticationBroker, OAUTH_SCOPES};
pub use middleware::{AuthError, RequireSession};
