mod clone;

pub use clone::{LocalCloneExecutor, validate_clone_url};
