mod server;

pub use server::{GitHubConfig, ServerConfig, default_clone_dir};
