mod client;
mod dto;

pub use client::{REPO_DESCRIPTION, RepositoryGateway};
