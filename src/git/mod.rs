pub mod clone;
pub mod repo;

pub use clone::ClonedRepo;
pub use repo::GitRepo;
