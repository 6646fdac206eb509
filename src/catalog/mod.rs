pub mod authz;
pub mod repository;

pub use authz::Actor;
