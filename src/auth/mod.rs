pub mod handlers;
pub mod oauth;
pub mod provider;
pub mod session;
