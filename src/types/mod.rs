pub mod healthz;
pub mod redirect;
pub mod response;
pub mod session;
