//! Request/response pipeline stages, applied in order around the dispatcher.
//!
//! [`correlation`] assigns the correlation identifier and tags the response;
//! [`credentials`] strips caller authorization and adds the upstream key.
//! Both are `axum::middleware::from_fn` stages composed in
//! [`server::build_router`](crate::server::build_router).

pub mod correlation;
pub mod credentials;
