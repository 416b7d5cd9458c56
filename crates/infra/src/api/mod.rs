//! Tenant-facing HTTP integrations
//!
//! - [`OAuthTokenBroker`]: client-credentials exchange against each tenant's
//!   token URL
//! - [`HttpTenantDispatcher`]: posts the rendered sales payload to each
//!   tenant's API

pub mod dispatcher;
pub mod errors;
pub mod token_broker;

pub use dispatcher::HttpTenantDispatcher;
pub use errors::{ApiError, ApiErrorCategory};
pub use token_broker::OAuthTokenBroker;
