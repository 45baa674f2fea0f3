pub mod adapter;
pub mod binder;
pub mod context;
pub mod error;
pub mod response;
pub mod routes;

pub use adapter::*;
pub use binder::*;
pub use context::*;
pub use error::*;
pub use response::*;
pub use routes::*;
