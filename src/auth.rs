//! Session model, credential bundles, and the JWT bearer assertion builder.

pub mod credentials;
pub mod jwt;
pub mod secret;
pub mod session;

pub use credentials::*;
pub use secret::*;
pub use session::*;
