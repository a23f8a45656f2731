//! These models represent the objects passed around by the router
//!
//! The transcript is kept in these internal structs and only converted into the
//! completion service's wire format at the provider boundary. Tool results are
//! always carried as text, never as structured tables.
pub mod message;
pub mod role;
pub mod tool;
