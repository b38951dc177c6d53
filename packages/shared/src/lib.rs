//! Shared library for Barcart: wire protocol, clock and logger setup.
//!
//! Both the session core (`barcart-client`) and the development backend
//! (`barcart-server`) speak the types defined in [`protocol`].

pub mod logger;
pub mod protocol;
pub mod time;
