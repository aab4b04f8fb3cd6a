//! Top-level facade crate for resguard.
//!
//! Re-exports the resolution engine and the reference server so users can
//! depend on a single crate.

pub mod core {
    pub use resguard_core::*;
}

pub mod server {
    pub use resguard_server::*;
}
