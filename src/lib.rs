pub mod api;
pub mod backend;
pub mod commands;
pub mod config;
pub mod error;
pub mod util;
pub mod vault;

pub use error::Error;

pub const PRODUCT: &str = "fvclient";
/// Major and minor version, as shown in the client banner.
pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION_MAJOR"),
    ".",
    env!("CARGO_PKG_VERSION_MINOR")
);
