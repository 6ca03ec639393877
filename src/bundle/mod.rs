//! APK to app-bundle conversion stages
//!
//! Each stage works on the paths a [`workspace::Workspace`] hands out:
//! extract, lay out the base module, write the descriptor, then package.

pub mod archive;
pub mod descriptor;
pub mod extract;
pub mod module;
pub mod workspace;

pub use descriptor::BundleConfig;
pub use extract::Extractor;
pub use workspace::Workspace;
