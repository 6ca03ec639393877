//! Signing identities, keystore provisioning and `jarsigner` invocation

pub mod certificate;
pub mod keystore;
pub mod lock;
pub mod signer;

pub use certificate::CertificateInfo;
pub use keystore::KeystoreProvisioner;
pub use signer::Signer;
