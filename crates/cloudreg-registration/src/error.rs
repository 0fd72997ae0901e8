use thiserror::Error;

/// Error types for the registration drivers.
///
/// Invalid *configurations* (non-positive distance thresholds, undersized
/// correspondence sets) never error; they come back as a trivial
/// [`crate::RegistrationResult`]. Errors are reserved for contract
/// violations of the injected collaborators.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Point-to-plane estimation was asked to run against a target cloud
    /// that carries no normals.
    #[error("point-to-plane estimation requires target normals")]
    MissingTargetNormals,
}
