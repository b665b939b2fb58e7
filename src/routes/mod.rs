/// Router Module Index
///
/// Organizes the application's routing into the two authorization modes of
/// the data access facade. Access control is applied explicitly at the module
/// level (via Axum layers), so a protected endpoint cannot be exposed by
/// accident.

/// Routes accessible to all users (anonymous, read-only, plus the identity
/// gateway endpoints). Equivalent of the API-key authorization mode.
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware. Equivalent of the
/// user-pool authorization mode; required for every write.
pub mod authenticated;
