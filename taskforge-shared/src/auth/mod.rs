/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and validation
/// - [`jwt`]: JWT token generation and validation
/// - [`middleware`]: Axum layer resolving Bearer tokens to an [`middleware::Identity`]
/// - [`authorization`]: the ownership and role guard
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **JWT Tokens**: HS256 signing, distinct access and refresh types
/// - **Fresh Roles**: roles are read from the database per request, never
///   trusted from token claims

pub mod password;
pub mod jwt;
pub mod middleware;
pub mod authorization;
