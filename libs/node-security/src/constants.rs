//! Well-known user and group names.

/// Name assigned to requests that present no credential.
pub const ANONYMOUS_USER: &str = "system:anonymous";

/// Group carried by the anonymous principal.
pub const UNAUTHENTICATED_GROUP: &str = "system:unauthenticated";

/// Group added to every principal that proved an identity.
pub const AUTHENTICATED_GROUP: &str = "system:authenticated";
