/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// RESPONSE CODES
// =============================================================================

/// Envelope code for a successful request
pub const CODE_OK: i32 = 0;

/// Envelope code for any failure without a more specific code
pub const CODE_ERROR: i32 = -1;

/// Envelope code telling the client to sign in
pub const CODE_UNAUTHENTICATED: i32 = -2;

/// Envelope code telling the client to buy more credits
pub const CODE_INSUFFICIENT_CREDITS: i32 = -3;

pub const MESSAGE_OK: &str = "ok";

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Admin role - can manage categories, tags and cover visibility
pub const ROLE_ADMIN: &str = "admin";

// =============================================================================
// UPLOAD LIMITS
// =============================================================================

/// Maximum accepted PDF size (10MB)
pub const MAX_PDF_SIZE: usize = 10 * 1024 * 1024;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Maximum length of a generation prompt, in characters
pub const MAX_DESCRIPTION_LENGTH: u64 = 2000;
