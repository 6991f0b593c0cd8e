/// Maximum object key length accepted by S3-compatible backends, in bytes
pub const MAX_OBJECT_NAME_BYTES: usize = 1024;

/// Length of a hex-encoded SHA-256 link digest
pub const URL_DIGEST_HEX_LEN: usize = 64;
