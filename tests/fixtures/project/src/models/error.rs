//! Shared error payloads.

/// @apiDefine: Error
pub struct Error {
    #[openapi("required")]
    pub message: String,
    pub code: u16,
}
