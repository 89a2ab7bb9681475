pub const CONFIGURATION_ERROR: &str = "configuration_error";
pub const VALIDATION_ERROR: &str = "validation_error";
pub const FILE_NOT_FOUND: &str = "file_not_found";
pub const TRANSPORT_ERROR: &str = "transport_error";
pub const API_ERROR: &str = "api_error";
pub const RESPONSE_FORMAT_ERROR: &str = "response_format_error";
