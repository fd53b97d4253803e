/// Interactive setup of host, repository and credentials
pub mod configure;

/// Image listing, inspection and deletion
pub mod image;

/// Version command handlers
pub mod version;
