// Export all route modules
pub mod auth;
pub mod funds;
pub mod fundraisers;
pub mod help_requests;
