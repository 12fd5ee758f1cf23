pub mod charity_fund;
pub mod fundraiser;
pub mod help_request;
pub mod user;

pub use charity_fund::Entity as CharityFund;
pub use fundraiser::Entity as Fundraiser;
pub use help_request::Entity as HelpRequest;
pub use user::Entity as User;

pub use charity_fund::FundStatus;
pub use fundraiser::FundraiserStatus;
pub use help_request::{RequestCategory, RequestUrgency};
pub use user::UserRole;
