pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, JwtService, TokenPair, TokenType};
pub use middleware::{jwt_auth_middleware, require_admin, require_auth, require_fund_creator, AuthUser};
pub use password::{hash_password, verify_password};
