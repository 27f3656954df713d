pub mod cookie;
pub mod jwt;

pub use jwt::{JwtClaims, JwtService};

pub const TOKEN_COOKIE_NAME: &str = "pixel_relay_token";
