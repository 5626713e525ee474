mod database;
mod hashing;
mod jwt;
mod myconfig;

pub use self::database::{ConnectionManager, ConnectionPool};
pub use self::hashing::Hashing;
pub use self::jwt::{Claims, JwtConfig};
pub use self::myconfig::{
    Config, CorsConfig, RateLimitConfig, parse_duration, parse_positive, parse_salt_rounds,
};
