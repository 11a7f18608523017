//! Authentication: Argon2id password hashing and JWT bearer tokens.

pub mod password;
pub mod token;

pub use password::{
    hash_password, validate_password, verify_password, PasswordError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
pub use token::{JwtClaims, JwtState, TokenIssuer};
