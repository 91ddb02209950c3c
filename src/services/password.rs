use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;

use crate::error::AppError;

/// Argon2id로 비밀번호를 해시합니다. 결과는 PHC 문자열(`$argon2id$...`)입니다.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();
    Ok(hash)
}

/// 비밀번호가 해시와 맞지 않으면 `Unauthorized`.
pub fn check_password(password: &str, hashed: &str) -> Result<(), AppError> {
    let parsed_hash = PasswordHash::new(hashed)
        .map_err(|e| AppError::Internal(format!("Password hash parse error: {}", e)))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid email or password".to_string()))
}
