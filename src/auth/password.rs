use bcrypt::BcryptError;

/// Hash a password for storage. Runs on the blocking pool, bcrypt is CPU bound.
pub async fn hash_password(password: String, cost: u32) -> Result<String, BcryptError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| BcryptError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
}

/// Compare a plain text password against a stored hash
pub async fn verify_password(password: String, hash: String) -> Result<bool, BcryptError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| BcryptError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
}
