use bs58;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid Solana address format: {0}")]
    InvalidSolanaAddress(String),

    #[error("Invalid sensitivity: {0}; must be a finite value > 0")]
    InvalidSensitivity(f64),
}

pub fn validate_solana_address(address: &str) -> Result<(), ValidationError> {
    // Check if address is empty
    if address.trim().is_empty() {
        return Err(ValidationError::MissingParameter("address".to_string()));
    }

    // Decode base58 string
    let decoded = match bs58::decode(address).into_vec() {
        Ok(bytes) => bytes,
        Err(_) => return Err(ValidationError::InvalidSolanaAddress(address.to_string())),
    };

    // Validate length (Solana addresses are 32 bytes)
    if decoded.len() != 32 {
        return Err(ValidationError::InvalidSolanaAddress(address.to_string()));
    }

    Ok(())
}

/// The clustering radius must be a usable distance bound.
pub fn validate_sensitivity(sensitivity: f64) -> Result<(), ValidationError> {
    if !sensitivity.is_finite() || sensitivity <= 0.0 {
        return Err(ValidationError::InvalidSensitivity(sensitivity));
    }
    Ok(())
}
