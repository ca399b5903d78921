use crate::errors::AppError;

pub const MAX_TIP_AMOUNT: i64 = 10_000;
pub const MIN_NAME_CHARS: usize = 2;
pub const MAX_NAME_CHARS: usize = 20;

pub fn validate_amount(amount: i64) -> Result<u64, AppError> {
    if amount <= 0 {
        return Err(AppError::bad_request("amount must be greater than 0"));
    }
    if amount > MAX_TIP_AMOUNT {
        return Err(AppError::bad_request(format!(
            "amount must not exceed {MAX_TIP_AMOUNT}"
        )));
    }
    Ok(amount as u64)
}

/// Returns the trimmed name.
pub fn validate_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    let chars = trimmed.chars().count();
    if chars == 0 {
        return Err(AppError::bad_request("name must not be empty"));
    }
    if chars < MIN_NAME_CHARS {
        return Err(AppError::bad_request(format!(
            "name must have at least {MIN_NAME_CHARS} characters"
        )));
    }
    if chars > MAX_NAME_CHARS {
        return Err(AppError::bad_request(format!(
            "name must have at most {MAX_NAME_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}
