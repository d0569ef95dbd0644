use crate::error::{AppError, AppResult};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;
const MAX_NAME_LEN: usize = 255;
const MAX_TAG_LEN: usize = 64;
const MIN_PASSWORD_LEN: usize = 6;
const MAX_PASSWORD_LEN: usize = 128;

pub fn validate_rating(rating: i32) -> AppResult<i32> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::validation(format!(
            "Invalid rating: {rating}. Rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    Ok(rating)
}

pub fn validate_name(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} cannot be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "{field} must be {MAX_NAME_LEN} characters or less"
        )));
    }
    Ok(trimmed.to_string())
}

/// Checks the address shape and returns it lower-cased.
pub fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    let invalid = || AppError::validation(format!("Invalid email address: {email}"));

    if email.len() > MAX_NAME_LEN || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }
    Ok(email)
}

pub fn validate_password(password: &str) -> AppResult<&str> {
    let len = password.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        return Err(AppError::validation(format!(
            "Password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"
        )));
    }
    Ok(password)
}

/// Trims and de-duplicates health flag or badge names, keeping first-seen order.
/// Trims a single health-flag or badge name and checks its length.
pub fn validate_tag(field: &str, name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation(format!("{field} name cannot be empty")));
    }
    if name.chars().count() > MAX_TAG_LEN {
        return Err(AppError::validation(format!(
            "{field} name must be {MAX_TAG_LEN} characters or less"
        )));
    }
    Ok(name.to_string())
}

pub fn normalize_tags(field: &str, names: &[String]) -> AppResult<Vec<String>> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = validate_tag(field, name)?;
        if !out.contains(&name) {
            out.push(name);
        }
    }
    Ok(out)
}

pub fn validate_barcode(barcode: &str) -> AppResult<String> {
    let barcode = barcode.trim();
    if !(6..=14).contains(&barcode.len()) || !barcode.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::validation(format!(
            "Invalid barcode: {barcode}. Barcode must be 6 to 14 digits"
        )));
    }
    Ok(barcode.to_string())
}

pub fn validate_image(image: &str) -> AppResult<&str> {
    if image.trim().is_empty() {
        return Err(AppError::validation("Image payload cannot be empty"));
    }
    Ok(image)
}

/// Empty or whitespace-only notes are stored as no note.
pub fn clean_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}
