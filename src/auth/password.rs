use anyhow::{Result, anyhow};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

/// Hash a password into an argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// Constant-time verification against a stored PHC string. Malformed stored
/// hashes verify as false rather than erroring.
pub fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        let argon2 = Argon2::default();
        argon2.verify_password(password.as_bytes(), &parsed).is_ok()
    } else {
        false
    }
}

const MIN_PASSWORD_LENGTH: usize = 8;

/// Short list of passwords nobody should be allowed to keep.
const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password123", "12345678", "123456789", "1234567890", "qwerty123",
    "qwertyuiop", "iloveyou", "admin123", "letmein1", "welcome1", "sunshine", "princess",
    "football", "baseball", "superman", "trustno1", "dragon123", "monkey123",
];

/// Password strength rules: minimum length, not entirely numeric, not a
/// known common password, not too similar to the user's own identifiers.
/// Returns every violated rule so the caller can report them all at once.
pub fn validate_password_strength(password: &str, email: &str, username: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
        ));
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        errors.push("This password is entirely numeric.".to_string());
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        errors.push("This password is too common.".to_string());
    }

    if too_similar(&lowered, username) || too_similar(&lowered, email) {
        errors.push("The password is too similar to your other account details.".to_string());
    }
    // The local part of the email counts as an attribute of its own
    if let Some(local) = email.split('@').next() {
        if too_similar(&lowered, local) && !errors.iter().any(|e| e.contains("too similar")) {
            errors.push("The password is too similar to your other account details.".to_string());
        }
    }

    errors
}

/// Containment either way counts as similar, for attributes long enough to
/// be meaningful.
fn too_similar(password_lower: &str, attribute: &str) -> bool {
    let attribute = attribute.to_lowercase();
    if attribute.chars().count() < 4 || password_lower.is_empty() {
        return false;
    }
    password_lower.contains(&attribute) || attribute.contains(password_lower)
}

/// Phone numbers must match `+?1?` followed by 9-15 digits, e.g.
/// "+8801234567890".
pub fn is_valid_phone_number(value: &str) -> bool {
    let digits = value.strip_prefix('+').unwrap_or(value);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let max = if digits.starts_with('1') { 16 } else { 15 };
    (9..=max).contains(&digits.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("s3cure-enough-pass").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "s3cure-enough-pass"));
        assert!(!verify_password(&hash, "wrong-password"));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("not-a-phc-string", "anything"));
    }

    #[test]
    fn short_passwords_are_rejected() {
        let errors = validate_password_strength("abc12", "a@b.com", "someone");
        assert!(errors.iter().any(|e| e.contains("too short")));
    }

    #[test]
    fn numeric_passwords_are_rejected() {
        let errors = validate_password_strength("1234567890", "a@b.com", "someone");
        assert!(errors.iter().any(|e| e.contains("entirely numeric")));
    }

    #[test]
    fn common_passwords_are_rejected() {
        let errors = validate_password_strength("Password123", "a@b.com", "someone");
        assert!(errors.iter().any(|e| e.contains("too common")));
    }

    #[test]
    fn passwords_similar_to_username_are_rejected() {
        let errors =
            validate_password_strength("jane_doe_2024", "jane@example.com", "jane_doe");
        assert!(errors.iter().any(|e| e.contains("too similar")));
    }

    #[test]
    fn decent_password_passes() {
        let errors = validate_password_strength("horse-battery-staple", "a@b.com", "someone");
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn phone_number_pattern() {
        assert!(is_valid_phone_number("+8801234567890"));
        assert!(is_valid_phone_number("0123456789"));
        assert!(is_valid_phone_number("123456789"));
        assert!(!is_valid_phone_number("12345"));
        assert!(!is_valid_phone_number("+880-123-4567"));
        assert!(!is_valid_phone_number(""));
    }
}
