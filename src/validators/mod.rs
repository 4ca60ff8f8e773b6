/// Input validation for registration and profile fields
use validator::ValidateEmail;

pub const USERNAME_MAX_LEN: usize = 15;

pub fn validate_email(email: &str) -> bool {
    email.validate_email()
}

/// Usernames are alphanumeric only, at most 15 characters.
pub fn validate_username(username: &str) -> bool {
    !username.is_empty()
        && username.len() <= USERNAME_MAX_LEN
        && username.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Passwords need at least 8 characters with one uppercase letter, one
/// lowercase letter, one digit and one special character.
pub fn validate_password(password: &str) -> bool {
    if password.len() < 8 {
        return false;
    }

    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());

    has_upper && has_lower && has_digit && has_special
}

pub fn validate_gender(gender: &str) -> bool {
    matches!(gender, "male" | "female")
}

pub const PASSWORD_RULE_MESSAGE: &str = "Password must be at least 8 characters long, include at \
     least one number, one special character, one uppercase letter, and one lowercase letter.";

pub const USERNAME_RULE_MESSAGE: &str =
    "Username can only contain letters and numbers, no special characters.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_usernames() {
        assert!(validate_username("alice"));
        assert!(validate_username("Alice99"));
        assert!(validate_username("a"));
    }

    #[test]
    fn username_rejects_specials_and_length() {
        assert!(!validate_username(""));
        assert!(!validate_username("alice_b"));
        assert!(!validate_username("alice.b"));
        assert!(!validate_username("abcdefghijklmnop")); // 16 chars
    }

    #[test]
    fn username_boundary_is_fifteen() {
        assert!(validate_username("abcdefghijklmno")); // 15 chars
    }

    #[test]
    fn password_rule_examples_from_docs() {
        // "password" must fail, "Password1!" must succeed.
        assert!(!validate_password("password"));
        assert!(validate_password("Password1!"));
    }

    #[test]
    fn password_requires_each_class() {
        assert!(!validate_password("Pass1!")); // too short
        assert!(!validate_password("password1!")); // no upper
        assert!(!validate_password("PASSWORD1!")); // no lower
        assert!(!validate_password("Password!!")); // no digit
        assert!(!validate_password("Password11")); // no special
    }

    #[test]
    fn email_format() {
        assert!(validate_email("user@example.com"));
        assert!(!validate_email("user@"));
        assert!(!validate_email("not-an-email"));
    }

    #[test]
    fn gender_values() {
        assert!(validate_gender("male"));
        assert!(validate_gender("female"));
        assert!(!validate_gender("other"));
    }
}
