/// One-time codes for email verification and password reset.
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// OTPs are valid for 10 minutes from issue.
pub const OTP_TTL_MINUTES: i64 = 10;

/// Generate a 6-digit numeric code.
pub fn generate_otp() -> String {
    let code: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    code.to_string()
}

pub fn expiry_from_now() -> DateTime<Utc> {
    Utc::now() + Duration::minutes(OTP_TTL_MINUTES)
}

/// A stored code matches when it equals the submitted one and its expiry is
/// still in the future. A missing code or expiry never matches.
pub fn code_matches(
    stored: Option<&str>,
    expires: Option<DateTime<Utc>>,
    submitted: &str,
    now: DateTime<Utc>,
) -> bool {
    match (stored, expires) {
        (Some(code), Some(expiry)) => code == submitted && now < expiry,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..100 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(otp.chars().next(), Some('0'));
        }
    }

    #[test]
    fn matching_code_within_window_passes() {
        let now = Utc::now();
        assert!(code_matches(
            Some("123456"),
            Some(now + Duration::minutes(5)),
            "123456",
            now,
        ));
    }

    #[test]
    fn expired_code_is_rejected() {
        let now = Utc::now();
        assert!(!code_matches(
            Some("123456"),
            Some(now - Duration::seconds(1)),
            "123456",
            now,
        ));
    }

    #[test]
    fn wrong_code_is_rejected() {
        let now = Utc::now();
        assert!(!code_matches(
            Some("123456"),
            Some(now + Duration::minutes(5)),
            "654321",
            now,
        ));
    }

    #[test]
    fn missing_code_never_matches() {
        assert!(!code_matches(None, None, "123456", Utc::now()));
    }
}
