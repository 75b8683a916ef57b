/// Points credited for each successful referral.
pub const REFERRAL_POINTS: i64 = 100;

const REF_LINK_BASE: &str = "https://t.me/tma123_bot?startapp=";

/// Maximum accepted identity length, bounded by the column width.
const MAX_TG_ID_LEN: usize = 64;

pub fn derive_ref_link(tg_id: &str) -> String {
    format!("{}{}", REF_LINK_BASE, tg_id)
}

pub fn is_valid_tg_id(tg_id: &str) -> bool {
    !tg_id.is_empty() && tg_id.len() <= MAX_TG_ID_LEN && !tg_id.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use crate::ref_link::{derive_ref_link, is_valid_tg_id};

    #[test]
    fn test_derive_ref_link() {
        assert_eq!(
            derive_ref_link("100"),
            "https://t.me/tma123_bot?startapp=100"
        );
        assert_eq!(
            derive_ref_link("31337"),
            "https://t.me/tma123_bot?startapp=31337"
        );
    }

    #[test]
    fn test_tg_id_validation() {
        assert!(is_valid_tg_id("100"));
        assert!(is_valid_tg_id("user_abc"));
        assert!(!is_valid_tg_id(""));
        assert!(!is_valid_tg_id("  "));
        assert!(!is_valid_tg_id("has space"));
        assert!(!is_valid_tg_id(&"9".repeat(65)));
    }
}
