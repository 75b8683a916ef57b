use serde::{Deserialize, Serialize};

use crate::db::{ReferralRow, UserRow};

#[derive(Debug, Deserialize, Serialize)]
pub struct UserCreate {
    pub tg_id: String,
    pub username: Option<String>,
    pub referred_from: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UserResponse {
    pub tg_id: String,
    pub username: Option<String>,
    pub ref_link: String,
    pub points: i64,
}

impl From<UserRow> for UserResponse {
    fn from(user: UserRow) -> Self {
        UserResponse {
            tg_id: user.tg_id,
            username: user.username,
            ref_link: user.ref_link,
            points: user.points,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReferralCreate {
    pub user_tg_id: String,
    pub friend_tg_id: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReferralResponse {
    pub user_tg_id: String,
    pub friend_tg_id: String,
    pub date: String,
    pub points: i64,
    pub username: Option<String>,
}

impl From<ReferralRow> for ReferralResponse {
    fn from(referral: ReferralRow) -> Self {
        ReferralResponse {
            user_tg_id: referral.user_tg_id,
            friend_tg_id: referral.friend_tg_id,
            date: referral.date,
            points: referral.points,
            username: referral.username,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdatePoints {
    pub points: i64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PointsData {
    pub points: i64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TotalPointsData {
    pub total_points: i64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RefLinkData {
    pub referral_link: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UserReferralsData {
    pub referrer: UserResponse,
    pub referrals: Vec<UserResponse>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::user_data::{ReferralResponse, UserCreate};

    #[test]
    fn test_user_create_optional_fields() {
        let minimal: UserCreate = serde_json::from_value(json!({"tg_id": "100"})).unwrap();
        assert_eq!(minimal.tg_id, "100");
        assert_eq!(minimal.username, None);
        assert_eq!(minimal.referred_from, None);

        let full: UserCreate = serde_json::from_value(json!({
            "tg_id": "100",
            "username": "alice",
            "referred_from": "200",
        }))
        .unwrap();
        assert_eq!(full.username.as_deref(), Some("alice"));
        assert_eq!(full.referred_from.as_deref(), Some("200"));
    }

    #[test]
    fn test_referral_response_shape() {
        let referral = ReferralResponse {
            user_tg_id: "100".to_string(),
            friend_tg_id: "200".to_string(),
            date: "2024-08-19 13:33:43".to_string(),
            points: 100,
            username: None,
        };
        let value = serde_json::to_value(&referral).unwrap();
        assert_eq!(value["user_tg_id"], "100");
        assert_eq!(value["friend_tg_id"], "200");
        assert_eq!(value["points"], 100);
        assert!(value["username"].is_null());
    }
}
