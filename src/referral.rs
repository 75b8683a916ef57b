use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Json};
use log::error;
use mysql::PooledConn;
use tokio::sync::Mutex;

use crate::{
    db::{create_referral, find_user, list_friends, list_referrals},
    ref_link::is_valid_tg_id,
    user_data::{ReferralCreate, ReferralResponse, UserReferralsData},
};

/// Idempotent: a repeated (user, friend) pair answers with the stored
/// row and credits nothing.
pub async fn handle_create_referral(
    input_json: Json<ReferralCreate>,
    db_conn: Arc<Mutex<PooledConn>>,
) -> Result<Json<ReferralResponse>, StatusCode> {
    if !is_valid_tg_id(&input_json.user_tg_id) || !is_valid_tg_id(&input_json.friend_tg_id) {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut db_conn = db_conn.lock().await;
    match create_referral(
        db_conn.as_mut(),
        &input_json.user_tg_id,
        &input_json.friend_tg_id,
    ) {
        Ok((referral, _created)) => Ok(Json(referral.into())),
        Err(err) => {
            error!(
                "Error storing the referral {} -> {}: {}",
                input_json.user_tg_id, input_json.friend_tg_id, err
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn handle_list_referrals(
    path: Path<String>,
    db_conn: Arc<Mutex<PooledConn>>,
) -> Result<Json<Vec<ReferralResponse>>, StatusCode> {
    let tg_id = path.0;
    if !is_valid_tg_id(&tg_id) {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut db_conn = db_conn.lock().await;
    match list_referrals(db_conn.as_mut(), &tg_id) {
        Ok(referrals) => Ok(Json(referrals.into_iter().map(Into::into).collect())),
        Err(err) => {
            error!("Error listing referrals for {}: {}", tg_id, err);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn handle_user_referrals(
    path: Path<String>,
    db_conn: Arc<Mutex<PooledConn>>,
) -> Result<Json<UserReferralsData>, StatusCode> {
    let tg_id = path.0;
    if !is_valid_tg_id(&tg_id) {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut db_conn = db_conn.lock().await;
    let referrer = match find_user(db_conn.as_mut(), &tg_id) {
        Ok(Some(user)) => user,
        Ok(None) => return Err(StatusCode::NOT_FOUND),
        Err(err) => {
            error!("Error reading user {}: {}", tg_id, err);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    match list_friends(db_conn.as_mut(), &tg_id) {
        Ok(friends) => Ok(Json(UserReferralsData {
            referrer: referrer.into(),
            referrals: friends.into_iter().map(Into::into).collect(),
        })),
        Err(err) => {
            error!("Error listing referrals for {}: {}", tg_id, err);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
