use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Json};
use log::error;
use mysql::PooledConn;
use tokio::sync::Mutex;

use crate::{
    db::find_user,
    ref_link::is_valid_tg_id,
    user_data::{RefLinkData, UserResponse},
};

pub async fn handle_get_user(
    path: Path<String>,
    db_conn: Arc<Mutex<PooledConn>>,
) -> Result<Json<UserResponse>, StatusCode> {
    let tg_id = path.0;
    if !is_valid_tg_id(&tg_id) {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut db_conn = db_conn.lock().await;
    match find_user(db_conn.as_mut(), &tg_id) {
        Ok(Some(user)) => Ok(Json(user.into())),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(err) => {
            error!("Error reading user {}: {}", tg_id, err);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn handle_get_ref_link(
    path: Path<String>,
    db_conn: Arc<Mutex<PooledConn>>,
) -> Result<Json<RefLinkData>, StatusCode> {
    let tg_id = path.0;
    if !is_valid_tg_id(&tg_id) {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut db_conn = db_conn.lock().await;
    match find_user(db_conn.as_mut(), &tg_id) {
        Ok(Some(user)) => Ok(Json(RefLinkData {
            referral_link: user.ref_link,
        })),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(err) => {
            error!("Error reading referral link for {}: {}", tg_id, err);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
