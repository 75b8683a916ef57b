use std::sync::Arc;

use axum::{http::StatusCode, Json};
use log::error;
use mysql::PooledConn;
use tokio::sync::Mutex;

use crate::{
    db::get_or_create_user,
    ref_link::is_valid_tg_id,
    user_data::{UserCreate, UserResponse},
};

pub async fn handle_create_user(
    input_json: Json<UserCreate>,
    db_conn: Arc<Mutex<PooledConn>>,
) -> Result<(StatusCode, Json<UserResponse>), StatusCode> {
    if !is_valid_tg_id(&input_json.tg_id) {
        return Err(StatusCode::BAD_REQUEST);
    }
    if let Some(referred_from) = &input_json.referred_from {
        if !is_valid_tg_id(referred_from) {
            return Err(StatusCode::BAD_REQUEST);
        }
    }
    let mut db_conn = db_conn.lock().await;
    match get_or_create_user(
        db_conn.as_mut(),
        &input_json.tg_id,
        input_json.username.as_deref(),
        input_json.referred_from.as_deref(),
    ) {
        Ok((user, created)) => {
            let status = if created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            Ok((status, Json(user.into())))
        }
        Err(err) => {
            error!("Error creating user {}: {}", input_json.tg_id, err);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
