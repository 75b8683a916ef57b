use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Json};
use log::error;
use mysql::PooledConn;
use tokio::sync::Mutex;

use crate::{db::list_friends, ref_link::is_valid_tg_id, user_data::UserResponse};

pub async fn handle_get_friends(
    path: Path<String>,
    db_conn: Arc<Mutex<PooledConn>>,
) -> Result<Json<Vec<UserResponse>>, StatusCode> {
    let tg_id = path.0;
    if !is_valid_tg_id(&tg_id) {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut db_conn = db_conn.lock().await;
    match list_friends(db_conn.as_mut(), &tg_id) {
        Ok(friends) => Ok(Json(friends.into_iter().map(Into::into).collect())),
        Err(err) => {
            error!("Error listing friends for {}: {}", tg_id, err);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
