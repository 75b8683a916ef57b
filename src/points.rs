use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Json};
use log::error;
use mysql::PooledConn;
use tokio::sync::Mutex;

use crate::{
    db::{find_user, set_points, total_points},
    ref_link::is_valid_tg_id,
    user_data::{PointsData, TotalPointsData, UpdatePoints},
};

/// The denormalized balance on the user row. Diverges from the live
/// referral sum once the balance has been overwritten.
pub async fn handle_get_points(
    path: Path<String>,
    db_conn: Arc<Mutex<PooledConn>>,
) -> Result<Json<PointsData>, StatusCode> {
    let tg_id = path.0;
    if !is_valid_tg_id(&tg_id) {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut db_conn = db_conn.lock().await;
    match find_user(db_conn.as_mut(), &tg_id) {
        Ok(Some(user)) => Ok(Json(PointsData {
            points: user.points,
        })),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(err) => {
            error!("Error reading points for {}: {}", tg_id, err);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

// Unconditional overwrite, not additive.
pub async fn handle_set_points(
    path: Path<String>,
    input_json: Json<UpdatePoints>,
    db_conn: Arc<Mutex<PooledConn>>,
) -> Result<Json<PointsData>, StatusCode> {
    let tg_id = path.0;
    if !is_valid_tg_id(&tg_id) {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut db_conn = db_conn.lock().await;
    match set_points(db_conn.as_mut(), &tg_id, input_json.points) {
        Ok(Some(user)) => Ok(Json(PointsData {
            points: user.points,
        })),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(err) => {
            error!("Error updating points for {}: {}", tg_id, err);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn handle_total_points(
    path: Path<String>,
    db_conn: Arc<Mutex<PooledConn>>,
) -> Result<Json<TotalPointsData>, StatusCode> {
    let tg_id = path.0;
    if !is_valid_tg_id(&tg_id) {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut db_conn = db_conn.lock().await;
    match total_points(db_conn.as_mut(), &tg_id) {
        Ok(total) => Ok(Json(TotalPointsData {
            total_points: total,
        })),
        Err(err) => {
            error!("Error summing points for {}: {}", tg_id, err);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
