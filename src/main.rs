use std::{error::Error, sync::Arc};

use axum::{
    routing::{get, post},
    serve, Router,
};
use clap::Parser;
use cors::{build_cors_layer, parse_origins};
use friends::handle_get_friends;
use log::{info, Level};
use mysql::Pool;
use onboarding::handle_create_user;
use points::{handle_get_points, handle_set_points, handle_total_points};
use referral::{handle_create_referral, handle_list_referrals, handle_user_referrals};
use schema::ensure_schema;
use stderrlog::Timestamp;
use tokio::{net::TcpListener, sync::Mutex};
use users::{handle_get_ref_link, handle_get_user};

mod cors;
mod db;
mod friends;
mod onboarding;
mod points;
mod ref_link;
mod referral;
mod schema;
mod user_data;
mod users;

#[derive(Parser, Debug)]
pub struct Args {
    #[arg(long, default_value_t = 8000)]
    pub port: u16,

    #[arg(long)]
    pub mysql_user: String,

    #[arg(long)]
    pub mysql_password: String,

    #[arg(long)]
    pub mysql_host: String,

    #[arg(long, default_value_t = 3306)]
    pub mysql_port: u16,

    #[arg(long)]
    pub mysql_database: String,

    // Repeatable; "*" selects the wildcard mode.
    #[arg(long, default_value = "*")]
    pub cors_origin: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    stderrlog::new()
        .verbosity(Level::Info)
        .timestamp(Timestamp::Millisecond)
        .init()
        .unwrap();

    let cors_policy = parse_origins(&args.cors_origin)?;

    let mysql_url = format!(
        "mysql://{}:{}@{}:{}/{}",
        args.mysql_user, args.mysql_password, args.mysql_host, args.mysql_port, args.mysql_database
    );
    let mysql_display_url = format!(
        "mysql://{}:{}@{}:{}/{}",
        args.mysql_user, "********", args.mysql_host, args.mysql_port, args.mysql_database
    );
    info!(
        "Connecting to the database with URL {} ...",
        mysql_display_url
    );
    let mut db_conn = Pool::new(mysql_url.as_str())?.get_conn()?;
    info!("Successfully created DB connection.");

    ensure_schema(db_conn.as_mut())?;
    info!("Database schema is up to date.");

    let db_conn: Arc<Mutex<mysql::PooledConn>> = Arc::new(Mutex::new(db_conn));

    let cors = build_cors_layer(cors_policy);

    let app = Router::new()
        .route("/", get(|| async { "Referral Backend" }))
        .route(
            "/users/",
            post({
                let db_conn = Arc::clone(&db_conn);
                move |input| handle_create_user(input, db_conn)
            }),
        )
        .route(
            "/users/:tg_id",
            get({
                let db_conn = Arc::clone(&db_conn);
                move |path| handle_get_user(path, db_conn)
            }),
        )
        .route(
            "/users/:tg_id/friends",
            get({
                let db_conn = Arc::clone(&db_conn);
                move |path| handle_get_friends(path, db_conn)
            }),
        )
        .route(
            "/users/:tg_id/referrals",
            get({
                let db_conn = Arc::clone(&db_conn);
                move |path| handle_user_referrals(path, db_conn)
            }),
        )
        .route(
            "/users/:tg_id/referral_link",
            get({
                let db_conn = Arc::clone(&db_conn);
                move |path| handle_get_ref_link(path, db_conn)
            }),
        )
        .route(
            "/users/:tg_id/points",
            get({
                let db_conn = Arc::clone(&db_conn);
                move |path| handle_get_points(path, db_conn)
            })
            .post({
                let db_conn = Arc::clone(&db_conn);
                move |path, input| handle_set_points(path, input, db_conn)
            }),
        )
        .route(
            "/referrals/",
            post({
                let db_conn = Arc::clone(&db_conn);
                move |input| handle_create_referral(input, db_conn)
            }),
        )
        .route(
            "/referrals/:tg_id",
            get({
                let db_conn = Arc::clone(&db_conn);
                move |path| handle_list_referrals(path, db_conn)
            }),
        )
        .route(
            "/referrals/:tg_id/points",
            get({
                let db_conn = Arc::clone(&db_conn);
                move |path| handle_total_points(path, db_conn)
            }),
        )
        .layer(cors);

    let tcp_listener = TcpListener::bind(format!("0.0.0.0:{}", args.port))
        .await
        .unwrap();

    info!("Starting server at port {}", args.port);
    serve(tcp_listener, app).await.unwrap();
    Ok(())
}
