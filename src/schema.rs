use std::error::Error;

use mysql::{prelude::Queryable, Conn};

pub fn ensure_schema(conn: &mut Conn) -> Result<(), Box<dyn Error>> {
    conn.query_drop(
        "CREATE TABLE IF NOT EXISTS users (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            tg_id VARCHAR(64) NOT NULL,
            username VARCHAR(255) NULL,
            ref_link VARCHAR(255) NOT NULL,
            points BIGINT NOT NULL DEFAULT 0,
            referred_from VARCHAR(64) NULL,
            UNIQUE KEY uniq_user_tg_id (tg_id),
            UNIQUE KEY uniq_ref_link (ref_link)
        )",
    )?;
    conn.query_drop(
        "CREATE TABLE IF NOT EXISTS referrals (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            user_tg_id VARCHAR(64) NOT NULL,
            friend_tg_id VARCHAR(64) NOT NULL,
            date DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            points BIGINT NOT NULL DEFAULT 100,
            UNIQUE KEY uniq_referral_pair (user_tg_id, friend_tg_id)
        )",
    )?;
    add_referrals_username_column(conn)?;
    Ok(())
}

// Additive migration: the column stays nullable and is never
// backfilled.
fn add_referrals_username_column(conn: &mut Conn) -> Result<(), Box<dyn Error>> {
    let existing: Option<String> = conn.exec_first(
        "SELECT COLUMN_NAME FROM information_schema.COLUMNS
            WHERE TABLE_SCHEMA = DATABASE()
            AND TABLE_NAME = 'referrals'
            AND COLUMN_NAME = 'username'",
        (),
    )?;
    if existing == None {
        conn.query_drop("ALTER TABLE referrals ADD COLUMN username VARCHAR(255) NULL")?;
    }
    Ok(())
}
