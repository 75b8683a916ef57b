use std::error::Error;

use mysql::{prelude::Queryable, Conn, TxOpts};

use crate::ref_link::{derive_ref_link, REFERRAL_POINTS};

const ER_DUP_ENTRY: u16 = 1062;

#[derive(Debug, Clone)]
pub struct UserRow {
    pub tg_id: String,
    pub username: Option<String>,
    pub ref_link: String,
    pub points: i64,
    pub referred_from: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReferralRow {
    pub user_tg_id: String,
    pub friend_tg_id: String,
    pub date: String,
    pub points: i64,
    pub username: Option<String>,
}

pub fn find_user(conn: &mut Conn, tg_id: &str) -> Result<Option<UserRow>, Box<dyn Error>> {
    check_conn(conn);
    let res = conn.exec_first(
        "SELECT tg_id, username, ref_link, points, referred_from
            FROM users WHERE tg_id = ?",
        (tg_id,),
    )?;
    Ok(res.map(
        |(tg_id, username, ref_link, points, referred_from)| UserRow {
            tg_id,
            username,
            ref_link,
            points,
            referred_from,
        },
    ))
}

pub fn get_or_create_user(
    conn: &mut Conn,
    tg_id: &str,
    username: Option<&str>,
    referred_from: Option<&str>,
) -> Result<(UserRow, bool), Box<dyn Error>> {
    check_conn(conn);
    if let Some(user) = find_user(conn, tg_id)? {
        return Ok((user, false));
    }
    let res = conn.exec_drop(
        "INSERT INTO users (tg_id, username, ref_link, points, referred_from)
            VALUES (?, ?, ?, 0, ?)",
        (tg_id, username, derive_ref_link(tg_id), referred_from),
    );
    let created = match res {
        Ok(()) => true,
        // Lost a first-contact race on the tg_id unique key; the
        // winner's row is the record.
        Err(err) if is_duplicate_entry(&err) => false,
        Err(err) => return Err(err.into()),
    };
    let user = find_user(conn, tg_id)?.ok_or("user row missing after insert")?;
    Ok((user, created))
}

pub fn set_points(
    conn: &mut Conn,
    tg_id: &str,
    points: i64,
) -> Result<Option<UserRow>, Box<dyn Error>> {
    check_conn(conn);
    if find_user(conn, tg_id)?.is_none() {
        return Ok(None);
    }
    conn.exec_drop(
        "UPDATE users SET points = ? WHERE tg_id = ?",
        (points, tg_id),
    )?;
    find_user(conn, tg_id)
}

pub fn find_referral(
    conn: &mut Conn,
    user_tg_id: &str,
    friend_tg_id: &str,
) -> Result<Option<ReferralRow>, Box<dyn Error>> {
    check_conn(conn);
    let res = conn.exec_first(
        "SELECT user_tg_id, friend_tg_id, CAST(date AS CHAR), points, username
            FROM referrals WHERE user_tg_id = ? AND friend_tg_id = ?",
        (user_tg_id, friend_tg_id),
    )?;
    Ok(res.map(
        |(user_tg_id, friend_tg_id, date, points, username)| ReferralRow {
            user_tg_id,
            friend_tg_id,
            date,
            points,
            username,
        },
    ))
}

/// Records the referral edge and credits the referrer, exactly once per
/// (user, friend) pair. An existing edge is returned unchanged with no
/// second credit; the returned flag is true only when this call
/// inserted a new row.
pub fn create_referral(
    conn: &mut Conn,
    user_tg_id: &str,
    friend_tg_id: &str,
) -> Result<(ReferralRow, bool), Box<dyn Error>> {
    check_conn(conn);
    if let Some(existing) = find_referral(conn, user_tg_id, friend_tg_id)? {
        return Ok((existing, false));
    }
    let created = match insert_referral(conn, user_tg_id, friend_tg_id) {
        Ok(()) => true,
        // Lost the race on the (user, friend) unique key; the winner's
        // transaction carries the one credit.
        Err(err) if is_duplicate_entry(&err) => false,
        Err(err) => return Err(err.into()),
    };
    let referral = find_referral(conn, user_tg_id, friend_tg_id)?
        .ok_or("referral row missing after insert")?;
    Ok((referral, created))
}

// Both endpoint users, the referral row and the referrer's credit land
// in one transaction; a failed commit leaves no partial state.
fn insert_referral(conn: &mut Conn, user_tg_id: &str, friend_tg_id: &str) -> mysql::Result<()> {
    let mut tx = conn.start_transaction(TxOpts::default())?;
    ensure_user(&mut tx, user_tg_id)?;
    ensure_user(&mut tx, friend_tg_id)?;
    tx.exec_drop(
        "INSERT INTO referrals (user_tg_id, friend_tg_id, points) VALUES (?, ?, ?)",
        (user_tg_id, friend_tg_id, REFERRAL_POINTS),
    )?;
    tx.exec_drop(
        "UPDATE users SET points = points + ? WHERE tg_id = ?",
        (REFERRAL_POINTS, user_tg_id),
    )?;
    tx.commit()
}

fn ensure_user<Q: Queryable>(conn: &mut Q, tg_id: &str) -> mysql::Result<()> {
    conn.exec_drop(
        "INSERT INTO users (tg_id, ref_link, points) VALUES (?, ?, 0)
            ON DUPLICATE KEY UPDATE tg_id = tg_id",
        (tg_id, derive_ref_link(tg_id)),
    )
}

pub fn list_referrals(conn: &mut Conn, tg_id: &str) -> Result<Vec<ReferralRow>, Box<dyn Error>> {
    check_conn(conn);
    let rows = conn.exec_map(
        "SELECT user_tg_id, friend_tg_id, CAST(date AS CHAR), points, username
            FROM referrals WHERE user_tg_id = ?
            ORDER BY date ASC, id ASC",
        (tg_id,),
        |(user_tg_id, friend_tg_id, date, points, username)| ReferralRow {
            user_tg_id,
            friend_tg_id,
            date,
            points,
            username,
        },
    )?;
    Ok(rows)
}

// Friends that were never onboarded as users drop out of the join.
pub fn list_friends(conn: &mut Conn, tg_id: &str) -> Result<Vec<UserRow>, Box<dyn Error>> {
    check_conn(conn);
    let rows = conn.exec_map(
        "SELECT u.tg_id, u.username, u.ref_link, u.points, u.referred_from
            FROM referrals r
            JOIN users u ON u.tg_id = r.friend_tg_id
            WHERE r.user_tg_id = ?
            ORDER BY r.date ASC, r.id ASC",
        (tg_id,),
        |(tg_id, username, ref_link, points, referred_from)| UserRow {
            tg_id,
            username,
            ref_link,
            points,
            referred_from,
        },
    )?;
    Ok(rows)
}

/// Live recomputation over the referral table, independent of the
/// denormalized users.points balance.
pub fn total_points(conn: &mut Conn, tg_id: &str) -> Result<i64, Box<dyn Error>> {
    check_conn(conn);
    let res: Option<i64> = conn.exec_first(
        "SELECT CAST(COALESCE(SUM(points), 0) AS SIGNED)
            FROM referrals WHERE user_tg_id = ?",
        (tg_id,),
    )?;
    Ok(res.unwrap_or(0))
}

fn check_conn(conn: &mut Conn) {
    if let Err(_) = conn.ping() {
        let _ = conn.reset();
    }
}

fn is_duplicate_entry(err: &mysql::Error) -> bool {
    matches!(err, mysql::Error::MySqlError(server_err) if server_err.code == ER_DUP_ENTRY)
}

#[cfg(test)]
mod tests {
    use mysql::error::MySqlError;

    use crate::db::is_duplicate_entry;

    #[tokio::test]
    async fn test_duplicate_entry_detection() {
        let dup = mysql::Error::MySqlError(MySqlError {
            state: "23000".to_string(),
            message: "Duplicate entry '100-200' for key 'referrals.uniq_referral_pair'"
                .to_string(),
            code: 1062,
        });
        assert!(is_duplicate_entry(&dup));

        let missing_table = mysql::Error::MySqlError(MySqlError {
            state: "42S02".to_string(),
            message: "Table 'referral-backend.referrals' doesn't exist".to_string(),
            code: 1146,
        });
        assert!(!is_duplicate_entry(&missing_table));
    }
}
