//! User persistence.

use super::{parse_uuid, RepoResult};
use crate::model::user::{NewUser, User, UserId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT
    uuid,
    display_name,
    email,
    avatar_url,
    created_at,
    updated_at
FROM users";

pub struct UserRepo<'conn> {
    conn: &'conn Connection,
}

impl<'conn> UserRepo<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, user: &NewUser) -> RepoResult<User> {
        let uuid = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO users (uuid, display_name, email, avatar_url)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                uuid.to_string(),
                user.display_name.as_str(),
                user.email.as_str(),
                user.avatar_url.as_deref(),
            ],
        )?;
        self.require(uuid)
    }

    pub fn get(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn email_taken(&self, email: &str) -> RepoResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM users WHERE email = ?1;",
                [email],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn update_profile(
        &self,
        id: UserId,
        display_name: &str,
        avatar_url: Option<&str>,
    ) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE users
             SET display_name = ?2,
                 avatar_url = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), display_name, avatar_url],
        )?;
        Ok(changed > 0)
    }

    fn require(&self, id: UserId) -> RepoResult<User> {
        self.get(id)?.ok_or_else(|| {
            super::RepoError::InvalidData(format!("user {id} vanished after write"))
        })
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let uuid: String = row.get("uuid")?;
    Ok(User {
        uuid: parse_uuid(&uuid, "users.uuid")?,
        display_name: row.get("display_name")?,
        email: row.get("email")?,
        avatar_url: row.get("avatar_url")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
