//! Team and team membership persistence.

use super::{flag, parse_flag, parse_uuid, RepoError, RepoResult};
use crate::model::team::{Team, TeamId, TeamMembership};
use crate::model::user::UserId;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const MEMBERSHIP_SELECT_SQL: &str = "SELECT
    team_uuid,
    user_uuid,
    is_leader,
    created_at
FROM team_memberships";

pub struct TeamRepo<'conn> {
    conn: &'conn Connection,
}

impl<'conn> TeamRepo<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, name: &str, description: Option<&str>) -> RepoResult<Team> {
        let uuid = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO teams (uuid, name, description) VALUES (?1, ?2, ?3);",
            params![uuid.to_string(), name, description],
        )?;
        self.get(uuid)?
            .ok_or_else(|| RepoError::InvalidData(format!("team {uuid} vanished after write")))
    }

    pub fn get(&self, id: TeamId) -> RepoResult<Option<Team>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, description, created_at, updated_at
             FROM teams
             WHERE uuid = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_team_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn update(&self, id: TeamId, name: &str, description: Option<&str>) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE teams
             SET name = ?2,
                 description = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), name, description],
        )?;
        Ok(changed > 0)
    }

    pub fn delete(&self, id: TeamId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM teams WHERE uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    pub fn membership(&self, team: TeamId, user: UserId) -> RepoResult<Option<TeamMembership>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEMBERSHIP_SELECT_SQL} WHERE team_uuid = ?1 AND user_uuid = ?2;"
        ))?;
        let mut rows = stmt.query([team.to_string(), user.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_membership_row(row)?)),
            None => Ok(None),
        }
    }

    /// Lists memberships in join order.
    pub fn memberships(&self, team: TeamId) -> RepoResult<Vec<TeamMembership>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEMBERSHIP_SELECT_SQL}
             WHERE team_uuid = ?1
             ORDER BY created_at ASC, user_uuid ASC;"
        ))?;
        let mut rows = stmt.query([team.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_membership_row(row)?);
        }
        Ok(items)
    }

    pub fn leader(&self, team: TeamId) -> RepoResult<Option<UserId>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT user_uuid
                 FROM team_memberships
                 WHERE team_uuid = ?1
                   AND is_leader = 1;",
                [team.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        value
            .map(|text| parse_uuid(&text, "team_memberships.user_uuid"))
            .transpose()
    }

    pub fn insert_membership(
        &self,
        team: TeamId,
        user: UserId,
        is_leader: bool,
    ) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO team_memberships (team_uuid, user_uuid, is_leader)
             VALUES (?1, ?2, ?3);",
            params![team.to_string(), user.to_string(), flag(is_leader)],
        )?;
        Ok(())
    }

    pub fn delete_membership(&self, team: TeamId, user: UserId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM team_memberships WHERE team_uuid = ?1 AND user_uuid = ?2;",
            [team.to_string(), user.to_string()],
        )?;
        Ok(changed > 0)
    }

    pub fn set_leader_flag(&self, team: TeamId, user: UserId, is_leader: bool) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE team_memberships
             SET is_leader = ?3
             WHERE team_uuid = ?1
               AND user_uuid = ?2;",
            params![team.to_string(), user.to_string(), flag(is_leader)],
        )?;
        Ok(changed > 0)
    }

    /// Teams the user currently belongs to.
    pub fn team_ids_of_user(&self, user: UserId) -> RepoResult<Vec<TeamId>> {
        let mut stmt = self.conn.prepare(
            "SELECT team_uuid
             FROM team_memberships
             WHERE user_uuid = ?1
             ORDER BY team_uuid ASC;",
        )?;
        let mut rows = stmt.query([user.to_string()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            ids.push(parse_uuid(&value, "team_memberships.team_uuid")?);
        }
        Ok(ids)
    }
}

fn parse_team_row(row: &Row<'_>) -> RepoResult<Team> {
    let uuid: String = row.get("uuid")?;
    Ok(Team {
        uuid: parse_uuid(&uuid, "teams.uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_membership_row(row: &Row<'_>) -> RepoResult<TeamMembership> {
    let team_uuid: String = row.get("team_uuid")?;
    let user_uuid: String = row.get("user_uuid")?;
    Ok(TeamMembership {
        team_uuid: parse_uuid(&team_uuid, "team_memberships.team_uuid")?,
        user_uuid: parse_uuid(&user_uuid, "team_memberships.user_uuid")?,
        is_leader: parse_flag(row.get("is_leader")?, "team_memberships.is_leader")?,
        created_at: row.get("created_at")?,
    })
}
