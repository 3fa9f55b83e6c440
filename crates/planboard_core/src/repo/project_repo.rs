//! Project, project membership and team assignment persistence.

use super::{parse_optional_uuid, parse_uuid, RepoError, RepoResult};
use crate::model::project::{
    NewProject, Project, ProjectId, ProjectMembership, ProjectRole, ProjectStatus,
};
use crate::model::team::TeamId;
use crate::model::user::UserId;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const PROJECT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    status,
    owner_uuid,
    due_date,
    created_at,
    updated_at
FROM projects";

const MEMBERSHIP_SELECT_SQL: &str = "SELECT
    project_uuid,
    user_uuid,
    team_uuid,
    role,
    created_at
FROM project_memberships";

pub struct ProjectRepo<'conn> {
    conn: &'conn Connection,
}

impl<'conn> ProjectRepo<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, project: &NewProject, owner: UserId) -> RepoResult<Project> {
        let uuid = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO projects (uuid, name, status, owner_uuid, due_date)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                uuid.to_string(),
                project.name.as_str(),
                project.status.as_str(),
                owner.to_string(),
                project.due_date,
            ],
        )?;
        self.get(uuid)?
            .ok_or_else(|| RepoError::InvalidData(format!("project {uuid} vanished after write")))
    }

    pub fn get(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_project_row(row)?)),
            None => Ok(None),
        }
    }

    /// Returns whether another project already uses `name`.
    pub fn name_taken(&self, name: &str, excluding: Option<ProjectId>) -> RepoResult<bool> {
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT uuid FROM projects WHERE name = ?1;",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        let excluding = excluding.map(|id| id.to_string());
        Ok(matches!(found, Some(uuid) if Some(&uuid) != excluding.as_ref()))
    }

    pub fn update(
        &self,
        id: ProjectId,
        name: &str,
        status: ProjectStatus,
        due_date: Option<i64>,
    ) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE projects
             SET name = ?2,
                 status = ?3,
                 due_date = ?4,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), name, status.as_str(), due_date],
        )?;
        Ok(changed > 0)
    }

    pub fn delete(&self, id: ProjectId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    pub fn membership(
        &self,
        project: ProjectId,
        user: UserId,
    ) -> RepoResult<Option<ProjectMembership>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEMBERSHIP_SELECT_SQL} WHERE project_uuid = ?1 AND user_uuid = ?2;"
        ))?;
        let mut rows = stmt.query([project.to_string(), user.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_membership_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn memberships(&self, project: ProjectId) -> RepoResult<Vec<ProjectMembership>> {
        self.query_memberships(
            &format!(
                "{MEMBERSHIP_SELECT_SQL}
                 WHERE project_uuid = ?1
                 ORDER BY created_at ASC, user_uuid ASC;"
            ),
            &[project.to_string()],
        )
    }

    /// Memberships recorded as granted through `team`.
    pub fn memberships_via_team(
        &self,
        project: ProjectId,
        team: TeamId,
    ) -> RepoResult<Vec<ProjectMembership>> {
        self.query_memberships(
            &format!(
                "{MEMBERSHIP_SELECT_SQL}
                 WHERE project_uuid = ?1
                   AND team_uuid = ?2
                 ORDER BY created_at ASC, user_uuid ASC;"
            ),
            &[project.to_string(), team.to_string()],
        )
    }

    /// Users currently holding the Manager role, in user id order.
    pub fn manager_ids(&self, project: ProjectId) -> RepoResult<Vec<UserId>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_uuid
             FROM project_memberships
             WHERE project_uuid = ?1
               AND role = 'manager'
             ORDER BY user_uuid ASC;",
        )?;
        let mut rows = stmt.query([project.to_string()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            ids.push(parse_uuid(&value, "project_memberships.user_uuid")?);
        }
        Ok(ids)
    }

    pub fn insert_membership(
        &self,
        project: ProjectId,
        user: UserId,
        team: Option<TeamId>,
        role: ProjectRole,
    ) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO project_memberships (project_uuid, user_uuid, team_uuid, role)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                project.to_string(),
                user.to_string(),
                team.map(|id| id.to_string()),
                role.as_str(),
            ],
        )?;
        Ok(())
    }

    pub fn set_role(&self, project: ProjectId, user: UserId, role: ProjectRole) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE project_memberships
             SET role = ?3
             WHERE project_uuid = ?1
               AND user_uuid = ?2;",
            params![project.to_string(), user.to_string(), role.as_str()],
        )?;
        Ok(changed > 0)
    }

    pub fn set_membership_team(
        &self,
        project: ProjectId,
        user: UserId,
        team: Option<TeamId>,
    ) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE project_memberships
             SET team_uuid = ?3
             WHERE project_uuid = ?1
               AND user_uuid = ?2;",
            params![
                project.to_string(),
                user.to_string(),
                team.map(|id| id.to_string()),
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_membership(&self, project: ProjectId, user: UserId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM project_memberships WHERE project_uuid = ?1 AND user_uuid = ?2;",
            [project.to_string(), user.to_string()],
        )?;
        Ok(changed > 0)
    }

    /// Records that `team` grants access to `project`. Returns `false` when
    /// the assignment already existed.
    pub fn assign_team(&self, project: ProjectId, team: TeamId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO project_teams (project_uuid, team_uuid) VALUES (?1, ?2);",
            [project.to_string(), team.to_string()],
        )?;
        Ok(changed > 0)
    }

    pub fn unassign_team(&self, project: ProjectId, team: TeamId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM project_teams WHERE project_uuid = ?1 AND team_uuid = ?2;",
            [project.to_string(), team.to_string()],
        )?;
        Ok(changed > 0)
    }

    pub fn team_ids(&self, project: ProjectId) -> RepoResult<Vec<TeamId>> {
        self.query_ids(
            "SELECT team_uuid
             FROM project_teams
             WHERE project_uuid = ?1
             ORDER BY created_at ASC, team_uuid ASC;",
            project,
            "project_teams.team_uuid",
        )
    }

    pub fn project_ids_of_team(&self, team: TeamId) -> RepoResult<Vec<ProjectId>> {
        self.query_ids(
            "SELECT project_uuid
             FROM project_teams
             WHERE team_uuid = ?1
             ORDER BY created_at ASC, project_uuid ASC;",
            team,
            "project_teams.project_uuid",
        )
    }

    /// First team other than `excluding` that is assigned to `project` and
    /// still counts `user` as a member.
    pub fn alternate_team_for(
        &self,
        project: ProjectId,
        user: UserId,
        excluding: TeamId,
    ) -> RepoResult<Option<TeamId>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT pt.team_uuid
                 FROM project_teams pt
                 INNER JOIN team_memberships tm ON tm.team_uuid = pt.team_uuid
                 WHERE pt.project_uuid = ?1
                   AND tm.user_uuid = ?2
                   AND pt.team_uuid <> ?3
                 ORDER BY pt.created_at ASC, pt.team_uuid ASC
                 LIMIT 1;",
                [project.to_string(), user.to_string(), excluding.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        value
            .map(|text| parse_uuid(&text, "project_teams.team_uuid"))
            .transpose()
    }

    fn query_memberships(
        &self,
        sql: &str,
        args: &[String],
    ) -> RepoResult<Vec<ProjectMembership>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(rusqlite::params_from_iter(args.iter()))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_membership_row(row)?);
        }
        Ok(items)
    }

    fn query_ids(&self, sql: &str, key: Uuid, column: &'static str) -> RepoResult<Vec<Uuid>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([key.to_string()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            ids.push(parse_uuid(&value, column)?);
        }
        Ok(ids)
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let uuid: String = row.get("uuid")?;
    let owner: String = row.get("owner_uuid")?;
    let status_text: String = row.get("status")?;
    let status = ProjectStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid project status `{status_text}` in projects.status"
        ))
    })?;
    Ok(Project {
        uuid: parse_uuid(&uuid, "projects.uuid")?,
        name: row.get("name")?,
        status,
        owner_uuid: parse_uuid(&owner, "projects.owner_uuid")?,
        due_date: row.get("due_date")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_membership_row(row: &Row<'_>) -> RepoResult<ProjectMembership> {
    let project: String = row.get("project_uuid")?;
    let user: String = row.get("user_uuid")?;
    let role_text: String = row.get("role")?;
    let role = ProjectRole::parse(&role_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid project role `{role_text}` in project_memberships.role"
        ))
    })?;
    Ok(ProjectMembership {
        project_uuid: parse_uuid(&project, "project_memberships.project_uuid")?,
        user_uuid: parse_uuid(&user, "project_memberships.user_uuid")?,
        team_uuid: parse_optional_uuid(row.get("team_uuid")?, "project_memberships.team_uuid")?,
        role,
        created_at: row.get("created_at")?,
    })
}
