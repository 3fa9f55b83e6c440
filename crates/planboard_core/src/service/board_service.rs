//! Board use-case service: guard first, engine second.

use super::feed_service::ActivityFeed;
use crate::auth::{Action, EntityKind, EntityRef, Guard, SqliteRelationships};
use crate::config::AuditConfig;
use crate::engine::MutationEngine;
use crate::error::CoreResult;
use crate::model::audit::AuditLogEntry;
use crate::model::comment::{Comment, CommentId};
use crate::model::label::{Label, LabelId, LabelPatch};
use crate::model::list::{ListId, TaskList};
use crate::model::project::{NewProject, Project, ProjectId, ProjectMembership, ProjectPatch};
use crate::model::task::{NewTask, Task, TaskId, TaskPatch};
use crate::model::team::{NewTeam, Team, TeamId, TeamMembership, TeamPatch};
use crate::model::user::{NewUser, User, UserId, UserProfilePatch};
use crate::model::PositionAssignment;
use crate::repo::{CommentRepo, LabelRepo, ListRepo, TaskRepo};
use rusqlite::Connection;

pub struct BoardService<'conn> {
    conn: &'conn Connection,
    guard: Guard<SqliteRelationships<'conn>>,
    engine: MutationEngine<'conn>,
    feed: ActivityFeed<'conn>,
}

impl<'conn> BoardService<'conn> {
    pub fn new(conn: &'conn Connection, audit: AuditConfig) -> Self {
        Self {
            conn,
            guard: Guard::new(SqliteRelationships::new(conn)),
            engine: MutationEngine::new(conn),
            feed: ActivityFeed::new(conn, audit),
        }
    }

    pub fn guard(&self) -> &Guard<SqliteRelationships<'conn>> {
        &self.guard
    }

    fn authorize(
        &self,
        actor: UserId,
        entity: EntityKind,
        action: Action,
        target: EntityRef,
    ) -> CoreResult<()> {
        self.guard.require(entity, action, target, actor)
    }

    // Users: identity is verified upstream, so these carry no guard.

    pub fn create_user(&self, user: NewUser) -> CoreResult<User> {
        self.engine.create_user(user)
    }

    pub fn update_user_profile(&self, actor: UserId, patch: UserProfilePatch) -> CoreResult<User> {
        self.engine.update_user_profile(actor, patch)
    }

    // Teams

    pub fn create_team(&self, actor: UserId, team: NewTeam) -> CoreResult<Team> {
        self.engine.create_team(actor, team)
    }

    pub fn update_team(&self, actor: UserId, team: TeamId, patch: TeamPatch) -> CoreResult<Team> {
        self.authorize(actor, EntityKind::Team, Action::Update, EntityRef::Team(team))?;
        self.engine.update_team(actor, team, patch)
    }

    pub fn delete_team(&self, actor: UserId, team: TeamId) -> CoreResult<Team> {
        self.authorize(actor, EntityKind::Team, Action::Delete, EntityRef::Team(team))?;
        self.engine.delete_team(actor, team)
    }

    pub fn add_team_member(
        &self,
        actor: UserId,
        team: TeamId,
        user: UserId,
    ) -> CoreResult<TeamMembership> {
        self.authorize(actor, EntityKind::Team, Action::AddMember, EntityRef::Team(team))?;
        self.engine.add_team_member(actor, team, user)
    }

    pub fn remove_team_member(
        &self,
        actor: UserId,
        team: TeamId,
        user: UserId,
    ) -> CoreResult<TeamMembership> {
        self.authorize(
            actor,
            EntityKind::Team,
            Action::RemoveMember,
            EntityRef::Team(team),
        )?;
        self.engine.remove_team_member(actor, team, user)
    }

    pub fn reassign_team_leader(
        &self,
        actor: UserId,
        team: TeamId,
        user: UserId,
    ) -> CoreResult<TeamMembership> {
        self.authorize(
            actor,
            EntityKind::Team,
            Action::ReassignLeader,
            EntityRef::Team(team),
        )?;
        self.engine.reassign_team_leader(actor, team, user)
    }

    // Projects

    pub fn create_project(&self, actor: UserId, project: NewProject) -> CoreResult<Project> {
        self.engine.create_project(actor, project)
    }

    pub fn update_project(
        &self,
        actor: UserId,
        project: ProjectId,
        patch: ProjectPatch,
    ) -> CoreResult<Project> {
        self.authorize(
            actor,
            EntityKind::Project,
            Action::Update,
            EntityRef::Project(project),
        )?;
        self.engine.update_project(actor, project, patch)
    }

    pub fn delete_project(&self, actor: UserId, project: ProjectId) -> CoreResult<Project> {
        self.authorize(
            actor,
            EntityKind::Project,
            Action::Delete,
            EntityRef::Project(project),
        )?;
        self.engine.delete_project(actor, project)
    }

    pub fn assign_team(&self, actor: UserId, project: ProjectId, team: TeamId) -> CoreResult<()> {
        self.authorize(
            actor,
            EntityKind::Project,
            Action::ManageTeams,
            EntityRef::Project(project),
        )?;
        self.engine.assign_team(actor, project, team)
    }

    pub fn unassign_team(&self, actor: UserId, project: ProjectId, team: TeamId) -> CoreResult<()> {
        self.authorize(
            actor,
            EntityKind::Project,
            Action::ManageTeams,
            EntityRef::Project(project),
        )?;
        self.engine.unassign_team(actor, project, team)
    }

    pub fn reassign_project_manager(
        &self,
        actor: UserId,
        project: ProjectId,
        user: UserId,
    ) -> CoreResult<ProjectMembership> {
        self.authorize(
            actor,
            EntityKind::Project,
            Action::ReassignRole,
            EntityRef::Project(project),
        )?;
        self.engine.reassign_project_manager(actor, project, user)
    }

    // Lists

    pub fn project_lists(&self, actor: UserId, project: ProjectId) -> CoreResult<Vec<TaskList>> {
        self.authorize(actor, EntityKind::List, Action::Read, EntityRef::Project(project))?;
        Ok(ListRepo::new(self.conn).by_project(project)?)
    }

    pub fn create_list(&self, actor: UserId, project: ProjectId, name: &str) -> CoreResult<TaskList> {
        self.authorize(actor, EntityKind::List, Action::Create, EntityRef::Project(project))?;
        self.engine.create_list(actor, project, name)
    }

    pub fn rename_list(&self, actor: UserId, list: ListId, name: &str) -> CoreResult<TaskList> {
        self.authorize(actor, EntityKind::List, Action::Update, EntityRef::List(list))?;
        self.engine.rename_list(actor, list, name)
    }

    pub fn delete_list(&self, actor: UserId, list: ListId) -> CoreResult<TaskList> {
        self.authorize(actor, EntityKind::List, Action::Delete, EntityRef::List(list))?;
        self.engine.delete_list(actor, list)
    }

    pub fn reorder_lists(
        &self,
        actor: UserId,
        project: ProjectId,
        batch: &[PositionAssignment],
    ) -> CoreResult<Vec<TaskList>> {
        self.authorize(actor, EntityKind::List, Action::Reorder, EntityRef::Project(project))?;
        self.engine.reorder_lists(actor, project, batch)
    }

    pub fn reassign_done_list(&self, actor: UserId, list: ListId) -> CoreResult<TaskList> {
        self.authorize(actor, EntityKind::List, Action::Update, EntityRef::List(list))?;
        self.engine.reassign_done_list(actor, list)
    }

    // Tasks

    pub fn list_tasks(&self, actor: UserId, list: ListId) -> CoreResult<Vec<Task>> {
        self.authorize(actor, EntityKind::Task, Action::Read, EntityRef::List(list))?;
        Ok(TaskRepo::new(self.conn).by_list(list)?)
    }

    pub fn create_task(&self, actor: UserId, list: ListId, task: NewTask) -> CoreResult<Task> {
        self.authorize(actor, EntityKind::Task, Action::Create, EntityRef::List(list))?;
        self.engine.create_task(actor, list, task)
    }

    pub fn update_task(&self, actor: UserId, task: TaskId, patch: TaskPatch) -> CoreResult<Task> {
        self.authorize(actor, EntityKind::Task, Action::Update, EntityRef::Task(task))?;
        self.engine.update_task(actor, task, patch)
    }

    pub fn delete_task(&self, actor: UserId, task: TaskId) -> CoreResult<Task> {
        self.authorize(actor, EntityKind::Task, Action::Delete, EntityRef::Task(task))?;
        self.engine.delete_task(actor, task)
    }

    pub fn reorder_tasks(
        &self,
        actor: UserId,
        list: ListId,
        batch: &[PositionAssignment],
    ) -> CoreResult<Vec<Task>> {
        self.authorize(actor, EntityKind::Task, Action::Reorder, EntityRef::List(list))?;
        self.engine.reorder_tasks(actor, list, batch)
    }

    /// Requires move rights on the task and membership in the target list's
    /// project.
    pub fn move_task(
        &self,
        actor: UserId,
        task: TaskId,
        target: ListId,
        position: Option<i64>,
    ) -> CoreResult<Task> {
        self.authorize(actor, EntityKind::Task, Action::Move, EntityRef::Task(task))?;
        self.authorize(actor, EntityKind::List, Action::Read, EntityRef::List(target))?;
        self.engine.move_task(actor, task, target, position)
    }

    pub fn assign_task(&self, actor: UserId, task: TaskId, user: UserId) -> CoreResult<Task> {
        self.authorize(actor, EntityKind::Task, Action::Assign, EntityRef::Task(task))?;
        self.engine.assign_task(actor, task, user)
    }

    pub fn unassign_task(&self, actor: UserId, task: TaskId, user: UserId) -> CoreResult<Task> {
        self.authorize(actor, EntityKind::Task, Action::Assign, EntityRef::Task(task))?;
        self.engine.unassign_task(actor, task, user)
    }

    // Comments

    pub fn task_comments(&self, actor: UserId, task: TaskId) -> CoreResult<Vec<Comment>> {
        self.authorize(actor, EntityKind::Comment, Action::Read, EntityRef::Task(task))?;
        Ok(CommentRepo::new(self.conn).by_task(task)?)
    }

    pub fn create_comment(
        &self,
        actor: UserId,
        task: TaskId,
        parent: Option<CommentId>,
        content: &str,
    ) -> CoreResult<Comment> {
        self.authorize(actor, EntityKind::Comment, Action::Create, EntityRef::Task(task))?;
        self.engine.create_comment(actor, task, parent, content)
    }

    pub fn update_comment(
        &self,
        actor: UserId,
        comment: CommentId,
        content: &str,
    ) -> CoreResult<Comment> {
        self.authorize(
            actor,
            EntityKind::Comment,
            Action::Update,
            EntityRef::Comment(comment),
        )?;
        self.engine.update_comment(actor, comment, content)
    }

    pub fn delete_comment(&self, actor: UserId, comment: CommentId) -> CoreResult<Comment> {
        self.authorize(
            actor,
            EntityKind::Comment,
            Action::Delete,
            EntityRef::Comment(comment),
        )?;
        self.engine.delete_comment(actor, comment)
    }

    // Labels

    pub fn project_labels(&self, actor: UserId, project: ProjectId) -> CoreResult<Vec<Label>> {
        self.authorize(actor, EntityKind::Label, Action::Read, EntityRef::Project(project))?;
        Ok(LabelRepo::new(self.conn).by_project(project)?)
    }

    pub fn create_label(
        &self,
        actor: UserId,
        project: ProjectId,
        name: &str,
        color: Option<&str>,
    ) -> CoreResult<Label> {
        self.authorize(actor, EntityKind::Label, Action::Create, EntityRef::Project(project))?;
        self.engine.create_label(actor, project, name, color)
    }

    pub fn update_label(&self, actor: UserId, label: LabelId, patch: LabelPatch) -> CoreResult<Label> {
        self.authorize(actor, EntityKind::Label, Action::Update, EntityRef::Label(label))?;
        self.engine.update_label(actor, label, patch)
    }

    pub fn delete_label(&self, actor: UserId, label: LabelId) -> CoreResult<Label> {
        self.authorize(actor, EntityKind::Label, Action::Delete, EntityRef::Label(label))?;
        self.engine.delete_label(actor, label)
    }

    /// Tagging edits the task, so it needs task update rights.
    pub fn attach_label(&self, actor: UserId, task: TaskId, label: LabelId) -> CoreResult<Task> {
        self.authorize(actor, EntityKind::Task, Action::Update, EntityRef::Task(task))?;
        self.engine.attach_label(actor, task, label)
    }

    pub fn detach_label(&self, actor: UserId, task: TaskId, label: LabelId) -> CoreResult<Task> {
        self.authorize(actor, EntityKind::Task, Action::Update, EntityRef::Task(task))?;
        self.engine.detach_label(actor, task, label)
    }

    // Audit

    pub fn activity_feed(&self, viewer: UserId, limit: Option<u32>) -> CoreResult<Vec<AuditLogEntry>> {
        self.feed.for_viewer(viewer, limit)
    }
}
