//! Upward resolution of an actor's relationship to an entity.
//!
//! # Responsibility
//! - Walk comment -> task -> list -> project (or label -> project) from the
//!   starting point.
//! - Report team role only for team starting points.
//!
//! # Invariants
//! - Missing entities resolve to "no relationship", never to an error.
//! - Storage errors still propagate; they are not relationship facts.

use crate::model::comment::CommentId;
use crate::model::label::LabelId;
use crate::model::list::ListId;
use crate::model::project::{ProjectId, ProjectRole};
use crate::model::task::TaskId;
use crate::model::team::{TeamId, TeamRole};
use crate::model::user::UserId;
use crate::repo::{
    CommentRepo, LabelRepo, ListRepo, ProjectRepo, RepoResult, TaskRepo, TeamRepo,
};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Starting point of a permission question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    Team(TeamId),
    Project(ProjectId),
    List(ListId),
    Label(LabelId),
    Task(TaskId),
    Comment(CommentId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Team(id) => write!(f, "team:{id}"),
            Self::Project(id) => write!(f, "project:{id}"),
            Self::List(id) => write!(f, "list:{id}"),
            Self::Label(id) => write!(f, "label:{id}"),
            Self::Task(id) => write!(f, "task:{id}"),
            Self::Comment(id) => write!(f, "comment:{id}"),
        }
    }
}

/// Everything the policy needs to know about one actor and one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionContext {
    pub actor: UserId,
    pub team_role: Option<TeamRole>,
    pub is_project_member: bool,
    pub project_role: Option<ProjectRole>,
    /// Creator plus current assignees; set only for task and comment starts.
    pub task_author_ids: Option<BTreeSet<UserId>>,
    pub comment_author_id: Option<UserId>,
    /// Whether the walk reached an existing team or project.
    pub resolved: bool,
}

impl PermissionContext {
    /// The "no relationship" state.
    pub fn empty(actor: UserId) -> Self {
        Self {
            actor,
            team_role: None,
            is_project_member: false,
            project_role: None,
            task_author_ids: None,
            comment_author_id: None,
            resolved: false,
        }
    }

    pub fn is_manager(&self) -> bool {
        self.project_role == Some(ProjectRole::Manager)
    }
}

/// Comment facts needed to continue the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentLink {
    pub task_uuid: TaskId,
    pub author_uuid: UserId,
}

/// Task facts needed to continue the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLink {
    pub list_uuid: ListId,
    pub author_ids: BTreeSet<UserId>,
}

/// Read-only relationship lookups the resolver depends on.
pub trait RelationshipSource {
    fn comment_link(&self, comment: CommentId) -> RepoResult<Option<CommentLink>>;
    fn task_link(&self, task: TaskId) -> RepoResult<Option<TaskLink>>;
    fn list_project(&self, list: ListId) -> RepoResult<Option<ProjectId>>;
    fn label_project(&self, label: LabelId) -> RepoResult<Option<ProjectId>>;
    fn project_exists(&self, project: ProjectId) -> RepoResult<bool>;
    fn project_role(&self, project: ProjectId, user: UserId) -> RepoResult<Option<ProjectRole>>;
    fn team_exists(&self, team: TeamId) -> RepoResult<bool>;
    fn team_role(&self, team: TeamId, user: UserId) -> RepoResult<Option<TeamRole>>;
}

/// [`RelationshipSource`] backed by the SQLite repositories.
pub struct SqliteRelationships<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRelationships<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RelationshipSource for SqliteRelationships<'_> {
    fn comment_link(&self, comment: CommentId) -> RepoResult<Option<CommentLink>> {
        Ok(CommentRepo::new(self.conn)
            .get(comment)?
            .map(|found| CommentLink {
                task_uuid: found.task_uuid,
                author_uuid: found.author_uuid,
            }))
    }

    fn task_link(&self, task: TaskId) -> RepoResult<Option<TaskLink>> {
        Ok(TaskRepo::new(self.conn).get(task)?.map(|found| TaskLink {
            list_uuid: found.list_uuid,
            author_ids: found.author_ids(),
        }))
    }

    fn list_project(&self, list: ListId) -> RepoResult<Option<ProjectId>> {
        Ok(ListRepo::new(self.conn)
            .get(list)?
            .map(|found| found.project_uuid))
    }

    fn label_project(&self, label: LabelId) -> RepoResult<Option<ProjectId>> {
        Ok(LabelRepo::new(self.conn)
            .get(label)?
            .map(|found| found.project_uuid))
    }

    fn project_exists(&self, project: ProjectId) -> RepoResult<bool> {
        Ok(ProjectRepo::new(self.conn).get(project)?.is_some())
    }

    fn project_role(&self, project: ProjectId, user: UserId) -> RepoResult<Option<ProjectRole>> {
        Ok(ProjectRepo::new(self.conn)
            .membership(project, user)?
            .map(|membership| membership.role))
    }

    fn team_exists(&self, team: TeamId) -> RepoResult<bool> {
        Ok(TeamRepo::new(self.conn).get(team)?.is_some())
    }

    fn team_role(&self, team: TeamId, user: UserId) -> RepoResult<Option<TeamRole>> {
        Ok(TeamRepo::new(self.conn)
            .membership(team, user)?
            .map(|membership| membership.role()))
    }
}

/// Resolves `actor`'s relationship to `start` by walking up its parents.
pub fn resolve_context<S>(source: &S, actor: UserId, start: EntityRef) -> RepoResult<PermissionContext>
where
    S: RelationshipSource + ?Sized,
{
    let mut ctx = PermissionContext::empty(actor);
    let mut project = None;
    let mut cursor = Some(start);

    while let Some(current) = cursor.take() {
        cursor = match current {
            EntityRef::Comment(id) => match source.comment_link(id)? {
                Some(link) => {
                    ctx.comment_author_id = Some(link.author_uuid);
                    Some(EntityRef::Task(link.task_uuid))
                }
                None => None,
            },
            EntityRef::Task(id) => match source.task_link(id)? {
                Some(link) => {
                    ctx.task_author_ids = Some(link.author_ids);
                    Some(EntityRef::List(link.list_uuid))
                }
                None => None,
            },
            EntityRef::List(id) => source.list_project(id)?.map(EntityRef::Project),
            EntityRef::Label(id) => source.label_project(id)?.map(EntityRef::Project),
            EntityRef::Project(id) => {
                if source.project_exists(id)? {
                    project = Some(id);
                }
                None
            }
            EntityRef::Team(id) => {
                ctx.resolved = source.team_exists(id)?;
                ctx.team_role = source.team_role(id, actor)?;
                None
            }
        };
    }

    if let Some(project) = project {
        ctx.resolved = true;
        ctx.project_role = source.project_role(project, actor)?;
        ctx.is_project_member = ctx.project_role.is_some();
    }
    Ok(ctx)
}

#[cfg(test)]
mod tests {
    use super::{
        resolve_context, CommentLink, EntityRef, PermissionContext, RelationshipSource, TaskLink,
    };
    use crate::model::comment::CommentId;
    use crate::model::label::LabelId;
    use crate::model::list::ListId;
    use crate::model::project::{ProjectId, ProjectRole};
    use crate::model::task::TaskId;
    use crate::model::team::{TeamId, TeamRole};
    use crate::model::user::UserId;
    use crate::repo::RepoResult;
    use std::collections::{BTreeSet, HashMap, HashSet};
    use uuid::Uuid;

    #[derive(Default)]
    struct FakeSource {
        comments: HashMap<CommentId, CommentLink>,
        tasks: HashMap<TaskId, TaskLink>,
        lists: HashMap<ListId, ProjectId>,
        labels: HashMap<LabelId, ProjectId>,
        projects: HashSet<ProjectId>,
        project_roles: HashMap<(ProjectId, UserId), ProjectRole>,
        teams: HashSet<TeamId>,
        team_roles: HashMap<(TeamId, UserId), TeamRole>,
    }

    impl RelationshipSource for FakeSource {
        fn comment_link(&self, comment: CommentId) -> RepoResult<Option<CommentLink>> {
            Ok(self.comments.get(&comment).copied())
        }

        fn task_link(&self, task: TaskId) -> RepoResult<Option<TaskLink>> {
            Ok(self.tasks.get(&task).cloned())
        }

        fn list_project(&self, list: ListId) -> RepoResult<Option<ProjectId>> {
            Ok(self.lists.get(&list).copied())
        }

        fn label_project(&self, label: LabelId) -> RepoResult<Option<ProjectId>> {
            Ok(self.labels.get(&label).copied())
        }

        fn project_exists(&self, project: ProjectId) -> RepoResult<bool> {
            Ok(self.projects.contains(&project))
        }

        fn project_role(&self, project: ProjectId, user: UserId) -> RepoResult<Option<ProjectRole>> {
            Ok(self.project_roles.get(&(project, user)).copied())
        }

        fn team_exists(&self, team: TeamId) -> RepoResult<bool> {
            Ok(self.teams.contains(&team))
        }

        fn team_role(&self, team: TeamId, user: UserId) -> RepoResult<Option<TeamRole>> {
            Ok(self.team_roles.get(&(team, user)).copied())
        }
    }

    struct Board {
        source: FakeSource,
        actor: UserId,
        author: UserId,
        team: TeamId,
        project: ProjectId,
        list: ListId,
        task: TaskId,
        comment: CommentId,
    }

    fn board() -> Board {
        let actor = Uuid::new_v4();
        let author = Uuid::new_v4();
        let team = Uuid::new_v4();
        let project = Uuid::new_v4();
        let list = Uuid::new_v4();
        let task = Uuid::new_v4();
        let comment = Uuid::new_v4();

        let mut source = FakeSource::default();
        source.teams.insert(team);
        source.team_roles.insert((team, actor), TeamRole::Member);
        source.projects.insert(project);
        source
            .project_roles
            .insert((project, actor), ProjectRole::Member);
        source.lists.insert(list, project);
        source.tasks.insert(
            task,
            TaskLink {
                list_uuid: list,
                author_ids: BTreeSet::from([author]),
            },
        );
        source.comments.insert(
            comment,
            CommentLink {
                task_uuid: task,
                author_uuid: author,
            },
        );

        Board {
            source,
            actor,
            author,
            team,
            project,
            list,
            task,
            comment,
        }
    }

    #[test]
    fn comment_start_walks_all_the_way_up() {
        let board = board();
        let ctx = resolve_context(&board.source, board.actor, EntityRef::Comment(board.comment))
            .expect("resolve");

        assert!(ctx.resolved);
        assert_eq!(ctx.comment_author_id, Some(board.author));
        assert_eq!(ctx.task_author_ids, Some(BTreeSet::from([board.author])));
        assert!(ctx.is_project_member);
        assert_eq!(ctx.project_role, Some(ProjectRole::Member));
        assert_eq!(ctx.team_role, None);
    }

    #[test]
    fn list_start_carries_no_authorship() {
        let board = board();
        let ctx = resolve_context(&board.source, board.actor, EntityRef::List(board.list))
            .expect("resolve");

        assert!(ctx.is_project_member);
        assert_eq!(ctx.task_author_ids, None);
        assert_eq!(ctx.comment_author_id, None);
    }

    #[test]
    fn label_start_resolves_its_project() {
        let mut board = board();
        let label = Uuid::new_v4();
        board.source.labels.insert(label, board.project);
        let ctx = resolve_context(&board.source, board.actor, EntityRef::Label(label))
            .expect("resolve");
        assert!(ctx.resolved);
        assert!(ctx.is_project_member);
    }

    #[test]
    fn team_start_does_not_look_at_projects() {
        let board = board();
        let ctx = resolve_context(&board.source, board.actor, EntityRef::Team(board.team))
            .expect("resolve");

        assert!(ctx.resolved);
        assert_eq!(ctx.team_role, Some(TeamRole::Member));
        assert!(!ctx.is_project_member);
        assert_eq!(ctx.project_role, None);
    }

    #[test]
    fn project_start_never_yields_team_role() {
        let board = board();
        let ctx = resolve_context(&board.source, board.actor, EntityRef::Project(board.project))
            .expect("resolve");
        assert_eq!(ctx.team_role, None);
        assert!(ctx.is_project_member);
    }

    #[test]
    fn missing_entities_resolve_to_no_relationship() {
        let board = board();
        for start in [
            EntityRef::Team(Uuid::new_v4()),
            EntityRef::Project(Uuid::new_v4()),
            EntityRef::List(Uuid::new_v4()),
            EntityRef::Label(Uuid::new_v4()),
            EntityRef::Task(Uuid::new_v4()),
            EntityRef::Comment(Uuid::new_v4()),
        ] {
            let ctx = resolve_context(&board.source, board.actor, start).expect("resolve");
            assert_eq!(ctx, PermissionContext::empty(board.actor), "start {start}");
        }
    }

    #[test]
    fn outsider_resolves_entity_without_membership() {
        let board = board();
        let outsider = Uuid::new_v4();
        let ctx = resolve_context(&board.source, outsider, EntityRef::Task(board.task))
            .expect("resolve");

        assert!(ctx.resolved);
        assert!(!ctx.is_project_member);
        assert_eq!(ctx.project_role, None);
        assert_eq!(ctx.task_author_ids, Some(BTreeSet::from([board.author])));
    }
}
