//! Transactional unit of work.
//!
//! # Responsibility
//! - Open one IMMEDIATE transaction per mutation.
//! - Hand out repositories bound to that transaction.
//!
//! # Invariants
//! - Dropping an uncommitted unit of work rolls every write back.
//! - The write lock is taken at `begin`, so "read the current holder, then
//!   write" sequences cannot interleave with another writer.

use crate::repo::{
    CommentRepo, LabelRepo, ListRepo, ProjectRepo, RepoResult, TaskRepo, TeamRepo, UserRepo,
};
use rusqlite::{Connection, Transaction, TransactionBehavior};

pub struct UnitOfWork<'conn> {
    tx: Transaction<'conn>,
}

impl<'conn> UnitOfWork<'conn> {
    /// Starts a transaction on `conn`.
    ///
    /// Fails with a busy error when another connection holds the write lock
    /// for longer than the connection's busy timeout.
    pub fn begin(conn: &'conn Connection) -> RepoResult<Self> {
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        Ok(Self { tx })
    }

    pub fn commit(self) -> RepoResult<()> {
        self.tx.commit()?;
        Ok(())
    }

    pub fn rollback(self) -> RepoResult<()> {
        self.tx.rollback()?;
        Ok(())
    }

    pub fn conn(&self) -> &Connection {
        &self.tx
    }

    pub fn users(&self) -> UserRepo<'_> {
        UserRepo::new(&self.tx)
    }

    pub fn teams(&self) -> TeamRepo<'_> {
        TeamRepo::new(&self.tx)
    }

    pub fn projects(&self) -> ProjectRepo<'_> {
        ProjectRepo::new(&self.tx)
    }

    pub fn lists(&self) -> ListRepo<'_> {
        ListRepo::new(&self.tx)
    }

    pub fn tasks(&self) -> TaskRepo<'_> {
        TaskRepo::new(&self.tx)
    }

    pub fn comments(&self) -> CommentRepo<'_> {
        CommentRepo::new(&self.tx)
    }

    pub fn labels(&self) -> LabelRepo<'_> {
        LabelRepo::new(&self.tx)
    }
}
