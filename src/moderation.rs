use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::api::{ApiClient, ApiError};
use crate::models::{Application, Internship, ModerationStatus, User};

/// One reviewable collection: which endpoints decide its rows and whether a
/// rejection must carry a reason. Admin queues let the reason stay empty;
/// the employer review of applications does not.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ModerationTarget {
    base: &'static str,
    reason_required: bool,
}

impl ModerationTarget {
    pub fn admin_users() -> Self {
        Self {
            base: "/admin/users",
            reason_required: false,
        }
    }

    pub fn admin_internships() -> Self {
        Self {
            base: "/admin/internships",
            reason_required: false,
        }
    }

    pub fn admin_applications() -> Self {
        Self {
            base: "/admin/applications",
            reason_required: false,
        }
    }

    pub fn employer_applications() -> Self {
        Self {
            base: "/employer/applications",
            reason_required: true,
        }
    }

    fn approve_path(&self, id: i64) -> String {
        format!("{}/{id}/approve", self.base)
    }

    fn reject_path(&self, id: i64) -> String {
        format!("{}/{id}/reject", self.base)
    }
}

/// A record that can be taken through the pending/approved/rejected
/// lifecycle. A missing status counts as pending; the backend only stamps
/// rows once a decision exists.
pub trait Moderated {
    fn id(&self) -> i64;
    fn status(&self) -> ModerationStatus;
    fn set_status(&mut self, status: ModerationStatus);
    fn set_rejection_reason(&mut self, reason: Option<String>);
}

impl Moderated for Internship {
    fn id(&self) -> i64 {
        self.id
    }

    fn status(&self) -> ModerationStatus {
        self.status.unwrap_or(ModerationStatus::Pending)
    }

    fn set_status(&mut self, status: ModerationStatus) {
        self.status = Some(status);
    }

    fn set_rejection_reason(&mut self, reason: Option<String>) {
        self.rejection_reason = reason;
    }
}

impl Moderated for Application {
    fn id(&self) -> i64 {
        self.id
    }

    fn status(&self) -> ModerationStatus {
        self.status.unwrap_or(ModerationStatus::Pending)
    }

    fn set_status(&mut self, status: ModerationStatus) {
        self.status = Some(status);
    }

    fn set_rejection_reason(&mut self, reason: Option<String>) {
        self.rejection_reason = reason;
    }
}

impl Moderated for User {
    fn id(&self) -> i64 {
        self.id
    }

    fn status(&self) -> ModerationStatus {
        self.status.unwrap_or(ModerationStatus::Pending)
    }

    fn set_status(&mut self, status: ModerationStatus) {
        self.status = Some(status);
    }

    fn set_rejection_reason(&mut self, _reason: Option<String>) {
        // Accounts carry no stored reason; it only travels in the request.
    }
}

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("no row with id {0}")]
    UnknownRow(i64),

    #[error("row {0} already has a decision in flight")]
    RowBusy(i64),

    #[error("row {0} has already been decided")]
    AlreadyDecided(i64),

    #[error("a rejection reason is required")]
    ReasonRequired,

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Serialize)]
struct RejectRequest<'a> {
    reason: &'a str,
}

/// In-memory review queue over one moderation target. Holds the loaded
/// rows, tracks which of them have a decision in flight, and mirrors the
/// server's verdict into the row once the call succeeds. A failed call
/// leaves the row exactly as it was.
pub struct ModerationQueue<T: Moderated> {
    client: ApiClient,
    target: ModerationTarget,
    rows: Vec<T>,
    busy: HashSet<i64>,
}

impl<T: Moderated> ModerationQueue<T> {
    pub fn new(client: ApiClient, target: ModerationTarget, rows: Vec<T>) -> Self {
        Self {
            client,
            target,
            rows,
            busy: HashSet::new(),
        }
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn is_busy(&self, id: i64) -> bool {
        self.busy.contains(&id)
    }

    /// Approve one pending row. Exactly one request per call; a second
    /// decision on the same row is refused locally.
    pub async fn approve(&mut self, id: i64) -> Result<(), ModerationError> {
        let index = self.claim(id)?;
        let result = self
            .client
            .post_empty(&self.target.approve_path(id))
            .await;
        self.busy.remove(&id);

        result?;
        let row = &mut self.rows[index];
        row.set_status(ModerationStatus::Approved);
        // Approving a previously rejected row clears the stale reason.
        row.set_rejection_reason(None);
        info!(id, "approved");
        Ok(())
    }

    /// Reject one pending row. When the target demands a reason, a blank
    /// one is refused before any request is made; admin targets pass the
    /// reason through verbatim, empty included.
    pub async fn reject(&mut self, id: i64, reason: &str) -> Result<(), ModerationError> {
        if self.target.reason_required && reason.trim().is_empty() {
            return Err(ModerationError::ReasonRequired);
        }

        let index = self.claim(id)?;
        let result = self
            .client
            .post_json(&self.target.reject_path(id), &RejectRequest { reason })
            .await;
        self.busy.remove(&id);

        result?;
        let row = &mut self.rows[index];
        row.set_status(ModerationStatus::Rejected);
        row.set_rejection_reason(Some(reason.to_string()));
        info!(id, "rejected");
        Ok(())
    }

    /// Locate the row, refuse decided or in-flight rows, and mark it busy.
    fn claim(&mut self, id: i64) -> Result<usize, ModerationError> {
        let index = self
            .rows
            .iter()
            .position(|row| row.id() == id)
            .ok_or(ModerationError::UnknownRow(id))?;
        if self.rows[index].status().is_terminal() {
            return Err(ModerationError::AlreadyDecided(id));
        }
        if !self.busy.insert(id) {
            return Err(ModerationError::RowBusy(id));
        }
        Ok(index)
    }
}
