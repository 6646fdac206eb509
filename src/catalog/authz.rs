use rusqlite::Connection;

use crate::catalog::repository;
use crate::db::models::SparePart;

/// Who is acting on a record: the session's user and, if registered, the admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub admin_id: Option<i64>,
}

impl Actor {
    /// Resolve the admin account by its fixed email address.
    pub fn resolve(conn: &Connection, user_id: i64, admin_email: &str) -> rusqlite::Result<Self> {
        let admin_id = repository::find_user_by_email(conn, admin_email)?.map(|u| u.id);
        Ok(Self { user_id, admin_id })
    }

    pub fn is_admin(&self) -> bool {
        self.admin_id == Some(self.user_id)
    }

    /// A record may be changed by its owner or by the admin account.
    pub fn can_modify(&self, spare: &SparePart) -> bool {
        spare.user_id == self.user_id || self.is_admin()
    }
}
