//! Group and membership repository.

use chrono::Utc;

use lms_core::entities::{Group, GroupMember};
use lms_core::responses::GroupMemberWithUser;

use crate::error::DatabaseError;
use crate::helpers::{SetClause, collect_rows, first_row, get_opt_string, parse_datetime};
use crate::inputs::{NewGroup, NewGroupMember};
use crate::repos::user::{qualified_cols as user_cols, row_to_user_at};
use crate::service::LmsService;
use crate::updates::group::GroupUpdate;

const GROUP_COLS: &str = "id, name, description, created_at";
const MEMBER_COLS: &str = "id, group_id, user_id, added_at";

fn row_to_group(row: &libsql::Row) -> Result<Group, DatabaseError> {
    Ok(Group {
        id: row.get(0)?,
        name: row.get(1)?,
        description: get_opt_string(row, 2)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
    })
}

fn row_to_member(row: &libsql::Row) -> Result<GroupMember, DatabaseError> {
    Ok(GroupMember {
        id: row.get(0)?,
        group_id: row.get(1)?,
        user_id: row.get(2)?,
        added_at: parse_datetime(&row.get::<String>(3)?)?,
    })
}

impl LmsService {
    pub async fn create_group(&self, new: &NewGroup) -> Result<Group, DatabaseError> {
        new.validate()?;
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "INSERT INTO user_groups (name, description, created_at) VALUES (?1, ?2, ?3)
                     RETURNING {GROUP_COLS}"
                ),
                libsql::params![
                    new.name.trim(),
                    new.description.as_deref(),
                    Utc::now().to_rfc3339()
                ],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_group(&row)
    }

    pub async fn get_group(&self, id: i64) -> Result<Group, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {GROUP_COLS} FROM user_groups WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_group(&row)
    }

    pub async fn list_groups(&self) -> Result<Vec<Group>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(&format!("SELECT {GROUP_COLS} FROM user_groups ORDER BY name, id"), ())
            .await?;
        collect_rows(rows, row_to_group).await
    }

    pub async fn update_group(&self, id: i64, update: GroupUpdate) -> Result<Group, DatabaseError> {
        let mut set = SetClause::new();
        if let Some(name) = update.name {
            set.push("name", name.trim().to_string());
        }
        if let Some(description) = update.description {
            set.push_nullable("description", description);
        }
        if set.is_empty() {
            return self.get_group(id).await;
        }

        let (sql, params) = set.into_update("user_groups", id);
        let affected = self
            .db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.get_group(id).await
    }

    /// Delete a group with its memberships and grants.
    pub async fn delete_group(&self, id: i64) -> Result<(), DatabaseError> {
        self.delete_by_id("user_groups", id).await
    }

    /// Add a user to a group. Both must exist; adding twice is a `Conflict`.
    pub async fn add_group_member(&self, new: &NewGroupMember) -> Result<GroupMember, DatabaseError> {
        self.get_group(new.group_id).await?;
        self.get_user(new.user_id).await?;

        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "INSERT INTO group_members (group_id, user_id, added_at) VALUES (?1, ?2, ?3)
                     RETURNING {MEMBER_COLS}"
                ),
                libsql::params![new.group_id, new.user_id, Utc::now().to_rfc3339()],
            )
            .await
            .map_err(|e| DatabaseError::from(e).on_unique("User is already a member of this group"))?;
        let row = first_row(&mut rows, |e| e.on_unique("User is already a member of this group")).await?;
        let member = row_to_member(&row)?;
        tracing::debug!(group_id = new.group_id, user_id = new.user_id, "member added");
        Ok(member)
    }

    /// Members of a group with their accounts, in join order.
    pub async fn list_group_members_with_users(
        &self,
        group_id: i64,
    ) -> Result<Vec<GroupMemberWithUser>, DatabaseError> {
        let member_cols = MEMBER_COLS
            .split(", ")
            .map(|col| format!("gm.{col}"))
            .collect::<Vec<_>>()
            .join(", ");
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {member_cols}, {} FROM group_members gm JOIN users u ON u.id = gm.user_id
                     WHERE gm.group_id = ?1 ORDER BY gm.added_at, gm.id",
                    user_cols("u")
                ),
                [group_id],
            )
            .await?;
        collect_rows(rows, |row| {
            Ok(GroupMemberWithUser {
                member: row_to_member(row)?,
                user: row_to_user_at(row, 4)?,
            })
        })
        .await
    }

    pub async fn delete_group_member(&self, id: i64) -> Result<(), DatabaseError> {
        self.delete_by_id("group_members", id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{new_user, test_service};
    use lms_core::enums::Role;
    use pretty_assertions::assert_eq;

    fn group(name: &str) -> NewGroup {
        NewGroup {
            name: name.into(),
            description: None,
        }
    }

    #[tokio::test]
    async fn members_embed_users() {
        let svc = test_service().await;
        let sales = svc.create_group(&group("Sales")).await.unwrap();
        let ann = svc.create_user(&new_user("ann", Role::Employee)).await.unwrap();

        let member = svc
            .add_group_member(&NewGroupMember {
                group_id: sales.id,
                user_id: ann.id,
            })
            .await
            .unwrap();

        let members = svc.list_group_members_with_users(sales.id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].member, member);
        assert_eq!(members[0].user.username, "ann");

        svc.delete_group_member(member.id).await.unwrap();
        assert!(svc.list_group_members_with_users(sales.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_member_is_conflict() {
        let svc = test_service().await;
        let sales = svc.create_group(&group("Sales")).await.unwrap();
        let ann = svc.create_user(&new_user("ann", Role::Employee)).await.unwrap();
        let add = NewGroupMember {
            group_id: sales.id,
            user_id: ann.id,
        };

        svc.add_group_member(&add).await.unwrap();
        assert!(matches!(
            svc.add_group_member(&add).await,
            Err(DatabaseError::Conflict(ref m)) if m == "User is already a member of this group"
        ));
    }

    #[tokio::test]
    async fn unknown_group_or_user_is_no_result() {
        let svc = test_service().await;
        let sales = svc.create_group(&group("Sales")).await.unwrap();
        let ann = svc.create_user(&new_user("ann", Role::Employee)).await.unwrap();

        let missing_user = NewGroupMember {
            group_id: sales.id,
            user_id: 999,
        };
        let missing_group = NewGroupMember {
            group_id: 999,
            user_id: ann.id,
        };
        assert!(matches!(svc.add_group_member(&missing_user).await, Err(DatabaseError::NoResult)));
        assert!(matches!(svc.add_group_member(&missing_group).await, Err(DatabaseError::NoResult)));
    }

    #[tokio::test]
    async fn group_update_and_delete() {
        let svc = test_service().await;
        let g = svc.create_group(&group("Ops")).await.unwrap();
        let updated = svc
            .update_group(
                g.id,
                GroupUpdate {
                    description: Some(Some("Operations".into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.description.as_deref(), Some("Operations"));

        svc.delete_group(g.id).await.unwrap();
        assert!(svc.list_groups().await.unwrap().is_empty());
        assert!(matches!(svc.delete_group(g.id).await, Err(DatabaseError::NoResult)));
    }
}
