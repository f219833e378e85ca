//! Services Layer
//!
//! This module contains pure business logic extracted from HTTP handlers.
//! Every function takes the connection explicitly and returns `DomainError`.

pub mod engagement_service;
pub mod follow_service;
pub mod message_service;
pub mod post_service;
pub mod upload_service;
pub mod user_service;

use std::collections::HashMap;

use sea_orm::sea_query::{Expr, LikeExpr, SimpleExpr};
use sea_orm::*;

use crate::domain::DomainError;
use crate::models::user::{self, Entity as User, UserSummary};

/// Row counts grouped by a string key column, restricted to `keys`.
/// Keys with no rows are absent from the map.
pub(crate) async fn count_grouped<E>(
    db: &DatabaseConnection,
    column: E::Column,
    keys: &[String],
) -> Result<HashMap<String, i64>, DbErr>
where
    E: EntityTrait,
{
    if keys.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(String, i64)> = E::find()
        .select_only()
        .column(column)
        .column_as(column.count(), "count")
        .filter(column.is_in(keys.iter().cloned()))
        .group_by(column)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows.into_iter().collect())
}

/// Substring match where `%`, `_` and `\` in `query` are taken literally.
/// SQLite's LIKE already ignores ASCII case.
pub(crate) fn contains_literal<C: ColumnTrait + 'static>(column: C, query: &str) -> SimpleExpr {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    Expr::col((column.entity_name(), column))
        .like(LikeExpr::new(format!("%{}%", escaped)).escape('\\'))
}

/// Load author cards for a batch of user ids.
pub(crate) async fn summaries_by_id(
    db: &DatabaseConnection,
    ids: &[String],
) -> Result<HashMap<String, UserSummary>, DomainError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = User::find()
        .filter(user::Column::Id.is_in(ids.iter().cloned()))
        .all(db)
        .await?;

    Ok(users
        .into_iter()
        .map(|u| (u.id.clone(), UserSummary::from(u)))
        .collect())
}

/// Fetch a user or fail with the given not-found message.
pub(crate) async fn require_user(
    db: &DatabaseConnection,
    id: &str,
    not_found: &str,
) -> Result<user::Model, DomainError> {
    User::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| DomainError::NotFound(not_found.to_string()))
}
