use chrono::{DateTime, Duration, FixedOffset, Utc};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel, Set};

use crate::{
    entity::users::{ActiveModel as UserActive, Entity as Users, Model as UserModel},
    error::AppResult,
    telegram::User,
};

/// Stored names are refreshed from Telegram at most this often.
pub fn refresh_interval() -> Duration {
    Duration::days(1)
}

fn is_stale(updated_at: DateTime<FixedOffset>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(updated_at) > refresh_interval()
}

/// Makes sure the Telegram sender has a row and returns it.
pub async fn upsert<C>(db: &C, sender: &User) -> AppResult<UserModel>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let Some(existing) = Users::find_by_id(sender.id).one(db).await? else {
        let user = UserActive {
            id: Set(sender.id),
            first_name: Set(Some(sender.first_name.clone())),
            last_name: Set(sender.last_name.clone()),
            username: Set(sender.username.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(db)
        .await?;
        tracing::info!(user_id = user.id, "new telegram user");
        return Ok(user);
    };

    if !is_stale(existing.updated_at, now) {
        return Ok(existing);
    }

    let mut active = existing.into_active_model();
    active.first_name = Set(Some(sender.first_name.clone()));
    active.last_name = Set(sender.last_name.clone());
    active.username = Set(sender.username.clone());
    active.updated_at = Set(now.into());
    Ok(active.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_refresh_only_after_a_day() {
        let now = Utc::now();
        assert!(!is_stale((now - Duration::hours(23)).into(), now));
        assert!(is_stale((now - Duration::hours(25)).into(), now));
    }
}
