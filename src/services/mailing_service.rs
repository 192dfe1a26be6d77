use std::{sync::Arc, time::Duration};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryOrder, QuerySelect,
    Set, TransactionTrait, sea_query::LockType,
};
use uuid::Uuid;

use crate::{
    dto::mailings::CreateMailingRequest,
    entity::{
        mailings::{ActiveModel as MailingActive, Entity as Mailings, MailingStatus, Model as MailingModel},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    models::Mailing,
    response::{ApiResponse, Meta},
    telegram::ChatTransport,
};

/// Pause between recipients to stay under the Bot API rate limits.
pub const SEND_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MailingReport {
    pub total: i32,
    pub succeeded: i32,
    pub failed: i32,
}

impl MailingReport {
    pub fn final_status(&self) -> MailingStatus {
        if self.succeeded > 0 {
            MailingStatus::Sent
        } else {
            MailingStatus::Failed
        }
    }
}

pub async fn create(
    db: &DatabaseConnection,
    payload: CreateMailingRequest,
) -> AppResult<ApiResponse<Mailing>> {
    let message_text = payload.message_text.trim();
    if message_text.is_empty() {
        return Err(AppError::Validation("message_text must not be empty".into()));
    }

    let mailing = MailingActive {
        id: Set(Uuid::new_v4()),
        message_text: Set(message_text.to_string()),
        photo_url: Set(payload.photo_url.filter(|url| !url.trim().is_empty())),
        status: Set(MailingStatus::Draft),
        created_at: Set(Utc::now().into()),
        sent_at: Set(None),
        total_users: Set(0),
        successful_sends: Set(0),
        failed_sends: Set(0),
    }
    .insert(db)
    .await?;

    Ok(ApiResponse::success(
        "Mailing created",
        mailing_from_entity(mailing),
        Some(Meta::empty()),
    ))
}

/// Moves a draft to `sending` and fans it out in the background.
pub async fn start(
    db: &DatabaseConnection,
    transport: Arc<dyn ChatTransport>,
    mailing_id: Uuid,
) -> AppResult<ApiResponse<Mailing>> {
    let txn = db.begin().await?;
    let mailing = Mailings::find_by_id(mailing_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if mailing.status != MailingStatus::Draft {
        txn.rollback().await?;
        return Err(AppError::Validation(
            "only draft mailings can be started".into(),
        ));
    }

    let mut active = mailing.into_active_model();
    active.status = Set(MailingStatus::Sending);
    active.sent_at = Set(Some(Utc::now().into()));
    let mailing = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(%mailing_id, "mailing started");

    let task_db = db.clone();
    let task_mailing = mailing.clone();
    tokio::spawn(async move {
        if let Err(err) = send_to_all(&task_db, transport.as_ref(), task_mailing).await {
            tracing::error!(%mailing_id, error = %err, "mailing aborted");
        }
    });

    Ok(ApiResponse::success(
        "Mailing started",
        mailing_from_entity(mailing),
        Some(Meta::empty()),
    ))
}

/// Sends the mailing to every known user and stores the final tally.
pub async fn send_to_all(
    db: &DatabaseConnection,
    transport: &dyn ChatTransport,
    mailing: MailingModel,
) -> AppResult<MailingReport> {
    let recipients: Vec<i64> = Users::find()
        .select_only()
        .column(UserCol::Id)
        .order_by_asc(UserCol::Id)
        .into_tuple()
        .all(db)
        .await?;

    let mut report = MailingReport {
        total: recipients.len() as i32,
        ..Default::default()
    };

    for (index, chat_id) in recipients.iter().copied().enumerate() {
        let sent = match mailing.photo_url.as_deref() {
            Some(photo) => transport
                .send_photo(chat_id, photo, &mailing.message_text, None)
                .await
                .map(|_| ()),
            None => transport
                .send_message(chat_id, &mailing.message_text, None)
                .await
                .map(|_| ()),
        };

        match sent {
            Ok(()) => report.succeeded += 1,
            Err(err) => {
                report.failed += 1;
                tracing::warn!(mailing_id = %mailing.id, chat_id, error = %err, "mailing delivery failed");
            }
        }

        if index + 1 < recipients.len() {
            tokio::time::sleep(SEND_INTERVAL).await;
        }
    }

    let mut active = mailing.into_active_model();
    active.status = Set(report.final_status());
    active.total_users = Set(report.total);
    active.successful_sends = Set(report.succeeded);
    active.failed_sends = Set(report.failed);
    let mailing = active.update(db).await?;

    tracing::info!(
        mailing_id = %mailing.id,
        total = report.total,
        succeeded = report.succeeded,
        failed = report.failed,
        "mailing finished"
    );
    Ok(report)
}

pub(crate) fn mailing_from_entity(model: MailingModel) -> Mailing {
    Mailing {
        id: model.id,
        message_text: model.message_text,
        photo_url: model.photo_url,
        status: model.status,
        created_at: model.created_at.with_timezone(&Utc),
        sent_at: model.sent_at.map(|dt| dt.with_timezone(&Utc)),
        total_users: model.total_users,
        successful_sends: model.successful_sends,
        failed_sends: model.failed_sends,
    }
}
