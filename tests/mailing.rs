mod common;

use std::sync::Arc;

use sea_orm::EntityTrait;
use storefront_bot::{
    dto::mailings::CreateMailingRequest,
    entity::mailings::{Entity as Mailings, MailingStatus},
    error::AppError,
    services::mailing_service,
    telegram::ChatTransport,
};

use common::{FakeTransport, harness, seed_user};

#[tokio::test]
async fn draft_is_delivered_to_every_user() -> anyhow::Result<()> {
    let h = harness().await?;
    let db = &h.state.orm;
    seed_user(db, 1, "Ann").await?;
    seed_user(db, 2, "Bob").await?;

    let created = mailing_service::create(
        db,
        CreateMailingRequest {
            message_text: "  Spring sale!  ".into(),
            photo_url: Some(" ".into()),
        },
    )
    .await?;
    let draft = created.data.expect("mailing");
    assert_eq!(draft.status, MailingStatus::Draft);
    assert_eq!(draft.message_text, "Spring sale!");
    assert!(draft.photo_url.is_none());

    let model = Mailings::find_by_id(draft.id).one(db).await?.unwrap();
    let report = mailing_service::send_to_all(db, h.transport.as_ref(), model).await?;
    assert_eq!((report.total, report.succeeded, report.failed), (2, 2, 0));

    let recipients: Vec<i64> = h.transport.sent().iter().map(|m| m.chat_id).collect();
    assert_eq!(recipients, vec![1, 2]);

    let stored = Mailings::find_by_id(draft.id).one(db).await?.unwrap();
    assert_eq!(stored.status, MailingStatus::Sent);
    assert_eq!(stored.successful_sends, 2);
    Ok(())
}

#[tokio::test]
async fn mailing_fails_when_nobody_receives_it() -> anyhow::Result<()> {
    let h = harness().await?;
    let db = &h.state.orm;
    seed_user(db, 1, "Ann").await?;

    let draft = mailing_service::create(
        db,
        CreateMailingRequest {
            message_text: "Hello".into(),
            photo_url: None,
        },
    )
    .await?
    .data
    .expect("mailing");

    let blocked = FakeTransport {
        fail_sends: true,
        ..FakeTransport::default()
    };
    let model = Mailings::find_by_id(draft.id).one(db).await?.unwrap();
    let report = mailing_service::send_to_all(db, &blocked, model).await?;
    assert_eq!((report.succeeded, report.failed), (0, 1));

    let stored = Mailings::find_by_id(draft.id).one(db).await?.unwrap();
    assert_eq!(stored.status, MailingStatus::Failed);
    Ok(())
}

#[tokio::test]
async fn empty_text_is_rejected() -> anyhow::Result<()> {
    let h = harness().await?;
    let err = mailing_service::create(
        &h.state.orm,
        CreateMailingRequest {
            message_text: "   ".into(),
            photo_url: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn only_drafts_can_be_started() -> anyhow::Result<()> {
    let h = harness().await?;
    let db = &h.state.orm;
    let draft = mailing_service::create(
        db,
        CreateMailingRequest {
            message_text: "Hello".into(),
            photo_url: None,
        },
    )
    .await?
    .data
    .expect("mailing");

    let transport: Arc<dyn ChatTransport> = h.transport.clone();
    let started = mailing_service::start(db, transport.clone(), draft.id).await?;
    assert_eq!(started.data.expect("mailing").status, MailingStatus::Sending);

    let err = mailing_service::start(db, transport, draft.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    Ok(())
}
