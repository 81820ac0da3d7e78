mod common;

use anyhow::Result;
use axum::http::Method;

use caseboard::confirm::DeleteConfirmation;
use caseboard::entities::{Agency, AgencyForm, Caregiver, CaregiverForm};
use caseboard::{ApiError, Operation};

#[tokio::test]
async fn create_invalidates_and_next_refresh_refetches() -> Result<()> {
    let server = common::spawn_server(common::roster()).await?;
    let session = server.session()?;
    let mut agencies = session.feature::<Agency>();

    agencies.refresh().await?;
    let key = agencies.query.key()?;
    assert!(!session.cache().is_stale(&key));

    let created = agencies
        .mutations
        .create(&AgencyForm { name: "Lakeside".into() })
        .await?;
    assert_eq!(created.name, "Lakeside");
    assert!(created.created_at.is_some());
    assert!(session.cache().is_stale(&key));
    assert!(!agencies.mutations.is_pending(Operation::Create));

    agencies.refresh().await?;
    assert_eq!(server.backend.seen_to(Method::GET, "agencies").len(), 2);
    assert!(agencies
        .bridge
        .table()
        .rows()
        .iter()
        .any(|a| a.id == created.id));
    Ok(())
}

#[tokio::test]
async fn invalid_form_never_reaches_the_server() -> Result<()> {
    let server = common::spawn_server(common::roster()).await?;
    let session = server.session()?;
    let caregivers = session.feature::<Caregiver>();

    let form = CaregiverForm {
        name: "Rosa".into(),
        email: Some("not-an-email".into()),
        ..CaregiverForm::default()
    };
    let err = caregivers.mutations.create(&form).await.unwrap_err();

    assert!(matches!(err, ApiError::ValidationError { .. }));
    assert_eq!(err.field_errors().unwrap()["email"], "Invalid email.");
    assert!(server.backend.seen().is_empty());
    Ok(())
}

#[tokio::test]
async fn update_of_missing_row_keeps_cache() -> Result<()> {
    let server = common::spawn_server(common::roster()).await?;
    let session = server.session()?;
    let mut agencies = session.feature::<Agency>();
    agencies.refresh().await?;

    let err = agencies
        .mutations
        .update(999, &AgencyForm { name: "Ghost".into() })
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(404));
    assert!(!session.cache().is_stale(&agencies.query.key()?));
    Ok(())
}

#[tokio::test]
async fn delete_requires_typed_name() -> Result<()> {
    let server = common::spawn_server(common::roster()).await?;
    let session = server.session()?;
    let mut caregivers = session.feature::<Caregiver>();
    caregivers.refresh().await?;

    let sam = caregivers
        .bridge
        .table()
        .rows()
        .iter()
        .find(|c| c.name == "Sam")
        .cloned()
        .expect("seeded caregiver");
    let mut confirmation = DeleteConfirmation::for_record(&sam);

    confirmation.input("sam");
    let err = caregivers
        .mutations
        .remove_confirmed(&confirmation)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::ConfirmationMismatch { .. }));
    assert!(server.backend.seen_to(Method::DELETE, "caregivers/2").is_empty());

    confirmation.input(" Sam ");
    caregivers.mutations.remove_confirmed(&confirmation).await?;
    assert_eq!(server.backend.seen_to(Method::DELETE, "caregivers/2").len(), 1);
    assert!(session.cache().is_stale(&caregivers.query.key()?));

    caregivers.refresh().await?;
    assert!(caregivers.bridge.table().rows().iter().all(|c| c.id != 2));
    Ok(())
}

#[tokio::test]
async fn confirmation_for_other_entity_is_rejected() -> Result<()> {
    let server = common::spawn_server(common::roster()).await?;
    let session = server.session()?;
    let mut agencies = session.feature::<Agency>();
    let caregivers = session.feature::<Caregiver>();
    agencies.refresh().await?;

    let agency = agencies.bridge.table().rows()[0].clone();
    let mut confirmation = DeleteConfirmation::for_record(&agency);
    confirmation.input(agency.name.clone());

    let err = caregivers
        .mutations
        .remove_confirmed(&confirmation)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(400));
    assert!(server.backend.seen_to(Method::DELETE, "caregivers/1").is_empty());
    Ok(())
}
