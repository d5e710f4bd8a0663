use std::sync::Arc;

use uuid::Uuid;

use mailwave_domain::campaign::{Campaign, CampaignStatus, RecipientSpec};
use mailwave_testing::fixture::Fixture;

use mailwave_dispatch::error::DispatchServiceError;
use mailwave_dispatch::jobs::{DISPATCH_JOB_KIND, DispatchJobHandler, DispatchJobPayload};
use mailwave_dispatch::queue::{JobHandler, JobRegistry};
use mailwave_dispatch::usecase::dispatch::{DispatchCampaignUseCase, DispatchGuard};

use crate::helpers::{
    MockCampaignStore, MockDirectory, MockTrackingStore, MockTransport, test_auth, test_campaign,
    test_contacts, test_settings,
};

fn usecase(
    store: MockCampaignStore,
    directory: MockDirectory,
    transport: MockTransport,
    tracking: MockTrackingStore,
) -> DispatchCampaignUseCase<MockCampaignStore, MockDirectory, MockTransport, MockTrackingStore> {
    DispatchCampaignUseCase {
        store,
        directory,
        transport,
        tracking,
        guard: DispatchGuard::default(),
        settings: test_settings(),
    }
}

// ── DispatchCampaignUseCase ──────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn should_account_for_every_recipient() {
    let contacts = test_contacts(25);
    let campaign = test_campaign(contacts.iter().map(|c| c.id).collect());
    let store = MockCampaignStore::new(vec![campaign.clone()]);
    let usecase = usecase(
        store,
        MockDirectory::with_contacts(contacts),
        MockTransport::reliable(),
        MockTrackingStore::reliable(),
    );

    let outcome = usecase.execute(campaign.id, &test_auth()).await.unwrap();

    assert_eq!(outcome.total_contacts, 25);
    assert_eq!(outcome.sent + outcome.failed, 25);
    assert_eq!(outcome.sent, 25);
    assert_eq!(outcome.delivered, 25);
}

#[tokio::test(start_paused = true)]
async fn should_isolate_single_recipient_failure() {
    let contacts = test_contacts(25);
    let campaign = test_campaign(contacts.iter().map(|c| c.id).collect());
    let unlucky = contacts[7].email.clone();
    let store = MockCampaignStore::new(vec![campaign.clone()]);
    let usecase = usecase(
        store.clone(),
        MockDirectory::with_contacts(contacts),
        MockTransport::failing_for([unlucky.clone()]),
        MockTrackingStore::reliable(),
    );

    let outcome = usecase.execute(campaign.id, &test_auth()).await.unwrap();

    assert_eq!(outcome.sent, 24);
    assert_eq!(outcome.failed, 1);

    let patches = store.patches_handle();
    let patches = patches.lock().unwrap();
    let (_, patch) = &patches[0];
    let error_log = patch.error_log.as_deref().unwrap();
    assert!(error_log.contains(&unlucky));
    assert!(error_log.contains("mailbox unavailable"));
}

#[tokio::test]
async fn should_persist_summary_for_empty_recipient_set() {
    let campaign = test_campaign(vec![]);
    let store = MockCampaignStore::new(vec![campaign.clone()]);
    let usecase = usecase(
        store.clone(),
        MockDirectory::default(),
        MockTransport::reliable(),
        MockTrackingStore::reliable(),
    );

    let outcome = usecase.execute(campaign.id, &test_auth()).await.unwrap();

    assert_eq!(outcome.total_contacts, 0);
    assert_eq!(outcome.sent, 0);
    assert_eq!(outcome.failed, 0);

    let patches = store.patches_handle();
    let patches = patches.lock().unwrap();
    assert_eq!(patches.len(), 1);
    let (_, patch) = &patches[0];
    // Nothing was sent, so the campaign stays re-dispatchable.
    assert_eq!(patch.status, CampaignStatus::Draft);
    assert_eq!(patch.send_summary.unwrap().total_sent, 0);
}

#[tokio::test(start_paused = true)]
async fn should_drive_dispatch_from_a_spawned_task() {
    let contacts = test_contacts(2);
    let campaign = test_campaign(contacts.iter().map(|c| c.id).collect());
    let store = MockCampaignStore::new(vec![campaign.clone()]);
    let usecase = usecase(
        store,
        MockDirectory::with_contacts(contacts),
        MockTransport::reliable(),
        MockTrackingStore::reliable(),
    );

    // The worker pool runs dispatches on spawned tasks; the whole pipeline
    // future has to move across threads.
    let handle = tokio::spawn(async move { usecase.execute(campaign.id, &test_auth()).await });
    let outcome = handle.await.unwrap().unwrap();
    assert_eq!(outcome.sent, 2);
}

#[tokio::test]
async fn should_fail_with_campaign_not_found() {
    let usecase = usecase(
        MockCampaignStore::empty(),
        MockDirectory::default(),
        MockTransport::reliable(),
        MockTrackingStore::reliable(),
    );

    let result = usecase.execute(Uuid::new_v4(), &test_auth()).await;
    assert!(matches!(result, Err(DispatchServiceError::CampaignNotFound)));
}

#[tokio::test(start_paused = true)]
async fn should_mark_campaign_sent_after_successful_run() {
    let contacts = test_contacts(3);
    let campaign = test_campaign(contacts.iter().map(|c| c.id).collect());
    let store = MockCampaignStore::new(vec![campaign.clone()]);
    let usecase = usecase(
        store.clone(),
        MockDirectory::with_contacts(contacts),
        MockTransport::reliable(),
        MockTrackingStore::reliable(),
    );

    usecase.execute(campaign.id, &test_auth()).await.unwrap();

    let patches = store.patches_handle();
    let patches = patches.lock().unwrap();
    let (patched_id, patch) = &patches[0];
    assert_eq!(*patched_id, campaign.id);
    assert_eq!(patch.status, CampaignStatus::Sent);
    assert!(patch.error_log.is_none());
}

#[tokio::test]
async fn should_reset_to_draft_on_infrastructure_failure() {
    let campaign = test_campaign(vec![Uuid::new_v4()]);
    let store = MockCampaignStore::new(vec![campaign.clone()]);
    let usecase = usecase(
        store.clone(),
        MockDirectory::failing(),
        MockTransport::reliable(),
        MockTrackingStore::reliable(),
    );

    let result = usecase.execute(campaign.id, &test_auth()).await;
    assert!(matches!(result, Err(DispatchServiceError::Internal(_))));

    let patches = store.patches_handle();
    let patches = patches.lock().unwrap();
    assert_eq!(patches.len(), 1);
    let (_, patch) = &patches[0];
    assert_eq!(patch.status, CampaignStatus::Draft);
    assert!(patch.send_summary.is_none());
    assert!(
        patch
            .error_log
            .as_deref()
            .unwrap()
            .contains("directory unreachable")
    );
}

#[tokio::test]
async fn should_reject_concurrent_dispatch_of_same_campaign() {
    let contacts = test_contacts(1);
    let campaign = test_campaign(contacts.iter().map(|c| c.id).collect());
    let store = MockCampaignStore::new(vec![campaign.clone()]);
    let usecase = usecase(
        store,
        MockDirectory::with_contacts(contacts),
        MockTransport::reliable(),
        MockTrackingStore::reliable(),
    );

    // Hold the permit as a running dispatch would.
    let _permit = usecase.guard.try_acquire(campaign.id).unwrap();

    let result = usecase.execute(campaign.id, &test_auth()).await;
    assert!(matches!(
        result,
        Err(DispatchServiceError::DispatchInProgress)
    ));
}

#[tokio::test]
async fn should_allow_dispatch_after_permit_release() {
    let contacts = test_contacts(1);
    let campaign = test_campaign(contacts.iter().map(|c| c.id).collect());
    let store = MockCampaignStore::new(vec![campaign.clone()]);
    let usecase = usecase(
        store,
        MockDirectory::with_contacts(contacts),
        MockTransport::reliable(),
        MockTrackingStore::reliable(),
    );

    drop(usecase.guard.try_acquire(campaign.id).unwrap());
    assert!(usecase.execute(campaign.id, &test_auth()).await.is_ok());
}

#[test]
fn should_accept_content_store_payload_shape() {
    let value = Fixture::load("fixtures/campaign.json");
    let campaign: Campaign = serde_json::from_value(value).unwrap();
    assert!(matches!(
        campaign.recipients,
        RecipientSpec::Segments { ref segments } if segments.len() == 2
    ));
    assert_eq!(campaign.status, CampaignStatus::Draft);
    assert_eq!(
        campaign.preview_text.as_deref(),
        Some("The spring collection is here")
    );
}

// ── DispatchJobHandler ───────────────────────────────────────────────────────

#[derive(Clone)]
struct MockTokenIssuer;

impl mailwave_dispatch::domain::repository::TokenIssuer for MockTokenIssuer {
    async fn issue(
        &self,
    ) -> Result<mailwave_dispatch::domain::types::AuthContext, DispatchServiceError> {
        Ok(mailwave_dispatch::domain::types::AuthContext::new(
            "service-token",
        ))
    }
}

#[tokio::test(start_paused = true)]
async fn should_run_queued_dispatch_with_service_token() {
    let contacts = test_contacts(2);
    let campaign = test_campaign(contacts.iter().map(|c| c.id).collect());
    let store = MockCampaignStore::new(vec![campaign.clone()]);
    let handler = DispatchJobHandler {
        usecase: usecase(
            store.clone(),
            MockDirectory::with_contacts(contacts),
            MockTransport::reliable(),
            MockTrackingStore::reliable(),
        ),
        token_issuer: MockTokenIssuer,
    };

    let payload = serde_json::to_value(DispatchJobPayload {
        campaign_id: campaign.id,
        auth: None,
    })
    .unwrap();
    handler.run(payload).await.unwrap();

    let patches = store.patches_handle();
    assert_eq!(patches.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_treat_vanished_campaign_as_terminal() {
    let handler = DispatchJobHandler {
        usecase: usecase(
            MockCampaignStore::empty(),
            MockDirectory::default(),
            MockTransport::reliable(),
            MockTrackingStore::reliable(),
        ),
        token_issuer: MockTokenIssuer,
    };

    let payload = serde_json::to_value(DispatchJobPayload {
        campaign_id: Uuid::new_v4(),
        auth: Some("caller-token".to_owned()),
    })
    .unwrap();

    // Must not surface as an error, a retry cannot make the campaign appear.
    assert!(handler.run(payload).await.is_ok());
}

#[tokio::test]
async fn should_surface_infrastructure_failure_for_retry() {
    let campaign = test_campaign(vec![Uuid::new_v4()]);
    let handler = DispatchJobHandler {
        usecase: usecase(
            MockCampaignStore::new(vec![campaign.clone()]),
            MockDirectory::failing(),
            MockTransport::reliable(),
            MockTrackingStore::reliable(),
        ),
        token_issuer: MockTokenIssuer,
    };

    let payload = serde_json::to_value(DispatchJobPayload {
        campaign_id: campaign.id,
        auth: Some("caller-token".to_owned()),
    })
    .unwrap();

    assert!(handler.run(payload).await.is_err());
}

#[tokio::test]
async fn should_resolve_dispatch_handler_from_registry() {
    let mut registry = JobRegistry::new();
    registry.register(
        DISPATCH_JOB_KIND,
        Arc::new(DispatchJobHandler {
            usecase: usecase(
                MockCampaignStore::empty(),
                MockDirectory::default(),
                MockTransport::reliable(),
                MockTrackingStore::reliable(),
            ),
            token_issuer: MockTokenIssuer,
        }),
    );
    assert!(registry.get(DISPATCH_JOB_KIND).is_some());
}
