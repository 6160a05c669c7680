//! ComponentService tests: ownership, pagination, refinement

use pretty_assertions::assert_eq;
use sketchui_core::{
    ComponentId, ComponentPatch, ComponentRepository, ComponentService, InMemoryComponentRepository,
    NewComponent, PersistedComponent, ServiceError, SynthesisConfig,
};
use sketchui_gateway::{CancellationToken, MessageContent, Role};
use sketchui_store::OwnerId;
use sketchui_test_utils::ScriptedGateway;
use std::sync::Arc;

const ALICE: OwnerId = OwnerId(1);
const BOB: OwnerId = OwnerId(2);

struct Harness {
    service: ComponentService,
    gateway: Arc<ScriptedGateway>,
    repository: Arc<InMemoryComponentRepository>,
}

fn harness(gateway: ScriptedGateway) -> Harness {
    let gateway = Arc::new(gateway);
    let repository = Arc::new(InMemoryComponentRepository::new());
    let service = ComponentService::new(repository.clone(), gateway.clone(), SynthesisConfig::default());
    Harness {
        service,
        gateway,
        repository,
    }
}

async fn seed(repository: &InMemoryComponentRepository, owner: OwnerId, title: &str) -> PersistedComponent {
    repository
        .create(NewComponent {
            title: title.to_string(),
            kind: "button".to_string(),
            code: "<button class=\"bg-gray-500\">Click</button>".to_string(),
            is_public: false,
            owner_id: owner,
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn owner_can_read_own_component() {
    let h = harness(ScriptedGateway::new());
    let row = seed(&h.repository, ALICE, "Mine").await;

    assert_eq!(h.service.get_owned(ALICE, row.id).await.unwrap(), row);
}

#[tokio::test]
async fn other_owner_is_forbidden() {
    let h = harness(ScriptedGateway::new());
    let row = seed(&h.repository, ALICE, "Mine").await;

    let err = h.service.get_owned(BOB, row.id).await.unwrap_err();
    assert_eq!(err.status_code(), 403);

    let err = h
        .service
        .update(BOB, row.id, ComponentPatch {
            title: Some("Stolen".to_string()),
            ..ComponentPatch::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Authorization(_)));
    assert_eq!(h.repository.get(row.id).await.unwrap().title, "Mine");

    let err = h.service.archive(BOB, row.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Authorization(_)));
}

#[tokio::test]
async fn missing_component_is_not_found() {
    let h = harness(ScriptedGateway::new());

    let err = h.service.get_owned(ALICE, ComponentId(99)).await.unwrap_err();

    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn update_applies_only_non_empty_fields() {
    let h = harness(ScriptedGateway::new());
    let row = seed(&h.repository, ALICE, "Old").await;

    let updated = h
        .service
        .update(ALICE, row.id, ComponentPatch {
            title: Some("New".to_string()),
            kind: Some(String::new()),
            code: None,
            is_public: Some(true),
        })
        .await
        .unwrap();

    assert_eq!(updated.title, "New");
    assert_eq!(updated.kind, row.kind);
    assert_eq!(updated.code, row.code);
    assert!(updated.is_public);
}

#[tokio::test]
async fn update_rejects_overlong_title() {
    let h = harness(ScriptedGateway::new());
    let row = seed(&h.repository, ALICE, "Old").await;

    let err = h
        .service
        .update(ALICE, row.id, ComponentPatch {
            title: Some("x".repeat(21)),
            ..ComponentPatch::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn archive_twice_reports_not_found() {
    let h = harness(ScriptedGateway::new());
    let row = seed(&h.repository, ALICE, "Temp").await;

    h.service.archive(ALICE, row.id).await.unwrap();
    let err = h.service.archive(ALICE, row.id).await.unwrap_err();

    assert!(matches!(err, ServiceError::NotFound(_)));
    let page = h.service.list(ALICE, 10, 0).await.unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn list_pages_newest_first() {
    let h = harness(ScriptedGateway::new());
    for i in 0..12 {
        seed(&h.repository, ALICE, &format!("c{i}")).await;
    }
    seed(&h.repository, BOB, "other").await;

    let first = h.service.list(ALICE, 0, 0).await.unwrap();
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.items[0].title, "c11");
    assert_eq!((first.total, first.next_offset, first.remaining), (12, 10, 2));

    let second = h.service.list(ALICE, 10, first.next_offset).await.unwrap();
    let titles: Vec<&str> = second.items.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["c1", "c0"]);
    assert_eq!(second.remaining, 0);
}

#[tokio::test]
async fn list_past_the_end_has_nothing_remaining() {
    let h = harness(ScriptedGateway::new());
    seed(&h.repository, ALICE, "only").await;

    let page = h.service.list(ALICE, 5, 50).await.unwrap();

    assert!(page.items.is_empty());
    assert_eq!((page.total, page.next_offset, page.remaining), (1, 50, 0));
}

#[tokio::test]
async fn list_rejects_oversized_page() {
    let h = harness(ScriptedGateway::new());

    let err = h.service.list(ALICE, 21, 0).await.unwrap_err();

    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn list_public_spans_owners() {
    let h = harness(ScriptedGateway::new());
    let a = seed(&h.repository, ALICE, "a").await;
    let b = seed(&h.repository, BOB, "b").await;
    seed(&h.repository, BOB, "private").await;
    for (owner, id) in [(ALICE, a.id), (BOB, b.id)] {
        h.service
            .update(owner, id, ComponentPatch {
                is_public: Some(true),
                ..ComponentPatch::default()
            })
            .await
            .unwrap();
    }

    let public: Vec<ComponentId> = h
        .service
        .list_public()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();

    assert_eq!(public, vec![b.id, a.id]);
}

#[tokio::test]
async fn refine_writes_model_update() {
    let h = harness(ScriptedGateway::replying(
        "```json\n{\"component\":{\"title\":\"Blue button\",\"type\":\"button\",\"code\":\"<button class=\\\"bg-blue-500 rounded\\\">Click</button>\"}}\n```",
    ));
    let row = seed(&h.repository, ALICE, "Button").await;

    let updated = h
        .service
        .refine(ALICE, row.id, "Make it blue with rounded corners", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(updated.title, "Blue button");
    assert_eq!(updated.code, "<button class=\"bg-blue-500 rounded\">Click</button>");
    assert_eq!(h.repository.get(row.id).await.unwrap(), updated);

    let calls = h.gateway.calls();
    assert_eq!(calls[0][0].role, Role::System);
    let MessageContent::Text(prompt) = &calls[0][1].content else {
        panic!("expected a text-only user message");
    };
    assert!(prompt.starts_with("Make it blue with rounded corners"));
    assert!(prompt.contains("bg-gray-500"));
}

#[tokio::test]
async fn refine_decline_leaves_component_untouched() {
    let h = harness(ScriptedGateway::replying(r#"{"failure_response":"cannot add animations"}"#));
    let row = seed(&h.repository, ALICE, "Button").await;

    let err = h
        .service
        .refine(ALICE, row.id, "Animate it", &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "cannot add animations");
    assert_eq!(h.repository.get(row.id).await.unwrap(), row);
}

#[tokio::test]
async fn refine_garbage_is_extraction_error() {
    let h = harness(ScriptedGateway::replying("Sure! Here you go."));
    let row = seed(&h.repository, ALICE, "Button").await;

    let err = h
        .service
        .refine(ALICE, row.id, "Make it red", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Extraction(_)));
}

#[tokio::test]
async fn refine_checks_ownership_before_calling_gateway() {
    let h = harness(ScriptedGateway::replying(r#"{"component":{"title":"x","type":"y","code":"z"}}"#));
    let row = seed(&h.repository, ALICE, "Button").await;

    let err = h
        .service
        .refine(BOB, row.id, "Make it red", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Authorization(_)));
    assert_eq!(h.gateway.call_count(), 0);
}

#[tokio::test]
async fn refine_rejects_blank_instruction() {
    let h = harness(ScriptedGateway::new());
    let row = seed(&h.repository, ALICE, "Button").await;

    let err = h
        .service
        .refine(ALICE, row.id, "  ", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(h.gateway.call_count(), 0);
}
