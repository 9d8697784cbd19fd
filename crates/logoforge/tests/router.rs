//! Router single-flight behavior against gated and scripted backends.

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use logoforge::contract::Category;
use logoforge::router::{
    Invocation, LabAgent, LabArguments, Rejection, RenderView, Router, RouterState,
    UNAVAILABLE_MESSAGE,
};
use logoforge::BackendError;

use common::{layer, text, GatedBackend, Reply, ScriptedBackend};

fn domains() -> String {
    json!([
        { "domain": "nova.tech", "availabilitySim": "Available", "reasoning": "exact match" },
        { "domain": "novalabs.io", "availabilitySim": "Taken", "reasoning": "registered" }
    ])
    .to_string()
}

async fn wait_until_pending(router: &Router) {
    for _ in 0..100 {
        if router.state() != RouterState::Idle {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("router never became pending");
}

#[tokio::test]
async fn test_second_invocation_rejected_while_pending() {
    let backend = GatedBackend::new(Ok(text(domains())));
    let router = Arc::new(Router::new(layer(backend.clone())));

    let first = tokio::spawn({
        let router = router.clone();
        async move {
            router
                .invoke("domain", LabArguments::new("Nova", Category::Tech))
                .await
        }
    });
    wait_until_pending(&router).await;
    assert_eq!(router.state(), RouterState::Pending(LabAgent::Domain));

    let second = router
        .invoke("pitch", LabArguments::new("Nova", Category::Tech))
        .await;
    assert_eq!(
        second,
        Invocation::Rejected(Rejection::Busy {
            pending: LabAgent::Domain
        })
    );
    assert_eq!(router.state(), RouterState::Pending(LabAgent::Domain));
    assert_eq!(backend.started(), 1);

    backend.release();
    let first = first.await.unwrap();
    let Invocation::Completed(RenderView::Cards { cards }) = first else {
        panic!("expected cards, got {:?}", first);
    };
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].key, "nova.tech");
    assert_eq!(router.state(), RouterState::Idle);

    backend.release();
    let third = router
        .invoke("domain", LabArguments::new("Nova", Category::Tech))
        .await;
    assert!(matches!(third, Invocation::Completed(_)));
    assert_eq!(backend.started(), 2);
}

#[tokio::test]
async fn test_cancelled_invocation_clears_pending() {
    let backend = GatedBackend::new(Ok(text("never")));
    let router = Arc::new(Router::new(layer(backend.clone())));

    let task = tokio::spawn({
        let router = router.clone();
        async move {
            router
                .invoke("pitch", LabArguments::new("Nova", Category::Tech))
                .await
        }
    });
    wait_until_pending(&router).await;

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());
    assert_eq!(router.state(), RouterState::Idle);
}

#[tokio::test]
async fn test_missing_subject_rejected_locally() {
    let backend = ScriptedBackend::new(|_, _| Reply::now(Ok(text("unused"))));
    let router = Router::new(layer(backend.clone()));

    for subject in ["", "   \t"] {
        let outcome = router
            .invoke("social", LabArguments::new(subject, Category::Streetwear))
            .await;
        assert_eq!(outcome, Invocation::Rejected(Rejection::MissingSubject));
    }
    assert!(backend.calls().is_empty());
    assert_eq!(router.state(), RouterState::Idle);
}

#[tokio::test]
async fn test_color_works_without_subject() {
    let backend = ScriptedBackend::new(|_, _| Reply::now(Ok(text("Palette: ink, chrome, signal red"))));
    let router = Router::new(layer(backend.clone()));

    let outcome = router
        .invoke("color", LabArguments::new("", Category::Luxury))
        .await;
    assert_eq!(
        outcome,
        Invocation::Completed(RenderView::Text {
            text: "Palette: ink, chrome, signal red".to_string()
        })
    );
    assert!(backend.calls()[0].instruction.contains("Luxury industry"));
}

#[tokio::test]
async fn test_unknown_capability_rejected() {
    let backend = ScriptedBackend::new(|_, _| Reply::now(Ok(text("unused"))));
    let router = Router::new(layer(backend.clone()));

    let outcome = router
        .invoke("horoscope", LabArguments::new("Nova", Category::Tech))
        .await;
    assert_eq!(
        outcome,
        Invocation::Rejected(Rejection::UnknownCapability("horoscope".to_string()))
    );
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_backend_failure_is_uniform_message() {
    let backend = ScriptedBackend::new(|_, _| {
        Reply::now(Err(BackendError::Transport("dns failure".to_string())))
    });
    let router = Router::new(layer(backend));

    let outcome = router
        .invoke("newsletter", LabArguments::new("Neon Grid", Category::Tech))
        .await;
    assert_eq!(outcome, Invocation::Failed(UNAVAILABLE_MESSAGE.to_string()));
    assert_eq!(router.state(), RouterState::Idle);
}

#[tokio::test]
async fn test_agent_arguments_reach_instruction() {
    let backend = ScriptedBackend::new(|_, _| Reply::now(Ok(text("{}"))));
    let router = Router::new(layer(backend.clone()));

    router
        .invoke("persona", LabArguments::new(" Nova ", Category::Web3))
        .await;
    router
        .invoke("pitch", LabArguments::new("Nova", Category::Web3))
        .await;
    router
        .invoke("newsletter", LabArguments::new("Nova Pack", Category::Web3))
        .await;

    let calls = backend.calls();
    assert!(calls[0].instruction.contains("Nova in Web3 sector"));
    assert!(calls[1].instruction.contains("Revolutionizing branding."));
    assert!(calls[2].instruction.contains("New interactive mockups."));
}

#[tokio::test]
async fn test_social_calendar_renders_table() {
    let calendar = json!([
        { "day": "Mon", "platform": "X", "content": "Reveal", "visualHook": "Glitch" },
        { "day": "Tue", "platform": "IG", "content": "Process" }
    ])
    .to_string();
    let backend = ScriptedBackend::new(move |_, _| Reply::now(Ok(text(calendar.clone()))));
    let router = Router::new(layer(backend));

    let outcome = router
        .invoke("social", LabArguments::new("Nova", Category::Tech))
        .await;
    let Invocation::Completed(RenderView::Table { columns, rows }) = outcome else {
        panic!("expected table, got {:?}", outcome);
    };
    assert_eq!(columns, vec!["day", "platform", "content", "visualHook"]);
    assert_eq!(rows[1], vec!["Tue", "IG", "Process", ""]);
}

#[tokio::test]
async fn test_persona_renders_serialized() {
    let persona = json!({ "demographic": "Founders 25-40", "painPoints": ["time"] }).to_string();
    let backend = ScriptedBackend::new(move |_, _| Reply::now(Ok(text(persona.clone()))));
    let router = Router::new(layer(backend));

    let outcome = router
        .invoke("persona", LabArguments::new("Nova", Category::Tech))
        .await;
    let Invocation::Completed(RenderView::Serialized { text }) = outcome else {
        panic!("expected serialized text, got {:?}", outcome);
    };
    assert!(text.contains("Founders 25-40"));
}

#[tokio::test(start_paused = true)]
async fn test_slow_backend_still_resolves() {
    let backend = ScriptedBackend::new(|_, _| {
        Reply::after(Duration::from_secs(30), Ok(text("Slide 1: Vision")))
    });
    let router = Router::new(layer(backend));

    let outcome = router
        .invoke("pitch", LabArguments::new("Nova", Category::Tech))
        .await;
    assert!(matches!(outcome, Invocation::Completed(RenderView::Text { .. })));
    assert_eq!(router.state(), RouterState::Idle);
}
