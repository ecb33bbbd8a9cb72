use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use pdfrag::embeddings::Embedder;
use pdfrag::embeddings::HashEmbedder;
use pdfrag::extract::PlainTextExtractor;
use pdfrag::llm::GenerationRequest;
use pdfrag::llm::Generator;
use pdfrag::AppConfig;
use pdfrag::PdfRagError;
use pdfrag::RagService;
use pdfrag::Result;

/// Answers with a fixed text and keeps every prompt it receives
#[derive(Default)]
struct ScriptedGenerator {
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String> {
        self.prompts.lock().unwrap().push(request.prompt.to_string());
        Ok("The sky is blue.".to_string())
    }
}

struct DownGenerator;

#[async_trait]
impl Generator for DownGenerator {
    async fn generate(&self, _request: GenerationRequest<'_>) -> Result<String> {
        Err(PdfRagError::Generation("service unavailable".to_string()))
    }
}

/// Hash embeddings with switches for failures and a dimension change
struct ControlledEmbedder {
    inner: HashEmbedder,
    wide: HashEmbedder,
    use_wide: AtomicBool,
    fail_on: Mutex<Option<String>>,
    fail_all: AtomicBool,
    calls: AtomicUsize,
}

impl ControlledEmbedder {
    fn new() -> Self {
        Self {
            inner: HashEmbedder::new(256),
            wide: HashEmbedder::new(512),
            use_wide: AtomicBool::new(false),
            fail_on: Mutex::new(None),
            fail_all: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Embedder for ControlledEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(PdfRagError::Embedding("provider unreachable".to_string()));
        }
        let poisoned = self
            .fail_on
            .lock()
            .unwrap()
            .as_deref()
            .is_some_and(|marker| text.contains(marker));
        if poisoned {
            return Err(PdfRagError::Embedding("cannot embed fragment".to_string()));
        }
        if self.use_wide.load(Ordering::SeqCst) {
            self.wide.embed(text).await
        } else {
            self.inner.embed(text).await
        }
    }

    fn model_name(&self) -> &str {
        "controlled"
    }
}

fn service_with(
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
) -> Result<RagService> {
    RagService::from_services(
        &AppConfig::default(),
        embedder,
        generator,
        Arc::new(PlainTextExtractor),
    )
}

#[tokio::test]
async fn test_sky_question_end_to_end() -> Result<()> {
    let generator = Arc::new(ScriptedGenerator::default());
    let service = service_with(Arc::new(HashEmbedder::new(384)), generator.clone())?;

    let total = service.ingest_pdf(b"The sky is blue.", "sky.pdf").await?;
    assert_eq!(total, 1);

    let outcome = service.chat("What color is the sky?", None, None).await;
    assert_eq!(outcome.response, "The sky is blue.");
    assert_eq!(outcome.sources.len(), 1);
    assert_eq!(outcome.sources[0].source, "sky.pdf");
    assert_eq!(outcome.sources[0].chunk_index, 0);
    assert!(!outcome.session_id.is_empty());

    let prompt = generator.last_prompt();
    assert_eq!(
        prompt,
        "Context: The sky is blue.\n\nQuestion: What color is the sky?"
    );

    Ok(())
}

#[tokio::test]
async fn test_long_document_chunk_count() -> Result<()> {
    let service = service_with(
        Arc::new(HashEmbedder::new(64)),
        Arc::new(ScriptedGenerator::default()),
    )?;

    let document = "word ".repeat(500);
    assert_eq!(document.chars().count(), 2500);
    assert_eq!(service.ingest(&document, "long.pdf").await?, 3);

    let stats = service.stats().await;
    assert_eq!(stats.sources.len(), 1);
    assert_eq!(stats.sources[0].fragments, 3);
    assert_eq!(stats.dimension, Some(64));

    Ok(())
}

#[tokio::test]
async fn test_failed_ingest_commits_nothing() -> Result<()> {
    let embedder = Arc::new(ControlledEmbedder::new());
    let service = service_with(embedder.clone(), Arc::new(ScriptedGenerator::default()))?;

    service.ingest("The sky is blue.", "sky.pdf").await?;

    // The poisoned marker sits in the third chunk only
    let mut document = "a".repeat(2000);
    document.push_str("POISON");
    *embedder.fail_on.lock().unwrap() = Some("POISON".to_string());

    let result = service.ingest(&document, "poisoned.pdf").await;
    assert!(matches!(result, Err(PdfRagError::Embedding(_))));
    assert_eq!(service.document_count().await, 1);
    assert!(service
        .stats()
        .await
        .sources
        .iter()
        .all(|s| s.source != "poisoned.pdf"));

    Ok(())
}

#[tokio::test]
async fn test_dimension_change_is_rejected() -> Result<()> {
    let embedder = Arc::new(ControlledEmbedder::new());
    let service = service_with(embedder.clone(), Arc::new(ScriptedGenerator::default()))?;

    service.ingest("The sky is blue.", "sky.pdf").await?;
    embedder.use_wide.store(true, Ordering::SeqCst);

    let result = service.ingest("Grass is green.", "grass.pdf").await;
    assert!(matches!(
        result,
        Err(PdfRagError::DimensionMismatch {
            expected: 256,
            actual: 512
        })
    ));
    assert_eq!(service.document_count().await, 1);

    Ok(())
}

#[tokio::test]
async fn test_total_backend_failure_still_answers() -> Result<()> {
    let embedder = Arc::new(ControlledEmbedder::new());
    let service = service_with(embedder.clone(), Arc::new(DownGenerator))?;
    service.ingest("The sky is blue.", "sky.pdf").await?;

    embedder.fail_all.store(true, Ordering::SeqCst);
    let outcome = service
        .chat("What color is the sky?", Some("session-1".to_string()), None)
        .await;

    assert!(outcome.sources.is_empty());
    assert_eq!(outcome.session_id, "session-1");
    assert!(outcome
        .response
        .starts_with("Sorry, I encountered an error while processing your request:"));
    assert!(outcome.response.contains("service unavailable"));

    Ok(())
}

#[tokio::test]
async fn test_empty_index_skips_embedding() -> Result<()> {
    let embedder = Arc::new(ControlledEmbedder::new());
    let generator = Arc::new(ScriptedGenerator::default());
    let service = service_with(embedder.clone(), generator.clone())?;

    let outcome = service.chat("Anything in there?", None, None).await;
    assert!(outcome.sources.is_empty());
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    assert!(generator.last_prompt().starts_with("Context: No relevant context found."));

    Ok(())
}

#[tokio::test]
async fn test_clear_then_chat() -> Result<()> {
    let generator = Arc::new(ScriptedGenerator::default());
    let service = service_with(Arc::new(HashEmbedder::new(128)), generator.clone())?;

    service.ingest("The sky is blue.", "sky.pdf").await?;
    service.clear_all().await;
    assert_eq!(service.document_count().await, 0);

    let outcome = service.chat("What color is the sky?", None, None).await;
    assert!(outcome.sources.is_empty());
    assert!(generator.last_prompt().contains("No relevant context found."));

    // A new document may now use any dimension
    service.ingest("Grass is green.", "grass.pdf").await?;
    assert_eq!(service.document_count().await, 1);

    Ok(())
}

#[tokio::test]
async fn test_session_is_stable_across_turns() -> Result<()> {
    let service = service_with(
        Arc::new(HashEmbedder::new(128)),
        Arc::new(ScriptedGenerator::default()),
    )?;

    let first = service.chat("Hello", None, None).await;
    let second = service
        .chat("Hello again", Some(first.session_id.clone()), None)
        .await;
    let third = service.chat("Hello", Some(String::new()), None).await;

    assert_eq!(first.session_id, second.session_id);
    assert_ne!(first.session_id, third.session_id);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_uploads_and_chats() -> Result<()> {
    let service = Arc::new(service_with(
        Arc::new(HashEmbedder::new(128)),
        Arc::new(ScriptedGenerator::default()),
    )?);

    let mut uploads = Vec::new();
    for i in 0..8 {
        let service = Arc::clone(&service);
        uploads.push(tokio::spawn(async move {
            let document = format!("Document {i} says the sky is blue. ").repeat(60);
            service.ingest(&document, &format!("doc-{i}.pdf")).await
        }));
    }

    let mut chats = Vec::new();
    for _ in 0..8 {
        let service = Arc::clone(&service);
        chats.push(tokio::spawn(async move {
            service.chat("What color is the sky?", None, None).await
        }));
    }

    for upload in uploads {
        upload.await.unwrap()?;
    }
    for chat in chats {
        let outcome = chat.await.unwrap();
        assert!(!outcome.session_id.is_empty());
        assert!(outcome.sources.len() <= 4);
    }

    let stats = service.stats().await;
    assert_eq!(stats.sources.len(), 8);
    let per_document = stats.sources[0].fragments;
    assert!(stats.sources.iter().all(|s| s.fragments == per_document));
    assert_eq!(stats.fragments, per_document * 8);

    Ok(())
}
