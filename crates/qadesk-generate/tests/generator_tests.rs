use qadesk_core::config::{GenerationProvider, GenerationSettings};
use qadesk_core::traits::AnswerGenerator;
use qadesk_core::types::RetrievalResult;
use qadesk_generate::{build_context, get_default_generator, FakeGenerator};

fn passage(content: &str, similarity: f32) -> RetrievalResult {
    RetrievalResult { chunk_id: "c:0".into(), doc_id: "c".into(), content: content.into(), similarity }
}

#[tokio::test]
async fn fake_generator_answers_from_context() {
    let context = build_context(
        &[passage("Mid semester exams start on 15th October 2025. Bring your ID.", 0.8)],
        2000,
    );
    let answer = FakeGenerator.generate("When are the exams?", &context).await.unwrap();
    assert_eq!(answer, "Mid semester exams start on 15th October 2025.");
}

#[tokio::test]
async fn fake_generator_handles_empty_context() {
    let answer = FakeGenerator.generate("anything", "").await.unwrap();
    assert!(!answer.is_empty());
}

#[test]
fn provider_selection() {
    let settings = GenerationSettings { provider: GenerationProvider::Fake, ..GenerationSettings::default() };
    let generator = get_default_generator(&settings).unwrap().expect("fake configured");
    assert_eq!(generator.model_id(), "fake");

    let settings = GenerationSettings {
        provider: GenerationProvider::Http,
        endpoint: Some("http://127.0.0.1:9/v1/chat/completions".into()),
        model: Some("local".into()),
        ..GenerationSettings::default()
    };
    if std::env::var("APP_USE_FAKE_GENERATOR").is_err() {
        let generator = get_default_generator(&settings).unwrap().expect("http configured");
        assert_eq!(generator.model_id(), "http:local");
        assert!(get_default_generator(&GenerationSettings::default()).unwrap().is_none());
    }
}
