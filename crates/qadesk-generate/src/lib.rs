//! qadesk-generate
//!
//! Everything on the generative side of the ANSWER path: bounded context
//! assembly, the HTTP chat-completions client and a deterministic fake for
//! offline runs and tests.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use qadesk_core::config::{GenerationProvider, GenerationSettings};
use qadesk_core::traits::AnswerGenerator;
use qadesk_text::chunker::split_sentences;

pub mod context;
pub mod http;

pub use context::build_context;
pub use http::HttpAnswerGenerator;

/// Answers with the first sentence of the context. No network, no state.
pub struct FakeGenerator;

#[async_trait]
impl AnswerGenerator for FakeGenerator {
    fn model_id(&self) -> &str {
        "fake"
    }

    async fn generate(&self, _query: &str, context: &str) -> Result<String> {
        Ok(split_sentences(context)
            .into_iter()
            .next()
            .map(str::to_string)
            .unwrap_or_else(|| "No information is available for this question.".to_string()))
    }
}

/// Pick the generator named by configuration. `None` means the ANSWER path
/// falls back to heuristic extraction. `APP_USE_FAKE_GENERATOR=1` forces the
/// fake regardless of the configured provider.
pub fn get_default_generator(settings: &GenerationSettings) -> Result<Option<Box<dyn AnswerGenerator>>> {
    let use_fake = std::env::var("APP_USE_FAKE_GENERATOR")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake || settings.provider == GenerationProvider::Fake {
        info!("using fake answer generator");
        return Ok(Some(Box::new(FakeGenerator)));
    }
    match settings.provider {
        GenerationProvider::Disabled => Ok(None),
        GenerationProvider::Http => {
            let generator = HttpAnswerGenerator::new(settings)?;
            info!(model = generator.model_id(), "using http answer generator");
            Ok(Some(Box::new(generator)))
        }
        GenerationProvider::Fake => Ok(Some(Box::new(FakeGenerator))),
    }
}
