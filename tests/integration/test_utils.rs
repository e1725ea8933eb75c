//! Shared test utilities for integration tests
//!
//! A scriptable upstream backend and helpers for building generators around it.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use fieldgen::config::{GeneratorConfig, InvalidInputPolicy};
use fieldgen::prompt::CallDescriptor;
use fieldgen::provider::{GenerationBackend, RawGeneration};
use fieldgen::{ContentGenerator, FixedClock, ProviderFailure};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

pub const SUMMARY_JSON: &str = r#"{"summary_policy_text":"Rotate grazing paddocks every seven days","key_points":["Check water troughs daily","Move stock in the morning"],"safety_considerations":["Close gates behind you"]}"#;

pub const EXPLORATION_JSON: &str = r#"{"exploration_notes_text":"Trial two mulch depths on alternating rows","metrics_text":"Soil moisture at 10cm, weed count per m2","suggested_measurements":["Weekly soil moisture"],"comparison_areas":["5cm versus 10cm mulch"],"documentation_tips":["Photograph each row monthly"]}"#;

pub const DRAFT_JSON: &str = r#"{"title":"Mulching Policy","description_text":"Apply 10cm of mulch to orchard rows in spring","key_procedures":["Spread mulch after the first mowing"],"safety_requirements":["Wear gloves when handling bark mulch"],"documentation_requirements":["Log mulch volume per row"],"effective_conditions":["Spring, after soil warms above 10C"]}"#;

type Outcome = Result<RawGeneration, ProviderFailure>;

enum Script {
    Always(Outcome),
    Sequence(Mutex<VecDeque<Outcome>>),
}

/// Upstream stand-in that replays scripted outcomes and records every call.
pub struct MockBackend {
    script: Script,
    delay: Option<Duration>,
    calls: Mutex<Vec<CallDescriptor>>,
}

impl MockBackend {
    /// Same outcome for every call.
    pub fn always(outcome: Outcome) -> Self {
        Self {
            script: Script::Always(outcome),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Outcomes in order; transient failures once the script runs out.
    pub fn sequence(outcomes: Vec<Outcome>) -> Self {
        Self {
            script: Script::Sequence(Mutex::new(outcomes.into())),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls(&self) -> Vec<CallDescriptor> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn send(&self, descriptor: &CallDescriptor) -> Outcome {
        self.calls.lock().push(descriptor.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.script {
            Script::Always(outcome) => outcome.clone(),
            Script::Sequence(queue) => queue
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(ProviderFailure::Transient("script exhausted".into()))),
        }
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

pub fn reply(json: &str, confidence: f64) -> Outcome {
    Ok(RawGeneration {
        raw_content: json.to_string(),
        confidence,
        model_name: "farm-gpt-1".to_string(),
    })
}

pub fn rate_limited() -> Outcome {
    Err(ProviderFailure::RateLimited("status 429".to_string()))
}

pub fn transient() -> Outcome {
    Err(ProviderFailure::Transient("status 503".to_string()))
}

pub fn fixed_clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2024, 9, 12, 6, 0, 0).unwrap())
}

pub fn generator(backend: MockBackend) -> ContentGenerator<MockBackend, FixedClock> {
    generator_with(backend, GeneratorConfig::default())
}

pub fn generator_with_policy(
    backend: MockBackend,
    policy: InvalidInputPolicy,
) -> ContentGenerator<MockBackend, FixedClock> {
    generator_with(
        backend,
        GeneratorConfig {
            invalid_input: policy,
            ..GeneratorConfig::default()
        },
    )
}

pub fn generator_with(
    backend: MockBackend,
    config: GeneratorConfig,
) -> ContentGenerator<MockBackend, FixedClock> {
    ContentGenerator::new(&config, backend, fixed_clock())
}
