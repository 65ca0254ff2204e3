//! Generation loop: seed the window, then predict → reshape → sample → append.
//!
//! A [`Generator`] holds the shared, read-only pieces (vocabulary, model,
//! configuration) and can serve any number of requests concurrently. Each
//! request runs in its own [`Session`], which owns the context window and the
//! text produced so far and moves through three phases:
//!
//! ```text
//! Seeding ──start()──▶ Generating ──length steps──▶ Done
//!    │                     │
//!    └─ validation error   └─ model / distribution / cancel error ──▶ Done
//!       (stays Seeding)
//! ```

use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::core::config::{ConfigError, GeneratorConfig, UnknownCharPolicy};
use crate::core::model::{CharModel, ModelError};
use crate::core::reshape::{reshape, validate_temperature, DistributionError};
use crate::core::sampler::sample;
use crate::core::vocab::Vocabulary;
use crate::core::window::{ContextWindow, PadFill, Padding};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerateError {
    #[error("unknown character {0:?} in seed")]
    UnknownCharacter(char),
    #[error("temperature must be a positive finite number, got {0}")]
    InvalidTemperature(f64),
    #[error("length must be positive")]
    InvalidLength,
    #[error("corrupt distribution: {0}")]
    CorruptDistribution(String),
    #[error("model query failed: {0}")]
    ModelQuery(#[from] ModelError),
    #[error("generation cancelled after {0} characters")]
    Cancelled(usize),
    #[error("generation timed out after {0} characters")]
    TimedOut(usize),
}

impl From<DistributionError> for GenerateError {
    fn from(err: DistributionError) -> Self {
        match err {
            DistributionError::InvalidTemperature(t) => Self::InvalidTemperature(t),
            DistributionError::CorruptDistribution(msg) => Self::CorruptDistribution(msg),
        }
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no vocabulary provided")]
    MissingVocabulary,
    #[error("no model provided")]
    MissingModel,
    #[error("model predicts over {model} characters but the vocabulary has {vocab}")]
    VocabSizeMismatch { model: usize, vocab: usize },
    #[error("{role} character {ch:?} is not in the vocabulary")]
    CharNotInVocabulary { role: &'static str, ch: char },
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Phase of a generation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Seeding,
    Generating,
    Done,
}

/// One generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub seed: String,
    /// Number of characters to produce beyond the seed.
    pub length: usize,
    pub temperature: f64,
}

impl GenerationRequest {
    pub fn new(seed: impl Into<String>, length: usize, temperature: f64) -> Self {
        Self {
            seed: seed.into(),
            length,
            temperature,
        }
    }
}

/// Result of a generation call: the text produced and the error that ended
/// it early, if any. Partial text is kept on failure.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutput {
    /// The seed as consumed (after lower-casing, when configured).
    pub seed: String,
    /// Characters produced beyond the seed.
    pub generated: String,
    /// Number of characters that were requested.
    pub requested: usize,
    pub error: Option<GenerateError>,
}

impl GenerationOutput {
    /// Seed followed by the generated characters.
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(self.seed.len() + self.generated.len());
        text.push_str(&self.seed);
        text.push_str(&self.generated);
        text
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.generated.chars().count() == self.requested
    }

    /// Full text on success; the error otherwise, discarding partial output.
    pub fn into_result(self) -> Result<String, GenerateError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.text()),
        }
    }
}

/// Caller-side abort switch, checked once per step.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Unknown-character policy resolved against the vocabulary.
#[derive(Debug, Clone, Copy)]
enum SeedFallback {
    Reject,
    Skip,
    Substitute(usize),
}

/// Shared generation engine. Cloning is cheap; clones share the vocabulary
/// and model.
#[derive(Clone)]
pub struct Generator {
    vocab: Arc<Vocabulary>,
    model: Arc<dyn CharModel>,
    config: GeneratorConfig,
    pad: PadFill,
    fallback: SeedFallback,
}

/// Builder for constructing a `Generator`.
#[derive(Default)]
pub struct GeneratorBuilder {
    vocab: Option<Arc<Vocabulary>>,
    model: Option<Arc<dyn CharModel>>,
    config: GeneratorConfig,
}

impl GeneratorBuilder {
    pub fn vocabulary(mut self, vocab: Arc<Vocabulary>) -> Self {
        self.vocab = Some(vocab);
        self
    }

    pub fn model(mut self, model: Arc<dyn CharModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn seq_length(mut self, seq_length: usize) -> Self {
        self.config.seq_length = seq_length;
        self
    }

    pub fn padding(mut self, padding: Padding) -> Self {
        self.config.padding = padding;
        self
    }

    pub fn unknown_chars(mut self, policy: UnknownCharPolicy) -> Self {
        self.config.unknown_chars = policy;
        self
    }

    /// Validate the pieces against each other and build the generator.
    pub fn build(self) -> Result<Generator, BuildError> {
        let vocab = self.vocab.ok_or(BuildError::MissingVocabulary)?;
        let model = self.model.ok_or(BuildError::MissingModel)?;
        self.config.validate()?;

        if model.vocab_size() != vocab.len() {
            return Err(BuildError::VocabSizeMismatch {
                model: model.vocab_size(),
                vocab: vocab.len(),
            });
        }

        let resolve = |role: &'static str, ch: char| {
            vocab
                .encode(ch)
                .map_err(|_| BuildError::CharNotInVocabulary { role, ch })
        };

        let pad = match self.config.padding {
            Padding::Char(ch) => PadFill::Index(resolve("padding", ch)?),
            Padding::RepeatFirst => PadFill::RepeatFirst,
        };
        let fallback = match self.config.unknown_chars {
            UnknownCharPolicy::Reject => SeedFallback::Reject,
            UnknownCharPolicy::Skip => SeedFallback::Skip,
            UnknownCharPolicy::Substitute(ch) => SeedFallback::Substitute(resolve("substitute", ch)?),
        };

        debug!(
            vocab_size = vocab.len(),
            seq_length = self.config.seq_length,
            padding = ?self.config.padding,
            unknown_chars = ?self.config.unknown_chars,
            "built generator"
        );

        Ok(Generator {
            vocab,
            model,
            config: self.config,
            pad,
            fallback,
        })
    }
}

impl Generator {
    pub fn builder() -> GeneratorBuilder {
        GeneratorBuilder::default()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Open a session for step-wise generation.
    pub fn session(&self, request: GenerationRequest) -> Session<'_> {
        let seed = if self.config.lowercase_seed {
            request.seed.to_lowercase()
        } else {
            request.seed.clone()
        };
        Session {
            generator: self,
            request,
            seed,
            state: State::Seeding,
            generated: String::new(),
            produced: 0,
            cancel: None,
            deadline: None,
            error: None,
        }
    }

    /// Run a request to completion (or to its first error).
    pub fn generate<R: Rng + ?Sized>(
        &self,
        request: GenerationRequest,
        rng: &mut R,
    ) -> GenerationOutput {
        self.session(request).run(rng)
    }

    /// Like [`generate`](Self::generate), aborting between steps once
    /// `cancel` is triggered.
    pub fn generate_with_cancel<R: Rng + ?Sized>(
        &self,
        request: GenerationRequest,
        rng: &mut R,
        cancel: &CancelToken,
    ) -> GenerationOutput {
        self.session(request).with_cancel(cancel.clone()).run(rng)
    }

    /// Generate from the same seed once per temperature, in order.
    pub fn sweep<R: Rng + ?Sized>(
        &self,
        seed: &str,
        length: usize,
        temperatures: &[f64],
        rng: &mut R,
    ) -> Vec<(f64, GenerationOutput)> {
        temperatures
            .iter()
            .map(|&t| (t, self.generate(GenerationRequest::new(seed, length, t), rng)))
            .collect()
    }

    fn encode_seed(&self, seed: &str) -> Result<Vec<usize>, GenerateError> {
        let mut indices = Vec::with_capacity(seed.len());
        for ch in seed.chars() {
            match self.vocab.encode(ch) {
                Ok(index) => indices.push(index),
                Err(_) => match self.fallback {
                    SeedFallback::Reject => return Err(GenerateError::UnknownCharacter(ch)),
                    SeedFallback::Skip => {
                        warn!(ch = ?ch, "skipping unknown seed character");
                    }
                    SeedFallback::Substitute(index) => {
                        warn!(ch = ?ch, index, "substituting unknown seed character");
                        indices.push(index);
                    }
                },
            }
        }
        Ok(indices)
    }
}

enum State {
    Seeding,
    Generating(ContextWindow),
    Done,
}

/// A single in-flight generation request.
pub struct Session<'g> {
    generator: &'g Generator,
    request: GenerationRequest,
    seed: String,
    state: State,
    generated: String,
    produced: usize,
    cancel: Option<CancelToken>,
    deadline: Option<Instant>,
    error: Option<GenerateError>,
}

impl<'g> Session<'g> {
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Seeding => Phase::Seeding,
            State::Generating(_) => Phase::Generating,
            State::Done => Phase::Done,
        }
    }

    /// Characters produced so far.
    pub fn generated(&self) -> &str {
        &self.generated
    }

    pub fn produced(&self) -> usize {
        self.produced
    }

    /// The error that stopped this session, if any.
    pub fn error(&self) -> Option<&GenerateError> {
        self.error.as_ref()
    }

    /// Validate the request, encode the seed and fill the context window.
    ///
    /// On failure the session stays in `Seeding` and no model query has been
    /// issued. Calling this after seeding succeeded is a no-op.
    pub fn start(&mut self) -> Result<(), GenerateError> {
        if !matches!(self.state, State::Seeding) {
            return Ok(());
        }

        match self.seed_window() {
            Ok(window) => {
                self.deadline = self
                    .generator
                    .config
                    .timeout()
                    .map(|budget| Instant::now() + budget);
                self.state = State::Generating(window);
                self.error = None;
                debug!(
                    seed_chars = self.seed.chars().count(),
                    length = self.request.length,
                    temperature = self.request.temperature,
                    "generation started"
                );
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "generation request rejected");
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Produce the next character.
    ///
    /// Starts the session if it is still seeding. Returns `Ok(None)` once
    /// `length` characters have been produced or the session has failed.
    /// Any error ends the session; the text produced so far is kept.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Option<char>, GenerateError> {
        if matches!(self.state, State::Seeding) {
            self.start()?;
        }

        let mut window = match std::mem::replace(&mut self.state, State::Done) {
            State::Generating(window) => window,
            other => {
                self.state = other;
                return Ok(None);
            }
        };

        match self.check_interrupt().and_then(|()| self.next_char(&mut window, rng)) {
            Ok(ch) => {
                self.generated.push(ch);
                self.produced += 1;
                if self.produced < self.request.length {
                    self.state = State::Generating(window);
                } else {
                    info!(chars = self.produced, "generation completed");
                }
                Ok(Some(ch))
            }
            Err(err) => {
                warn!(error = %err, produced = self.produced, "generation aborted");
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Step until done or failed, then hand back the output.
    pub fn run<R: Rng + ?Sized>(mut self, rng: &mut R) -> GenerationOutput {
        while let Ok(Some(_)) = self.step(rng) {}
        self.finish()
    }

    pub fn finish(self) -> GenerationOutput {
        GenerationOutput {
            seed: self.seed,
            generated: self.generated,
            requested: self.request.length,
            error: self.error,
        }
    }

    fn seed_window(&self) -> Result<ContextWindow, GenerateError> {
        validate_temperature(self.request.temperature)?;
        if self.request.length == 0 {
            return Err(GenerateError::InvalidLength);
        }
        let indices = self.generator.encode_seed(&self.seed)?;
        Ok(ContextWindow::initialize(
            &indices,
            self.generator.config.seq_length,
            self.generator.pad,
        ))
    }

    fn check_interrupt(&self) -> Result<(), GenerateError> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(GenerateError::Cancelled(self.produced));
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(GenerateError::TimedOut(self.produced));
        }
        Ok(())
    }

    fn next_char<R: Rng + ?Sized>(
        &self,
        window: &mut ContextWindow,
        rng: &mut R,
    ) -> Result<char, GenerateError> {
        let generator = self.generator;
        let probs = generator.model.predict(window.snapshot())?;
        if probs.len() != generator.vocab.len() {
            return Err(ModelError::OutputSize {
                expected: generator.vocab.len(),
                actual: probs.len(),
            }
            .into());
        }

        let reshaped = reshape(&probs, self.request.temperature)?;
        let index = sample(&reshaped, rng)?;
        let ch = generator
            .vocab
            .decode(index)
            .map_err(|e| GenerateError::CorruptDistribution(e.to_string()))?;

        window.push(index);
        trace!(step = self.produced, index, ch = ?ch, "sampled character");
        Ok(ch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::UniformModel;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::AtomicUsize;

    /// Records how often it is queried and the last context it saw.
    struct RecordingModel {
        vocab_size: usize,
        calls: AtomicUsize,
        fail_after: Option<usize>,
        last_context: std::sync::Mutex<Vec<usize>>,
    }

    impl RecordingModel {
        fn new(vocab_size: usize) -> Self {
            Self {
                vocab_size,
                calls: AtomicUsize::new(0),
                fail_after: None,
                last_context: std::sync::Mutex::new(Vec::new()),
            }
        }

        fn failing_after(vocab_size: usize, n: usize) -> Self {
            Self {
                fail_after: Some(n),
                ..Self::new(vocab_size)
            }
        }
    }

    impl CharModel for RecordingModel {
        fn vocab_size(&self) -> usize {
            self.vocab_size
        }

        fn predict(&self, context: &[usize]) -> Result<Vec<f64>, ModelError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_context.lock().unwrap() = context.to_vec();
            if self.fail_after.is_some_and(|n| call >= n) {
                return Err(ModelError::Backend("weights unavailable".to_string()));
            }
            Ok(vec![1.0 / self.vocab_size as f64; self.vocab_size])
        }
    }

    struct FixedOutput(Vec<f64>);

    impl CharModel for FixedOutput {
        fn vocab_size(&self) -> usize {
            3
        }

        fn predict(&self, _context: &[usize]) -> Result<Vec<f64>, ModelError> {
            Ok(self.0.clone())
        }
    }

    /// Uniform model that takes `delay` per query.
    struct SlowModel {
        delay: std::time::Duration,
    }

    impl CharModel for SlowModel {
        fn vocab_size(&self) -> usize {
            3
        }

        fn predict(&self, _context: &[usize]) -> Result<Vec<f64>, ModelError> {
            std::thread::sleep(self.delay);
            Ok(vec![1.0 / 3.0; 3])
        }
    }

    fn abc() -> Arc<Vocabulary> {
        Arc::new(Vocabulary::from_chars(['a', 'b', 'c']).unwrap())
    }

    fn builder(model: Arc<dyn CharModel>) -> GeneratorBuilder {
        Generator::builder()
            .vocabulary(abc())
            .model(model)
            .seq_length(3)
            .padding(Padding::RepeatFirst)
            .unknown_chars(UnknownCharPolicy::Reject)
    }

    #[test]
    fn uniform_model_with_zero_draws_repeats_first_index() {
        let generator = builder(Arc::new(UniformModel::new(3))).build().unwrap();
        let mut rng = StepRng::new(0, 0);

        let output = generator.generate(GenerationRequest::new("ab", 5, 1.0), &mut rng);

        assert!(output.is_complete());
        assert_eq!(output.text(), "abaaaaa");
        assert_eq!(output.generated, "aaaaa");
    }

    #[test]
    fn zero_temperature_rejected_before_any_query() {
        let model = Arc::new(RecordingModel::new(3));
        let generator = builder(model.clone()).build().unwrap();
        let mut session = generator.session(GenerationRequest::new("ab", 5, 0.0));
        let mut rng = StepRng::new(0, 0);

        assert_eq!(
            session.step(&mut rng),
            Err(GenerateError::InvalidTemperature(0.0))
        );
        assert_eq!(session.phase(), Phase::Seeding);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn vanishing_temperature_still_generates() {
        let generator = builder(Arc::new(FixedOutput(vec![0.2, 0.5, 0.3])))
            .build()
            .unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let output = generator.generate(GenerationRequest::new("ab", 3, 1e-309), &mut rng);
        assert!(output.is_complete(), "{:?}", output.error);
        assert_eq!(output.generated, "bbb");
    }

    #[test]
    fn zero_length_rejected() {
        let generator = builder(Arc::new(UniformModel::new(3))).build().unwrap();
        let mut session = generator.session(GenerationRequest::new("ab", 0, 1.0));
        assert_eq!(session.start(), Err(GenerateError::InvalidLength));
        assert_eq!(session.phase(), Phase::Seeding);
    }

    #[test]
    fn phases_advance_through_session() {
        let generator = builder(Arc::new(UniformModel::new(3))).build().unwrap();
        let mut session = generator.session(GenerationRequest::new("c", 2, 1.0));
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(session.phase(), Phase::Seeding);
        session.start().unwrap();
        assert_eq!(session.phase(), Phase::Generating);
        assert!(session.step(&mut rng).unwrap().is_some());
        assert_eq!(session.phase(), Phase::Generating);
        assert!(session.step(&mut rng).unwrap().is_some());
        assert_eq!(session.phase(), Phase::Done);
        assert_eq!(session.step(&mut rng), Ok(None));
        assert_eq!(session.produced(), 2);
    }

    #[test]
    fn window_tracks_sampled_characters() {
        let model = Arc::new(RecordingModel::new(3));
        let generator = builder(model.clone()).build().unwrap();
        let mut rng = StepRng::new(0, 0);

        let output = generator.generate(GenerationRequest::new("cb", 2, 1.0), &mut rng);

        assert_eq!(output.generated, "aa");
        // second query sees the padded seed shifted by the first sample
        assert_eq!(*model.last_context.lock().unwrap(), vec![2, 1, 0]);
    }

    #[test]
    fn model_failure_keeps_partial_text() {
        let model = Arc::new(RecordingModel::failing_after(3, 3));
        let generator = builder(model).build().unwrap();
        let mut rng = StepRng::new(0, 0);

        let output = generator.generate(GenerationRequest::new("ab", 10, 1.0), &mut rng);

        assert_eq!(output.generated, "aaa");
        assert!(!output.is_complete());
        assert!(matches!(
            output.error,
            Some(GenerateError::ModelQuery(ModelError::Backend(_)))
        ));
        assert!(output.into_result().is_err());
    }

    #[test]
    fn wrong_output_size_is_model_error() {
        let generator = builder(Arc::new(FixedOutput(vec![0.5, 0.5])))
            .build()
            .unwrap();
        let output = generator.generate(GenerationRequest::new("a", 3, 1.0), &mut StepRng::new(0, 0));
        assert_eq!(
            output.error,
            Some(GenerateError::ModelQuery(ModelError::OutputSize {
                expected: 3,
                actual: 2
            }))
        );
        assert!(output.generated.is_empty());
    }

    #[test]
    fn non_finite_prediction_is_corrupt_distribution() {
        let generator = builder(Arc::new(FixedOutput(vec![0.5, f64::NAN, 0.5])))
            .build()
            .unwrap();
        let output = generator.generate(GenerationRequest::new("a", 3, 1.0), &mut StepRng::new(0, 0));
        assert!(matches!(
            output.error,
            Some(GenerateError::CorruptDistribution(_))
        ));
    }

    #[test]
    fn zero_probabilities_from_model_are_tolerated() {
        let generator = builder(Arc::new(FixedOutput(vec![0.0, 1.0, 0.0])))
            .build()
            .unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let output = generator.generate(GenerationRequest::new("a", 20, 0.5), &mut rng);
        assert!(output.is_complete());
        assert_eq!(output.generated, "b".repeat(20));
    }

    #[test]
    fn cancelled_token_stops_between_steps() {
        let generator = builder(Arc::new(UniformModel::new(3))).build().unwrap();
        let cancel = CancelToken::new();
        let mut session = generator
            .session(GenerationRequest::new("ab", 10, 1.0))
            .with_cancel(cancel.clone());
        let mut rng = StdRng::seed_from_u64(3);

        session.step(&mut rng).unwrap();
        session.step(&mut rng).unwrap();
        cancel.cancel();

        assert_eq!(session.step(&mut rng), Err(GenerateError::Cancelled(2)));
        assert_eq!(session.phase(), Phase::Done);
        let output = session.finish();
        assert_eq!(output.generated.chars().count(), 2);
        assert_eq!(output.error, Some(GenerateError::Cancelled(2)));
    }

    #[test]
    fn deadline_stops_between_steps() {
        let config = GeneratorConfig {
            seq_length: 3,
            padding: Padding::RepeatFirst,
            unknown_chars: UnknownCharPolicy::Reject,
            timeout_ms: Some(20),
            ..GeneratorConfig::default()
        };
        let generator = Generator::builder()
            .vocabulary(abc())
            .model(Arc::new(SlowModel {
                delay: std::time::Duration::from_millis(40),
            }))
            .config(config)
            .build()
            .unwrap();
        assert_eq!(
            generator.config().timeout(),
            Some(std::time::Duration::from_millis(20))
        );

        let mut session = generator.session(GenerationRequest::new("ab", 50, 1.0));
        let mut rng = StepRng::new(0, 0);
        let result = loop {
            match session.step(&mut rng) {
                Ok(Some(_)) => {}
                other => break other,
            }
        };

        let produced = match result {
            Err(GenerateError::TimedOut(n)) => n,
            other => panic!("expected a timeout, got {:?}", other),
        };
        assert!(produced >= 1);
        assert!(produced < 50);
        assert_eq!(session.phase(), Phase::Done);
        assert_eq!(session.error(), Some(&GenerateError::TimedOut(produced)));

        let output = session.finish();
        assert_eq!(output.generated, "a".repeat(produced));
        assert!(!output.is_complete());
    }

    #[test]
    fn unknown_seed_character_policies() {
        let model: Arc<dyn CharModel> = Arc::new(UniformModel::new(3));
        let mut rng = StepRng::new(0, 0);

        let reject = builder(model.clone()).build().unwrap();
        let output = reject.generate(GenerationRequest::new("axb", 2, 1.0), &mut rng);
        assert_eq!(output.error, Some(GenerateError::UnknownCharacter('x')));
        assert!(output.generated.is_empty());

        let skip = builder(model.clone())
            .unknown_chars(UnknownCharPolicy::Skip)
            .build()
            .unwrap();
        let output = skip.generate(GenerationRequest::new("axb", 2, 1.0), &mut rng);
        assert!(output.is_complete());
        assert_eq!(output.text(), "axbaa");

        let substitute = builder(model)
            .unknown_chars(UnknownCharPolicy::Substitute('c'))
            .build()
            .unwrap();
        let output = substitute.generate(GenerationRequest::new("axb", 2, 1.0), &mut rng);
        assert!(output.is_complete());
    }

    #[test]
    fn seed_is_lowercased_by_default() {
        let generator = builder(Arc::new(UniformModel::new(3))).build().unwrap();
        let output = generator.generate(GenerationRequest::new("AB", 1, 1.0), &mut StepRng::new(0, 0));
        assert_eq!(output.text(), "aba");
    }

    #[test]
    fn build_rejects_mismatched_model() {
        let result = builder(Arc::new(UniformModel::new(4))).build();
        assert!(matches!(
            result,
            Err(BuildError::VocabSizeMismatch { model: 4, vocab: 3 })
        ));
    }

    #[test]
    fn build_rejects_padding_outside_vocabulary() {
        let result = builder(Arc::new(UniformModel::new(3)))
            .padding(Padding::Char(' '))
            .build();
        assert!(matches!(
            result,
            Err(BuildError::CharNotInVocabulary { role: "padding", ch: ' ' })
        ));
    }

    #[test]
    fn build_rejects_zero_window_length() {
        let result = builder(Arc::new(UniformModel::new(3))).seq_length(0).build();
        assert!(matches!(
            result,
            Err(BuildError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn build_requires_vocabulary_and_model() {
        assert!(matches!(
            Generator::builder().build(),
            Err(BuildError::MissingVocabulary)
        ));
        assert!(matches!(
            Generator::builder().vocabulary(abc()).build(),
            Err(BuildError::MissingModel)
        ));
    }

    #[test]
    fn sweep_runs_each_temperature() {
        let generator = builder(Arc::new(UniformModel::new(3))).build().unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let results = generator.sweep("ab", 6, &[0.2, 0.5, 1.0], &mut rng);

        assert_eq!(results.len(), 3);
        for (t, output) in &results {
            assert!(output.is_complete(), "T={} failed: {:?}", t, output.error);
            assert_eq!(output.generated.chars().count(), 6);
        }
        assert_eq!(results[1].0, 0.5);
    }
}
