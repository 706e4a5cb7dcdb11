//! Agent implementation - drives the generate/fit/score/select loop.

use crate::archive::TopKArchive;
use crate::evaluator::Evaluator;
use crate::exporter::Exporter;
use crate::generator::{CandidateGenerator, PromptContext};
use crate::loader::Loader;
use crate::prompt::PromptWriter;
use crate::retry::attempt_with_retry;
use sciforge_error::{Error, ErrorKind, Result};
use sciforge_vm::LlmProvider;
use std::path::PathBuf;

/// Configuration for the agent
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Number of loop iterations
    pub iterations: usize,
    /// Archive capacity
    pub top_k: usize,
    /// Retries per iteration beyond the initial attempt
    pub max_attempts: usize,
    /// Constructor symbol generated source must define
    pub model_symbol: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            iterations: 5,
            top_k: 3,
            max_attempts: 3,
            model_symbol: "Physics".to_string(),
        }
    }
}

/// The loop controller.
///
/// Owns the provider (through the generator), the collaborators, and the
/// archive - the only mutable state across iterations. Strictly sequential:
/// each iteration's prompt depends on the archive state its predecessors
/// left behind.
pub struct GenerativeAgent<P> {
    config: AgentConfig,
    generator: CandidateGenerator<P>,
    prompt_writer: PromptWriter,
    loader: Loader,
    evaluator: Evaluator,
    exporter: Exporter,
    archive: TopKArchive,
}

impl<P: LlmProvider> GenerativeAgent<P> {
    /// Create an agent with default configuration
    pub fn new(provider: P, loader: Loader, exporter: Exporter) -> Self {
        Self::with_config(AgentConfig::default(), provider, loader, exporter)
    }

    /// Create an agent with custom configuration
    pub fn with_config(
        config: AgentConfig,
        provider: P,
        loader: Loader,
        exporter: Exporter,
    ) -> Self {
        let generator = CandidateGenerator::new(provider, config.model_symbol.clone());
        let archive = TopKArchive::new(config.top_k);
        Self {
            generator,
            prompt_writer: PromptWriter::default(),
            loader,
            evaluator: Evaluator::new(),
            exporter,
            archive,
            config,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// The current archive state
    pub fn archive(&self) -> &TopKArchive {
        &self.archive
    }

    /// One-time setup: output directory and dataset
    pub fn set_up(&mut self) -> Result<()> {
        self.exporter.set_up()?;
        self.loader.load()
    }

    /// Run the full loop and export the best candidate, returning the
    /// artifact path.
    ///
    /// An iteration whose retry budget is exhausted contributes nothing to
    /// the archive and the loop moves on; only evaluator/exporter failures
    /// and a fully-empty archive are fatal.
    pub async fn run(&mut self) -> Result<PathBuf> {
        if !self.loader.is_loaded() {
            return Err(Error::new(
                ErrorKind::ConfigInvalid,
                "set_up() must be called before run()",
            )
            .with_operation("agent::run"));
        }

        // immutable for the run; the feedback block is recomputed fresh
        // from the archive inside every generation attempt
        let prompts = PromptContext {
            system_prompt: self.prompt_writer.write_system_prompt(),
            base_user_prompt: self.prompt_writer.write_user_prompt(&self.loader),
            fit_harness: self.prompt_writer.write_fit_code(),
        };

        for iteration in 0..self.config.iterations {
            let generator = &self.generator;
            let archive = &self.archive;
            let loader = &self.loader;
            let prompts = &prompts;

            let outcome = attempt_with_retry(iteration, self.config.max_attempts, || {
                generator.generate_and_fit(
                    prompts,
                    archive,
                    loader.train_x(),
                    loader.train_y(),
                )
            })
            .await;

            let Some(mut candidate) = outcome else {
                continue;
            };

            let loss = self
                .evaluator
                .evaluate(iteration, &self.loader, &candidate.model)?;
            candidate.loss = Some(loss);
            self.archive.insert(candidate);
        }

        let best = self.archive.best()?;
        log::info!(
            "run complete: best loss = {:e} over {} archived candidate(s)",
            best.sort_loss(),
            self.archive.len()
        );
        self.exporter.export(&self.loader, &best.model, &best.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sciforge_vm::{CompletionRequest, CompletionResponse, ProviderError, Role, Usage};
    use std::collections::VecDeque;
    use std::io::Write;
    use std::sync::Mutex;

    /// Replays canned responses and records the user prompts it was sent
    struct ScriptedProvider {
        responses: Mutex<VecDeque<String>>,
        user_prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
                user_prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn default_model(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> std::result::Result<CompletionResponse, ProviderError> {
            if let Some(user) = request.messages.iter().find(|m| m.role == Role::User) {
                self.user_prompts.lock().unwrap().push(user.content.clone());
            }
            let next = self.responses.lock().unwrap().pop_front();
            match next {
                Some(content) => Ok(CompletionResponse {
                    model: "scripted".into(),
                    content,
                    usage: Usage::default(),
                }),
                None => Err(ProviderError::Other("script exhausted".into())),
            }
        }
    }

    const LINEAR: &str =
        "```model\nmodel Physics { param a = 1.0; param b = 0.0; predict(x) = a * x0 + b; }\n```";
    const QUADRATIC: &str =
        "```model\nmodel Physics { param a = 0.5; predict(x) = a * x0 ^ 2; }\n```";
    const CONSTANT: &str =
        "```model\nmodel Physics { param c = 0.0; predict(x) = c; }\n```";
    const NO_FENCE: &str = "I believe the governing equation is linear.";

    /// Dataset for y = 2x + 1
    fn dataset_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let train_x: Vec<Vec<f64>> = (0..16).map(|i| vec![i as f64 * 0.25]).collect();
        let train_y: Vec<f64> = train_x.iter().map(|r| 2.0 * r[0] + 1.0).collect();
        let valid_x: Vec<Vec<f64>> = (0..4).map(|i| vec![0.1 + i as f64]).collect();
        let valid_y: Vec<f64> = valid_x.iter().map(|r| 2.0 * r[0] + 1.0).collect();
        let json = serde_json::json!({
            "train_x": train_x, "train_y": train_y,
            "valid_x": valid_x, "valid_y": valid_y,
        });
        file.write_all(json.to_string().as_bytes()).unwrap();
        file
    }

    fn agent_with(
        responses: &[&str],
        config: AgentConfig,
        data: &tempfile::NamedTempFile,
        out: &std::path::Path,
    ) -> GenerativeAgent<ScriptedProvider> {
        let provider = ScriptedProvider::new(responses);
        let loader = Loader::new(data.path());
        let exporter = Exporter::new(out);
        GenerativeAgent::with_config(config, provider, loader, exporter)
    }

    #[tokio::test]
    async fn test_full_run_with_failed_iterations() {
        let data = dataset_file();
        let out = tempfile::tempdir().unwrap();
        let config = AgentConfig {
            iterations: 5,
            top_k: 3,
            max_attempts: 0,
            ..Default::default()
        };
        // iterations 1 and 3 produce no usable candidate
        let mut agent = agent_with(
            &[LINEAR, NO_FENCE, QUADRATIC, NO_FENCE, CONSTANT],
            config,
            &data,
            out.path(),
        );

        agent.set_up().unwrap();
        let artifact = agent.run().await.unwrap();

        assert_eq!(agent.archive().len(), 3);
        let losses: Vec<f64> = agent.archive().feedback_entries().map(|e| e.loss).collect();
        assert!(losses.windows(2).all(|w| w[0] <= w[1]));

        // the linear model matches the generating process
        let best = agent.archive().best().unwrap();
        assert!(best.source.contains("a * x0 + b"));
        assert!(best.loss.unwrap() < 1e-4);

        let text = std::fs::read_to_string(&artifact).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(parsed["source"].as_str().unwrap().contains("a * x0 + b"));
    }

    #[tokio::test]
    async fn test_feedback_reaches_later_iterations() {
        let data = dataset_file();
        let out = tempfile::tempdir().unwrap();
        let config = AgentConfig {
            iterations: 2,
            top_k: 3,
            max_attempts: 0,
            ..Default::default()
        };
        let mut agent = agent_with(&[LINEAR, CONSTANT], config, &data, out.path());

        agent.set_up().unwrap();
        agent.run().await.unwrap();

        let prompts = agent.generator_prompts();
        assert_eq!(prompts.len(), 2);
        assert!(!prompts[0].contains("### Previous iteration"));
        assert!(prompts[1].contains("### Previous iteration #0:"));
        assert!(prompts[1].contains("Loss = "));
    }

    #[tokio::test]
    async fn test_archive_capacity_respected() {
        let data = dataset_file();
        let out = tempfile::tempdir().unwrap();
        let config = AgentConfig {
            iterations: 3,
            top_k: 2,
            max_attempts: 0,
            ..Default::default()
        };
        let mut agent = agent_with(&[CONSTANT, QUADRATIC, LINEAR], config, &data, out.path());

        agent.set_up().unwrap();
        agent.run().await.unwrap();

        assert_eq!(agent.archive().len(), 2);
        // the constant model is the worst of the three and must be evicted
        let sources: Vec<String> = agent
            .archive()
            .feedback_entries()
            .map(|e| e.source.to_string())
            .collect();
        assert!(sources.iter().all(|s| !s.contains("predict(x) = c")));
    }

    #[tokio::test]
    async fn test_every_iteration_failing_is_fatal_at_finalize() {
        let data = dataset_file();
        let out = tempfile::tempdir().unwrap();
        let config = AgentConfig {
            iterations: 3,
            top_k: 3,
            max_attempts: 1,
            ..Default::default()
        };
        let mut agent = agent_with(&[], config, &data, out.path());

        agent.set_up().unwrap();
        let err = agent.run().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArchiveEmpty);
        assert!(!out.path().join("best_model.json").exists());
    }

    #[tokio::test]
    async fn test_run_without_set_up_rejected() {
        let data = dataset_file();
        let out = tempfile::tempdir().unwrap();
        let mut agent = agent_with(&[], AgentConfig::default(), &data, out.path());

        let err = agent.run().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    impl GenerativeAgent<ScriptedProvider> {
        fn generator_prompts(&self) -> Vec<String> {
            self.generator
                .provider_ref()
                .user_prompts
                .lock()
                .unwrap()
                .clone()
        }
    }

    #[test]
    fn test_default_config_matches_budgets() {
        let config = AgentConfig::default();
        assert_eq!(config.iterations, 5);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.model_symbol, "Physics");
    }
}
