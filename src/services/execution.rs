use super::provider::ModelRequest;
use crate::{
    core::{
        agent::Agent,
        steps::AgentStep,
        tool_call::{ToolCall, ToolExecution, ToolOutput},
    },
    error::{AgentError, Result},
    types::result::{RunResult, TokenUsage},
};
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

impl Agent {
    /// Send `prompt` and return the model's final reply
    pub async fn run(&mut self, prompt: &str) -> Result<String> {
        self.run_with_steps(prompt).await.map(|result| result.output)
    }

    /// Send `prompt` and return the reply together with the steps of this run.
    ///
    /// On error the conversation is restored to what it was before the call.
    pub async fn run_with_steps(&mut self, prompt: &str) -> Result<RunResult> {
        let checkpoint = self.memory().step_count();
        let result = self.drive(prompt, checkpoint).await;
        match &result {
            Ok(run) => {
                debug!(target: "agent_playground::steps", "{}", run.replay());
                trace!(target: "agent_playground::steps", "{}", run.explain());
            }
            Err(err) => {
                warn!(provider = self.provider_name(), error = %err, "agent run failed");
                self.memory_mut().truncate(checkpoint);
            }
        }
        result
    }

    async fn drive(&mut self, prompt: &str, checkpoint: usize) -> Result<RunResult> {
        let start_time = Instant::now();
        let tools = self.function_factory().tool_specs();
        let mut usage: Option<TokenUsage> = None;

        self.memory_mut().add_step(AgentStep::Task {
            content: prompt.to_string(),
        });

        for iteration in 1..=self.max_iterations() {
            debug!(iteration, provider = self.provider_name(), "calling model");

            let request = ModelRequest {
                system_prompt: self.memory().system_prompt(),
                steps: self.memory().steps(),
                tools: &tools,
                params: self.params(),
            };
            let response = timeout(self.timeout(), self.provider().converse(&request))
                .await
                .map_err(|_| {
                    AgentError::Timeout(format!(
                        "{} API call timed out after {}s",
                        self.provider_name(),
                        self.timeout().as_secs()
                    ))
                })??;

            if let Some(call_usage) = &response.usage {
                usage.get_or_insert_with(TokenUsage::default).add(call_usage);
            }

            if !response.has_tool_calls() {
                let answer = response.text.unwrap_or_default();
                self.memory_mut().add_step(AgentStep::FinalAnswer {
                    answer: answer.clone(),
                });
                let steps = self.memory().steps()[checkpoint..].to_vec();
                return Ok(RunResult::new(
                    answer,
                    steps,
                    usage,
                    start_time.elapsed(),
                    iteration,
                ));
            }

            let calls = response.tool_calls;
            self.memory_mut().add_step(AgentStep::Action {
                thought: response.text,
                calls: calls.clone(),
            });

            let mut outputs = Vec::with_capacity(calls.len());
            for call in calls {
                outputs.push(self.execute_tool_call(call).await);
            }
            self.memory_mut().add_step(AgentStep::Observation { outputs });
        }

        Err(AgentError::MaxIterations(self.max_iterations()))
    }

    /// Run one tool call. Failures become an error payload for the model to
    /// read rather than aborting the run.
    async fn execute_tool_call(&self, call: ToolCall) -> ToolOutput {
        let name = call.name.clone();
        let arguments = call.arguments.clone();
        let execution = ToolExecution::start(call);

        match self
            .function_factory()
            .execute_function(&name, arguments)
            .await
        {
            Ok(result) => execution.complete(result),
            Err(err) => {
                warn!(tool = %name, error = %err, "tool call failed");
                execution.complete_with_error(err.to_error_payload())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        core::{agent::Agent, steps::AgentStep, tool_call::ToolCall},
        error::{AgentError, Result},
        services::provider::{ModelProvider, ModelRequest, ModelResponse},
        tools::{FunctionFactory, SimpleCalculatorTool, WeatherTool},
        types::result::TokenUsage,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
        time::Duration,
    };

    /// Replays canned responses in order
    #[derive(Debug)]
    struct ScriptedProvider {
        responses: Mutex<VecDeque<Result<ModelResponse>>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<Result<ModelResponse>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
            }
        }
    }

    #[async_trait]
    impl ModelProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "Scripted"
        }

        fn model_id(&self) -> &str {
            "scripted-1"
        }

        async fn converse(&self, _request: &ModelRequest<'_>) -> Result<ModelResponse> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ModelResponse::text("out of script")))
        }
    }

    /// Collects formatted log output for assertions
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn factory() -> FunctionFactory {
        FunctionFactory::new()
            .with_tool(SimpleCalculatorTool)
            .with_tool(WeatherTool)
    }

    #[tokio::test]
    async fn tool_calls_are_executed_and_fed_back() {
        let provider = ScriptedProvider::new(vec![
            Ok(ModelResponse::tool_calls(vec![
                ToolCall::new("c1", "simple_calculator", json!({"expression": "15 * 3 + 7"})),
                ToolCall::new("c2", "get_weather_info", json!({"city": "Cairo"})),
            ])
            .with_usage(TokenUsage::new(10, 5))),
            Ok(ModelResponse::text("52, and Cairo is sunny").with_usage(TokenUsage::new(20, 6))),
        ]);
        let mut agent = Agent::new(provider, factory());

        let result = agent.run_with_steps("Compute and check weather").await.unwrap();

        assert_eq!(result.output, "52, and Cairo is sunny");
        assert_eq!(result.iterations, 2);
        assert_eq!(result.tokens, Some(TokenUsage::new(30, 11)));
        assert_eq!(result.steps.len(), 4);
        match &result.steps[2] {
            AgentStep::Observation { outputs } => {
                assert_eq!(outputs[0].as_string(), "Result: 52");
                assert_eq!(outputs[1].as_string(), "Sunny, 28°C");
                assert!(outputs.iter().all(|output| !output.is_error));
            }
            other => panic!("expected observation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn tool_failures_do_not_abort_the_run() {
        let provider = ScriptedProvider::new(vec![
            Ok(ModelResponse::tool_calls(vec![
                ToolCall::new("c1", "python_repl", json!({"code": "1"})),
                ToolCall::new("c2", "simple_calculator", json!({})),
            ])),
            Ok(ModelResponse::text("I could not do that")),
        ]);
        let mut agent = Agent::new(provider, factory());

        let result = agent.run_with_steps("try things").await.unwrap();
        let errors = result.errors();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("TOOL_NOT_FOUND"));
        assert!(errors[1].contains("VALIDATION_ERROR"));
        assert_eq!(result.output, "I could not do that");
    }

    #[tokio::test]
    async fn history_carries_over_between_runs() {
        let provider = ScriptedProvider::new(vec![
            Ok(ModelResponse::text("Hello!")),
            Ok(ModelResponse::text("You said hi.")),
        ]);
        let mut agent = Agent::new(provider, factory());

        assert_eq!(agent.run("hi").await.unwrap(), "Hello!");
        assert_eq!(agent.run("what did I say?").await.unwrap(), "You said hi.");
        assert_eq!(agent.memory().step_count(), 4);

        agent.reset();
        assert!(agent.memory().is_empty());
    }

    #[tokio::test]
    async fn failed_runs_roll_back_memory() {
        let provider = ScriptedProvider::new(vec![
            Ok(ModelResponse::text("first")),
            Ok(ModelResponse::tool_calls(vec![ToolCall::new(
                "c1",
                "get_weather_info",
                json!({"city": "Dubai"}),
            )])),
            Err(AgentError::provider("Scripted", 500, "boom")),
        ]);
        let mut agent = Agent::new(provider, factory());

        agent.run("one").await.unwrap();
        let err = agent.run("two").await.unwrap_err();
        assert!(matches!(err, AgentError::Provider { status: 500, .. }));
        assert_eq!(agent.memory().step_count(), 2);
    }

    #[tokio::test]
    async fn iteration_cap_is_enforced() {
        let looping = (0..5)
            .map(|i| {
                Ok(ModelResponse::tool_calls(vec![ToolCall::new(
                    format!("c{}", i),
                    "simple_calculator",
                    json!({"expression": "1+1"}),
                )]))
            })
            .collect();
        let mut agent =
            Agent::new(ScriptedProvider::new(looping), factory()).with_max_iterations(3);

        let err = agent.run("loop forever").await.unwrap_err();
        assert!(matches!(err, AgentError::MaxIterations(3)));
        assert!(agent.memory().is_empty());
    }

    #[derive(Debug)]
    struct SlowProvider;

    #[async_trait]
    impl ModelProvider for SlowProvider {
        fn name(&self) -> &'static str {
            "Slow"
        }

        fn model_id(&self) -> &str {
            "slow-1"
        }

        async fn converse(&self, _request: &ModelRequest<'_>) -> Result<ModelResponse> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(ModelResponse::text("late"))
        }
    }

    #[tokio::test]
    async fn slow_providers_time_out() {
        let mut agent =
            Agent::new(SlowProvider, factory()).with_timeout(Duration::from_millis(20));
        let err = agent.run("hurry").await.unwrap_err();
        assert!(matches!(err, AgentError::Timeout(_)));
        assert!(err.to_string().contains("Slow API call timed out"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn finished_runs_log_their_trace() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let provider = ScriptedProvider::new(vec![Ok(ModelResponse::text("Done"))]);
        let mut agent = Agent::new(provider, factory());
        agent.run("hello").await.unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("=== Agent Execution Trace ==="));
        assert!(output.contains("=== Agent Execution Explanation ==="));
        assert!(output.contains("Content: hello"));
    }
}
