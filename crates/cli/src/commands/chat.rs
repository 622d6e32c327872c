use synthai_agent::AgentRuntime;

use crate::commands::{current_thread_runtime, load_config, to_data, CommandResult};

const COMMAND: &str = "chat";

/// Sends one message through the dispatcher. History lives only for this process.
pub fn run(sender_id: &str, message: &str) -> CommandResult {
    if sender_id.trim().is_empty() {
        return CommandResult::failure(COMMAND, "validation", "sender is required", 1);
    }
    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let agent = match AgentRuntime::from_config(&config) {
        Ok(agent) => agent,
        Err(error) => {
            return CommandResult::failure(COMMAND, "prompt_templates", error.to_string(), 4)
        }
    };
    let runtime = match current_thread_runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let outcome = runtime.block_on(agent.handle_message(message, sender_id.trim()));
    match to_data(COMMAND, &outcome) {
        Ok(value) => CommandResult::success_with(COMMAND, outcome.intent.as_str(), Some(value)),
        Err(result) => result,
    }
}
