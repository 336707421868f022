use super::types::{RpcError, Tool, ToolResult};
use crate::{
    time::{self, format_timestamp},
    timers::{StartedTimer, TimerStore},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, instrument};

pub const START_TIMER: &str = "start_timer";
pub const STOP_TIMER: &str = "stop_timer";

#[derive(Deserialize)]
struct TaskArguments {
    task: String,
}

fn task_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "task": { "type": "string", "description": description }
        },
        "required": ["task"]
    })
}

pub fn tools() -> Vec<Tool> {
    vec![
        Tool {
            name: START_TIMER,
            description: "Start a timer for a named task. Saves the start time to disk.",
            input_schema: task_schema("Name of the task to time"),
        },
        Tool {
            name: STOP_TIMER,
            description: "Stop a running timer and return the elapsed time in seconds.",
            input_schema: task_schema("Name of the task to stop timing"),
        },
    ]
}

pub fn started_text(started: &StartedTimer) -> String {
    format!(
        "Timer started for \"{}\" at {}.",
        started.task,
        format_timestamp(&started.started_at)
    )
}

/// Timer tools bound to a store
#[derive(Debug)]
pub struct TimerTools<'a>(pub &'a TimerStore);

impl<'a> TimerTools<'a> {
    #[instrument(level = "trace", skip(arguments))]
    pub fn call(&self, name: &str, arguments: Value) -> Result<ToolResult, RpcError> {
        if name != START_TIMER && name != STOP_TIMER {
            return Err(RpcError::invalid_params(format!("Unknown tool: {name}")));
        }

        let TaskArguments { task } = serde_json::from_value(arguments)
            .map_err(|e| RpcError::invalid_params(format!("Invalid arguments for {name}: {e}")))?;
        if task.is_empty() {
            return Err(RpcError::invalid_params("`task` must not be empty"));
        }

        Ok(if name == START_TIMER {
            self.start_timer(&task)
        } else {
            self.stop_timer(&task)
        })
    }

    pub fn start_timer(&self, task: &str) -> ToolResult {
        self.start_timer_at(task, time::now())
    }

    pub fn start_timer_at(&self, task: &str, now: DateTime<Utc>) -> ToolResult {
        match self.0.start_at(task, now) {
            Ok(started) => {
                info!("Started timer for {task}");
                ToolResult::text(started_text(&started))
            }
            Err(e) => {
                error!("Failed to start timer for {task}: {e}");
                ToolResult::error(format!("Failed to start timer for \"{task}\": {e}"))
            }
        }
    }

    pub fn stop_timer(&self, task: &str) -> ToolResult {
        match self.0.stop(task) {
            Ok(Some(stopped)) => {
                info!("Stopped timer for {task} after {}s", stopped.elapsed_seconds);
                match serde_json::to_string_pretty(&stopped) {
                    Ok(text) => ToolResult::text(text),
                    Err(e) => ToolResult::error(format!("Failed to encode timer result: {e}")),
                }
            }
            Ok(None) => ToolResult::error(format!("No running timer found for \"{task}\".")),
            Err(e) => {
                error!("Failed to stop timer for {task}: {e}");
                ToolResult::error(format!("Failed to stop timer for \"{task}\": {e}"))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::{tools, TimerTools, START_TIMER, STOP_TIMER};
    use crate::{
        mcp::types::{Content, INVALID_PARAMS},
        scratch_dir,
        timers::TimerStore,
    };
    use chrono::{DateTime, Utc};
    use serde_json::json;

    fn text_of(result: &crate::mcp::types::ToolResult) -> &str {
        let Content::Text { text } = &result.content[0];
        text
    }

    #[test]
    fn test_catalogue() {
        let names: Vec<_> = tools().iter().map(|t| t.name).collect();
        assert_eq!(names, [START_TIMER, STOP_TIMER]);

        for tool in tools() {
            assert_eq!(tool.input_schema["required"], json!(["task"]));
        }
    }

    #[test]
    fn test_start_then_stop() {
        let dir = scratch_dir("tools-start-stop");
        let store = TimerStore::new(dir.path());
        let tools = TimerTools(&store);

        let started = tools.call(START_TIMER, json!({ "task": "build" })).unwrap();
        assert!(!started.is_error);
        assert!(text_of(&started).starts_with("Timer started for \"build\" at "));

        let stopped = tools.call(STOP_TIMER, json!({ "task": "build" })).unwrap();
        assert!(!stopped.is_error);
        let body: serde_json::Value = serde_json::from_str(text_of(&stopped)).unwrap();
        assert_eq!(body["task"], "build");
        assert!(body["elapsedSeconds"].as_i64().unwrap() >= 0);
        assert!(body["startedAt"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_start_confirmation_text() {
        let dir = scratch_dir("tools-confirmation");
        let store = TimerStore::new(dir.path());
        let now = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let started = TimerTools(&store).start_timer_at("build", now);

        assert!(!started.is_error);
        assert_eq!(
            text_of(&started),
            "Timer started for \"build\" at 2024-01-01T00:00:00Z."
        );
        assert_eq!(store.load().0["build"].started_at, now);
    }

    #[test]
    fn test_started_text_matches_stored_start() {
        let dir = scratch_dir("tools-started-text");
        let store = TimerStore::new(dir.path());

        let started = TimerTools(&store)
            .call(START_TIMER, json!({ "task": "build" }))
            .unwrap();

        let text = text_of(&started);
        let stamp = text
            .strip_prefix("Timer started for \"build\" at ")
            .and_then(|rest| rest.strip_suffix('.'))
            .unwrap();
        let stamp = DateTime::parse_from_rfc3339(stamp).unwrap().with_timezone(&Utc);
        assert_eq!(store.load().0["build"].started_at, stamp);
    }

    #[test]
    fn test_stop_unknown_is_flagged() {
        let dir = scratch_dir("tools-unknown");
        let store = TimerStore::new(dir.path());

        let result = TimerTools(&store)
            .call(STOP_TIMER, json!({ "task": "unknown" }))
            .unwrap();

        assert!(result.is_error);
        assert_eq!(text_of(&result), "No running timer found for \"unknown\".");
        assert!(!store.path().exists());
    }

    #[test]
    fn test_invalid_arguments() {
        let dir = scratch_dir("tools-invalid");
        let store = TimerStore::new(dir.path());
        let tools = TimerTools(&store);

        for arguments in [json!({}), json!({ "task": 3 }), json!({ "task": "" }), json!(null)] {
            let error = tools.call(START_TIMER, arguments).unwrap_err();
            assert_eq!(error.code, INVALID_PARAMS);
        }

        let error = tools.call("pause_timer", json!({ "task": "x" })).unwrap_err();
        assert_eq!(error.code, INVALID_PARAMS);
    }

    #[test]
    fn test_write_fault_is_reported() {
        let dir = scratch_dir("tools-fault");
        std::fs::create_dir_all(dir.path().parent().unwrap()).unwrap();
        // A file where the data directory should be
        std::fs::write(dir.path(), "").unwrap();
        let store = TimerStore::new(dir.path().join("data"));

        let result = TimerTools(&store)
            .call(START_TIMER, json!({ "task": "build" }))
            .unwrap();

        assert!(result.is_error);
        assert!(text_of(&result).starts_with("Failed to start timer for \"build\""));
    }
}
