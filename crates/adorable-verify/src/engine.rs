//! Schema-based tool-argument validator for the Adorable runtime.
//!
//! `SchemaValidator` implements the `ArgumentValidator` trait from
//! `adorable-core`. Validation runs in two phases:
//!
//! 1. **Structural** — the arguments are validated against
//!    `ToolName::parameters_schema` using the `jsonschema` crate.
//! 2. **Semantic** — built-in rules for the tool, then every registered
//!    custom rule. All failures are collected before returning so the model
//!    sees the full failure set in one tool result.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use adorable_contracts::{
    error::AdorableResult,
    tool::ToolName,
    validate::{ValidationFailure, ValidationReport},
};
use adorable_core::traits::ArgumentValidator;

/// A caller-supplied validation function.
///
/// Receives the tool and its raw arguments. Returns `Some(message)` when the
/// check fails, or `None` on success.
pub type CustomRuleFn = Box<dyn Fn(ToolName, &Value) -> Option<String> + Send + Sync>;

/// Rule id for structural failures.
pub const SCHEMA_RULE: &str = "json-schema";
/// Rule id for blank `terminal` commands.
pub const BLANK_COMMAND_RULE: &str = "blank-command";
/// Rule id for paths that escape the project root.
pub const RELATIVE_PATH_RULE: &str = "relative-path";

/// The Adorable tool-argument validator.
pub struct SchemaValidator {
    /// Named custom rules, evaluated in name order after the built-ins.
    custom_rules: HashMap<String, CustomRuleFn>,
}

impl SchemaValidator {
    /// Create a validator with only the built-in rules.
    pub fn new() -> Self {
        Self {
            custom_rules: HashMap::new(),
        }
    }

    /// Register a custom rule under `name`. Registering the same name twice
    /// replaces the previous function.
    pub fn register_rule(&mut self, name: impl Into<String>, f: CustomRuleFn) {
        self.custom_rules.insert(name.into(), f);
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    /// Paths the call touches, whatever shape `files` has.
    fn paths(tool: ToolName, arguments: &Value) -> Vec<&str> {
        let Some(files) = arguments.get("files").and_then(Value::as_array) else {
            return Vec::new();
        };
        match tool {
            ToolName::WriteFiles => files
                .iter()
                .filter_map(|entry| entry.get("path").and_then(Value::as_str))
                .collect(),
            ToolName::ReadFiles => files.iter().filter_map(Value::as_str).collect(),
            ToolName::RunCommand => Vec::new(),
        }
    }

    /// Why `path` is not a usable project-relative path, if it is not.
    fn check_path(path: &str) -> Option<String> {
        if path.trim().is_empty() {
            return Some("file path must not be empty".to_string());
        }
        if path.starts_with('/') || path.starts_with('~') || path.starts_with('\\') {
            return Some(format!("path '{path}' must be relative to the project root"));
        }
        if path.split(['/', '\\']).any(|segment| segment == "..") {
            return Some(format!("path '{path}' must not contain '..'"));
        }
        None
    }

    fn builtin_failures(tool: ToolName, arguments: &Value) -> Vec<ValidationFailure> {
        let mut failures = Vec::new();
        match tool {
            ToolName::RunCommand => {
                if let Some(command) = arguments.get("command").and_then(Value::as_str) {
                    if command.trim().is_empty() {
                        failures.push(ValidationFailure {
                            rule_id: BLANK_COMMAND_RULE.to_string(),
                            message: "command must not be blank".to_string(),
                        });
                    }
                }
            }
            ToolName::WriteFiles | ToolName::ReadFiles => {
                for path in Self::paths(tool, arguments) {
                    if let Some(message) = Self::check_path(path) {
                        failures.push(ValidationFailure {
                            rule_id: RELATIVE_PATH_RULE.to_string(),
                            message,
                        });
                    }
                }
            }
        }
        failures
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ArgumentValidator for SchemaValidator {
    /// Validate `arguments` for `tool`.
    ///
    /// Runs structural validation first, then every semantic rule. All
    /// failures are accumulated into one report.
    fn validate(&self, tool: ToolName, arguments: &Value) -> AdorableResult<ValidationReport> {
        let mut failures: Vec<ValidationFailure> = Vec::new();

        // ── Phase 1: JSON Schema structural validation ────────────────────────
        let schema = tool.parameters_schema();
        match jsonschema::validator_for(&schema) {
            Ok(validator) => {
                for error in validator.iter_errors(arguments) {
                    let message = format!("invalid arguments at '{}': {}", error.instance_path, error);
                    warn!(tool = %tool, %message, "structural validation failure");
                    failures.push(ValidationFailure {
                        rule_id: SCHEMA_RULE.to_string(),
                        message,
                    });
                }
            }
            Err(e) => {
                let message = format!("invalid parameter schema for '{tool}': {e}");
                warn!(tool = %tool, %message, "schema compilation failure");
                failures.push(ValidationFailure {
                    rule_id: SCHEMA_RULE.to_string(),
                    message,
                });
            }
        }

        // ── Phase 2: semantic rules ───────────────────────────────────────────
        failures.extend(Self::builtin_failures(tool, arguments));

        let mut names: Vec<&String> = self.custom_rules.keys().collect();
        names.sort();
        for name in names {
            debug!(tool = %tool, rule_id = %name, "evaluating custom rule");
            if let Some(message) = self.custom_rules[name](tool, arguments) {
                warn!(tool = %tool, rule_id = %name, %message, "custom rule failed");
                failures.push(ValidationFailure {
                    rule_id: name.clone(),
                    message,
                });
            }
        }

        debug!(tool = %tool, failure_count = failures.len(), "validation complete");
        Ok(ValidationReport::from_failures(failures))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
