//! The system prompt given to the code agent on every turn.
//!
//! Tool names and the completion delimiters are interpolated from the same
//! constants the registry and the completion parser use.

use adorable_contracts::{
    completion::{SUMMARY_CLOSE, SUMMARY_OPEN},
    tool::ToolName,
};

/// Build the system prompt for the code agent whose preview server listens
/// on `preview_port`.
pub fn system_prompt(preview_port: u16) -> String {
    let tools = ToolName::ALL
        .iter()
        .map(|tool| format!("- `{}`: {}", tool.as_str(), tool.description()))
        .collect::<Vec<_>>()
        .join("\n");
    let names = ToolName::ALL
        .iter()
        .map(|tool| format!("`{}`", tool.as_str()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are a senior Next.js engineer working inside a sandboxed Next.js project.\n\
         You write readable, maintainable, executable React components.\n\
         \n\
         Environment:\n\
         - The development server is already running on port {preview_port} with hot reload.\n\
         - Never start, restart, or build the server yourself.\n\
         - Install packages with `npm install <package> --yes` before importing them.\n\
         - All file paths you write or read are relative to the project root \
           (for example `app/page.tsx`). Never use absolute paths or `..`.\n\
         - Add \"use client\" to the top of any file that uses React hooks or browser APIs.\n\
         \n\
         Tools (these are the only tools that exist):\n\
         {tools}\n\
         \n\
         You may call only {names}. Calling any other tool name fails. \
         Do not write tool-call syntax, special tokens, or markup that imitates them \
         in your messages; request tools only through the tool-calling interface.\n\
         \n\
         Build complete, production-quality features: real state handling, \
         accessible markup, and Tailwind CSS for styling. Split large UIs into \
         components under `app/`.\n\
         \n\
         When, and only when, the task is fully complete, reply with a final \
         message containing exactly one summary block and nothing after it:\n\
         \n\
         {SUMMARY_OPEN}\n\
         A short, high-level description of what you created or changed.\n\
         {SUMMARY_CLOSE}\n\
         \n\
         Do not emit this block early, inside code, or more than once. \
         Without it the task is treated as unfinished."
    )
}

#[cfg(test)]
mod tests {
    use adorable_contracts::{
        completion::{parse_completion, CompletionSignal, SUMMARY_CLOSE, SUMMARY_OPEN},
        tool::ToolName,
    };

    use super::system_prompt;

    #[test]
    fn test_prompt_names_every_tool() {
        let prompt = system_prompt(3000);
        for tool in ToolName::ALL {
            assert!(prompt.contains(tool.as_str()), "prompt must advertise {}", tool);
        }
    }

    #[test]
    fn test_prompt_documents_marker_contract() {
        let prompt = system_prompt(3000);
        assert!(prompt.contains(SUMMARY_OPEN));
        assert!(prompt.contains(SUMMARY_CLOSE));
        // The example block in the prompt must itself parse as a completion.
        assert!(matches!(parse_completion(&prompt), CompletionSignal::Complete(_)));
    }

    #[test]
    fn test_prompt_uses_configured_port() {
        let prompt = system_prompt(4321);
        assert!(prompt.contains("running on port 4321"));
        assert!(!prompt.contains("port 3000"));
    }
}
