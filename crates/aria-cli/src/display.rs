use std::io::{self, Write};

use aria_core::{ToolStep, TurnDisplay};

const OUTPUT_PREVIEW_CHARS: usize = 200;

/// Renders a turn directly to stdout: tokens as they arrive, tool steps as
/// annotated lines between them.
pub struct StdoutDisplay;

impl TurnDisplay for StdoutDisplay {
    fn stream_token(&mut self, token: &str) {
        print!("{token}");
        let _ = io::stdout().flush();
    }

    fn step_started(&mut self, step: &ToolStep) {
        println!("\n🔧 {} {}", step.name, step.input);
    }

    fn step_updated(&mut self, step: &ToolStep) {
        if let Some(output) = step.output.as_deref() {
            println!("   ↳ {}", preview(output));
        }
    }
}

/// First line of the output, truncated on a char boundary.
fn preview(output: &str) -> String {
    let first_line = output.lines().next().unwrap_or("");
    if first_line.chars().count() <= OUTPUT_PREVIEW_CHARS && first_line.len() == output.len() {
        return first_line.to_string();
    }
    let truncated: String = first_line.chars().take(OUTPUT_PREVIEW_CHARS).collect();
    format!("{truncated}…")
}
