use ssh_mcp::{ToolInfo, TOOL_REGISTRY};
use std::fmt::Write as _;

fn schema_json(tool: &ToolInfo) -> String {
    serde_json::to_string_pretty(&tool.input_schema()).unwrap_or_else(|_| "{}".to_string())
}

fn main() {
    let mut out = String::new();
    let _ = writeln!(out, "# Tools\n");
    let _ = writeln!(
        out,
        "> Auto-generated from `src/tool_registry.rs`. Do not edit by hand."
    );
    let _ = writeln!(
        out,
        "> Regenerate with: `cargo run --bin gen_tools_doc -- docs/TOOLS.md`.\n"
    );

    let _ = writeln!(out, "## Workflow\n");
    let _ = writeln!(
        out,
        "1. `connect_ssh` opens a session to the host configured at startup"
    );
    let _ = writeln!(
        out,
        "2. `execute_command` runs commands over that session, one channel per call"
    );
    let _ = writeln!(out, "3. `disconnect_ssh` closes it\n");

    let _ = writeln!(out, "| Tool | Description |");
    let _ = writeln!(out, "|------|-------------|");
    for tool in TOOL_REGISTRY {
        let _ = writeln!(out, "| `{}` | {} |", tool.name, tool.short_desc);
    }
    let _ = writeln!(out);

    for tool in TOOL_REGISTRY {
        let _ = writeln!(out, "## `{}`\n", tool.name);
        let _ = writeln!(out, "{}\n", tool.full_desc);
        if !tool.args.is_empty() {
            let _ = writeln!(out, "| Argument | Type | Required | Description |");
            let _ = writeln!(out, "|----------|------|----------|-------------|");
            for arg in tool.args {
                let _ = writeln!(
                    out,
                    "| `{}` | {} | {} | {} |",
                    arg.name,
                    arg.kind,
                    if arg.required { "yes" } else { "no" },
                    arg.description
                );
            }
            let _ = writeln!(out);
        }
        let _ = writeln!(out, "Input schema:\n\n```json\n{}\n```\n", schema_json(tool));
        let _ = writeln!(out, "Example arguments: `{}`\n", tool.example);
    }

    let _ = writeln!(out, "## Notes\n");
    let _ = writeln!(
        out,
        "- SSH failures come back as tool results with `isError: true`, not JSON-RPC errors"
    );
    let _ = writeln!(
        out,
        "- Unknown tool names return JSON-RPC error `-32601`; malformed params return `-32602`"
    );

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        if let Err(err) = std::fs::write(&args[1], out) {
            eprintln!("failed to write {}: {}", args[1], err);
            std::process::exit(1);
        }
    } else {
        print!("{out}");
    }
}
