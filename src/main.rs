use clap::Parser;
use ddtools::app::App;
use ddtools::errors::ToolError;
use ddtools::utils::paths::resolve_store_info;
use serde_json::Value;
use std::io::Read;

/// Value helpers, item collections, a two-tier cache and table storage as JSON tools.
#[derive(Debug, Parser)]
#[command(name = "ddtools", version)]
struct Cli {
    /// Tool to call: objects, collection, cache, response or storage.
    tool: Option<String>,

    /// Arguments as a JSON object; read from stdin when omitted.
    #[arg(long)]
    args: Option<String>,

    /// Print compact JSON.
    #[arg(long)]
    compact: bool,

    /// List the available tools and exit.
    #[arg(long)]
    list: bool,

    /// Print the resolved cache directory, database path and table prefix.
    #[arg(long)]
    info: bool,
}

fn read_args(raw: Option<String>) -> Result<Value, ToolError> {
    let raw = match raw {
        Some(raw) => raw,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    if raw.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    Ok(serde_json::from_str(&raw)?)
}

fn render(value: &Value, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    rendered.unwrap_or_else(|_| value.to_string())
}

fn run(cli: Cli) -> Result<Value, ToolError> {
    if cli.info {
        return Ok(resolve_store_info());
    }
    let app = App::initialize()?;
    if cli.list {
        return Ok(serde_json::json!({ "tools": app.tool_executor.tool_names() }));
    }
    let tool = cli.tool.ok_or_else(|| {
        ToolError::invalid_params("tool is required")
            .with_hint("Run `ddtools --list` to see the available tools.")
    })?;
    let args = read_args(cli.args)?;
    app.handle(&tool, args)
}

fn main() {
    let cli = Cli::parse();
    let compact = cli.compact;
    match run(cli) {
        Ok(value) => println!("{}", render(&value, compact)),
        Err(err) => {
            let payload = serde_json::json!({ "error": err });
            println!("{}", render(&payload, compact));
            std::process::exit(1);
        }
    }
}
