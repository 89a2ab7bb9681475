use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mcp_viscribe::config::ClientConfig;
use mcp_viscribe::mcp::{self, contracts};
use mcp_viscribe::tools::{self, Toolkit};
use serde_json::{Map, Value, json};
use std::io::{self, BufRead, Write};
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "mcp-viscribe")]
#[command(
    version,
    about = "CLI and MCP server for the Viscribe image-understanding API"
)]
struct Cli {
    /// Viscribe API key (defaults to VISCRIBE_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,
    /// API base URL (defaults to VISCRIBE_BASE_URL, then the public endpoint)
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Request timeout in seconds
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
#[command(
    group(
        clap::ArgGroup::new("image")
            .required(true)
            .multiple(false)
            .args(["url", "base64", "path"])
    )
)]
struct ImageArgs {
    /// URL of the image
    #[arg(long)]
    url: Option<String>,
    /// Base64-encoded image bytes
    #[arg(long)]
    base64: Option<String>,
    /// Path to a local image file
    #[arg(long)]
    path: Option<String>,
}

#[derive(Args, Clone)]
struct DescribeImageArgs {
    #[command(flatten)]
    image: ImageArgs,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
    /// Instruction guiding the description
    #[arg(long)]
    instruction: Option<String>,
    /// Generate tags (true/false)
    #[arg(long)]
    generate_tags: Option<bool>,
}

#[derive(Args, Clone)]
struct ExtractImageArgs {
    #[command(flatten)]
    image: ImageArgs,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
    /// JSON array of fields to extract
    #[arg(long)]
    fields: Option<String>,
    /// JSON object schema for nested extraction
    #[arg(long)]
    advanced_schema: Option<String>,
    /// Instruction guiding the extraction
    #[arg(long)]
    instruction: Option<String>,
}

#[derive(Args, Clone)]
struct ClassifyImageArgs {
    #[command(flatten)]
    image: ImageArgs,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
    /// Class name (repeatable)
    #[arg(long = "class", required = true)]
    classes: Vec<String>,
    /// JSON object mapping class names to descriptions
    #[arg(long)]
    class_descriptions: Option<String>,
    /// Instruction guiding the classification
    #[arg(long)]
    instruction: Option<String>,
    /// Allow more than one class in the result
    #[arg(long)]
    multi_label: bool,
}

#[derive(Args, Clone)]
struct AskImageArgs {
    #[command(flatten)]
    image: ImageArgs,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
    /// Question about the image
    #[arg(long)]
    question: String,
}

#[derive(Args, Clone)]
struct CompareImagesArgs {
    /// URL of the first image
    #[arg(long, conflicts_with_all = ["image1_base64", "image1_path"])]
    image1_url: Option<String>,
    /// Base64 of the first image
    #[arg(long, conflicts_with = "image1_path")]
    image1_base64: Option<String>,
    /// Path to the first image
    #[arg(long)]
    image1_path: Option<String>,
    /// URL of the second image
    #[arg(long, conflicts_with_all = ["image2_base64", "image2_path"])]
    image2_url: Option<String>,
    /// Base64 of the second image
    #[arg(long, conflicts_with = "image2_path")]
    image2_base64: Option<String>,
    /// Path to the second image
    #[arg(long)]
    image2_path: Option<String>,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
    /// Instruction guiding the comparison
    #[arg(long)]
    instruction: Option<String>,
}

#[derive(Args, Clone)]
struct GetCreditsArgs {
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
}

#[derive(Args, Clone)]
struct SubmitFeedbackArgs {
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
    /// request_id returned by an earlier call
    #[arg(long)]
    request_id: String,
    /// Rating from 1 to 5
    #[arg(long)]
    rating: i64,
    /// Free-form feedback
    #[arg(long)]
    feedback_text: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP stdio server
    Serve {
        /// Serve MCP over stdio (NDJSON)
        #[arg(long)]
        stdio: bool,
    },
    /// Describe an image
    DescribeImage(DescribeImageArgs),
    /// Extract structured data from an image
    ExtractImage(ExtractImageArgs),
    /// Classify an image into given classes
    ClassifyImage(ClassifyImageArgs),
    /// Ask a question about an image
    AskImage(AskImageArgs),
    /// Compare two images
    CompareImages(CompareImagesArgs),
    /// Show remaining credits
    GetCredits(GetCreditsArgs),
    /// Rate a previous response
    SubmitFeedback(SubmitFeedbackArgs),
}

fn main() -> Result<()> {
    // A missing .env file is normal; the process environment still applies.
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();

    let toolkit = build_toolkit(&cli)?;

    match cli.command {
        Commands::Serve { stdio } => {
            if stdio {
                run_stdio_server(&toolkit)
            } else {
                anyhow::bail!("only --stdio transport is supported")
            }
        }
        Commands::DescribeImage(args) => {
            let mut map = build_image_args("image", &args.image);
            insert_string(&mut map, "instruction", args.instruction);
            if let Some(generate_tags) = args.generate_tags {
                map.insert("generate_tags".to_string(), json!(generate_tags));
            }
            run_tool(&toolkit, contracts::TOOL_DESCRIBE_IMAGE, map, args.json)
        }
        Commands::ExtractImage(args) => {
            let mut map = build_image_args("image", &args.image);
            insert_string(&mut map, "fields", args.fields);
            insert_string(&mut map, "advanced_schema", args.advanced_schema);
            insert_string(&mut map, "instruction", args.instruction);
            run_tool(&toolkit, contracts::TOOL_EXTRACT_IMAGE, map, args.json)
        }
        Commands::ClassifyImage(args) => {
            let mut map = build_image_args("image", &args.image);
            map.insert("classes".to_string(), json!(args.classes));
            insert_string(&mut map, "class_descriptions", args.class_descriptions);
            insert_string(&mut map, "instruction", args.instruction);
            map.insert("multi_label".to_string(), json!(args.multi_label));
            run_tool(&toolkit, contracts::TOOL_CLASSIFY_IMAGE, map, args.json)
        }
        Commands::AskImage(args) => {
            let mut map = build_image_args("image", &args.image);
            map.insert("question".to_string(), json!(args.question));
            run_tool(&toolkit, contracts::TOOL_ASK_IMAGE, map, args.json)
        }
        Commands::CompareImages(args) => {
            let mut map = Map::new();
            insert_string(&mut map, "image1_url", args.image1_url);
            insert_string(&mut map, "image1_base64", args.image1_base64);
            insert_string(&mut map, "image1_path", args.image1_path);
            insert_string(&mut map, "image2_url", args.image2_url);
            insert_string(&mut map, "image2_base64", args.image2_base64);
            insert_string(&mut map, "image2_path", args.image2_path);
            insert_string(&mut map, "instruction", args.instruction);
            run_tool(&toolkit, contracts::TOOL_COMPARE_IMAGES, map, args.json)
        }
        Commands::GetCredits(args) => {
            run_tool(&toolkit, contracts::TOOL_GET_CREDITS, Map::new(), args.json)
        }
        Commands::SubmitFeedback(args) => {
            let mut map = Map::new();
            map.insert("request_id".to_string(), json!(args.request_id));
            map.insert("rating".to_string(), json!(args.rating));
            insert_string(&mut map, "feedback_text", args.feedback_text);
            run_tool(&toolkit, contracts::TOOL_SUBMIT_FEEDBACK, map, args.json)
        }
    }
}

fn init_tracing() {
    // stdout carries the MCP channel, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn build_toolkit(cli: &Cli) -> Result<Toolkit> {
    let mut config = ClientConfig::from_env(cli.api_key.as_deref(), cli.base_url.as_deref())?;
    if let Some(timeout_secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(timeout_secs));
    }
    tracing::debug!(base_url = config.base_url(), "resolved client configuration");
    Ok(Toolkit::from_config(config)?)
}

fn build_image_args(slot: &str, image: &ImageArgs) -> Map<String, Value> {
    let mut map = Map::new();
    insert_string(&mut map, &format!("{slot}_url"), image.url.clone());
    insert_string(&mut map, &format!("{slot}_base64"), image.base64.clone());
    insert_string(&mut map, &format!("{slot}_path"), image.path.clone());
    map
}

fn insert_string(map: &mut Map<String, Value>, key: &str, value: Option<String>) {
    if let Some(value) = value {
        map.insert(key.to_string(), json!(value));
    }
}

fn run_tool(toolkit: &Toolkit, name: &str, args: Map<String, Value>, json_output: bool) -> Result<()> {
    let result = toolkit.call(name, &Value::Object(args));
    print_tool_result(result, json_output)
}

fn print_tool_result(result: Value, json_output: bool) -> Result<()> {
    let is_error = result
        .get("isError")
        .and_then(|value| value.as_bool())
        .unwrap_or(false);

    if is_error {
        let message = result
            .get("structuredContent")
            .and_then(|value| value.get("error"))
            .and_then(|value| value.get("message"))
            .and_then(|value| value.as_str())
            .unwrap_or("tool error");
        eprintln!("{message}");
        process::exit(1);
    }

    if json_output {
        let structured = result
            .get("structuredContent")
            .cloned()
            .unwrap_or_else(|| json!({}));
        let output = serde_json::to_string_pretty(&structured)?;
        println!("{output}");
        return Ok(());
    }

    let text = result
        .get("content")
        .and_then(|value| value.as_array())
        .and_then(|arr| arr.first())
        .and_then(|value| value.get("text"))
        .and_then(|value| value.as_str())
        .unwrap_or("");
    println!("{text}");
    Ok(())
}

fn run_stdio_server(toolkit: &Toolkit) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let reader = stdin.lock().lines();
    let mut writer = io::BufWriter::new(stdout.lock());

    for line in reader {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let request: Value = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unparseable request line");
                continue;
            }
        };

        let method = request.get("method").and_then(|value| value.as_str());
        let id = request.get("id").cloned();
        let response = match (method, id) {
            (Some("initialize"), Some(id)) => Some(json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {
                    "protocolVersion": mcp::PROTOCOL_VERSION,
                    "capabilities": {
                        "tools": {}
                    },
                    "serverInfo": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }
            })),
            (Some("tools/list"), Some(id)) => Some(json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {
                    "tools": mcp::tool_definitions(toolkit)
                }
            })),
            (Some("tools/call"), Some(id)) => {
                let result = handle_tool_call(toolkit, &request);
                Some(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "result": result
                }))
            }
            _ => None,
        };

        if let Some(response) = response {
            let serialized =
                serde_json::to_string(&response).context("failed to serialize response")?;
            writeln!(writer, "{serialized}").context("failed to write response")?;
            writer.flush().context("failed to flush response")?;
        }
    }

    Ok(())
}

fn handle_tool_call(toolkit: &Toolkit, request: &Value) -> Value {
    let params = request.get("params");
    let Some(params) = params.and_then(|value| value.as_object()) else {
        return tools::error_result(&mcp_viscribe::ToolError::validation(
            "params must be an object",
        ));
    };

    let name = params.get("name").and_then(|value| value.as_str());
    let Some(name) = name else {
        return tools::error_result(&mcp_viscribe::ToolError::validation(
            "params.name must be a string",
        ));
    };

    let args = params
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| json!({}));

    tracing::debug!(tool = name, "tools/call");
    toolkit.call(name, &args)
}
