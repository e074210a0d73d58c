use std::sync::Arc;

use inbox_triage::input::WorkflowInput;
use inbox_triage::llm::{GeneratorConfig, create_generator};
use inbox_triage::notify::LogNotifier;
use inbox_triage::policy::presets;
use inbox_triage::server;
use inbox_triage::workflow::Orchestrator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Read API key from environment
    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_else(|_| {
        eprintln!("Error: OPENAI_API_KEY not set");
        eprintln!("  export OPENAI_API_KEY=sk-...");
        std::process::exit(1);
    });

    let model = std::env::var("TRIAGE_MODEL").unwrap_or_else(|_| "gpt-5-mini".to_string());

    let port: u16 = std::env::var("TRIAGE_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let preset = std::env::var("TRIAGE_PRESET").unwrap_or_else(|_| "aurora".to_string());
    let policy = presets::by_name(&preset).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let mut config = GeneratorConfig::new(secrecy::SecretString::from(api_key), model.clone());
    if let Ok(base_url) = std::env::var("TRIAGE_BASE_URL") {
        config.base_url = base_url;
    }
    let generator = create_generator(config);

    eprintln!("📬 Inbox Triage v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Company: {}", policy.company.name);
    eprintln!("   Model: {}", model);

    let orchestrator = Arc::new(Orchestrator::new(Arc::new(policy), generator));

    // One-shot mode: --input <file> [--query <text>]
    let args: Vec<String> = std::env::args().collect();
    if let Some(pos) = args.iter().position(|a| a == "--input") {
        let Some(path) = args.get(pos + 1) else {
            eprintln!("Error: --input requires a file path");
            std::process::exit(1);
        };
        let query = args
            .iter()
            .position(|a| a == "--query")
            .and_then(|q| args.get(q + 1))
            .map(String::as_str);

        let input = WorkflowInput::from_file(std::path::Path::new(path), query)?;
        let output = orchestrator.run(input, &LogNotifier).await?;
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    eprintln!("   WS: ws://0.0.0.0:{}/ws", port);
    eprintln!("   API: http://0.0.0.0:{}/api/workflow\n", port);

    server::serve(orchestrator, port).await?;
    Ok(())
}
