//! Connectivity check for the Gemini API
//! This is a utility binary, not part of the main application

use pdf_chat_backend::config::Config;
use pdf_chat_backend::generation::GeminiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "What is 2+2? Answer in one sentence.".to_string());

    println!("Testing Gemini API from Rust...\n");

    println!("1. Checking for GOOGLE_API_KEY environment variable...");
    match config.gemini.api_key.as_deref() {
        Some(key) => println!("   ✓ API key is set (length: {} chars)", key.len()),
        None => {
            eprintln!("   ✗ GOOGLE_API_KEY not found in environment");
            eprintln!("   Export it or add it to a .env file");
            anyhow::bail!("API key missing");
        }
    }

    println!("\n2. Sending test prompt to {}...", config.gemini.model);
    println!("   Prompt: '{}'", prompt);

    let client = GeminiClient::new(&config.gemini)?;
    match client.generate_content(&prompt).await {
        Ok(reply) => {
            println!("   ✓ Response received:");
            println!("   {}", reply.trim());
        }
        Err(e) => {
            eprintln!("   ✗ Request failed: {}", e);
            return Err(e.into());
        }
    }

    println!("\n✓ All checks completed!");
    Ok(())
}
