//! X Post Tool
//!
//! Posts a tweet to X, optionally as a reply (`--reply-to`) or a quote
//! (`--quote` / `--quote-url`), using OAuth 1.0a credentials found in the
//! environment or in an `x-api.json` file.

use std::process;

use log::info;
use x_cli::{
    credential_help_text, load_credentials, parse_post_args, post_help_text, status_url,
    LoadOptions, ParsedArgs, RealFileSystem, XClient,
};

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    let intent = match parse_post_args(&args) {
        Ok(ParsedArgs::Help) => {
            println!("{}", post_help_text());
            return;
        }
        Ok(ParsedArgs::Run(intent)) => intent,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("{}", post_help_text());
            process::exit(1);
        }
    };

    let options = match LoadOptions::from_process() {
        Ok(options) => options.with_config_path(intent.config_path.clone()),
        Err(e) => {
            eprintln!("❌ {}", e);
            process::exit(1);
        }
    };

    let resolved = match load_credentials(&options, &RealFileSystem) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("{}", credential_help_text(e.searched_paths()));
            process::exit(1);
        }
    };
    info!("Using credentials from {}", resolved.source);

    let client = XClient::new(resolved.credentials);
    match client.post_tweet(&intent).await {
        Ok(id) => println!("✅ Posted: {}", status_url(&id)),
        Err(e) => {
            eprintln!("❌ Failed: {}", e);
            if let Some(data) = e.data() {
                eprintln!(
                    "{}",
                    serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
                );
            }
            process::exit(1);
        }
    }
}
