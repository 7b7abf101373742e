//! X Delete Tool
//!
//! Deletes one or more tweets by id. Every id is attempted in order; the
//! process exits non-zero if any deletion failed.

use std::process;

use log::info;
use x_cli::{
    credential_help_text, delete_help_text, load_credentials, parse_delete_args, LoadOptions,
    ParsedArgs, RealFileSystem, XClient,
};

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    let intent = match parse_delete_args(&args) {
        Ok(ParsedArgs::Help) => {
            println!("{}", delete_help_text());
            return;
        }
        Ok(ParsedArgs::Run(intent)) => intent,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("{}", delete_help_text());
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
    let mut has_failures = false;
    for tweet_id in &intent.tweet_ids {
        match client.delete_tweet(tweet_id).await {
            Ok(()) => println!("✅ Deleted: {}", tweet_id),
            Err(e) => {
                has_failures = true;
                eprintln!("❌ Failed to delete {}: {}", tweet_id, e);
                if let Some(data) = e.data() {
                    eprintln!(
                        "{}",
                        serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
                    );
                }
            }
        }
    }

    if has_failures {
        process::exit(1);
    }
}
