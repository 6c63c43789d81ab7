use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use edge_rewrite::event::{handle_json, EdgeEvent, EdgeRequest};
use edge_rewrite::rewrite::{RequestDescriptor, RewriteEngine, DEFAULT_HOST_SUFFIX};

#[derive(Parser)]
#[command(name = "rewrite-cli")]
#[command(about = "Evaluate the edge URL rewrite rule locally or against a running edge", long_about = None)]
struct Cli {
    /// Suffix identifying the CDN's own default hostnames.
    #[arg(short, long, global = true, default_value = DEFAULT_HOST_SUFFIX)]
    suffix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a single host/uri pair and print the object key
    Rewrite {
        #[arg(long)]
        host: String,
        uri: String,
    },
    /// Apply the rule to an event JSON file ("-" reads stdin)
    Event { file: PathBuf },
    /// POST an event to a running admin API's /invoke endpoint
    Invoke {
        #[arg(short, long, default_value = "http://localhost:8081")]
        url: String,
        #[arg(long)]
        host: String,
        uri: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let engine = RewriteEngine::new(cli.suffix);

    match cli.command {
        Commands::Rewrite { host, uri } => {
            let path = engine.rewrite(RequestDescriptor::new(host, uri))?;
            println!("{path}");
        }
        Commands::Event { file } => {
            let input = if file.as_os_str() == "-" {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                std::fs::read_to_string(&file)?
            };
            let output = handle_json(&engine, &input)?;
            let json: Value = serde_json::from_str(&output)?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Commands::Invoke { url, host, uri } => {
            let event = EdgeEvent::new(EdgeRequest::new(&host, uri));
            let res = reqwest::Client::new()
                .post(format!("{}/invoke", url.trim_end_matches('/')))
                .json(&event)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
