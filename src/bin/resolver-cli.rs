use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "resolver-cli")]
#[command(about = "Management CLI for the configuration resolver", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long, env = "RESOLVER_ADMIN_KEY", default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service status
    Status,
    /// List all configuration entries
    Entries,
    /// Resolve a key (waits at most the resolution budget)
    Get { key: String },
    /// Write a configuration value
    Set {
        key: String,
        value: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List in-flight resolutions
    Tasks,
    /// Cancel an in-flight resolution
    Cancel { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );
    let client = reqwest::Client::builder().default_headers(headers).build()?;

    let res = match cli.command {
        Commands::Status => client.get(format!("{}/admin/status", cli.url)).send().await?,
        Commands::Entries => client.get(format!("{}/admin/entries", cli.url)).send().await?,
        Commands::Get { key } => client.get(format!("{}/admin/config/{}", cli.url, key)).send().await?,
        Commands::Set { key, value, description } => {
            client
                .put(format!("{}/admin/config/{}", cli.url, key))
                .json(&json!({ "value": value, "description": description }))
                .send()
                .await?
        }
        Commands::Tasks => client.get(format!("{}/admin/tasks", cli.url)).send().await?,
        Commands::Cancel { id } => {
            let res = client.delete(format!("{}/admin/tasks/{}", cli.url, id)).send().await?;
            if res.status().is_success() {
                println!("Cancellation requested for task {}", id);
                return Ok(());
            }
            res
        }
    };

    print_response(res).await
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
