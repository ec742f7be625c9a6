use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::{Client, Response};
use serde_json::{Value, json};

#[derive(Parser, Debug)]
#[command(name = "package-tracker-cli")]
#[command(about = "CLI for interacting with the package tracker server", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(short, long, env = "PACKAGE_TRACKER_URL", default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all packages
    List,

    /// Show a package and its history
    Get {
        /// Package code
        code: String,
    },

    /// Register a package
    Create {
        /// Package title, at least 10 characters
        title: String,
        /// Weight, must be positive
        weight: f64,
        /// Name of the person to notify
        #[arg(long, default_value = "")]
        sender_name: String,
        /// Address that receives the dispatch email
        #[arg(long, default_value = "")]
        sender_email: String,
    },

    /// Append a status update
    Update {
        /// Package code
        code: String,
        /// Free-form status text
        status: String,
        /// Mark the package as delivered
        #[arg(long)]
        delivered: bool,
    },

    /// Delete a package
    Delete {
        /// Package code
        code: String,
    },
}

struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn packages_url(&self) -> String {
        format!("{}/api/packages", self.base_url)
    }

    fn package_url(&self, code: &str) -> String {
        format!("{}/{}", self.packages_url(), code)
    }

    async fn run(&self, command: &Commands) -> Result<Option<Value>> {
        let response = match command {
            Commands::List => self.client.get(self.packages_url()).send().await,
            Commands::Get { code } => self.client.get(self.package_url(code)).send().await,
            Commands::Create {
                title,
                weight,
                sender_name,
                sender_email,
            } => {
                self.client
                    .post(self.packages_url())
                    .json(&json!({
                        "title": title,
                        "weight": weight,
                        "senderName": sender_name,
                        "senderEmail": sender_email,
                    }))
                    .send()
                    .await
            }
            Commands::Update {
                code,
                status,
                delivered,
            } => {
                self.client
                    .post(format!("{}/updates", self.package_url(code)))
                    .json(&json!({ "status": status, "delivered": delivered }))
                    .send()
                    .await
            }
            Commands::Delete { code } => self.client.delete(self.package_url(code)).send().await,
        }
        .with_context(|| format!("Failed to reach {}", self.base_url))?;

        read_body(response).await
    }
}

/// Returns the JSON body, `None` for empty success responses
async fn read_body(response: Response) -> Result<Option<Value>> {
    let status = response.status();
    let text = response.text().await.context("Failed to read response")?;

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(text);
        anyhow::bail!("Server returned {}: {}", status, message);
    }

    if text.trim().is_empty() {
        return Ok(None);
    }

    let body = serde_json::from_str(&text).context("Server returned invalid JSON")?;
    Ok(Some(body))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = ApiClient::new(&cli.url);

    match client.run(&cli.command).await? {
        Some(body) => println!("{}", serde_json::to_string_pretty(&body)?),
        None => println!("OK"),
    }

    Ok(())
}
