use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Command-line client for the route refiner API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server status
    Health,
    /// Compute a single route
    Route {
        /// "lat,lng" or an address
        origin: String,
        destination: String,
        #[arg(short, long, default_value = "foot")]
        profile: String,
        /// Area to avoid as "lat,lng,radius"; repeatable
        #[arg(short, long = "avoid")]
        avoid: Vec<String>,
    },
    /// Detect obstacles at one coordinate
    Analyze {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lng: f64,
    },
    /// Run a refinement session from scratch
    Refine {
        origin: String,
        destination: String,
        #[arg(short, long, default_value = "foot")]
        profile: String,
    },
    /// Fetch a finished refinement session
    Session { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Health => client.get(format!("{}/health", base)).send().await?,
        Commands::Route {
            origin,
            destination,
            profile,
            avoid,
        } => {
            client
                .post(format!("{}/api/route", base))
                .json(&json!({
                    "origin": origin,
                    "destination": destination,
                    "profile": profile,
                    "block_areas": avoid,
                }))
                .send()
                .await?
        }
        Commands::Analyze { lat, lng } => {
            client
                .post(format!("{}/api/analyze", base))
                .query(&[("lat", lat), ("lng", lng)])
                .send()
                .await?
        }
        Commands::Refine {
            origin,
            destination,
            profile,
        } => {
            client
                .post(format!("{}/api/refine", base))
                .json(&json!({
                    "origin": origin,
                    "destination": destination,
                    "profile": profile,
                }))
                .send()
                .await?
        }
        Commands::Session { id } => {
            client
                .get(format!("{}/api/refine/{}", base, id))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
