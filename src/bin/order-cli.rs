use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "order-cli")]
#[command(about = "Client for the order and user services", long_about = None)]
struct Cli {
    /// Order service base URL
    #[arg(long, default_value = "http://localhost:8080")]
    orders_url: String,

    /// User service base URL
    #[arg(long, default_value = "http://localhost:8081")]
    users_url: String,

    /// Admin API base URL
    #[arg(long, default_value = "http://localhost:9091")]
    admin_url: String,

    #[arg(short, long, default_value = "admin-secret-key")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Place an order
    CreateOrder {
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        product: String,
        #[arg(long, default_value_t = 1)]
        quantity: i64,
        /// Unit price, e.g. 19.99
        #[arg(long)]
        price: String,
    },
    /// List orders, enriched when filtered by user
    ListOrders {
        #[arg(long)]
        user_id: Option<i64>,
    },
    /// Register a user
    CreateUser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
    },
    /// List users
    ListUsers,
    /// Show circuit breaker state
    Breakers,
    /// Force a breaker back to CLOSED
    ResetBreaker { name: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut admin_headers = HeaderMap::new();
    admin_headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let res = match cli.command {
        Commands::CreateOrder {
            user_id,
            product,
            quantity,
            price,
        } => {
            client
                .post(format!("{}/orders", cli.orders_url))
                .json(&json!({
                    "userId": user_id,
                    "productName": product,
                    "quantity": quantity,
                    "price": price,
                }))
                .send()
                .await?
        }
        Commands::ListOrders { user_id } => {
            let mut req = client.get(format!("{}/orders", cli.orders_url));
            if let Some(user_id) = user_id {
                req = req.query(&[("userId", user_id)]);
            }
            req.send().await?
        }
        Commands::CreateUser { email, name } => {
            client
                .post(format!("{}/api/users", cli.users_url))
                .json(&json!({ "email": email, "name": name }))
                .send()
                .await?
        }
        Commands::ListUsers => client.get(format!("{}/api/users", cli.users_url)).send().await?,
        Commands::Breakers => {
            client
                .get(format!("{}/admin/breakers", cli.admin_url))
                .headers(admin_headers)
                .send()
                .await?
        }
        Commands::ResetBreaker { name } => {
            client
                .post(format!("{}/admin/breakers/{}/reset", cli.admin_url, name))
                .headers(admin_headers)
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: request returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let text = res.text().await?;
    if text.is_empty() {
        println!("{}", status);
        return Ok(());
    }
    let json: Value = serde_json::from_str(&text)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
