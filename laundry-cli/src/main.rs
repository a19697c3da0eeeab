//! Laundry CLI
//!
//! Command-line interface for the laundry point-of-sale API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use laundry_client::LaundryClient;
use laundry_types::{
    CustomerId, CustomerRequest, LineItemRequest, Money, ServiceId, ServiceRequest, TransactionId,
    UpdateTransactionRequest,
};

#[derive(Parser)]
#[command(name = "laundry")]
#[command(author, version, about = "Laundry point-of-sale CLI client", long_about = None)]
struct Cli {
    /// Base URL of the laundry API
    #[arg(
        long,
        env = "LAUNDRY_API_URL",
        default_value = "http://localhost:8082"
    )]
    api_url: String,

    /// Bearer token from `laundry login`
    #[arg(long, env = "LAUNDRY_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register an account (the first one becomes admin)
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in and print a token for LAUNDRY_TOKEN
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Revoke the current token
    Logout,
    /// Service catalog operations
    Service {
        #[command(subcommand)]
        action: ServiceCommands,
    },
    /// Customer operations
    Customer {
        #[command(subcommand)]
        action: CustomerCommands,
    },
    /// Transaction operations
    Transaction {
        #[command(subcommand)]
        action: TransactionCommands,
    },
    /// Payment operations
    Payment {
        #[command(subcommand)]
        action: PaymentCommands,
    },
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum ServiceCommands {
    /// Add a service to the catalog (admin)
    Create {
        /// Service name
        name: String,
        /// Price per unit in rupiah
        #[arg(long)]
        price: i64,
        #[arg(long, default_value = "kg")]
        unit: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Get service details
    Get {
        /// Service ID (UUID)
        id: String,
    },
    /// Replace a service (admin)
    Update {
        /// Service ID (UUID)
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: i64,
        #[arg(long, default_value = "kg")]
        unit: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Delete a service (admin)
    Delete {
        /// Service ID (UUID)
        id: String,
    },
    /// List the catalog
    List,
}

#[derive(Subcommand)]
enum CustomerCommands {
    /// Add a customer
    Create {
        /// Full name
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
    },
    /// Get customer details
    Get {
        /// Customer ID (UUID)
        id: String,
    },
    /// Replace a customer's details
    Update {
        /// Customer ID (UUID)
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
    },
    /// Delete a customer
    Delete {
        /// Customer ID (UUID)
        id: String,
    },
    /// List customers
    List,
}

#[derive(Subcommand)]
enum TransactionCommands {
    /// Create a transaction priced from the current catalog
    Create {
        /// Customer ID (UUID)
        #[arg(long)]
        customer: String,
        /// Line item as SERVICE_ID:QTY (repeatable)
        #[arg(long = "item", required = true, value_parser = parse_item)]
        items: Vec<LineItemRequest>,
        #[arg(long)]
        payment_method: Option<String>,
    },
    /// Get transaction details
    Get {
        /// Transaction ID (UUID)
        id: String,
    },
    /// Re-price a transaction with new line items
    Update {
        /// Transaction ID (UUID)
        id: String,
        /// Move the transaction to another customer
        #[arg(long)]
        customer: Option<String>,
        /// Line item as SERVICE_ID:QTY (repeatable)
        #[arg(long = "item", required = true, value_parser = parse_item)]
        items: Vec<LineItemRequest>,
        #[arg(long)]
        payment_method: Option<String>,
    },
    /// Delete a transaction
    Delete {
        /// Transaction ID (UUID)
        id: String,
    },
    /// List transactions
    List,
}

#[derive(Subcommand)]
enum PaymentCommands {
    /// Open a gateway payment session for a transaction
    Create {
        /// Transaction ID (UUID)
        #[arg(long)]
        transaction: String,
        /// Order ID to send to the gateway (generated when omitted)
        #[arg(long)]
        order_id: Option<String>,
    },
    /// Get a payment by order ID
    Get {
        order_id: String,
    },
    /// List payments
    List,
    /// Deliver a gateway notification for an order (testing)
    Notify {
        order_id: String,
        /// Gateway status, e.g. settlement, expire, deny
        #[arg(long, default_value = "settlement")]
        status: String,
    },
}

fn parse_id<T: std::str::FromStr>(s: &str, what: &str) -> Result<T> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid {} ID: {}", what, s))
}

fn parse_item(s: &str) -> Result<LineItemRequest, String> {
    let (service, quantity) = s
        .split_once(':')
        .ok_or_else(|| format!("expected SERVICE_ID:QTY, got {}", s))?;

    let service_id: ServiceId = service
        .parse()
        .map_err(|_| format!("invalid service ID: {}", service))?;
    let quantity: i64 = quantity
        .parse()
        .map_err(|_| format!("invalid quantity: {}", quantity))?;

    Ok(LineItemRequest {
        service_id,
        quantity,
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut client = LaundryClient::new(&cli.api_url);
    if let Some(token) = cli.token {
        client = client.with_token(token);
    }

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Register { username, password } => {
            print_json(&client.register(&username, &password).await?)?;
        }
        Commands::Login { username, password } => {
            let session = client.login(&username, &password).await?;
            eprintln!("Signed in as {} ({})", username, session.role);
            println!("{}", session.token);
        }
        Commands::Logout => {
            client.logout().await?;
            println!("✓ Token revoked");
        }

        Commands::Service { action } => match action {
            ServiceCommands::Create {
                name,
                price,
                unit,
                description,
            } => {
                let service = client
                    .create_service(&name, &description, Money::new(price)?, &unit)
                    .await?;
                print_json(&service)?;
            }
            ServiceCommands::Get { id } => {
                print_json(&client.get_service(parse_id(&id, "service")?).await?)?;
            }
            ServiceCommands::Update {
                id,
                name,
                price,
                unit,
                description,
            } => {
                let req = ServiceRequest {
                    service_name: name,
                    description,
                    unit_price: Money::new(price)?,
                    unit,
                };
                print_json(&client.update_service(parse_id(&id, "service")?, &req).await?)?;
            }
            ServiceCommands::Delete { id } => {
                print_json(&client.delete_service(parse_id(&id, "service")?).await?)?;
            }
            ServiceCommands::List => {
                print_json(&client.list_services().await?)?;
            }
        },

        Commands::Customer { action } => match action {
            CustomerCommands::Create { name, email, phone } => {
                let req = CustomerRequest {
                    full_name: name,
                    email,
                    phone_number: phone,
                };
                print_json(&client.create_customer(&req).await?)?;
            }
            CustomerCommands::Get { id } => {
                print_json(&client.get_customer(parse_id(&id, "customer")?).await?)?;
            }
            CustomerCommands::Update {
                id,
                name,
                email,
                phone,
            } => {
                let req = CustomerRequest {
                    full_name: name,
                    email,
                    phone_number: phone,
                };
                print_json(&client.update_customer(parse_id(&id, "customer")?, &req).await?)?;
            }
            CustomerCommands::Delete { id } => {
                print_json(&client.delete_customer(parse_id(&id, "customer")?).await?)?;
            }
            CustomerCommands::List => {
                print_json(&client.list_customers().await?)?;
            }
        },

        Commands::Transaction { action } => match action {
            TransactionCommands::Create {
                customer,
                items,
                payment_method,
            } => {
                let customer_id: CustomerId = parse_id(&customer, "customer")?;
                let tx = client
                    .create_transaction(customer_id, items, payment_method)
                    .await?;
                print_json(&tx)?;
            }
            TransactionCommands::Get { id } => {
                let id: TransactionId = parse_id(&id, "transaction")?;
                print_json(&client.get_transaction(id).await?)?;
            }
            TransactionCommands::Update {
                id,
                customer,
                items,
                payment_method,
            } => {
                let id: TransactionId = parse_id(&id, "transaction")?;
                let customer_id = customer
                    .map(|c| parse_id::<CustomerId>(&c, "customer"))
                    .transpose()?;
                let req = UpdateTransactionRequest {
                    customer_id,
                    items,
                    payment_method,
                };
                print_json(&client.update_transaction(id, &req).await?)?;
            }
            TransactionCommands::Delete { id } => {
                let id: TransactionId = parse_id(&id, "transaction")?;
                print_json(&client.delete_transaction(id).await?)?;
            }
            TransactionCommands::List => {
                print_json(&client.list_transactions().await?)?;
            }
        },

        Commands::Payment { action } => match action {
            PaymentCommands::Create {
                transaction,
                order_id,
            } => {
                let id: TransactionId = parse_id(&transaction, "transaction")?;
                print_json(&client.create_payment(id, order_id).await?)?;
            }
            PaymentCommands::Get { order_id } => {
                print_json(&client.get_payment(&order_id).await?)?;
            }
            PaymentCommands::List => {
                print_json(&client.list_payments().await?)?;
            }
            PaymentCommands::Notify { order_id, status } => {
                let payload = serde_json::json!({
                    "order_id": order_id,
                    "transaction_status": status,
                });
                print_json(&client.send_notification(&payload).await?)?;
            }
        },
    }

    Ok(())
}
