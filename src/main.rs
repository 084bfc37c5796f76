use checkout::application::catalog::Catalog;
use checkout::application::transactor::PurchaseTransactor;
use checkout::config::{DEFAULT_LOCK_WAIT_TIMEOUT, StoreConfig};
use checkout::domain::ports::{ProductStore, ProductStoreBox};
use checkout::domain::product::{Price, Product};
use checkout::infrastructure::in_memory::InMemoryProductStore;
use checkout::interfaces::csv::product_reader::ProductReader;
use checkout::interfaces::csv::product_writer::ProductWriter;
use checkout::interfaces::json::{Response, handle_purchase};
use checkout::telemetry;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Seed the product table from a `sku,name,price,qty` CSV file first
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// How long a purchase waits for a locked product row, in milliseconds (0 = forever)
    #[arg(
        long,
        global = true,
        env = "CHECKOUT_LOCK_TIMEOUT_MS",
        default_value_t = DEFAULT_LOCK_WAIT_TIMEOUT.as_millis() as u64
    )]
    lock_timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run purchases from a JSON-lines file and print one response per line
    Purchase {
        /// File with one purchase request body per line
        requests: PathBuf,

        /// Maximum number of purchases in flight at once
        #[arg(long, default_value_t = 1)]
        concurrency: usize,
    },
    /// Print every product as CSV
    Products,
    /// Add a single product to the catalog
    AddProduct {
        #[arg(long)]
        sku: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: Decimal,
        #[arg(long)]
        qty: u32,
    },
}

fn store_pair<S: ProductStore + Clone + 'static>(store: S) -> (ProductStoreBox, ProductStoreBox) {
    (Box::new(store.clone()), Box::new(store))
}

fn open_stores(db_path: Option<PathBuf>, config: StoreConfig) -> Result<(ProductStoreBox, ProductStoreBox)> {
    #[cfg(feature = "storage-rocksdb")]
    if let Some(db_path) = db_path {
        let store = checkout::infrastructure::rocksdb::RocksDBStore::open(db_path, config)
            .into_diagnostic()?;
        return Ok(store_pair(store));
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }

    Ok(store_pair(InMemoryProductStore::with_config(config)))
}

async fn seed_catalog(catalog: &Catalog, path: &Path) -> Result<()> {
    let file = File::open(path).into_diagnostic()?;
    for product in ProductReader::new(file).products() {
        match product {
            Ok(product) => {
                if let Err(e) = catalog.add_product(product).await {
                    eprintln!("Error adding product: {}", e);
                }
            }
            Err(e) => eprintln!("Error reading product: {}", e),
        }
    }
    Ok(())
}

/// Runs every body through the transactor with at most `concurrency` in flight.
///
/// Purchases start in input order and responses come back in input order.
async fn run_purchases(
    transactor: Arc<PurchaseTransactor>,
    bodies: Vec<String>,
    concurrency: usize,
) -> Result<Vec<Response>> {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();
    let count = bodies.len();

    for (index, body) in bodies.into_iter().enumerate() {
        let permit = Arc::clone(&permits).acquire_owned().await.into_diagnostic()?;
        let transactor = Arc::clone(&transactor);
        tasks.spawn(async move {
            let response = handle_purchase(&transactor, body.as_bytes()).await;
            drop(permit);
            (index, response)
        });
    }

    let mut responses: Vec<Option<Response>> = vec![None; count];
    while let Some(joined) = tasks.join_next().await {
        let (index, response) = joined.into_diagnostic()?;
        responses[index] = Some(response);
    }
    Ok(responses.into_iter().flatten().collect())
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();
    let cli = Cli::parse();

    let config = StoreConfig::from_lock_timeout_ms(cli.lock_timeout_ms);
    let (catalog_store, purchase_store) = open_stores(cli.db_path, config)?;
    let catalog = Catalog::new(catalog_store);

    if let Some(path) = &cli.catalog {
        seed_catalog(&catalog, path).await?;
    }

    match cli.command {
        Command::Purchase {
            requests,
            concurrency,
        } => {
            let file = File::open(requests).into_diagnostic()?;
            let bodies = BufReader::new(file)
                .lines()
                .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
                .collect::<io::Result<Vec<String>>>()
                .into_diagnostic()?;

            let transactor = Arc::new(PurchaseTransactor::new(purchase_store));
            let responses = run_purchases(transactor, bodies, concurrency).await?;

            let stdout = io::stdout();
            let mut out = stdout.lock();
            for response in responses {
                let line = serde_json::to_string(&response).into_diagnostic()?;
                writeln!(out, "{}", line).into_diagnostic()?;
            }
        }
        Command::Products => {
            let products = catalog.list_products().await.into_diagnostic()?;
            let stdout = io::stdout();
            let mut writer = ProductWriter::new(stdout.lock());
            writer.write_products(products).into_diagnostic()?;
        }
        Command::AddProduct {
            sku,
            name,
            price,
            qty,
        } => {
            let price = Price::new(price).into_diagnostic()?;
            catalog
                .add_product(Product::new(sku, name, price, qty))
                .await
                .into_diagnostic()?;
            println!("product successfully added");
        }
    }

    Ok(())
}
