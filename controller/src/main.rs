use anyhow::{Context, Result};
use ati::{
    Action, ChangeOrder, Connection, Decimal, Order, OrderId, OrderType, PlaceOrder, Position,
    ReversePosition, TimeInForce,
};
use ati_core::{AtiClient, Settings, WatchEvent};
use clap::{Args, Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::path::PathBuf;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "atictl")]
#[command(about = "Send commands to NinjaTrader through the ATI file interface")]
struct Cli {
    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory that contains the "NinjaTrader 8" folder
    #[arg(long, global = true)]
    documents_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Place a new order
    Place {
        #[command(flatten)]
        order: OrderArgs,
        /// BUY or SELL
        #[arg(long)]
        action: Action,
    },
    /// Reverse the current position with a new order
    Reverse {
        #[command(flatten)]
        order: OrderArgs,
    },
    /// Cancel an order
    Cancel {
        order_id: String,
        #[arg(long)]
        strategy_id: Option<String>,
    },
    /// Cancel every working order
    CancelAll,
    /// Change quantity or prices of a working order
    Change {
        order_id: String,
        #[arg(short, long)]
        quantity: Option<u32>,
        #[arg(long)]
        limit_price: Option<Decimal>,
        #[arg(long)]
        stop_price: Option<Decimal>,
        #[arg(long)]
        strategy_id: Option<String>,
    },
    /// Close the position in one instrument
    ClosePosition {
        #[arg(short, long)]
        account: String,
        #[arg(short, long)]
        instrument: String,
    },
    /// Close an ATM strategy
    CloseStrategy { strategy_id: String },
    /// Cancel all orders and flatten all positions
    Flatten,
    /// Mirror the update directory and print every processed update until Ctrl-C
    Watch,
}

#[derive(Args)]
struct OrderArgs {
    #[arg(short, long)]
    account: String,
    #[arg(short, long)]
    instrument: String,
    #[arg(short, long)]
    quantity: u32,
    /// MARKET, LIMIT, STOPMARKET or STOPLIMIT
    #[arg(long, default_value = "MARKET")]
    order_type: OrderType,
    #[arg(long)]
    limit_price: Option<Decimal>,
    #[arg(long)]
    stop_price: Option<Decimal>,
    /// DAY or GTC
    #[arg(long, default_value = "DAY")]
    tif: TimeInForce,
    #[arg(long)]
    oco_id: Option<String>,
    #[arg(long)]
    order_id: Option<String>,
    #[arg(long)]
    strategy: Option<String>,
    #[arg(long)]
    strategy_id: Option<String>,
}

impl OrderArgs {
    fn into_place(self, action: Action) -> PlaceOrder {
        PlaceOrder {
            account: self.account,
            instrument: self.instrument,
            action,
            quantity: self.quantity,
            order_type: self.order_type,
            limit_price: self.limit_price,
            stop_price: self.stop_price,
            tif: self.tif,
            oco_id: self.oco_id,
            order_id: self.order_id.map(OrderId::new),
            strategy: self.strategy,
            strategy_id: self.strategy_id,
        }
    }

    fn into_reverse(self) -> ReversePosition {
        ReversePosition {
            account: self.account,
            instrument: self.instrument,
            quantity: self.quantity,
            order_type: self.order_type,
            limit_price: self.limit_price,
            stop_price: self.stop_price,
            tif: self.tif,
            oco_id: self.oco_id,
            order_id: self.order_id.map(OrderId::new),
            strategy: self.strategy,
            strategy_id: self.strategy_id,
        }
    }
}

#[derive(Serialize)]
struct Snapshot {
    positions: Vec<Position>,
    orders: Vec<Order>,
    connections: Vec<Connection>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(dir) = cli.documents_dir {
        settings.documents_dir = dir;
    }

    // One-shot commands don't need the existing update files.
    if !matches!(cli.command, Commands::Watch) {
        settings.scan_existing = false;
    }

    let client = AtiClient::open(&settings).context("Failed to open ATI directories")?;

    match cli.command {
        Commands::Place { order, action } => {
            let order_id = client.place_order(order.into_place(action))?;
            println!("{}", order_id);
        }
        Commands::Reverse { order } => {
            let order_id = client.reverse_position(order.into_reverse())?;
            println!("{}", order_id);
        }
        Commands::Cancel {
            order_id,
            strategy_id,
        } => client.cancel_order(&OrderId::new(order_id), strategy_id.as_deref())?,
        Commands::CancelAll => client.cancel_all_orders()?,
        Commands::Change {
            order_id,
            quantity,
            limit_price,
            stop_price,
            strategy_id,
        } => client.change_order(ChangeOrder {
            order_id: OrderId::new(order_id),
            quantity,
            limit_price,
            stop_price,
            strategy_id,
        })?,
        Commands::ClosePosition {
            account,
            instrument,
        } => client.close_position(&account, &instrument)?,
        Commands::CloseStrategy { strategy_id } => client.close_strategy(&strategy_id)?,
        Commands::Flatten => client.flatten_everything()?,
        Commands::Watch => watch(&client).await?,
    }

    client.shutdown();
    Ok(())
}

async fn watch(client: &AtiClient) -> Result<()> {
    print_snapshot(client)?;

    // The diagnostics bus is a blocking channel; forward it onto the runtime.
    let events = client.subscribe();
    let (tx, mut rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        while let Ok(event) = events.recv() {
            if tx.send(event).is_err() {
                break;
            }
        }
    });

    info!("Watching {:?}, Ctrl-C to stop", client.paths().outgoing_dir());
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Some(event) = rx.recv() => print_event(client, &event)?,
        }
    }

    client.shutdown();
    print_snapshot(client)
}

fn print_event(client: &AtiClient, event: &WatchEvent) -> Result<()> {
    match event {
        WatchEvent::Applied(target) => match client.store().get(target) {
            Some(record) => println!("{}: {}", target, serde_json::to_string(&record)?),
            None => println!("{}", target),
        },
        WatchEvent::Rejected { file_name, error } => eprintln!("ERROR: {}: {}", file_name, error),
    }
    Ok(())
}

fn print_snapshot(client: &AtiClient) -> Result<()> {
    let store = client.store();
    let snapshot = Snapshot {
        positions: store.positions(),
        orders: store.orders(),
        connections: store.connections(),
    };
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
