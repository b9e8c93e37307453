//! TPC-C Order Entry CLI
//!
//! Looks up catalog data, browses orders and places New-Order transactions
//! through the same validation the order form uses.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::str::FromStr;
use tpcc_client::{ClientConfig, DEFAULT_API_BASE};
use tpcc_order_entry::{FormEvent, OrderBrowser, OrderFormState, OrderService, SubmitError};
use tpcc_types::{
    Customer, CustomerId, DistrictId, Item, ItemId, OrderId, SortBy, WarehouseId,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tpcc-orders")]
#[command(about = "TPC-C order entry and browsing")]
#[command(version)]
struct Cli {
    /// API base URL
    #[arg(long, global = true, env = "API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List warehouses
    Warehouses,

    /// List districts of a warehouse
    Districts {
        #[arg(short, long)]
        warehouse: u16,
    },

    /// Search customers of a district by name
    Customers {
        #[arg(short, long)]
        warehouse: u16,

        #[arg(short, long)]
        district: u16,

        /// Name fragment; omit to list the first customers
        #[arg(short, long, default_value = "")]
        search: String,

        #[arg(long)]
        limit: Option<u32>,
    },

    /// Search items stocked by a warehouse
    Items {
        #[arg(short, long)]
        warehouse: u16,

        #[arg(short, long, default_value = "")]
        search: String,

        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show stock of one item, optionally checking a quantity against it
    Stock {
        #[arg(short, long)]
        warehouse: u16,

        #[arg(short, long)]
        item: u32,

        #[arg(short, long)]
        quantity: Option<i32>,
    },

    /// Browse orders
    List {
        #[arg(short, long)]
        warehouse: Option<u16>,

        #[arg(short, long)]
        district: Option<u16>,

        #[arg(short, long)]
        customer: Option<u32>,

        #[arg(long)]
        order: Option<u32>,

        /// Earliest entry date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Latest entry date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long)]
        per_page: Option<u32>,

        /// Sort column; picking one sorts ascending
        #[arg(long, value_enum)]
        sort: Option<SortColumn>,

        /// Print the raw page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a customer's latest order
    Status {
        #[arg(short, long)]
        warehouse: u16,

        #[arg(short, long)]
        district: u16,

        #[arg(short, long)]
        customer: u32,
    },

    /// Validate and place a New-Order
    Submit {
        #[arg(short, long)]
        warehouse: u16,

        #[arg(short, long)]
        district: u16,

        #[arg(short, long)]
        customer: u32,

        /// Order line as ITEM:QTY or ITEM:QTY@SUPPLY_WAREHOUSE (repeatable)
        #[arg(short, long = "line", required = true)]
        lines: Vec<LineArg>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortColumn {
    OrderId,
    EntryDate,
    CustomerLast,
    WarehouseId,
    DistrictId,
    CarrierId,
}

impl From<SortColumn> for SortBy {
    fn from(column: SortColumn) -> Self {
        match column {
            SortColumn::OrderId => SortBy::OrderId,
            SortColumn::EntryDate => SortBy::EntryDate,
            SortColumn::CustomerLast => SortBy::CustomerLast,
            SortColumn::WarehouseId => SortBy::WarehouseId,
            SortColumn::DistrictId => SortBy::DistrictId,
            SortColumn::CarrierId => SortBy::CarrierId,
        }
    }
}

#[derive(Debug, Clone)]
struct LineArg {
    item: u32,
    quantity: i32,
    supply: Option<u16>,
}

impl FromStr for LineArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (line, supply) = match s.split_once('@') {
            Some((line, supply)) => (line, Some(supply)),
            None => (s, None),
        };
        let (item, quantity) = line
            .split_once(':')
            .ok_or_else(|| format!("expected ITEM:QTY, got {:?}", s))?;
        Ok(Self {
            item: item
                .trim()
                .parse()
                .map_err(|_| format!("invalid item id {:?}", item))?,
            quantity: quantity
                .trim()
                .parse()
                .map_err(|_| format!("invalid quantity {:?}", quantity))?,
            supply: supply
                .map(|w| w.trim().parse().map_err(|_| format!("invalid warehouse {:?}", w)))
                .transpose()?,
        })
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Records for ids given on the command line. The API resolves names and
/// prices; only the ids travel in the request.
fn customer_ref(w: WarehouseId, d: DistrictId, c: CustomerId) -> Customer {
    Customer {
        c_id: c,
        c_d_id: d,
        c_w_id: w,
        c_first: String::new(),
        c_middle: String::new(),
        c_last: String::new(),
        c_phone: None,
        c_credit: None,
        c_credit_lim: None,
        c_discount: None,
        c_balance: None,
    }
}

fn item_ref(id: u32) -> Item {
    Item {
        i_id: ItemId(id),
        i_im_id: None,
        i_name: None,
        i_price: None,
        i_data: None,
    }
}

fn build_form(warehouse: u16, district: u16, customer: u32, lines: &[LineArg]) -> OrderFormState {
    let w = WarehouseId(warehouse);
    let d = DistrictId(district);
    let mut form = OrderFormState::new()
        .apply(FormEvent::WarehouseSelected(w))
        .apply(FormEvent::DistrictSelected(d))
        .apply(FormEvent::CustomerSelected(Some(customer_ref(
            w,
            d,
            CustomerId(customer),
        ))));

    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            form = form.apply(FormEvent::LineAdded);
        }
        form = form.apply(FormEvent::LineItemChanged(index, Some(item_ref(line.item))));
        // Typed quantities go to validation as given, not through the
        // reducer's clamp.
        form.lines[index].quantity = line.quantity;
        if let Some(supply) = line.supply {
            form = form.apply(FormEvent::LineSupplyWarehouseChanged(
                index,
                WarehouseId(supply),
            ));
        }
    }
    form
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let service = OrderService::from_config(ClientConfig::new(cli.api_base))
        .context("Failed to create API client")?;

    match cli.command {
        Commands::Warehouses => print_json(&service.warehouses().await?)?,

        Commands::Districts { warehouse } => {
            print_json(&service.districts(WarehouseId(warehouse)).await?)?
        }

        Commands::Customers {
            warehouse,
            district,
            search,
            limit,
        } => {
            let customers = service
                .search_customers(WarehouseId(warehouse), DistrictId(district), &search, limit)
                .await?;
            for customer in &customers {
                println!("{:>6}  {}", customer.c_id, customer.display_name());
            }
        }

        Commands::Items {
            warehouse,
            search,
            limit,
        } => {
            let items = service
                .search_items(WarehouseId(warehouse), &search, limit)
                .await?;
            for item in &items {
                println!(
                    "{:>7}  {:<24}  {}",
                    item.i_id,
                    item.i_name.as_deref().unwrap_or("-"),
                    item.i_price.map(|p| p.to_string()).unwrap_or_default()
                );
            }
        }

        Commands::Stock {
            warehouse,
            item,
            quantity,
        } => {
            let stock = service
                .stock_info(WarehouseId(warehouse), ItemId(item))
                .await?;
            print_json(&stock)?;
            if let Some(quantity) = quantity {
                if tpcc_order_entry::is_out_of_stock(quantity, &stock) {
                    println!("Out of stock: {} requested, {} available", quantity, stock.s_quantity);
                }
            }
        }

        Commands::List {
            warehouse,
            district,
            customer,
            order,
            from,
            to,
            page,
            per_page,
            sort,
            json,
        } => {
            let mut browser = OrderBrowser::new();
            browser
                .set_warehouse(warehouse.map(WarehouseId))
                .set_district(district.map(DistrictId))
                .set_customer(customer.map(CustomerId))
                .set_order(order.map(OrderId))
                .set_date_range(from.as_deref(), to.as_deref());
            if let Some(per_page) = per_page {
                browser.set_page_size(per_page);
            }
            if let Some(sort) = sort {
                browser.toggle_sort(sort.into());
            }
            browser.search();
            browser.go_to_page(page, None);

            let listing = service.list_orders(browser.query()).await?;
            if json {
                print_json(&listing)?;
            } else {
                println!(
                    "{:>7} {:>4} {:>4}  {:<28} {:>5} {:>10}  {}",
                    "order", "w", "d", "customer", "lines", "total", "status"
                );
                for order in &listing.orders {
                    println!(
                        "{:>7} {:>4} {:>4}  {:<28} {:>5} {:>10}  {}",
                        order.o_id,
                        order.o_w_id,
                        order.o_d_id,
                        order.customer_name(),
                        order.line_count,
                        order.total_amount.map(|t| t.to_string()).unwrap_or_default(),
                        order.delivery_status()
                    );
                }
                println!(
                    "Page {} of {} ({} orders)",
                    listing.page, listing.total_pages, listing.total_count
                );
            }
        }

        Commands::Status {
            warehouse,
            district,
            customer,
        } => {
            let status = service
                .order_status(
                    WarehouseId(warehouse),
                    DistrictId(district),
                    CustomerId(customer),
                )
                .await?;
            print_json(&status)?;
        }

        Commands::Submit {
            warehouse,
            district,
            customer,
            lines,
        } => {
            let form = build_form(warehouse, district, customer, &lines);
            match service.submit(&form).await {
                Ok(placed) => print_json(&placed)?,
                Err(SubmitError::Invalid(result)) => {
                    for error in &result.errors {
                        eprintln!("  {}: {}", error.field, error.message);
                    }
                    bail!("Order not submitted ({} problems)", result.errors.len());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}
