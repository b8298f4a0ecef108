use clap::{Parser, Subcommand};
use pharmacy_core::console::parse_date;
use pharmacy_core::*;
use std::io::{self, StdinLock, Stdout};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pharm")]
#[command(about = "Pharmacy inventory and order management", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive main menu (default)
    Menu,

    /// Show low-stock and expired medicine alerts
    Alerts,

    /// Manage medicines
    #[command(subcommand)]
    Medicine(MedicineCommand),

    /// Manage customers
    #[command(subcommand)]
    Customer(CustomerCommand),

    /// Create and view orders
    #[command(subcommand)]
    Order(OrderCommand),

    /// Export inventory and order lines as CSV
    Export {
        /// Output directory
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum MedicineCommand {
    /// List all medicines
    List,

    /// Search medicines by name or category
    Search { term: String },

    /// Add a medicine
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        quantity: u32,
        /// Expiry date (YYYY-MM-DD)
        #[arg(long)]
        expiry: String,
    },

    /// Update fields of a medicine; invalid values are skipped
    Update {
        id: u32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        quantity: Option<String>,
        /// Expiry date (YYYY-MM-DD)
        #[arg(long)]
        expiry: Option<String>,
    },

    /// Delete a medicine
    Delete {
        id: u32,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CustomerCommand {
    /// List all customers
    List,

    /// Add a customer
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
    },
}

#[derive(Subcommand)]
enum OrderCommand {
    /// Create an order interactively
    New,

    /// List all orders
    List,

    /// Print the invoice for an order
    Show { id: u32 },
}

type StdConsole = LineConsole<StdinLock<'static>, Stdout>;

fn stdio_console() -> StdConsole {
    LineConsole::new(io::stdin().lock(), io::stdout())
}

fn main() -> Result<()> {
    // Initialize logging
    pharmacy_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    let mut store = Store::open_dir(&data_dir)?;
    let mut console = stdio_console();

    match cli.command {
        None | Some(Commands::Menu) => cmd_menu(&mut store, &mut console, &config),
        Some(Commands::Alerts) => show_alerts(&store, &mut console, true),
        Some(Commands::Medicine(cmd)) => cmd_medicine(&mut store, &mut console, cmd),
        Some(Commands::Customer(cmd)) => cmd_customer(&mut store, &mut console, cmd),
        Some(Commands::Order(cmd)) => cmd_order(&mut store, &mut console, cmd),
        Some(Commands::Export { out }) => cmd_export(&store, &mut console, out),
    }
}

fn cmd_medicine(store: &mut Store, console: &mut dyn Console, cmd: MedicineCommand) -> Result<()> {
    match cmd {
        MedicineCommand::List => list_medicines(store.medicines().iter(), console),
        MedicineCommand::Search { term } => search_medicines(store, console, &term),
        MedicineCommand::Add {
            name,
            category,
            price,
            quantity,
            expiry,
        } => {
            let med = store.add_medicine(NewMedicine {
                name,
                category,
                price,
                quantity,
                expiry_date: parse_date(&expiry)?,
            })?;
            console.say(&format!("Medicine '{}' added with ID {}.", med.name, med.med_id))
        }
        MedicineCommand::Update {
            id,
            name,
            category,
            price,
            quantity,
            expiry,
        } => {
            let update = MedicineUpdate {
                name,
                category,
                price,
                quantity,
                expiry_date: expiry,
            };
            let report = store.update_medicine(id, update)?;
            report_update(console, &report)
        }
        MedicineCommand::Delete { id, yes } => {
            if yes {
                let outcome = store.delete_medicine(id, |_| true)?;
                report_deletion(console, &outcome)
            } else {
                delete_with_prompt(store, console, id)
            }
        }
    }
}

fn cmd_customer(store: &mut Store, console: &mut dyn Console, cmd: CustomerCommand) -> Result<()> {
    match cmd {
        CustomerCommand::List => list_customers(store, console),
        CustomerCommand::Add { name, phone } => {
            let cust = store.add_customer(&name, &phone)?;
            console.say(&format!("Customer '{}' added with ID {}.", cust.name, cust.cust_id))
        }
    }
}

fn cmd_order(store: &mut Store, console: &mut dyn Console, cmd: OrderCommand) -> Result<()> {
    match cmd {
        OrderCommand::New => take_order(store, console).map(|_| ()),
        OrderCommand::List => list_orders(store, console),
        OrderCommand::Show { id } => {
            let order = store
                .find_order(id)
                .ok_or_else(|| Error::order_not_found(id))?;
            let invoice = Invoice::new(order, store.find_customer(order.cust_id));
            say_block(console, &invoice.to_string())
        }
    }
}

fn cmd_export(store: &Store, console: &mut dyn Console, out: PathBuf) -> Result<()> {
    let inventory_path = out.join(pharmacy_core::export::INVENTORY_CSV);
    let lines_path = out.join(pharmacy_core::export::ORDER_LINES_CSV);

    let medicines = pharmacy_core::export::export_inventory(store.medicines(), &inventory_path)?;
    let lines = pharmacy_core::export::export_order_lines(store.orders(), &lines_path)?;

    console.say(&format!("✓ Exported {} medicines to {}", medicines, inventory_path.display()))?;
    console.say(&format!("✓ Exported {} order lines to {}", lines, lines_path.display()))
}

// ============================================================================
// Interactive menus
// ============================================================================

fn cmd_menu(store: &mut Store, console: &mut dyn Console, config: &Config) -> Result<()> {
    if config.alerts.show_on_startup {
        show_alerts(store, console, false)?;
    }

    loop {
        console.say("")?;
        console.say("===== Pharmacy Management System =====")?;
        console.say("1. Manage Medicines")?;
        console.say("2. Manage Customers")?;
        console.say("3. Create Order")?;
        console.say("4. View Orders")?;
        console.say("5. Stock Alerts")?;
        console.say("6. Exit")?;

        let Some(choice) = console.prompt_line("Choose an option (1-6): ")? else {
            break;
        };

        let result = match choice.as_str() {
            "1" => medicines_menu(store, console),
            "2" => customers_menu(store, console),
            "3" => take_order(store, console).map(|_| ()),
            "4" => list_orders(store, console),
            "5" => show_alerts(store, console, true),
            "6" => break,
            _ => console.say("Invalid choice. Please try again."),
        };

        // Nothing is fatal to the menu loop
        if let Err(e) = result {
            tracing::warn!("Menu action failed: {}", e);
            console.say(&format!("Error: {}", e))?;
        }
    }

    console.say("Exiting the Pharmacy Management System. Goodbye!")
}

fn medicines_menu(store: &mut Store, console: &mut dyn Console) -> Result<()> {
    loop {
        console.say("")?;
        console.say("--- Medicines Menu ---")?;
        console.say("1. List Medicines")?;
        console.say("2. Add Medicine")?;
        console.say("3. Update Medicine")?;
        console.say("4. Delete Medicine")?;
        console.say("5. Search Medicines")?;
        console.say("6. Back to Main Menu")?;

        let Some(choice) = console.prompt_line("Choose an option (1-6): ")? else {
            return Ok(());
        };

        let result = match choice.as_str() {
            "1" => list_medicines(store.medicines().iter(), console),
            "2" => add_medicine_interactive(store, console),
            "3" => update_medicine_interactive(store, console),
            "4" => match console.prompt_count("Enter medicine ID to delete: ")? {
                Some(id) => delete_with_prompt(store, console, id),
                None => Ok(()),
            },
            "5" => match console.prompt_line("Enter name or category keyword to search: ")? {
                Some(term) => search_medicines(store, console, &term),
                None => Ok(()),
            },
            "6" => return Ok(()),
            _ => console.say("Invalid choice. Please try again."),
        };

        match result {
            Err(Error::NotFound { entity, .. }) => console.say(&format!("{} not found.", entity))?,
            Err(Error::Validation(reason)) => console.say(&format!("Invalid input: {}", reason))?,
            other => other?,
        }
    }
}

fn customers_menu(store: &mut Store, console: &mut dyn Console) -> Result<()> {
    loop {
        console.say("")?;
        console.say("--- Customers Menu ---")?;
        console.say("1. List Customers")?;
        console.say("2. Add Customer")?;
        console.say("3. Back to Main Menu")?;

        let Some(choice) = console.prompt_line("Choose an option (1-3): ")? else {
            return Ok(());
        };

        match choice.as_str() {
            "1" => list_customers(store, console)?,
            "2" => {
                let Some(name) = console.prompt_line("Customer name: ")? else {
                    return Ok(());
                };
                let Some(phone) = console.prompt_line("Phone number: ")? else {
                    return Ok(());
                };
                let cust = store.add_customer(&name, &phone)?;
                console.say(&format!("Customer '{}' added with ID {}.", cust.name, cust.cust_id))?;
            }
            "3" => return Ok(()),
            _ => console.say("Invalid choice. Please try again.")?,
        }
    }
}

fn add_medicine_interactive(store: &mut Store, console: &mut dyn Console) -> Result<()> {
    console.say("")?;
    console.say("--- Add New Medicine ---")?;

    let Some(name) = console.prompt_line("Medicine name: ")? else {
        return Ok(());
    };
    let Some(category) = console.prompt_line("Category: ")? else {
        return Ok(());
    };
    let Some(price) = console.prompt_float("Price per unit: ")? else {
        return Ok(());
    };
    let Some(quantity) = console.prompt_count("Quantity in stock: ")? else {
        return Ok(());
    };
    let Some(expiry_date) = console.prompt_date("Expiry date (YYYY-MM-DD): ")? else {
        return Ok(());
    };

    let med = store.add_medicine(NewMedicine {
        name,
        category,
        price,
        quantity,
        expiry_date,
    })?;
    console.say(&format!("Medicine '{}' added with ID {}.", med.name, med.med_id))
}

fn update_medicine_interactive(store: &mut Store, console: &mut dyn Console) -> Result<()> {
    console.say("")?;
    console.say("--- Update Medicine ---")?;

    let Some(id) = console.prompt_count("Enter medicine ID to update: ")? else {
        return Ok(());
    };
    let Some(med) = store.find_medicine(id).cloned() else {
        return console.say("Medicine not found.");
    };

    console.say(&format!("Updating medicine: {} (ID: {})", med.name, med.med_id))?;
    console.say("Leave input blank to keep current value.")?;

    let update = MedicineUpdate {
        name: console.prompt_line(&format!("Name [{}]: ", med.name))?,
        category: console.prompt_line(&format!("Category [{}]: ", med.category))?,
        price: console.prompt_line(&format!("Price [{}]: ", med.price))?,
        quantity: console.prompt_line(&format!("Quantity [{}]: ", med.quantity))?,
        expiry_date: console.prompt_line(&format!(
            "Expiry date [{}]: ",
            med.expiry_date.format("%Y-%m-%d")
        ))?,
    };

    let report = store.update_medicine(id, update)?;
    report_update(console, &report)
}

fn delete_with_prompt(store: &mut Store, console: &mut dyn Console, id: u32) -> Result<()> {
    let Some(name) = store.find_medicine(id).map(|m| m.name.clone()) else {
        return console.say("Medicine not found.");
    };
    let confirmed = console.confirm(&format!("Are you sure you want to delete {}? (y/n): ", name))?;

    let outcome = store.delete_medicine(id, |_| confirmed)?;
    report_deletion(console, &outcome)
}

// ============================================================================
// Output helpers
// ============================================================================

fn say_block(console: &mut dyn Console, text: &str) -> Result<()> {
    for line in text.lines() {
        console.say(line)?;
    }
    Ok(())
}

fn report_update(console: &mut dyn Console, report: &UpdateReport) -> Result<()> {
    for (field, reason) in &report.rejected {
        console.say(&format!("Invalid {} input ({}). Skipping update.", field, reason))?;
    }
    console.say(&format!("Medicine ID {} updated.", report.medicine.med_id))
}

fn report_deletion(console: &mut dyn Console, outcome: &Deletion) -> Result<()> {
    match outcome {
        Deletion::Deleted(_) => console.say("Medicine deleted."),
        Deletion::Declined => console.say("Deletion canceled."),
    }
}

fn list_medicines<'a>(
    medicines: impl ExactSizeIterator<Item = &'a Medicine>,
    console: &mut dyn Console,
) -> Result<()> {
    console.say("")?;
    console.say("--- Medicine Inventory ---")?;
    if medicines.len() == 0 {
        return console.say("No medicines in inventory.");
    }
    console.say(&format!(
        "{:<4} {:<20} {:<15} {:<10} {:<6} {:<12}",
        "ID", "Name", "Category", "Price", "Qty", "Expiry"
    ))?;
    console.say(&"-".repeat(70))?;
    for med in medicines {
        console.say(&format!(
            "{:<4} {:<20} {:<15} ${:<9.2} {:<6} {:<12}",
            med.med_id,
            med.name,
            med.category,
            med.price,
            med.quantity,
            med.expiry_date.format("%Y-%m-%d").to_string()
        ))?;
    }
    Ok(())
}

fn search_medicines(store: &Store, console: &mut dyn Console, term: &str) -> Result<()> {
    let results = store.search_medicines(term);
    if results.is_empty() {
        return console.say("No medicines found matching the search term.");
    }
    console.say(&format!("Found {} medicine(s):", results.len()))?;
    list_medicines(results.into_iter(), console)
}

fn list_customers(store: &Store, console: &mut dyn Console) -> Result<()> {
    console.say("")?;
    console.say("--- Customer List ---")?;
    if store.customers().is_empty() {
        return console.say("No customers found.");
    }
    console.say(&format!("{:<4} {:<20} {:<15}", "ID", "Name", "Phone"))?;
    console.say(&"-".repeat(40))?;
    for c in store.customers() {
        console.say(&format!("{:<4} {:<20} {:<15}", c.cust_id, c.name, c.phone))?;
    }
    Ok(())
}

fn list_orders(store: &Store, console: &mut dyn Console) -> Result<()> {
    console.say("")?;
    console.say("--- Orders List ---")?;
    if store.orders().is_empty() {
        return console.say("No orders found.");
    }
    console.say(&format!(
        "{:<4} {:<20} {:<20} {:<12} {:<10}",
        "ID", "Customer", "Date", "Items Count", "Total"
    ))?;
    console.say(&"-".repeat(70))?;
    for o in store.orders() {
        let date = o
            .order_date
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        console.say(&format!(
            "{:<4} {:<20} {:<20} {:<12} ${:.2}",
            o.order_id,
            store.customer_name(o),
            date,
            o.items.len(),
            o.total()
        ))?;
    }
    Ok(())
}

fn show_alerts(store: &Store, console: &mut dyn Console, report_clear: bool) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let lines = pharmacy_core::alerts::render(
        &store.low_stock_alert(),
        &store.expired_stock_alert(today),
    );

    if lines.is_empty() {
        if report_clear {
            console.say("No stock alerts.")?;
        }
        return Ok(());
    }

    console.say("")?;
    say_block(console, &lines.join("\n"))
}
