// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use std::env;
use std::path::Path;

use contract_collection::{
    init_tracing, load_contracts, save_contracts, Config, ContractId, EntityStore, SqliteStore,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let config = Config::from_env()?;

    match args.get(1).map(String::as_str) {
        None | Some("ui") => run_ui_mode(&config),
        Some(command) => {
            init_tracing(config.log_json);
            match command {
                "list" => run_list(&config),
                "show" => run_show(&config, parse_id(args.get(2))?),
                "delete" => run_delete(&config, parse_id(args.get(2))?),
                "import" => {
                    let path = args.get(2).context("usage: contracts import <file> [--overwrite]")?;
                    let overwrite = args.iter().skip(3).any(|a| a == "--overwrite");
                    run_import(&config, Path::new(path), overwrite)
                }
                "export" => {
                    let path = args.get(2).context("usage: contracts export <file>")?;
                    run_export(&config, Path::new(path))
                }
                other => {
                    print_usage();
                    bail!("unknown command '{}'", other)
                }
            }
        }
    }
}

fn print_usage() {
    eprintln!("Usage: contracts [COMMAND]");
    eprintln!();
    eprintln!("  (none) | ui                    interactive contract browser");
    eprintln!("  list                           print every contract");
    eprintln!("  show <id>                      print one contract");
    eprintln!("  delete <id>                    remove one contract");
    eprintln!("  import <file> [--overwrite]    load contracts from .json or .csv");
    eprintln!("  export <file>                  write contracts to .json or .csv");
}

fn parse_id(arg: Option<&String>) -> Result<ContractId> {
    let raw = arg.context("missing contract id")?;
    raw.parse()
        .with_context(|| format!("'{}' is not a contract id", raw))
}

fn open_store(config: &Config) -> Result<SqliteStore> {
    SqliteStore::open(&config.db_path)
        .with_context(|| format!("opening database {}", config.db_path.display()))
}

fn run_list(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let contracts = store.get_all()?;

    println!("📋 Contracts ({})", contracts.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let mut total = 0.0;
    for contract in &contracts {
        let yearly = match contract.yearly_expenses() {
            Ok(amount) => {
                total += amount;
                format!("{:>10.2}", amount)
            }
            Err(_) => format!("{:>10}", "undefined"),
        };
        println!(
            "{:>4}  {:<28} {:<14} {:>9.2} / {:>2} mo  {} per year",
            contract.id, contract.name, contract.category, contract.expenses, contract.cycle, yearly
        );
    }

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("💰 Total per year: {:.2}", total);
    Ok(())
}

fn run_show(config: &Config, id: ContractId) -> Result<()> {
    let store = open_store(config)?;
    let contract = store.get_by_id(id)?;

    println!("📄 Contract #{}", contract.id);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for field in contract_collection::ContractField::ALL {
        println!("{:<28} {}", field.label(), contract.get(field));
    }
    match contract.yearly_expenses() {
        Ok(amount) => println!("{:<28} {:.2}", "Yearly expenses", amount),
        Err(e) => println!("{:<28} undefined ({})", "Yearly expenses", e),
    }
    Ok(())
}

fn run_delete(config: &Config, id: ContractId) -> Result<()> {
    let mut store = open_store(config)?;
    store.delete_by_id(id)?;
    println!("🗑️  Deleted contract #{}", id);
    Ok(())
}

fn run_import(config: &Config, path: &Path, overwrite: bool) -> Result<()> {
    println!("📂 Loading {}...", path.display());
    let contracts = load_contracts(path)?;
    println!("✓ Read {} contracts", contracts.len());

    let mut store = open_store(config)?;
    if overwrite {
        println!("⚠️  Replacing existing contracts");
    }
    let imported = store.import(contracts, overwrite)?;

    println!("✅ Imported {} contracts ({} total)", imported.len(), store.count()?);
    Ok(())
}

fn run_export(config: &Config, path: &Path) -> Result<()> {
    let store = open_store(config)?;
    let contracts = store.get_all()?;

    let count = save_contracts(path, &contracts)?;
    println!("✅ Exported {} contracts to {}", count, path.display());
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    println!("🖥️  Loading Contract Collection UI...\n");

    let store = open_store(config)?;
    let mut app = ui::App::new(store)?;

    println!("✓ Loaded {} contracts", app.contract_count());
    println!("Starting UI... (Press 'q' to quit)\n");

    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or run the API: cargo run --bin contracts-server --features server");
    std::process::exit(1);
}
