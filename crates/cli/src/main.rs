use clap::{Parser, Subcommand};
use otboard_core::views::display::{self, RefreshCountdown};
use otboard_core::views::staff::{self, StaffForm};
use otboard_core::{
    authenticate, AuthFailure, CoreConfig, OtStatus, PatientRecord, SharedRecordStore,
};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "otboard")]
#[command(about = "OT status board CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all patient records
    List,
    /// Show the most recently updated records
    Recent {
        /// Number of records to show
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Create or update a patient's status
    Upsert {
        /// Hospital identifier (stored upper case)
        uhid: String,
        /// Patient name
        name: String,
        /// Status label or key, e.g. "ongoing" or "Surgery Ongoing"
        #[arg(long, default_value = "waiting")]
        status: OtStatus,
    },
    /// Delete a patient record
    Delete {
        /// UHID of the record, in any case
        uhid: String,
    },
    /// List the available statuses
    Statuses,
    /// Check a credential pair and print the role it opens
    Login {
        /// Login ID
        identifier: String,
        /// Password
        secret: String,
    },
    /// Print the board on every poll, like a display screen
    Watch,
}

fn print_record(record: &PatientRecord) {
    let updated = record
        .updated_at()
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".into());
    println!(
        "{:<12} {:<28} {:<24} {}",
        record.uhid, record.name, record.status, updated
    );
}

fn print_records(records: &[PatientRecord]) {
    if records.is_empty() {
        println!("No patient records found.");
        return;
    }
    for record in records {
        print_record(record);
    }
}

/// Line printed for a successful `login`, e.g. `STAFF -> Staff Management`.
fn login_line(identifier: &str, secret: &str) -> Result<String, AuthFailure> {
    authenticate(identifier, secret).map(|role| format!("{} -> {}", role, role.view_title()))
}

fn watch(store: &SharedRecordStore, cfg: &CoreConfig) {
    let mut countdown = RefreshCountdown::new(cfg.poll_interval());
    loop {
        let board = display::board(store, cfg.poll_interval());
        println!(
            "== {} | {} | {} ==",
            board.title,
            board.subtitle,
            board.generated_at.format("%H:%M:%S")
        );
        if board.is_empty() {
            println!("No active surgical cases at the moment.");
        } else {
            print_records(&board.records);
        }
        for line in display::ticker(store, "").updates {
            println!("  >> {line}");
        }

        loop {
            std::thread::sleep(Duration::from_secs(1));
            if countdown.tick() {
                break;
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let cfg = CoreConfig::from_env_values(
        std::env::var("OTBOARD_DATA_DIR").ok(),
        std::env::var("OTBOARD_POLL_SECS").ok(),
    )?;

    match cli.command {
        Some(Commands::List) => {
            let store = SharedRecordStore::open(&cfg)?;
            print_records(&store.list());
        }
        Some(Commands::Recent { limit }) => {
            let store = SharedRecordStore::open(&cfg)?;
            for record in store.recent_updates(limit) {
                println!("{}", record.ticker_line());
            }
        }
        Some(Commands::Upsert { uhid, name, status }) => {
            let store = SharedRecordStore::open(&cfg)?;
            let view = staff::submit(&store, StaffForm { uhid, name, status })?;
            if let Some(banner) = view.banner {
                println!("{}", banner.text);
            }
        }
        Some(Commands::Delete { uhid }) => {
            let store = SharedRecordStore::open(&cfg)?;
            let before = store.list().len();
            let view = staff::delete(&store, &uhid)?;
            if view.record_count() < before {
                println!("Deleted record: {}", uhid);
            } else {
                println!("No record with UHID: {}", uhid);
            }
        }
        Some(Commands::Statuses) => {
            for status in OtStatus::ALL {
                println!("{:<16} {}", status.key(), status.label());
            }
        }
        Some(Commands::Login { identifier, secret }) => match login_line(&identifier, &secret) {
            Ok(line) => println!("{}", line),
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        Some(Commands::Watch) => {
            let store = SharedRecordStore::open(&cfg)?;
            watch(&store, &cfg);
        }
        None => {
            println!("Use 'otboard --help' for commands");
        }
    }

    Ok(())
}
