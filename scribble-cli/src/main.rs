use clap::{Parser, Subcommand, ValueEnum};
use scribble::Store;
use std::process;

mod seed;

/// Scribble CLI: read and write JSON records in a Scribble data directory
#[derive(Parser)]
#[command(name = "scribble", version, about)]
struct Cli {
    /// Path to the data directory
    #[arg(long, default_value = "./data")]
    data_dir: String,

    /// Output format
    #[arg(long, default_value = "json")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Write a record, replacing any previous version
    Write {
        /// Collection name
        collection: String,
        /// Resource name
        resource: String,
        /// Record body as JSON (e.g. '{"Name":"Alice"}')
        json: String,
    },

    /// Read a single record
    Read {
        /// Collection name
        collection: String,
        /// Resource name, with or without the .json extension
        resource: String,
    },

    /// Read every record in a collection
    ReadAll {
        /// Collection name
        collection: String,
    },

    /// List resource names in a collection
    List {
        /// Collection name
        collection: String,
    },

    /// Delete a record (or a nested collection directory)
    Delete {
        /// Collection name
        collection: String,
        /// Resource name
        resource: String,
    },

    /// Delete an entire collection
    Drop {
        /// Collection name
        collection: String,
    },

    /// Populate the `user` collection with sample records and print them back
    Seed,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR:{e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::new(&cli.data_dir, None)?;

    match cli.command {
        Command::Write {
            collection,
            resource,
            json,
        } => {
            let value: serde_json::Value = serde_json::from_str(&json)
                .map_err(|e| format!("Invalid JSON for '{collection}/{resource}': {e}"))?;
            store.write(&collection, &resource, &value)?;
            print_output(
                &serde_json::json!({ "ok": true, "collection": collection, "resource": resource }),
                &cli.format,
            )?;
        }

        Command::Read {
            collection,
            resource,
        } => {
            let value: serde_json::Value = store.read(&collection, &resource)?;
            print_output(&value, &cli.format)?;
        }

        Command::ReadAll { collection } => {
            let records: Vec<serde_json::Value> = store.read_all_as(&collection)?;
            print_output(&serde_json::Value::Array(records), &cli.format)?;
        }

        Command::List { collection } => {
            let names = store.list(&collection)?;
            print_output(&serde_json::json!(names), &cli.format)?;
        }

        Command::Delete {
            collection,
            resource,
        } => {
            store.delete(&collection, &resource)?;
            print_output(
                &serde_json::json!({ "ok": true, "deleted": format!("{collection}/{resource}") }),
                &cli.format,
            )?;
        }

        Command::Drop { collection } => {
            store.delete_collection(&collection)?;
            print_output(
                &serde_json::json!({ "ok": true, "dropped": collection }),
                &cli.format,
            )?;
        }

        Command::Seed => {
            let users = seed::populate(&store)?;
            print_output(&serde_json::to_value(users)?, &cli.format)?;
        }
    }

    Ok(())
}

fn print_output(
    value: &serde_json::Value,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}
