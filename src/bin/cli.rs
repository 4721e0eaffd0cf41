//! MiniDB - Interactive Console

use std::env;
use std::io::{self, Write};

use anyhow::Result;
use minidb::executor::Executor;
use minidb::storage::Database;

/// Print welcome banner
fn print_banner(data_dir: &str) {
    println!(
        r#"
 __  __ _       _ ____  ____
|  \/  (_)_ __ (_)  _ \| __ )
| |\/| | | '_ \| | | | |  _ \
| |  | | | | | | | |_| | |_) |
|_|  |_|_|_| |_|_|____/|____/

 A small file-backed relational database
 Data directory: {}
 Type '.help' for help, '.quit' or 'exit' to leave
"#,
        data_dir
    );
}

/// Print help message
fn print_help() {
    println!(
        r#"
Commands:
  .help              Show this help message
  .quit              Exit MiniDB
  .tables            List all tables
  .schema <table>    Show table schema

Statements:
  CREATE TABLE ...   Create a new table
  INSERT INTO ...    Insert a row
  SELECT ...         Query data
  UPDATE ...         Update rows
  DELETE FROM ...    Delete rows

Examples:
  CREATE TABLE users (id int PRIMARY KEY, name str NOT NULL, age int);
  INSERT INTO users (id, name, age) VALUES (1, 'Alice', 30);
  SELECT name, age FROM users WHERE age >= 18;
"#
    );
}

/// Handle special dot commands
fn handle_special_command(cmd: &str, executor: &Executor) {
    let parts: Vec<&str> = cmd.split_whitespace().collect();

    match parts.first().copied() {
        Some(".help") => print_help(),
        Some(".quit") | Some(".exit") => {
            println!("Goodbye!");
            std::process::exit(0);
        }
        Some(".tables") => {
            let tables = executor.database().table_names();
            if tables.is_empty() {
                println!("No tables found.");
            } else {
                println!("Tables:");
                for table in tables {
                    println!("  {}", table);
                }
            }
        }
        Some(".schema") => {
            let names: Vec<String> = match parts.get(1) {
                Some(name) => vec![name.to_string()],
                None => executor
                    .database()
                    .table_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            };
            for name in names {
                match executor.database().get_table(&name) {
                    Ok(table) => {
                        println!("{}:", table.name());
                        for col in table.schema().columns() {
                            let mut flags = Vec::new();
                            if col.is_primary_key {
                                flags.push("PRIMARY KEY");
                            }
                            if col.is_unique {
                                flags.push("UNIQUE");
                            }
                            if !col.nullable {
                                flags.push("NOT NULL");
                            }
                            if flags.is_empty() {
                                println!("  {} {}", col.name, col.col_type);
                            } else {
                                println!("  {} {} {}", col.name, col.col_type, flags.join(" "));
                            }
                        }
                    }
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
        }
        Some(cmd) => {
            eprintln!("Unknown command: {}", cmd);
            eprintln!("Type '.help' for available commands.");
        }
        None => {}
    }
}

/// Main REPL loop
fn run_repl(data_dir: &str) -> Result<()> {
    let db = Database::open(data_dir)?;
    let mut executor = Executor::new(db);

    print_banner(data_dir);

    loop {
        print!("minidb> ");
        io::stdout().flush()?;

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                continue;
            }
        }

        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            break;
        }

        if trimmed.starts_with('.') {
            handle_special_command(trimmed, &executor);
            continue;
        }

        println!("{}", executor.execute_line(trimmed));
    }

    println!("Goodbye!");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let data_dir = env::args().nth(1).unwrap_or_else(|| "db_data".to_string());
    run_repl(&data_dir)
}
