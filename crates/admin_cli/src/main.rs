use std::{error::Error, fs::File, io::Write, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::Engine;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

mod csv_io;

/// Minimum accepted by `Engine::new_user`.
const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Parser, Debug)]
#[command(name = "greenyard_admin")]
#[command(about = "Admin utilities for Greenyard (users, CSV import/export)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./greenyard.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Supplier(Supplier),
    Nursery(Nursery),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct Supplier {
    #[command(subcommand)]
    command: SupplierCommand,
}

#[derive(Subcommand, Debug)]
enum SupplierCommand {
    /// Import suppliers from a CSV file; nothing is stored if any row fails.
    Import(ImportArgs),
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct Nursery {
    #[command(subcommand)]
    command: NurseryCommand,
}

#[derive(Subcommand, Debug)]
enum NurseryCommand {
    /// Export the current stock lines.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct ImportArgs {
    file: PathBuf,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Output file; standard output when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn output(out: Option<&PathBuf>) -> Result<Box<dyn Write>, Box<dyn Error + Send + Sync>> {
    Ok(match out {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(std::io::stdout().lock()),
    })
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.chars().count() < MIN_PASSWORD_CHARS {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print(format!(
                    "Password must be at least {MIN_PASSWORD_CHARS} characters.\r\n"
                ))
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;
            match engine.new_user(&args.username, &password).await {
                Ok(user) => println!("created user: {}", user.username),
                Err(engine::EngineError::ExistingKey(_)) => {
                    eprintln!("user already exists: {}", args.username);
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::Supplier(Supplier {
            command: SupplierCommand::Import(args),
        }) => {
            let rows = csv_io::read_suppliers(File::open(&args.file)?)?;
            let count = engine.import_suppliers(rows).await?;
            println!("imported {count} suppliers");
        }
        Command::Supplier(Supplier {
            command: SupplierCommand::Export(args),
        }) => {
            let suppliers = engine.all_suppliers().await?;
            csv_io::write_suppliers(output(args.out.as_ref())?, &suppliers)?;
            if let Some(path) = args.out {
                eprintln!("exported {} suppliers to {}", suppliers.len(), path.display());
            }
        }
        Command::Nursery(Nursery {
            command: NurseryCommand::Export(args),
        }) => {
            let plants = engine.all_plants().await?;
            csv_io::write_plants(output(args.out.as_ref())?, &plants)?;
            if let Some(path) = args.out {
                eprintln!("exported {} plants to {}", plants.len(), path.display());
            }
        }
    }

    Ok(())
}
