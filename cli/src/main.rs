//! Where@ CLI: browse the org panel from a terminal
//!
//! Talks to a running server through the RemoteClient, or runs in-process
//! over seed files with `--seed`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use whereat_sdk::{EmbeddedClient, EmployeeId, OrgClient, PanelRow, RemoteClient, TreeController};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "whereat", version, about = "Where@ org panel CLI")]
struct Cli {
    /// Server HTTP URL
    #[arg(long, default_value = "http://localhost:3001", global = true, env = "WHEREAT_URL")]
    url: String,

    /// Run in-process over a seed directory instead of a server
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the org panel for a user
    Tree {
        /// User principal name
        principal: String,

        /// Employee ids to expand, in order
        #[arg(long)]
        expand: Vec<String>,
    },
    /// List the direct reports of an employee
    Reports {
        /// Employee id
        id: String,
    },
    /// Ask the team assistant
    Chat {
        message: String,

        /// Ask on behalf of this principal
        #[arg(long)]
        user: Option<String>,
    },
    /// Get server status
    Status,
    /// Start an interactive chat session
    Shell {
        #[arg(long)]
        user: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let client: Arc<dyn OrgClient> = match &cli.seed {
        Some(dir) => match EmbeddedClient::from_seed_dir(dir) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => Arc::new(RemoteClient::new(&cli.url)),
    };

    let result = match cli.command {
        Commands::Tree { principal, expand } => run_tree(client, &principal, &expand, &cli.format).await,
        Commands::Reports { id } => run_reports(client.as_ref(), &id, &cli.format).await,
        Commands::Chat { message, user } => run_chat(client.as_ref(), &message, user.as_deref()).await,
        Commands::Status => run_status(client.as_ref(), &cli.format).await,
        Commands::Shell { user } => run_shell(client.as_ref(), user.as_deref()).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_tree(client: Arc<dyn OrgClient>, principal: &str, expand: &[String], format: &OutputFormat) -> CliResult {
    let tree = TreeController::new(client);
    if !tree.load(principal).await? {
        println!("(no user record for {})", principal);
        return Ok(());
    }

    for id in expand {
        tree.toggle(&EmployeeId::new(id.as_str())).await?;
    }

    let rows = tree.rows().await;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Name", "Title", "Location", "Role", "Reports"]);
            for row in &rows {
                table.add_row(vec![
                    tree_label(row),
                    row.title.clone(),
                    row.location.clone().unwrap_or_default(),
                    row.badge.unwrap_or_default().to_string(),
                    row.child_count.map(|c| c.to_string()).unwrap_or_default(),
                ]);
            }
            println!("{}", table);
            println!("{} visible", rows.len());
        }
    }

    Ok(())
}

fn tree_label(row: &PanelRow) -> String {
    let marker = match (row.child_count.is_some(), row.open) {
        (false, _) => "  ",
        (true, true) => "- ",
        (true, false) => "+ ",
    };
    format!("{}{}{}", "  ".repeat(row.depth), marker, row.label)
}

async fn run_reports(client: &dyn OrgClient, id: &str, format: &OutputFormat) -> CliResult {
    let reports = client.get_direct_reports_details(id).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        OutputFormat::Table => {
            if reports.is_empty() {
                println!("(no direct reports)");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Id", "Name", "Title", "City", "Reports"]);
            for report in &reports {
                table.add_row(vec![
                    report.id().to_string(),
                    report.display_name().to_string(),
                    report.employee.job_title().to_string(),
                    report.employee.city().unwrap_or_default().to_string(),
                    report.direct_report_count.to_string(),
                ]);
            }
            println!("{}", table);
            println!("{} report(s)", reports.len());
        }
    }

    Ok(())
}

async fn run_chat(client: &dyn OrgClient, message: &str, user: Option<&str>) -> CliResult {
    let reply = client.chat(message, user).await?;
    println!("{}", reply);
    Ok(())
}

async fn run_status(client: &dyn OrgClient, format: &OutputFormat) -> CliResult {
    let status = client.status().await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        OutputFormat::Table => {
            println!("Status:  {}", status.status);
            println!("Version: {}", status.version);
            println!("Users:   {}", status.storage.users);
        }
    }

    Ok(())
}

async fn run_shell(client: &dyn OrgClient, user: Option<&str>) -> CliResult {
    println!("Where@ team assistant");
    println!("Ask about your team, or :help for commands. :quit to exit.\n");

    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        eprint!("whereat> ");

        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match trimmed {
            ":quit" | ":exit" | ":q" => break,
            ":help" | ":h" => {
                println!("Commands:");
                println!("  :status   Show server status");
                println!("  :quit     Exit shell");
                println!("  <text>    Ask the assistant");
            }
            ":status" => {
                if let Err(e) = run_status(client, &OutputFormat::Table).await {
                    eprintln!("Error: {}", e);
                }
            }
            message => {
                if let Err(e) = run_chat(client, message, user).await {
                    eprintln!("Error: {}", e);
                }
            }
        }
    }

    println!("Bye!");
    Ok(())
}
