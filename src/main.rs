use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};

mod api;
mod dashboard;
mod fiscal;
mod models;
mod report;
mod search;

use api::ApiClient;
use models::{Role, Session};
use search::SearchCriteria;

#[derive(Parser)]
#[command(name = "issue-tracker-reports")]
#[command(about = "Reporting tool for the Issue Tracker", long_about = None)]
struct Cli {
    /// Role of the requesting account
    #[arg(long, value_enum)]
    role: Role,

    /// Username of the requesting account
    #[arg(long)]
    user: String,

    /// Company for client roles; resolved from the user list when omitted
    #[arg(long)]
    company: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Financial-year pivot of issues and hours per employee
    UserWise {
        /// Financial-year start year; defaults to the current financial year
        #[arg(long)]
        year: Option<i32>,
        /// Write the report to a markdown file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Also write the summary rows to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// List the issues behind one pivot cell
    DrillDown {
        #[arg(long)]
        employee: String,
        /// Financial month name (Apr..Mar) or index (0..11)
        #[arg(long)]
        month: String,
        #[arg(long)]
        year: Option<i32>,
    },
    /// Issue counts by status, priority, client, and calendar buckets
    Dashboard {
        /// Days of daily trend to include
        #[arg(long, default_value_t = 30)]
        days: u32,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Search issues by criteria; at least one criterion is required
    Search {
        /// Case-insensitive substring of the issue number
        #[arg(long)]
        issue_number: Option<String>,
        #[arg(long)]
        client: Option<String>,
        #[arg(long)]
        module: Option<String>,
        #[arg(long)]
        issue_type: Option<String>,
        #[arg(long)]
        level: Option<String>,
        #[arg(long)]
        resolution_type: Option<String>,
        #[arg(long)]
        assign_to: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// Earliest target date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Latest target date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Write the full matching records to a JSON file
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let base_url = std::env::var("ISSUE_TRACKER_API_URL")
        .context("ISSUE_TRACKER_API_URL must be set to the issue registry base URL")?;
    let client = ApiClient::new(&base_url);

    let mut session = Session {
        role: cli.role,
        username: cli.user,
        company: cli.company,
    };
    if session.role.is_client() && session.company.is_none() {
        session.company = Some(client.resolve_company(&session)?);
    }

    let issues = client.fetch_issues(&session)?;
    let today = Utc::now().date_naive();

    match cli.command {
        Commands::UserWise { year, out, csv } => {
            let start_year = year.unwrap_or_else(|| fiscal::current_financial_year(today));
            let filtered = fiscal::filter_by_financial_year(&issues, start_year);
            let rows = fiscal::aggregate(&filtered);

            if let Some(path) = &csv {
                let file = std::fs::File::create(path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                report::write_summary_csv(file, &rows)?;
                println!("Summary written to {}.", path.display());
            }

            emit(report::user_wise_report(start_year, &rows), out.as_deref())?;
        }
        Commands::DrillDown {
            employee,
            month,
            year,
        } => {
            let Some(month_index) = fiscal::parse_financial_month(&month) else {
                anyhow::bail!(
                    "unrecognized financial month '{month}': expected Apr..Mar or an index 0..11"
                );
            };
            let start_year = year.unwrap_or_else(|| fiscal::current_financial_year(today));
            let filtered = fiscal::filter_by_financial_year(&issues, start_year);
            let matches = fiscal::drill_down(&filtered, &employee, month_index);
            print!("{}", report::drill_down_report(&employee, month_index, &matches));
        }
        Commands::Dashboard { days, out } => {
            let summary = dashboard::DashboardSummary::compute(&issues, &session);
            let trend = dashboard::daily_trend(&issues, today, days);
            emit(report::dashboard_report(&summary, &trend), out.as_deref())?;
        }
        Commands::Search {
            issue_number,
            client: client_name,
            module,
            issue_type,
            level,
            resolution_type,
            assign_to,
            status,
            from,
            to,
            out,
        } => {
            let criteria = SearchCriteria {
                issue_number,
                client: client_name,
                module,
                issue_type,
                level,
                resolution_type,
                assign_to,
                status,
                from,
                to,
            };
            if criteria.is_empty() {
                anyhow::bail!("please enter at least one search criteria");
            }

            let results = search::search(&issues, &session, &criteria);
            if results.is_empty() {
                println!("No issues found matching the search criteria.");
                return Ok(());
            }

            if let Some(path) = &out {
                let rendered = serde_json::to_string_pretty(&results)
                    .context("failed to serialize search results")?;
                std::fs::write(path, rendered)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Results written to {}.", path.display());
            }
            print!("{}", report::search_report(&results));
        }
    }

    Ok(())
}

fn emit(rendered: String, out: Option<&std::path::Path>) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Report written to {}.", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}
