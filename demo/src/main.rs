//! PHARMFLOW command-line front end.
//!
//! Usage:
//!   cargo run -p demo -- walkthrough
//!   cargo run -p demo -- check --medications "warfarin, aspirin"
//!   cargo run -p demo -- check --medications ibuprofen --current naproxen
//!   cargo run -p demo -- --knowledge my-rules.toml knowledge

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pharmflow_api::{ApiRequest, ApiResponse, IntakeApi};
use pharmflow_audit::InMemoryActivityLog;
use pharmflow_contracts::{error::PharmError, intake::IntakeId};
use pharmflow_core::IntakeWorkflow;
use pharmflow_interactions::KnowledgeBase;
use pharmflow_store::InMemoryIntakeStore;

// ── CLI definition ────────────────────────────────────────────────────────────

/// PHARMFLOW: pharmacy intake workflow with drug interaction screening.
#[derive(Parser)]
#[command(
    name = "pharmflow",
    about = "Pharmacy intake workflow demo",
    long_about = "Walks an intake through the pharmacy workflow, screens medication\n\
                  lists for interactions, and inspects the loaded knowledge base."
)]
struct Cli {
    /// Knowledge-base TOML replacing the built-in interaction and counseling rules.
    #[arg(long, global = true, value_name = "PATH")]
    knowledge: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a warfarin + aspirin intake and walk it from new to completed.
    Walkthrough,
    /// Screen a medication list and print warnings and counseling points.
    Check {
        /// Newly prescribed medications, separated by ',', ';' or newlines.
        #[arg(long)]
        medications: String,
        /// Medications the patient already takes.
        #[arg(long)]
        current: Option<String>,
    },
    /// Summarize the loaded knowledge base.
    Knowledge,
}

#[derive(Debug, Error)]
enum DemoError {
    #[error(transparent)]
    Pharm(#[from] PharmError),

    #[error("{route} returned {status}: {body}")]
    Request {
        route: &'static str,
        status: u16,
        body: Value,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = load_knowledge(cli.knowledge.as_ref()).and_then(|knowledge| match cli.command {
        Command::Walkthrough => run_walkthrough(knowledge),
        Command::Check {
            medications,
            current,
        } => {
            run_check(&knowledge, &medications, current.as_deref());
            Ok(())
        }
        Command::Knowledge => {
            print_knowledge(&knowledge);
            Ok(())
        }
    });

    if let Err(e) = result {
        eprintln!("pharmflow error: {}", e);
        std::process::exit(1);
    }
}

fn load_knowledge(path: Option<&PathBuf>) -> Result<KnowledgeBase, DemoError> {
    let knowledge = match path {
        Some(path) => {
            info!(path = %path.display(), "loading knowledge base");
            KnowledgeBase::from_file(path)?
        }
        None => KnowledgeBase::builtin()?,
    };
    Ok(knowledge)
}

// ── walkthrough ───────────────────────────────────────────────────────────────

fn run_walkthrough(knowledge: KnowledgeBase) -> Result<(), DemoError> {
    let log = InMemoryActivityLog::new("walkthrough");
    let workflow = IntakeWorkflow::new(
        Box::new(InMemoryIntakeStore::new()),
        Box::new(log.clone()),
        knowledge,
    );
    let api = IntakeApi::new(workflow)?;

    println!();
    println!("PHARMFLOW intake walkthrough");
    println!("============================");

    let created = send(
        &api,
        ApiRequest::CreateIntake {
            body: json!({
                "patient_name": "John Doe",
                "patient_age": 68,
                "patient_allergies": "penicillin",
                "medications": "Warfarin, Aspirin",
                "notes": "New prescription from cardiology",
            }),
        },
    )?;
    let id = created["id"].as_str().unwrap_or_default().to_string();
    let intake_id: IntakeId = id.parse()?;

    send(
        &api,
        ApiRequest::Assign {
            id: id.clone(),
            body: json!({ "user": "pharmacist-1" }),
        },
    )?;

    for status in ["triage", "waiting_info", "ready_to_fill", "filled"] {
        send(
            &api,
            ApiRequest::ChangeStatus {
                id: id.clone(),
                body: json!({ "status": status }),
            },
        )?;
    }

    send(
        &api,
        ApiRequest::UpdatePharmacistNotes {
            id: id.clone(),
            body: json!({ "pharmacist_notes": "Counseled on bleeding risk; INR follow-up booked." }),
        },
    )?;
    send(
        &api,
        ApiRequest::Dispense {
            id: id.clone(),
            body: json!({ "dispensed": "yes" }),
        },
    )?;
    send(
        &api,
        ApiRequest::ChangeStatus {
            id,
            body: json!({ "status": "completed" }),
        },
    )?;

    send(&api, ApiRequest::Statistics)?;

    let trail = log.export_log()?;
    let intact = |ok: bool| if ok { "VALID" } else { "BROKEN" };
    println!();
    println!("Activity trail: {} events", trail.events.len());
    println!("  terminal hash   : {}", trail.terminal_hash);
    println!("  chain integrity : {}", intact(log.verify_integrity()?));
    println!("  intake history  : {}", intact(log.verify_intake(intake_id)?));
    println!();
    Ok(())
}

/// Send one request, print the exchange, and fail on a non-2xx response.
fn send(api: &IntakeApi, request: ApiRequest) -> Result<Value, DemoError> {
    let route = request.route();
    let response = api.handle(request);

    println!();
    println!("{route} -> {}", response.status);
    println!(
        "{}",
        serde_json::to_string_pretty(&response.body).unwrap_or_else(|_| response.body.to_string())
    );

    if response.is_success() {
        Ok(response.body)
    } else {
        let ApiResponse { status, body } = response;
        Err(DemoError::Request {
            route,
            status,
            body,
        })
    }
}

// ── check ─────────────────────────────────────────────────────────────────────

fn run_check(knowledge: &KnowledgeBase, medications: &str, current: Option<&str>) {
    let warnings = knowledge.checker.check(medications, current);

    println!();
    if warnings.is_empty() {
        println!("No interactions found.");
    } else {
        println!("{} interaction(s) found:", warnings.len());
        for warning in &warnings {
            println!(
                "  [{}] {} + {}: {}",
                warning.severity, warning.drug1, warning.drug2, warning.description
            );
        }
    }

    println!();
    println!("Counseling points:");
    println!("{}", knowledge.counseling.generate(medications, &warnings));
    println!();
}

// ── knowledge ─────────────────────────────────────────────────────────────────

fn print_knowledge(knowledge: &KnowledgeBase) {
    let catalog = knowledge.checker.catalog();
    println!();
    println!("Knowledge base");
    println!("  interaction pairs : {}", catalog.pair_count());
    println!("  drug categories   : {}", catalog.category_count());
    println!("  counseling blocks : {}", knowledge.counseling.block_count());
    println!();
}
