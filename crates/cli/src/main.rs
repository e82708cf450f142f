use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use scribe_chat::{chat_config_from_env_values, ChatCompletionClient, ChatEnv};
use scribe_core::{
    compute_clearance_with_mode, highlight_disposition_status, highlight_drug_recommendation,
    scribe_config_from_env_values, split_consult_entries, split_sections, ClearanceMode,
    DraftService, DraftTask, PatientRecord, PatientVitals, PromptPlan, ProphylaxisRule,
    ScribeConfig, ScribeEnv,
};

#[derive(Parser)]
#[command(name = "scribe")]
#[command(about = "Clinical scribe CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate creatinine clearance and recommend Heparin or Lovenox
    Clearance {
        /// Age in years
        age: u32,
        /// Weight in kilograms
        weight_kg: f64,
        /// Serum creatinine in mg/dL
        creatinine: f64,
        /// Reject implausible age and weight as well as non-positive creatinine
        #[arg(long)]
        strict: bool,
    },
    /// Split generated text into titled sections (reads stdin when no file is given)
    Sections {
        file: Option<PathBuf>,
        /// Section marker (defaults to SCRIBE_SECTION_MARKER or "###")
        #[arg(long)]
        marker: Option<String>,
    },
    /// Pair specialty labels with consult messages (reads stdin when no file is given)
    Consults {
        file: Option<PathBuf>,
        /// Pair token (defaults to SCRIBE_CONSULT_TOKEN or "**")
        #[arg(long)]
        token: Option<String>,
    },
    /// Emphasise drug recommendations and disposition statuses
    Highlight { file: Option<PathBuf> },
    /// Print the prompt for a patient record JSON file
    Prompt {
        record: PathBuf,
        /// Task to include (repeatable; defaults to all)
        #[arg(long = "task")]
        tasks: Vec<String>,
        /// Prophylaxis rule (cockcroft-gault or creatinine-cutoff)
        #[arg(long)]
        rule: Option<String>,
    },
    /// Generate a draft for a patient record JSON file and print it as JSON
    Draft {
        record: PathBuf,
        /// Task to include (repeatable; defaults to all)
        #[arg(long = "task")]
        tasks: Vec<String>,
        /// Prophylaxis rule (cockcroft-gault or creatinine-cutoff)
        #[arg(long)]
        rule: Option<String>,
    },
}

fn read_input(file: Option<&Path>) -> std::io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => std::io::read_to_string(std::io::stdin()),
    }
}

fn read_record(path: &Path) -> Result<PatientRecord, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn parse_plan_args(
    tasks: &[String],
    rule: Option<&str>,
) -> Result<(Vec<DraftTask>, Option<ProphylaxisRule>), Box<dyn std::error::Error>> {
    let tasks = tasks
        .iter()
        .map(|t| t.parse::<DraftTask>())
        .collect::<Result<Vec<_>, _>>()?;
    let rule = rule.map(str::parse::<ProphylaxisRule>).transpose()?;
    Ok((tasks, rule))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = scribe_config_from_env_values(ScribeEnv::from_process_env())?;

    match cli.command {
        Some(Commands::Clearance {
            age,
            weight_kg,
            creatinine,
            strict,
        }) => {
            let mode = if strict {
                ClearanceMode::Strict
            } else {
                cfg.clearance_mode()
            };
            let vitals = PatientVitals {
                age,
                weight_kg,
                creatinine,
            };
            match compute_clearance_with_mode(&vitals, mode) {
                Ok(result) => {
                    println!("Creatinine clearance: {} mL/min", result.creatinine_clearance());
                    println!("Recommendation: {}", result.recommendation());
                }
                Err(e) => eprintln!("Error computing clearance: {}", e),
            }
        }
        Some(Commands::Sections { file, marker }) => {
            let text = read_input(file.as_deref())?;
            let marker = marker.unwrap_or_else(|| cfg.section_marker().to_string());
            let document = split_sections(&text, &marker);
            if document.is_empty() {
                println!("No sections found.");
            }
            for section in document.sections() {
                let title = if section.title.is_empty() {
                    "(preamble)"
                } else {
                    section.title.as_str()
                };
                println!("== {}\n{}\n", title, section.body);
            }
        }
        Some(Commands::Consults { file, token }) => {
            let text = read_input(file.as_deref())?;
            let token = token.unwrap_or_else(|| cfg.consult_token().to_string());
            match split_consult_entries(&text, &token) {
                Ok(entries) if entries.is_empty() => println!("No consults found."),
                Ok(entries) => {
                    for entry in entries {
                        println!("{}: {}", entry.specialty, entry.message);
                    }
                }
                Err(e) => eprintln!("Error splitting consults: {}", e),
            }
        }
        Some(Commands::Highlight { file }) => {
            let text = read_input(file.as_deref())?;
            println!(
                "{}",
                highlight_drug_recommendation(&highlight_disposition_status(&text))
            );
        }
        Some(Commands::Prompt {
            record,
            tasks,
            rule,
        }) => {
            let record = read_record(&record)?;
            record.validate()?;
            let (tasks, rule) = parse_plan_args(&tasks, rule.as_deref())?;
            let plan = cfg.plan(&tasks, rule)?;
            let clearance = if plan.prophylaxis_rule().is_computed()
                && plan.includes(DraftTask::Prophylaxis)
            {
                Some(compute_clearance_with_mode(
                    &record.vitals(),
                    cfg.clearance_mode(),
                )?)
            } else {
                None
            };
            println!("{}", plan.render(&record, clearance.as_ref()));
        }
        Some(Commands::Draft {
            record,
            tasks,
            rule,
        }) => {
            let record = read_record(&record)?;
            let (tasks, rule) = parse_plan_args(&tasks, rule.as_deref())?;
            let plan = cfg.plan(&tasks, rule)?;
            run_draft(cfg, &record, &plan)?;
        }
        None => {
            println!("Use 'scribe --help' for commands");
        }
    }

    Ok(())
}

fn run_draft(
    cfg: ScribeConfig,
    record: &PatientRecord,
    plan: &PromptPlan,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(chat_cfg) = chat_config_from_env_values(ChatEnv::from_process_env())? else {
        eprintln!("OPENAI_API_KEY is not set; cannot generate a draft");
        return Ok(());
    };
    let client = ChatCompletionClient::new(chat_cfg)?;
    let service = DraftService::new(Arc::new(cfg), Arc::new(client));

    let runtime = tokio::runtime::Runtime::new()?;
    match runtime.block_on(service.draft(record, plan)) {
        Ok(draft) => {
            println!("{}", serde_json::to_string_pretty(&draft)?);
            for warning in &draft.warnings {
                eprintln!("Warning: {}", warning);
            }
        }
        Err(e) => eprintln!("Error generating draft: {}", e),
    }

    Ok(())
}
