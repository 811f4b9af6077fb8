//! Case commands - open, inspect and move cost-savings cases

use clap::{Args, Subcommand};
use console::style;
use dialoguer::{Confirm, Input};
use miette::{bail, IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::helpers::{is_interactive, resolve_actor};
use crate::cli::output::{
    effective_format, format_ars, format_money, format_percent, print_structured, styled_money,
    styled_status,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::commit::{
    apply_commit, needs_justification, plan_status_change, record_results, StatusChangeRequest,
};
use crate::core::currency::{to_ars, CurrencyType};
use crate::core::savings::{ArsBreakdown, SavingsBreakdown};
use crate::core::status::CaseStatus;
use crate::core::timeline::{newest_first, TimelineEvent};
use crate::core::transitions::{TransitionCheck, TransitionEngine};
use crate::core::{store, Config};
use crate::entities::{CostSavingsCase, NewCase};

#[derive(Debug, Subcommand)]
pub enum CaseCommands {
    /// Open a new case (starts in en_evaluacion)
    New(NewArgs),

    /// Show a case with its derived savings figures
    Show(CaseFileArgs),

    /// List the transitions available from the case's status
    Transitions(CaseFileArgs),

    /// Check whether a transition would be accepted
    Validate(ValidateArgs),

    /// Change the case status
    Transition(TransitionArgs),

    /// Record post-intervention results (status set automatically)
    Results(ResultsArgs),

    /// Add a note to the case timeline
    Note(NoteArgs),
}

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Directory where the case file is written
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Short case title
    #[arg(long, short = 't')]
    pub title: String,

    /// Patient reference
    #[arg(long)]
    pub patient: String,

    /// Diagnosis under treatment
    #[arg(long)]
    pub diagnosis: String,

    /// Baseline monthly cost
    #[arg(long)]
    pub initial_monthly: f64,

    /// Projection period in months
    #[arg(long)]
    pub months: u32,

    /// One-time intervention cost
    #[arg(long, default_value_t = 0.0)]
    pub intervention_cost: f64,

    /// Kind of intervention (e.g., "sustitución por genérico")
    #[arg(long)]
    pub intervention_type: Option<String>,

    /// Currency of the amounts (ARS or USD)
    #[arg(long, default_value_t = CurrencyType::Ars)]
    pub currency: CurrencyType,

    /// USD→ARS exchange rate
    #[arg(long, default_value_t = 1.0)]
    pub exchange_rate: f64,

    /// Evaluating doctor
    #[arg(long)]
    pub doctor: Option<String>,

    /// Tags (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(Debug, Args)]
pub struct CaseFileArgs {
    /// Path to the case file
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Path to the case file
    pub file: PathBuf,

    /// Target status
    #[arg(long)]
    pub to: CaseStatus,
}

#[derive(Debug, Args)]
pub struct TransitionArgs {
    /// Path to the case file
    pub file: PathBuf,

    /// Target status
    #[arg(long)]
    pub to: CaseStatus,

    /// Justification for the change
    #[arg(long, short = 'j')]
    pub justification: Option<String>,

    /// Confirm warnings without prompting
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Show what would be done without making changes
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct ResultsArgs {
    /// Path to the case file
    pub file: PathBuf,

    /// Monthly cost after the intervention
    #[arg(long)]
    pub current_monthly: f64,
}

#[derive(Debug, Args)]
pub struct NoteArgs {
    /// Path to the case file
    pub file: PathBuf,

    /// Note text
    pub text: String,
}

pub fn run(cmd: CaseCommands, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    match cmd {
        CaseCommands::New(args) => run_new(args, global, &config),
        CaseCommands::Show(args) => run_show(args, global, &config),
        CaseCommands::Transitions(args) => run_transitions(args, global, &config),
        CaseCommands::Validate(args) => run_validate(args, global, &config),
        CaseCommands::Transition(args) => run_transition(args, global, &config),
        CaseCommands::Results(args) => run_results(args, global, &config),
        CaseCommands::Note(args) => run_note(args, global, &config),
    }
}

fn format_for(global: &GlobalOpts, config: &Config) -> OutputFormat {
    effective_format(global.output, config.default_format.as_deref())
}

fn check_amount(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        bail!("{} must be a non-negative number, got {}", name, value);
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    check_amount("--initial-monthly", args.initial_monthly)?;
    check_amount("--intervention-cost", args.intervention_cost)?;
    if args.months == 0 {
        bail!("--months must be at least 1");
    }
    if args.title.trim().is_empty() {
        bail!("--title cannot be empty");
    }
    if !to_ars(1.0, args.currency, args.exchange_rate).is_available() {
        eprintln!(
            "{} USD case without a valid exchange rate: ARS values will be unavailable",
            style("!").yellow()
        );
    }

    let case = CostSavingsCase::new(
        NewCase {
            title: args.title,
            patient: args.patient,
            diagnosis: args.diagnosis,
            evaluating_doctor: args.doctor,
            intervention_type: args.intervention_type,
            currency_type: args.currency,
            exchange_rate: args.exchange_rate,
            initial_monthly_cost: args.initial_monthly,
            projected_period_months: args.months,
            intervention_cost: args.intervention_cost,
            tags: args.tags,
        },
        resolve_actor(global, config),
    );
    let path = store::create(&args.dir, &case).into_diagnostic()?;
    tracing::info!(case = %case.id, path = %path.display(), "case created");

    let format = format_for(global, config);
    match format {
        OutputFormat::Yaml | OutputFormat::Json => print_structured(&case, format),
        _ => {
            println!(
                "{} Created case {}",
                style("✓").green(),
                style(case.id.to_string()).cyan()
            );
            println!("   {}", path.display());
            Ok(())
        }
    }
}

/// Case plus everything derived from it, for structured output
#[derive(Serialize)]
struct CaseView<'a> {
    #[serde(flatten)]
    case: &'a CostSavingsCase,
    derived: SavingsBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    ars: Option<ArsBreakdown>,
    available_transitions: Vec<CaseStatus>,
}

fn run_show(args: CaseFileArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    let case = store::load_case(&args.file).into_diagnostic()?;
    let engine = TransitionEngine::default();
    let savings = case.savings();
    let ars = (case.currency_type == CurrencyType::Usd)
        .then(|| savings.in_ars(case.currency_type, case.exchange_rate));

    let format = format_for(global, config);
    if matches!(format, OutputFormat::Yaml | OutputFormat::Json) {
        let view = CaseView {
            case: &case,
            derived: savings,
            ars,
            available_transitions: engine.available_transitions(case.status),
        };
        return print_structured(&view, format);
    }

    let c = case.currency_type;
    println!("{}  {}", style(case.id.to_string()).cyan(), style(&case.title).bold());
    println!("Estado:        {}", styled_status(case.status));
    println!("Paciente:      {}", case.patient);
    println!("Diagnóstico:   {}", case.diagnosis);
    if let Some(doctor) = &case.evaluating_doctor {
        println!("Médico:        {}", doctor);
    }
    if let Some(kind) = &case.intervention_type {
        println!("Intervención:  {}", kind);
    }
    if c == CurrencyType::Usd {
        println!("Moneda:        USD (cotización: {})", case.exchange_rate);
    }
    println!();
    println!(
        "Costo mensual inicial:  {}  ({} meses)",
        format_money(case.initial_monthly_cost, c),
        case.projected_period_months
    );
    match case.current_monthly_cost {
        Some(cost) => println!("Costo mensual actual:   {}", format_money(cost, c)),
        None => println!("Costo mensual actual:   (sin resultados)"),
    }
    println!("Costo de intervención:  {}", format_money(case.intervention_cost, c));
    if savings.has_results {
        println!("Ahorro mensual:         {}", styled_money(savings.monthly_savings, c));
        println!("Ahorro proyectado:      {}", styled_money(savings.projected_savings, c));
        println!(
            "Porcentaje de ahorro:   {} ({})",
            format_percent(savings.savings_percentage),
            savings.efficiency(&config.savings).label()
        );
        if let Some(ars) = ars {
            println!("Ahorro proyectado ARS:  {}", format_ars(ars.projected_savings));
        }
    } else if let Some(ars) = ars {
        println!("Costo inicial ARS:      {}", format_ars(ars.initial_cost));
    }
    if let Some(justification) = &case.justification {
        println!("Justificación:          {}", justification);
    }

    if !case.timeline.is_empty() {
        println!();
        println!("{}", style("Historial").bold());
        for event in newest_first(&case.timeline) {
            print_event(event);
        }
    }
    Ok(())
}

fn print_event(event: &TimelineEvent) {
    let mut line = format!(
        "  {}  {:<24} {}",
        event.timestamp.format("%Y-%m-%d %H:%M"),
        event.title(),
        event.actor
    );
    if let (Some(from), Some(to)) = (event.from, event.to) {
        line.push_str(&format!("  {} → {}", from.label(), to.label()));
    }
    println!("{}", line);
    if let Some(text) = event.justification.as_ref().or(event.description.as_ref()) {
        println!("      {}", style(text).dim());
    }
}

#[derive(Serialize)]
struct TransitionOption {
    to: CaseStatus,
    label: String,
    requires_justification: bool,
}

fn run_transitions(args: CaseFileArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    let case = store::load_case(&args.file).into_diagnostic()?;
    let engine = TransitionEngine::default();
    let options: Vec<TransitionOption> = engine
        .available_transitions(case.status)
        .into_iter()
        .map(|to| TransitionOption {
            to,
            label: engine.menu_label(case.status, to).to_string(),
            requires_justification: engine.requires_justification(to),
        })
        .collect();

    let format = format_for(global, config);
    if matches!(format, OutputFormat::Yaml | OutputFormat::Json) {
        return print_structured(&options, format);
    }

    if options.is_empty() {
        println!("{} is {}: no transitions available", case.id, case.status.label());
        return Ok(());
    }
    for option in &options {
        let marker = if option.requires_justification {
            " (requiere justificación)"
        } else {
            ""
        };
        println!("{:<18} {}{}", option.to.as_str(), option.label, marker);
    }
    Ok(())
}

fn run_validate(args: ValidateArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    let case = store::load_case(&args.file).into_diagnostic()?;
    let engine = TransitionEngine::default();
    let check = engine.validate_transition(case.status, args.to, &case.snapshot());

    let format = format_for(global, config);
    if matches!(format, OutputFormat::Yaml | OutputFormat::Json) {
        print_structured(&check, format)?;
    } else {
        print_check(&check);
    }

    if !check.valid {
        bail!(
            "Transition {} → {} is not allowed",
            case.status.as_str(),
            args.to.as_str()
        );
    }
    Ok(())
}

fn print_check(check: &TransitionCheck) {
    match (&check.error, &check.warning) {
        (Some(error), _) => println!("{} {}", style("✗").red(), error),
        (None, Some(warning)) => {
            println!("{} valid with warning: {}", style("!").yellow(), warning)
        }
        (None, None) => println!("{} valid", style("✓").green()),
    }
}

fn run_transition(args: TransitionArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    let mut case = store::load_case(&args.file).into_diagnostic()?;
    let engine = TransitionEngine::default();
    let check = engine.validate_transition(case.status, args.to, &case.snapshot());

    if let Some(error) = &check.error {
        bail!("{}", error);
    }

    let interactive = is_interactive();
    let mut confirmed = args.yes;
    if let Some(warning) = &check.warning {
        eprintln!("{} {}", style("!").yellow(), warning);
        if !confirmed && interactive {
            confirmed = Confirm::new()
                .with_prompt("¿Desea continuar?")
                .default(false)
                .interact()
                .into_diagnostic()?;
        }
        if !confirmed {
            bail!("Transition not confirmed (use --yes to confirm non-interactively)");
        }
    }

    let mut justification = args.justification.clone();
    let missing = !justification
        .as_deref()
        .is_some_and(|j| !j.trim().is_empty());
    if needs_justification(&engine, args.to, &check) && missing && interactive {
        let text: String = Input::new()
            .with_prompt("Justificación")
            .interact_text()
            .into_diagnostic()?;
        justification = Some(text);
    }

    let request = StatusChangeRequest {
        target: args.to,
        actor: resolve_actor(global, config),
        confirmed,
        justification,
    };
    let commit =
        plan_status_change(&engine, &case, &request, chrono::Utc::now()).into_diagnostic()?;

    if args.dry_run {
        println!(
            "Would change {}: {} → {}",
            case.id,
            commit.from.label(),
            commit.to.label()
        );
        return Ok(());
    }

    let (from, to) = (commit.from, commit.to);
    apply_commit(&mut case, commit);
    store::save(&args.file, &mut case).into_diagnostic()?;
    println!(
        "{} {}: {} → {}",
        style("✓").green(),
        case.id,
        styled_status(from),
        styled_status(to)
    );
    Ok(())
}

fn run_results(args: ResultsArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    let mut case = store::load_case(&args.file).into_diagnostic()?;
    let actor = resolve_actor(global, config);
    let update = record_results(&mut case, args.current_monthly, &actor, chrono::Utc::now())
        .into_diagnostic()?;
    store::save(&args.file, &mut case).into_diagnostic()?;

    let savings = case.savings();
    println!(
        "{} Results recorded for {}: {} → {} (automatic)",
        style("✓").green(),
        case.id,
        styled_status(update.from),
        styled_status(update.to)
    );
    println!(
        "   Ahorro proyectado: {} ({})",
        styled_money(savings.projected_savings, case.currency_type),
        format_percent(savings.savings_percentage)
    );
    Ok(())
}

fn run_note(args: NoteArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    if args.text.trim().is_empty() {
        bail!("Note text cannot be empty");
    }
    let mut case = store::load_case(&args.file).into_diagnostic()?;
    let actor = resolve_actor(global, config);
    case.timeline
        .push(TimelineEvent::note(actor, chrono::Utc::now(), args.text.trim()));
    store::save(&args.file, &mut case).into_diagnostic()?;
    println!("{} Note added to {}", style("✓").green(), case.id);
    Ok(())
}
