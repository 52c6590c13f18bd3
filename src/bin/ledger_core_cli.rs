use std::{collections::HashMap, env, path::PathBuf, process};

use colored::Colorize;

use ledger_core::{
    config::{Config, ConfigManager},
    core::{
        services::{
            AggregationService, BucketQuery, EntryFilter, EntryService, InsightService,
            NewEntry, NewPatient, PatientService, SettlementReport, SummaryService, Totals,
        },
        Clock, LedgerManager, RosterManager, SystemClock,
    },
    domain::{
        category::resolve_category, ContactNumber, Displayable, EntryKind, Roster, SortOrder,
        TimeUnit, UserProfile,
    },
    errors::{LedgerError, Result},
    init,
    storage::{JsonClinicStore, JsonTrackerStore},
    utils::{dates::parse_date, paths::app_data_dir},
};
use uuid::Uuid;

fn main() {
    init();

    if let Err(err) = run() {
        eprintln!("{} {err}", "Error:".red().bold());
        process::exit(1);
    }
}

struct Context {
    base: PathBuf,
    config: Config,
    today: chrono::NaiveDate,
}

fn run() -> Result<()> {
    let mut args = env::args().skip(1);
    let (Some(area), Some(command)) = (args.next(), args.next()) else {
        print_usage();
        process::exit(1);
    };
    let rest = Arguments::parse(args.collect());

    let base = app_data_dir();
    let config = ConfigManager::with_base_dir(&base).load()?;
    let ctx = Context {
        base,
        config,
        today: SystemClock.today(),
    };

    match area.as_str() {
        "tracker" => run_tracker(&ctx, &command, rest),
        "clinic" => run_clinic(&ctx, &command, rest),
        _ => {
            print_usage();
            process::exit(1);
        }
    }
}

/// Positional values plus `--flag value` pairs.
struct Arguments {
    positional: Vec<String>,
    flags: HashMap<String, String>,
}

impl Arguments {
    fn parse(raw: Vec<String>) -> Self {
        let mut positional = Vec::new();
        let mut flags = HashMap::new();
        let mut iter = raw.into_iter();
        while let Some(arg) = iter.next() {
            if let Some(name) = arg.strip_prefix("--") {
                let value = iter.next().unwrap_or_default();
                flags.insert(name.to_string(), value);
            } else {
                positional.push(arg);
            }
        }
        Self { positional, flags }
    }

    fn required(&self, index: usize, name: &str) -> Result<&str> {
        self.positional
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| LedgerError::InvalidInput(format!("missing <{name}>")))
    }

    fn optional(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }

    fn flag(&self, name: &str) -> Option<&str> {
        self.flags.get(name).map(String::as_str)
    }
}

fn parse_amount(raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| LedgerError::InvalidInput(format!("`{raw}` is not a valid amount")))
}

fn run_tracker(ctx: &Context, command: &str, args: Arguments) -> Result<()> {
    let store = JsonTrackerStore::in_dir(&ctx.base);
    let money = |amount: f64| ctx.config.format_amount(amount);

    match command {
        "register" => {
            let username = args.required(0, "username")?;
            let profile = UserProfile::new(username, args.optional(1).map(str::to_string))?;
            store.register(&profile)?;
            println!("{} registered {}", "✓".green(), profile.username.bold());
        }
        "add" => {
            let username = args.required(0, "username")?;
            let raw_kind = args.required(1, "expense|income")?;
            let kind = match EntryKind::parse(raw_kind) {
                Some(kind @ (EntryKind::Expense | EntryKind::Income)) => kind,
                _ => {
                    return Err(LedgerError::InvalidInput(format!(
                        "`{raw_kind}` is not expense or income"
                    )))
                }
            };
            let amount = parse_amount(args.required(2, "amount")?)?;
            let category = resolve_category(kind, args.required(3, "category")?)?;
            let date = match args.flag("date") {
                Some(raw) => parse_date(raw)?,
                None => ctx.today,
            };
            let mut input = NewEntry::new(date, kind, amount, category);
            if let Some(note) = args.flag("note") {
                input = input.with_description(note);
            }
            let manager = LedgerManager::new(Box::new(store));
            let id = manager.update(username, |ledger| EntryService::add(ledger, input))?;
            println!("{} recorded entry #{id} ({})", "✓".green(), money(amount));
        }
        "remove" => {
            let username = args.required(0, "username")?;
            let raw_id = args.required(1, "id")?;
            let id = raw_id
                .parse::<u64>()
                .map_err(|_| LedgerError::InvalidInput(format!("`{raw_id}` is not an entry id")))?;
            let manager = LedgerManager::new(Box::new(store));
            let removed = manager.update(username, |ledger| EntryService::remove(ledger, id))?;
            println!("{} removed {}", "✓".green(), removed.display_label());
        }
        "history" => {
            let username = args.required(0, "username")?;
            let ledger = LedgerManager::new(Box::new(store)).load(username)?;
            let filter = history_filter(ctx, &args)?;
            let view = SummaryService::filter(&ledger.entries, filter);
            if view.is_empty() {
                println!("{}", "No records found.".yellow());
                return Ok(());
            }
            let mut entries = view.entries.clone();
            if ctx.config.default_order == SortOrder::Descending {
                entries.reverse();
            }
            for entry in &entries {
                let line = entry.display_label();
                match entry.kind {
                    EntryKind::Income => println!("{}", line.green()),
                    _ => println!("{}", line.red()),
                }
            }
            print_totals(ctx, &view.totals);
        }
        "summary" => {
            let username = args.required(0, "username")?;
            let ledger = LedgerManager::new(Box::new(store)).load(username)?;
            let unit = match args.flag("by") {
                Some(raw) => TimeUnit::parse(raw).ok_or_else(|| {
                    LedgerError::InvalidInput(format!("`{raw}` is not day, week, month or year"))
                })?,
                None => TimeUnit::Month,
            };
            let order = match args.flag("order") {
                Some(raw) => SortOrder::parse(raw).ok_or_else(|| {
                    LedgerError::InvalidInput(format!("`{raw}` is not asc or desc"))
                })?,
                None => ctx.config.default_order,
            };
            let mut query = BucketQuery::new(unit).order(order);
            if let Some(raw) = args.flag("last") {
                let count = raw.parse::<u32>().map_err(|_| {
                    LedgerError::InvalidInput(format!("`{raw}` is not a number of {unit}s"))
                })?;
                query = query.last(count);
            }
            let report = AggregationService::bucketize(&ledger.entries, query, ctx.today);
            println!("{}", format!("{unit} summary").bold());
            for bucket in &report.buckets {
                let trend = bucket
                    .expense_change
                    .map(|change| format!(" ({change:+.1}% expenses)"))
                    .unwrap_or_default();
                println!(
                    "{}  income {} ({:.1}%)  expenses {} ({:.1}%)  savings {}{}",
                    bucket.key.bold(),
                    money(bucket.income_total).green(),
                    bucket.income_share,
                    money(bucket.expense_total).red(),
                    bucket.expense_share,
                    money(bucket.savings),
                    trend
                );
            }
            println!();
            for row in SummaryService::by_category(&ledger.entries) {
                println!(
                    "  {} / {}: {} ({:.1}%)",
                    row.kind,
                    row.category,
                    money(row.total),
                    row.share
                );
            }
        }
        "dashboard" => {
            let username = args.required(0, "username")?;
            let ledger = LedgerManager::new(Box::new(store)).load(username)?;
            let snapshot = InsightService::dashboard(&ledger.entries, ctx.today);
            println!("{}", format!("Dashboard for {username}").bold());
            print_totals(ctx, &snapshot.overall);
            println!(
                "Today: income {}  expenses {}",
                money(snapshot.today.totals.income).green(),
                money(snapshot.today.totals.expense).red()
            );
            println!(
                "Per day over {} day(s): income {}  expenses {}  savings {}",
                snapshot.days_tracked,
                money(snapshot.average_income_per_day),
                money(snapshot.average_expense_per_day),
                money(snapshot.average_savings_per_day)
            );
            match snapshot.expense_change {
                Some(change) => println!("Expenses vs yesterday: {change:+.1}%"),
                None => println!("{}", "No day-over-day expense comparison.".dimmed()),
            }
            if let Some(change) = snapshot.savings_change {
                println!("Savings vs yesterday: {change:+.1}%");
            }
            if snapshot.expense_trend != 0.0 {
                println!(
                    "Yesterday vs 7-day average: {}",
                    money(snapshot.expense_trend)
                );
            }
            if !snapshot.essential_focus.is_empty() {
                println!("Essentials to watch: {}", snapshot.essential_focus.join(", "));
            }
            if !snapshot.desire_focus.is_empty() {
                println!("Wants to trim: {}", snapshot.desire_focus.join(", "));
            }
        }
        _ => {
            print_usage();
            process::exit(1);
        }
    }
    Ok(())
}

fn history_filter(ctx: &Context, args: &Arguments) -> Result<EntryFilter> {
    if let Some(raw) = args.flag("recent") {
        let count = if raw.is_empty() {
            ctx.config.recent_limit
        } else {
            raw.parse::<usize>()
                .map_err(|_| LedgerError::InvalidInput(format!("`{raw}` is not a count")))?
        };
        return Ok(EntryFilter::Recent(count));
    }
    if let Some(raw) = args.flag("date") {
        return Ok(EntryFilter::OnDate(parse_date(raw)?));
    }
    let kind = match args.flag("kind") {
        Some(raw) => Some(
            EntryKind::parse(raw)
                .ok_or_else(|| LedgerError::InvalidInput(format!("`{raw}` is not a kind")))?,
        ),
        None => None,
    };
    match (kind, args.flag("category")) {
        (Some(kind), Some(raw)) => Ok(EntryFilter::Category(kind, resolve_category(kind, raw)?)),
        (Some(kind), None) => Ok(EntryFilter::Kind(kind)),
        (None, Some(_)) => Err(LedgerError::InvalidInput(
            "--category needs --kind".into(),
        )),
        (None, None) => Ok(EntryFilter::All),
    }
}

fn print_totals(ctx: &Context, totals: &Totals) {
    let money = |amount: f64| ctx.config.format_amount(amount);
    let savings = money(totals.savings);
    let savings = if totals.savings >= 0.0 {
        savings.green()
    } else {
        savings.red()
    };
    println!(
        "Income {} | Expenses {} | Savings {}",
        money(totals.income).green(),
        money(totals.expense).red(),
        savings.bold()
    );
}

fn run_clinic(ctx: &Context, command: &str, args: Arguments) -> Result<()> {
    let manager = RosterManager::new(Box::new(JsonClinicStore::in_dir(&ctx.base)));
    let today = ctx.today;
    let money = |amount: f64| ctx.config.format_amount(amount);

    let archived = manager.update(|roster| {
        Ok(PatientService::auto_archive(
            roster,
            today,
            ctx.config.archive_after_days,
        ))
    })?;
    if !archived.is_empty() {
        println!(
            "{}",
            format!("{} inactive patient(s) archived.", archived.archived.len()).dimmed()
        );
    }

    match command {
        "add" => {
            let contact = ContactNumber::parse(args.required(2, "contact")?)?;
            let mut input = NewPatient::new(
                args.required(0, "first name")?,
                args.required(1, "last name")?,
                contact,
            );
            if let Some(raw) = args.flag("bday") {
                input = input.with_birthday(parse_date(raw)?);
            }
            let id = manager.update(|roster| PatientService::create(roster, input, today))?;
            println!("{} patient added ({id})", "✓".green());
        }
        "charge" => {
            let query = args.required(0, "patient")?;
            let procedure = args.required(1, "procedure")?;
            let amount = parse_amount(args.required(2, "amount")?)?;
            let name = manager.update(|roster| {
                let id = PatientService::select(roster, query)?;
                PatientService::record_procedure(roster, id, procedure, amount, today)?;
                Ok(patient_name(roster, id))
            })?;
            println!("{} {procedure} ({}) billed to {name}", "✓".green(), money(amount));
        }
        "settle" => {
            let query = args.required(0, "patient")?;
            let payment = parse_amount(args.required(1, "amount")?)?;
            let report = manager.update(|roster| {
                let id = PatientService::select(roster, query)?;
                PatientService::settle(roster, id, payment, today)
            })?;
            print_settlement(ctx, &report);
        }
        "schedule" => {
            let query = args.required(0, "patient")?;
            let date = parse_date(args.required(1, "date")?)?;
            manager.update(|roster| {
                let id = PatientService::select(roster, query)?;
                PatientService::reschedule(roster, id, date, today)
            })?;
            println!("{} appointment set for {date}", "✓".green());
        }
        "visit" => {
            let query = args.required(0, "patient")?;
            let outcome = manager.update(|roster| {
                let id = PatientService::select(roster, query)?;
                PatientService::mark_visit_done(roster, id, today)
            })?;
            if !outcome.on_schedule {
                println!(
                    "{}",
                    format!("Note: the visit was scheduled for {}.", outcome.schedule).yellow()
                );
            }
            println!("{} visit marked as done", "✓".green());
        }
        "balances" => {
            let roster = manager.load()?;
            let rows = PatientService::unpaid_balances(&roster);
            if rows.is_empty() {
                println!("{}", "All balances are settled.".green());
            }
            for row in rows {
                println!("{}: {}", row.name.bold(), money(row.balance).red());
            }
        }
        "upcoming" => {
            let roster = manager.load()?;
            let rows = PatientService::upcoming_appointments(&roster, today);
            if rows.is_empty() {
                println!("{}", "No upcoming appointments.".green());
            }
            for row in rows {
                println!("{} - {}", row.date, row.name);
            }
        }
        "dashboard" => {
            let roster = manager.load()?;
            let dashboard = PatientService::dashboard(&roster, today);
            let names = if dashboard.pending_today.is_empty() {
                "None".to_string()
            } else {
                dashboard.pending_today.join(", ")
            };
            println!(
                "Appointments today: {} | Names: {}",
                dashboard.pending_today.len(),
                names
            );
            println!("Unpaid patients: {}", dashboard.unpaid_patients);
        }
        "archive" => {
            let query = args.required(0, "patient")?;
            let name = manager.update(|roster| {
                let id = PatientService::select(roster, query)?;
                let name = patient_name(roster, id);
                PatientService::archive(roster, id, today)?;
                Ok(name)
            })?;
            println!("{} {name} archived", "✓".green());
        }
        _ => {
            print_usage();
            process::exit(1);
        }
    }
    Ok(())
}

fn patient_name(roster: &Roster, id: Uuid) -> String {
    roster
        .get(id)
        .map(|patient| patient.full_name())
        .unwrap_or_default()
}

fn print_settlement(ctx: &Context, report: &SettlementReport) {
    if report.already_settled {
        println!("{}", "No balance to settle.".green());
        return;
    }
    for allocation in &report.allocations {
        println!(
            "  charge #{}: paid {} (remaining {})",
            allocation.entry_id,
            ctx.config.format_amount(allocation.applied),
            ctx.config.format_amount(allocation.remaining)
        );
    }
    if report.fully_settled() {
        println!("{} balance fully settled", "✓".green());
    } else {
        println!(
            "Partial payment accepted. Remaining balance: {}",
            ctx.config.format_amount(report.balance).red()
        );
    }
}

fn print_usage() {
    eprintln!(
        "Usage: ledger_core_cli <tracker|clinic> <command> [args]\n\
         Tracker:\n  \
         register <user> [email]\n  \
         add <user> <expense|income> <amount> <category> [--date YYYY-MM-DD] [--note text]\n  \
         remove <user> <id>\n  \
         history <user> [--kind k] [--category c] [--date d] [--recent n]\n  \
         summary <user> [--by day|week|month|year] [--last n] [--order asc|desc]\n  \
         dashboard <user>\n\
         Clinic:\n  \
         add <first> <last> <contact> [--bday YYYY-MM-DD]\n  \
         <patient> is a patient id, a full name or part of a name\n  \
         charge <patient> <procedure> <amount>\n  \
         settle <patient> <amount>\n  \
         schedule <patient> <YYYY-MM-DD>\n  \
         visit <patient>\n  \
         balances | upcoming | dashboard\n  \
         archive <patient>"
    );
}
