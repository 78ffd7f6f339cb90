use clap::Args;
use lucky_draw::config::FetchPolicy;
use lucky_draw::directory::DirectoryPolicy;
use lucky_draw::error::AppError;
use lucky_draw::roster::{normalize_rows, RemoteRosterFetcher, RosterFormat, RosterLoader};
use lucky_draw::winners::{lookup, PrizeOutcome, PRIZE_SEPARATOR};

#[derive(Args, Debug)]
pub(crate) struct LookupArgs {
    /// Roster location: an http(s) URL or a local CSV path
    #[arg(long)]
    pub(crate) roster: String,
    /// Attendee name, compared exactly after trimming
    #[arg(long)]
    pub(crate) name: String,
    /// Company filter, matched leniently
    #[arg(long)]
    pub(crate) company: Option<String>,
    /// Roster column layout (voucher_ledger, prize_summary, unit_roster)
    #[arg(long, default_value = "voucher_ledger", value_parser = crate::infra::parse_format)]
    pub(crate) format: RosterFormat,
}

#[derive(Args, Debug)]
pub(crate) struct CompaniesArgs {
    /// Roster location: an http(s) URL or a local CSV path
    #[arg(long)]
    pub(crate) roster: String,
    /// Roster column layout (voucher_ledger, prize_summary, unit_roster)
    #[arg(long, default_value = "prize_summary", value_parser = crate::infra::parse_format)]
    pub(crate) format: RosterFormat,
}

fn loader() -> RosterLoader<RemoteRosterFetcher> {
    RosterLoader::new(RemoteRosterFetcher::default(), FetchPolicy::default())
}

pub(crate) async fn run_lookup(args: LookupArgs) -> Result<(), AppError> {
    let LookupArgs {
        roster,
        name,
        company,
        format,
    } = args;

    let rows = loader().load(&roster).await?;
    let records = normalize_rows(&rows, &format);
    let outcome = lookup(&records, &name, company.as_deref());

    println!("Roster: {roster} ({}, {} records)", format.name, records.len());
    render_outcome(&name, &outcome);
    Ok(())
}

pub(crate) async fn run_companies(args: CompaniesArgs) -> Result<(), AppError> {
    let policy = DirectoryPolicy::for_format(&args.format);
    let companies = match loader().load(&args.roster).await {
        Ok(rows) => policy.build(&rows),
        Err(err) => {
            println!("Roster unavailable ({err}); showing fallback list");
            policy.fallback()
        }
    };

    for company in companies {
        println!("- {company}");
    }
    Ok(())
}

fn render_outcome(name: &str, outcome: &PrizeOutcome) {
    match outcome {
        PrizeOutcome::NotFound => println!("{name}: no winner found"),
        PrizeOutcome::MatchedWithoutPrize => {
            println!("{name}: on the roster, but no prize is recorded")
        }
        PrizeOutcome::Awarded { prize, ids } => {
            if ids.is_empty() {
                println!("{name}:");
            } else {
                println!("{name} (#{}):", ids.join(", #"));
            }
            for line in prize.split(PRIZE_SEPARATOR) {
                println!("  - {line}");
            }
        }
    }
}
