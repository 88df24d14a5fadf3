//! Diagnostics CLI for the hosted habit backend.
//!
//! Reproduces the data-visibility investigation workflows against a live
//! project: dump the raw database state, resolve a user's partners, fetch a
//! partner's habits, and cross-check the `get_partners` RPC against a pure
//! derivation from the raw relationship ledger.

use clap::{Parser, Subcommand};
use std::collections::HashMap;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use habitlevelup_client::{
    ledger, BackendConfig, HabitBackend, PartnerHabitGateway, PartnerResolver, RestBackend,
};

#[derive(Parser, Debug)]
#[command(name = "habitlevelup-diag")]
#[command(about = "Diagnostics for partner resolution and habit visibility")]
struct Args {
    /// Project base URL
    #[arg(long, env = "SUPABASE_URL")]
    url: String,

    /// Value for the apikey header
    #[arg(long, env = "SUPABASE_ANON_KEY")]
    api_key: String,

    /// Bearer token; defaults to the API key when omitted
    #[arg(long, env = "SUPABASE_BEARER_TOKEN")]
    bearer_token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dump accounts, habits grouped by owner, and relationships
    DbState,
    /// Resolve a user's partners via the get_partners RPC
    Partners { user_id: String },
    /// Fetch every partner's habits for a user (concurrent fan-out)
    PartnerHabits { user_id: String },
    /// Compare the RPC result against a pure derivation from the raw ledger
    Crosscheck { user_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "habitlevelup_client=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let backend = RestBackend::new(BackendConfig {
        base_url: args.url,
        api_key: args.api_key,
        bearer_token: args.bearer_token,
        timeout_secs: args.timeout_secs,
    });

    match args.command {
        Command::DbState => db_state(&backend).await?,
        Command::Partners { user_id } => partners(&backend, &user_id).await?,
        Command::PartnerHabits { user_id } => partner_habits(backend, &user_id).await?,
        Command::Crosscheck { user_id } => crosscheck(&backend, &user_id).await?,
    }

    Ok(())
}

async fn db_state(backend: &RestBackend) -> anyhow::Result<()> {
    let accounts = backend.list_accounts().await?;
    let usernames: HashMap<Uuid, String> = accounts
        .iter()
        .map(|a| (a.id, a.username.clone()))
        .collect();

    println!("ACCOUNTS ({}):", accounts.len());
    for account in &accounts {
        println!(
            "  {}  {}  created {}",
            account.id, account.username, account.created_at
        );
    }

    println!("\nHABITS BY OWNER:");
    for account in &accounts {
        let habits = backend.habits_of(account.id).await?;
        println!("  {} ({}): {} habits", account.username, account.id, habits.len());
        for habit in habits {
            println!("    - {} ({:?}) [{}]", habit.name, habit.habit_type, habit.id);
        }
    }

    let relationships = backend.list_relationships().await?;
    println!("\nRELATIONSHIPS ({}):", relationships.len());
    for rel in relationships {
        let name = |id: Uuid| {
            usernames
                .get(&id)
                .cloned()
                .unwrap_or_else(|| "<unknown account>".to_string())
        };
        println!(
            "  {} <-> {}  [{:?}]  created {}  ({})",
            name(rel.user_id),
            name(rel.partner_id),
            rel.status,
            rel.created_at,
            rel.id
        );
    }

    Ok(())
}

async fn partners(backend: &RestBackend, user_id: &str) -> anyhow::Result<()> {
    let resolver = PartnerResolver::new(backend.clone());
    let resolution = resolver.resolve_partners(user_id).await?;

    println!("PARTNERS ({}):", resolution.partners.len());
    for partner in &resolution.partners {
        println!(
            "  {}  {}  relationship {}  [{:?}]",
            partner.account_id,
            partner.username,
            partner.relationship_id,
            partner.relationship_status
        );
    }
    for warning in &resolution.warnings {
        println!(
            "  WARNING: relationship {} dropped: {}",
            warning.relationship_id, warning.detail
        );
    }
    Ok(())
}

async fn partner_habits(backend: RestBackend, user_id: &str) -> anyhow::Result<()> {
    let gateway = PartnerHabitGateway::new(backend);
    let report = gateway.fetch_all_partner_habits(user_id, None).await?;

    if report.partners.is_empty() {
        println!("no active partners");
    }
    for entry in &report.partners {
        match &entry.habits {
            Ok(habits) if habits.is_empty() => {
                println!("{}: partner has no habits yet", entry.partner.username)
            }
            Ok(habits) => {
                println!("{}: {} habits", entry.partner.username, habits.len());
                for habit in habits {
                    println!("  - {} ({:?})", habit.name, habit.habit_type);
                }
            }
            Err(err) => println!("{}: fetch failed: {}", entry.partner.username, err),
        }
    }
    for warning in &report.warnings {
        println!(
            "WARNING: relationship {} dropped: {}",
            warning.relationship_id, warning.detail
        );
    }
    Ok(())
}

/// The disagreement this flags (RPC says no partners, ledger says one) is
/// exactly the symptom of the original visibility bug.
async fn crosscheck(backend: &RestBackend, user_id: &str) -> anyhow::Result<()> {
    let resolver = PartnerResolver::new(backend.clone());
    let resolution = resolver.resolve_partners(user_id).await?;
    let mut rpc_ids: Vec<Uuid> = resolution.partners.iter().map(|p| p.account_id).collect();

    let user = user_id.trim().parse::<Uuid>()?;
    let relationships = backend.list_relationships().await?;
    let mut ledger_ids: Vec<Uuid> = ledger::active_partner_links(&relationships, user)
        .into_iter()
        .map(|l| l.partner_id)
        .collect();

    rpc_ids.sort();
    ledger_ids.sort();

    println!("RPC partner set:    {rpc_ids:?}");
    println!("Ledger partner set: {ledger_ids:?}");
    if rpc_ids == ledger_ids {
        println!("OK: get_partners agrees with the raw ledger");
    } else {
        println!("MISMATCH: get_partners disagrees with the raw ledger");
        std::process::exit(1);
    }
    Ok(())
}
