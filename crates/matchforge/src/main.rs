//! Loopback matchmaking CLI.
//!
//! Drives the full lifecycle against the loopback provider stack in a
//! single process. `--seed N` pre-populates demo sessions (hosted by
//! synthetic players) so find/join/destroy have something to act on.
//!
//! Exit codes: 0 on success, 2 when a precondition rejected the request,
//! 1 when an accepted operation failed asynchronously.

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use matchforge::{
    Completion, CoordinatorHandle, Credentials, LoopbackHandoff,
    LoopbackIdentity, LoopbackSessions, MatchforgeError, Matchmaker, OpKind,
    OpOutput, OpState, OpTicket, PlayerIdentity, SessionParams, SessionQuery,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "matchforge", version, about = "Loopback matchmaking CLI")]
struct Cli {
    /// Pre-populate this many demo sessions before running the command.
    #[arg(long, global = true, default_value_t = 0)]
    seed: u32,

    /// Per-operation timeout in seconds.
    #[arg(long, global = true, default_value_t = 10)]
    timeout_secs: u64,

    /// Display name to log in with.
    #[arg(long, global = true, default_value = "cli-player")]
    as_name: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open a new session hosted by the logged-in player.
    Create {
        /// Unique session name.
        #[arg(long)]
        name: String,

        /// Maximum occupancy.
        #[arg(long, default_value_t = 5)]
        capacity: u32,

        /// Keyword tags the session is discoverable under. Repeatable.
        #[arg(long)]
        tag: Vec<String>,

        /// Connection descriptor to advertise.
        #[arg(long)]
        connect: Option<String>,

        /// Hide the session from searches.
        #[arg(long)]
        private: bool,

        /// Disable lobby-style presence discovery.
        #[arg(long)]
        no_lobby: bool,
    },

    /// Search for sessions.
    Find {
        /// Only sessions tagged with this keyword.
        #[arg(long)]
        keyword: Option<String>,

        /// Only lobby sessions.
        #[arg(long)]
        lobby_only: bool,

        /// Maximum number of results.
        #[arg(long, default_value_t = 50)]
        max: usize,

        /// Chain a join against the first result.
        #[arg(long)]
        join: bool,
    },

    /// Join the named session.
    Join {
        #[arg(long)]
        name: String,
    },

    /// Join the named session, then leave it again.
    Leave {
        #[arg(long)]
        name: String,
    },

    /// Destroy the named session. Only its host may do this.
    Destroy {
        #[arg(long)]
        name: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("matchforge=info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            if e.is_precondition() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(cli: Cli) -> Result<(), MatchforgeError> {
    let auto_join = matches!(&cli.command, Command::Find { join: true, .. });
    let op_timeout = Duration::from_secs(cli.timeout_secs);

    let mut mm = Matchmaker::<LoopbackIdentity>::builder()
        .op_timeout(op_timeout)
        .auto_join(auto_join)
        .build(LoopbackIdentity, LoopbackSessions, LoopbackHandoff);

    let mut credentials = Credentials::account_portal();
    credentials.id = cli.as_name.clone();
    let player = mm.login(0, &credentials).await?;
    println!("logged in as {player}");

    seed_sessions(mm.handle(), cli.seed).await?;

    match cli.command {
        Command::Create {
            name,
            capacity,
            tag,
            connect,
            private,
            no_lobby,
        } => {
            let mut params = SessionParams::new(name)
                .capacity(capacity)
                .advertised(!private)
                .lobby(!no_lobby);
            for t in tag {
                params = params.tag(t);
            }
            if let Some(connect) = connect {
                params = params.connect(connect);
            }

            let output = settle(mm.create_session(params).await?).await?;
            if let OpOutput::Created { connect } = output {
                if connect.is_empty() {
                    println!("session created (no advertised descriptor)");
                } else {
                    println!("session created, advertising {connect}");
                }
            }
        }

        Command::Find {
            keyword,
            lobby_only,
            max,
            join,
        } => {
            let mut query =
                SessionQuery::all().lobby_only(lobby_only).max_results(max);
            if let Some(keyword) = keyword {
                query = query.keyword(keyword);
            }

            // Subscribe before issuing so a chained join can't slip by.
            let mut transitions = mm.handle().transitions().await?;

            let output = settle(mm.find_sessions(query).await?).await?;
            let OpOutput::Found { result } = output else {
                return Ok(());
            };

            println!("{} session(s):", result.len());
            for record in result.iter() {
                println!(
                    "  {:<24} {}/{} host={} tags=[{}]",
                    record.name.as_str(),
                    record.occupancy,
                    record.capacity,
                    record.host.display_name,
                    record
                        .tags
                        .iter()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(","),
                );
            }

            if join && !result.is_empty() {
                report_chained_join(&mut transitions, op_timeout).await;
            }
        }

        Command::Join { name } => {
            let output = settle(mm.join_session(name.into()).await?).await?;
            if let OpOutput::Joined { connect } = output {
                println!("joined, connect to {connect}");
            }
        }

        Command::Leave { name } => {
            let output = settle(mm.join_session(name.into()).await?).await?;
            if let OpOutput::Joined { connect } = output {
                println!("joined, connect to {connect}");
            }
            settle(mm.leave_session().await?).await?;
            println!("left");
        }

        Command::Destroy { name } => {
            settle(mm.destroy_session(name.into()).await?).await?;
            println!("session destroyed");
        }
    }

    Ok(())
}

/// Waits for a ticket's terminal outcome and unwraps the success payload.
async fn settle(ticket: OpTicket) -> Result<OpOutput, MatchforgeError> {
    let completion: Completion = ticket.outcome().await?;
    Ok(completion.result?)
}

/// Pre-populates demo sessions hosted by synthetic players.
async fn seed_sessions(
    handle: &CoordinatorHandle,
    count: u32,
) -> Result<(), MatchforgeError> {
    for n in 1..=count {
        let host = PlayerIdentity::new(
            format!("seed-host-{n}"),
            format!("Seed Host {n}"),
        );
        let params = SessionParams::new(format!("Demo-{n}"))
            .tag("demo")
            .connect(format!("loopback://demo-{n}"));
        let ticket = handle.create(host, params).await?;
        settle(ticket).await?;
    }
    if count > 0 {
        println!("seeded {count} demo session(s)");
    }
    Ok(())
}

/// Reports the outcome of the join chained onto a find.
async fn report_chained_join(
    transitions: &mut tokio::sync::mpsc::UnboundedReceiver<
        matchforge::TransitionEvent,
    >,
    op_timeout: Duration,
) {
    let deadline = op_timeout + Duration::from_secs(1);
    loop {
        match tokio::time::timeout(deadline, transitions.recv()).await {
            Ok(Some(event))
                if event.kind == OpKind::Join && event.to.is_terminal() =>
            {
                match event.to {
                    OpState::Succeeded => println!("auto-joined first result"),
                    _ => println!(
                        "auto-join failed: {}",
                        event.reason.as_deref().unwrap_or("unknown")
                    ),
                }
                return;
            }
            Ok(Some(_)) => continue,
            Ok(None) | Err(_) => {
                println!("auto-join outcome not observed");
                return;
            }
        }
    }
}
