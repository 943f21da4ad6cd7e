use crate::{AppConfig, Client};
use anyhow::Result;
use clap::Subcommand;
use sealvote_core::{Election, Event, Identity, RecordedEvent};
use serde_json::json;
use std::fmt::Write;

#[derive(Subcommand)]
pub enum ShowCommands {
    /// Current phase
    Phase {
        #[arg(long)]
        json: bool,
    },
    /// Eligible, committed and revealed counts
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Per-candidate vote counts
    Results {
        #[arg(long)]
        json: bool,
    },
    /// The winner (only once the election has ended)
    Winner {
        #[arg(long)]
        json: bool,
    },
    /// Registration and voting status of one identity
    Voter {
        /// Voter identity (hex) or key name
        voter: String,
        #[arg(long)]
        json: bool,
    },
    /// One candidate's name and current count
    Candidate {
        /// Candidate index
        candidate_id: u64,
        #[arg(long)]
        json: bool,
    },
    /// The event log
    Events {
        /// Only events with this sequence number or later
        #[arg(long, default_value = "0")]
        since: u64,
        #[arg(long)]
        json: bool,
    },
}

pub struct ShowHandler {
    client: Client,
}

impl ShowHandler {
    pub fn new(config: AppConfig) -> Self {
        Self {
            client: Client::new(&config),
        }
    }

    pub async fn handle(&self, command: &ShowCommands) -> Result<()> {
        print!("{}", self.render(command).await?);
        Ok(())
    }

    pub(crate) async fn render(&self, command: &ShowCommands) -> Result<String> {
        let engine = self.client.store().load().await?;
        let election = engine.election();

        match command {
            ShowCommands::Phase { json } => {
                if *json {
                    to_json(&json!({ "phase": election.current_phase() }))
                } else {
                    Ok(format!("{}\n", election.current_phase()))
                }
            }
            ShowCommands::Stats { json } => {
                let stats = election.stats();
                if *json {
                    to_json(&stats)
                } else {
                    let turnout = election.turnout();
                    let mut out = String::new();
                    writeln!(out, "Election:  {}", election.name())?;
                    writeln!(out, "Phase:     {}", stats.phase)?;
                    writeln!(out, "Eligible:  {}", stats.eligible)?;
                    writeln!(
                        out,
                        "Committed: {} ({:.1}%)",
                        stats.committed,
                        turnout.committed * 100.0
                    )?;
                    writeln!(
                        out,
                        "Revealed:  {} ({:.1}%)",
                        stats.revealed,
                        turnout.revealed * 100.0
                    )?;
                    Ok(out)
                }
            }
            ShowCommands::Results { json } => {
                if *json {
                    to_json(&election.results())
                } else {
                    let mut out = String::new();
                    for candidate in election.results() {
                        writeln!(
                            out,
                            "[{}] {}: {}",
                            candidate.id, candidate.name, candidate.vote_count
                        )?;
                    }
                    Ok(out)
                }
            }
            ShowCommands::Winner { json } => render_winner(election, *json),
            ShowCommands::Voter { voter, json } => {
                let identity = self.client.keys().resolve_identity(voter).await?;
                render_voter(election, &identity, *json)
            }
            ShowCommands::Candidate { candidate_id, json } => {
                let candidate = election.candidate(*candidate_id)?;
                if *json {
                    to_json(&json!({
                        "candidate": candidate,
                        "candidate_count": election.candidate_count(),
                    }))
                } else {
                    Ok(format!(
                        "[{}] {}: {} (of {} candidates)\n",
                        candidate.id,
                        candidate.name,
                        candidate.vote_count,
                        election.candidate_count()
                    ))
                }
            }
            ShowCommands::Events { since, json } => {
                let events = election.events_since(*since);
                if *json {
                    to_json(&events)
                } else {
                    let mut out = String::new();
                    for recorded in events {
                        writeln!(out, "{}", describe(recorded))?;
                    }
                    Ok(out)
                }
            }
        }
    }
}

fn render_winner(election: &Election, json: bool) -> Result<String> {
    let winner = election.winner()?;
    let tied = election.leaders()?.len() > 1;
    if json {
        return to_json(&json!({ "winner": winner, "tied": tied }));
    }

    let mut out = format!(
        "{} (candidate {}) with {} votes\n",
        winner.name, winner.candidate_id, winner.vote_count
    );
    if tied {
        out.push_str("Tie resolved in favour of the lowest candidate index\n");
    }
    Ok(out)
}

fn render_voter(election: &Election, identity: &Identity, json: bool) -> Result<String> {
    let eligible = election.is_eligible(identity);
    let committed = election.has_voted(identity);
    let revealed = election.has_revealed(identity);
    if json {
        return to_json(&json!({
            "identity": identity,
            "eligible": eligible,
            "committed": committed,
            "revealed": revealed,
        }));
    }

    let mut out = String::new();
    writeln!(out, "Voter:     {}", identity)?;
    writeln!(out, "Eligible:  {}", yes_no(eligible))?;
    writeln!(out, "Committed: {}", yes_no(committed))?;
    writeln!(out, "Revealed:  {}", yes_no(revealed))?;
    Ok(out)
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn describe(recorded: &RecordedEvent) -> String {
    let what = match &recorded.event {
        Event::VoterAdded { voter } => format!("voter added {}", voter),
        Event::VoterRemoved { voter } => format!("voter removed {}", voter),
        Event::VotersAddedBatch { count } => format!("{} voters added in batch", count),
        Event::PhaseChanged { phase } => format!("phase changed to {}", phase),
        Event::VoteCommitted { voter } => format!("vote committed by {}", voter),
        Event::VoteRevealed {
            voter,
            candidate_id,
        } => format!("vote revealed by {} for candidate {}", voter, candidate_id),
    };
    format!("#{} {}", recorded.seq, what)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(format!("{}\n", serde_json::to_string_pretty(value)?))
}
