use super::{
    Commands, ResolvedCli,
    election::ElectionHandler,
    key::{KeyCommands, KeyHandler},
    phase::PhaseHandler,
    show::{ShowCommands, ShowHandler},
    vote::VoteHandler,
    voter::VoterHandler,
};
use crate::{AppConfig, Client, config::confique_app_config_layer::AppConfigLayer as PartialAppConfig};
use confique::{Config, Layer};
use sealvote_core::{Call, Error, Identity, Phase, Salt, commit};
use std::path::Path;
use tempfile::tempdir;

/// Test helper that builds a resolved configuration rooted in a temp dir
fn create_test_config(temp_path: &Path) -> AppConfig {
    let mut partial_config = PartialAppConfig::default_values();
    partial_config.store.state_path = Some(temp_path.join("election.cbor"));
    partial_config.store.keys_dir = Some(temp_path.join("keys"));

    AppConfig::builder()
        .preloaded(partial_config)
        .load()
        .expect("Failed to load test config")
        .with_resolved_paths()
        .expect("Failed to resolve paths in test config")
}

/// Owner key plus an election over Alice, Bob and Carol.
async fn setup_election(config: &AppConfig) -> Identity {
    let keys = KeyHandler::new(config.clone());
    let owner = keys.new_key("owner").await.unwrap();
    ElectionHandler::new(config.clone())
        .create(
            "owner",
            "Test Election 2026",
            &["Alice".to_string(), "Bob".to_string(), "Carol".to_string()],
        )
        .await
        .unwrap();
    owner
}

fn core_error(err: &anyhow::Error) -> Option<&Error> {
    err.downcast_ref::<Error>()
}

#[tokio::test]
async fn test_sealvote_full_election() {
    let temp_dir = tempdir().unwrap();
    let config = create_test_config(temp_dir.path());
    setup_election(&config).await;

    let keys = KeyHandler::new(config.clone());
    for name in ["v1", "v2", "v3"] {
        keys.new_key(name).await.unwrap();
    }

    let voters = VoterHandler::new(config.clone());
    for name in ["v1", "v2", "v3"] {
        voters.add("owner", name).await.unwrap();
    }

    let phases = PhaseHandler::new(config.clone());
    assert_eq!(
        phases.advance("owner", Call::StartCommitPhase).await.unwrap(),
        Phase::Commit
    );

    let votes = VoteHandler::new(config.clone());
    let mut salts = Vec::new();
    for (name, choice) in [("v1", 0u64), ("v2", 1), ("v3", 0)] {
        let (salt, commitment) = votes.commit(name, choice, None).await.unwrap();
        assert_eq!(commitment, commit(choice, &salt));
        salts.push((name, choice, salt));
    }

    phases.advance("owner", Call::StartRevealPhase).await.unwrap();
    for (name, choice, salt) in &salts {
        votes.reveal(name, *choice, salt).await.unwrap();
    }
    assert_eq!(
        phases.advance("owner", Call::EndElection).await.unwrap(),
        Phase::Ended
    );

    let show = ShowHandler::new(config.clone());
    let results = show
        .render(&ShowCommands::Results { json: false })
        .await
        .unwrap();
    assert_eq!(results, "[0] Alice: 2\n[1] Bob: 1\n[2] Carol: 0\n");

    let winner = show
        .render(&ShowCommands::Winner { json: false })
        .await
        .unwrap();
    assert!(winner.starts_with("Alice (candidate 0) with 2 votes"));

    let stats: serde_json::Value = serde_json::from_str(
        &show
            .render(&ShowCommands::Stats { json: true })
            .await
            .unwrap(),
    )
    .unwrap();
    assert_eq!(stats["eligible"], 3);
    assert_eq!(stats["committed"], 3);
    assert_eq!(stats["revealed"], 3);
    assert_eq!(stats["phase"], "Ended");
}

#[tokio::test]
async fn test_sealvote_non_owner_rejected() {
    let temp_dir = tempdir().unwrap();
    let config = create_test_config(temp_dir.path());
    setup_election(&config).await;
    KeyHandler::new(config.clone())
        .new_key("mallory")
        .await
        .unwrap();

    let err = VoterHandler::new(config.clone())
        .add("mallory", "mallory")
        .await
        .unwrap_err();
    assert_eq!(core_error(&err), Some(&Error::NotOwner));

    // A rejected call leaves the stored state untouched.
    let engine = Client::new(&config).store().load().await.unwrap();
    assert_eq!(engine.election().total_eligible_voters(), 0);
    assert!(engine.history().is_empty());
}

#[tokio::test]
async fn test_sealvote_winner_before_end() {
    let temp_dir = tempdir().unwrap();
    let config = create_test_config(temp_dir.path());
    setup_election(&config).await;

    let err = ShowHandler::new(config.clone())
        .render(&ShowCommands::Winner { json: false })
        .await
        .unwrap_err();
    assert_eq!(core_error(&err), Some(&Error::ElectionNotEnded));
}

#[tokio::test]
async fn test_sealvote_import_in_batches() {
    let temp_dir = tempdir().unwrap();
    let mut config = create_test_config(temp_dir.path());
    config.client.batch_size = 40;
    setup_election(&config).await;

    let identities: Vec<Identity> = (1..=150u8).map(|n| Identity([n; 32])).collect();
    let mut content = String::from("# registered voters\n");
    for id in &identities {
        content.push_str(&format!("{}\n", id));
    }
    // Duplicate line is skipped by the registry.
    content.push_str(&format!("{}\n", identities[0]));
    let file = temp_dir.path().join("voters.txt");
    std::fs::write(&file, content).unwrap();

    let added = VoterHandler::new(config.clone())
        .import("owner", &file)
        .await
        .unwrap();
    assert_eq!(added, 150);

    let engine = Client::new(&config).store().load().await.unwrap();
    assert_eq!(engine.election().total_eligible_voters(), 150);
    // 151 lines in chunks of 40.
    assert_eq!(engine.history().len(), 4);
}

#[tokio::test]
async fn test_sealvote_reveal_with_wrong_salt() {
    let temp_dir = tempdir().unwrap();
    let config = create_test_config(temp_dir.path());
    setup_election(&config).await;
    KeyHandler::new(config.clone()).new_key("v1").await.unwrap();

    let voters = VoterHandler::new(config.clone());
    voters.add("owner", "v1").await.unwrap();
    let phases = PhaseHandler::new(config.clone());
    phases.advance("owner", Call::StartCommitPhase).await.unwrap();

    let votes = VoteHandler::new(config.clone());
    let salt = Salt([9; 32]);
    votes.commit("v1", 2, Some(salt)).await.unwrap();
    phases.advance("owner", Call::StartRevealPhase).await.unwrap();

    let err = votes.reveal("v1", 2, &Salt([8; 32])).await.unwrap_err();
    assert_eq!(core_error(&err), Some(&Error::HashMismatchInvalidReveal));

    votes.reveal("v1", 2, &salt).await.unwrap();
    let events = ShowHandler::new(config.clone())
        .render(&ShowCommands::Events {
            since: 0,
            json: false,
        })
        .await
        .unwrap();
    assert!(events.lines().last().unwrap().contains("for candidate 2"));
}

#[tokio::test]
async fn test_sealvote_create_twice_fails() {
    let temp_dir = tempdir().unwrap();
    let config = create_test_config(temp_dir.path());
    setup_election(&config).await;

    let err = ElectionHandler::new(config.clone())
        .create("owner", "Again", &["A".to_string(), "B".to_string()])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

#[tokio::test]
async fn test_sealvote_create_validates_candidates() {
    let temp_dir = tempdir().unwrap();
    let config = create_test_config(temp_dir.path());
    KeyHandler::new(config.clone()).new_key("owner").await.unwrap();

    let err = ElectionHandler::new(config.clone())
        .create("owner", "Solo", &["Only One".to_string()])
        .await
        .unwrap_err();
    assert_eq!(core_error(&err), Some(&Error::TooFewCandidates(1)));
    assert!(!Client::new(&config).store().exists().await.unwrap());
}

#[tokio::test]
async fn test_sealvote_resolved_cli_dispatch() {
    let temp_dir = tempdir().unwrap();
    let config = create_test_config(temp_dir.path());

    let cli = ResolvedCli {
        command: Commands::Key {
            command: KeyCommands::New {
                name: "dispatch".to_string(),
            },
        },
        config: config.clone(),
    };
    cli.handle_command().await.unwrap();

    assert!(config.store.keys_dir.join("dispatch.key").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sealvote_concurrent_submissions_all_land() {
    let temp_dir = tempdir().unwrap();
    let config = create_test_config(temp_dir.path());
    setup_election(&config).await;
    let client = Client::new(&config);

    let handles: Vec<_> = (1..=20u8)
        .map(|n| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .submit(
                        "owner",
                        Call::AddVoter {
                            voter: Identity([n; 32]),
                        },
                    )
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let engine = client.store().load().await.unwrap();
    assert_eq!(engine.election().total_eligible_voters(), 20);
    assert_eq!(engine.history().len(), 20);
}

#[tokio::test]
async fn test_sealvote_import_failure_reports_progress() {
    let temp_dir = tempdir().unwrap();
    let mut config = create_test_config(temp_dir.path());
    config.client.batch_size = 10;
    setup_election(&config).await;

    // The null identity sinks the third chunk.
    let mut voters: Vec<Identity> = (1..=25u8).map(|n| Identity([n; 32])).collect();
    voters[22] = Identity::NULL;

    let client = Client::new(&config);
    let err = client.import_voters("owner", &voters).await.unwrap_err();
    assert_eq!(core_error(&err), Some(&Error::InvalidIdentity));
    let message = err.to_string();
    assert!(message.contains("chunk 3 of 3"), "{}", message);
    assert!(message.contains("2 chunks (20 identities"), "{}", message);

    let engine = client.store().load().await.unwrap();
    assert_eq!(engine.election().total_eligible_voters(), 20);
}

#[tokio::test]
async fn test_sealvote_show_voter_and_candidate() {
    let temp_dir = tempdir().unwrap();
    let config = create_test_config(temp_dir.path());
    setup_election(&config).await;
    KeyHandler::new(config.clone()).new_key("v1").await.unwrap();
    VoterHandler::new(config.clone())
        .add("owner", "v1")
        .await
        .unwrap();
    PhaseHandler::new(config.clone())
        .advance("owner", Call::StartCommitPhase)
        .await
        .unwrap();
    VoteHandler::new(config.clone())
        .commit("v1", 1, None)
        .await
        .unwrap();

    let show = ShowHandler::new(config.clone());
    let voter = show
        .render(&ShowCommands::Voter {
            voter: "v1".to_string(),
            json: false,
        })
        .await
        .unwrap();
    assert!(voter.contains("Eligible:  yes"));
    assert!(voter.contains("Committed: yes"));
    assert!(voter.contains("Revealed:  no"));

    let stranger: serde_json::Value = serde_json::from_str(
        &show
            .render(&ShowCommands::Voter {
                voter: Identity([7; 32]).to_string(),
                json: true,
            })
            .await
            .unwrap(),
    )
    .unwrap();
    assert_eq!(stranger["eligible"], false);
    assert_eq!(stranger["committed"], false);

    let candidate = show
        .render(&ShowCommands::Candidate {
            candidate_id: 1,
            json: false,
        })
        .await
        .unwrap();
    assert_eq!(candidate, "[1] Bob: 0 (of 3 candidates)\n");

    let err = show
        .render(&ShowCommands::Candidate {
            candidate_id: 3,
            json: false,
        })
        .await
        .unwrap_err();
    assert_eq!(core_error(&err), Some(&Error::InvalidCandidate(3)));
}
