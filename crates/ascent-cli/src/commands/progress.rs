use std::sync::Arc;

use ascent_core::progress::{AssessmentScores, CategoryScore, DecisionTopic, Level, ProgressStore, StoreOptions};
use ascent_core::remote::{Identity, MemoryRemote, Query, RemoteProgressService, UserId};
use ascent_core::storage::{Database, SqliteLocalStore};
use ascent_core::Config;
use clap::Subcommand;
use serde_json::json;

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Print the full progress record as JSON
    Show,
    /// Set net worth (absolute, whole dollars)
    NetWorth {
        amount: u64,
    },
    /// Set annual revenue (absolute)
    Revenue {
        amount: f64,
    },
    /// Mark a curriculum unit complete
    Complete {
        /// Module id, e.g. "m1"
        module: String,
        /// Zero-based unit index
        unit: u32,
    },
    /// Number of completed units in a module
    Count {
        module: String,
    },
    /// Record a self-assessment: mindset/systems/results for wealth, health, relationships
    Assess {
        #[arg(num_args = 9, value_names = ["WM", "WS", "WR", "HM", "HS", "HR", "RM", "RS", "RR"])]
        scores: Vec<u8>,
    },
    /// Record a strategic decision
    Decide {
        /// entity_structure, banking, insurance, investment_policy, estate_plan, exit_strategy
        topic: DecisionTopic,
        value: String,
    },
    /// Net worth at which a level begins
    Threshold {
        level: Level,
    },
    /// Resolve the remote read and deliver pending writes
    Sync,
}

fn open_store(user: Option<&str>) -> Result<ProgressStore, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let local = SqliteLocalStore::new(Database::open()?);
    let (remote, identity): (Arc<dyn RemoteProgressService>, Identity) = match user {
        Some(id) => (
            Arc::new(super::http_remote(&config)?),
            Identity::User(UserId::new(id)),
        ),
        // Never called while anonymous.
        None => (Arc::new(MemoryRemote::new()), Identity::Anonymous),
    };

    let mut store = ProgressStore::new(Box::new(local), remote, StoreOptions::from(&config));
    store.init(identity);
    if store.remote_query().is_pending() {
        store.sync();
        if store.remote_query().is_pending() {
            tracing::warn!("remote progress unavailable, showing local view only");
        }
    }
    Ok(store)
}

/// Pump the outbox until it drains or every write has used its attempts.
/// Returns the number of writes the remote never accepted.
fn flush(store: &mut ProgressStore) -> usize {
    while store.outbox_pending() > 0 {
        store.sync();
    }
    let failures = store.take_failures();
    for f in &failures {
        tracing::warn!(
            module = %f.write.module_id,
            unit = f.write.unit_index,
            error = %f.error,
            "remote write failed, completion kept locally"
        );
    }
    failures.len()
}

fn print_summary(store: &ProgressStore) -> Result<(), Box<dyn std::error::Error>> {
    let record = store.record();
    let summary = json!({
        "level": record.current_level,
        "netWorth": record.net_worth,
        "gapToNextLevel": record.gap_to_next_level(),
        "completedUnits": record.total_completed_units(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Net worth, revenue, assessments and decisions live only in the local
/// record. A signed-in session keeps them in memory for this run.
fn warn_if_session_only(store: &ProgressStore, what: &str) {
    if store.identity().is_some_and(Identity::is_authenticated) {
        tracing::warn!(what, "not stored remotely; change is kept for this session only");
    }
}

pub fn run(action: ProgressAction, user: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    if let ProgressAction::Threshold { level } = action {
        println!("{}", level.threshold());
        return Ok(());
    }
    let mut store = open_store(user)?;
    let result = apply(&mut store, action);
    store.dispose();
    result
}

fn apply(store: &mut ProgressStore, action: ProgressAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ProgressAction::Show => {
            println!("{}", serde_json::to_string_pretty(store.record())?);
        }
        ProgressAction::NetWorth { amount } => {
            store.update_net_worth(amount);
            warn_if_session_only(store, "net worth");
            print_summary(store)?;
        }
        ProgressAction::Revenue { amount } => {
            if !amount.is_finite() {
                return Err(format!("revenue must be a finite number, got {amount}").into());
            }
            store.update_revenue(amount);
            warn_if_session_only(store, "revenue");
            print_summary(store)?;
        }
        ProgressAction::Complete { module, unit } => {
            let changed = store.complete_module(&module, unit);
            let failed = flush(store);
            let out = json!({
                "module": module,
                "unit": unit,
                "newlyCompleted": changed,
                "completedInModule": store.module_completion_count(&module),
                "failedWrites": failed,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        ProgressAction::Count { module } => {
            println!("{}", store.module_completion_count(&module));
        }
        ProgressAction::Assess { scores } => {
            let &[wm, ws, wr, hm, hs, hr, rm, rs, rr] = scores.as_slice() else {
                return Err("assess takes exactly 9 scores".into());
            };
            store.add_assessment_snapshot(AssessmentScores {
                wealth: CategoryScore::new(wm, ws, wr),
                health: CategoryScore::new(hm, hs, hr),
                relationships: CategoryScore::new(rm, rs, rr),
            })?;
            warn_if_session_only(store, "assessment");
            if let Some(latest) = store.record().latest_assessment() {
                println!("{}", serde_json::to_string_pretty(latest)?);
            }
        }
        ProgressAction::Decide { topic, value } => {
            store.update_decision(topic, value);
            warn_if_session_only(store, "decision");
            println!("{}", serde_json::to_string_pretty(&store.record().strategic_decisions)?);
        }
        ProgressAction::Threshold { level } => {
            println!("{}", level.threshold());
        }
        ProgressAction::Sync => {
            let failed = flush(store);
            let state = match store.remote_query() {
                Query::Skip => "skipped",
                Query::Pending => "pending",
                Query::Ready(_) => "ready",
            };
            println!("{}", json!({
                    "remote": state,
                    "pending": store.outbox_pending(),
                    "failedWrites": failed,
                }));
        }
    }
    Ok(())
}
