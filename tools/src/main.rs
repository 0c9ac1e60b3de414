//! desk-runner: headless runner for the RME Desk workflow core.
//!
//! Usage:
//!   desk-runner --db desk.db --data-dir ./data --ingest roster.json
//!   desk-runner --db desk.db --standby
//!   desk-runner --db desk.db --queue Teguh
//!   desk-runner --db desk.db --counts

use anyhow::Result;
use rme_core::{
    cache::RosterGeneration, clock::ClinicClock, config::DeskConfig, duty_resolver::DutyResolver,
    duty_resolver::DutyStatus, roster_ingest::RosterIngest, store::DeskStore,
    task_queue::TaskQueue,
};
use std::env;
use std::fs;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");

    let config = match DeskConfig::load(data_dir) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("config load from {data_dir} failed ({e}); using built-in staff roster");
            DeskConfig::builtin()
        }
    };

    let mut store = DeskStore::open(db)?;
    store.migrate()?;

    let generation = RosterGeneration::new();
    let clock = ClinicClock::new(config.utc_offset_hours);
    let ingest = RosterIngest::new(config.clone(), generation.clone());
    let resolver = DutyResolver::new(config.clone(), generation.clone());
    let queue = TaskQueue::new(config);

    if let Some(path) = flag_value(&args, "--ingest") {
        let raw = fs::read_to_string(path)?;
        let ok = ingest.ingest_json(&mut store, &raw);
        println!("roster ingestion: {}", if ok { "ok" } else { "FAILED" });
        if !ok {
            std::process::exit(1);
        }
        return Ok(());
    }

    if args.iter().any(|a| a == "--standby") {
        let now = clock.now_local();
        let report = resolver.active_staff(&store, now)?;
        if args.iter().any(|a| a == "--json") {
            println!("{}", serde_json::to_string(&report)?);
            return Ok(());
        }
        println!("=== STANDBY @ {} ===", now.format("%Y-%m-%d %H:%M"));
        match report.status {
            DutyStatus::NoSchedule => println!("  (no schedule loaded)"),
            DutyStatus::Ok if report.staff.is_empty() => println!("  (nobody currently standby)"),
            DutyStatus::Ok => {
                for person in &report.staff {
                    println!("  {person}");
                }
            }
        }
        return Ok(());
    }

    if let Some(tech) = flag_value(&args, "--queue") {
        let tech = tech.to_string();
        let pending = queue.pending_for(&store, &tech)?;
        println!("=== PENDING FOR {tech} ===");
        for task in &pending {
            println!(
                "  #{} [{}] {} — {} ({})",
                task.task_id,
                task.status.as_str(),
                task.patient_display,
                task.unit,
                task.queued_at,
            );
        }
        println!("  open queue depth: {}", queue.queue_depth(&store)?);
        return Ok(());
    }

    if args.iter().any(|a| a == "--counts") {
        println!("=== COMPLETED TASKS PER TECHNICIAN ===");
        for (tech, count) in queue.completed_counts(&store)? {
            println!("  {tech:10} {count}");
        }
        return Ok(());
    }

    println!("desk-runner — RME Desk workflow core");
    println!("  --db <path>         SQLite database (default :memory:)");
    println!("  --data-dir <path>   config directory (default ./data)");
    println!("  --ingest <file>     ingest an extracted roster table (JSON rows)");
    println!("  --standby [--json]  print who is on duty right now");
    println!("  --queue <tech>      print a technician's pending tasks");
    println!("  --counts            print completed-task tallies");
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
