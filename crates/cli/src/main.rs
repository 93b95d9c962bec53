use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use wayfinder_core::PlannerReply;
use wayfinder_engine::{ProgressSink, Stage, TripPlanner};
use wayfinder_observability::{init_tracing, PlannerMetrics};
use wayfinder_providers::{CapabilitySuite, ScriptedSuite};

#[derive(Debug, Parser)]
#[command(name = "wayfinder")]
#[command(about = "Wayfinder travel planning CLI")]
struct Cli {
    /// Default origin country when the request names none.
    #[arg(long, env = "WAYFINDER_ORIGIN_COUNTRY", default_value = "Malaysia")]
    origin_country: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive planning session.
    Chat,
    /// Plan a single request and print the reply as JSON.
    Plan { request: String },
    /// Show the detected intents for a request without planning.
    Classify { request: String },
}

/// Prints progress events as they arrive.
struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn report(&self, stage: Stage, message: &str) {
        if stage != Stage::Complete {
            eprintln!("[{}] {message}...", stage.as_code());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("wayfinder_cli");
    let cli = Cli::parse();

    let suite = Arc::new(ScriptedSuite::with_default_index(&cli.origin_country));
    let metrics = PlannerMetrics::shared();
    let planner = TripPlanner::new(suite.clone(), metrics).with_sink(Arc::new(ConsoleSink));

    match cli.command {
        Command::Chat => run_chat(planner).await?,
        Command::Plan { request } => {
            let reply = planner.process(&request).await?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        Command::Classify { request } => {
            let detected = suite.classify(&request).await?;
            println!("{}", serde_json::to_string_pretty(&detected)?);
        }
    }

    Ok(())
}

async fn run_chat<C: CapabilitySuite>(planner: TripPlanner<C>) -> Result<()> {
    println!("Wayfinder chat mode. type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().read_line(&mut line)?;

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        match planner.process(message).await {
            Ok(reply) => print_reply(&reply),
            Err(err) => eprintln!("planning failed at {}: {err}", err.stage()),
        }
    }

    Ok(())
}

fn print_reply(reply: &PlannerReply) {
    println!("\n{}\n", reply.response_text());

    if let PlannerReply::FullItinerary { result, .. } = reply {
        println!("(review score: {}/10)\n", result.review_score);
    }
}
