//! A minimal interactive front end over [`minisql_engine::Engine`], reading
//! one SQL statement per line from stdin. Not part of the library surface --
//! exists so the engine can be exercised by hand the way the host binary's
//! own debug tooling does.

use std::io::{self, BufRead, Write};

use clap::Parser;

use minisql_engine::{Engine, EngineConfig};

#[derive(Parser, Debug)]
#[command(about = "Interactive minisql session")]
struct Args {
    /// Database to open the session against.
    #[arg(long, env = "MINISQL_DB", default_value = "default")]
    db: String,

    /// Reclaimer sweep cadence, in milliseconds.
    #[arg(long, env = "MINISQL_RECLAIM_INTERVAL_MS", default_value_t = EngineConfig::default().reclaim_interval_ms)]
    reclaim_interval_ms: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let engine = Engine::start(EngineConfig {
        reclaim_interval_ms: args.reclaim_interval_ms,
        ..EngineConfig::default()
    });
    let session = engine.session(args.db.clone());

    println!("minisql [{}] -- one statement per line, Ctrl-D to exit", args.db);

    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("read error: {e}");
                break;
            }
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match session.execute(line) {
            Ok(result) => {
                if result.rows.is_empty() {
                    println!("OK ({} row(s) affected)", result.rows_affected);
                } else {
                    for row in &result.rows {
                        println!("{row:?}");
                    }
                    println!("({} row(s))", result.rows.len());
                }
            }
            Err(e) => eprintln!("error: {e}"),
        }
    }
}
