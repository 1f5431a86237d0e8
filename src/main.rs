//! skyroute entry point
//!
//! Loads `.env` and configuration, builds one client per upstream service
//! and runs the prompt loop until `exit`, `quit`, Ctrl-C or end of input.

use anyhow::Context;
use clap::Parser;
use skyroute::cli::{self, Cli};
use skyroute::{
    Assistant, AssistantConfig, CommandDispatcher, OpenAiCompleter, OpenWeatherClient,
    TavilySearch, TurnOutcome, WeatherQueryHandler,
};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::thread;
use tracing::{error, info, warn};

type Session = Assistant<OpenWeatherClient, TavilySearch, OpenAiCompleter>;

fn main() -> ExitCode {
    let args = Cli::parse();
    dotenvy::dotenv().ok();

    let mut session = match setup(&args) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{}", cli::error(&format!("{e:#}")));
            return ExitCode::from(1);
        }
    };

    if let Some(query) = args.query.as_deref() {
        if let TurnOutcome::Reply(text) = session.handle_line(query) {
            println!("{}", cli::reply(&text));
        }
        return ExitCode::SUCCESS;
    }

    if let Err(e) = install_interrupt_handler() {
        warn!("Ctrl-C handler not installed: {:#}", e);
    }

    match run_repl(&mut session) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Prompt loop failed: {:#}", e);
            eprintln!("{}", cli::error(&format!("{e:#}")));
            ExitCode::from(1)
        }
    }
}

fn setup(args: &Cli) -> anyhow::Result<Session> {
    let config = AssistantConfig::load_from_path(args.config.clone())?;
    skyroute::logging::init(&config.logging, args.verbose)?;
    info!("Starting skyroute {}", skyroute::VERSION);

    let weather =
        OpenWeatherClient::new(&config.weather).context("failed to create weather client")?;
    let search = TavilySearch::new(&config.search).context("failed to create search client")?;
    let completer =
        OpenAiCompleter::new(&config.llm).context("failed to create language model client")?;

    let dispatcher = CommandDispatcher::new(WeatherQueryHandler::new(weather));
    Ok(Assistant::new(dispatcher, search, completer))
}

fn run_repl(session: &mut Session) -> anyhow::Result<()> {
    println!("{}", cli::banner());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();
    loop {
        print!("{}", cli::prompt());
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }

        match session.handle_line(&line) {
            TurnOutcome::Empty => {}
            TurnOutcome::Exit => break,
            TurnOutcome::Reply(text) => println!("{}", cli::reply(&text)),
        }
    }

    println!("{}", cli::goodbye());
    info!("Session ended after {} exchanges", session.transcript().len());
    Ok(())
}

/// Treat Ctrl-C like `exit`: say goodbye and leave with status 0
fn install_interrupt_handler() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build signal runtime")?;

    thread::Builder::new()
        .name("ctrl-c".to_string())
        .spawn(move || {
            runtime.block_on(async {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        info!("Interrupted, shutting down");
                        println!("\n{}", cli::goodbye());
                        std::process::exit(0);
                    }
                    Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
                }
            });
        })
        .context("failed to spawn signal thread")?;

    Ok(())
}
