//! Tsubaki CLI - コマンドラインインターフェース
//!
//! コマンドブレークポイントガードのデモ用REPLインターフェース。
//! シミュレートされたホスト環境の上でガードセッションを実行します。

use std::io::{self, Write};
use std::rc::Rc;

use anyhow::Result;
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tsubaki_core::{
    BreakpointLifecycleController, Command, ConfirmationGate, DebugHost, GuardState, SimHost,
    ToggleOptions, ToggleOutcome,
};

/// Tsubaki - self-healing command breakpoint guard
#[derive(Parser)]
#[command(name = "tsubaki")]
#[command(version = "0.1.0")]
#[command(about = "Session guard that keeps a command breakpoint alive", long_about = None)]
struct Cli {
    /// Marker command that triggers the breakpoint
    #[arg(long, default_value = "checkpoint")]
    marker: String,

    /// Treat the session as non-interactive (breakpoint starts disabled)
    #[arg(long)]
    non_interactive: bool,

    /// Skip confirmation prompts
    #[arg(short, long)]
    yes: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Tsubaki - Command Breakpoint Guard");
    println!("Version 0.1.0");
    println!();

    let cli = Cli::parse();

    let host = Rc::new(SimHost::new(!cli.non_interactive));
    let mut controller =
        BreakpointLifecycleController::start(host.clone(), cli.marker.as_str())?;

    println!("Guard session started on marker command '{}'", cli.marker);
    println!(
        "Command breakpoint is {}",
        state_label(controller.state())
    );
    println!();

    run_repl(&mut controller, &host, cli.yes)?;

    Ok(())
}

/// REPLループを実行する
fn run_repl(
    controller: &mut BreakpointLifecycleController,
    host: &SimHost,
    skip_confirm: bool,
) -> Result<()> {
    println!("Type 'help' for available commands, 'quit' to exit.");
    println!();

    let mut rl = DefaultEditor::new()?;

    loop {
        let readline = rl.readline("(tsubaki) ");
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                rl.add_history_entry(line)?;

                match Command::parse(line) {
                    Some(Command::Quit) => {
                        println!("Goodbye!");
                        break;
                    }
                    Some(command) => {
                        if let Err(e) = handle_command(controller, host, command, skip_confirm) {
                            eprintln!("Error: {}", e);
                        }
                    }
                    None => println!("Unknown command: {}", line),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

fn handle_command(
    controller: &mut BreakpointLifecycleController,
    host: &SimHost,
    command: Command,
    skip_confirm: bool,
) -> Result<()> {
    match command {
        Command::Status => handle_status(controller, host),
        Command::Enable { dry_run } => handle_toggle(controller, true, dry_run, skip_confirm)?,
        Command::Disable { dry_run } => handle_toggle(controller, false, dry_run, skip_confirm)?,
        Command::Remove => handle_remove(controller, host)?,
        Command::Teardown => {
            controller.teardown();
            println!("Guard torn down; registry is empty");
        }
        Command::Help => print_help(),
        Command::Quit => unreachable!("quit is handled by the REPL loop"),
    }

    Ok(())
}

/// Statusコマンドを処理する
fn handle_status(controller: &BreakpointLifecycleController, host: &SimHost) {
    println!("State: {}", state_label(controller.state()));
    println!("Registry entries: {}", controller.registry_len());
    println!(
        "Monitoring: {}",
        if controller.is_monitoring() { "yes" } else { "no" }
    );

    if let Some(bp) = controller.command_breakpoint() {
        println!(
            "Command breakpoint: id {} on '{}'",
            bp.handle.id(),
            bp.trigger.command_name()
        );
        if host.breakpoint(&bp.handle).is_none() {
            println!("Warning: breakpoint is not known to the host");
        }
    }
}

/// Enable/Disableコマンドを処理する
fn handle_toggle(
    controller: &mut BreakpointLifecycleController,
    enable: bool,
    dry_run: bool,
    skip_confirm: bool,
) -> Result<()> {
    let gate = StdinGate;
    let opts = ToggleOptions {
        dry_run,
        gate: if skip_confirm { None } else { Some(&gate) },
    };

    let outcome = if enable {
        controller.enable_with(&opts)?
    } else {
        controller.disable_with(&opts)?
    };

    match outcome {
        ToggleOutcome::Applied(state) => {
            println!("Command breakpoint is now {}", state_label(state));
        }
        ToggleOutcome::WouldApply(state) => {
            println!(
                "Dry run: command breakpoint would become {}",
                state_label(state)
            );
        }
        ToggleOutcome::Declined => println!("Cancelled"),
    }

    Ok(())
}

/// Removeコマンドを処理する（外部からの削除をシミュレート）
fn handle_remove(controller: &BreakpointLifecycleController, host: &SimHost) -> Result<()> {
    match controller.command_breakpoint() {
        Some(bp) => {
            host.remove_breakpoint(&bp.handle)?;
            println!("Removed breakpoint {} out from under the guard", bp.handle.id());

            if let Some(current) = controller.command_breakpoint() {
                println!("Guard recreated it as breakpoint {}", current.handle.id());
            }
        }
        None => println!("No command breakpoint registered"),
    }

    Ok(())
}

/// 標準入力から確認を読み取るゲート
struct StdinGate;

impl ConfirmationGate for StdinGate {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        let _ = io::stdout().flush();

        let mut line = String::new();
        if io::stdin().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim(), "y" | "Y" | "yes")
    }
}

fn state_label(state: GuardState) -> &'static str {
    match state {
        GuardState::EnabledActive => "enabled",
        GuardState::DisabledInactive => "disabled",
        GuardState::TornDown => "torn down",
    }
}

fn print_help() {
    println!("Available commands:");
    println!("  status, st      Show the guard state and registry contents");
    println!("  enable, e       Enable the command breakpoint ('enable dry' for a dry run)");
    println!("  disable, d      Disable the command breakpoint ('disable dry' for a dry run)");
    println!("  remove, rm      Simulate an external removal of the breakpoint");
    println!("  teardown        Tear the guard down and empty the registry");
    println!("  help, h, ?      Show this help");
    println!("  quit, q, exit   Exit");
}
