use clap::ArgMatches;
use colored::Colorize;
use commands::command_argument_builder;
use tracing::error;
use url::Url;
use wkp::handlers::{
    CommandOutput, LogTarget, init_logging, log_file_path, print_banner, query_text, run_query,
    run_stats,
};
use wkp_client::ApiClient;
use wkp_core::ConsoleConfig;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let verbose = chosen_command.get_flag("verbose");

    let log_target = match chosen_command.subcommand() {
        None | Some(("ui", _)) => LogTarget::File(log_file_path(
            chosen_command.get_one::<String>("log-file").map(String::as_str),
        )),
        _ => LogTarget::Stderr,
    };
    if let Err(e) = init_logging(&log_target, verbose) {
        eprintln!("{} {:#}", "✗".red().bold(), e);
    }

    let api_url = chosen_command.get_one::<Url>("api-url").map(Url::as_str);
    let config = match ConsoleConfig::from_env(api_url) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(2);
        }
    };

    let exit_code = match chosen_command.subcommand() {
        None | Some(("ui", _)) => handle_ui(config).await,
        Some(("query", primary_command)) => handle_query(primary_command, config, quiet).await,
        Some(("stats", primary_command)) => handle_stats(primary_command, config, quiet).await,
        _ => unreachable!("clap should ensure we don't get here"),
    };

    std::process::exit(exit_code);
}

async fn handle_ui(config: ConsoleConfig) -> i32 {
    match wkp_tui::run(config).await {
        Ok(()) => 0,
        Err(e) => {
            error!("Console failed: {:#}", e);
            eprintln!("Error running TUI: {:#}", e);
            1
        }
    }
}

fn build_client(config: &ConsoleConfig) -> Option<ApiClient> {
    match ApiClient::new(config.api_url.as_str()) {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            None
        }
    }
}

fn emit(output: CommandOutput) -> i32 {
    println!("{}", output.text);
    output.exit_code
}

async fn handle_query(args: &ArgMatches, config: ConsoleConfig, quiet: bool) -> i32 {
    let as_json = args.get_flag("json");
    let words: Vec<String> = args
        .get_many::<String>("TEXT")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let Some(text) = query_text(&words) else {
        return emit(CommandOutput {
            text: format!("{} Nothing to search for. Try: wkp query steel companies contact", "→".blue()),
            exit_code: 0,
        });
    };

    let Some(client) = build_client(&config) else {
        return 2;
    };

    if !quiet && !as_json {
        print_banner();
    }

    emit(run_query(&client, &text, as_json, !quiet && !as_json).await)
}

async fn handle_stats(args: &ArgMatches, config: ConsoleConfig, quiet: bool) -> i32 {
    let as_json = args.get_flag("json");

    let Some(client) = build_client(&config) else {
        return 2;
    };

    if !quiet && !as_json {
        print_banner();
    }

    emit(run_stats(&client, as_json).await)
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
