use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("wkp")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("wkp")
        .about("Query console for the Web Knowledge Platform")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Log debug output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(--"api-url" <URL>)
                .required(false)
                .help("Backend base URL (default: $WKP_API_URL, then http://localhost:8000)")
                .value_parser(clap::value_parser!(Url))
                .global(true),
        )
        .arg(
            arg!(--"log-file" <PATH>)
                .required(false)
                .help("Where the interactive console writes its log (default: <tmp>/wkp.log)")
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("ui").about("Launch the interactive query console (the default)"),
        )
        .subcommand(
            command!("query")
                .about("Search the knowledge base once and print the matching companies")
                .arg(
                    arg!([TEXT] ...)
                        .required(false)
                        .help("Free-text query, e.g. steel companies contact"),
                )
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Print results as JSON")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("stats")
                .about("Print the crawl and knowledge graph counters once")
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Print stats as JSON")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
