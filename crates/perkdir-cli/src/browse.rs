//! Line-driven browse session over one fetched directory.

use perkdir_client::{DirectoryRender, DirectoryView};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::output::{format_options, format_render};

const HELP: &str = "\
commands:
  name <text>      filter by title fragment (blank clears)
  merchant <id>    filter by merchant id (no id clears)
  merchants        list merchant ids
  clear            reset all filters
  show             print the current listing
  quit             leave
";

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum BrowseCommand {
    Name(String),
    Merchant(Option<String>),
    Merchants,
    Clear,
    Show,
    Help,
    Quit,
    Unknown(String),
}

/// Parses one input line. Blank lines yield `None`.
pub(crate) fn parse_command(line: &str) -> Option<BrowseCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    Some(match word.to_lowercase().as_str() {
        "name" => BrowseCommand::Name(rest.to_owned()),
        "merchant" => {
            BrowseCommand::Merchant((!rest.is_empty()).then(|| rest.to_owned()))
        }
        "merchants" => BrowseCommand::Merchants,
        "clear" => BrowseCommand::Clear,
        "show" => BrowseCommand::Show,
        "help" | "?" => BrowseCommand::Help,
        "quit" | "exit" | "q" => BrowseCommand::Quit,
        _ => BrowseCommand::Unknown(word.to_owned()),
    })
}

pub(crate) async fn run<S>(view: &mut DirectoryView<S>) -> anyhow::Result<()> {
    print!("{}", format_render(view.render()));
    if let DirectoryRender::Error { reason } = view.render() {
        anyhow::bail!("could not load perks: {reason}");
    }
    print!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = parse_command(&line) else {
            continue;
        };
        let applied = match command {
            BrowseCommand::Name(query) => view.set_name_query(query),
            BrowseCommand::Merchant(merchant_id) => view.set_merchant(merchant_id),
            BrowseCommand::Clear => view.clear_filters(),
            BrowseCommand::Show => Ok(()),
            BrowseCommand::Merchants => {
                print!("{}", format_options(view.options()));
                continue;
            }
            BrowseCommand::Help => {
                print!("{HELP}");
                continue;
            }
            BrowseCommand::Quit => break,
            BrowseCommand::Unknown(word) => {
                println!("unknown command \"{word}\" (try `help`)");
                continue;
            }
        };
        applied?;
        print!("{}", format_render(view.render()));
    }

    view.teardown();
    Ok(())
}
