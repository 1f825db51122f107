use std::fmt::Write as _;

use perkdir_client::{DirectoryRender, Listing};
use perkdir_core::{find_option, MerchantOption};

/// Prints a render to stdout. An error render is printed and then returned
/// as an error so the process exits non-zero.
pub(crate) fn print_render(render: &DirectoryRender, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(render)?);
    } else {
        print!("{}", format_render(render));
    }
    fail_on_error(render)
}

pub(crate) fn print_options(
    render: &DirectoryRender,
    options: &[MerchantOption],
    as_json: bool,
) -> anyhow::Result<()> {
    fail_on_error(render)?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(options)?);
    } else {
        print!("{}", format_options(options));
    }
    Ok(())
}

fn fail_on_error(render: &DirectoryRender) -> anyhow::Result<()> {
    match render {
        DirectoryRender::Error { reason } => anyhow::bail!("could not load perks: {reason}"),
        _ => Ok(()),
    }
}

pub(crate) fn format_render(render: &DirectoryRender) -> String {
    match render {
        DirectoryRender::Loading => "Loading perks...\n".to_string(),
        DirectoryRender::Error { reason } => format!("Error loading perks: {reason}\n"),
        DirectoryRender::Ready(listing) => format_listing(listing),
    }
}

pub(crate) fn format_listing(listing: &Listing) -> String {
    let mut out = String::new();

    let mut filters = Vec::new();
    if !listing.name_query.trim().is_empty() {
        filters.push(format!("name ~ \"{}\"", listing.name_query.trim()));
    }
    if let Some(merchant) = &listing.selected_merchant {
        let label = find_option(&listing.options, merchant)
            .map_or(merchant.as_str(), |o| o.label.as_str());
        filters.push(format!("merchant = {label}"));
    }

    let _ = write!(out, "{}", listing.summary);
    if !filters.is_empty() {
        let _ = write!(out, " ({})", filters.join(", "));
    }
    out.push('\n');
    let _ = writeln!(
        out,
        "Fetched {}",
        listing.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    if let Some(message) = listing.empty_message {
        let _ = writeln!(out, "{message}");
        return out;
    }

    for card in &listing.cards {
        let _ = writeln!(out, "  - {}  [{}]", card.title, card.merchant);
        if let Some(description) = &card.description {
            let _ = writeln!(out, "      {description}");
        }
    }
    out
}

pub(crate) fn format_options(options: &[MerchantOption]) -> String {
    if options.is_empty() {
        return "No merchants.\n".to_string();
    }
    let width = options.iter().map(|o| o.id.len()).max().unwrap_or(0);
    options.iter().fold(String::new(), |mut out, o| {
        let _ = writeln!(out, "{:<width$}  {}", o.id, o.label);
        out
    })
}

#[cfg(test)]
#[path = "output_test.rs"]
mod tests;
