//! Presentation helpers. Pure formatting; nothing here affects control flow.

use std::io::{stdout, Write};

use crossterm::style::{style, Stylize};
use rcon_core::storage::favorites::FavoriteListing;

pub fn intro() {
    println!("{}", style("Welcome to the Source RCON CLI.").green());
    println!("{}", style("Type '?' for help!").cyan());
}

pub fn plain(message: &str) {
    println!("{message}");
}

pub fn success(message: &str) {
    println!("{}", style(message).green());
}

pub fn heading(message: &str) {
    println!("{}", style(message).yellow());
}

pub fn warning(message: &str) {
    println!("{}", style(message).yellow());
}

pub fn error(message: &str) {
    println!("{}", style(message).red());
}

/// Server output as-is, making sure the prompt starts on a fresh line.
pub fn remote(text: &str) {
    let mut out = stdout();
    let _ = out.write_all(text.as_bytes());
    if !text.is_empty() && !text.ends_with('\n') {
        let _ = out.write_all(b"\n");
    }
    let _ = out.flush();
}

pub fn favorite_row(listing: &FavoriteListing<'_>) -> String {
    format!("{:<20} {:>10}:{}", listing.alias, listing.address, listing.port)
}

pub fn favorites(listings: &[FavoriteListing<'_>]) {
    heading("== Saved Servers ==");
    if listings.is_empty() {
        plain("(none yet, try 'favorite add')");
    }
    for listing in listings {
        plain(&favorite_row(listing));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn favorite_rows_are_aligned_and_password_free() {
        let row = favorite_row(&FavoriteListing {
            alias: "pub",
            address: "tf.example.com",
            port: 27015,
        });
        assert_eq!(row, format!("pub{}tf.example.com:27015", " ".repeat(18)));
    }
}
