use itertools::Itertools;
use std::io;

/// The message of an io::Error without its trailing "(os error N)".
pub fn io_error_to_string(err: &io::Error) -> String {
    let s = err.to_string();
    match err.raw_os_error() {
        Some(code) => s
            .strip_suffix(&format!(" (os error {code})"))
            .unwrap_or(&s)
            .to_string(),
        None => s,
    }
}

/// Render an error and its causes, one cause per line.
pub fn format_error_chain(err: &anyhow::Error) -> String {
    match err.downcast_ref::<io::Error>() {
        Some(io_err) if err.chain().len() == 1 => format!("ERROR: {}", io_error_to_string(io_err)),
        _ => format!("ERROR: {}", err.chain().join("\n\tCaused by: ")),
    }
}

pub fn print_error_chain(err: &anyhow::Error) {
    eprintln!("{}", format_error_chain(err));
}
