//! Terminal output utilities

use std::time::Duration;

use chrono::Local;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::exec::subprocess::STDERR_PREFIX;
use crate::progress::ProgressSink;

/// Print an error message to stderr
pub fn print_error(message: &str) {
    eprintln!("{}: {}", style("error").red().bold(), message);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{}: {}", style("success").green().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{}: {}", style("info").blue().bold(), message);
}

/// Print a boxed section title
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("  {}", title);
    println!("{}", "=".repeat(60));
}

/// Create a spinner progress bar
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    // The template is a literal; a parse failure falls back to the default style
    if let Ok(spinner_style) = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Renders pipeline progress on the terminal
///
/// The spinner always shows the latest line. With `verbose` every line is
/// also printed above it, timestamped, with tool stderr highlighted.
pub struct ProgressRenderer {
    spinner: ProgressBar,
    verbose: bool,
}

impl ProgressRenderer {
    pub fn new(message: &str, verbose: bool) -> Self {
        Self {
            spinner: create_spinner(message),
            verbose,
        }
    }

    /// Remove the spinner before the final summary is printed
    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressSink for ProgressRenderer {
    fn report(&self, message: &str) {
        if self.verbose {
            let timestamp = style(Local::now().format("%H:%M:%S").to_string()).dim();
            let line = match message.strip_prefix(STDERR_PREFIX) {
                Some(rest) => format!("{} {} {}", timestamp, style("!").yellow(), rest),
                None => format!("{} {}", timestamp, message),
            };
            self.spinner.println(line);
        }
        self.spinner.set_message(message.to_string());
    }
}
