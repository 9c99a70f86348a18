//! Terminal output helpers

use colored::*;

/// Print a stage heading
pub fn print_heading(title: &str) {
    println!("\n{}", title.bold());
}

/// Print report lines, indented
pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("  {}", line);
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "!".yellow(), message);
}

/// Print a failure message
pub fn print_failure(message: &str) {
    println!("{} {}", "✗".red(), message);
}
