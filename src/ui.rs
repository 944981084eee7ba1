use crate::domain::Candidate;

pub fn display_error(message: &str) {
    eprintln!("\x1b[31mERROR:\x1b[0m {}", message); // Red color
}

pub fn display_success(message: &str) {
    println!("\x1b[32m✓\x1b[0m {}", message); // Green color
}

pub fn display_status(message: &str) {
    println!("\x1b[33m→\x1b[0m {}", message); // Yellow color
}

/// Echo a command line before it runs
pub fn display_command(command_line: &str) {
    println!("- {}", command_line);
}

pub fn display_candidates(current_version: &str, candidates: &[Candidate]) {
    println!("\n\x1b[1mCurrent Swift version:\x1b[0m {}", current_version);
    println!("\x1b[4mFound {} new tag(s):\x1b[0m", candidates.len());

    for (i, candidate) in candidates.iter().enumerate() {
        println!(
            "  {}. {} \x1b[2m({})\x1b[0m",
            i + 1,
            candidate.tag,
            format_identifier(&candidate.identifier)
        );
    }
}

pub fn display_tags(tags: &[String]) {
    if tags.is_empty() {
        println!("No release tags found");
        return;
    }
    println!("\x1b[1mRelease tags:\x1b[0m");
    for tag in tags {
        println!("  - {}", tag);
    }
}

/// Identifier as shown next to a candidate; empty identifiers produce no tag
pub fn format_identifier(identifier: &str) -> String {
    if identifier.is_empty() {
        "no tag".to_string()
    } else {
        format!("tag {}", identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_identifier() {
        assert_eq!(format_identifier("42"), "tag 42");
        assert_eq!(format_identifier(""), "no tag");
    }
}
