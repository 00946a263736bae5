//! Output formatting and display utilities

use colored::Colorize;
use stockroom_auth::{HealthStatus, Identity, Profile};

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{} {}", "⚠".yellow().bold(), msg);
}

/// Print a header
pub fn header(msg: &str) {
    println!("\n{}", msg.bold().underline());
}

/// Print the identity returned by a successful login
pub fn print_identity(identity: &Identity) {
    header("Signed in");
    println!("  {:<10} {}", "id".dimmed(), identity.id);
    println!("  {:<10} {}", "username".dimmed(), identity.username);
    println!(
        "  {:<10} {} {}",
        "name".dimmed(),
        identity.first_name,
        identity.last_name
    );
    println!("  {:<10} {}", "role".dimmed(), identity.role);
}

/// Print an account profile
pub fn print_profile(profile: &Profile) {
    header(&format!("Account {}", profile.identity.username));
    println!("  {:<10} {}", "id".dimmed(), profile.identity.id);
    println!(
        "  {:<10} {} {}",
        "name".dimmed(),
        profile.identity.first_name,
        profile.identity.last_name
    );
    println!(
        "  {:<10} {}",
        "email".dimmed(),
        profile.email.as_deref().unwrap_or("-")
    );
    println!("  {:<10} {}", "role".dimmed(), profile.identity.role);
}

/// Print a table of account profiles
pub fn print_profiles(profiles: &[Profile]) {
    header(&format!("{} accounts", profiles.len()));
    for profile in profiles {
        let identity = &profile.identity;
        println!(
            "  {:>5}  {:<16} {:<9} {} {}",
            identity.id.to_string().dimmed(),
            identity.username,
            identity.role.as_str(),
            identity.first_name,
            identity.last_name
        );
    }
}

/// Print database health
pub fn print_health(status: &HealthStatus) {
    header("Database");
    if status.is_healthy() {
        success(&format!("Reachable in {} ms", status.latency.as_millis()));
    } else {
        warning(&format!("Slow response: {} ms", status.latency.as_millis()));
    }
    if status.ssl_enabled {
        success("Connection encrypted");
    } else {
        warning("Connection NOT encrypted");
    }
    println!(
        "  {} connections, {} idle",
        status.pool_size, status.idle_connections
    );
}
