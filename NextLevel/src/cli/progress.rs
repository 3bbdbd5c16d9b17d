//! CLI progress display utilities
//!
//! Step indicators with emoji and ASCII fallbacks.

use std::time::Duration;

use console::{Emoji, style};

/// Magnifying glass - for reading/scanning operations
pub static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
/// Package - for compression operations
pub static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "");
/// Floppy disk - for writing/saving operations
pub static DISK: Emoji<'_, '_> = Emoji("💾 ", "");
/// Gear - for processing operations
pub static GEAR: Emoji<'_, '_> = Emoji("⚙️  ", "");
/// Sparkles - for completion
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");

/// Print a step indicator: `[1/3] 📦 Message...`
///
/// # Example
/// ```ignore
/// print_step(1, 2, LOOKING_GLASS, "Reading archive...");
/// print_step(2, 2, DISK, "Writing archive...");
/// ```
pub fn print_step(current: usize, total: usize, emoji: Emoji, msg: &str) {
    eprintln!(
        "{} {}{}",
        style(format!("[{current}/{total}]")).bold().dim(),
        emoji,
        msg
    );
}

/// Print completion message: `✨ Done in 12.3ms`
pub fn print_done(elapsed: Duration) {
    eprintln!("{} Done in {}", SPARKLE, style(format!("{elapsed:.1?}")).green());
}
