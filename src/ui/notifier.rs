use std::io::{self, Write};

use crate::usecases::contracts::NotificationSink;

const BELL: &str = "\x07";

/// Rings the terminal bell for a cue and prints badge changes.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl NotificationSink for TerminalNotifier {
    fn play_cue(&self) {
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "{BELL}");
        let _ = stdout.flush();
    }

    fn set_badge(&self, unread: usize) {
        if unread > 0 {
            println!("({unread} unread from support)");
        }
    }
}
