//! Decides when a new support message deserves a sound cue.
//!
//! The trigger is a plain value: each observation consumes the current state and
//! returns the next one together with the decision, so callers own the state
//! explicitly between sync cycles.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NotificationTrigger {
    previous_unread: usize,
    last_cued_message: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerOutcome {
    pub next: NotificationTrigger,
    pub play_cue: bool,
    pub badge: usize,
}

impl NotificationTrigger {
    /// Acknowledges the conversation: badge and history drop to zero.
    pub fn reset(self) -> Self {
        Self {
            previous_unread: 0,
            last_cued_message: self.last_cued_message,
        }
    }

    /// Observes a fresh unread count from a background sync.
    ///
    /// A cue plays only when the count strictly increased and the newest unread
    /// message has not been cued for already.
    pub fn observe_unread(self, unread: usize, newest_unread: Option<i64>) -> TriggerOutcome {
        let increased = unread > self.previous_unread;
        let play_cue = increased && newest_unread.is_some() && newest_unread != self.last_cued_message;

        TriggerOutcome {
            next: Self {
                previous_unread: unread,
                last_cued_message: if play_cue {
                    newest_unread
                } else {
                    self.last_cued_message
                },
            },
            play_cue,
            badge: unread,
        }
    }

    /// Observes a "new incoming message" signal from a foreground sync.
    ///
    /// The conversation is visible, so the badge stays at zero; the cue still plays
    /// once per message.
    pub fn observe_incoming(self, newest_message: i64) -> TriggerOutcome {
        let play_cue = self.last_cued_message != Some(newest_message);

        TriggerOutcome {
            next: Self {
                previous_unread: 0,
                last_cued_message: Some(newest_message),
            },
            play_cue,
            badge: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cue_fires_once_for_two_unread_and_not_again_when_unchanged() {
        let trigger = NotificationTrigger::default();

        let first = trigger.observe_unread(2, Some(11));
        assert!(first.play_cue);
        assert_eq!(first.badge, 2);

        let second = first.next.observe_unread(2, Some(11));
        assert!(!second.play_cue);
        assert_eq!(second.badge, 2);
    }

    #[test]
    fn cue_never_fires_on_decrease() {
        let trigger = NotificationTrigger::default()
            .observe_unread(3, Some(3))
            .next;

        let outcome = trigger.observe_unread(1, Some(1));

        assert!(!outcome.play_cue);
        assert_eq!(outcome.next.previous_unread, 1);
    }

    #[test]
    fn cue_fires_again_for_a_newer_message() {
        let trigger = NotificationTrigger::default()
            .observe_unread(1, Some(1))
            .next;

        let outcome = trigger.observe_unread(2, Some(2));

        assert!(outcome.play_cue);
    }

    #[test]
    fn reset_forces_zero_previous_unread() {
        let trigger = NotificationTrigger::default()
            .observe_unread(4, Some(4))
            .next
            .reset();

        assert_eq!(trigger.previous_unread, 0);
    }

    #[test]
    fn foreground_and_background_signals_for_same_message_cue_once() {
        let trigger = NotificationTrigger::default();

        let background = trigger.observe_unread(1, Some(9));
        assert!(background.play_cue);

        let foreground = background.next.observe_incoming(9);
        assert!(!foreground.play_cue);
        assert_eq!(foreground.badge, 0);
    }

    #[test]
    fn incoming_signal_cues_unseen_message() {
        let outcome = NotificationTrigger::default().observe_incoming(5);

        assert!(outcome.play_cue);
        assert_eq!(outcome.next.previous_unread, 0);
    }

    #[test]
    fn cue_fires_at_most_once_per_increase_over_any_sequence() {
        let counts = [0usize, 1, 1, 2, 1, 1, 3, 3, 0, 2];
        let mut trigger = NotificationTrigger::default();
        let mut previous = 0usize;

        for (step, unread) in counts.into_iter().enumerate() {
            let outcome = trigger.observe_unread(unread, Some(step as i64));
            assert_eq!(outcome.play_cue, unread > previous, "step {step}");
            previous = unread;
            trigger = outcome.next;
        }
    }
}
