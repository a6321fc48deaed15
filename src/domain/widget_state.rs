/// Visible state of the floating chat widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetState {
    #[default]
    Closed,
    Opening,
    Open,
    Minimized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetEvent {
    OpenRequested,
    SessionLookupCompleted,
    MinimizeToggled,
    CloseRequested,
}

impl WidgetState {
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Open => "open",
            Self::Minimized => "minimized",
        }
    }

    /// Next state for `event`, or None when the event does not apply here.
    pub fn on_event(self, event: WidgetEvent) -> Option<Self> {
        match (self, event) {
            (Self::Closed, WidgetEvent::OpenRequested) => Some(Self::Opening),
            (Self::Opening, WidgetEvent::SessionLookupCompleted) => Some(Self::Open),
            (Self::Open, WidgetEvent::MinimizeToggled) => Some(Self::Minimized),
            (Self::Minimized, WidgetEvent::MinimizeToggled) => Some(Self::Open),
            (Self::Minimized, WidgetEvent::OpenRequested) => Some(Self::Open),
            (Self::Closed, WidgetEvent::CloseRequested) => None,
            (_, WidgetEvent::CloseRequested) => Some(Self::Closed),
            _ => None,
        }
    }

    /// Foreground sync, heartbeat and presence polling run only here.
    pub fn is_foreground(self) -> bool {
        self == Self::Open
    }

    /// Whether the unread badge is hidden because the conversation is on screen.
    pub fn hides_badge(self) -> bool {
        matches!(self, Self::Opening | Self::Open)
    }
}
