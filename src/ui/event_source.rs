use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    time::{Interval, MissedTickBehavior},
};

use crate::{
    domain::events::{AppEvent, WidgetCommand},
    usecases::contracts::AppEventSource,
};

/// Interleaves scheduler ticks with commands typed on stdin.
pub struct StdinEventSource {
    lines: Lines<BufReader<Stdin>>,
    ticks: Interval,
}

impl StdinEventSource {
    pub fn new(tick: Duration) -> Self {
        let mut ticks = tokio::time::interval(tick);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            ticks,
        }
    }
}

#[async_trait]
impl AppEventSource for StdinEventSource {
    async fn next_event(&mut self) -> Result<Option<AppEvent>> {
        tokio::select! {
            _ = self.ticks.tick() => Ok(Some(AppEvent::Tick)),
            line = self.lines.next_line() => match line? {
                Some(line) => Ok(parse_command(&line)),
                None => Ok(Some(AppEvent::QuitRequested)),
            },
        }
    }
}

/// Parses one input line. Blank lines produce no event.
pub fn parse_command(line: &str) -> Option<AppEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map(|(verb, rest)| (verb, rest.trim()))
        .unwrap_or((line, ""));

    let command = match (verb, rest) {
        ("quit" | "exit", _) => return Some(AppEvent::QuitRequested),
        ("help" | "?", _) => return Some(AppEvent::HelpRequested),
        ("open", "") => WidgetCommand::Open,
        ("min", "") => WidgetCommand::ToggleMinimize,
        ("close", "") => WidgetCommand::Close,
        ("send", text) => WidgetCommand::SendText(text.to_owned()),
        ("retry", "") => WidgetCommand::RetrySend,
        ("photo", path) if !path.is_empty() => WidgetCommand::AttachPhoto(PathBuf::from(path)),
        ("attach", path) if !path.is_empty() => WidgetCommand::Attach(PathBuf::from(path)),
        ("upload", caption) => WidgetCommand::UploadAttachment {
            caption: (!caption.is_empty()).then(|| caption.to_owned()),
        },
        ("cancel", "") => WidgetCommand::CancelAttachment,
        ("gallery", "") => WidgetCommand::OpenGallery(0),
        ("gallery", target) => match target.parse::<usize>() {
            Ok(number) if number > 0 => WidgetCommand::OpenGallery(number - 1),
            Ok(_) => return Some(AppEvent::Invalid(line.to_owned())),
            Err(_) => WidgetCommand::OpenGalleryAt(target.to_owned()),
        },
        ("next", "") => WidgetCommand::GalleryNext,
        ("prev", "") => WidgetCommand::GalleryPrev,
        ("save", "") => WidgetCommand::SaveGalleryImage,
        ("shut", "") => WidgetCommand::CloseGallery,
        ("dismiss", "") => WidgetCommand::DismissBanner,
        ("ref", reference) if !reference.is_empty() => {
            WidgetCommand::SetReference(reference.to_owned())
        }
        ("show", "") => WidgetCommand::Show,
        _ => return Some(AppEvent::Invalid(line.to_owned())),
    };

    Some(AppEvent::Command(command))
}

#[cfg(test)]
pub struct MockEventSource {
    queue: std::collections::VecDeque<AppEvent>,
}

#[cfg(test)]
impl MockEventSource {
    pub fn from(events: Vec<AppEvent>) -> Self {
        Self {
            queue: events.into(),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl AppEventSource for MockEventSource {
    async fn next_event(&mut self) -> Result<Option<AppEvent>> {
        Ok(Some(
            self.queue.pop_front().unwrap_or(AppEvent::QuitRequested),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(line: &str) -> Option<WidgetCommand> {
        match parse_command(line) {
            Some(AppEvent::Command(command)) => Some(command),
            _ => None,
        }
    }

    #[test]
    fn send_keeps_inner_whitespace() {
        assert_eq!(
            command("send  hello   there "),
            Some(WidgetCommand::SendText("hello   there".to_owned()))
        );
        assert_eq!(command("send"), Some(WidgetCommand::SendText(String::new())));
    }

    #[test]
    fn gallery_numbers_are_one_based() {
        assert_eq!(command("gallery 2"), Some(WidgetCommand::OpenGallery(1)));
        assert_eq!(command("gallery"), Some(WidgetCommand::OpenGallery(0)));
        assert_eq!(
            parse_command("gallery 0"),
            Some(AppEvent::Invalid("gallery 0".to_owned()))
        );
    }

    #[test]
    fn gallery_accepts_image_url() {
        assert_eq!(
            command("gallery https://files.test/b.png"),
            Some(WidgetCommand::OpenGalleryAt("https://files.test/b.png".to_owned()))
        );
    }

    #[test]
    fn photo_and_attach_are_separate_pickers() {
        assert_eq!(
            command("photo shot.png"),
            Some(WidgetCommand::AttachPhoto(PathBuf::from("shot.png")))
        );
        assert_eq!(
            command("attach report.pdf"),
            Some(WidgetCommand::Attach(PathBuf::from("report.pdf")))
        );
        assert_eq!(command("retry"), Some(WidgetCommand::RetrySend));
        assert_eq!(
            parse_command("photo"),
            Some(AppEvent::Invalid("photo".to_owned()))
        );
    }

    #[test]
    fn upload_caption_is_optional() {
        assert_eq!(
            command("upload"),
            Some(WidgetCommand::UploadAttachment { caption: None })
        );
        assert_eq!(
            command("upload my screen"),
            Some(WidgetCommand::UploadAttachment {
                caption: Some("my screen".to_owned())
            })
        );
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(parse_command("   "), None);
        assert_eq!(
            parse_command("open now"),
            Some(AppEvent::Invalid("open now".to_owned()))
        );
        assert_eq!(parse_command("quit"), Some(AppEvent::QuitRequested));
    }

    #[tokio::test]
    async fn mock_source_ends_with_quit() {
        let mut source = MockEventSource::from(vec![AppEvent::Tick]);

        assert_eq!(source.next_event().await.expect("event"), Some(AppEvent::Tick));
        assert_eq!(
            source.next_event().await.expect("event"),
            Some(AppEvent::QuitRequested)
        );
    }
}
