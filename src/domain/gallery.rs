use super::message::{FileInfo, Message};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryImage {
    pub message_id: i64,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryView {
    pub current_index: usize,
    pub images: Vec<GalleryImage>,
}

impl GalleryView {
    pub fn current(&self) -> Option<&GalleryImage> {
        self.images.get(self.current_index)
    }
}

/// Full-screen viewer over the image attachments of a conversation.
///
/// Reads messages but never mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GalleryNavigator {
    view: Option<GalleryView>,
}

/// Image messages whose attachment resolves to a fetchable URL, in conversation order.
pub fn derive_images<'a, I, R>(images: I, resolve: R) -> Vec<GalleryImage>
where
    I: IntoIterator<Item = (&'a Message, &'a FileInfo)>,
    R: Fn(&FileInfo) -> Option<String>,
{
    images
        .into_iter()
        .filter_map(|(message, file)| {
            resolve(file).map(|url| GalleryImage {
                message_id: message.id,
                name: file.name.clone(),
                url,
            })
        })
        .collect()
}

impl GalleryNavigator {
    pub fn view(&self) -> Option<&GalleryView> {
        self.view.as_ref()
    }

    pub fn current(&self) -> Option<&GalleryImage> {
        self.view.as_ref().and_then(GalleryView::current)
    }

    /// Opens the viewer on `url`, falling back to the first image when absent.
    pub fn open(&mut self, images: Vec<GalleryImage>, url: &str) -> Option<&GalleryView> {
        if images.is_empty() {
            self.view = None;
            return None;
        }

        let current_index = images
            .iter()
            .position(|image| image.url == url)
            .unwrap_or(0);

        self.view = Some(GalleryView {
            current_index,
            images,
        });
        self.view.as_ref()
    }

    pub fn next(&mut self) {
        if let Some(view) = self.view.as_mut() {
            let n = view.images.len();
            if n > 1 {
                view.current_index = (view.current_index + 1) % n;
            }
        }
    }

    pub fn prev(&mut self) {
        if let Some(view) = self.view.as_mut() {
            let n = view.images.len();
            if n > 1 {
                view.current_index = (view.current_index + n - 1) % n;
            }
        }
    }

    pub fn close(&mut self) {
        self.view = None;
    }
}
