use crate::error::ViewError;

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ViewError>;
}

/// System clipboard backed by `arboard`.
///
/// The handle is opened on first use and kept alive: on X11 and Wayland the
/// copied text is only served while it exists.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ViewError> {
        if self.inner.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|e| ViewError::ClipboardFailure(e.to_string()))?;
            self.inner = Some(clipboard);
        }

        match self.inner.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text.to_string())
                .map_err(|e| ViewError::ClipboardFailure(e.to_string())),
            None => Err(ViewError::ClipboardFailure("clipboard unavailable".to_string())),
        }
    }
}
