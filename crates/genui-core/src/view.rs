//! View coordinator: tabs, full-screen preview and export actions
//!
//! Every action reads the code buffer from the session state it is handed
//! and never mutates it. Without a `Succeeded` session, actions fail with
//! [`ViewError::NoCodeAvailable`] and have no side effect.

use std::path::{Path, PathBuf};

use crate::clipboard::Clipboard;
use crate::error::ViewError;
use crate::export::{export_code, ExportReceipt};
use crate::state::SessionState;
use crate::surface::{RenderSurface, TextSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Editor,
    Preview,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Editor => "Code",
            Tab::Preview => "Preview",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewState {
    pub active_tab: Tab,
    pub full_screen_open: bool,
}

pub struct ViewCoordinator {
    view: ViewState,
    clipboard: Box<dyn Clipboard + Send>,
    export_dir: PathBuf,
    inline: TextSurface,
    full_screen: TextSurface,
    browser: Box<dyn RenderSurface + Send>,
}

fn code_of(session: &SessionState) -> Result<&str, ViewError> {
    session.code().ok_or(ViewError::NoCodeAvailable)
}

impl ViewCoordinator {
    pub fn new(
        clipboard: Box<dyn Clipboard + Send>,
        export_dir: PathBuf,
        browser: Box<dyn RenderSurface + Send>,
    ) -> Self {
        Self {
            view: ViewState::default(),
            clipboard,
            export_dir,
            inline: TextSurface::new(),
            full_screen: TextSurface::new(),
            browser,
        }
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn inline_surface(&self) -> &TextSurface {
        &self.inline
    }

    pub fn inline_surface_mut(&mut self) -> &mut TextSurface {
        &mut self.inline
    }

    pub fn full_screen_surface(&self) -> &TextSurface {
        &self.full_screen
    }

    pub fn full_screen_surface_mut(&mut self) -> &mut TextSurface {
        &mut self.full_screen
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub fn set_export_dir(&mut self, dir: PathBuf) {
        self.export_dir = dir;
    }

    /// Bring surfaces in line with the session after any transition.
    ///
    /// A new buffer reloads every open surface; losing the buffer clears them
    /// and closes the full-screen preview.
    pub fn sync(&mut self, session: &SessionState) -> Result<(), ViewError> {
        match session.code() {
            Some(code) => {
                if self.inline.document() != Some(code) {
                    self.inline.load(code)?;
                    if self.view.full_screen_open {
                        self.full_screen.load(code)?;
                    }
                }
            }
            None => {
                self.inline.clear();
                self.full_screen.clear();
                self.view = ViewState::default();
            }
        }
        Ok(())
    }

    pub fn set_tab(&mut self, session: &SessionState, tab: Tab) -> Result<(), ViewError> {
        code_of(session)?;
        self.view.active_tab = tab;
        Ok(())
    }

    pub fn copy_to_clipboard(&mut self, session: &SessionState) -> Result<(), ViewError> {
        let code = code_of(session)?;
        self.clipboard.set_text(code)
    }

    pub fn export_to_file(&self, session: &SessionState) -> Result<ExportReceipt, ViewError> {
        let code = code_of(session)?;
        export_code(&self.export_dir, code)
    }

    pub fn open_full_screen_preview(&mut self, session: &SessionState) -> Result<(), ViewError> {
        let code = code_of(session)?;
        self.full_screen.load(code)?;
        self.view.full_screen_open = true;
        Ok(())
    }

    /// Closing is always allowed; it only hides the surface.
    pub fn close_full_screen_preview(&mut self) {
        self.view.full_screen_open = false;
        self.full_screen.clear();
    }

    /// Re-render the current buffer from scratch on every visible surface.
    pub fn refresh_preview(&mut self, session: &SessionState) -> Result<(), ViewError> {
        let code = code_of(session)?;
        self.inline.load(code)?;
        if self.view.full_screen_open {
            self.full_screen.load(code)?;
        }
        Ok(())
    }

    /// Hand the buffer to the external browser surface.
    pub fn open_in_browser(&mut self, session: &SessionState) -> Result<(), ViewError> {
        let code = code_of(session)?;
        self.browser.load(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::state::Ticket;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct MemoryClipboard {
        text: Arc<Mutex<Option<String>>>,
        fail: bool,
    }

    impl Clipboard for MemoryClipboard {
        fn set_text(&mut self, text: &str) -> Result<(), ViewError> {
            if self.fail {
                return Err(ViewError::ClipboardFailure("no display".into()));
            }
            *self.text.lock().unwrap() = Some(text.to_string());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSurface {
        loads: Arc<Mutex<Vec<String>>>,
    }

    impl RenderSurface for RecordingSurface {
        fn load(&mut self, document: &str) -> Result<(), ViewError> {
            self.loads.lock().unwrap().push(document.to_string());
            Ok(())
        }

        fn document(&self) -> Option<&str> {
            None
        }

        fn revision(&self) -> u64 {
            self.loads.lock().unwrap().len() as u64
        }

        fn clear(&mut self) {}
    }

    fn succeeded(code: &str) -> SessionState {
        SessionState::Succeeded {
            code: code.to_string(),
        }
    }

    fn not_succeeded() -> Vec<SessionState> {
        vec![
            SessionState::Idle,
            SessionState::InFlight { ticket: Ticket(1) },
            SessionState::Failed {
                reason: GenerationError::EmptyResponse,
            },
        ]
    }

    fn coordinator(dir: &Path) -> (ViewCoordinator, MemoryClipboard, RecordingSurface) {
        let clipboard = MemoryClipboard::default();
        let browser = RecordingSurface::default();
        let view = ViewCoordinator::new(
            Box::new(clipboard.clone()),
            dir.to_path_buf(),
            Box::new(browser.clone()),
        );
        (view, clipboard, browser)
    }

    #[test]
    fn test_export_scenario() {
        let dir = TempDir::new().unwrap();
        let (view, _, _) = coordinator(dir.path());

        let receipt = view.export_to_file(&succeeded("<p>Hi</p>")).unwrap();

        assert_eq!(receipt.path.file_name().unwrap(), "GenUI-Code.html");
        assert_eq!(fs::read_to_string(&receipt.path).unwrap(), "<p>Hi</p>");
    }

    #[test]
    fn test_copy_is_verbatim() {
        let dir = TempDir::new().unwrap();
        let (mut view, clipboard, _) = coordinator(dir.path());
        let code = "<div class=\"a\">\n  <p>x</p>\n</div>";

        view.copy_to_clipboard(&succeeded(code)).unwrap();
        assert_eq!(clipboard.text.lock().unwrap().as_deref(), Some(code));
    }

    #[test]
    fn test_clipboard_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let clipboard = MemoryClipboard {
            fail: true,
            ..Default::default()
        };
        let mut view = ViewCoordinator::new(
            Box::new(clipboard),
            dir.path().to_path_buf(),
            Box::new(RecordingSurface::default()),
        );

        let err = view.copy_to_clipboard(&succeeded("<p>x</p>")).unwrap_err();
        assert!(matches!(err, ViewError::ClipboardFailure(_)));
    }

    #[test]
    fn test_actions_without_code_have_no_side_effect() {
        let dir = TempDir::new().unwrap();
        let (mut view, clipboard, browser) = coordinator(dir.path());

        for session in not_succeeded() {
            assert!(matches!(view.copy_to_clipboard(&session), Err(ViewError::NoCodeAvailable)));
            assert!(matches!(view.export_to_file(&session), Err(ViewError::NoCodeAvailable)));
            assert!(matches!(
                view.set_tab(&session, Tab::Preview),
                Err(ViewError::NoCodeAvailable)
            ));
            assert!(matches!(
                view.open_full_screen_preview(&session),
                Err(ViewError::NoCodeAvailable)
            ));
            assert!(matches!(view.refresh_preview(&session), Err(ViewError::NoCodeAvailable)));
            assert!(matches!(view.open_in_browser(&session), Err(ViewError::NoCodeAvailable)));
        }

        assert_eq!(*clipboard.text.lock().unwrap(), None);
        assert!(browser.loads.lock().unwrap().is_empty());
        assert!(!dir.path().join("GenUI-Code.html").exists());
        assert_eq!(view.view(), ViewState::default());
    }

    #[test]
    fn test_full_screen_matches_inline() {
        let dir = TempDir::new().unwrap();
        let (mut view, _, _) = coordinator(dir.path());
        let session = succeeded("<h1>Title</h1>");

        view.sync(&session).unwrap();
        view.set_tab(&session, Tab::Preview).unwrap();
        view.open_full_screen_preview(&session).unwrap();

        assert!(view.view().full_screen_open);
        assert_eq!(view.view().active_tab, Tab::Preview);
        assert_eq!(view.full_screen_surface().document(), view.inline_surface().document());

        let newer = succeeded("<h1>Newer</h1>");
        view.sync(&newer).unwrap();
        assert_eq!(view.inline_surface().document(), Some("<h1>Newer</h1>"));
        assert_eq!(view.full_screen_surface().document(), Some("<h1>Newer</h1>"));

        view.close_full_screen_preview();
        assert!(!view.view().full_screen_open);
    }

    #[test]
    fn test_refresh_reloads_same_buffer() {
        let dir = TempDir::new().unwrap();
        let (mut view, _, _) = coordinator(dir.path());
        let session = succeeded("<p>x</p>");

        view.sync(&session).unwrap();
        let before = view.inline_surface().revision();
        view.refresh_preview(&session).unwrap();

        assert_eq!(view.inline_surface().revision(), before + 1);
        assert_eq!(view.inline_surface().document(), Some("<p>x</p>"));
        assert_eq!(session.code(), Some("<p>x</p>"));
    }

    #[test]
    fn test_sync_without_code_resets_view() {
        let dir = TempDir::new().unwrap();
        let (mut view, _, _) = coordinator(dir.path());
        let session = succeeded("<p>x</p>");
        view.sync(&session).unwrap();
        view.open_full_screen_preview(&session).unwrap();

        view.sync(&SessionState::Idle).unwrap();

        assert_eq!(view.view(), ViewState::default());
        assert_eq!(view.inline_surface().document(), None);
        assert_eq!(view.full_screen_surface().document(), None);
    }

    #[test]
    fn test_open_in_browser_hands_over_buffer() {
        let dir = TempDir::new().unwrap();
        let (mut view, _, browser) = coordinator(dir.path());

        view.open_in_browser(&succeeded("<p>Hi</p>")).unwrap();
        assert_eq!(browser.loads.lock().unwrap().as_slice(), ["<p>Hi</p>".to_string()]);
    }
}
