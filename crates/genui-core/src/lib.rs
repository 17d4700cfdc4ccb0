pub mod ai;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod framework;
pub mod notify;
pub mod provider;
pub mod request;
pub mod session;
pub mod state;
pub mod surface;
pub mod view;

// Re-export main types for convenience
pub use ai::{build_client, ClaudeClient, GeminiClient, GenerationClient, OllamaClient, OpenAIClient};
pub use clipboard::{Clipboard, SystemClipboard};
pub use config::Config;
pub use error::{ConfigError, GenerationError, RequestError, SessionError, ViewError};
pub use export::{ExportReceipt, EXPORT_FILE_NAME};
pub use extract::{extract, Extraction};
pub use framework::Framework;
pub use notify::{Notifications, Toast, ToastLevel};
pub use provider::Provider;
pub use request::GenerationRequest;
pub use session::SessionController;
pub use state::{Outcome, SessionEvent, SessionState, Ticket};
pub use surface::{BrowserSurface, RenderSurface, TextSurface};
pub use view::{Tab, ViewCoordinator, ViewState};
