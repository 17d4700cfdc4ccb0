use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use ratatui::widgets::ListState;

use genui_core::{
    build_client, BrowserSurface, ClaudeClient, Config, Framework, GeminiClient,
    GenerationClient, GenerationRequest, Notifications, OllamaClient, OpenAIClient, Outcome,
    Provider, SessionController, SessionError, SessionState, SystemClipboard, Tab,
    ViewCoordinator, ViewError,
};
use genui_core::surface::max_scroll;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Framework,
    Description,
    Output,
}

impl FocusPane {
    pub fn next(self) -> Self {
        match self {
            FocusPane::Framework => FocusPane::Description,
            FocusPane::Description => FocusPane::Output,
            FocusPane::Output => FocusPane::Framework,
        }
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Request form
    pub framework: Framework,
    pub description: String,
    pub description_cursor: usize, // cursor position in description, in chars

    // Generation session and its views
    pub session: SessionController,
    pub view: ViewCoordinator,
    pub notifications: Notifications,
    pub code_scroll: u16,
    pub code_height: u16,

    // Animation state
    pub animation_frame: u8,

    // Provider state
    pub config: Config,
    pub current_provider: Provider,
    pub selected_model: String,
    pub show_provider_picker: bool,
    pub provider_picker_state: ListState,

    // Model picker state
    pub show_model_picker: bool,
    pub available_models: Vec<String>,
    pub model_picker_state: ListState,

    // API key input state
    pub show_api_key_input: bool,
    pub api_key_input: String,
    pub api_key_input_cursor: usize,
    pub api_key_target_provider: Option<Provider>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let mut notifications = Notifications::new();

        let mut current_provider = config.provider();
        let mut selected_model = config.model_for(current_provider);

        // Fall back to the local provider rather than refusing to start
        let client: Arc<dyn GenerationClient> =
            match build_client(&config, current_provider, &selected_model) {
                Ok(client) => client,
                Err(e) => {
                    tracing::warn!(provider = current_provider.as_str(), error = %e, "falling back to Ollama");
                    notifications.error(format!("{}. Using Ollama; press P to configure.", e));
                    current_provider = Provider::Ollama;
                    selected_model = config.model_for(Provider::Ollama);
                    build_client(&config, Provider::Ollama, &selected_model)?
                }
            };

        let view = ViewCoordinator::new(
            Box::new(SystemClipboard::new()),
            config.export_dir(),
            Box::new(BrowserSurface::new()?),
        );

        Ok(Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Description,

            framework: config.framework(),
            description: String::new(),
            description_cursor: 0,

            session: SessionController::new(client),
            view,
            notifications,
            code_scroll: 0,
            code_height: 0,

            animation_frame: 0,

            config,
            current_provider,
            selected_model,
            show_provider_picker: false,
            provider_picker_state: ListState::default(),

            show_model_picker: false,
            available_models: Vec::new(),
            model_picker_state: ListState::default(),

            show_api_key_input: false,
            api_key_input: String::new(),
            api_key_input_cursor: 0,
            api_key_target_provider: None,
        })
    }

    pub fn session_state(&self) -> &SessionState {
        self.session.state()
    }

    pub fn has_code(&self) -> bool {
        self.session.state().code().is_some()
    }

    /// Build a request from the form and start a generation
    pub fn generate(&mut self) {
        let request = match GenerationRequest::new(&self.description, self.framework) {
            Ok(request) => request,
            Err(e) => {
                self.notifications.error(capitalize(&e.to_string()));
                return;
            }
        };

        match self.session.submit(request) {
            Ok(_) => {
                self.code_scroll = 0;
                self.animation_frame = 0;
                self.sync_view();
            }
            Err(SessionError::Busy) => {
                self.notifications.info("A generation is already in progress");
            }
        }
    }

    pub fn reset_session(&mut self) {
        self.session.reset();
        self.code_scroll = 0;
        self.sync_view();
    }

    /// Tick: harvest finished generations, animate, expire toasts
    pub async fn on_tick(&mut self) {
        for outcome in self.session.poll().await {
            match outcome {
                Outcome::Completed(_) => {
                    self.notifications.success("Code generated");
                    self.focus = FocusPane::Output;
                    self.input_mode = InputMode::Normal;
                }
                Outcome::Failed(reason) => {
                    self.notifications
                        .error(format!("Failed to generate code: {}", reason));
                }
                _ => {}
            }
            self.sync_view();
        }

        if self.session.state().is_in_flight() {
            self.animation_frame = (self.animation_frame + 1) % 10;
        }

        self.notifications.prune(Instant::now());
    }

    fn sync_view(&mut self) {
        if let Err(e) = self.view.sync(self.session.state()) {
            self.notifications.error(e.to_string());
        }
    }

    fn report(&mut self, result: Result<(), ViewError>, success: &str) {
        match result {
            Ok(()) => {
                if !success.is_empty() {
                    self.notifications.success(success);
                }
            }
            Err(ViewError::NoCodeAvailable) => self.notifications.info("No code available yet"),
            Err(ViewError::ClipboardFailure(e)) => {
                tracing::warn!(error = %e, "clipboard failure");
                self.notifications.error("Failed to copy");
            }
            Err(e) => self.notifications.error(capitalize(&e.to_string())),
        }
    }

    pub fn set_tab(&mut self, tab: Tab) {
        let result = self.view.set_tab(self.session.state(), tab);
        self.report(result, "");
    }

    pub fn toggle_tab(&mut self) {
        let tab = match self.view.view().active_tab {
            Tab::Editor => Tab::Preview,
            Tab::Preview => Tab::Editor,
        };
        self.set_tab(tab);
    }

    pub fn copy_code(&mut self) {
        let result = self.view.copy_to_clipboard(self.session.state());
        self.report(result, "Code copied to clipboard");
    }

    pub fn export_code(&mut self) {
        match self.view.export_to_file(self.session.state()) {
            Ok(receipt) => self.notifications.success(format!(
                "File downloaded successfully: {}",
                receipt.path.display()
            )),
            Err(e) => self.report(Err(e), ""),
        }
    }

    pub fn open_full_screen(&mut self) {
        let result = self.view.open_full_screen_preview(self.session.state());
        self.report(result, "");
    }

    pub fn close_full_screen(&mut self) {
        self.view.close_full_screen_preview();
    }

    pub fn refresh_preview(&mut self) {
        let result = self.view.refresh_preview(self.session.state());
        self.report(result, "Preview refreshed");
    }

    pub fn open_in_browser(&mut self) {
        let result = self.view.open_in_browser(self.session.state());
        self.report(result, "Opened preview in browser");
    }

    // Output scrolling: code lines on the Code tab, the inline surface on Preview
    pub fn scroll_down(&mut self) {
        match self.view.view().active_tab {
            Tab::Editor => {
                let lines = self
                    .session
                    .state()
                    .code()
                    .map(|code| code.lines().count())
                    .unwrap_or(0);
                let max = max_scroll(lines, self.code_height);
                self.code_scroll = self.code_scroll.saturating_add(1).min(max);
            }
            Tab::Preview => self.view.inline_surface_mut().scroll_down(),
        }
    }

    pub fn scroll_up(&mut self) {
        match self.view.view().active_tab {
            Tab::Editor => self.code_scroll = self.code_scroll.saturating_sub(1),
            Tab::Preview => self.view.inline_surface_mut().scroll_up(),
        }
    }

    pub fn next_framework(&mut self) {
        self.framework = self.framework.next();
    }

    pub fn prev_framework(&mut self) {
        self.framework = self.framework.prev();
    }

    /// Persist the selected framework as the default for next start
    pub fn save_framework(&mut self) {
        self.config.framework = Some(self.framework.as_str().to_string());
        if let Err(e) = self.config.save() {
            tracing::warn!(error = %e, "failed to save config");
        }
    }

    // Provider picker methods
    pub fn open_provider_picker(&mut self) {
        let current = Provider::all()
            .iter()
            .position(|p| *p == self.current_provider);
        self.provider_picker_state.select(current.or(Some(0)));
        self.show_provider_picker = true;
    }

    pub fn provider_picker_nav_down(&mut self) {
        let len = Provider::all().len();
        if len > 0 {
            let i = self.provider_picker_state.selected().unwrap_or(0);
            self.provider_picker_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn provider_picker_nav_up(&mut self) {
        let i = self.provider_picker_state.selected().unwrap_or(0);
        self.provider_picker_state.select(Some(i.saturating_sub(1)));
    }

    /// Switch to the provider under the picker cursor, asking for a key if needed
    pub fn select_provider(&mut self) {
        let Some(provider) = self
            .provider_picker_state
            .selected()
            .and_then(|i| Provider::all().get(i).copied())
        else {
            return;
        };
        self.show_provider_picker = false;

        if provider.needs_api_key() && self.config.api_key_for(provider).is_none() {
            self.api_key_target_provider = Some(provider);
            self.api_key_input.clear();
            self.api_key_input_cursor = 0;
            self.show_api_key_input = true;
            return;
        }

        self.switch_provider(provider, provider.default_model().to_string());
    }

    pub fn submit_api_key(&mut self) {
        if let Some(provider) = self.api_key_target_provider.take() {
            if !self.api_key_input.trim().is_empty() {
                self.config.set_api_key(provider, &self.api_key_input);
                self.switch_provider(provider, provider.default_model().to_string());
            }
        }
        self.show_api_key_input = false;
        self.api_key_input.clear();
        self.api_key_input_cursor = 0;
    }

    fn switch_provider(&mut self, provider: Provider, model: String) {
        match build_client(&self.config, provider, &model) {
            Ok(client) => {
                self.session.set_client(client);
                self.current_provider = provider;
                self.selected_model = model;
                self.config.provider = Some(provider.as_str().to_string());
                self.config.default_model = Some(self.selected_model.clone());
                if let Err(e) = self.config.save() {
                    tracing::warn!(error = %e, "failed to save config");
                }
                self.notifications
                    .info(format!("Using {}", self.session.client().describe()));
            }
            Err(e) => self.notifications.error(capitalize(&e.to_string())),
        }
    }

    // Model picker methods
    pub async fn open_model_picker(&mut self) {
        self.available_models = match self.current_provider {
            Provider::Gemini => GeminiClient::list_models(),
            Provider::Claude => ClaudeClient::list_models(),
            Provider::OpenAI => OpenAIClient::list_models(),
            Provider::Ollama => {
                let listed = match OllamaClient::new(self.config.ollama_url(), self.config.timeout()) {
                    Ok(client) => client.list_models().await.map_err(|e| e.to_string()),
                    Err(e) => Err(e.to_string()),
                };
                match listed {
                    Ok(models) => models,
                    Err(e) => {
                        self.notifications
                            .error(format!("Could not list Ollama models: {}", e));
                        Vec::new()
                    }
                }
            }
        };

        if self.available_models.is_empty() {
            return;
        }

        let current = self
            .available_models
            .iter()
            .position(|m| *m == self.selected_model);
        self.model_picker_state.select(current.or(Some(0)));
        self.show_model_picker = true;
    }

    pub fn model_picker_nav_down(&mut self) {
        let len = self.available_models.len();
        if len > 0 {
            let i = self.model_picker_state.selected().unwrap_or(0);
            self.model_picker_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn model_picker_nav_up(&mut self) {
        let i = self.model_picker_state.selected().unwrap_or(0);
        self.model_picker_state.select(Some(i.saturating_sub(1)));
    }

    pub fn select_model(&mut self) {
        if let Some(model) = self
            .model_picker_state
            .selected()
            .and_then(|i| self.available_models.get(i))
            .cloned()
        {
            self.show_model_picker = false;
            self.switch_provider(self.current_provider, model);
        }
    }

    pub fn key_source(&self, provider: Provider) -> Option<&'static str> {
        self.config.key_source(provider)
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
