use crate::config::{Config, ConfigStore, TimerChoice};
use crate::input::{self, Action};
use crate::paragraphs::ParagraphPicker;
use crate::runtime::AppEvent;
use crate::session::{Phase, SessionController, SessionError, Snapshot, StartTrigger};

/// Settings a run of the app was started with
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub timer: TimerChoice,
    pub start_trigger: StartTrigger,
    /// Custom paragraph that replaces the built-in ones
    pub prompt: Option<String>,
}

impl From<&Config> for Settings {
    fn from(cfg: &Config) -> Self {
        Self {
            timer: cfg.timer,
            start_trigger: cfg.start_trigger(),
            prompt: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    session: SessionController,
    snapshot: Snapshot,
    picker: ParagraphPicker,
    settings: Settings,
    store: Option<Box<dyn ConfigStore>>,
}

impl App {
    pub fn new(settings: Settings) -> Result<Self, SessionError> {
        Self::with_picker(settings, ParagraphPicker::new())
    }

    pub fn with_picker(
        settings: Settings,
        mut picker: ParagraphPicker,
    ) -> Result<Self, SessionError> {
        let text = match &settings.prompt {
            Some(prompt) => prompt.clone(),
            None => picker.next_paragraph().to_string(),
        };
        let session = SessionController::new(&text, settings.timer.timer_config())?
            .with_start_trigger(settings.start_trigger);

        Ok(Self {
            snapshot: session.snapshot(),
            session,
            picker,
            settings,
            store: None,
        })
    }

    /// Persist timer changes through `store`
    pub fn with_store(mut self, store: Box<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn on_event(&mut self, event: AppEvent) -> Result<Flow, SessionError> {
        match event {
            AppEvent::Tick => {
                self.on_tick();
                Ok(Flow::Continue)
            }
            AppEvent::Resize => Ok(Flow::Continue),
            AppEvent::Closed => Ok(Flow::Quit),
            AppEvent::Key(key) => self.apply(input::map_key(key, self.snapshot.phase)),
        }
    }

    /// Only a running session is ticked.
    pub fn on_tick(&mut self) {
        if self.snapshot.phase == Phase::Running {
            self.snapshot = self.session.tick();
        }
    }

    pub fn apply(&mut self, action: Action) -> Result<Flow, SessionError> {
        match action {
            Action::Type(c) => self.snapshot = self.session.press(c),
            Action::Backspace => self.snapshot = self.session.backspace(),
            Action::Start => self.snapshot = self.session.start(),
            Action::Restart => {
                let text: String = self.session.target().iter().collect();
                self.reset_with(&text)?;
            }
            Action::NewParagraph => {
                let text = self.next_text();
                self.reset_with(&text)?;
            }
            Action::CycleTimer => {
                self.settings.timer = self.settings.timer.next();
                self.save_timer();
                let text = self.next_text();
                self.reset_with(&text)?;
            }
            Action::Quit => return Ok(Flow::Quit),
            Action::Ignore => {}
        }
        Ok(Flow::Continue)
    }

    fn next_text(&mut self) -> String {
        match &self.settings.prompt {
            Some(prompt) => prompt.clone(),
            None => self.picker.next_paragraph().to_string(),
        }
    }

    fn reset_with(&mut self, text: &str) -> Result<(), SessionError> {
        self.snapshot = self.session.reset(text, self.settings.timer.timer_config())?;
        Ok(())
    }

    fn save_timer(&self) {
        if let Some(store) = &self.store {
            let mut cfg = store.load();
            cfg.timer = self.settings.timer;
            if let Err(err) = store.save(&cfg) {
                tracing::warn!(%err, "failed to save timer selection");
            }
        }
    }
}
