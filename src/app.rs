//! Application state and the main event loop.
//!
//! `App` is the presentation layer around the shell session: it turns key
//! presses into session calls, feeds shell output into the transcript,
//! and redraws after every event.

use std::io;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result, anyhow};
use ratatui::DefaultTerminal;
use tokio::sync::mpsc::Receiver;
use tracing::info;

use crate::config::Settings;
use crate::event::{Intent, UserEvent, init_user_event, key_to_intent};
use crate::output::Transcript;
use crate::shell::{SessionManager, SessionProcess, SessionState};
use crate::ui::{InputLine, SCROLL_STEP, TranscriptView, WindowLayout};

pub struct App {
    // backend
    session: SessionManager,

    // frontend state, read by the ui module
    pub(crate) input: InputLine,
    pub(crate) view: TranscriptView,
    pub(crate) session_state: SessionState,  // Cached for rendering
    pub(crate) shell_name: String,

    exit: bool,  // Should the app exit?

    // events sources
    user_events: Receiver<io::Result<UserEvent>>,
}

impl App {
    /// Build the app reading user input from the terminal.
    pub fn new(settings: Settings) -> Self {
        Self::with_user_events(settings, init_user_event())
    }

    /// Build the app with an explicit user event source.
    pub fn with_user_events(
        settings: Settings,
        user_events: Receiver<io::Result<UserEvent>>,
    ) -> Self {
        let shell_name = settings.shell.program.clone();
        let process = SessionProcess::new(settings.shell);
        let mut session =
            SessionManager::new(process, Transcript::new(settings.max_lines), settings.decoder)
                .with_timeouts(settings.timeouts)
                .with_line_ending(settings.line_ending);

        let view = TranscriptView::new();
        let unread = view.unread_counter();
        session.on_output_available(move |_| {
            unread.fetch_add(1, Ordering::Relaxed);
        });
        let unread = view.unread_counter();
        session.on_error_available(move |_| {
            unread.fetch_add(1, Ordering::Relaxed);
        });

        Self {
            session,
            input: InputLine::new(),
            view,
            session_state: SessionState::NotStarted,
            shell_name,
            exit: false,
            user_events,
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Whether the user asked to close the window.
    pub fn should_exit(&self) -> bool {
        self.exit
    }

    /// Run until the user quits, then shut the session down.
    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        self.session.start().await;
        self.refresh_state();

        let result = self.event_loop(terminal).await;
        self.session.shutdown().await;
        info!("Application exiting");
        result
    }

    async fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        self.draw(terminal)?;
        loop {
            if self.should_exit() {
                break Ok(());
            }
            tokio::select! {
                res = self.user_events.recv() => {
                    let usr_evt = res.with_context(|| anyhow!("User event stream is ended."))?;
                    let usr_evt = usr_evt.context("Failed to read terminal input")?;
                    self.handle_user_event(usr_evt).await;
                }
                Some(event) = self.session.next_event() => {
                    self.session.handle_process_event(event);
                }
            }
            self.refresh_state();
            self.draw(terminal)?;
        }
    }

    pub fn draw(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        terminal.draw(|frame| {
            let area = frame.area();
            use ratatui::widgets::Widget;
            (&*self).render(area, frame.buffer_mut());

            let input = WindowLayout::new(area).input_inner();
            let (_, col) = self.input.visible(usize::from(input.width));
            let col = u16::try_from(col).unwrap_or(u16::MAX);
            frame.set_cursor_position((input.x.saturating_add(col), input.y));
        })?;
        Ok(())
    }

    fn refresh_state(&mut self) {
        self.session_state = self.session.state();
    }

    async fn handle_user_event(&mut self, event: UserEvent) {
        // Resize needs nothing beyond the redraw after every event
        if let UserEvent::Key(key) = event {
            if let Some(intent) = key_to_intent(key) {
                self.apply(intent).await;
            }
        }
    }

    /// Carry out one user intent.
    pub async fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::Submit => {
                let line = self.input.submit();
                self.view.scroll_to_bottom();
                self.session.submit_command(&line).await;
            }
            Intent::Interrupt => self.session.request_interrupt().await,
            Intent::Quit => self.exit = true,
            Intent::Insert(c) => self.input.insert(c),
            Intent::Backspace => self.input.backspace(),
            Intent::Delete => self.input.delete(),
            Intent::CursorLeft => self.input.left(),
            Intent::CursorRight => self.input.right(),
            Intent::CursorHome => self.input.home(),
            Intent::CursorEnd => self.input.end(),
            Intent::HistoryPrev => self.input.recall_prev(),
            Intent::HistoryNext => self.input.recall_next(),
            Intent::ClearInput => self.input.clear(),
            Intent::ScrollUp => {
                let total = self.session.transcript().len();
                self.view.scroll_up(SCROLL_STEP, total);
            }
            Intent::ScrollDown => self.view.scroll_down(SCROLL_STEP),
            Intent::ScrollToBottom => self.view.scroll_to_bottom(),
        }
        self.refresh_state();
    }

    /// Shut the session down without running the loop.
    pub async fn shutdown(&mut self) {
        self.session.shutdown().await;
        self.refresh_state();
    }
}
