use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::Theme;
use crate::cli::DialogOptions;
use crate::config::{GlobalAction, KeyResolver, ModalAction};
use crate::tui::{Event, Rates, Tui};
use crate::ui::{
    ActionSpec, CloseModal, Component, Handled, KeyListeners, Loading, ModalEvent, ModalHandle,
    ModalInside,
};

/// How long the simulated work behind a kept-open dialog takes.
const WORK_DURATION: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Tick,
    Render,
    Resize(u16, u16),
    Quit,
    OpenModal,
    /// Close the open dialog, if any.
    CloseModal,
    /// The dialog's submit callback fired.
    Submitted,
    WorkFinished,
}

/// Demo host: a plain screen that owns at most one dialog.
pub struct App {
    resolver: Arc<KeyResolver>,
    theme: Theme,
    options: DialogOptions,
    modal: Option<ModalInside>,
    closer: Rc<dyn CloseModal>,
    listeners: KeyListeners,
    submissions: u32,
    cancellations: u32,
    should_quit: bool,
    command_tx: UnboundedSender<Command>,
    command_rx: UnboundedReceiver<Command>,
}

impl App {
    pub fn new(resolver: Arc<KeyResolver>, theme: Theme, options: DialogOptions) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        Self {
            resolver,
            theme,
            options,
            modal: None,
            closer: Rc::new(ModalHandle::new(command_tx.clone())),
            listeners: KeyListeners::new(),
            submissions: 0,
            cancellations: 0,
            should_quit: false,
            command_tx,
            command_rx,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(Rates::per_second(8.0, 30.0))?;
        tui.enter()?;

        // Start with the dialog already open
        self.command_tx.send(Command::OpenModal)?;

        loop {
            self.handle_events(&mut tui).await?;
            self.handle_commands(&mut tui)?;
            if self.should_quit {
                break;
            }
        }

        self.close_modal();
        tui.exit()?;
        Ok(())
    }

    async fn handle_events(&mut self, tui: &mut Tui) -> Result<()> {
        let Some(event) = tui.next_event().await else {
            self.should_quit = true;
            return Ok(());
        };

        match event {
            Event::Init => {}
            Event::Quit => self.command_tx.send(Command::Quit)?,
            Event::Error(message) => error!("Terminal event error: {message}"),
            Event::Tick => self.command_tx.send(Command::Tick)?,
            Event::Render => self.command_tx.send(Command::Render)?,
            Event::Resize(width, height) => {
                self.command_tx.send(Command::Resize(width, height))?;
            }
            Event::Key(key) => self.handle_key(key)?,
            Event::Mouse(mouse) => {
                if let Some(modal) = self.modal.as_mut()
                    && let Handled::Event(event) = modal.handle_mouse(mouse)?
                {
                    self.record(event);
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Document-level listeners see every key, whatever has focus
        self.listeners.dispatch(&key);

        let Some(modal) = self.modal.as_mut() else {
            if self.resolver.matches_global(&key, GlobalAction::Quit) {
                self.command_tx.send(Command::Quit)?;
            } else if self.resolver.matches_global(&key, GlobalAction::Open) {
                self.command_tx.send(Command::OpenModal)?;
            }
            return Ok(());
        };

        if let Handled::Event(event) = modal.handle_key(key)? {
            self.record(event);
        } else if self.resolver.matches_modal(&key, ModalAction::Dismiss) {
            self.closer.close();
        }
        Ok(())
    }

    fn record(&mut self, event: ModalEvent) {
        debug!(?event, "Dialog event");
        if event == ModalEvent::Cancelled {
            self.cancellations += 1;
        }
    }

    fn handle_commands(&mut self, tui: &mut Tui) -> Result<()> {
        while let Ok(command) = self.command_rx.try_recv() {
            if command != Command::Tick && command != Command::Render {
                debug!("Handling command: {:?}", command);
            }

            match command {
                Command::Render => self.render(tui)?,
                Command::Resize(width, height) => {
                    tui.resize(Rect::new(0, 0, width, height))?;
                    self.render(tui)?;
                }
                command => self.update(command),
            }
        }
        Ok(())
    }

    /// Apply a command that does not touch the terminal.
    fn update(&mut self, command: Command) {
        match command {
            Command::Tick => {
                if let Some(modal) = self.modal.as_mut() {
                    modal.on_tick();
                }
            }
            Command::Quit => self.should_quit = true,
            Command::OpenModal => self.open_modal(),
            Command::CloseModal => self.close_modal(),
            Command::Submitted => self.on_submitted(),
            Command::WorkFinished => {
                if let Some(modal) = self.modal.as_mut() {
                    modal.set_loading(Loading::Idle);
                }
            }
            Command::Render | Command::Resize(..) => {}
        }
    }

    fn build_modal(&self) -> ModalInside {
        let options = &self.options;
        let mut modal = ModalInside::new(Rc::clone(&self.closer), Arc::clone(&self.resolver))
            .with_body(options.body.clone())
            .close_on_submit(options.close_on_submit);
        modal.set_title(options.title.clone());

        if let Some(name) = &options.action {
            let command_tx = self.command_tx.clone();
            let action = ActionSpec::new(name.clone(), move || {
                if command_tx.send(Command::Submitted).is_err() {
                    error!("Command channel closed, dropping submission");
                }
            })
            .disabled(options.disabled)
            .with_size(options.size);
            modal = modal.with_action(action);
        }
        modal
    }

    fn open_modal(&mut self) {
        if self.modal.is_some() {
            return;
        }
        let mut modal = self.build_modal();
        modal.mount(&self.listeners);
        self.modal = Some(modal);
        info!("Opened dialog");
    }

    fn close_modal(&mut self) {
        if let Some(mut modal) = self.modal.take() {
            modal.unmount();
            info!("Closed dialog");
        }
        if !self.listeners.is_empty() {
            warn!(count = self.listeners.len(), "Key listeners outlived the dialog");
        }
    }

    /// Count the submission; a dialog that stays open shows progress while
    /// simulated work runs.
    fn on_submitted(&mut self) {
        self.submissions += 1;

        let Some(modal) = self.modal.as_mut() else {
            return;
        };
        if self.options.close_on_submit {
            return;
        }

        let loading = self
            .options
            .loading_text
            .clone()
            .map_or_else(Loading::in_progress, Loading::in_progress_with);
        modal.set_loading(loading);

        let command_tx = self.command_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(WORK_DURATION).await;
            let _ = command_tx.send(Command::WorkFinished);
        });
    }

    fn render(&mut self, tui: &mut Tui) -> Result<()> {
        tui.draw(|frame| self.draw(frame))?;
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let theme = self.theme;

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!(
                    "Submitted {} time(s), cancelled {} time(s)",
                    self.submissions, self.cancellations
                ),
                Style::default().fg(theme.success()),
            )),
            Line::from(""),
            hint_line(
                &[
                    (self.resolver.display_global(GlobalAction::Open), "open dialog"),
                    (self.resolver.display_global(GlobalAction::Quit), "quit"),
                ],
                &theme,
            ),
            hint_line(
                &[
                    (self.resolver.display_modal(ModalAction::Submit), "submit"),
                    (self.resolver.display_modal(ModalAction::Dismiss), "dismiss"),
                    (self.resolver.display_modal(ModalAction::Next), "focus"),
                    (self.resolver.display_modal(ModalAction::Activate), "press"),
                ],
                &theme,
            ),
        ];

        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .style(Style::default().bg(theme.base()).fg(theme.text())),
            area,
        );

        if let Some(modal) = self.modal.as_mut() {
            modal.render(frame, area, &theme);
        }
    }
}

/// One row of `[key] label` hints.
fn hint_line(hints: &[(String, &str)], theme: &Theme) -> Line<'static> {
    let key_style = Style::default()
        .fg(theme.peach())
        .add_modifier(Modifier::BOLD);
    let label_style = Style::default().fg(theme.subtext0());

    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (key, label) in hints {
        spans.push(Span::styled(format!("[{key}]"), key_style));
        spans.push(Span::styled(format!(" {label}   "), label_style));
    }
    Line::from(spans)
}
