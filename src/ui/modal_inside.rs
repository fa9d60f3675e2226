//! Inner content of a dialog: title, body and a cancel/submit footer.
//!
//! While mounted, the dialog keeps one document-level key listener that
//! submits on the configured submit key (Enter by default), no matter which
//! control has focus.

use std::rc::Rc;
use std::sync::Arc;

use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Text;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};
use tracing::{debug, info};

use crate::config::{KeyResolver, ModalAction};
use crate::ui::{
    Button, ButtonKind, ButtonSize, CloseModal, Component, Handled, KeyListeners, Result,
    Subscription,
};
use crate::{PROJECT_NAME, Theme};

/// Narrowest upper bound on the dialog width, in columns.
const MIN_MAX_WIDTH: u16 = 40;
/// Columns between the cancel and submit buttons.
const BUTTON_GAP: u16 = 2;

/// What to show in the title region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayTitle {
    /// The application's product name.
    ProductName,
    Text(String),
}

impl From<&str> for DisplayTitle {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for DisplayTitle {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Progress of the primary action, driven by the caller.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Loading {
    #[default]
    Idle,
    /// Submission in progress, optionally replacing the button label.
    InProgress { label: Option<String> },
}

impl Loading {
    pub const fn in_progress() -> Self {
        Self::InProgress { label: None }
    }

    pub fn in_progress_with(label: impl Into<String>) -> Self {
        Self::InProgress {
            label: Some(label.into()),
        }
    }

    pub const fn is_in_progress(&self) -> bool {
        matches!(self, Self::InProgress { .. })
    }
}

/// The dialog's primary action.
#[derive(Clone)]
pub struct ActionSpec {
    name: String,
    on_submit: Rc<dyn Fn()>,
    disabled: bool,
    loading: Loading,
    size: ButtonSize,
}

impl ActionSpec {
    pub fn new(name: impl Into<String>, on_submit: impl Fn() + 'static) -> Self {
        Self {
            name: name.into(),
            on_submit: Rc::new(on_submit),
            disabled: false,
            loading: Loading::Idle,
            size: ButtonSize::Medium,
        }
    }

    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    #[must_use]
    pub fn with_loading(mut self, loading: Loading) -> Self {
        self.loading = loading;
        self
    }

    #[must_use]
    pub const fn with_size(mut self, size: ButtonSize) -> Self {
        self.size = size;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn loading(&self) -> &Loading {
        &self.loading
    }

    pub const fn size(&self) -> ButtonSize {
        self.size
    }

    /// Label shown on the primary button.
    ///
    /// An empty override label counts as no override.
    pub fn label(&self) -> &str {
        match &self.loading {
            Loading::InProgress { label: Some(label) } if !label.is_empty() => label,
            _ => &self.name,
        }
    }

    /// Loading always disables the button, whatever the explicit flag says.
    pub const fn is_disabled(&self) -> bool {
        self.disabled || self.loading.is_in_progress()
    }
}

/// A visible footer control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Cancel,
    Submit,
}

/// Where keyboard focus sits inside the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Invisible control that takes focus on mount.
    Sentinel,
    Control(Control),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalEvent {
    Cancelled,
    Submitted,
}

/// Invoke the submit callback, then close if asked to.
fn submit(action: Option<&ActionSpec>, close_on_submit: bool, closer: &dyn CloseModal) -> bool {
    let Some(action) = action else {
        return false;
    };

    info!(action = %action.name, close_on_submit, "Submitting dialog");
    (action.on_submit)();
    if close_on_submit {
        closer.close();
    }
    true
}

pub struct ModalInside {
    title: Option<DisplayTitle>,
    action: Option<ActionSpec>,
    close_on_submit: bool,
    body: Text<'static>,
    closer: Rc<dyn CloseModal>,
    resolver: Arc<KeyResolver>,
    focus: Option<Focus>,
    cancel_button: Button,
    submit_button: Button,
    listeners: Option<KeyListeners>,
    subscription: Option<Subscription>,
    popup: Option<Rect>,
}

impl ModalInside {
    pub fn new(closer: Rc<dyn CloseModal>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            title: None,
            action: None,
            close_on_submit: true,
            body: Text::default(),
            closer,
            resolver,
            focus: None,
            cancel_button: Button::new("Cancel"),
            submit_button: Button::new("").with_kind(ButtonKind::PrimaryTransparent),
            listeners: None,
            subscription: None,
            popup: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<DisplayTitle>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: ActionSpec) -> Self {
        self.set_action(Some(action));
        self
    }

    #[must_use]
    pub fn close_on_submit(mut self, close_on_submit: bool) -> Self {
        self.set_close_on_submit(close_on_submit);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Text<'static>>) -> Self {
        self.body = body.into();
        self
    }

    /// Attach to the document: register the submit listener and focus the
    /// sentinel. Mounting twice is a no-op.
    pub fn mount(&mut self, listeners: &KeyListeners) {
        if self.listeners.is_some() {
            debug!("Dialog already mounted");
            return;
        }

        self.subscription = Some(self.subscribe(listeners));
        self.listeners = Some(listeners.clone());
        self.set_focus(Focus::Sentinel);
        debug!(title = ?self.title_text(), "Mounted dialog");
    }

    /// Detach from the document, releasing the submit listener.
    pub fn unmount(&mut self) {
        if self.listeners.take().is_some() {
            self.subscription = None;
            self.popup = None;
            debug!(title = ?self.title_text(), "Unmounted dialog");
        }
    }

    pub const fn is_mounted(&self) -> bool {
        self.listeners.is_some()
    }

    pub fn set_title(&mut self, title: Option<DisplayTitle>) {
        self.title = title;
    }

    pub fn set_body(&mut self, body: impl Into<Text<'static>>) {
        self.body = body.into();
    }

    pub fn set_action(&mut self, action: Option<ActionSpec>) {
        self.action = action;
        self.sync_buttons();
        self.resubscribe();
    }

    pub fn set_close_on_submit(&mut self, close_on_submit: bool) {
        if self.close_on_submit == close_on_submit {
            return;
        }
        self.close_on_submit = close_on_submit;
        self.resubscribe();
    }

    /// Swap the close capability. Re-registers only when the identity changes.
    pub fn set_closer(&mut self, closer: Rc<dyn CloseModal>) {
        if Rc::ptr_eq(&self.closer, &closer) {
            return;
        }
        self.closer = closer;
        self.resubscribe();
    }

    /// Reflect the caller's idle/submitting state.
    pub fn set_loading(&mut self, loading: Loading) {
        if self.action.as_ref().is_none_or(|action| action.loading == loading) {
            return;
        }
        if let Some(action) = self.action.take() {
            self.set_action(Some(action.with_loading(loading)));
        }
    }

    pub const fn action(&self) -> Option<&ActionSpec> {
        self.action.as_ref()
    }

    pub const fn focus(&self) -> Option<Focus> {
        self.focus
    }

    /// Title text after applying the product-name default.
    pub fn title_text(&self) -> Option<&str> {
        match &self.title {
            Some(DisplayTitle::ProductName) => Some(PROJECT_NAME),
            Some(DisplayTitle::Text(text)) if !text.is_empty() => Some(text),
            _ => None,
        }
    }

    /// Label of the primary button, or `None` when there is no action.
    pub fn button_label(&self) -> Option<&str> {
        self.action.as_ref().map(ActionSpec::label)
    }

    pub fn primary_disabled(&self) -> Option<bool> {
        self.action.as_ref().map(ActionSpec::is_disabled)
    }

    pub const fn cancel_button(&self) -> Option<&Button> {
        match self.action {
            Some(_) => Some(&self.cancel_button),
            None => None,
        }
    }

    pub const fn submit_button(&self) -> Option<&Button> {
        match self.action {
            Some(_) => Some(&self.submit_button),
            None => None,
        }
    }

    /// Activate a footer control as if it had been clicked.
    pub fn activate(&mut self, control: Control) -> Handled<ModalEvent> {
        let Some(action) = &self.action else {
            return Handled::Ignored;
        };

        match control {
            Control::Cancel => {
                info!(action = %action.name, "Cancelled dialog");
                self.closer.close();
                ModalEvent::Cancelled.into()
            }
            Control::Submit if action.is_disabled() => Handled::Consumed,
            Control::Submit => {
                submit(Some(action), self.close_on_submit, self.closer.as_ref());
                ModalEvent::Submitted.into()
            }
        }
    }

    fn subscribe(&self, listeners: &KeyListeners) -> Subscription {
        let action = self.action.clone();
        let close_on_submit = self.close_on_submit;
        let closer = Rc::clone(&self.closer);
        let resolver = Arc::clone(&self.resolver);

        listeners.subscribe(move |key| {
            if resolver.matches_modal(key, ModalAction::Submit) {
                submit(action.as_ref(), close_on_submit, closer.as_ref());
            }
        })
    }

    fn resubscribe(&mut self) {
        let Some(listeners) = self.listeners.clone() else {
            return;
        };
        // Release before acquiring so only one listener is ever live
        self.subscription = None;
        self.subscription = Some(self.subscribe(&listeners));
        debug!("Re-registered dialog submit listener");
    }

    fn sync_buttons(&mut self) {
        if let Some(action) = &self.action {
            self.submit_button.set_label(action.label());
            self.submit_button.set_disabled(action.is_disabled());
            self.submit_button.set_loading(action.loading.is_in_progress());
            self.submit_button.set_size(action.size);
        }

        // Focus cannot rest on a control that no longer accepts it
        let focus_lost = match self.focus {
            Some(Focus::Control(Control::Submit)) => self.primary_disabled() != Some(false),
            Some(Focus::Control(Control::Cancel)) => self.action.is_none(),
            _ => false,
        };
        if focus_lost {
            self.set_focus(Focus::Sentinel);
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = Some(focus);
        self.cancel_button
            .set_focused(focus == Focus::Control(Control::Cancel));
        self.submit_button
            .set_focused(focus == Focus::Control(Control::Submit));
    }

    /// Tab order: cancel, submit (skipped while disabled), sentinel.
    fn focus_ring(&self) -> Vec<Focus> {
        let mut ring = Vec::with_capacity(3);
        if let Some(action) = &self.action {
            ring.push(Focus::Control(Control::Cancel));
            if !action.is_disabled() {
                ring.push(Focus::Control(Control::Submit));
            }
        }
        ring.push(Focus::Sentinel);
        ring
    }

    fn cycle_focus(&mut self, forward: bool) {
        let ring = self.focus_ring();
        let current = self
            .focus
            .and_then(|focus| ring.iter().position(|f| *f == focus));
        let next = match (current, forward) {
            (Some(i), true) => (i + 1) % ring.len(),
            (Some(i), false) => (i + ring.len() - 1) % ring.len(),
            (None, true) => 0,
            (None, false) => ring.len() - 1,
        };
        self.set_focus(ring[next]);
    }

    fn body_height(&self, width: u16) -> u16 {
        let width = usize::from(width.max(1));
        let rows: usize = self
            .body
            .lines
            .iter()
            .map(|line| line.width().div_ceil(width).max(1))
            .sum();
        u16::try_from(rows).unwrap_or(u16::MAX)
    }

    fn footer_width(&self) -> u16 {
        if self.action.is_none() {
            return 0;
        }
        self.cancel_button
            .width()
            .saturating_add(BUTTON_GAP)
            .saturating_add(self.submit_button.width())
    }

    fn popup_area(&self, area: Rect) -> Rect {
        // Borders plus one column of padding on each side
        let chrome = 4;

        let title_width = self
            .title_text()
            .map_or(0, |t| u16::try_from(t.chars().count()).unwrap_or(u16::MAX));
        let body_width = u16::try_from(self.body.width()).unwrap_or(u16::MAX);
        let footer_width = self.footer_width();

        let content = title_width.max(body_width).max(footer_width);
        let max_width = (area.width / 5 * 2).max(MIN_MAX_WIDTH);
        let width = content
            .saturating_add(chrome)
            .min(max_width)
            .max(footer_width.saturating_add(chrome))
            .min(area.width);

        let inner_width = width.saturating_sub(chrome);
        let title_rows = if self.title_text().is_some() { 2 } else { 0 };
        let footer_rows = if self.action.is_some() { 2 } else { 0 };
        let height = self
            .body_height(inner_width)
            .saturating_add(title_rows + footer_rows + 2)
            .min(area.height);

        area.centered(Constraint::Length(width), Constraint::Length(height))
    }
}

impl Component for ModalInside {
    type Output = ModalEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<Handled<Self::Output>> {
        // The submit key belongs to the document listener, not to focus handling
        if self.resolver.matches_modal(&key, ModalAction::Next) {
            self.cycle_focus(true);
            return Ok(Handled::Consumed);
        }
        if self.resolver.matches_modal(&key, ModalAction::Previous) {
            self.cycle_focus(false);
            return Ok(Handled::Consumed);
        }
        if self.resolver.matches_modal(&key, ModalAction::Activate) {
            return Ok(match self.focus {
                Some(Focus::Control(control)) => self.activate(control),
                _ => Handled::Consumed,
            });
        }
        Ok(Handled::Ignored)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<Handled<Self::Output>> {
        if self.action.is_some() {
            if self.cancel_button.handle_mouse(mouse)?.event().is_some() {
                return Ok(self.activate(Control::Cancel));
            }
            match self.submit_button.handle_mouse(mouse)? {
                Handled::Event(()) => return Ok(self.activate(Control::Submit)),
                Handled::Consumed => return Ok(Handled::Consumed),
                Handled::Ignored => {}
            }
        }

        let inside = self.popup.is_some_and(|popup| {
            popup.contains(ratatui::layout::Position::new(mouse.column, mouse.row))
        });
        Ok(if inside {
            Handled::Consumed
        } else {
            Handled::Ignored
        })
    }

    fn on_tick(&mut self) {
        self.submit_button.on_tick();
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup = self.popup_area(area);
        self.popup = Some(popup);

        frame.render_widget(Clear, popup);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border()))
            .padding(Padding::horizontal(1))
            .style(Style::default().bg(theme.mantle()).fg(theme.text()));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let title_rows = if self.title_text().is_some() { 2 } else { 0 };
        let footer_rows = if self.action.is_some() { 2 } else { 0 };
        let [title_area, body_area, footer_area] = Layout::vertical([
            Constraint::Length(title_rows),
            Constraint::Fill(1),
            Constraint::Length(footer_rows),
        ])
        .areas(inner);

        if let Some(title) = self.title_text() {
            let title = Paragraph::new(title.to_string())
                .centered()
                .style(Style::default().add_modifier(Modifier::BOLD))
                .block(
                    Block::default()
                        .borders(Borders::BOTTOM)
                        .border_style(Style::default().fg(theme.border())),
                );
            frame.render_widget(title, title_area);
        }

        frame.render_widget(
            Paragraph::new(self.body.clone()).wrap(Wrap { trim: false }),
            body_area,
        );

        if self.action.is_some() {
            let row = Rect {
                y: footer_area.bottom().saturating_sub(1),
                height: footer_area.height.min(1),
                ..footer_area
            };
            let [_, cancel_area, _, submit_area] = Layout::horizontal([
                Constraint::Fill(1),
                Constraint::Length(self.cancel_button.width()),
                Constraint::Length(BUTTON_GAP),
                Constraint::Length(self.submit_button.width()),
            ])
            .areas(row);

            self.cancel_button.render(frame, cancel_area, theme);
            self.submit_button.render(frame, submit_area, theme);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEventKind};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::config::keybindings::KeybindingsConfig;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    struct RecordingCloser {
        log: Log,
    }

    impl CloseModal for RecordingCloser {
        fn close(&self) {
            self.log.borrow_mut().push("close");
        }
    }

    fn resolver() -> Arc<KeyResolver> {
        Arc::new(KeyResolver::new(Arc::new(KeybindingsConfig::default())))
    }

    fn closer(log: &Log) -> Rc<dyn CloseModal> {
        Rc::new(RecordingCloser {
            log: Rc::clone(log),
        })
    }

    fn action(log: &Log, name: &str) -> ActionSpec {
        let log = Rc::clone(log);
        ActionSpec::new(name, move || log.borrow_mut().push("submit"))
    }

    fn modal(log: &Log) -> ModalInside {
        ModalInside::new(closer(log), resolver())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn enter() -> KeyEvent {
        key(KeyCode::Enter)
    }

    fn render(modal: &mut ModalInside) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal
            .draw(|frame| modal.render(frame, frame.area(), &Theme::default()))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        (0..buffer.area.height)
            .map(|y| (0..buffer.area.width).map(|x| buffer[(x, y)].symbol()).collect())
            .collect()
    }

    fn row_of(rows: &[String], needle: &str) -> Option<usize> {
        rows.iter().position(|row| row.contains(needle))
    }

    fn column_of(row: &str, needle: &str) -> u16 {
        let byte = row.find(needle).unwrap();
        u16::try_from(row[..byte].chars().count()).unwrap()
    }

    // === Render rules ===

    #[test]
    fn test_enabled_when_idle_and_not_disabled() {
        let log = Log::default();
        let modal = modal(&log).with_action(action(&log, "Save").disabled(false));

        assert_eq!(modal.primary_disabled(), Some(false));
        assert!(!modal.submit_button().unwrap().is_loading());
    }

    #[test]
    fn test_loading_forces_disabled() {
        let log = Log::default();
        for disabled in [false, true] {
            let modal = modal(&log).with_action(
                action(&log, "Save")
                    .disabled(disabled)
                    .with_loading(Loading::in_progress()),
            );

            let button = modal.submit_button().unwrap();
            assert!(button.is_disabled());
            assert!(button.is_loading());
        }
    }

    #[test]
    fn test_explicit_disabled() {
        let log = Log::default();
        let modal = modal(&log).with_action(action(&log, "Save").disabled(true));
        assert_eq!(modal.primary_disabled(), Some(true));
        assert!(!modal.submit_button().unwrap().is_loading());
    }

    #[test]
    fn test_label_rule() {
        let log = Log::default();
        let with_text = action(&log, "Save").with_loading(Loading::in_progress_with("Saving..."));
        let without_text = action(&log, "Save").with_loading(Loading::in_progress());
        let idle = action(&log, "Save");
        let idle_with_stale_text = action(&log, "Save").with_loading(Loading::Idle);

        assert_eq!(with_text.label(), "Saving...");
        assert_eq!(without_text.label(), "Save");
        assert_eq!(idle.label(), "Save");
        assert_eq!(idle_with_stale_text.label(), "Save");
    }

    #[test]
    fn test_empty_loading_label_falls_back_to_name() {
        let log = Log::default();
        let spec = action(&log, "Save").with_loading(Loading::in_progress_with(""));
        assert_eq!(spec.label(), "Save");
    }

    #[test]
    fn test_size_defaults_to_medium() {
        let log = Log::default();
        let medium = modal(&log).with_action(action(&log, "Save"));
        assert_eq!(medium.submit_button().unwrap().size(), ButtonSize::Medium);

        let small = modal(&log).with_action(action(&log, "Save").with_size(ButtonSize::Small));
        assert_eq!(small.submit_button().unwrap().size(), ButtonSize::Small);
    }

    #[test]
    fn test_title_rule() {
        let log = Log::default();

        let product = modal(&log).with_title(DisplayTitle::ProductName);
        assert_eq!(product.title_text(), Some(PROJECT_NAME));

        let literal = modal(&log).with_title("Confirm");
        assert_eq!(literal.title_text(), Some("Confirm"));

        let empty = modal(&log).with_title("");
        assert_eq!(empty.title_text(), None);

        assert_eq!(modal(&log).title_text(), None);
    }

    #[test]
    fn test_renders_title_body_and_footer() {
        let log = Log::default();
        let mut modal = modal(&log)
            .with_title("Confirm")
            .with_body("Delete the file?")
            .with_action(action(&log, "Delete"));

        let rows = render(&mut modal);

        let title = row_of(&rows, "Confirm").unwrap();
        let body = row_of(&rows, "Delete the file?").unwrap();
        let footer = row_of(&rows, "Cancel").unwrap();
        assert!(title < body && body < footer);
        assert!(rows[footer].contains("Delete"));
        assert!(rows[footer].find("Cancel") < rows[footer].rfind("Delete"));
    }

    #[test]
    fn test_renders_product_name_title() {
        let log = Log::default();
        let mut modal = modal(&log)
            .with_title(DisplayTitle::ProductName)
            .with_body("Hello");

        let rows = render(&mut modal);
        assert!(row_of(&rows, PROJECT_NAME).is_some());
    }

    #[test]
    fn test_no_title_leaves_no_region() {
        let log = Log::default();
        let mut modal = modal(&log).with_body("Hello");

        let rows = render(&mut modal);
        let body = row_of(&rows, "Hello").unwrap();
        // The body sits directly below the top border
        assert!(rows[body - 1].contains('╭'));
    }

    #[test]
    fn test_no_action_renders_no_footer() {
        let log = Log::default();
        let mut modal = modal(&log).with_body("Hello");

        let rows = render(&mut modal);
        assert!(row_of(&rows, "Cancel").is_none());
        assert!(modal.submit_button().is_none());
    }

    #[test]
    fn test_set_body_replaces_content() {
        let log = Log::default();
        let mut modal = modal(&log)
            .with_body("First")
            .with_action(action(&log, "Save"));

        modal.set_body("Second");
        let rows = render(&mut modal);

        assert!(row_of(&rows, "First").is_none());
        assert!(row_of(&rows, "Second").is_some());
        assert_eq!(modal.action().map(ActionSpec::name), Some("Save"));
    }

    #[test]
    fn test_loading_label_rendered() {
        let log = Log::default();
        let mut modal = modal(&log)
            .with_body("Hello")
            .with_action(action(&log, "Save").with_loading(Loading::in_progress_with("Saving...")));

        let rows = render(&mut modal);
        assert!(row_of(&rows, "Saving...").is_some());
        assert!(row_of(&rows, "Save ").is_none());
    }

    // === Activation ===

    #[test]
    fn test_cancel_closes_without_submit() {
        let log = Log::default();
        let mut modal = modal(&log).with_action(action(&log, "Save"));

        let result = modal.activate(Control::Cancel);

        assert_eq!(result, Handled::Event(ModalEvent::Cancelled));
        assert_eq!(*log.borrow(), vec!["close"]);
    }

    #[test]
    fn test_submit_then_close() {
        let log = Log::default();
        let mut modal = modal(&log).with_action(action(&log, "Save"));

        let result = modal.activate(Control::Submit);

        assert_eq!(result, Handled::Event(ModalEvent::Submitted));
        assert_eq!(*log.borrow(), vec!["submit", "close"]);
    }

    #[test]
    fn test_submit_without_close() {
        let log = Log::default();
        let mut modal = modal(&log)
            .with_action(action(&log, "Save"))
            .close_on_submit(false);

        modal.activate(Control::Submit);

        assert_eq!(*log.borrow(), vec!["submit"]);
    }

    #[test]
    fn test_disabled_submit_does_nothing() {
        let log = Log::default();
        let mut modal = modal(&log).with_action(action(&log, "Save").disabled(true));

        assert_eq!(modal.activate(Control::Submit), Handled::Consumed);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_activate_without_action_ignored() {
        let log = Log::default();
        let mut modal = modal(&log);

        assert_eq!(modal.activate(Control::Submit), Handled::Ignored);
        assert_eq!(modal.activate(Control::Cancel), Handled::Ignored);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_mouse_click_on_buttons() {
        let log = Log::default();
        let mut modal = modal(&log)
            .with_body("Hello")
            .with_action(action(&log, "Save"))
            .close_on_submit(false);
        let rows = render(&mut modal);

        let row = row_of(&rows, "Cancel").unwrap();
        let click = |column: u16| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row: u16::try_from(row).unwrap(),
            modifiers: KeyModifiers::NONE,
        };

        let submit_column = column_of(&rows[row], "Save");
        let result = modal.handle_mouse(click(submit_column)).unwrap();
        assert_eq!(result, Handled::Event(ModalEvent::Submitted));

        let cancel_column = column_of(&rows[row], "Cancel");
        let result = modal.handle_mouse(click(cancel_column)).unwrap();
        assert_eq!(result, Handled::Event(ModalEvent::Cancelled));

        assert_eq!(*log.borrow(), vec!["submit", "close"]);
    }

    #[test]
    fn test_mouse_click_outside_ignored() {
        let log = Log::default();
        let mut modal = modal(&log).with_body("Hello");
        render(&mut modal);

        let result = modal
            .handle_mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column: 0,
                row: 0,
                modifiers: KeyModifiers::NONE,
            })
            .unwrap();
        assert_eq!(result, Handled::Ignored);
    }

    // === Keyboard shortcut ===

    #[test]
    fn test_enter_submits_and_closes() {
        let log = Log::default();
        let listeners = KeyListeners::new();
        let mut modal = modal(&log).with_action(action(&log, "Save"));
        modal.mount(&listeners);

        listeners.dispatch(&enter());

        assert_eq!(*log.borrow(), vec!["submit", "close"]);
    }

    #[test]
    fn test_enter_respects_close_on_submit() {
        let log = Log::default();
        let listeners = KeyListeners::new();
        let mut modal = modal(&log)
            .with_action(action(&log, "Save"))
            .close_on_submit(false);
        modal.mount(&listeners);

        listeners.dispatch(&enter());

        assert_eq!(*log.borrow(), vec!["submit"]);
    }

    #[test]
    fn test_enter_without_action_has_no_effect() {
        let log = Log::default();
        let listeners = KeyListeners::new();
        let mut modal = modal(&log);
        modal.mount(&listeners);

        listeners.dispatch(&enter());

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_other_keys_do_not_submit() {
        let log = Log::default();
        let listeners = KeyListeners::new();
        let mut modal = modal(&log).with_action(action(&log, "Save"));
        modal.mount(&listeners);

        listeners.dispatch(&key(KeyCode::Char('x')));

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_enter_not_handled_by_focus() {
        let log = Log::default();
        let mut modal = modal(&log).with_action(action(&log, "Save"));

        let result = modal.handle_key(enter()).unwrap();

        assert_eq!(result, Handled::Ignored);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_listener_tracks_action_changes() {
        let log = Log::default();
        let listeners = KeyListeners::new();
        let mut modal = modal(&log);
        modal.mount(&listeners);

        listeners.dispatch(&enter());
        assert!(log.borrow().is_empty());

        modal.set_action(Some(action(&log, "Save")));
        assert_eq!(listeners.len(), 1);

        listeners.dispatch(&enter());
        assert_eq!(*log.borrow(), vec!["submit", "close"]);
    }

    #[test]
    fn test_listener_tracks_close_on_submit_changes() {
        let log = Log::default();
        let listeners = KeyListeners::new();
        let mut modal = modal(&log).with_action(action(&log, "Save"));
        modal.mount(&listeners);

        modal.set_close_on_submit(false);
        listeners.dispatch(&enter());

        assert_eq!(listeners.len(), 1);
        assert_eq!(*log.borrow(), vec!["submit"]);
    }

    #[test]
    fn test_listener_tracks_closer_changes() {
        let log = Log::default();
        let other = Log::default();
        let listeners = KeyListeners::new();
        let mut modal = modal(&log).with_action(action(&log, "Save"));
        modal.mount(&listeners);

        modal.set_closer(closer(&other));
        listeners.dispatch(&enter());

        assert_eq!(*log.borrow(), vec!["submit"]);
        assert_eq!(*other.borrow(), vec!["close"]);
    }

    fn subscription_id(modal: &ModalInside) -> Option<u64> {
        modal.subscription.as_ref().map(Subscription::id)
    }

    #[test]
    fn test_unchanged_values_keep_listener() {
        let log = Log::default();
        let listeners = KeyListeners::new();
        let shared = closer(&log);
        let mut modal = ModalInside::new(Rc::clone(&shared), resolver())
            .with_action(action(&log, "Save"));
        modal.mount(&listeners);
        let mounted = subscription_id(&modal);

        modal.set_close_on_submit(true);
        modal.set_loading(Loading::Idle);
        modal.set_closer(shared);

        assert_eq!(subscription_id(&modal), mounted);
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn test_loading_change_reregisters() {
        let log = Log::default();
        let listeners = KeyListeners::new();
        let mut modal = modal(&log).with_action(action(&log, "Save"));
        modal.mount(&listeners);
        let mounted = subscription_id(&modal);

        modal.set_loading(Loading::in_progress_with("Saving..."));
        let loading = subscription_id(&modal);
        assert_ne!(loading, mounted);
        assert_eq!(
            modal.action().map(ActionSpec::loading),
            Some(&Loading::in_progress_with("Saving..."))
        );

        modal.set_loading(Loading::in_progress_with("Saving..."));
        assert_eq!(subscription_id(&modal), loading);
        assert_eq!(listeners.len(), 1);

        // Enter stays live while loading
        listeners.dispatch(&enter());
        assert_eq!(*log.borrow(), vec!["submit", "close"]);
    }

    #[test]
    fn test_unmount_removes_listener() {
        let log = Log::default();
        let listeners = KeyListeners::new();
        let mut modal = modal(&log).with_action(action(&log, "Save"));
        modal.mount(&listeners);
        assert_eq!(listeners.len(), 1);

        modal.unmount();
        listeners.dispatch(&enter());

        assert!(listeners.is_empty());
        assert!(!modal.is_mounted());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_drop_removes_listener() {
        let log = Log::default();
        let listeners = KeyListeners::new();
        let mut modal = modal(&log).with_action(action(&log, "Save"));
        modal.mount(&listeners);

        drop(modal);
        listeners.dispatch(&enter());

        assert!(listeners.is_empty());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_setters_before_mount_do_not_register() {
        let log = Log::default();
        let listeners = KeyListeners::new();
        let mut modal = modal(&log);

        modal.set_action(Some(action(&log, "Save")));
        modal.set_close_on_submit(false);

        assert!(listeners.is_empty());
    }

    // === Focus ===

    #[test]
    fn test_mount_focuses_sentinel() {
        let log = Log::default();
        let listeners = KeyListeners::new();
        let mut modal = modal(&log).with_action(action(&log, "Save"));
        assert_eq!(modal.focus(), None);

        modal.mount(&listeners);

        assert_eq!(modal.focus(), Some(Focus::Sentinel));
        assert!(!modal.cancel_button().unwrap().is_focused());
        assert!(!modal.submit_button().unwrap().is_focused());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_focus_happens_once_per_mount() {
        let log = Log::default();
        let listeners = KeyListeners::new();
        let mut modal = modal(&log).with_action(action(&log, "Save"));
        modal.mount(&listeners);

        modal.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(modal.focus(), Some(Focus::Control(Control::Cancel)));

        // Neither a second mount nor a re-registration steals focus back
        modal.mount(&listeners);
        modal.set_close_on_submit(false);
        assert_eq!(modal.focus(), Some(Focus::Control(Control::Cancel)));
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn test_tab_cycles_focus() {
        let log = Log::default();
        let listeners = KeyListeners::new();
        let mut modal = modal(&log).with_action(action(&log, "Save"));
        modal.mount(&listeners);

        modal.handle_key(key(KeyCode::Tab)).unwrap();
        assert!(modal.cancel_button().unwrap().is_focused());
        modal.handle_key(key(KeyCode::Tab)).unwrap();
        assert!(modal.submit_button().unwrap().is_focused());
        modal.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(modal.focus(), Some(Focus::Sentinel));

        modal
            .handle_key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT))
            .unwrap();
        assert_eq!(modal.focus(), Some(Focus::Control(Control::Submit)));
    }

    #[test]
    fn test_tab_skips_disabled_submit() {
        let log = Log::default();
        let listeners = KeyListeners::new();
        let mut modal = modal(&log).with_action(action(&log, "Save").disabled(true));
        modal.mount(&listeners);

        modal.handle_key(key(KeyCode::Tab)).unwrap();
        modal.handle_key(key(KeyCode::Tab)).unwrap();

        assert_eq!(modal.focus(), Some(Focus::Sentinel));
    }

    #[test]
    fn test_loading_moves_focus_off_submit() {
        let log = Log::default();
        let listeners = KeyListeners::new();
        let mut modal = modal(&log).with_action(action(&log, "Save"));
        modal.mount(&listeners);
        modal.handle_key(key(KeyCode::Tab)).unwrap();
        modal.handle_key(key(KeyCode::Tab)).unwrap();

        modal.set_loading(Loading::in_progress());

        assert_eq!(modal.focus(), Some(Focus::Sentinel));
        assert_eq!(modal.button_label(), Some("Save"));
    }

    #[test]
    fn test_space_activates_focused_control() {
        let log = Log::default();
        let listeners = KeyListeners::new();
        let mut modal = modal(&log).with_action(action(&log, "Save"));
        modal.mount(&listeners);

        // Sentinel has nothing to activate
        let result = modal.handle_key(key(KeyCode::Char(' '))).unwrap();
        assert_eq!(result, Handled::Consumed);
        assert!(log.borrow().is_empty());

        modal.handle_key(key(KeyCode::Tab)).unwrap();
        let result = modal.handle_key(key(KeyCode::Char(' '))).unwrap();
        assert_eq!(result, Handled::Event(ModalEvent::Cancelled));
        assert_eq!(*log.borrow(), vec!["close"]);
    }
}
