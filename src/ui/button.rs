use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use serde::{Deserialize, Serialize};
use throbber_widgets_tui::WhichUse::Spin;
use throbber_widgets_tui::{BRAILLE_SIX, Throbber, ThrobberState};

use crate::Theme;
use crate::ui::{Component, Handled, Result};

/// Visual weight of a button.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    #[default]
    Default,
    /// Accent-colored label without a filled background.
    PrimaryTransparent,
}

/// Horizontal padding preset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ButtonSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl ButtonSize {
    const fn padding(self) -> u16 {
        match self {
            Self::Small => 1,
            Self::Medium => 2,
            Self::Large => 3,
        }
    }
}

/// A single-row, clickable control.
pub struct Button {
    label: String,
    kind: ButtonKind,
    size: ButtonSize,
    disabled: bool,
    loading: bool,
    focused: bool,
    throbber_state: ThrobberState,
    /// Where the button was last drawn, for mouse hit testing.
    area: Option<Rect>,
}

impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: ButtonKind::Default,
            size: ButtonSize::Medium,
            disabled: false,
            loading: false,
            focused: false,
            throbber_state: ThrobberState::default(),
            area: None,
        }
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: ButtonKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub const fn with_size(mut self, size: ButtonSize) -> Self {
        self.size = size;
        self
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub const fn set_size(&mut self, size: ButtonSize) {
        self.size = size;
    }

    pub const fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub const fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub const fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub const fn size(&self) -> ButtonSize {
        self.size
    }

    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    /// Columns needed to draw the button.
    pub fn width(&self) -> u16 {
        let label = u16::try_from(Line::from(self.label.as_str()).width()).unwrap_or(u16::MAX);
        // Spinner glyph plus a separating space
        let spinner = if self.loading { 2 } else { 0 };
        label
            .saturating_add(spinner)
            .saturating_add(self.size.padding() * 2)
    }

    /// Whether the given cell lies on the last rendered button.
    pub fn contains(&self, column: u16, row: u16) -> bool {
        self.area
            .is_some_and(|area| area.contains(Position::new(column, row)))
    }

    fn style(&self, theme: &Theme) -> Style {
        let style = if self.disabled {
            Style::default().fg(theme.overlay0())
        } else {
            match self.kind {
                ButtonKind::Default => Style::default().fg(theme.text()).bg(theme.surface0()),
                ButtonKind::PrimaryTransparent => Style::default()
                    .fg(theme.primary())
                    .add_modifier(Modifier::BOLD),
            }
        };

        if self.focused {
            style.add_modifier(Modifier::REVERSED)
        } else {
            style
        }
    }
}

impl Component for Button {
    type Output = ();

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<Handled<Self::Output>> {
        if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left))
            || !self.contains(mouse.column, mouse.row)
        {
            return Ok(Handled::Ignored);
        }
        // Disabled buttons swallow the click without firing
        if self.disabled {
            return Ok(Handled::Consumed);
        }
        Ok(().into())
    }

    fn on_tick(&mut self) {
        if self.loading {
            self.throbber_state.calc_next();
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let area = Rect {
            width: self.width().min(area.width),
            height: area.height.min(1),
            ..area
        };
        self.area = Some(area);

        let style = self.style(theme);
        let pad = " ".repeat(usize::from(self.size.padding()));

        let mut spans = vec![Span::raw(pad.clone())];
        if self.loading {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::raw(self.label.clone()));
        spans.push(Span::raw(pad));

        frame.render_widget(Paragraph::new(Line::from(spans)).style(style), area);

        if self.loading {
            let slot = Rect {
                x: area.x.saturating_add(self.size.padding()),
                width: 1,
                ..area
            }
            .intersection(area);

            let throbber = Throbber::default()
                .throbber_set(BRAILLE_SIX)
                .use_type(Spin)
                .throbber_style(style);
            frame.render_stateful_widget(throbber, slot, &mut self.throbber_state);
        }
    }
}
