use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::quiz::session::{OptionMark, Phase, SessionState};
use crate::ui::theme::Theme;

/// Current question with its options and, once answered, the explanation.
pub struct QuestionCard<'a> {
    pub state: &'a SessionState,
    pub theme: &'a Theme,
}

impl<'a> QuestionCard<'a> {
    pub fn new(state: &'a SessionState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    fn mark_style(&self, mark: OptionMark) -> Style {
        let colors = &self.theme.colors;
        match mark {
            OptionMark::Selectable => Style::default().fg(colors.fg()),
            OptionMark::Disabled => Style::default().fg(colors.dim()),
            OptionMark::Correct => Style::default()
                .fg(colors.correct())
                .add_modifier(Modifier::BOLD),
            OptionMark::Wrong => Style::default()
                .fg(colors.wrong())
                .add_modifier(Modifier::CROSSED_OUT),
            OptionMark::Revealed => Style::default()
                .fg(colors.revealed())
                .add_modifier(Modifier::BOLD),
        }
    }
}

fn mark_suffix(mark: OptionMark) -> &'static str {
    match mark {
        OptionMark::Correct | OptionMark::Revealed => "  \u{2713}",
        OptionMark::Wrong => "  \u{2717}",
        OptionMark::Selectable | OptionMark::Disabled => "",
    }
}

impl Widget for QuestionCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let Some(question) = self.state.current() else {
            let block = Block::bordered()
                .border_style(Style::default().fg(colors.border()))
                .style(Style::default().bg(colors.bg()));
            let inner = block.inner(area);
            block.render(area, buf);
            Paragraph::new(Line::from(Span::styled(
                "Nothing to practice.",
                Style::default().fg(colors.dim()),
            )))
            .alignment(Alignment::Center)
            .render(inner, buf);
            return;
        };

        let border = if matches!(self.state.phase, Phase::Unanswered(_)) {
            colors.border_focused()
        } else {
            colors.border()
        };
        let block = Block::bordered()
            .title(format!(" {} ", question.id))
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = Vec::new();
        if !question.tags.is_empty() {
            let tags: Vec<Span> = question
                .tags
                .iter()
                .map(|t| Span::styled(format!("#{t} "), Style::default().fg(colors.tag())))
                .collect();
            lines.push(Line::from(tags));
            lines.push(Line::default());
        }

        lines.push(Line::from(Span::styled(
            question.stem.as_str(),
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::default());

        for (idx, opt) in question.options.iter().enumerate() {
            let mark = self.state.option_mark(&opt.key);
            let style = self.mark_style(mark);
            lines.push(Line::from(vec![
                Span::styled(format!("  {}. ", idx + 1), Style::default().fg(colors.dim())),
                Span::styled(format!("{}) {}", opt.key, opt.text), style),
                Span::styled(mark_suffix(mark), style),
            ]));
        }

        if let Some(explanation) = self.state.explanation() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "Explanation",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                explanation,
                Style::default().fg(colors.fg()),
            )));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
