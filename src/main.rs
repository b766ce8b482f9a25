use std::fs;
use std::io;
use std::sync::Mutex;

use anyhow::Result;
use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tracing_subscriber::EnvFilter;

use quizdrill::app::{App, LoadStatus};
use quizdrill::config::Config;
use quizdrill::event::{AppEvent, EventHandler};
use quizdrill::quiz::session::Outcome;
use quizdrill::ui::components::question_card::QuestionCard;
use quizdrill::ui::layout::{QuizLayout, pack_hint_lines};

#[derive(Parser)]
#[command(name = "quizdrill", version, about = "Multiple-choice quiz trainer with wrong-answer practice")]
struct Cli {
    #[arg(short, long, help = "Manifest path or URL")]
    manifest: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Start in wrong-only practice mode")]
    wrong_only: bool,
}

const HINTS: &[&str] = &[
    "[a-z/1-9] Answer",
    "[n] Next",
    "[r] Reveal",
    "[w] Wrong only",
    "[x] Reset wrong",
    "[q] Quit",
];

/// Log to a file in the data dir; the terminal belongs to the UI.
fn init_logging(config: &Config) -> Result<()> {
    let dir = config.data_dir();
    fs::create_dir_all(&dir)?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("quizdrill.log"))?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    if let Some(manifest) = cli.manifest {
        config.manifest = manifest;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }

    if let Err(e) = init_logging(&config) {
        eprintln!("quizdrill: logging disabled: {e}");
    }
    tracing::info!(manifest = %config.manifest, "starting");

    let mut app = App::start(&config, cli.wrong_only);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new();
    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }
    if let LoadStatus::Failed(_) = app.status {
        eprintln!("{}", app.status.text());
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => app.handle_key(key),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let hint_lines = pack_hint_lines(HINTS, area.width as usize);
    let layout = QuizLayout::new(area, hint_lines.len() as u16);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " quizdrill ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {}", app.progress_text()),
            Style::default().fg(colors.dim()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout.header);

    frame.render_widget(QuestionCard::new(&app.state, &app.theme), layout.main);

    let status_style = match app.status {
        LoadStatus::Loaded(_) => Style::default().fg(colors.success()),
        LoadStatus::Failed(_) => Style::default().fg(colors.error()),
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(format!(" {}", app.status.text()), status_style))),
        layout.status,
    );

    if let Some(feedback) = app.feedback_text() {
        let feedback_color = match app.state.outcome() {
            _ if app.state.notice.is_some() || app.confirm_reset => colors.warning(),
            Some(Outcome::Correct { .. }) => colors.correct(),
            Some(Outcome::Incorrect { .. }) => colors.wrong(),
            _ => colors.revealed(),
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {feedback}"),
                Style::default().fg(feedback_color),
            ))),
            layout.feedback,
        );
    }

    let footer: Vec<Line> = hint_lines
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.dim()))))
        .collect();
    frame.render_widget(Paragraph::new(footer), layout.footer);
}
