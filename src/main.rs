pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use glowline::{
    animator::{Avatar, SignalAnimator},
    cancel::CancellationToken,
    config::{Config, ConfigStore, FileConfigStore},
    cursor::{CursorTracker, PointerPosition},
    geometry::{Point, Rect as PxRect, Viewport},
    pane::{TextPane, ROW_HEIGHT_PX},
    runtime::{AppEvent, Clock, CrosstermEventSource, FixedTicker, MonotonicClock, Runner},
    scroll::ScrollContainer,
    text::{self, TextSource},
    typist::Typist,
};
use directories::ProjectDirs;
use rand::{rngs::StdRng, Rng, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    Terminal,
};
use std::{
    error::Error,
    fs::OpenOptions,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

/// Nominal pixel width of one terminal column
pub const CELL_WIDTH_PX: f64 = 8.0;

/// avatar box size in cells
const AVATAR_COLS: u16 = 9;
const AVATAR_ROWS: u16 = 5;

/// signal lines racing to an avatar, next to a self-typing transmission pane
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// text block to type; repeat for several blocks
    #[clap(short = 'p', long = "prompt")]
    prompts: Vec<String>,

    /// file of text blocks separated by blank lines
    #[clap(short = 't', long)]
    text_file: Option<PathBuf>,

    /// config file (defaults to the platform config directory)
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// seed for reproducible lines and chunking
    #[clap(long)]
    seed: Option<u64>,

    /// disable the signal lines
    #[clap(long)]
    no_lines: bool,

    /// disable the typing pane
    #[clap(long)]
    no_typist: bool,

    /// print the effective configuration as json and exit
    #[clap(long)]
    dump_config: bool,

    /// where to write logs (filtered by RUST_LOG)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }

    /// Explicit prompts first, then the file; the bundled text when neither is given
    fn text_sources(&self) -> Result<Vec<TextSource>, glowline::Error> {
        let mut sources: Vec<TextSource> = self
            .prompts
            .iter()
            .map(|p| TextSource::from_attribute(p.as_str()))
            .collect();

        if let Some(path) = &self.text_file {
            sources.extend(text::load_file(path)?);
        }

        if sources.is_empty() {
            sources = text::builtin();
        }
        Ok(sources)
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Where the canvas and the text pane sit on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenLayout {
    pub canvas: Rect,
    pub pane: Option<Rect>,
}

impl ScreenLayout {
    pub fn new(area: Rect, with_pane: bool) -> Self {
        if !with_pane {
            return Self {
                canvas: area,
                pane: None,
            };
        }

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        Self {
            canvas: chunks[0],
            pane: Some(chunks[1]),
        }
    }

    /// Text area of the pane, inside its border
    pub fn pane_inner(&self) -> Option<Rect> {
        self.pane.map(|p| Rect {
            x: p.x + 1,
            y: p.y + 1,
            width: p.width.saturating_sub(2),
            height: p.height.saturating_sub(2),
        })
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            self.canvas.width as f64 * CELL_WIDTH_PX,
            self.canvas.height as f64 * ROW_HEIGHT_PX,
        )
    }

    /// Avatar box centred in the canvas, in canvas pixels
    pub fn avatar(&self) -> Avatar {
        let cols = AVATAR_COLS.min(self.canvas.width) as f64;
        let rows = AVATAR_ROWS.min(self.canvas.height) as f64;
        let left = ((self.canvas.width as f64 - cols) / 2.0).floor();
        let top = ((self.canvas.height as f64 - rows) / 2.0).floor();

        Avatar::new(
            PxRect::new(
                left * CELL_WIDTH_PX,
                top * ROW_HEIGHT_PX,
                cols * CELL_WIDTH_PX,
                rows * ROW_HEIGHT_PX,
            ),
            Point::default(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub config: Config,
    pub layout: ScreenLayout,
    pub cursor: CursorTracker,
    pub animator: Option<SignalAnimator<StdRng>>,
    pub typist: Option<Typist<StdRng>>,
    pub pane: TextPane,
    pub now: Duration,
    token: CancellationToken,
}

impl App {
    pub fn new(
        cli: &Cli,
        config: Config,
        sources: Vec<TextSource>,
        area: Rect,
        rng: &mut StdRng,
    ) -> Self {
        let token = CancellationToken::new();
        let layout = ScreenLayout::new(area, !cli.no_typist);

        let animator = (!cli.no_lines).then(|| {
            SignalAnimator::new(
                config.lines.clone(),
                layout.viewport(),
                layout.avatar(),
                StdRng::seed_from_u64(rng.gen()),
                token.clone(),
            )
        });

        let typist = (!cli.no_typist).then(|| {
            Typist::new(
                sources,
                config.typist.clone(),
                StdRng::seed_from_u64(rng.gen()),
                token.clone(),
            )
        });

        let pane = layout
            .pane_inner()
            .map(|r| TextPane::new(r.width, r.height))
            .unwrap_or_default();

        Self {
            config,
            layout,
            cursor: CursorTracker::new(),
            animator,
            typist,
            pane,
            now: Duration::ZERO,
            token,
        }
    }

    pub fn start(&mut self, now: Duration) {
        self.now = now;
        if let Some(animator) = self.animator.as_mut() {
            animator.start(now);
        }
        if let Some(typist) = self.typist.as_mut() {
            typist.start(now, &mut self.pane);
        }
    }

    pub fn tick(&mut self, now: Duration) {
        self.now = now;
        if let Some(animator) = self.animator.as_mut() {
            animator.advance(now);
        }
        if let Some(typist) = self.typist.as_mut() {
            typist.advance(now, &mut self.pane);
        }
    }

    pub fn resize(&mut self, area: Rect) {
        self.layout = ScreenLayout::new(area, self.layout.pane.is_some());
        if let Some(animator) = self.animator.as_mut() {
            animator.set_viewport(self.layout.viewport());
        }
        if let Some(inner) = self.layout.pane_inner() {
            self.pane.resize(inner.width, inner.height);
        }
    }

    /// Pane scrolled by the user; the typist sees it as a scroll event
    fn scroll_pane(&mut self, scroll: impl FnOnce(&mut TextPane)) {
        scroll(&mut self.pane);
        if let Some(typist) = self.typist.as_mut() {
            typist.on_scroll(&self.pane.metrics());
        }
    }

    pub fn handle(&mut self, event: AppEvent) -> Control {
        match event {
            AppEvent::Tick | AppEvent::Resize => {}
            AppEvent::PointerMove(column, row) => {
                self.cursor.on_pointer_move(PointerPosition::new(
                    column as f64 * CELL_WIDTH_PX,
                    row as f64 * ROW_HEIGHT_PX,
                ));
            }
            AppEvent::Wheel { column, row, delta } => {
                self.cursor.on_pointer_move(PointerPosition::new(
                    column as f64 * CELL_WIDTH_PX,
                    row as f64 * ROW_HEIGHT_PX,
                ));
                let over_pane = self
                    .layout
                    .pane
                    .is_some_and(|p| p.contains((column, row).into()));
                if over_pane {
                    self.scroll_pane(|pane| pane.scroll_rows(delta * 3));
                }
            }
            AppEvent::Key(key) => return self.on_key(key),
        }
        Control::Continue
    }

    fn on_key(&mut self, key: KeyEvent) -> Control {
        let page = self.layout.pane_inner().map_or(1, |r| r.height.max(1)) as i32;

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Control::Quit
            }
            KeyCode::Up => self.scroll_pane(|pane| pane.scroll_rows(-1)),
            KeyCode::Down => self.scroll_pane(|pane| pane.scroll_rows(1)),
            KeyCode::PageUp => self.scroll_pane(|pane| pane.scroll_rows(-page)),
            KeyCode::PageDown => self.scroll_pane(|pane| pane.scroll_rows(page)),
            KeyCode::Home => self.scroll_pane(|pane| pane.set_scroll_top(0.0)),
            KeyCode::End => self.scroll_pane(|pane| pane.scroll_to_bottom()),
            _ => {}
        }
        Control::Continue
    }

    /// Stop every pending timer
    pub fn teardown(&mut self) {
        self.token.cancel();
        let dropped = self
            .animator
            .as_mut()
            .map_or(0, |animator| animator.teardown());
        if let Some(typist) = self.typist.as_mut() {
            typist.advance(self.now, &mut self.pane);
        }
        log::info!("shutting down, {dropped} lines in flight");
    }
}

/// `$XDG_STATE_HOME/glowline/glowline.log`, or the local data dir where there is no state dir
fn default_log_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "glowline")?;
    let dir = dirs.state_dir().unwrap_or_else(|| dirs.data_local_dir());
    Some(dir.join("glowline.log"))
}

fn init_logging(path: Option<PathBuf>) {
    let Some(path) = path.or_else(default_log_path) else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(_) => return,
    };

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let store = cli.config_store();
    let config = store.load();

    if cli.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging(cli.log_file.clone());
    log::info!(
        "starting: config {}, seed {:?}, lines {}, typist {}",
        store.path().display(),
        cli.seed,
        !cli.no_lines,
        !cli.no_typist
    );

    match store.create_if_missing(&config) {
        Ok(true) => log::info!("wrote default config to {}", store.path().display()),
        Ok(false) => {}
        Err(e) => log::warn!("{}: could not write config ({e})", store.path().display()),
    }

    let sources = cli.text_sources()?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let area = Rect::new(0, 0, size.width, size.height);
    let mut app = App::new(&cli, config, sources, area, &mut cli.rng());
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let clock = MonotonicClock::new();
    let ticker = FixedTicker::new(Duration::from_millis(app.config.tick_rate_ms));
    let runner = Runner::new(CrosstermEventSource::new(), ticker);

    app.start(clock.now());
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        let event = runner.step();

        if let AppEvent::Resize = event {
            let size = terminal.size()?;
            app.resize(Rect::new(0, 0, size.width, size.height));
        }

        if app.handle(event) == Control::Quit {
            app.teardown();
            break;
        }

        app.tick(clock.now());
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use glowline::typist::TypistPhase;

    fn area() -> Rect {
        Rect::new(0, 0, 100, 30)
    }

    fn app_with(args: &[&str]) -> App {
        let cli = Cli::parse_from(args);
        let sources = cli.text_sources().unwrap();
        App::new(
            &cli,
            Config::default(),
            sources,
            area(),
            &mut StdRng::seed_from_u64(1),
        )
    }

    #[test]
    fn test_default_log_path_names_the_app() {
        if let Some(path) = default_log_path() {
            assert!(path.ends_with("glowline/glowline.log"), "{}", path.display());
        }
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["glowline"]);

        assert!(cli.prompts.is_empty());
        assert_eq!(cli.text_file, None);
        assert_eq!(cli.config, None);
        assert_eq!(cli.seed, None);
        assert!(!cli.no_lines);
        assert!(!cli.no_typist);
        assert!(!cli.dump_config);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "glowline",
            "-p",
            "one",
            "--prompt",
            "two",
            "--seed",
            "42",
            "--no-lines",
            "-c",
            "cfg.json",
        ]);
        assert_eq!(cli.prompts, vec!["one", "two"]);
        assert_eq!(cli.seed, Some(42));
        assert!(cli.no_lines);
        assert_eq!(cli.config, Some(PathBuf::from("cfg.json")));
    }

    #[test]
    fn test_prompts_are_attribute_sources() {
        let cli = Cli::parse_from(["glowline", "-p", "typed text"]);
        let sources = cli.text_sources().unwrap();
        assert_eq!(sources, vec![TextSource::from_attribute("typed text")]);
    }

    #[test]
    fn test_builtin_text_when_no_sources() {
        let cli = Cli::parse_from(["glowline"]);
        assert_eq!(cli.text_sources().unwrap(), text::builtin());
    }

    #[test]
    fn test_layout_split() {
        let layout = ScreenLayout::new(area(), true);
        assert_eq!(layout.canvas.width + layout.pane.unwrap().width, 100);
        assert_eq!(layout.pane_inner().unwrap().height, 28);

        let layout = ScreenLayout::new(area(), false);
        assert_eq!(layout.canvas, area());
        assert_eq!(layout.pane_inner(), None);
    }

    #[test]
    fn test_avatar_inside_viewport() {
        let layout = ScreenLayout::new(area(), true);
        let target = layout.avatar().target();
        assert!(layout.viewport().contains(&target));
    }

    #[test]
    fn test_pointer_moves_cursor() {
        let mut app = app_with(&["glowline"]);
        app.handle(AppEvent::PointerMove(10, 2));
        assert_eq!(
            app.cursor.position(),
            Some(PointerPosition::new(80.0, 32.0))
        );
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app_with(&["glowline"]);
        let key = |code, modifiers| AppEvent::Key(KeyEvent::new(code, modifiers));

        assert_eq!(app.handle(key(KeyCode::Down, KeyModifiers::NONE)), Control::Continue);
        assert_eq!(app.handle(key(KeyCode::Esc, KeyModifiers::NONE)), Control::Quit);
        assert_eq!(app.handle(key(KeyCode::Char('q'), KeyModifiers::NONE)), Control::Quit);
        assert_eq!(
            app.handle(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Control::Quit
        );
    }

    #[test]
    fn test_ticks_drive_both_effects() {
        let mut app = app_with(&["glowline", "-p", "hello there"]);
        app.start(Duration::ZERO);

        for t in (0..5_000).step_by(16) {
            app.tick(Duration::from_millis(t));
        }

        assert_eq!(app.pane.blocks()[0], "hello there ");
        assert!(app.typist.as_ref().unwrap().is_finished());
        assert!(app.animator.as_ref().unwrap().lines().count() >= 1);
    }

    #[test]
    fn test_scrolling_up_pauses_auto_scroll() {
        let long = "word ".repeat(400);
        let mut app = app_with(&["glowline", "-p", &long]);
        app.start(Duration::ZERO);
        for t in (0..12_000).step_by(16) {
            app.tick(Duration::from_millis(t));
        }
        assert!(app.typist.as_ref().unwrap().auto_scroll());

        app.handle(AppEvent::Key(KeyEvent::new(KeyCode::Home, KeyModifiers::NONE)));
        assert!(!app.typist.as_ref().unwrap().auto_scroll());

        app.handle(AppEvent::Key(KeyEvent::new(KeyCode::End, KeyModifiers::NONE)));
        assert!(app.typist.as_ref().unwrap().auto_scroll());
    }

    #[test]
    fn test_wheel_outside_pane_does_not_scroll() {
        let long = "word ".repeat(400);
        let mut app = app_with(&["glowline", "-p", &long]);
        app.start(Duration::ZERO);
        for t in (0..12_000).step_by(16) {
            app.tick(Duration::from_millis(t));
        }
        let before = app.pane.metrics().scroll_top;

        app.handle(AppEvent::Wheel {
            column: 1,
            row: 1,
            delta: -1,
        });
        assert_eq!(app.pane.metrics().scroll_top, before);

        let pane = app.layout.pane.unwrap();
        app.handle(AppEvent::Wheel {
            column: pane.x + 2,
            row: pane.y + 2,
            delta: -1,
        });
        assert!(app.pane.metrics().scroll_top < before);
        assert!(!app.typist.as_ref().unwrap().auto_scroll());
    }

    #[test]
    fn test_disabled_effects() {
        let app = app_with(&["glowline", "--no-lines", "--no-typist"]);
        assert!(app.animator.is_none());
        assert!(app.typist.is_none());
        assert_eq!(app.layout.pane, None);
    }

    #[test]
    fn test_teardown_cancels_typist() {
        let mut app = app_with(&["glowline", "-p", "a rather long sentence to type"]);
        app.start(Duration::ZERO);
        app.tick(Duration::from_millis(40));

        app.teardown();
        assert_eq!(
            app.typist.as_ref().unwrap().phase(),
            TypistPhase::Cancelled
        );
        assert_eq!(app.animator.as_ref().unwrap().next_spawn(), None);
    }
}
