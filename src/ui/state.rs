use std::path::PathBuf;
use std::rc::Rc;

use gtk4 as gtk;
use libadwaita as adw;

use memory_puzzle::config::Config;
use memory_puzzle::game::{Difficulty, GameController, SessionSnapshot, ThemeRegistry, Timing};
use memory_puzzle::scores::JsonScoreStore;

use super::timers::GlibScheduler;

/// Startup choices merged from `config.json` and the command line.
#[derive(Clone, Debug)]
pub struct Launch {
    /// `config.json` as read, without command line overrides.
    pub config: Config,
    pub player_name: Option<String>,
    pub theme: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub timing: Timing,
    pub scores_dir: PathBuf,
}

impl Launch {
    /// Theme and difficulty to start with, skipping the menu.
    pub fn autostart(&self) -> Option<(String, Difficulty)> {
        Some((self.theme.clone()?, self.difficulty?))
    }
}

pub struct AppState {
    pub window: Option<adw::ApplicationWindow>,
    pub view_stack: Option<gtk::Stack>,
    pub header: Option<adw::HeaderBar>,
    pub back_button: Option<gtk::Button>,
    pub restart_button: Option<gtk::Button>,
    pub title_menu: Option<gtk::Label>,
    pub title_game: Option<gtk::Widget>,
    pub title_game_subtitle: Option<gtk::Label>,
    pub menu_player_label: Option<gtk::Label>,
    pub board_container: Option<gtk::Box>,
    pub dynamic_css_provider: Option<gtk::CssProvider>,
    pub player_label: Option<gtk::Label>,
    pub timer_label: Option<gtk::Label>,
    pub score_label: Option<gtk::Label>,
    pub high_score_label: Option<gtk::Label>,
    pub progress: Option<gtk::ProgressBar>,
    pub grid_buttons: Vec<gtk::Button>,

    pub themes: ThemeRegistry,
    pub store: Rc<JsonScoreStore>,
    pub scheduler: Rc<GlibScheduler>,
    pub timing: Timing,
    pub player_name: Option<String>,
    pub theme_name: String,
    pub difficulty: Difficulty,
    pub controller: Option<Rc<GameController>>,
    pub snapshot: Option<SessionSnapshot>,
    pub outcome_shown: bool,
}

impl AppState {
    pub fn new(launch: &Launch) -> Self {
        AppState {
            window: None,
            view_stack: None,
            header: None,
            back_button: None,
            restart_button: None,
            title_menu: None,
            title_game: None,
            title_game_subtitle: None,
            menu_player_label: None,
            board_container: None,
            dynamic_css_provider: None,
            player_label: None,
            timer_label: None,
            score_label: None,
            high_score_label: None,
            progress: None,
            grid_buttons: Vec::new(),
            themes: ThemeRegistry::with_custom(&launch.config.custom_themes),
            store: Rc::new(JsonScoreStore::new(launch.scores_dir.clone())),
            scheduler: Rc::new(GlibScheduler::default()),
            timing: launch.timing,
            player_name: launch.player_name.clone(),
            theme_name: String::new(),
            difficulty: Difficulty::default(),
            controller: None,
            snapshot: None,
            outcome_shown: false,
        }
    }

    pub fn player(&self) -> &str {
        self.player_name.as_deref().unwrap_or("Player")
    }

    pub fn in_game(&self) -> bool {
        self.view_stack
            .as_ref()
            .and_then(|stack| stack.visible_child_name())
            .as_deref()
            == Some("game")
    }

    /// Drops the running game, which cancels its pending callbacks.
    pub fn end_session(&mut self) {
        if self.controller.take().is_some() {
            tracing::debug!("session torn down");
        }
        self.snapshot = None;
        self.outcome_shown = false;
    }
}
