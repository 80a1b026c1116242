use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

use adw::prelude::*;
use gio::SimpleAction;
use gtk4 as gtk;
use gtk4::gdk;
use gtk4::glib;
use gtk4::prelude::*;
use libadwaita as adw;
use rand::SeedableRng;
use rand::rngs::StdRng;

use memory_puzzle::config::Config;
use memory_puzzle::game::{Difficulty, GameController, GridSize, Session};
use memory_puzzle::scores::ScoreStore;

use super::board::{CONTENT_MARGIN, rebuild_board};
use super::dialogs::{show_about_dialog, show_instructions_dialog, show_name_dialog};
use super::hud::{apply_snapshot, build_hud, set_header_menu};
use super::mode_dialogs::show_difficulty_dialog;
use super::records::show_scores_dialog;
use super::scene::{refresh_menu_player, show_game, show_menu};
use super::state::{AppState, Launch};

const APP_ID: &str = "io.github.memorypuzzle.MemoryPuzzle";
const RESOURCE_PREFIX: &str = "/io/github/memorypuzzle/MemoryPuzzle";

pub(super) fn redraw_button_child(button: &gtk::Button) {
    if let Some(child) = button.child() {
        child.queue_draw();
    }
}

pub fn handle_tile_click(state: &Rc<RefCell<AppState>>, index: usize) {
    let controller = state.borrow().controller.clone();
    if let Some(controller) = controller {
        controller.reveal(index);
    }
}

/// Deals a new session for `theme` at `difficulty` and switches to the board.
pub(super) fn start_game(state: &Rc<RefCell<AppState>>, theme: &str, difficulty: Difficulty) {
    let controller = {
        let mut st = state.borrow_mut();
        st.end_session();

        let size = match GridSize::new(difficulty.grid_size()) {
            Ok(size) => size,
            Err(err) => {
                tracing::error!(%difficulty, error = %err, "cannot deal board");
                return;
            }
        };
        let theme = st.themes.resolve(theme).clone();
        let player = st.player().to_string();
        let high_score = st.store.high_score(&player);
        let mut rng = StdRng::from_os_rng();

        st.theme_name = theme.name().to_string();
        st.difficulty = difficulty;
        tracing::info!(
            player = %player,
            theme = %st.theme_name,
            %difficulty,
            high_score,
            "starting game"
        );

        let session = Session::new(
            theme,
            size,
            difficulty.time_limit(),
            player,
            high_score,
            &mut rng,
        );
        let controller = Rc::new(GameController::new(
            session,
            st.scheduler.clone(),
            st.store.clone(),
            st.timing,
            rng,
        ));
        st.snapshot = Some(controller.snapshot());
        st.controller = Some(controller.clone());
        controller
    };

    let weak = Rc::downgrade(state);
    controller.set_observer(move |snapshot| {
        if let Some(state) = weak.upgrade() {
            apply_snapshot(&state, snapshot);
        }
    });

    rebuild_board(state);
    show_game(state);
    controller.start();
}

fn restart_game(state: &Rc<RefCell<AppState>>) {
    let controller = {
        let mut st = state.borrow_mut();
        st.outcome_shown = false;
        st.controller.clone()
    };
    if let Some(controller) = controller {
        controller.restart();
    }
}

/// Asks for the player's name and remembers it. On first launch a cancelled
/// prompt quits, and `then_start` begins the requested game once named.
fn prompt_player_name(
    state: &Rc<RefCell<AppState>>,
    app: &adw::Application,
    first_launch: bool,
    then_start: Option<(String, Difficulty)>,
) {
    let (window, current) = {
        let st = state.borrow();
        (st.window.clone(), st.player_name.clone())
    };
    let state = state.clone();
    let app = app.clone();
    show_name_dialog(window.as_ref(), current.as_deref(), move |name| {
        let Some(name) = name else {
            if first_launch {
                app.quit();
            }
            return;
        };
        {
            let mut st = state.borrow_mut();
            tracing::info!(player = %name, "player set");
            if let Err(err) = Config::remember_player(&name) {
                tracing::warn!(error = %err, "could not remember player name");
            }
            st.player_name = Some(name);
            refresh_menu_player(&st);
        }
        if let Some((theme, difficulty)) = &then_start {
            start_game(&state, theme, *difficulty);
        }
    });
}

pub fn run(launch: Launch) -> glib::ExitCode {
    glib::set_prgname(Some(APP_ID));
    let app = adw::Application::builder()
        .application_id(APP_ID)
        .build();

    app.connect_activate(move |app| {
        load_css();

        let state = Rc::new(RefCell::new(AppState::new(&launch)));

        let instructions_action = SimpleAction::new("instructions", None);
        instructions_action.connect_activate({
            let app = app.clone();
            move |_, _| {
                show_instructions_dialog(&app);
            }
        });
        app.add_action(&instructions_action);

        let about_action = SimpleAction::new("about", None);
        about_action.connect_activate({
            let app = app.clone();
            move |_, _| {
                show_about_dialog(&app);
            }
        });
        app.add_action(&about_action);

        let score_action = SimpleAction::new("score", None);
        score_action.connect_activate({
            let app = app.clone();
            let state = state.clone();
            move |_, _| {
                show_scores_dialog(&state, &app);
            }
        });
        app.add_action(&score_action);

        let player_action = SimpleAction::new("player", None);
        player_action.connect_activate({
            let app = app.clone();
            let state = state.clone();
            move |_, _| {
                prompt_player_name(&state, &app, false, None);
            }
        });
        app.add_action(&player_action);

        let quit_action = SimpleAction::new("quit", None);
        quit_action.connect_activate({
            let app = app.clone();
            move |_, _| app.quit()
        });
        app.add_action(&quit_action);

        let dynamic_css_provider = gtk::CssProvider::new();
        if let Some(display) = gtk::gdk::Display::default() {
            gtk::style_context_add_provider_for_display(
                &display,
                &dynamic_css_provider,
                gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
            );
        }

        let title_menu = gtk::Label::new(None);
        title_menu.set_markup("<b>Memory Puzzle</b>");
        title_menu.set_halign(gtk::Align::Center);

        let title_game_box = gtk::Box::new(gtk::Orientation::Vertical, 0);
        title_game_box.set_valign(gtk::Align::Center);
        title_game_box.set_halign(gtk::Align::Center);
        title_game_box.set_hexpand(true);

        let title_game_main = gtk::Label::builder()
            .label("Memory Puzzle")
            .halign(gtk::Align::Center)
            .css_classes(vec!["game-title-main"])
            .build();

        let title_game_subtitle = gtk::Label::builder()
            .label("")
            .halign(gtk::Align::Center)
            .css_classes(vec!["game-title-subtitle", "caption"])
            .build();

        title_game_box.append(&title_game_main);
        title_game_box.append(&title_game_subtitle);

        let header = adw::HeaderBar::builder()
            .title_widget(&title_menu)
            .build();
        header.add_css_class("app-header");
        header.add_css_class("flat");

        let back_button = gtk::Button::builder()
            .icon_name("go-previous-symbolic")
            .build();
        back_button.set_tooltip_text(Some("Back"));
        back_button.connect_clicked({
            let state = state.clone();
            move |_| {
                show_menu(&state);
            }
        });
        header.pack_start(&back_button);

        let menu_model = gio::Menu::new();
        menu_model.append(Some("Scores"), Some("app.score"));
        menu_model.append(Some("Change Player"), Some("app.player"));
        menu_model.append(Some("Instructions"), Some("app.instructions"));
        menu_model.append(Some("About Memory Puzzle"), Some("app.about"));
        menu_model.append(Some("Quit"), Some("app.quit"));
        let menu_button = gtk::MenuButton::builder()
            .icon_name("open-menu-symbolic")
            .menu_model(&menu_model)
            .build();

        let restart_button = gtk::Button::builder()
            .icon_name("view-refresh-symbolic")
            .build();
        restart_button.set_tooltip_text(Some("Restart"));
        restart_button.connect_clicked({
            let state = state.clone();
            move |_| {
                restart_game(&state);
            }
        });
        let end_box = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        end_box.append(&restart_button);
        end_box.append(&menu_button);
        header.pack_end(&end_box);

        let view_stack = gtk::Stack::new();
        view_stack.set_hexpand(true);
        view_stack.set_vexpand(true);
        view_stack.set_hhomogeneous(false);
        view_stack.set_vhomogeneous(false);
        view_stack.set_interpolate_size(false);
        view_stack.set_transition_type(gtk::StackTransitionType::SlideLeft);
        view_stack.set_transition_duration(300);

        let game_view = build_game_view(&state);
        view_stack.add_named(&game_view, Some("game"));

        let menu_view = build_menu_view(&state, app);
        view_stack.add_named(&menu_view, Some("menu"));

        view_stack.set_visible_child_name("menu");
        let toolbar = adw::ToolbarView::new();
        toolbar.set_hexpand(true);
        toolbar.set_vexpand(true);
        toolbar.add_top_bar(&header);
        toolbar.set_content(Some(&view_stack));

        let win = adw::ApplicationWindow::builder()
            .application(app)
            .title("Memory Puzzle")
            .default_width(900)
            .default_height(700)
            .content(&toolbar)
            .build();
        win.set_size_request(360, 560);
        win.add_css_class("app-window");

        {
            let mut st = state.borrow_mut();
            st.window = Some(win.clone());
            st.view_stack = Some(view_stack.clone());
            st.header = Some(header.clone());
            st.back_button = Some(back_button);
            st.restart_button = Some(restart_button);
            st.title_menu = Some(title_menu);
            st.title_game = Some(title_game_box.upcast::<gtk::Widget>());
            st.title_game_subtitle = Some(title_game_subtitle);
            st.dynamic_css_provider = Some(dynamic_css_provider);
            refresh_menu_player(&st);
        }

        let global_key = gtk::EventControllerKey::new();
        global_key.set_propagation_phase(gtk::PropagationPhase::Capture);
        global_key.connect_key_pressed({
            let state = state.clone();
            move |_, key, _, _| {
                if key == gdk::Key::Escape && state.borrow().in_game() {
                    show_menu(&state);
                    return glib::Propagation::Stop;
                }
                glib::Propagation::Proceed
            }
        });
        win.add_controller(global_key);

        win.connect_close_request({
            let state = state.clone();
            move |_| {
                state.borrow_mut().end_session();
                glib::Propagation::Proceed
            }
        });

        set_header_menu(&state);
        win.present();

        let needs_name = state.borrow().player_name.is_none();
        if needs_name {
            prompt_player_name(&state, app, true, launch.autostart());
        } else if let Some((theme, difficulty)) = launch.autostart() {
            start_game(&state, &theme, difficulty);
        }
    });

    let no_args: [&str; 0] = [];
    app.run_with_args(&no_args)
}

fn load_css() {
    static RESOURCES_INIT: Once = Once::new();
    RESOURCES_INIT.call_once(|| {
        if let Err(err) = gio::resources_register_include!("memory-puzzle.gresource") {
            tracing::error!(error = %err, "failed to register embedded resources");
        }
    });

    let Some(display) = gtk::gdk::Display::default() else {
        return;
    };

    let provider = gtk::CssProvider::new();
    provider.load_from_resource(&format!("{RESOURCE_PREFIX}/style.css"));
    gtk::style_context_add_provider_for_display(
        &display,
        &provider,
        gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}

fn build_menu_view(state: &Rc<RefCell<AppState>>, app: &adw::Application) -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 0);
    root.set_hexpand(true);
    root.set_vexpand(true);
    root.add_css_class("main-menu-root");

    let center = gtk::CenterBox::new();
    center.set_hexpand(true);
    center.set_vexpand(true);

    let content = gtk::Box::new(gtk::Orientation::Vertical, 6);
    content.set_halign(gtk::Align::Center);
    content.set_valign(gtk::Align::Center);
    content.add_css_class("main-menu-content");

    let icon = gtk::Image::from_icon_name("view-app-grid-symbolic");
    icon.set_pixel_size(128);
    icon.add_css_class("main-menu-icon");

    let title = gtk::Label::new(Some("Memory Puzzle"));
    title.add_css_class("main-menu-title");
    title.add_css_class("title-1");

    let player_label = gtk::Label::new(None);
    player_label.add_css_class("dim-label");

    let choose_label = gtk::Label::new(Some("Choose Theme"));
    choose_label.add_css_class("heading");

    let buttons_box = gtk::Box::new(gtk::Orientation::Vertical, 13);
    buttons_box.set_halign(gtk::Align::Center);

    let theme_names: Vec<String> = state
        .borrow()
        .themes
        .themes()
        .iter()
        .map(|theme| theme.name().to_string())
        .collect();
    for name in theme_names {
        let button = gtk::Button::with_label(&name);
        button.add_css_class("main-menu-button");
        button.set_size_request(164, 40);
        button.connect_clicked({
            let state = state.clone();
            let app = app.clone();
            move |_| {
                show_difficulty_dialog(&state, &app, &name);
            }
        });
        buttons_box.append(&button);
    }

    content.append(&icon);
    content.append(&title);
    content.append(&player_label);
    content.append(&choose_label);
    content.append(&buttons_box);

    center.set_center_widget(Some(&content));
    root.append(&center);

    state.borrow_mut().menu_player_label = Some(player_label);

    root
}

fn build_game_view(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 0);
    root.set_hexpand(true);
    root.set_vexpand(true);
    root.add_css_class("game-root");

    let content = gtk::Box::new(gtk::Orientation::Vertical, 12);
    content.set_hexpand(true);
    content.set_vexpand(true);
    content.set_halign(gtk::Align::Fill);
    content.set_valign(gtk::Align::Fill);
    content.set_margin_top(CONTENT_MARGIN);
    content.set_margin_bottom(CONTENT_MARGIN);
    content.set_margin_start(CONTENT_MARGIN);
    content.set_margin_end(CONTENT_MARGIN);

    let hud = build_hud(state);
    content.append(&hud);

    let board_frame = gtk::AspectFrame::new(0.5, 0.5, 1.0, false);
    board_frame.set_halign(gtk::Align::Fill);
    board_frame.set_valign(gtk::Align::Fill);
    board_frame.set_hexpand(true);
    board_frame.set_vexpand(true);

    let board_card = gtk::Box::new(gtk::Orientation::Vertical, 0);
    board_card.set_halign(gtk::Align::Fill);
    board_card.set_valign(gtk::Align::Fill);
    board_card.set_hexpand(true);
    board_card.set_vexpand(true);
    board_card.add_css_class("puzzle-card-container");

    board_card.connect_closure(
        "notify::width",
        false,
        glib::closure_local!(move |card: gtk::Box, _: glib::ParamSpec| {
            if card.width() < 500 {
                card.add_css_class("compact");
            } else {
                card.remove_css_class("compact");
            }
        }),
    );

    board_frame.set_child(Some(&board_card));
    content.append(&board_frame);
    root.append(&content);

    state.borrow_mut().board_container = Some(board_card);

    root
}
