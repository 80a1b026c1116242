use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::prelude::*;
use libadwaita as adw;

use adw::prelude::*;

use super::app::start_game;
use super::scene::show_menu;
use super::state::AppState;

pub fn show_instructions_dialog(app: &adw::Application) -> adw::AlertDialog {
    let dialog = adw::AlertDialog::new(
        Some("Instructions"),
        Some(
            "Flip two cards at a time to find matching pairs.\n\
Every pair is worth 10 points.\n\
Clear the board before the time runs out.",
        ),
    );
    dialog.add_response("ok", "Got it");
    dialog.set_default_response(Some("ok"));
    dialog.set_close_response("ok");
    dialog.present(app.active_window().as_ref());
    dialog
}

pub fn show_about_dialog(app: &adw::Application) -> adw::AboutDialog {
    let dialog = adw::AboutDialog::builder()
        .application_name("Memory Puzzle")
        .application_icon("view-app-grid-symbolic")
        .version(env!("CARGO_PKG_VERSION"))
        .comments("A tile-matching memory game.")
        .build();
    dialog.present(app.active_window().as_ref());
    dialog
}

/// Asks for the player's name. `on_done` gets `None` when the prompt is
/// dismissed or left blank.
pub fn show_name_dialog(
    parent: Option<&adw::ApplicationWindow>,
    current: Option<&str>,
    on_done: impl Fn(Option<String>) + 'static,
) {
    let dialog = adw::AlertDialog::new(Some("Player Name"), Some("Enter your name:"));

    let entry = gtk::Entry::new();
    entry.set_text(current.unwrap_or_default());
    entry.set_activates_default(true);
    dialog.set_extra_child(Some(&entry));

    dialog.add_response("cancel", "Cancel");
    dialog.add_response("ok", "Continue");
    dialog.set_response_appearance("ok", adw::ResponseAppearance::Suggested);
    dialog.set_default_response(Some("ok"));
    dialog.set_close_response("cancel");

    dialog.connect_response(None, move |_, response| {
        let name = entry.text().trim().to_string();
        if response == "ok" && !name.is_empty() {
            on_done(Some(name));
        } else {
            on_done(None);
        }
    });
    dialog.present(parent);
}

pub(super) fn show_outcome_dialog(state: &Rc<RefCell<AppState>>, won: bool) {
    let (window, score, high_score) = {
        let st = state.borrow();
        let Some(snapshot) = st.snapshot.as_ref() else {
            return;
        };
        // The game may have been restarted or left before this ran.
        if !st.outcome_shown || !snapshot.phase.is_finished() {
            return;
        }
        (st.window.clone(), snapshot.score, snapshot.high_score)
    };

    let (heading, mut body) = if won {
        ("Congratulations!", format!("🎉 You Win! 🎉\nScore: {score}"))
    } else {
        ("Time's up!", format!("⏱️ Time Over! Try Again.\nScore: {score}"))
    };
    if score > high_score {
        body.push_str("\nNew high score!");
    }

    let dialog = adw::AlertDialog::new(Some(heading), Some(body.as_str()));
    dialog.add_response("menu", "Back to Menu");
    dialog.add_response("again", "Play Again");
    dialog.set_response_appearance("again", adw::ResponseAppearance::Suggested);
    dialog.set_default_response(Some("again"));
    dialog.set_close_response("menu");

    let state = state.clone();
    dialog.connect_response(None, move |_, response| {
        if response == "again" {
            let (theme, difficulty) = {
                let st = state.borrow();
                (st.theme_name.clone(), st.difficulty)
            };
            start_game(&state, &theme, difficulty);
        } else {
            show_menu(&state);
        }
    });
    dialog.present(window.as_ref());
}
