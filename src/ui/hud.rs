use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::glib;
use gtk4::prelude::*;

use memory_puzzle::game::{CellState, Phase, SessionSnapshot};

use super::app::redraw_button_child;
use super::dialogs::show_outcome_dialog;
use super::state::AppState;

pub(super) fn set_header_menu(state: &Rc<RefCell<AppState>>) {
    let st = state.borrow();
    if let (Some(header), Some(title)) = (&st.header, &st.title_menu) {
        header.set_title_widget(Some(title));
    }
    if let Some(back) = &st.back_button {
        back.set_visible(false);
    }
    if let Some(restart) = &st.restart_button {
        restart.set_visible(false);
    }
}

pub(super) fn set_header_game(state: &Rc<RefCell<AppState>>) {
    let st = state.borrow();
    if let (Some(header), Some(title_box)) = (&st.header, &st.title_game) {
        update_subtitle(&st);
        header.set_title_widget(Some(title_box));
    }
    if let Some(back) = &st.back_button {
        back.set_visible(true);
    }
    if let Some(restart) = &st.restart_button {
        restart.set_visible(true);
    }
}

pub(super) fn update_subtitle(st: &AppState) {
    if let Some(subtitle) = &st.title_game_subtitle {
        subtitle.set_text(&format!("{} | {}", st.theme_name, st.difficulty.name()));
    }
}

fn hud_label(text: &str) -> gtk::Label {
    let label = gtk::Label::new(Some(text));
    label.add_css_class("hud-label");
    label.add_css_class("numeric");
    label.set_hexpand(true);
    label
}

pub(super) fn build_hud(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
    root.add_css_class("hud");

    let row = gtk::Box::new(gtk::Orientation::Horizontal, 10);
    row.set_halign(gtk::Align::Fill);
    let player_label = hud_label("Player:");
    let timer_label = hud_label("Time Left:");
    let score_label = hud_label("Score: 0");
    let high_score_label = hud_label("High Score: 0");
    row.append(&player_label);
    row.append(&timer_label);
    row.append(&score_label);
    row.append(&high_score_label);

    let progress = gtk::ProgressBar::new();
    progress.add_css_class("hud-progress");
    progress.set_fraction(1.0);

    root.append(&row);
    root.append(&progress);

    let mut st = state.borrow_mut();
    st.player_label = Some(player_label);
    st.timer_label = Some(timer_label);
    st.score_label = Some(score_label);
    st.high_score_label = Some(high_score_label);
    st.progress = Some(progress);

    root
}

fn update_hud(st: &AppState, snapshot: &SessionSnapshot) {
    if let Some(label) = &st.player_label {
        label.set_text(&format!("Player: {}", st.player()));
    }
    if let Some(label) = &st.timer_label {
        label.set_text(&format!("Time Left: {}", snapshot.remaining_time));
    }
    if let Some(label) = &st.score_label {
        label.set_text(&format!("Score: {}", snapshot.score));
    }
    if let Some(label) = &st.high_score_label {
        label.set_text(&format!("High Score: {}", snapshot.high_score));
    }
    if let Some(progress) = &st.progress {
        let fraction = if snapshot.time_limit == 0 {
            0.0
        } else {
            f64::from(snapshot.remaining_time) / f64::from(snapshot.time_limit)
        };
        progress.set_fraction(fraction.clamp(0.0, 1.0));
        if snapshot.remaining_time <= 10 {
            progress.add_css_class("low-time");
        } else {
            progress.remove_css_class("low-time");
        }
    }
}

/// Renders a controller snapshot; called after every change to the session.
pub(super) fn apply_snapshot(state: &Rc<RefCell<AppState>>, snapshot: &SessionSnapshot) {
    let finished = {
        let mut st = state.borrow_mut();
        if st.grid_buttons.len() == snapshot.cells.len() {
            for (button, cell) in st.grid_buttons.iter().zip(&snapshot.cells) {
                button.remove_css_class("revealed");
                button.remove_css_class("matched");
                match cell {
                    CellState::Hidden => (),
                    CellState::Revealed => button.add_css_class("revealed"),
                    CellState::Matched => button.add_css_class("matched"),
                }
                button.set_sensitive(*cell != CellState::Matched);
                redraw_button_child(button);
            }
        }
        if let Some(container) = &st.board_container {
            if snapshot.phase == Phase::Resolving {
                container.add_css_class("no-hover");
            } else {
                container.remove_css_class("no-hover");
            }
        }
        update_hud(&st, snapshot);
        st.snapshot = Some(snapshot.clone());

        if snapshot.phase.is_finished() && !st.outcome_shown {
            st.outcome_shown = true;
            Some(snapshot.phase)
        } else {
            None
        }
    };

    // Shown from an idle callback, outside the controller's notification.
    if let Some(phase) = finished {
        let state = state.clone();
        glib::idle_add_local_once(move || {
            show_outcome_dialog(&state, phase == Phase::Won);
        });
    }
}
