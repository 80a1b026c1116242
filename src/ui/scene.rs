use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::prelude::*;

use super::hud::{set_header_game, set_header_menu};
use super::state::AppState;

pub(super) fn show_game(state: &Rc<RefCell<AppState>>) {
    set_header_game(state);
    let st = state.borrow();
    if let Some(stack) = &st.view_stack {
        stack.set_transition_type(gtk::StackTransitionType::SlideLeft);
        stack.set_visible_child_name("game");
    }
}

pub(super) fn refresh_menu_player(st: &AppState) {
    if let Some(label) = &st.menu_player_label {
        label.set_text(&format!("Player: {}", st.player()));
    }
}

pub(super) fn show_menu(state: &Rc<RefCell<AppState>>) {
    {
        let mut st = state.borrow_mut();
        st.end_session();
        refresh_menu_player(&st);
    }
    set_header_menu(state);
    let st = state.borrow();
    if let Some(stack) = &st.view_stack {
        stack.set_transition_type(gtk::StackTransitionType::SlideRight);
        stack.set_visible_child_name("menu");
    }
}
