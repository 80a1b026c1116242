use std::cell::RefCell;
use std::rc::Rc;

use adw::prelude::*;
use gtk4 as gtk;
use gtk4::prelude::*;
use libadwaita as adw;

use memory_puzzle::game::Difficulty;

use super::app::start_game;
use super::state::AppState;

fn difficulty_label(difficulty: Difficulty) -> String {
    let (side, limit) = difficulty.config();
    format!("{}  ({side}×{side}, {limit}s)", difficulty.name())
}

pub fn show_difficulty_dialog(state: &Rc<RefCell<AppState>>, app: &adw::Application, theme: &str) {
    let parent_window = app.active_window();
    let dialog = adw::Dialog::new();
    dialog.set_can_close(true);

    let title = gtk::Label::new(Some(&format!("{theme} - Select Difficulty")));
    title.add_css_class("dialog-header-title");
    title.set_halign(gtk::Align::Center);

    let header = adw::HeaderBar::new();
    header.set_title_widget(Some(&title));
    header.set_show_end_title_buttons(true);
    header.add_css_class("flat");

    let content = gtk::Box::new(gtk::Orientation::Vertical, 10);
    content.add_css_class("mode-dialog-content");
    content.set_hexpand(true);
    content.set_margin_top(16);
    content.set_margin_bottom(16);
    content.set_margin_start(16);
    content.set_margin_end(16);

    for difficulty in Difficulty::ALL {
        let button = gtk::Button::with_label(&difficulty_label(difficulty));
        button.set_hexpand(true);
        button.set_size_request(-1, 42);
        button.add_css_class("mode-dialog-button");
        button.connect_clicked({
            let state = state.clone();
            let dialog = dialog.clone();
            let theme = theme.to_string();
            move |_| {
                dialog.close();
                start_game(&state, &theme, difficulty);
            }
        });
        content.append(&button);
    }

    let toolbar = adw::ToolbarView::new();
    toolbar.add_top_bar(&header);
    toolbar.set_content(Some(&content));

    dialog.set_child(Some(&toolbar));
    dialog.present(parent_window.as_ref());
}
